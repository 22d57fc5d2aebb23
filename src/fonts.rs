//! Font lookup and embedding for the report's single font family.
//!
//! A TrueType family found on disk is embedded as four subsetted CID fonts
//! (Identity-H). Without one, the standard Helvetica family is referenced
//! with WinAnsi encoding and nothing is embedded.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use memmap2::Mmap;
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Name, Pdf, Rect, Ref, Str};
use ttf_parser::{Face, GlyphId};

use crate::model::FontStyle;

enum Encoding {
    WinAnsi,
    /// Glyph ids of the embedded subset.
    Identity(HashMap<char, u16>),
}

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    /// Advance widths in 1000 units per em.
    widths: HashMap<char, f32>,
    missing_width: f32,
    encoding: Encoding,
}

impl FontEntry {
    fn char_width(&self, ch: char) -> f32 {
        if let Some(&w) = self.widths.get(&ch) {
            return w;
        }
        match (&self.encoding, winansi_substitute(ch)) {
            (Encoding::WinAnsi, Some(sub)) => sub.chars().map(|c| self.char_width(c)).sum(),
            _ => self.missing_width,
        }
    }

    pub(crate) fn word_width(&self, word: &str, font_size: f32) -> f32 {
        word.chars().map(|ch| self.char_width(ch)).sum::<f32>() * font_size / 1000.0
    }

    pub(crate) fn space_width(&self, font_size: f32) -> f32 {
        self.char_width(' ') * font_size / 1000.0
    }

    /// Bytes for a content-stream `Tj` operand.
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.encoding {
            Encoding::WinAnsi => to_winansi_bytes(text),
            Encoding::Identity(gids) => text
                .chars()
                .flat_map(|ch| gids.get(&ch).copied().unwrap_or(0).to_be_bytes())
                .collect(),
        }
    }
}

/// The four registered variants of the report's font family, in
/// `FontStyle::ALL` order.
pub(crate) struct FontSet {
    entries: [FontEntry; 4],
}

impl FontSet {
    pub(crate) fn new(entries: [FontEntry; 4]) -> Self {
        Self { entries }
    }

    pub(crate) fn get(&self, style: FontStyle) -> &FontEntry {
        &self.entries[style as usize]
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &FontEntry> {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Discovery

#[derive(Debug, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    bold: bool,
    italic: bool,
}

/// Installed faces keyed by lowercase family name and style.
struct FontIndex {
    faces: HashMap<FaceKey, (PathBuf, u32)>,
}

static FONT_INDEX: OnceLock<FontIndex> = OnceLock::new();

fn search_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::env::var_os("DIGEI_FONTS")
        .map(|val| std::env::split_paths(&val).collect())
        .unwrap_or_default();
    dirs.push(PathBuf::from("fonts"));

    let home = std::env::var_os("HOME").map(PathBuf::from);
    if cfg!(target_os = "macos") {
        dirs.extend(["/Library/Fonts", "/System/Library/Fonts"].map(PathBuf::from));
        dirs.extend(home.map(|h| h.join("Library/Fonts")));
    } else if cfg!(windows) {
        let windir = std::env::var_os("WINDIR").map_or_else(|| "C:\\Windows".into(), PathBuf::from);
        dirs.push(windir.join("Fonts"));
    } else {
        dirs.extend(["/usr/share/fonts", "/usr/local/share/fonts"].map(PathBuf::from));
        dirs.extend(home.map(|h| h.join(".local/share/fonts")));
    }
    dirs
}

fn collect_font_files(dir: &Path, visited: &mut HashSet<PathBuf>, out: &mut Vec<PathBuf>) {
    if !visited.insert(dir.to_path_buf()) {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            collect_font_files(&path, visited, out);
        } else if font_extension(&path).is_some() {
            out.push(path);
        }
    }
}

fn font_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ["ttf", "otf", "ttc"].into_iter().find(|e| *e == ext)
}

/// Family name from name ID 1, which keeps "DejaVu Sans" apart from
/// "DejaVu Sans Condensed".
fn family_name(face: &Face) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|n| n.name_id == ttf_parser::name_id::FAMILY && n.is_unicode())
        .find_map(|n| n.to_string())
}

impl FontIndex {
    fn scan(dirs: &[PathBuf]) -> Self {
        let t0 = std::time::Instant::now();
        let mut visited = HashSet::new();
        let mut files = Vec::new();
        for dir in dirs {
            collect_font_files(dir, &mut visited, &mut files);
        }

        let mut faces = HashMap::new();
        for path in &files {
            let Ok(file) = std::fs::File::open(path) else {
                continue;
            };
            // SAFETY: read-only mapping of a font file that is not written during the scan.
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            let count = match font_extension(path) {
                Some("ttc") => ttf_parser::fonts_in_collection(&data).unwrap_or(1),
                _ => 1,
            };
            for index in 0..count {
                let Ok(face) = Face::parse(&data, index) else {
                    continue;
                };
                let Some(family) = family_name(&face) else {
                    continue;
                };
                let key = FaceKey {
                    family: family.to_lowercase(),
                    bold: face.is_bold(),
                    italic: face.is_italic(),
                };
                faces.entry(key).or_insert_with(|| (path.clone(), index));
            }
        }

        log::info!(
            "Font scan: {:.1}ms, {} files, {} faces",
            t0.elapsed().as_secs_f64() * 1000.0,
            files.len(),
            faces.len(),
        );
        Self { faces }
    }

    fn global() -> &'static Self {
        FONT_INDEX.get_or_init(|| Self::scan(&search_dirs()))
    }

    /// Exact style first; bold-italic falls back to bold, anything to regular.
    fn find(&self, family: &str, style: FontStyle) -> Option<&(PathBuf, u32)> {
        let family = family.to_lowercase();
        let (bold, italic) = (style.is_bold(), style.is_italic());
        [(bold, italic), (bold, false), (false, false)]
            .into_iter()
            .find_map(|(bold, italic)| {
                self.faces.get(&FaceKey {
                    family: family.clone(),
                    bold,
                    italic,
                })
            })
    }
}

// ---------------------------------------------------------------------------
// WinAnsi

/// Windows-1252 bytes in 0x80..=0x9F whose characters differ from Latin-1.
const CP1252_EXTRA: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

fn winansi_byte(ch: char) -> Option<u8> {
    match ch as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(ch as u8),
        _ => CP1252_EXTRA.iter().find(|(_, c)| *c == ch).map(|(b, _)| *b),
    }
}

/// Every character WinAnsi can show.
fn winansi_chars() -> impl Iterator<Item = char> {
    (0x20u8..=0x7E)
        .chain(0xA0..=0xFF)
        .map(char::from)
        .chain(CP1252_EXTRA.iter().map(|(_, c)| *c))
}

/// Report characters WinAnsi lacks, spelled with characters it has.
fn winansi_substitute(ch: char) -> Option<&'static str> {
    match ch {
        '\u{2265}' => Some(">="),
        '\u{2264}' => Some("<="),
        _ => None,
    }
}

/// Unmappable characters are dropped.
fn to_winansi_bytes(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        match (winansi_byte(ch), winansi_substitute(ch)) {
            (Some(b), _) => out.push(b),
            (None, Some(sub)) => out.extend_from_slice(sub.as_bytes()),
            (None, None) => {}
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Built-in Helvetica

/// AFM advance widths for ASCII 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Base letters of Latin-1 0xC0..=0xFF; accented letters share their width.
const LATIN1_BASE: &str = "AAAAAAACEEEEIIIIDNOOOOO+OUUUUYPsaaaaaaaceeeeiiiidnooooo+ouuuuypy";

fn helvetica_width(ch: char, bold: bool) -> f32 {
    let table = if bold { &HELVETICA_BOLD_ASCII } else { &HELVETICA_ASCII };
    let ascii = |c: char| f32::from(table[c as usize - 0x20]);
    match ch {
        ' '..='~' => ascii(ch),
        '\u{C0}'..='\u{FF}' => LATIN1_BASE
            .chars()
            .nth(ch as usize - 0xC0)
            .map_or(556.0, ascii),
        '\u{2022}' => 350.0,
        '\u{2014}' => 1000.0,
        '\u{B7}' => 278.0,
        _ => 556.0,
    }
}

fn helvetica_name(style: FontStyle) -> &'static [u8] {
    match style {
        FontStyle::Regular => b"Helvetica",
        FontStyle::Bold => b"Helvetica-Bold",
        FontStyle::Italic => b"Helvetica-Oblique",
        FontStyle::BoldItalic => b"Helvetica-BoldOblique",
    }
}

// ---------------------------------------------------------------------------
// TrueType embedding

struct Embedded {
    gids: HashMap<char, u16>,
    widths: HashMap<char, f32>,
    missing_width: f32,
}

const IDENTITY: SystemInfo = SystemInfo {
    registry: Str(b"Adobe"),
    ordering: Str(b"Identity"),
    supplement: 0,
};

/// Write the subsetted face as a Type0 font at `font_ref`.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    ps_name: &str,
    data: &[u8],
    face_index: u32,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Option<Embedded> {
    let face = Face::parse(data, face_index).ok()?;
    let scale = 1000.0 / f32::from(face.units_per_em());
    let advance = |gid: GlyphId| face.glyph_hor_advance(gid).map_or(0.0, |a| f32::from(a) * scale);

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut gids = HashMap::new();
    let mut widths = HashMap::new();
    for &ch in used_chars {
        if let Some(gid) = face.glyph_index(ch) {
            gids.insert(ch, remapper.remap(gid.0));
            widths.insert(ch, advance(gid));
        }
    }

    let subset = subsetter::subset(data, face_index, &remapper).unwrap_or_else(|e| {
        log::warn!("Subsetting {ps_name} failed ({e}), embedding the whole font");
        data.to_vec()
    });
    let subset_len = i32::try_from(subset.len()).ok()?;
    let data_ref = alloc();
    pdf.stream(data_ref, &subset).pair(Name(b"Length1"), subset_len);

    let bb = face.global_bounding_box();
    let descriptor_ref = alloc();
    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(FontFlags::NON_SYMBOLIC)
        .bbox(Rect::new(
            f32::from(bb.x_min) * scale,
            f32::from(bb.y_min) * scale,
            f32::from(bb.x_max) * scale,
            f32::from(bb.y_max) * scale,
        ))
        .italic_angle(if face.is_italic() { -12.0 } else { 0.0 })
        .ascent(f32::from(face.ascender()) * scale)
        .descent(f32::from(face.descender()) * scale)
        .cap_height(face.capital_height().map_or(700.0, |h| f32::from(h) * scale))
        .stem_v(80.0)
        .font_file2(data_ref);

    let mut by_gid: Vec<(u16, f32)> = gids
        .iter()
        .filter_map(|(ch, &gid)| widths.get(ch).map(|&w| (gid, w)))
        .collect();
    by_gid.sort_by_key(|&(gid, _)| gid);

    let cid_ref = alloc();
    {
        let mut cid = pdf.cid_font(cid_ref);
        cid.subtype(CidFontType::Type2)
            .base_font(Name(ps_name.as_bytes()))
            .system_info(IDENTITY)
            .font_descriptor(descriptor_ref)
            .default_width(0.0)
            .cid_to_gid_map_predefined(Name(b"Identity"));
        if !by_gid.is_empty() {
            let mut w = cid.widths();
            for (gid, width) in &by_gid {
                w.consecutive(*gid, [*width]);
            }
        }
    }

    let cmap_ref = alloc();
    let cmap_name = format!("{ps_name}-UTF16");
    let mut cmap = UnicodeCmap::new(Name(cmap_name.as_bytes()), IDENTITY);
    for (&ch, &gid) in &gids {
        cmap.pair(gid, ch);
    }
    pdf.stream(cmap_ref, cmap.finish().as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_ref)
        .to_unicode(cmap_ref);

    Some(Embedded {
        gids,
        widths,
        missing_width: advance(GlyphId(0)),
    })
}

/// Register one style of the report font. `family == None` selects the
/// built-in Helvetica family without touching the file system.
pub(crate) fn register_font(
    pdf: &mut Pdf,
    family: Option<&str>,
    style: FontStyle,
    pdf_name: String,
    alloc: &mut impl FnMut() -> Ref,
    used_chars: &HashSet<char>,
) -> FontEntry {
    let t0 = std::time::Instant::now();
    let font_ref = alloc();

    let embedded = family.and_then(|family| {
        let (path, face_index) = FontIndex::global().find(family, style)?;
        let data = std::fs::read(path).ok()?;
        let ps_name = format!("{}-{style:?}", family.replace(' ', ""));
        embed_truetype(pdf, font_ref, &ps_name, &data, *face_index, used_chars, alloc)
    });

    let entry = match embedded {
        Some(e) => FontEntry {
            pdf_name,
            font_ref,
            widths: e.widths,
            missing_width: e.missing_width,
            encoding: Encoding::Identity(e.gids),
        },
        None => {
            if let Some(family) = family {
                log::warn!("Font not found: {family} {style:?}, using Helvetica");
            }
            pdf.type1_font(font_ref)
                .base_font(Name(helvetica_name(style)))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            FontEntry {
                pdf_name,
                font_ref,
                widths: winansi_chars()
                    .map(|ch| (ch, helvetica_width(ch, style.is_bold())))
                    .collect(),
                missing_width: 0.0,
                encoding: Encoding::WinAnsi,
            }
        }
    };

    log::debug!(
        "register_font: {} {style:?} in {:.1}ms",
        family.unwrap_or("Helvetica"),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    entry
}
