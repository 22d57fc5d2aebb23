mod common;

use std::collections::HashMap;

use digei_report::{DEFAULT_FONT_FAMILY, ReportConfig, render_report};

/// Body of `id 0 obj ... endobj`.
fn object(pdf: &str, id: u32) -> Option<&str> {
    let header = format!("\n{id} 0 obj");
    let start = pdf.find(&header)? + header.len();
    let end = pdf[start..].find("endobj")?;
    Some(&pdf[start..start + end])
}

/// Object id following `key` in a dictionary, e.g. `/ToUnicode 9 0 R`.
fn reference_after(dict: &str, key: &str) -> Option<u32> {
    let rest = &dict[dict.find(key)? + key.len()..];
    rest.split_whitespace().next()?.parse().ok()
}

/// Font resource names mapped to their font object ids.
fn font_resources(pdf: &str) -> HashMap<String, u32> {
    let Some(start) = pdf.find("/Font <<") else {
        return HashMap::new();
    };
    let body = &pdf[start + "/Font <<".len()..];
    let body = &body[..body.find(">>").unwrap_or(body.len())];
    let tokens: Vec<&str> = body.split_whitespace().collect();
    tokens
        .chunks(4)
        .filter_map(|t| match t {
            [name, id, "0", "R"] => Some((name.trim_start_matches('/').to_string(), id.parse().ok()?)),
            _ => None,
        })
        .collect()
}

/// `bfchar` pairs of a ToUnicode CMap: glyph id to text.
fn to_unicode(cmap: &str) -> HashMap<u16, String> {
    let mut map = HashMap::new();
    let mut in_chars = false;
    for line in cmap.lines().map(str::trim) {
        if line.ends_with("beginbfchar") {
            in_chars = true;
        } else if line == "endbfchar" {
            in_chars = false;
        } else if in_chars {
            let hex: Vec<&str> = line
                .split_whitespace()
                .map(|t| t.trim_matches(|c| c == '<' || c == '>'))
                .collect();
            let [gid, text] = hex[..] else { continue };
            let Ok(gid) = u16::from_str_radix(gid, 16) else {
                continue;
            };
            let units: Vec<u16> = text
                .as_bytes()
                .chunks(4)
                .filter_map(|c| u16::from_str_radix(std::str::from_utf8(c).ok()?, 16).ok())
                .collect();
            let decoded = char::decode_utf16(units).filter_map(Result::ok).collect();
            map.insert(gid, decoded);
        }
    }
    map
}

/// Text shown with Identity-H fonts, decoded through each font's ToUnicode map.
fn decoded_text(pdf_bytes: &[u8]) -> String {
    let pdf = String::from_utf8_lossy(pdf_bytes);
    let cmaps: HashMap<String, HashMap<u16, String>> = font_resources(&pdf)
        .into_iter()
        .filter_map(|(name, id)| {
            let cmap_id = reference_after(object(&pdf, id)?, "/ToUnicode")?;
            Some((name, to_unicode(object(&pdf, cmap_id)?)))
        })
        .collect();

    let mut words = Vec::new();
    for (font, bytes) in common::shown_operands(pdf_bytes) {
        let Some(map) = cmaps.get(&font) else { continue };
        let word: String = bytes
            .chunks(2)
            .filter_map(|pair| map.get(&u16::from_be_bytes([pair[0], *pair.get(1)?])))
            .map(String::as_str)
            .collect();
        words.push(word);
    }
    words.join(" ")
}

#[test]
fn default_family_is_embedded_as_subsetted_cid_fonts() {
    let _ = env_logger::try_init();
    let config = ReportConfig {
        assets_dir: common::manifest_dir(),
        font_family: Some(DEFAULT_FONT_FAMILY.to_string()),
    };
    let pdf = render_report(&common::fixture("reporte_completo.json"), &config)
        .expect("render with embedded fonts");
    let raw = String::from_utf8_lossy(&pdf);
    if !raw.contains("/FontFile2") {
        eprintln!("{DEFAULT_FONT_FAMILY} is not installed; skipping");
        return;
    }
    common::write_output("reporte_dejavu.pdf", &pdf);

    assert_eq!(raw.matches("/Subtype /Type0").count(), 4);
    assert_eq!(raw.matches("/FontFile2").count(), 4);
    assert_eq!(raw.matches("/ToUnicode").count(), 4);
    assert!(raw.contains("/Identity-H"));
    assert!(!raw.contains("/WinAnsiEncoding"));

    let text = decoded_text(&pdf);
    for needle in [
        "Universidad Tecnológica del Valle",
        "ÍNDICE",
        "PROMEDIO DE CUMPLIMIENTO POR DIMENSIÓN",
        "Página 4",
        "$24,050.50",
    ] {
        assert!(text.contains(needle), "missing {needle:?}");
    }
}
