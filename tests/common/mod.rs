#![allow(dead_code)]

use std::path::{Path, PathBuf};

use digei_report::{ReportConfig, ReportData};

pub fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Built-in fonts keep the output independent of the host and its text
/// searchable as WinAnsi strings.
pub fn config() -> ReportConfig {
    let _ = env_logger::try_init();
    ReportConfig::builtin(manifest_dir())
}

pub fn fixture_bytes(name: &str) -> Vec<u8> {
    let path = manifest_dir().join("tests/fixtures").join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

pub fn fixture(name: &str) -> ReportData {
    ReportData::from_json(&fixture_bytes(name)).expect("valid fixture")
}

pub fn minimal_payload() -> ReportData {
    ReportData::from_json(
        br#"{"organizacion": {}, "metadata": {}, "dimensiones": [], "grafica_dimensiones": []}"#,
    )
    .expect("minimal payload")
}

pub fn write_output(name: &str, bytes: &[u8]) -> PathBuf {
    let dir = Path::new("tests/output");
    std::fs::create_dir_all(dir).ok();
    let path = dir.join(name);
    std::fs::write(&path, bytes).ok();
    path
}

pub fn page_count(pdf: &[u8]) -> usize {
    let text = String::from_utf8_lossy(pdf);
    text.matches("/Type /Page").count() - text.matches("/Type /Pages").count()
}

pub fn image_count(pdf: &[u8]) -> usize {
    String::from_utf8_lossy(pdf)
        .matches("/Subtype /Image")
        .count()
}

/// Inflate every FlateDecode stream that decodes cleanly.
pub fn inflated_streams(pdf: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(start) = find(&pdf[pos..], b"stream\n") {
        let data_start = pos + start + b"stream\n".len();
        let Some(len) = find(&pdf[data_start..], b"\nendstream") else {
            break;
        };
        let data = &pdf[data_start..data_start + len];
        if let Ok(decoded) = miniz_oxide::inflate::decompress_to_vec_zlib(data) {
            out.push(decoded);
        }
        pos = data_start + len + b"\nendstream".len();
    }
    out
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn winansi_char(b: u8) -> char {
    match b {
        0x95 => '•',
        0x96 => '–',
        0x97 => '\u{2014}',
        0xB7 => '·',
        _ => b as char,
    }
}

/// Literal string starting after `(` at `i`; returns its bytes and the index of `)`.
fn literal_string(stream: &[u8], mut i: usize) -> (Vec<u8>, usize) {
    let mut bytes = Vec::new();
    let mut depth = 1;
    while i < stream.len() {
        let b = stream[i];
        match b {
            b'\\' if i + 1 < stream.len() => {
                i += 1;
                let esc = stream[i];
                if (b'0'..=b'7').contains(&esc) {
                    let digits: Vec<u8> = stream[i..(i + 3).min(stream.len())]
                        .iter()
                        .copied()
                        .take_while(|d| (b'0'..=b'7').contains(d))
                        .collect();
                    let s = std::str::from_utf8(&digits).unwrap_or("0");
                    bytes.push(u8::from_str_radix(s, 8).unwrap_or(0));
                    i += digits.len() - 1;
                } else {
                    bytes.push(match esc {
                        b'n' => b'\n',
                        b'r' => b'\r',
                        b't' => b'\t',
                        b'b' => 0x08,
                        b'f' => 0x0c,
                        other => other,
                    });
                }
            }
            b'(' => {
                depth += 1;
                bytes.push(b);
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                bytes.push(b);
            }
            _ => bytes.push(b),
        }
        i += 1;
    }
    (bytes, i)
}

/// String operands of content streams, each with the font selected by the
/// last `Tf` before it.
pub fn shown_operands(pdf: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut shown = Vec::new();
    for stream in inflated_streams(pdf) {
        let mut font = String::new();
        let mut last_name = String::new();
        let mut i = 0;
        while i < stream.len() {
            match stream[i] {
                b'(' => {
                    let (bytes, end) = literal_string(&stream, i + 1);
                    shown.push((font.clone(), bytes));
                    i = end;
                }
                b'<' if stream.get(i + 1) == Some(&b'<') => i += 1,
                b'<' => {
                    let Some(end) = stream[i..].iter().position(|&b| b == b'>').map(|p| i + p) else {
                        break;
                    };
                    let hex: Vec<u8> = stream[i + 1..end]
                        .iter()
                        .copied()
                        .filter(u8::is_ascii_hexdigit)
                        .collect();
                    let bytes = hex
                        .chunks(2)
                        .filter_map(|pair| u8::from_str_radix(std::str::from_utf8(pair).ok()?, 16).ok())
                        .collect();
                    shown.push((font.clone(), bytes));
                    i = end;
                }
                b'/' => {
                    let len = stream[i + 1..]
                        .iter()
                        .position(|b| b.is_ascii_whitespace() || b"/[]()<>".contains(b))
                        .unwrap_or(stream.len() - i - 1);
                    last_name = String::from_utf8_lossy(&stream[i + 1..i + 1 + len]).into_owned();
                    i += len;
                }
                b'T' if stream[i..].starts_with(b"Tf") => {
                    font = last_name.clone();
                    i += 1;
                }
                _ => {}
            }
            i += 1;
        }
    }
    shown
}

/// Strings shown with `Tj` in content streams, decoded from WinAnsi.
pub fn shown_strings(pdf: &[u8]) -> Vec<String> {
    shown_operands(pdf)
        .into_iter()
        .map(|(_, bytes)| bytes.into_iter().map(winansi_char).collect())
        .collect()
}

/// All shown text joined with single spaces.
pub fn document_text(pdf: &[u8]) -> String {
    shown_strings(pdf)
        .iter()
        .flat_map(|s| s.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
