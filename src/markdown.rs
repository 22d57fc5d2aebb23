//! Line-oriented markdown subset used by the narrative sections.
//!
//! One block per line: `# ` heading, `## ` subheading, `* ` bullet item,
//! blank line as vertical space, anything else a body paragraph. Inline
//! `**bold**` and `*italic*` spans are recognised inside each line.

use std::path::Path;

use crate::model::{Block, CM, Run};
use crate::report::styles::{self, ParagraphStyle};

#[derive(Clone, Debug, PartialEq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl Span {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: false,
            italic: false,
        }
    }
}

/// Split a line into styled spans. Markers without a closing partner are kept
/// as literal text.
pub fn parse_inline(line: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut literal = String::new();
    let mut rest = line;

    let flush = |literal: &mut String, spans: &mut Vec<Span>| {
        if !literal.is_empty() {
            spans.push(Span::plain(literal));
            literal.clear();
        }
    };

    while let Some(pos) = rest.find('*') {
        literal.push_str(&rest[..pos]);
        let after = &rest[pos..];

        if let Some(inner) = after.strip_prefix("**") {
            match inner.find("**") {
                Some(end) => {
                    flush(&mut literal, &mut spans);
                    spans.push(Span {
                        text: inner[..end].to_string(),
                        bold: true,
                        italic: false,
                    });
                    rest = &inner[end + 2..];
                }
                None => {
                    literal.push_str("**");
                    rest = inner;
                }
            }
            continue;
        }

        let inner = &after[1..];
        if let Some(end) = inner.find('*') {
            flush(&mut literal, &mut spans);
            spans.push(Span {
                text: inner[..end].to_string(),
                bold: false,
                italic: true,
            });
            rest = &inner[end + 1..];
        } else {
            literal.push('*');
            rest = inner;
        }
    }
    literal.push_str(rest);
    flush(&mut literal, &mut spans);
    spans.retain(|s| !s.text.is_empty());
    spans
}

fn runs(style: &ParagraphStyle, line: &str) -> Vec<Run> {
    parse_inline(line)
        .into_iter()
        .map(|span| {
            let mut run = style.run(span.text);
            run.bold |= span.bold;
            run.italic |= span.italic;
            run
        })
        .collect()
}

/// Convert markdown source to document blocks.
pub fn to_blocks(source: &str) -> Vec<Block> {
    source
        .lines()
        .map(str::trim)
        .map(|line| {
            if line.is_empty() {
                Block::Spacer(0.3 * CM)
            } else if let Some(text) = line.strip_prefix("# ") {
                Block::Paragraph(styles::H1.paragraph(runs(&styles::H1, text)))
            } else if let Some(text) = line.strip_prefix("## ") {
                Block::Paragraph(styles::H2.paragraph(runs(&styles::H2, text)))
            } else if let Some(text) = line.strip_prefix("* ") {
                // Classified before inline markers, so "* *x*" is a bullet
                // whose text starts in italics.
                Block::Paragraph(styles::LI.bullet(runs(&styles::LI, text)))
            } else {
                Block::Paragraph(styles::P.paragraph(runs(&styles::P, line)))
            }
        })
        .collect()
}

/// Read and convert a narrative file. A missing or unreadable file becomes an
/// error paragraph in the report instead of failing the request.
pub fn load(path: &Path) -> Vec<Block> {
    match std::fs::read_to_string(path) {
        Ok(source) => to_blocks(&source),
        Err(e) => {
            log::warn!("Content file {} unavailable: {e}", path.display());
            let p = &styles::P;
            vec![Block::Paragraph(p.paragraph(vec![
                p.run("Error:").bold(),
                p.run(format!(
                    " Archivo de contenido no encontrado en {}.",
                    path.display()
                )),
            ]))]
        }
    }
}
