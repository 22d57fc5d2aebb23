use pdf_writer::{Content, Name, Str};

use crate::fonts::FontSet;
use crate::model::{Alignment, FontStyle, Paragraph, Rgb, Run};

pub(super) struct WordChunk {
    pub(super) style: FontStyle,
    pub(super) text: String,
    pub(super) font_size: f32,
    pub(super) color: Option<Rgb>,
    pub(super) x_offset: f32, // x relative to line start
    pub(super) width: f32,
}

pub(super) struct TextLine {
    pub(super) chunks: Vec<WordChunk>,
    pub(super) total_width: f32,
    /// Ends with a forced break (never stretched when justifying).
    pub(super) hard_break: bool,
}

/// True when a paragraph has no visible text.
pub(super) fn is_text_empty(runs: &[Run]) -> bool {
    runs.iter().all(|r| r.line_break || r.text.trim().is_empty())
}

/// Greedy line filler shared by every run of a paragraph.
struct LineBreaker {
    lines: Vec<TextLine>,
    chunks: Vec<WordChunk>,
    pen: f32,
    max_width: f32,
}

impl LineBreaker {
    fn break_line(&mut self, hard_break: bool) {
        let total_width = self.chunks.last().map_or(0.0, |c| c.x_offset + c.width);
        self.lines.push(TextLine {
            chunks: std::mem::take(&mut self.chunks),
            total_width,
            hard_break,
        });
        self.pen = 0.0;
    }

    /// Place a word, preceded by `gap` when it is not the first on its line.
    fn place(&mut self, mut chunk: WordChunk, gap: f32) {
        if !self.chunks.is_empty() {
            if self.pen + gap + chunk.width > self.max_width {
                self.break_line(false);
            } else {
                self.pen += gap;
            }
        }
        chunk.x_offset = self.pen;
        self.pen += chunk.width;
        self.chunks.push(chunk);
    }

    fn finish(mut self) -> Vec<TextLine> {
        if !self.chunks.is_empty() || self.lines.is_empty() {
            self.break_line(false);
        }
        self.lines
    }
}

/// Layout runs into wrapped lines.
/// No space is inserted between runs unless the preceding text ended with
/// whitespace or the new run starts with whitespace ("**62**%" stays "62%").
pub(super) fn build_paragraph_lines(
    runs: &[Run],
    fonts: &FontSet,
    max_width: f32,
) -> Vec<TextLine> {
    let mut breaker = LineBreaker {
        lines: Vec::new(),
        chunks: Vec::new(),
        pen: 0.0,
        max_width,
    };
    // Gap owed before the next run's first word, sized in the previous run's font.
    let mut pending_gap: Option<f32> = None;

    for run in runs {
        if run.line_break {
            breaker.break_line(true);
            pending_gap = None;
            continue;
        }

        let entry = fonts.get(run.style());
        let space = entry.space_width(run.font_size);
        let leading_ws = run.text.starts_with(char::is_whitespace);

        for (i, word) in run.text.split_whitespace().enumerate() {
            let gap = if i > 0 || leading_ws {
                space
            } else {
                pending_gap.unwrap_or(0.0)
            };
            let chunk = WordChunk {
                style: run.style(),
                text: word.to_string(),
                font_size: run.font_size,
                color: run.color,
                x_offset: 0.0,
                width: entry.word_width(word, run.font_size),
            };
            breaker.place(chunk, gap);
        }

        pending_gap = run.text.ends_with(char::is_whitespace).then_some(space);
    }

    breaker.finish()
}

/// Vertical distance between consecutive baselines of a paragraph.
pub(super) fn line_pitch(para: &Paragraph) -> f32 {
    let tallest = para
        .runs
        .iter()
        .map(|r| r.font_size)
        .fold(0.0f32, f32::max);
    para.leading.max(tallest * 1.15)
}

/// Largest font size in the paragraph, used to place the first baseline.
pub(super) fn first_font_size(para: &Paragraph) -> f32 {
    para.runs
        .iter()
        .map(|r| r.font_size)
        .fold(0.0f32, f32::max)
        .max(1.0)
}

fn set_fill(content: &mut Content, color: Option<Rgb>) {
    match color {
        Some([r, g, b]) => {
            content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        }
        None => {
            content.set_fill_gray(0.0);
        }
    }
}

/// Render pre-built lines applying the paragraph alignment.
/// `is_last_slice` marks the slice holding the paragraph's final line, which
/// stays left-aligned when justifying.
pub(super) fn render_paragraph_lines(
    content: &mut Content,
    lines: &[TextLine],
    alignment: Alignment,
    x: f32,
    width: f32,
    first_baseline_y: f32,
    pitch: f32,
    is_last_slice: bool,
    fonts: &FontSet,
) {
    let mut current_color: Option<Option<Rgb>> = None;
    let mut cur_font: Option<(FontStyle, f32)> = None;

    for (line_num, line) in lines.iter().enumerate() {
        if line.chunks.is_empty() {
            continue;
        }
        let y = first_baseline_y - line_num as f32 * pitch;
        let is_final = is_last_slice && line_num + 1 == lines.len();

        let is_justified = alignment == Alignment::Justify
            && !is_final
            && !line.hard_break
            && line.chunks.len() > 1;

        let line_start_x = match alignment {
            Alignment::Center => x + (width - line.total_width) / 2.0,
            Alignment::Left | Alignment::Justify => x,
        };

        let extra_per_gap = if is_justified {
            (width - line.total_width).max(0.0) / (line.chunks.len() - 1) as f32
        } else {
            0.0
        };

        content.begin_text();
        let mut td_x = 0.0_f32;
        let mut td_y = 0.0_f32;
        for (chunk_idx, chunk) in line.chunks.iter().enumerate() {
            let cx = line_start_x + chunk.x_offset + chunk_idx as f32 * extra_per_gap;

            if current_color != Some(chunk.color) {
                set_fill(content, chunk.color);
                current_color = Some(chunk.color);
            }

            if cur_font != Some((chunk.style, chunk.font_size)) {
                let entry = fonts.get(chunk.style);
                content.set_font(Name(entry.pdf_name.as_bytes()), chunk.font_size);
                cur_font = Some((chunk.style, chunk.font_size));
            }

            content.next_line(cx - td_x, y - td_y);
            td_x = cx;
            td_y = y;

            let bytes = fonts.get(chunk.style).encode(&chunk.text);
            content.show(Str(&bytes));
        }
        content.end_text();
    }
    if matches!(current_color, Some(Some(_))) {
        content.set_fill_gray(0.0);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Anchor {
    Start,
    Middle,
    End,
}

/// Draw a single unwrapped line of text with its baseline at `y`.
pub(crate) fn draw_text(
    content: &mut Content,
    fonts: &FontSet,
    style: FontStyle,
    font_size: f32,
    color: Option<Rgb>,
    x: f32,
    y: f32,
    anchor: Anchor,
    text: &str,
) {
    if text.is_empty() {
        return;
    }
    let entry = fonts.get(style);
    let w = entry.word_width(text, font_size);
    let start_x = match anchor {
        Anchor::Start => x,
        Anchor::Middle => x - w / 2.0,
        Anchor::End => x - w,
    };
    content.save_state();
    set_fill(content, color);
    content
        .begin_text()
        .set_font(Name(entry.pdf_name.as_bytes()), font_size)
        .next_line(start_x, y)
        .show(Str(&entry.encode(text)))
        .end_text();
    content.restore_state();
}
