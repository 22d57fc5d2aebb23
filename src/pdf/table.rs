use pdf_writer::Content;

use crate::fonts::FontSet;
use crate::model::{Alignment, CellVAlign, Paragraph, Table, TableCell, TableRow};

use super::PageCursor;
use super::layout::{
    TextLine, build_paragraph_lines, first_font_size, is_text_empty, line_pitch,
    render_paragraph_lines,
};
use super::widgets::draw_widget;

struct ParagraphLayout<'t> {
    para: &'t Paragraph,
    lines: Vec<TextLine>,
    pitch: f32,
}

impl ParagraphLayout<'_> {
    fn height(&self) -> f32 {
        self.para.space_before + self.lines.len() as f32 * self.pitch + self.para.space_after
    }
}

struct CellLayout<'t> {
    x: f32,
    width: f32,
    paragraphs: Vec<ParagraphLayout<'t>>,
    content_h: f32,
}

struct RowLayout<'t> {
    height: f32,
    cells: Vec<CellLayout<'t>>,
    /// Content taller than `height`; drawing is clipped to the row box.
    clipped: bool,
}

impl RowLayout<'_> {
    /// Limit the row to `max` points so it fits on one page.
    fn clamp(&mut self, max: f32, index: usize) {
        if self.height > max {
            log::warn!(
                "Table row {index} needs {:.0}pt but a page holds {max:.0}pt, clipping",
                self.height
            );
            self.height = max;
            self.clipped = true;
        }
    }
}

fn layout_cell<'t>(
    cell: &'t TableCell,
    x: f32,
    width: f32,
    table: &Table,
    fonts: &FontSet,
) -> CellLayout<'t> {
    let pad = &table.padding;
    let text_w = (width - pad.left - pad.right).max(1.0);
    let paragraphs: Vec<ParagraphLayout> = cell
        .paragraphs
        .iter()
        .map(|para| {
            let lines = if is_text_empty(&para.runs) {
                Vec::new()
            } else {
                build_paragraph_lines(&para.runs, fonts, (text_w - para.indent_left).max(1.0))
            };
            ParagraphLayout {
                para,
                lines,
                pitch: line_pitch(para),
            }
        })
        .collect();
    let text_h: f32 = paragraphs.iter().map(ParagraphLayout::height).sum();
    let drawing_h = cell.drawing.as_ref().map_or(0.0, |d| d.height);
    CellLayout {
        x,
        width,
        paragraphs,
        content_h: text_h + drawing_h,
    }
}

fn layout_row<'t>(row: &'t TableRow, table: &Table, left: f32, fonts: &FontSet) -> RowLayout<'t> {
    let pad = &table.padding;
    let mut grid_col = 0usize;
    let mut height: f32 = 0.0;
    let cells = row
        .cells
        .iter()
        .map(|cell| {
            let span = cell.grid_span.max(1) as usize;
            let end = table.col_widths.len().min(grid_col + span);
            let start = grid_col.min(end);
            let x = left + table.col_widths[..start].iter().sum::<f32>();
            let width: f32 = table.col_widths[start..end].iter().sum();
            grid_col += span;
            let layout = layout_cell(cell, x, width, table, fonts);
            height = height.max(layout.content_h + pad.top + pad.bottom);
            layout
        })
        .collect();
    RowLayout {
        height,
        cells,
        clipped: false,
    }
}

/// Height of the header rows plus the first body row.
pub(super) fn table_lead_height(table: &Table, fonts: &FontSet) -> f32 {
    let take = (table.header_rows + 1).min(table.rows.len());
    table.rows[..take]
        .iter()
        .map(|row| layout_row(row, table, 0.0, fonts).height)
        .sum()
}

fn fill_rect(content: &mut Content, [r, g, b]: [u8; 3], x: f32, y: f32, w: f32, h: f32) {
    content.save_state();
    content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    content.rect(x, y, w, h);
    content.fill_nonzero();
    content.restore_state();
}

fn draw_row(
    content: &mut Content,
    row: &TableRow,
    layout: &RowLayout,
    table: &Table,
    top: f32,
    fonts: &FontSet,
) {
    let pad = &table.padding;
    let bottom = top - layout.height;

    if layout.clipped {
        let x0 = layout.cells.first().map_or(0.0, |c| c.x);
        let x1 = layout.cells.last().map_or(x0, |c| c.x + c.width);
        content.save_state();
        content.rect(x0, bottom, x1 - x0, layout.height);
        content.clip_nonzero();
        content.end_path();
    }

    for (cell, cl) in row.cells.iter().zip(&layout.cells) {
        if let Some(shade) = cell.shading {
            fill_rect(content, shade, cl.x, bottom, cl.width, layout.height);
        }

        let avail = layout.height - pad.top - pad.bottom;
        let mut y = match cell.v_align {
            CellVAlign::Top => top - pad.top,
            CellVAlign::Middle => top - pad.top - ((avail - cl.content_h) / 2.0).max(0.0),
        };

        for pl in &cl.paragraphs {
            y -= pl.para.space_before;
            if !pl.lines.is_empty() {
                let font_size = first_font_size(pl.para);
                let baseline = y - pl.pitch * 0.5 - font_size * 0.3;
                render_paragraph_lines(
                    content,
                    &pl.lines,
                    pl.para.alignment,
                    cl.x + pad.left + pl.para.indent_left,
                    (cl.width - pad.left - pad.right - pl.para.indent_left).max(1.0),
                    baseline,
                    pl.pitch,
                    true,
                    fonts,
                );
            }
            y -= pl.lines.len() as f32 * pl.pitch + pl.para.space_after;
        }

        if let Some(drawing) = &cell.drawing {
            let inner_w = cl.width - pad.left - pad.right;
            let x = match drawing.alignment {
                Alignment::Center => cl.x + pad.left + (inner_w - drawing.width) / 2.0,
                Alignment::Left | Alignment::Justify => cl.x + pad.left,
            };
            draw_widget(content, fonts, drawing, x, y - drawing.height);
        }
    }

    if layout.clipped {
        content.restore_state();
    }

    if let Some(grid) = table.grid {
        let [r, g, b] = grid.color;
        content.save_state();
        content.set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        content.set_line_width(grid.width);
        for cl in &layout.cells {
            content.rect(cl.x, bottom, cl.width, layout.height);
        }
        content.stroke();
        content.restore_state();
    }
}

/// Place a table in the flow, breaking between rows. Header rows repeat on
/// every continuation page and rows chained with `keep_with_next` move together.
pub(super) fn render_table(table: &Table, cursor: &mut PageCursor, fonts: &FontSet) {
    let setup = cursor.setup;
    let total_w: f32 = table.col_widths.iter().sum();
    let left = match table.h_align {
        Alignment::Center => setup.margin_left + (setup.frame_width() - total_w) / 2.0,
        Alignment::Left | Alignment::Justify => setup.margin_left,
    };

    let mut layouts: Vec<RowLayout> = table
        .rows
        .iter()
        .map(|row| layout_row(row, table, left, fonts))
        .collect();
    let header_count = table.header_rows.min(table.rows.len());
    let frame_h = cursor.frame_height();
    for (i, layout) in layouts[..header_count].iter_mut().enumerate() {
        layout.clamp(frame_h / 2.0, i);
    }
    let header_h: f32 = layouts[..header_count].iter().map(|l| l.height).sum();
    let body_max = (frame_h - header_h).max(frame_h / 2.0);
    for (i, layout) in layouts.iter_mut().enumerate().skip(header_count) {
        layout.clamp(body_max, i);
    }

    // Height of the run of rows starting at `i` that must stay together
    let chain_height = |i: usize| -> f32 {
        let mut h = layouts[i].height;
        let mut j = i;
        while j + 1 < table.rows.len() && table.rows[j].keep_with_next {
            j += 1;
            h += layouts[j].height;
        }
        h
    };

    for (i, (row, layout)) in table.rows.iter().zip(&layouts).enumerate() {
        let is_header = i < header_count;
        let mut need = chain_height(i);
        if i + 1 == header_count {
            // Keep the header with the first body row
            need += layouts.get(header_count).map_or(0.0, |l| l.height);
        }
        if need > frame_h - header_h {
            need = layout.height;
        }

        if cursor.touched && need > cursor.remaining() {
            cursor.new_page();
            if !is_header {
                for (hrow, hlayout) in table.rows[..header_count].iter().zip(&layouts) {
                    let top = cursor.y;
                    draw_row(&mut cursor.content, hrow, hlayout, table, top, fonts);
                    cursor.advance(hlayout.height);
                }
            }
        }

        let top = cursor.y;
        draw_row(&mut cursor.content, row, layout, table, top, fonts);
        cursor.advance(layout.height);
    }
}
