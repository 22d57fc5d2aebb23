//! Palette, paragraph styles and table helpers shared by the section builders.

use crate::metrics::Level;
use crate::model::{
    Alignment, CellPadding, GridLines, Paragraph, Rgb, Run, Table, TableCell,
    TableRow, rgb,
};

pub const PRIMARY: Rgb = rgb(0x757575);
pub const LIGHT_GRAY: Rgb = rgb(0xFAFAFA);
pub const MEDIUM_GRAY: Rgb = rgb(0xBDBDBD);
pub const DIMENSION_ROW: Rgb = rgb(0xF0F0F0);
pub const WHITESMOKE: Rgb = rgb(0xF5F5F5);
pub const LIGHT_GREY: Rgb = rgb(0xD3D3D3);
pub const FOOTER_GREY: Rgb = rgb(0x808080);
pub const CHART_PURPLE: Rgb = rgb(0x6A1B9A);

pub fn level_color(level: Level) -> Rgb {
    match level {
        Level::Alto => rgb(0x4CAF50),
        Level::Medio => rgb(0xFFC107),
        Level::Bajo => rgb(0xF44336),
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ParagraphStyle {
    pub font_size: f32,
    pub leading: f32,
    pub bold: bool,
    pub alignment: Alignment,
    pub space_before: f32,
    pub space_after: f32,
    pub indent_left: f32,
    pub bullet_indent: f32,
    pub color: Option<Rgb>,
}

impl ParagraphStyle {
    const fn new(font_size: f32, leading: f32) -> Self {
        Self {
            font_size,
            leading,
            bold: false,
            alignment: Alignment::Left,
            space_before: 0.0,
            space_after: 0.0,
            indent_left: 0.0,
            bullet_indent: 0.0,
            color: None,
        }
    }

    pub fn run(&self, text: impl Into<String>) -> Run {
        let mut run = Run::new(text, self.font_size);
        run.bold = self.bold;
        run.color = self.color;
        run
    }

    pub fn paragraph(&self, runs: Vec<Run>) -> Paragraph {
        Paragraph {
            runs,
            alignment: self.alignment,
            leading: self.leading,
            space_before: self.space_before,
            space_after: self.space_after,
            indent_left: self.indent_left,
            bullet: None,
            bullet_indent: self.bullet_indent,
            keep_with_next: false,
        }
    }

    pub fn text(&self, text: impl Into<String>) -> Paragraph {
        self.paragraph(vec![self.run(text)])
    }

    pub fn bullet(&self, runs: Vec<Run>) -> Paragraph {
        Paragraph {
            bullet: Some("•".into()),
            ..self.paragraph(runs)
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub const fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

pub const H1: ParagraphStyle = ParagraphStyle {
    space_before: 12.0,
    space_after: 4.0,
    ..ParagraphStyle::new(12.0, 15.0).bold()
};
pub const H2: ParagraphStyle = ParagraphStyle {
    space_before: 10.0,
    space_after: 3.0,
    ..ParagraphStyle::new(11.0, 14.0).bold()
};
pub const P: ParagraphStyle = ParagraphStyle {
    space_before: 6.0,
    space_after: 6.0,
    alignment: Alignment::Justify,
    ..ParagraphStyle::new(10.0, 12.0)
};
pub const LI: ParagraphStyle = ParagraphStyle {
    space_before: 6.0,
    space_after: 4.0,
    indent_left: 20.0,
    bullet_indent: 10.0,
    ..ParagraphStyle::new(10.0, 12.0)
};
/// Institution data cells.
pub const BODY: ParagraphStyle = ParagraphStyle {
    space_before: 6.0,
    ..ParagraphStyle::new(10.0, 12.0)
};
pub const CARD_TITLE: ParagraphStyle = ParagraphStyle {
    space_after: 4.0,
    ..ParagraphStyle::new(11.0, 13.0)
};
pub const CHART_TITLE: ParagraphStyle = ParagraphStyle {
    space_after: 4.0,
    ..ParagraphStyle::new(11.0, 13.0).bold()
};
pub const TITLE: ParagraphStyle = ParagraphStyle {
    space_after: 6.0,
    ..ParagraphStyle::new(18.0, 22.0).bold()
};
pub const TABLE_TEXT: ParagraphStyle = ParagraphStyle::new(9.0, 11.0);
pub const TABLE_TEXT_CENTERED: ParagraphStyle = TABLE_TEXT.align(Alignment::Center);
pub const TABLE_HEADER: ParagraphStyle = TABLE_TEXT.bold();
pub const TABLE_HEADER_SMALL: ParagraphStyle = ParagraphStyle::new(8.0, 10.0).bold();
pub const TOC: ParagraphStyle = ParagraphStyle {
    space_after: 8.0,
    ..ParagraphStyle::new(11.0, 18.0)
};
pub const TOC_SUBSECTION: ParagraphStyle = ParagraphStyle {
    space_after: 6.0,
    indent_left: 20.0,
    ..ParagraphStyle::new(10.0, 16.0)
};

/// `"TITLE (TABLA 01)"` with the suffix two points smaller.
pub fn numbered_title(style: &ParagraphStyle, title: &str, suffix: &str) -> Paragraph {
    let mut small = style.run(format!(" {suffix}"));
    small.font_size -= 2.0;
    let mut para = style.paragraph(vec![style.run(title).bold(), small]);
    para.keep_with_next = true;
    para
}

/// Bold title with a smaller caption on the following line.
pub fn chart_title(title: &str, caption: &str) -> Paragraph {
    let style = &CHART_TITLE;
    let mut small = style.run(caption);
    small.font_size -= 2.0;
    let mut para = style.paragraph(vec![
        style.run(title),
        Run::line_break(style.font_size),
        small,
    ]);
    para.keep_with_next = true;
    para
}

pub fn cell(paragraph: Paragraph) -> TableCell {
    TableCell::new(vec![paragraph])
}

pub fn shaded(mut cell: TableCell, color: Rgb) -> TableCell {
    cell.shading = Some(color);
    cell
}

/// Grey-header data table: whitesmoke header text on the primary colour,
/// thin grid, zebra striping on even rows.
pub fn data_table(headers: &[&str], rows: Vec<Vec<TableCell>>, col_widths: Vec<f32>) -> Table {
    let header_style = TABLE_HEADER.color(WHITESMOKE);
    let mut table_rows = vec![TableRow {
        cells: headers
            .iter()
            .map(|h| shaded(cell(header_style.text(*h)), PRIMARY))
            .collect(),
        keep_with_next: false,
    }];
    for (i, cells) in rows.into_iter().enumerate() {
        let zebra = (i + 1) % 2 == 0;
        table_rows.push(TableRow {
            cells: cells
                .into_iter()
                .map(|c| {
                    if zebra && c.shading.is_none() {
                        shaded(c, LIGHT_GRAY)
                    } else {
                        c
                    }
                })
                .collect(),
            keep_with_next: false,
        });
    }
    Table {
        col_widths,
        rows: table_rows,
        padding: CellPadding::uniform(8.0, 6.0),
        grid: Some(GridLines {
            width: 0.5,
            color: MEDIUM_GRAY,
        }),
        h_align: Alignment::Left,
        header_rows: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_title_shrinks_suffix() {
        let p = numbered_title(&H2, "COMPOSICIÓN POR SEXO", "(TABLA 02)");
        assert_eq!(p.plain_text(), "COMPOSICIÓN POR SEXO (TABLA 02)");
        assert_eq!(p.runs[0].font_size, 11.0);
        assert_eq!(p.runs[1].font_size, 9.0);
        assert!(p.keep_with_next);
    }

    #[test]
    fn data_table_stripes_even_rows() {
        let rows = (0..3).map(|i| vec![cell(TABLE_TEXT.text(i.to_string()))]).collect();
        let t = data_table(&["Col"], rows, vec![100.0]);
        assert_eq!(t.rows[0].cells[0].shading, Some(PRIMARY));
        assert_eq!(t.rows[1].cells[0].shading, None);
        assert_eq!(t.rows[2].cells[0].shading, Some(LIGHT_GRAY));
        assert_eq!(t.rows[3].cells[0].shading, None);
        assert_eq!(t.header_rows, 1);
    }
}
