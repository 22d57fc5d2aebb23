//! Section V: one table with every subdimension grouped under its dimension.

use crate::metrics::{DimensionSummary, format_count};
use crate::model::{Alignment, Block, CM, CellPadding, GridLines, Run, Table, TableCell, TableRow};

use super::styles::{
    self, DIMENSION_ROW, LIGHT_GRAY, MEDIUM_GRAY, PRIMARY, WHITESMOKE, cell, level_color,
    numbered_title, shaded,
};

const COL_WIDTHS_CM: [f32; 7] = [1.5, 6.0, 2.0, 2.0, 1.5, 1.5, 2.0];

const DESCRIPTION: &str =
    "La siguiente tabla muestra el nivel de cumplimiento por dimensión y subdimensión";

fn header_row() -> TableRow {
    let style = styles::TABLE_HEADER_SMALL.color(WHITESMOKE);
    let header = |lines: &[&str]| {
        let mut runs = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                runs.push(Run::line_break(style.font_size));
            }
            runs.push(style.run(*line));
        }
        let mut para = style.paragraph(runs);
        para.alignment = Alignment::Center;
        shaded(cell(para), PRIMARY)
    };
    TableRow {
        cells: vec![
            header(&["ID"]),
            header(&["Subdimensión"]),
            header(&["Indicadores", "(Total)"]),
            header(&["Indicadores", "(Atendidos)"]),
            header(&["% vs", "100"]),
            header(&["% vs", "80"]),
            header(&["Semáforo"]),
        ],
        keep_with_next: false,
    }
}

pub fn subdimension_table(dimensions: &[DimensionSummary]) -> Vec<Block> {
    let text = &styles::TABLE_TEXT;
    let centered = &styles::TABLE_TEXT_CENTERED;

    let mut rows = vec![header_row()];
    for dim in dimensions {
        let mut title = cell(text.paragraph(vec![text.run(dim.title()).bold()]));
        title.grid_span = COL_WIDTHS_CM.len() as u16;
        rows.push(TableRow {
            cells: vec![shaded(title, DIMENSION_ROW)],
            keep_with_next: !dim.rows.is_empty(),
        });

        let count = dim.rows.len();
        for (k, sub) in dim.rows.iter().enumerate() {
            let zebra = rows.len() % 2 == 0;
            let stripe = |c: TableCell| if zebra { shaded(c, LIGHT_GRAY) } else { c };
            rows.push(TableRow {
                cells: vec![
                    stripe(cell(centered.text(&sub.id))),
                    stripe(cell(text.text(&sub.nombre))),
                    stripe(cell(centered.text(format_count(sub.total)))),
                    stripe(cell(centered.text(format_count(sub.attended)))),
                    stripe(cell(centered.text(format!("{:.1}%", sub.pct_vs_100)))),
                    stripe(cell(centered.text(format!("{:.1}%", sub.pct_vs_80)))),
                    shaded(cell(centered.text(sub.level.label())), level_color(sub.level)),
                ],
                // The dimension group stays on one page
                keep_with_next: k + 1 < count,
            });
        }
    }

    let table = Table {
        col_widths: COL_WIDTHS_CM.iter().map(|w| w * CM).collect(),
        rows,
        padding: CellPadding::uniform(8.0, 6.0),
        grid: Some(GridLines {
            width: 0.5,
            color: MEDIUM_GRAY,
        }),
        h_align: Alignment::Left,
        header_rows: 1,
    };

    vec![
        Block::Spacer(1.0 * CM),
        Block::Paragraph(numbered_title(
            &styles::H2,
            "SUBDIMENSIONES POR DIMENSIÓN",
            "(TABLA 01)",
        )),
        Block::Paragraph(styles::P.text(DESCRIPTION)),
        Block::Spacer(0.25 * CM),
        Block::Table(table),
        Block::PageBreak,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Level, summarize};
    use crate::payload::{Dimension, Scalar, Subdimension};

    fn dimension(orden: i64, subs: &[(&str, &str)]) -> DimensionSummary {
        summarize(
            &Dimension {
                orden: Some(Scalar::from(orden)),
                nombre: format!("Dimensión {orden}"),
                subdimensiones: subs
                    .iter()
                    .map(|(nombre, semaforo)| Subdimension {
                        nombre: nombre.to_string(),
                        total_indicadores: 8.0,
                        indicadores_atendidos: 6.0,
                        porcentaje: 75.0,
                        meta_80: Some(6.0),
                        semaforo: Some(semaforo.to_string()),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            },
            1,
        )
    }

    fn table(blocks: &[Block]) -> &Table {
        blocks
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn dimension_rows_span_and_keep_with_group() {
        let blocks = subdimension_table(&[
            dimension(1, &[("Cultura", "alto"), ("Lenguaje", "medio")]),
            dimension(2, &[("Acoso", "otro")]),
        ]);
        let t = table(&blocks);
        assert_eq!(t.rows.len(), 1 + 3 + 2);
        assert_eq!(t.header_rows, 1);

        let dim_row = &t.rows[1];
        assert_eq!(dim_row.cells.len(), 1);
        assert_eq!(dim_row.cells[0].grid_span, 7);
        assert_eq!(dim_row.cells[0].text(), "1. Dimensión 1");
        assert_eq!(dim_row.cells[0].shading, Some(DIMENSION_ROW));
        assert!(dim_row.keep_with_next);
        assert!(t.rows[2].keep_with_next);
        assert!(!t.rows[3].keep_with_next);

        let first = &t.rows[2];
        assert_eq!(first.cells[0].text(), "1.1");
        assert_eq!(first.cells[2].text(), "8");
        assert_eq!(first.cells[4].text(), "75.0%");
        assert_eq!(first.cells[5].text(), "100.0%");
        assert_eq!(first.cells[6].text(), "Alto");
        assert_eq!(first.cells[6].shading, Some(level_color(Level::Alto)));

        let unknown = &t.rows[5];
        assert_eq!(unknown.cells[6].text(), "Bajo");
    }

    #[test]
    fn zebra_counts_header_and_dimension_rows() {
        let blocks = subdimension_table(&[dimension(1, &[("a", "alto"), ("b", "alto")])]);
        let t = table(&blocks);
        // Row 2 is even and striped, row 3 is not
        assert_eq!(t.rows[2].cells[0].shading, Some(LIGHT_GRAY));
        assert_eq!(t.rows[3].cells[0].shading, None);
        assert_ne!(t.rows[2].cells[6].shading, Some(LIGHT_GRAY));
    }

    #[test]
    fn header_has_seven_columns() {
        let blocks = subdimension_table(&[]);
        let t = table(&blocks);
        assert_eq!(t.rows[0].cells.len(), 7);
        assert_eq!(t.rows[0].cells[2].text(), "Indicadores\n(Total)");
    }
}
