//! Section VI: one detail page per dimension.

use crate::metrics::DimensionSummary;
use crate::model::{
    Alignment, Block, CM, CellPadding, CellVAlign, Drawing, GridLines, Table, TableCell,
    TableRow, TrafficLight, Widget,
};

use super::styles::{self, LIGHT_GRAY, LIGHT_GREY, cell, numbered_title, shaded};

const INTRO: &str = "Las siguientes preguntas han sido identificadas como áreas de oportunidad \
porque sus respuestas indican que aún no se han cumplido completamente (por ejemplo, fueron \
respondidas como \"No\" o \"Parcialmente\"). Estas representan puntos clave para fortalecer el \
compromiso institucional con la igualdad de género.";

const NOTHING_PENDING: &str = "No hay puntos no atendidos para esta dimensión.";

fn top(mut c: TableCell) -> TableCell {
    c.v_align = CellVAlign::Top;
    c
}

fn unattended_table(dim: &DimensionSummary, frame_width: f32) -> Table {
    let header = &styles::TABLE_HEADER;
    let text = &styles::TABLE_TEXT;

    let mut rows = Vec::new();
    for group in &dim.unattended {
        let mut title = cell(header.text(&group.subdimension));
        title.grid_span = 2;
        title.v_align = CellVAlign::Top;
        let mut title = shaded(title, LIGHT_GRAY);
        if let Some(p) = title.paragraphs.first_mut() {
            p.indent_left = 3.0;
        }
        rows.push(TableRow {
            cells: vec![title],
            keep_with_next: !group.questions.is_empty(),
        });
        for (number, question) in &group.questions {
            rows.push(TableRow {
                cells: vec![
                    top(cell(text.text(number.to_string()))),
                    top(cell(text.text(question))),
                ],
                keep_with_next: false,
            });
        }
    }

    Table {
        col_widths: vec![frame_width * 0.05, frame_width * 0.95 - 1.0 * CM],
        rows,
        padding: CellPadding::uniform(5.0, 2.0),
        grid: Some(GridLines {
            width: 1.0,
            color: LIGHT_GREY,
        }),
        h_align: Alignment::Left,
        header_rows: 0,
    }
}

pub fn dimension_page(dim: &DimensionSummary, frame_width: f32) -> Vec<Block> {
    let mut title = styles::H2.text(dim.title().to_uppercase());
    title.keep_with_next = true;

    let mut blocks = vec![
        Block::Paragraph(title),
        Block::Spacer(0.2 * CM),
        Block::Paragraph(
            styles::CHART_TITLE.text("PORCENTAJE DE INDICADORES ATENDIDOS EN LA DIMENSIÓN"),
        ),
        Block::Spacer(0.2 * CM),
        Block::Drawing(Drawing {
            widget: Widget::TrafficLight(TrafficLight {
                current: dim.pct_attended,
                red_below: 50.0,
                yellow_below: 80.0,
                unit: "%".into(),
                border: false,
            }),
            width: 7.0 * CM,
            height: 4.0 * CM,
            alignment: Alignment::Center,
        }),
        Block::Spacer(0.5 * CM),
    ];

    if dim.unattended.is_empty() {
        blocks.push(Block::Paragraph(styles::P.text(NOTHING_PENDING)));
    } else {
        let number = dim.table_number().unwrap_or_else(|| "N/A".into());
        blocks.push(Block::Paragraph(styles::P.text(INTRO)));
        blocks.push(Block::Spacer(0.2 * CM));
        blocks.push(Block::Paragraph(numbered_title(
            &styles::CHART_TITLE,
            "PREGUNTAS NO ATENDIDAS POR SUBDIMENSIÓN",
            &format!("(TABLA {number})"),
        )));
        blocks.push(Block::Spacer(0.2 * CM));
        blocks.push(Block::Table(unattended_table(dim, frame_width)));
    }

    blocks.push(Block::PageBreak);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::summarize;
    use crate::payload::{Dimension, Scalar, Subdimension, UnattendedIndicator};

    fn dim(orden: Scalar, questions: &[(&str, &str)]) -> DimensionSummary {
        summarize(
            &Dimension {
                orden: Some(orden),
                nombre: "Corresponsabilidad".into(),
                subdimensiones: questions
                    .iter()
                    .map(|(sub, q)| Subdimension {
                        nombre: sub.to_string(),
                        total_indicadores: 4.0,
                        indicadores_atendidos: 1.0,
                        indicadores_no_atendidos: vec![UnattendedIndicator {
                            texto: q.to_string(),
                        }],
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            },
            1,
        )
    }

    fn texts(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.plain_text()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn page_with_unattended_questions() {
        let blocks = dimension_page(
            &dim(Scalar::from(7), &[("Cuidados", "¿Hay lactario?"), ("Licencias", "¿Existe?")]),
            481.9,
        );
        let t = texts(&blocks);
        assert_eq!(t[0], "7. CORRESPONSABILIDAD");
        assert!(t.contains(&INTRO.to_string()));
        assert!(t.contains(&"PREGUNTAS NO ATENDIDAS POR SUBDIMENSIÓN (TABLA 7)".to_string()));

        let table = blocks
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[0].cells[0].grid_span, 2);
        assert_eq!(table.rows[0].cells[0].text(), "Cuidados");
        assert_eq!(table.rows[1].cells[0].text(), "1");
        assert_eq!(table.rows[3].cells[0].text(), "2");
        assert_eq!(table.rows[3].cells[1].text(), "¿Existe?");
        assert!(matches!(blocks.last(), Some(Block::PageBreak)));
    }

    #[test]
    fn page_without_pending_points() {
        let blocks = dimension_page(&dim(Scalar::from(2), &[]), 481.9);
        let t = texts(&blocks);
        assert_eq!(t.last().map(String::as_str), Some(NOTHING_PENDING));
        assert!(!blocks.iter().any(|b| matches!(b, Block::Table(_))));
        let light = blocks.iter().find_map(|b| match b {
            Block::Drawing(Drawing { widget: Widget::TrafficLight(tl), .. }) => Some(tl),
            _ => None,
        });
        let light = light.unwrap();
        assert_eq!((light.red_below, light.yellow_below), (50.0, 80.0));
        assert!(!light.border);
    }

    #[test]
    fn non_numeric_label_uses_na_table_number() {
        let blocks = dimension_page(&dim(Scalar::from("A"), &[("Cuidados", "¿Uno?")]), 481.9);
        assert!(
            texts(&blocks).contains(&"PREGUNTAS NO ATENDIDAS POR SUBDIMENSIÓN (TABLA N/A)".to_string())
        );
    }
}
