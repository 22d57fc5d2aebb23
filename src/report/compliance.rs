//! Section II: overall compliance cards and the average gauge.

use crate::metrics::Overall;
use crate::model::{
    Alignment, Block, CM, CellPadding, CellVAlign, Drawing, Gauge, Table, TableCell, TableRow,
    TrafficLight, Widget,
};

use super::styles::{self, cell};

const CARD_HEIGHT: f32 = 6.0 * CM;

fn card(current: f64, width: f32) -> TableCell {
    let mut c = TableCell::drawing(Drawing {
        widget: Widget::TrafficLight(TrafficLight {
            current,
            red_below: 40.0,
            yellow_below: 70.0,
            unit: "%".into(),
            border: true,
        }),
        width,
        height: CARD_HEIGHT,
        alignment: Alignment::Left,
    });
    c.v_align = CellVAlign::Top;
    c
}

fn card_title(text: &str) -> TableCell {
    let style = &styles::CARD_TITLE;
    let mut para = style.paragraph(vec![style.run(text).bold()]);
    para.space_after = 6.0;
    let mut c = cell(para);
    c.v_align = CellVAlign::Top;
    c
}

/// Two traffic-light cards (vs 100 % and vs 80 %) and, when chart data is
/// available, the gauge with the average dimension percentage.
pub fn compliance_section(overall: &Overall, frame_width: f32, average: Option<f64>) -> Vec<Block> {
    let card_w = frame_width * 0.45;
    let gap_w = frame_width * 0.1;

    let table = Table {
        col_widths: vec![card_w, gap_w, card_w],
        rows: vec![
            TableRow {
                cells: vec![
                    card_title("PORCENTAJE DE INDICADORES ATENDIDOS RESPECTO AL 100% DE INDICADORES"),
                    TableCell::empty(),
                    card_title("PORCENTAJE DE INDICADORES ATENDIDOS RESPECTO AL 80% DE INDICADORES"),
                ],
                keep_with_next: true,
            },
            TableRow {
                cells: vec![
                    card(overall.pct_vs_100, card_w),
                    TableCell::empty(),
                    card(overall.pct_vs_80, card_w),
                ],
                keep_with_next: false,
            },
        ],
        padding: CellPadding {
            left: 0.0,
            right: 0.0,
            ..CellPadding::default()
        },
        grid: None,
        h_align: Alignment::Left,
        header_rows: 0,
    };

    let mut blocks = vec![
        Block::Spacer(1.0 * CM),
        Block::Paragraph(styles::H2.text("INDICADORES DE NIVEL DE CUMPLIMIENTO")),
        Block::Spacer(0.5 * CM),
        Block::Table(table),
    ];

    if let Some(value) = average {
        blocks.push(Block::Spacer(0.5 * CM));
        blocks.push(Block::Paragraph(styles::chart_title(
            "PROMEDIO DE CUMPLIMIENTO POR DIMENSIÓN",
            "(INDICADOR GLOBAL)",
        )));
        blocks.push(Block::Drawing(Drawing {
            widget: Widget::Gauge(Gauge { value }),
            width: 10.0 * CM,
            height: 6.5 * CM,
            alignment: Alignment::Center,
        }));
    }

    blocks.push(Block::PageBreak);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overall() -> Overall {
        Overall {
            total: 100.0,
            attended: 75.0,
            pct_vs_100: 75.0,
            pct_vs_80: 93.75,
        }
    }

    #[test]
    fn cards_carry_both_percentages() {
        let blocks = compliance_section(&overall(), 481.9, None);
        let Block::Table(t) = &blocks[3] else { panic!("table") };
        let values: Vec<f64> = t.rows[1]
            .cells
            .iter()
            .filter_map(|c| match c.drawing.as_ref().map(|d| &d.widget) {
                Some(Widget::TrafficLight(tl)) => Some(tl.current),
                _ => None,
            })
            .collect();
        assert_eq!(values, [75.0, 93.75]);
        assert!(t.rows[0].keep_with_next);
        assert!(!blocks.iter().any(|b| matches!(b, Block::Drawing(_))));
        assert!(matches!(blocks.last(), Some(Block::PageBreak)));
    }

    #[test]
    fn gauge_follows_cards_when_average_given() {
        let blocks = compliance_section(&overall(), 481.9, Some(62.5));
        let gauge = blocks.iter().find_map(|b| match b {
            Block::Drawing(Drawing { widget: Widget::Gauge(g), .. }) => Some(g.value),
            _ => None,
        });
        assert_eq!(gauge, Some(62.5));
    }
}
