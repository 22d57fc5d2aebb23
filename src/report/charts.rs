//! Sections III and IV: dimension bar chart and radar overview.

use crate::model::{Alignment, BarChart, Block, CM, Drawing, RadarChart, Widget};
use crate::payload::ChartEntry;

use super::styles::{self, CHART_PURPLE, PRIMARY};

/// Axis names of the nine DIGEI dimensions, in payload order.
pub const DIMENSION_SHORT_NAMES: [&str; 9] = [
    "Formación",
    "Investigación",
    "Comunicación",
    "Participación",
    "Condiciones Lab.",
    "Acoso/Violencia",
    "Corresponsabilidad",
    "Institucionalidad",
    "Infraestructura",
];

const RADAR_AXES: usize = DIMENSION_SHORT_NAMES.len();

fn bar_label(i: usize, entry: &ChartEntry) -> String {
    match DIMENSION_SHORT_NAMES.get(i) {
        Some(short) => format!("Dim {} - {short}", i + 1),
        None => {
            let name: String = entry.dimension_nombre.chars().take(20).collect();
            format!("Dim {} - {name}", i + 1)
        }
    }
}

pub fn bar_chart_section(chart: &[ChartEntry]) -> Vec<Block> {
    let widget = BarChart {
        values: chart.iter().map(|c| c.porcentaje).collect(),
        labels: chart.iter().enumerate().map(|(i, c)| bar_label(i, c)).collect(),
        value_max: 110.0,
        value_step: 10.0,
        target: Some(80.0),
        bar_color: CHART_PURPLE,
    };
    vec![
        Block::Paragraph(styles::chart_title(
            "PORCENTAJE DE INDICADORES ATENDIDOS POR DIMENSIÓN",
            "(GRÁFICA 01)",
        )),
        Block::Spacer(0.5 * CM),
        Block::Drawing(Drawing {
            widget: Widget::BarChart(widget),
            width: 17.0 * CM,
            height: 11.0 * CM,
            alignment: Alignment::Left,
        }),
        Block::PageBreak,
    ]
}

pub fn radar_section(chart: &[ChartEntry]) -> Vec<Block> {
    let mut values: Vec<f64> = chart.iter().take(RADAR_AXES).map(|c| c.porcentaje).collect();
    values.resize(RADAR_AXES, 0.0);

    let widget = RadarChart {
        values,
        labels: DIMENSION_SHORT_NAMES.iter().map(|s| s.to_string()).collect(),
        value_max: 100.0,
        fill: CHART_PURPLE,
        fill_alpha: 0.25,
        stroke: PRIMARY,
    };
    vec![
        Block::Spacer(1.0 * CM),
        Block::Paragraph(styles::chart_title(
            "PANORAMA GENERAL POR DIMENSIÓN",
            "(GRÁFICA DE RADAR)",
        )),
        Block::Spacer(0.2 * CM),
        Block::Paragraph(styles::P.text(
            "Esta gráfica muestra el porcentaje de cumplimiento en cada una de las 9 dimensiones evaluadas.",
        )),
        Block::Spacer(0.5 * CM),
        Block::Drawing(Drawing {
            widget: Widget::Radar(widget),
            width: 15.0 * CM,
            height: 15.0 * CM,
            alignment: Alignment::Left,
        }),
        Block::PageBreak,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<ChartEntry> {
        (0..n)
            .map(|i| ChartEntry {
                dimension_nombre: format!("Dimensión número {}", i + 1),
                porcentaje: 10.0 * (i + 1) as f64,
            })
            .collect()
    }

    fn drawing(blocks: &[Block]) -> &Widget {
        blocks
            .iter()
            .find_map(|b| match b {
                Block::Drawing(d) => Some(&d.widget),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn bars_use_short_names_then_payload_names() {
        let blocks = bar_chart_section(&entries(10));
        let Widget::BarChart(c) = drawing(&blocks) else { panic!("bar chart") };
        assert_eq!(c.labels[0], "Dim 1 - Formación");
        assert_eq!(c.labels[8], "Dim 9 - Infraestructura");
        assert_eq!(c.labels[9], "Dim 10 - Dimensión número 10");
        assert_eq!(c.values[2], 30.0);
        assert_eq!(c.target, Some(80.0));
    }

    #[test]
    fn radar_always_has_nine_axes() {
        let short = radar_section(&entries(4));
        let Widget::Radar(r) = drawing(&short) else { panic!("radar") };
        assert_eq!(r.values, [10.0, 20.0, 30.0, 40.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let long = radar_section(&entries(12));
        let Widget::Radar(r) = drawing(&long) else { panic!("radar") };
        assert_eq!(r.values.len(), 9);
        assert_eq!(r.values[8], 90.0);
        assert_eq!(r.labels.len(), 9);
    }
}
