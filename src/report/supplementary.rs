//! Section VII: complementary data tables. Each table is emitted only when
//! the payload carries its data.

use crate::metrics::format_currency;
use crate::model::{Block, CM, CellVAlign, TableCell};
use crate::payload::{Attentions, Complaints, ReportData, SalaryGap, SexComposition};

use super::styles::{self, cell, data_table, numbered_title};

fn left(text: impl Into<String>) -> TableCell {
    cell(styles::TABLE_TEXT.text(text))
}

fn centered(text: impl Into<String>) -> TableCell {
    cell(styles::TABLE_TEXT_CENTERED.text(text))
}

fn title(text: &str, number: &str) -> [Block; 2] {
    [
        Block::Paragraph(numbered_title(
            &styles::CHART_TITLE,
            text,
            &format!("(TABLA {number})"),
        )),
        Block::Spacer(0.2 * CM),
    ]
}

fn composition(items: &[SexComposition], w: f32) -> Vec<Block> {
    let rows = items
        .iter()
        .map(|item| {
            let descripcion = item
                .descripcion
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("N/A");
            let mut cells = vec![
                left(item.pregunta_texto.as_deref().unwrap_or("N/A")),
                left(descripcion),
                centered(item.cantidad_mujeres.to_string()),
                centered(item.cantidad_hombres.to_string()),
                centered(item.diferencia.to_string()),
            ];
            for c in &mut cells {
                c.v_align = CellVAlign::Top;
            }
            cells
        })
        .collect();
    let mut table = data_table(
        &["Pregunta", "Descripción", "Mujeres", "Hombres", "Diferencia"],
        rows,
        vec![w * 0.25, w * 0.25, w * 0.15, w * 0.15, w * 0.1],
    );
    for c in &mut table.rows[0].cells {
        c.v_align = CellVAlign::Top;
    }

    let mut blocks = title("COMPOSICIÓN POR SEXO", "02").to_vec();
    blocks.push(Block::Table(table));
    blocks.push(Block::PageBreak);
    blocks
}

fn salaries(items: &[SalaryGap], w: f32) -> Vec<Block> {
    let rows = items
        .iter()
        .map(|item| {
            vec![
                left(item.categoria_nombre.as_deref().unwrap_or("N/A")),
                centered(format_currency(item.cantidad_hombres)),
                centered(format_currency(item.cantidad_mujeres)),
                centered(format_currency(item.diferencia)),
            ]
        })
        .collect();
    let table = data_table(
        &["Categoría", "Hombres", "Mujeres", "Diferencia"],
        rows,
        vec![w * 0.4, w * 0.2, w * 0.2, w * 0.15],
    );

    let mut blocks = title("BRECHA SALARIAL POR CATEGORÍA", "03").to_vec();
    blocks.push(Block::Table(table));
    blocks.push(Block::PageBreak);
    blocks
}

fn complaints(quejas: &Complaints, w: f32) -> Vec<Block> {
    let rows = quejas
        .rows()
        .into_iter()
        .map(|(label, mujeres, hombres)| {
            vec![
                left(label),
                centered(mujeres.to_string()),
                centered(hombres.to_string()),
            ]
        })
        .collect();
    let table = data_table(
        &["Tipo de Queja", "Mujeres", "Hombres"],
        rows,
        vec![w * 0.5, w * 0.2, w * 0.2],
    );

    let mut blocks = title("QUEJAS DE ACOSO Y HOSTIGAMIENTO", "04").to_vec();
    blocks.push(Block::Table(table));
    blocks.push(Block::Spacer(0.5 * CM));
    blocks
}

fn attentions(atenciones: &Attentions, w: f32) -> Vec<Block> {
    let rows = atenciones
        .rows()
        .into_iter()
        .map(|(label, count)| vec![left(label), centered(count.to_string())])
        .collect();
    let table = data_table(
        &["Tipo de Atención", "Cantidad"],
        rows,
        vec![w * 0.6, w * 0.3],
    );

    let mut blocks = title("ATENCIONES A MUJERES", "05").to_vec();
    blocks.push(Block::Table(table));
    blocks.push(Block::Spacer(1.0 * CM));
    blocks
}

pub fn supplementary_section(data: &ReportData, frame_width: f32) -> Vec<Block> {
    let mut heading = styles::H1.text("DATOS COMPLEMENTARIOS");
    heading.keep_with_next = true;
    let mut blocks = vec![
        Block::Spacer(1.0 * CM),
        Block::Paragraph(heading),
        Block::Spacer(0.5 * CM),
    ];

    if let Some(items) = data.composicion_sexo.as_deref().filter(|v| !v.is_empty()) {
        blocks.extend(composition(items, frame_width));
    }
    if let Some(items) = data.salarios.as_deref().filter(|v| !v.is_empty()) {
        blocks.extend(salaries(items, frame_width));
    }
    if let Some(quejas) = data.quejas.as_ref().filter(|q| !q.is_empty()) {
        blocks.extend(complaints(quejas, frame_width));
    }
    if let Some(atenciones) = data.atenciones.as_ref().filter(|a| !a.is_empty()) {
        blocks.extend(attentions(atenciones, frame_width));
    }

    blocks.push(Block::PageBreak);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;
    use crate::payload::Scalar;

    const W: f32 = 481.9;

    fn tables(blocks: &[Block]) -> Vec<&Table> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn titles(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.plain_text()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_payload_only_has_heading() {
        let blocks = supplementary_section(&ReportData::default(), W);
        assert!(tables(&blocks).is_empty());
        assert_eq!(titles(&blocks), ["DATOS COMPLEMENTARIOS"]);
        assert!(matches!(blocks.last(), Some(Block::PageBreak)));
    }

    #[test]
    fn salary_rows_are_currency_formatted() {
        let data = ReportData {
            salarios: Some(vec![SalaryGap {
                categoria_nombre: Some("Docentes".into()),
                cantidad_hombres: 15000.0,
                cantidad_mujeres: 14050.5,
                diferencia: -950.0,
            }]),
            ..Default::default()
        };
        let blocks = supplementary_section(&data, W);
        let t = tables(&blocks)[0];
        let row: Vec<String> = t.rows[1].cells.iter().map(TableCell::text).collect();
        assert_eq!(row, ["Docentes", "$15,000.00", "$14,050.50", "$-950.00"]);
        assert!(titles(&blocks).contains(&"BRECHA SALARIAL POR CATEGORÍA (TABLA 03)".to_string()));
    }

    #[test]
    fn composition_defaults_missing_description() {
        let data = ReportData {
            composicion_sexo: Some(vec![SexComposition {
                pregunta_texto: Some("Personal docente".into()),
                descripcion: Some(String::new()),
                cantidad_mujeres: Scalar::from(40),
                cantidad_hombres: Scalar::from(35),
                diferencia: Scalar::from(5),
            }]),
            ..Default::default()
        };
        let blocks = supplementary_section(&data, W);
        let t = tables(&blocks)[0];
        assert_eq!(t.rows[0].cells.len(), 5);
        assert_eq!(t.rows[1].cells[1].text(), "N/A");
        assert_eq!(t.rows[1].cells[4].text(), "5");
    }

    #[test]
    fn complaints_and_attentions_share_a_page() {
        let data = ReportData {
            quejas: Some(Complaints {
                quejas_estudiantes_resueltas_hombres: Some(Scalar::from(2)),
                ..Default::default()
            }),
            atenciones: Some(Attentions {
                atencion_estudiantes: Some(Scalar::from(9)),
                ..Default::default()
            }),
            ..Default::default()
        };
        let blocks = supplementary_section(&data, W);
        let t = tables(&blocks);
        assert_eq!(t.len(), 2);
        assert_eq!(t[0].rows.len(), 5);
        assert_eq!(t[0].rows[4].cells[2].text(), "2");
        assert_eq!(t[1].rows[3].cells[1].text(), "9");
        let breaks = blocks.iter().filter(|b| matches!(b, Block::PageBreak)).count();
        assert_eq!(breaks, 1);
    }

    #[test]
    fn all_null_complaints_are_skipped() {
        let data = ReportData {
            quejas: Some(Complaints::default()),
            ..Default::default()
        };
        assert!(tables(&supplementary_section(&data, W)).is_empty());
    }
}
