//! Assembles the report's block stream from a payload.

mod charts;
mod compliance;
mod cover;
mod dimension_detail;
mod subdimensions;
mod supplementary;
mod toc;

pub mod styles;

use crate::config::ReportConfig;
use crate::markdown;
use crate::metrics;
use crate::model::{Block, CM, Document, DocumentInfo, PageSetup, RunningText};
use crate::payload::{Organization, ReportData};

const INTRO_FILE: &str = "01_introduccion.md";
const FRAMEWORK_FILE: &str = "02_marco_dimensiones.md";

const FOOTER_NAME_CHARS: usize = 40;

fn document_info(org: &Organization) -> DocumentInfo {
    DocumentInfo {
        title: format!(
            "Reporte DIGEI - {}",
            org.nombre.as_deref().unwrap_or("Organización")
        ),
        author: "DIGEI - Distintivo Genera Igualdad".into(),
        subject: "Autodiagnóstico de Igualdad de Género".into(),
        creator: "Sistema DIGEI".into(),
        keywords: "género, igualdad, diagnóstico, DIGEI".into(),
    }
}

fn running_text(org: &Organization) -> RunningText {
    RunningText {
        header_left: "DIGEI · Distintivo que Genera igualdad y Convivencia Pacífica".into(),
        header_right: "AutodiagnósticoDIGEI".into(),
        header_color: styles::PRIMARY,
        header_rule_color: styles::MEDIUM_GRAY,
        footer_lines: vec![
            format!("Folio: {}", org.folio.as_deref().unwrap_or("N/A")),
            format!("Fecha: {}", org.fecha_aplicacion.as_deref().unwrap_or("N/A")),
        ],
        footer_center: org
            .nombre
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(FOOTER_NAME_CHARS)
            .collect(),
        footer_color: styles::FOOTER_GREY,
        footer_rule_color: styles::PRIMARY,
        page_label: "Página".into(),
    }
}

/// Build the full report document. Missing assets degrade to error
/// paragraphs inside the document rather than failing the build.
pub fn build_document(data: &ReportData, config: &ReportConfig) -> Document {
    let page = PageSetup::a4();
    let frame_width = page.frame_width();
    let dimensions = metrics::summarize_all(data);
    let overall = metrics::overall(data);
    let chart = &data.grafica_dimensiones;

    let mut blocks: Vec<Block> = Vec::new();
    blocks.extend(cover::cover_page(&config.logo_path()));
    blocks.extend(cover::title_page());
    blocks.extend(cover::institution_page(&data.organizacion));
    blocks.extend(toc::table_of_contents(&dimensions));

    blocks.extend(markdown::load(&config.content_path(INTRO_FILE)));
    blocks.push(Block::Spacer(1.0 * CM));
    blocks.extend(markdown::load(&config.content_path(FRAMEWORK_FILE)));
    blocks.push(Block::Spacer(1.0 * CM));

    let average = (!chart.is_empty()).then(|| metrics::gauge_value(chart));
    blocks.extend(compliance::compliance_section(&overall, frame_width, average));

    if !chart.is_empty() {
        blocks.extend(charts::bar_chart_section(chart));
        blocks.extend(charts::radar_section(chart));
    }

    if !dimensions.is_empty() {
        blocks.extend(subdimensions::subdimension_table(&dimensions));
        for dim in &dimensions {
            blocks.extend(dimension_detail::dimension_page(dim, frame_width));
        }
    }

    blocks.extend(supplementary::supplementary_section(data, frame_width));

    log::debug!(
        "Report layout: {} dimensions, {} chart entries, {} blocks, {}/{} indicators ({:.1}%)",
        dimensions.len(),
        chart.len(),
        blocks.len(),
        overall.attended,
        overall.total,
        overall.pct_vs_100,
    );

    Document {
        page,
        info: document_info(&data.organizacion),
        running: Some(running_text(&data.organizacion)),
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_truncates_long_names() {
        let org = Organization {
            nombre: Some("Instituto Tecnológico Superior de Estudios Avanzados del Norte".into()),
            ..Default::default()
        };
        let running = running_text(&org);
        assert_eq!(running.footer_center.chars().count(), 40);
        assert_eq!(running.footer_lines, ["Folio: N/A", "Fecha: N/A"]);
    }

    #[test]
    fn info_falls_back_to_generic_title() {
        let info = document_info(&Organization::default());
        assert_eq!(info.title, "Reporte DIGEI - Organización");
        assert_eq!(info.creator, "Sistema DIGEI");
    }

    #[test]
    fn empty_payload_skips_charts_and_dimensions() {
        let doc = build_document(&ReportData::default(), &ReportConfig::builtin("/nonexistent"));
        assert!(!doc.blocks.iter().any(|b| matches!(b, Block::Drawing(_))));
        let tables = doc
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::Table(_)))
            .count();
        // Institution data and the compliance cards
        assert_eq!(tables, 2);
    }
}
