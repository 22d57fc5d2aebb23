mod config;
mod error;
mod fonts;
mod markdown;
mod metrics;
mod model;
mod payload;
mod pdf;
mod report;
#[cfg(feature = "server")]
pub mod server;

pub use config::{DEFAULT_FONT_FAMILY, ReportConfig};
pub use error::Error;
pub use payload::{
    Attentions, ChartEntry, Complaints, Dimension, Organization, ReportData, SalaryGap, Scalar,
    SexComposition, Subdimension, UnattendedIndicator,
};

use std::path::Path;
use std::time::Instant;

/// Render a parsed payload to PDF bytes.
pub fn render_report(data: &ReportData, config: &ReportConfig) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    if !data.metadata.is_empty() {
        log::debug!("Payload metadata: {}", serde_json::Value::Object(data.metadata.clone()));
    }

    let doc = report::build_document(data, config);
    let t_build = t0.elapsed();

    let bytes = pdf::render(&doc, &config.render_options())?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: build={:.1}ms, render={:.1}ms, total={:.1}ms (output {} bytes, folio {})",
        t_build.as_secs_f64() * 1000.0,
        (t_total - t_build).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
        data.organizacion.folio.as_deref().unwrap_or("N/A"),
    );

    Ok(bytes)
}

/// Parse a JSON payload and render it.
pub fn render_json(input: &[u8], config: &ReportConfig) -> Result<Vec<u8>, Error> {
    let data = ReportData::from_json(input)?;
    render_report(&data, config)
}

/// Read a JSON payload from `input` and write the PDF to `output`.
pub fn render_file(input: &Path, output: &Path, config: &ReportConfig) -> Result<(), Error> {
    let json = std::fs::read(input)?;
    let bytes = render_json(&json, config)?;
    std::fs::write(output, &bytes)?;
    Ok(())
}
