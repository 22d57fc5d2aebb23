//! Opening pages: logo cover, report title and institution data.

use std::io::Cursor;
use std::path::Path;

use crate::error::Error;
use crate::model::{
    Alignment, Block, CM, CellPadding, CellVAlign, EmbeddedImage, ImageFormat, PageTemplate,
    Table, TableRow,
};
use crate::payload::Organization;

use super::styles::{self, cell};

pub const REPORT_TITLE: &str = "Reporte de Resultados del Autodiagnóstico para el proceso de \
Transversalización e Institucionalización de la Perspectiva de Género y Convivencia Pacífica";

const LOGO_WIDTH: f32 = 8.0 * CM;

/// Load an image scaled to `width` points with its aspect ratio preserved.
pub(crate) fn load_image(path: &Path, width: f32) -> Result<EmbeddedImage, Error> {
    let data = std::fs::read(path)?;
    let format = match image::guess_format(&data)? {
        image::ImageFormat::Png => ImageFormat::Png,
        image::ImageFormat::Jpeg => ImageFormat::Jpeg,
        other => return Err(Error::Image(format!("unsupported image format {other:?}"))),
    };
    let (pixel_width, pixel_height) = image::ImageReader::new(Cursor::new(&data))
        .with_guessed_format()?
        .into_dimensions()?;
    if pixel_width == 0 {
        return Err(Error::Image("image has zero width".into()));
    }
    Ok(EmbeddedImage {
        display_width: width,
        display_height: width * pixel_height as f32 / pixel_width as f32,
        data,
        format,
        pixel_width,
        pixel_height,
    })
}

pub fn cover_page(logo_path: &Path) -> Vec<Block> {
    let mut blocks = vec![
        Block::NextTemplate(PageTemplate::Cover),
        Block::Spacer(6.0 * CM),
    ];
    match load_image(logo_path, LOGO_WIDTH) {
        Ok(image) => blocks.push(Block::Image {
            image,
            alignment: Alignment::Center,
        }),
        Err(e) => {
            log::warn!("Logo {} not loaded: {e}", logo_path.display());
            blocks.push(Block::Paragraph(
                styles::P.text(format!("Error al cargar logo: {e}")),
            ));
        }
    }
    blocks.push(Block::NextTemplate(PageTemplate::Title));
    blocks.push(Block::PageBreak);
    blocks
}

pub fn title_page() -> Vec<Block> {
    vec![
        Block::Spacer(6.0 * CM),
        Block::Paragraph(styles::TITLE.text(REPORT_TITLE)),
        Block::NextTemplate(PageTemplate::Institution),
        Block::PageBreak,
    ]
}

pub fn institution_page(org: &Organization) -> Vec<Block> {
    let field = |v: &Option<String>, default: &str| v.clone().unwrap_or_else(|| default.into());
    let rows = [
        ("Responsable:", field(&org.responsable, "Sin responsable")),
        ("Cargo:", field(&org.cargo_responsable, "")),
        ("Fecha de aplicación:", field(&org.fecha_aplicacion, "")),
        ("Folio:", field(&org.folio, "")),
    ];
    let body = &styles::BODY;
    let table = Table {
        col_widths: vec![5.0 * CM, 10.0 * CM],
        rows: rows
            .into_iter()
            .map(|(label, value)| {
                let mut label_cell = cell(body.paragraph(vec![body.run(label).bold()]));
                let mut value_cell = cell(body.text(value));
                label_cell.v_align = CellVAlign::Top;
                value_cell.v_align = CellVAlign::Top;
                TableRow {
                    cells: vec![label_cell, value_cell],
                    keep_with_next: false,
                }
            })
            .collect(),
        padding: CellPadding {
            left: 0.0,
            right: 0.0,
            ..CellPadding::default()
        },
        grid: None,
        h_align: Alignment::Left,
        header_rows: 0,
    };

    vec![
        Block::Spacer(2.0 * CM),
        Block::Paragraph(
            styles::TITLE.text(field(&org.nombre, "Sin nombre")),
        ),
        Block::Spacer(1.0 * CM),
        Block::Table(table),
        Block::NextTemplate(PageTemplate::Body),
        Block::PageBreak,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_logo_becomes_error_paragraph() {
        let blocks = cover_page(Path::new("/nonexistent/digei_logo.png"));
        let text = blocks.iter().find_map(|b| match b {
            Block::Paragraph(p) => Some(p.plain_text()),
            _ => None,
        });
        assert!(text.unwrap().starts_with("Error al cargar logo: "));
        assert!(matches!(blocks.last(), Some(Block::PageBreak)));
    }

    #[test]
    fn institution_defaults() {
        let blocks = institution_page(&Organization::default());
        let Block::Paragraph(name) = &blocks[1] else { panic!("name") };
        assert_eq!(name.plain_text(), "Sin nombre");
        let Block::Table(t) = &blocks[3] else { panic!("table") };
        assert_eq!(t.rows.len(), 4);
        assert_eq!(t.rows[0].cells[1].text(), "Sin responsable");
        assert_eq!(t.rows[2].cells[0].text(), "Fecha de aplicación:");
        assert_eq!(t.rows[3].cells[1].text(), "");
    }

    #[test]
    fn logo_keeps_aspect_ratio() {
        let dir = std::env::temp_dir().join(format!("digei-logo-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("logo.png");
        image::RgbImage::new(200, 100).save(&path).unwrap();
        let img = load_image(&path, LOGO_WIDTH).unwrap();
        assert_eq!(img.format, ImageFormat::Png);
        assert!((img.display_height - LOGO_WIDTH / 2.0).abs() < 1e-3);
        std::fs::remove_dir_all(&dir).ok();
    }
}
