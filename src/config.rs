use std::path::{Path, PathBuf};

use crate::pdf::RenderOptions;

pub const DEFAULT_FONT_FAMILY: &str = "DejaVu Sans";

/// Where report assets live and which fonts to embed.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Directory holding `assets/digei_logo.png` and `content/*.md`.
    pub assets_dir: PathBuf,
    /// `None` renders with the built-in Helvetica family.
    pub font_family: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("."),
            font_family: Some(DEFAULT_FONT_FAMILY.to_string()),
        }
    }
}

impl ReportConfig {
    /// Built-in fonts only; output does not depend on installed fonts.
    pub fn builtin(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            font_family: None,
        }
    }

    pub fn logo_path(&self) -> PathBuf {
        self.assets_dir.join("assets").join("digei_logo.png")
    }

    pub fn content_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.assets_dir.join("content").join(name)
    }

    pub(crate) fn render_options(&self) -> RenderOptions {
        RenderOptions {
            font_family: self.font_family.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_paths_are_relative_to_assets_dir() {
        let config = ReportConfig::builtin("/srv/digei");
        assert_eq!(
            config.logo_path(),
            PathBuf::from("/srv/digei/assets/digei_logo.png")
        );
        assert_eq!(
            config.content_path("01_introduccion.md"),
            PathBuf::from("/srv/digei/content/01_introduccion.md")
        );
        assert!(config.render_options().font_family.is_none());
    }

    #[test]
    fn default_embeds_dejavu() {
        assert_eq!(
            ReportConfig::default().font_family.as_deref(),
            Some(DEFAULT_FONT_FAMILY)
        );
    }
}
