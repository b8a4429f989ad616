//! PDF rendition of the analysis report.

pub mod font_metrics;
pub mod layout;
pub mod pdf;
pub mod sanitize;

use crate::config::ReportSettings;
use crate::models::display_name;
use layout::{LayoutOptions, ReportLayout};
use pdf::{Logo, LogoFormat};
use sanitize::{sanitize, to_renderable};
use thiserror::Error;

/// Width multiplier for embedded fonts, whose advance widths are not tabulated.
const EMBEDDED_FONT_WIDTH_SCALE: f32 = 1.15;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF engine error: {0}")]
    Engine(String),

    #[error("logo could not be decoded: {0}")]
    Logo(String),
}

pub struct ReportRenderer {
    title: String,
    caption: Option<String>,
    font: Option<Vec<u8>>,
    logo: Option<Logo>,
}

impl ReportRenderer {
    pub fn new(title: impl Into<String>, caption: Option<String>) -> Self {
        Self {
            title: title.into(),
            caption,
            font: None,
            logo: None,
        }
    }

    pub fn with_font(mut self, bytes: Vec<u8>) -> Self {
        self.font = Some(bytes);
        self
    }

    pub fn with_logo(mut self, logo: Logo) -> Self {
        self.logo = Some(logo);
        self
    }

    /// Build a renderer, loading the optional font and logo files.
    ///
    /// Missing or unreadable resources are logged and skipped.
    pub fn from_settings(settings: &ReportSettings) -> Self {
        let mut renderer = Self::new(settings.title.clone(), settings.caption.clone());

        if let Some(path) = settings.font_path.as_deref() {
            match std::fs::read(path) {
                Ok(bytes) => renderer = renderer.with_font(bytes),
                Err(e) => tracing::warn!(path, error = %e, "Report font unavailable, using Helvetica"),
            }
        }

        if let Some(path) = settings.logo_path.as_deref() {
            match load_logo(path) {
                Ok(logo) => renderer = renderer.with_logo(logo),
                Err(reason) => {
                    tracing::warn!(path, reason = %reason, "Report logo unavailable, using text header")
                }
            }
        }

        renderer
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    fn options(&self, with_logo: bool) -> LayoutOptions {
        LayoutOptions {
            title: to_renderable(&sanitize(&self.title)),
            caption: self
                .caption
                .as_deref()
                .map(|c| to_renderable(&sanitize(c))),
            has_logo: with_logo,
            body_width_scale: if self.font.is_some() {
                EMBEDDED_FONT_WIDTH_SCALE
            } else {
                1.0
            },
        }
    }

    /// Sanitize the inputs and lay them out without producing a PDF.
    pub fn layout(&self, body: &str, student_name: &str, topic: &str) -> ReportLayout {
        self.layout_with(body, student_name, topic, &self.options(self.has_logo()))
    }

    fn layout_with(&self, body: &str, student_name: &str, topic: &str, options: &LayoutOptions) -> ReportLayout {
        let clean = |s: &str| to_renderable(&sanitize(s));
        ReportLayout::build(
            &clean(body),
            &display_name(&clean(student_name)),
            clean(topic).trim(),
            options,
        )
    }

    /// Render the report to PDF bytes. The buffer is complete or an error is returned.
    pub fn render(&self, body: &str, student_name: &str, topic: &str) -> Result<Vec<u8>, RenderError> {
        let image = match self.logo.as_ref().map(Logo::decode) {
            Some(Ok(image)) => Some(image),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Rendering without logo");
                None
            }
            None => None,
        };

        let options = self.options(image.is_some());
        let layout = self.layout_with(body, student_name, topic, &options);
        let bytes = pdf::write_pdf(&layout, &options.title, self.font.as_deref(), image.as_ref())?;

        if !bytes.starts_with(b"%PDF") {
            return Err(RenderError::Engine("output is not a PDF document".into()));
        }

        tracing::debug!(
            pages = layout.page_count(),
            size_bytes = bytes.len(),
            "Rendered report PDF"
        );
        Ok(bytes)
    }
}

fn load_logo(path: &str) -> Result<Logo, String> {
    let format = LogoFormat::from_path(path).ok_or("only PNG and JPEG logos are supported")?;
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let logo = Logo { format, bytes };
    logo.decode().map_err(|e| e.to_string())?;
    Ok(logo)
}
