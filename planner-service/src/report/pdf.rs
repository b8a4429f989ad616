//! Draws a [`ReportLayout`] with printpdf and returns the finished bytes.

use super::font_metrics::FontStyle;
use super::layout::{Item, ReportLayout, PAGE_HEIGHT, PAGE_WIDTH};
use super::RenderError;
use printpdf::image_crate::codecs::{jpeg::JpegDecoder, png::PngDecoder};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rgb,
};
use std::io::Cursor;

const LAYER_NAME: &str = "Report";
const LOGO_DPI: f32 = 300.0;

/// Raster formats accepted for the header logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoFormat {
    Png,
    Jpeg,
}

impl LogoFormat {
    pub fn from_path(path: &str) -> Option<Self> {
        let lowered = path.to_ascii_lowercase();
        if lowered.ends_with(".png") {
            Some(LogoFormat::Png)
        } else if lowered.ends_with(".jpg") || lowered.ends_with(".jpeg") {
            Some(LogoFormat::Jpeg)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Logo {
    pub format: LogoFormat,
    pub bytes: Vec<u8>,
}

impl Logo {
    pub fn decode(&self) -> Result<Image, RenderError> {
        let cursor = Cursor::new(self.bytes.as_slice());
        let image = match self.format {
            LogoFormat::Png => PngDecoder::new(cursor).and_then(Image::try_from),
            LogoFormat::Jpeg => JpegDecoder::new(cursor).and_then(Image::try_from),
        };
        image.map_err(|e| RenderError::Logo(e.to_string()))
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    body: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference, body_font: Option<&[u8]>) -> Result<Self, RenderError> {
        let builtin = |font| {
            doc.add_builtin_font(font)
                .map_err(|e| RenderError::Engine(format!("{:?}", e)))
        };
        let regular = builtin(BuiltinFont::Helvetica)?;
        let bold = builtin(BuiltinFont::HelveticaBold)?;
        let italic = builtin(BuiltinFont::HelveticaOblique)?;

        let body = match body_font {
            Some(bytes) => match doc.add_external_font(bytes) {
                Ok(font) => font,
                Err(e) => {
                    tracing::warn!(error = ?e, "Embedded font rejected, using Helvetica");
                    regular.clone()
                }
            },
            None => regular.clone(),
        };

        Ok(Self {
            regular,
            bold,
            italic,
            body,
        })
    }

    fn pick(&self, style: FontStyle, body: bool) -> &IndirectFontRef {
        match (style, body) {
            (FontStyle::Regular, true) => &self.body,
            (FontStyle::Regular, false) => &self.regular,
            (FontStyle::Bold, _) => &self.bold,
            (FontStyle::Italic, _) => &self.italic,
        }
    }
}

/// Serialize the layout. `logo` is only drawn where the layout reserves a slot.
pub fn write_pdf(
    layout: &ReportLayout,
    title: &str,
    body_font: Option<&[u8]>,
    logo: Option<&Image>,
) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
    let fonts = Fonts::load(&doc, body_font)?;

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for item in &page.items {
            draw(&layer, item, &fonts, logo);
        }
    }

    doc.save_to_bytes()
        .map_err(|e| RenderError::Engine(format!("{:?}", e)))
}

fn draw(layer: &PdfLayerReference, item: &Item, fonts: &Fonts, logo: Option<&Image>) {
    match item {
        Item::Text {
            text,
            x,
            y,
            size,
            style,
            body,
        } => {
            layer.use_text(
                text.as_str(),
                *size,
                Mm(*x),
                Mm(PAGE_HEIGHT - *y),
                fonts.pick(*style, *body),
            );
        }
        Item::Rule { x1, x2, y } => {
            layer.set_outline_color(Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None)));
            layer.set_outline_thickness(0.5);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), Mm(PAGE_HEIGHT - *y)), false),
                    (Point::new(Mm(*x2), Mm(PAGE_HEIGHT - *y)), false),
                ],
                is_closed: false,
            });
        }
        Item::Logo {
            x,
            top,
            max_width,
            max_height,
        } => {
            if let Some(image) = logo {
                place_logo(layer, image, *x, *top, *max_width, *max_height);
            }
        }
    }
}

fn place_logo(layer: &PdfLayerReference, image: &Image, x: f32, top: f32, max_w: f32, max_h: f32) {
    let px_w = image.image.width.0 as f32;
    let px_h = image.image.height.0 as f32;
    if px_w <= 0.0 || px_h <= 0.0 {
        return;
    }

    let natural_w = px_w / LOGO_DPI * 25.4;
    let natural_h = px_h / LOGO_DPI * 25.4;
    let scale = (max_w / natural_w).min(max_h / natural_h);
    let height = natural_h * scale;

    Image::from(image.image.clone()).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(PAGE_HEIGHT - top - height)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(LOGO_DPI),
            ..Default::default()
        },
    );
}
