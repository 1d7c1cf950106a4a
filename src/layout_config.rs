//! Layout config – the intermediate representation between the draw blocks
//! and PDF rendering. It encodes exactly what goes on the page, in PDF
//! points with the origin at the bottom-left corner.

use serde::{Deserialize, Serialize};

use crate::fonts::FontVariant;

/// RGB colour, components in 0.0..=1.0.
pub type Rgb = [f32; 3];

pub const BLACK: Rgb = [0.0, 0.0, 0.0];
pub const WHITE: Rgb = [1.0, 1.0, 1.0];
/// `#005F99`
pub const BRAND_BLUE: Rgb = [0.0, 95.0 / 255.0, 153.0 / 255.0];
pub const GRID_GRAY: Rgb = [0.8, 0.8, 0.8];

/// A complete single-page invoice layout ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLayout {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    /// Where the background image goes, if one was resolved.
    pub background: Option<ImagePlacement>,
    /// Drawn in order.
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Text(TextRun),
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    /// Vertical lines at every `xs` spanning the `ys` range, horizontal
    /// lines at every `ys` spanning the `xs` range.
    Grid {
        xs: Vec<f32>,
        ys: Vec<f32>,
        color: Rgb,
        thickness: f32,
    },
}

/// One line of text; `x` is the left edge and `y` the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub variant: FontVariant,
    pub font_size: f32,
    pub color: Rgb,
}

impl InvoiceLayout {
    /// US Letter: 8.5 × 11 in.
    pub fn letter(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            page_width_pt: 612.0,
            page_height_pt: 792.0,
            background: None,
            elements: Vec::new(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(run) => Some(run),
            _ => None,
        })
    }

    /// First text run with exactly this content.
    pub fn find_text(&self, text: &str) -> Option<&TextRun> {
        self.texts().find(|run| run.text == text)
    }
}

/// Cover-fit: scale the image so it fills the page in both directions,
/// preserving aspect ratio, and centre it. Overhang is clipped by the page.
pub fn cover_placement(
    page_width: f32,
    page_height: f32,
    px_width: u32,
    px_height: u32,
) -> ImagePlacement {
    let scale = (page_width / px_width as f32).max(page_height / px_height as f32);
    let width = px_width as f32 * scale;
    let height = px_height as f32 * scale;
    ImagePlacement {
        x: (page_width - width) / 2.0,
        y: (page_height - height) / 2.0,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_fills_page_and_centres() {
        // Wide image: height drives the scale.
        let p = cover_placement(612.0, 792.0, 2000, 1000);
        assert!((p.height - 792.0).abs() < 0.01);
        assert!((p.width - 1584.0).abs() < 0.01);
        assert!((p.x - (612.0 - 1584.0) / 2.0).abs() < 0.01);
        assert!(p.y.abs() < 0.01);

        // Tall image: width drives the scale.
        let p = cover_placement(612.0, 792.0, 100, 400);
        assert!((p.width - 612.0).abs() < 0.01);
        assert!(p.height >= 792.0);
        assert!(p.x.abs() < 0.01);
    }

    #[test]
    fn exact_ratio_has_no_overhang() {
        let p = cover_placement(612.0, 792.0, 1224, 1584);
        assert_eq!(p, ImagePlacement { x: 0.0, y: 0.0, width: 612.0, height: 792.0 });
    }
}
