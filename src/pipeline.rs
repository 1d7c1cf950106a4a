//! Pipeline – ties together asset resolution, layout, rendering and file
//! output into a single function call.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;

use crate::assets::{resolve_background, resolve_custom_fonts, Background, BACKGROUND_FILES};
use crate::error::{AssetWarning, RenderError};
use crate::fonts::FontSet;
use crate::invoice::{check_totals, InvoiceRequest};
use crate::issuer::IssuerProfile;
use crate::layout::{layout_invoice, LayoutContext, MARGIN_LEFT_PT};
use crate::layout_config::InvoiceLayout;
use crate::output::{ensure_output_dir, invoice_file_stem, write_new_file};
use crate::render::render_pdf;

/// Format of the invoice number and the file name timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Configuration for invoice generation.
#[derive(Debug, Clone)]
pub struct InvoiceConfig {
    /// Directory holding the three custom font files.
    pub fonts_dir: PathBuf,
    /// Background image candidates; the first existing one is used.
    pub background_candidates: Vec<PathBuf>,
    /// Where PDFs are written. Created if absent.
    pub output_dir: PathBuf,
    pub issuer: IssuerProfile,
    /// Page width in points (default: US Letter = 612).
    pub page_width: f32,
    /// Page height in points (default: US Letter = 792).
    pub page_height: f32,
    /// Left margin in points (default: 40).
    pub margin_left: f32,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self::from_base_dir(".")
    }
}

impl InvoiceConfig {
    /// Standard layout under `base`: `fonts/`, `base.jpg` or `base.png`,
    /// and `generated/` for output.
    pub fn from_base_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            fonts_dir: base.join("fonts"),
            background_candidates: BACKGROUND_FILES.iter().map(|f| base.join(f)).collect(),
            output_dir: base.join("generated"),
            issuer: IssuerProfile::default(),
            page_width: 612.0,
            page_height: 792.0,
            margin_left: MARGIN_LEFT_PT,
        }
    }

    pub fn with_issuer(mut self, issuer: IssuerProfile) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Result of a successful render.
#[derive(Debug, Clone)]
pub struct RenderedInvoice {
    pub path: PathBuf,
    pub invoice_number: String,
    pub grand_total: Decimal,
    /// Asset problems that were worked around.
    pub warnings: Vec<AssetWarning>,
}

/// Assets resolved for one call.
pub struct ResolvedAssets {
    pub fonts: FontSet,
    pub background: Option<Background>,
    pub warnings: Vec<AssetWarning>,
}

impl ResolvedAssets {
    /// Builtin fonts, no background.
    pub fn fallback() -> Self {
        Self {
            fonts: FontSet::Builtin,
            background: None,
            warnings: Vec::new(),
        }
    }
}

/// Resolve fonts and background. Never fails.
pub fn resolve_assets(config: &InvoiceConfig) -> ResolvedAssets {
    let mut warnings = Vec::new();
    let fonts = resolve_custom_fonts(&config.fonts_dir, &mut warnings)
        .map(|custom| FontSet::Custom(Box::new(custom)))
        .unwrap_or_default();
    let background = resolve_background(&config.background_candidates, &mut warnings);
    ResolvedAssets {
        fonts,
        background,
        warnings,
    }
}

/// Render an invoice stamped with the current local time.
pub fn generate_invoice(
    request: &InvoiceRequest,
    config: &InvoiceConfig,
) -> Result<RenderedInvoice, RenderError> {
    generate_invoice_at(request, config, Local::now().naive_local())
}

/// Render an invoice stamped with `generated_at`.
pub fn generate_invoice_at(
    request: &InvoiceRequest,
    config: &InvoiceConfig,
    generated_at: NaiveDateTime,
) -> Result<RenderedInvoice, RenderError> {
    let grand_total = check_totals(&request.items)?;
    let invoice_number = generated_at.format(TIMESTAMP_FORMAT).to_string();

    ensure_output_dir(&config.output_dir)?;

    let assets = resolve_assets(config);
    let layout = compute_invoice_layout(request, config, &assets, &invoice_number, grand_total);
    let bytes = render_pdf(&layout, &assets.fonts, assets.background.as_ref());

    let stem = invoice_file_stem(&request.client_name, &invoice_number);
    let path = write_new_file(&config.output_dir, &stem, &bytes)?;
    log::info!(
        "Wrote '{}' ({} bytes, {} line item{}, {} fonts)",
        path.display(),
        bytes.len(),
        request.items.len(),
        if request.items.len() == 1 { "" } else { "s" },
        if assets.fonts.is_custom() { "custom" } else { "builtin" }
    );

    Ok(RenderedInvoice {
        path,
        invoice_number,
        grand_total,
        warnings: assets.warnings,
    })
}

/// Generate only the layout (no PDF rendering) – useful for testing.
pub fn compute_invoice_layout(
    request: &InvoiceRequest,
    config: &InvoiceConfig,
    assets: &ResolvedAssets,
    invoice_number: &str,
    grand_total: Decimal,
) -> InvoiceLayout {
    let ctx = LayoutContext {
        request,
        issuer: &config.issuer,
        fonts: &assets.fonts,
        invoice_number,
        grand_total,
        page_width: config.page_width,
        page_height: config.page_height,
        margin_left: config.margin_left,
    };
    let background_px = assets
        .background
        .as_ref()
        .map(|bg| (bg.px_width, bg.px_height));
    layout_invoice(&ctx, background_px)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::LineItem;
    use chrono::NaiveDate;

    #[test]
    fn pipeline_basic() {
        let dir = tempfile::tempdir().unwrap();
        let config = InvoiceConfig::from_base_dir(dir.path());
        let request = InvoiceRequest {
            client_name: "Acme SA".to_string(),
            client_id: "900123456".to_string(),
            items: vec![LineItem::new("Consulting", Decimal::TEN, Decimal::ONE_HUNDRED)],
            concept: "Honorarios".to_string(),
            date: "2024-01-15".to_string(),
            ..InvoiceRequest::default()
        };
        let at = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        let rendered = generate_invoice_at(&request, &config, at).unwrap();
        assert_eq!(rendered.invoice_number, "20240115103000");
        assert_eq!(
            rendered.path,
            dir.path()
                .join("generated")
                .join("cuenta_cobro_Acme_SA_20240115103000.pdf")
        );
        let bytes = std::fs::read(&rendered.path).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert!(rendered.warnings.is_empty());
    }
}
