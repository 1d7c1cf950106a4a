//! # cuenta_cobro – single-page PDF invoice generator
//!
//! Turns billing data into a "cuenta de cobro" PDF. The pipeline stages are:
//!
//! 1. **Validate** – JSON line items → [`invoice::LineItem`]s ([`invoice`])
//! 2. **Resolve assets** – custom fonts and background, best-effort ([`assets`])
//! 3. **Layout** – ordered draw blocks over a vertical cursor ([`layout`])
//! 4. **Render** – emit PDF bytes via printpdf ([`render`])
//! 5. **Write** – one new file under the output directory ([`output`])

pub mod assets;
pub mod error;
pub mod fonts;
pub mod invoice;
pub mod issuer;
pub mod layout;
pub mod layout_config;
pub mod money;
pub mod output;
pub mod pipeline;
pub mod render;

// Re-exports for convenience
pub use error::{AssetWarning, ConfigError, InputError, RenderError};
pub use invoice::{parse_line_items, InvoiceRequest, LineItem, DEFAULT_OBSERVATIONS};
pub use issuer::IssuerProfile;
pub use pipeline::{generate_invoice, generate_invoice_at, InvoiceConfig, RenderedInvoice};
