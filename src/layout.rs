//! Invoice layout – an ordered list of draw blocks over a vertical cursor.
//!
//! Each block receives the cursor (a baseline in PDF points, origin at the
//! page bottom) and returns where the next block starts. Blocks emit
//! [`Element`]s into a [`Canvas`]; nothing is rendered here.

use rust_decimal::Decimal;

use crate::fonts::{FontSet, FontVariant};
use crate::invoice::InvoiceRequest;
use crate::issuer::IssuerProfile;
use crate::layout_config::*;
use crate::money::{format_currency, format_quantity};

/// Left margin in points.
pub const MARGIN_LEFT_PT: f32 = 40.0;

/// Description, quantity, unit price, total.
pub const COLUMN_WIDTHS: [f32; 4] = [250.0, 30.0, 120.0, 100.0];
pub const ROW_HEIGHT: f32 = 30.0;
const CELL_PADDING: f32 = 10.0;
const TABLE_HEADERS: [&str; 4] = ["Descripción", "Cantidad", "Precio Unitario", "Total"];

const TITLE_SIZE: f32 = 22.0;
const BODY_SIZE: f32 = 9.0;
const TOTAL_SIZE: f32 = 10.0;
const DESCRIPTION_LEADING: f32 = 10.0;
const OBSERVATIONS_LEADING: f32 = 11.0;
/// Gap between a label and its value.
const LABEL_GAP: f32 = 2.0;

const PAYMENT_NOTE: &str = " Se solicita que el pago sea realizado con la mayor brevedad posible";

/// Inputs shared by every block.
pub struct LayoutContext<'a> {
    pub request: &'a InvoiceRequest,
    pub issuer: &'a IssuerProfile,
    pub fonts: &'a FontSet,
    pub invoice_number: &'a str,
    pub grand_total: Decimal,
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
}

impl LayoutContext<'_> {
    fn table_width(&self) -> f32 {
        COLUMN_WIDTHS.iter().sum()
    }

    /// x of the left edge of column `i`.
    fn column_x(&self, i: usize) -> f32 {
        self.margin_left + COLUMN_WIDTHS[..i].iter().sum::<f32>()
    }
}

/// Collects elements and measures text with the document's font set.
pub struct Canvas<'a> {
    fonts: &'a FontSet,
    elements: Vec<Element>,
}

impl<'a> Canvas<'a> {
    pub fn new(fonts: &'a FontSet) -> Self {
        Self {
            fonts,
            elements: Vec::new(),
        }
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn draw_string(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        variant: FontVariant,
        font_size: f32,
        color: Rgb,
    ) {
        if text.is_empty() {
            return;
        }
        self.elements.push(Element::Text(TextRun {
            x,
            y,
            text: text.to_string(),
            variant,
            font_size,
            color,
        }));
    }

    pub fn draw_centred_string(
        &mut self,
        center_x: f32,
        y: f32,
        text: &str,
        variant: FontVariant,
        font_size: f32,
        color: Rgb,
    ) {
        let w = self.fonts.measure_text_width(text, font_size, variant);
        self.draw_string(center_x - w / 2.0, y, text, variant, font_size, color);
    }

    pub fn draw_right_string(
        &mut self,
        right_x: f32,
        y: f32,
        text: &str,
        variant: FontVariant,
        font_size: f32,
        color: Rgb,
    ) {
        let w = self.fonts.measure_text_width(text, font_size, variant);
        self.draw_string(right_x - w, y, text, variant, font_size, color);
    }

    /// Bold label followed by a regular value. The value starts at the
    /// label's measured width plus [`LABEL_GAP`].
    pub fn draw_labeled(&mut self, x: f32, y: f32, label: &str, value: &str, font_size: f32) {
        self.draw_string(x, y, label, FontVariant::Bold, font_size, BLACK);
        let label_width = self
            .fonts
            .measure_text_width(label, font_size, FontVariant::Bold);
        self.draw_string(
            x + label_width + LABEL_GAP,
            y,
            value,
            FontVariant::Regular,
            font_size,
            BLACK,
        );
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.elements.push(Element::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    pub fn grid(&mut self, xs: Vec<f32>, ys: Vec<f32>) {
        self.elements.push(Element::Grid {
            xs,
            ys,
            color: GRID_GRAY,
            thickness: 1.0,
        });
    }

    pub fn paragraph(&self, text: &str, font_size: f32, leading: f32, max_width: f32) -> Paragraph {
        Paragraph {
            lines: self
                .fonts
                .wrap_text(text, font_size, FontVariant::Regular, max_width),
            font_size,
            leading,
        }
    }

    /// Draw a wrapped paragraph with its bottom-left corner at (x, y).
    pub fn draw_paragraph(&mut self, paragraph: &Paragraph, x: f32, y: f32) {
        let top = y + paragraph.height();
        for (i, line) in paragraph.lines.iter().enumerate() {
            let baseline = top - paragraph.font_size - i as f32 * paragraph.leading;
            self.draw_string(
                x,
                baseline,
                line,
                FontVariant::Regular,
                paragraph.font_size,
                BLACK,
            );
        }
    }
}

/// Pre-wrapped block of regular text.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub lines: Vec<String>,
    pub font_size: f32,
    pub leading: f32,
}

impl Paragraph {
    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.leading
    }
}

/// A draw block: takes the cursor, returns the cursor for the next block.
pub type DrawBlock = fn(&LayoutContext<'_>, &mut Canvas<'_>, f32) -> f32;

/// The invoice, top to bottom.
pub const BLOCKS: [(&str, DrawBlock); 9] = [
    ("title", title_block),
    ("issuer_contact", issuer_contact_block),
    ("client", client_block),
    ("metadata", metadata_block),
    ("services_table", services_table_block),
    ("observations", observations_block),
    ("payment_note", payment_note_block),
    ("payment_details", payment_details_block),
    ("closing", closing_block),
];

/// Run every block and collect the page.
///
/// There is no pagination: content that runs past the bottom edge is laid
/// out off-page and only a warning is logged.
pub fn layout_invoice(ctx: &LayoutContext<'_>, background_px: Option<(u32, u32)>) -> InvoiceLayout {
    let mut layout = InvoiceLayout::letter(format!("Cuenta de cobro {}", ctx.invoice_number));
    layout.page_width_pt = ctx.page_width;
    layout.page_height_pt = ctx.page_height;
    layout.background = background_px
        .map(|(w, h)| cover_placement(ctx.page_width, ctx.page_height, w, h));

    let mut canvas = Canvas::new(ctx.fonts);
    let mut y = ctx.page_height;
    for (name, block) in BLOCKS {
        y = block(ctx, &mut canvas, y);
        log::debug!("block '{name}' done, cursor at {y:.1} pt");
    }

    if y < 0.0 {
        log::warn!(
            "Invoice content runs {:.1} pt past the bottom of the page; it will be clipped",
            -y
        );
    }

    layout.elements = canvas.into_elements();
    layout
}

pub fn title_block(ctx: &LayoutContext<'_>, canvas: &mut Canvas<'_>, y: f32) -> f32 {
    canvas.draw_centred_string(
        ctx.page_width / 2.0,
        y - 120.0,
        &format!("CUENTA DE COBRO N.° {}", ctx.invoice_number),
        FontVariant::Regular,
        TITLE_SIZE,
        BRAND_BLUE,
    );
    y - 160.0
}

pub fn issuer_contact_block(ctx: &LayoutContext<'_>, canvas: &mut Canvas<'_>, mut y: f32) -> f32 {
    let lines = [&ctx.issuer.phone, &ctx.issuer.email, &ctx.issuer.city];
    for (i, line) in lines.into_iter().enumerate() {
        if i > 0 {
            y -= 12.0;
        }
        canvas.draw_string(ctx.margin_left, y, line, FontVariant::Regular, BODY_SIZE, BRAND_BLUE);
    }
    y - 30.0
}

pub fn client_block(ctx: &LayoutContext<'_>, canvas: &mut Canvas<'_>, mut y: f32) -> f32 {
    let fields = [
        ("Cliente:", ctx.request.client_name.as_str()),
        ("Identificación:", ctx.request.client_id.as_str()),
        ("Fecha:", ctx.request.date.as_str()),
    ];
    for (i, (label, value)) in fields.into_iter().enumerate() {
        if i > 0 {
            y -= 15.0;
        }
        canvas.draw_labeled(ctx.margin_left, y, label, value, BODY_SIZE);
    }
    y - 30.0
}

pub fn metadata_block(ctx: &LayoutContext<'_>, canvas: &mut Canvas<'_>, y: f32) -> f32 {
    canvas.draw_labeled(
        ctx.margin_left,
        y,
        "Servicio / Proyecto:",
        ctx.request.service_label(),
        BODY_SIZE,
    );
    y - 40.0
}

/// Header, one fixed-height row per item, and the totals row. `y` is the
/// bottom of the header row.
pub fn services_table_block(ctx: &LayoutContext<'_>, canvas: &mut Canvas<'_>, y: f32) -> f32 {
    let left = ctx.margin_left;
    let width = ctx.table_width();
    let right = left + width;

    // Header
    canvas.fill_rect(left, y, width, ROW_HEIGHT, BRAND_BLUE);
    for (i, header) in TABLE_HEADERS.iter().enumerate() {
        canvas.draw_centred_string(
            ctx.column_x(i) + COLUMN_WIDTHS[i] / 2.0,
            y + 6.0,
            header,
            FontVariant::Bold,
            BODY_SIZE,
            WHITE,
        );
    }

    let column_edges: Vec<f32> = (0..=COLUMN_WIDTHS.len()).map(|i| ctx.column_x(i)).collect();
    let desc_width = COLUMN_WIDTHS[0] - 2.0 * CELL_PADDING;

    let mut row_bottom = y;
    for item in &ctx.request.items {
        row_bottom -= ROW_HEIGHT;
        canvas.grid(column_edges.clone(), vec![row_bottom, row_bottom + ROW_HEIGHT]);

        // Description, vertically centred inside the row's 2 pt padding.
        let desc = canvas.paragraph(&item.description, BODY_SIZE, DESCRIPTION_LEADING, desc_width);
        let desc_y = row_bottom + 2.0 + (ROW_HEIGHT - 4.0 - desc.height()) / 2.0;
        canvas.draw_paragraph(&desc, left + CELL_PADDING, desc_y);

        let text_y = row_bottom + ROW_HEIGHT / 2.0 - 3.0;
        canvas.draw_centred_string(
            ctx.column_x(1) + COLUMN_WIDTHS[1] / 2.0,
            text_y,
            &format_quantity(item.quantity),
            FontVariant::Regular,
            BODY_SIZE,
            BLACK,
        );
        canvas.draw_right_string(
            ctx.column_x(3) - CELL_PADDING,
            text_y,
            &format_currency(item.unit_price),
            FontVariant::Regular,
            BODY_SIZE,
            BLACK,
        );
        // Totals are checked before layout; an overflowing line is left blank.
        if let Some(total) = item.total() {
            canvas.draw_right_string(
                right - CELL_PADDING,
                text_y,
                &format_currency(total),
                FontVariant::Regular,
                BODY_SIZE,
                BLACK,
            );
        }
    }

    // Totals
    row_bottom -= ROW_HEIGHT;
    canvas.grid(vec![left, right], vec![row_bottom, row_bottom + ROW_HEIGHT]);
    canvas.draw_string(
        ctx.column_x(2) + CELL_PADDING,
        row_bottom + 6.0,
        "Total General",
        FontVariant::Bold,
        TOTAL_SIZE,
        BLACK,
    );
    canvas.draw_right_string(
        right - CELL_PADDING,
        row_bottom + 6.0,
        &format_currency(ctx.grand_total),
        FontVariant::Bold,
        TOTAL_SIZE,
        BLACK,
    );

    row_bottom - 20.0
}

pub fn observations_block(ctx: &LayoutContext<'_>, canvas: &mut Canvas<'_>, mut y: f32) -> f32 {
    canvas.draw_string(
        ctx.margin_left,
        y,
        "Observaciones:",
        FontVariant::Bold,
        BODY_SIZE,
        BLACK,
    );
    y -= 15.0;

    match ctx.request.custom_observations() {
        Some(text) => {
            let p = canvas.paragraph(text, BODY_SIZE, OBSERVATIONS_LEADING, ctx.table_width());
            let h = p.height();
            canvas.draw_paragraph(&p, ctx.margin_left, y - h);
            y - (h + 20.0)
        }
        None => {
            canvas.draw_string(
                ctx.margin_left,
                y,
                &ctx.request.concept,
                FontVariant::Regular,
                BODY_SIZE,
                BLACK,
            );
            y - 20.0
        }
    }
}

pub fn payment_note_block(ctx: &LayoutContext<'_>, canvas: &mut Canvas<'_>, y: f32) -> f32 {
    canvas.draw_labeled(ctx.margin_left, y, "Nota:", PAYMENT_NOTE, BODY_SIZE);
    y - 36.0
}

pub fn payment_details_block(ctx: &LayoutContext<'_>, canvas: &mut Canvas<'_>, mut y: f32) -> f32 {
    let issuer = ctx.issuer;
    let lines = [
        format!("Nombre: {}", issuer.name),
        format!("Cédula: {}", issuer.tax_id),
        format!("{}: {}", issuer.bank_account_label, issuer.bank_account),
        format!("{}: {}", issuer.mobile_payment_label, issuer.mobile_payment),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            y -= 12.0;
        }
        canvas.draw_string(ctx.margin_left, y, line, FontVariant::Regular, BODY_SIZE, BLACK);
    }
    y - 24.0
}

pub fn closing_block(ctx: &LayoutContext<'_>, canvas: &mut Canvas<'_>, y: f32) -> f32 {
    canvas.draw_string(ctx.margin_left, y, "Atentamente,", FontVariant::Regular, BODY_SIZE, BLACK);
    let y = y - 15.0;
    canvas.draw_string(
        ctx.margin_left,
        y,
        &format!("{},", ctx.issuer.name),
        FontVariant::Regular,
        BODY_SIZE,
        BLACK,
    );
    y
}
