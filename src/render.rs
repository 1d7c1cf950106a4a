//! PDF renderer – takes an [`InvoiceLayout`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use printpdf::*;

use crate::assets::Background;
use crate::fonts::{fold_latin1, FontSet, FontVariant};
use crate::layout_config::{Element, InvoiceLayout, Rgb as RgbColor, TextRun};

const PT_TO_MM: f32 = 0.352778;

/// How a font variant is addressed in the content stream.
#[derive(Clone)]
enum FontHandle {
    Builtin(BuiltinFont),
    Embedded(FontId),
}

struct FontHandles {
    regular: FontHandle,
    bold: FontHandle,
    italic: FontHandle,
}

impl FontHandles {
    fn register(doc: &mut PdfDocument, fonts: &FontSet) -> Self {
        match fonts {
            FontSet::Builtin => Self {
                regular: builtin_handle(doc, FontVariant::Regular),
                bold: builtin_handle(doc, FontVariant::Bold),
                italic: builtin_handle(doc, FontVariant::Italic),
            },
            FontSet::Custom(custom) => Self {
                regular: FontHandle::Embedded(doc.add_font(&custom.regular.parsed)),
                bold: FontHandle::Embedded(doc.add_font(&custom.bold.parsed)),
                italic: FontHandle::Embedded(doc.add_font(&custom.italic.parsed)),
            },
        }
    }

    fn get(&self, variant: FontVariant) -> &FontHandle {
        match variant {
            FontVariant::Regular => &self.regular,
            FontVariant::Bold => &self.bold,
            FontVariant::Italic => &self.italic,
        }
    }
}

/// Embed printpdf's bundled copy of the builtin face so its text is written
/// through the same Unicode path as custom fonts. Builtin references only
/// carry ASCII safely, so the reference is the fallback.
fn builtin_handle(doc: &mut PdfDocument, variant: FontVariant) -> FontHandle {
    let builtin = variant.builtin();
    let bundled = builtin.get_subset_font();
    match ParsedFont::from_bytes(&bundled.bytes, 0, &mut Vec::new()) {
        Some(parsed) => FontHandle::Embedded(doc.add_font(&parsed)),
        None => {
            log::warn!("Bundled {builtin:?} could not be parsed, accents will be dropped");
            FontHandle::Builtin(builtin)
        }
    }
}

/// Render a single-page invoice layout into PDF bytes.
///
/// The background, when given, is painted first so every other element sits
/// on top of it.
pub fn render_pdf(layout: &InvoiceLayout, fonts: &FontSet, background: Option<&Background>) -> Vec<u8> {
    let page_w = Mm(layout.page_width_pt * PT_TO_MM);
    let page_h = Mm(layout.page_height_pt * PT_TO_MM);

    let mut doc = PdfDocument::new(&layout.title);
    let handles = FontHandles::register(&mut doc, fonts);

    let mut ops = Vec::new();

    if let (Some(bg), Some(placement)) = (background, layout.background) {
        let xobj_id = doc.add_image(&bg.image);
        // At dpi=72 printpdf renders 1 px = 1 pt, so scale = desired_pt / px_dim.
        ops.push(Op::UseXobject {
            id: xobj_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(placement.x)),
                translate_y: Some(Pt(placement.y)),
                dpi: Some(72.0),
                scale_x: Some(placement.width / bg.px_width as f32),
                scale_y: Some(placement.height / bg.px_height as f32),
                rotate: None,
            },
        });
    }

    for element in &layout.elements {
        render_element(&mut ops, element, &handles);
    }

    let page = PdfPage::new(page_w, page_h, ops);
    doc.with_pages(vec![page]);
    doc.save(&PdfSaveOptions::default(), &mut Vec::new())
}

fn rgb(c: RgbColor) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

fn render_element(ops: &mut Vec<Op>, element: &Element, fonts: &FontHandles) {
    match element {
        Element::Text(run) => render_text(ops, run, fonts.get(run.variant)),
        Element::FillRect {
            x,
            y,
            width,
            height,
            color,
        } => {
            ops.push(Op::SetFillColor { col: rgb(*color) });
            ops.push(Op::DrawPolygon {
                polygon: Polygon {
                    rings: vec![PolygonRing {
                        points: vec![
                            point(*x, *y),
                            point(x + width, *y),
                            point(x + width, y + height),
                            point(*x, y + height),
                        ],
                    }],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                },
            });
        }
        Element::Grid {
            xs,
            ys,
            color,
            thickness,
        } => {
            let (Some(&x0), Some(&x1), Some(&y0), Some(&y1)) =
                (xs.first(), xs.last(), ys.first(), ys.last())
            else {
                return;
            };
            ops.push(Op::SetOutlineColor { col: rgb(*color) });
            ops.push(Op::SetOutlineThickness { pt: Pt(*thickness) });
            for &x in xs {
                push_line(ops, (x, y0), (x, y1));
            }
            for &y in ys {
                push_line(ops, (x0, y), (x1, y));
            }
        }
    }
}

fn push_line(ops: &mut Vec<Op>, from: (f32, f32), to: (f32, f32)) {
    ops.push(Op::DrawLine {
        line: Line {
            points: vec![point(from.0, from.1), point(to.0, to.1)],
            is_closed: false,
        },
    });
}

fn render_text(ops: &mut Vec<Op>, run: &TextRun, font: &FontHandle) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(run.x),
            y: Pt(run.y),
        },
    });
    ops.push(Op::SetFillColor { col: rgb(run.color) });
    match font {
        FontHandle::Builtin(font) => {
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(run.font_size),
                font: *font,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_ascii(&run.text))],
                font: *font,
            });
        }
        FontHandle::Embedded(id) => {
            ops.push(Op::SetFontSize {
                size: Pt(run.font_size),
                font: id.clone(),
            });
            ops.push(Op::WriteText {
                items: vec![TextItem::Text(run.text.clone())],
                font: id.clone(),
            });
        }
    }
    ops.push(Op::EndTextSection);
}

/// Reduce text to ASCII for a builtin font reference, which printpdf writes
/// as the string's raw bytes.
fn to_ascii(s: &str) -> String {
    s.chars()
        .map(|c| match fold_latin1(c) {
            '°' | 'º' => 'o',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_config::{BLACK, GRID_GRAY};

    fn sample_layout() -> InvoiceLayout {
        let mut layout = InvoiceLayout::letter("Cuenta de cobro test");
        layout.elements = vec![
            Element::FillRect {
                x: 40.0,
                y: 400.0,
                width: 500.0,
                height: 30.0,
                color: BLACK,
            },
            Element::Grid {
                xs: vec![40.0, 290.0, 540.0],
                ys: vec![370.0, 400.0],
                color: GRID_GRAY,
                thickness: 1.0,
            },
            Element::Text(TextRun {
                x: 40.0,
                y: 700.0,
                text: "Identificación: ñandú".to_string(),
                variant: FontVariant::Bold,
                font_size: 9.0,
                color: BLACK,
            }),
        ];
        layout
    }

    #[test]
    fn render_letter_page() {
        let bytes = render_pdf(&sample_layout(), &FontSet::Builtin, None);
        assert!(bytes.len() > 100, "PDF should have content");
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn grid_expands_to_lines() {
        let mut ops = Vec::new();
        let handles = FontHandles {
            regular: FontHandle::Builtin(BuiltinFont::Helvetica),
            bold: FontHandle::Builtin(BuiltinFont::HelveticaBold),
            italic: FontHandle::Builtin(BuiltinFont::HelveticaOblique),
        };
        render_element(&mut ops, &sample_layout().elements[1], &handles);
        let lines = ops
            .iter()
            .filter(|op| matches!(op, Op::DrawLine { .. }))
            .count();
        // three verticals, two horizontals
        assert_eq!(lines, 5);
    }

    #[test]
    fn builtin_family_is_embedded() {
        let mut doc = PdfDocument::new("fonts");
        let handles = FontHandles::register(&mut doc, &FontSet::Builtin);
        for variant in [FontVariant::Regular, FontVariant::Bold, FontVariant::Italic] {
            assert!(matches!(handles.get(variant), FontHandle::Embedded(_)));
        }
    }

    #[test]
    fn builtin_text_is_written_as_unicode() {
        let mut doc = PdfDocument::new("fonts");
        let handles = FontHandles::register(&mut doc, &FontSet::Builtin);
        let mut ops = Vec::new();
        render_element(&mut ops, &sample_layout().elements[2], &handles);
        let written: Vec<&str> = ops
            .iter()
            .filter_map(|op| match op {
                Op::WriteText { items, .. } => Some(items),
                _ => None,
            })
            .flatten()
            .filter_map(|item| match item {
                TextItem::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(written, vec!["Identificación: ñandú"]);
    }

    #[test]
    fn ascii_fallback_folds_accents() {
        assert_eq!(to_ascii("Cédula ñ N.°"), "Cedula n N.o");
        assert_eq!(to_ascii("→"), "?");
    }
}
