//! Invoice data model and line-item validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::InputError;

/// Default observations text. When the caller passes exactly this string the
/// invoice shows the concept instead.
pub const DEFAULT_OBSERVATIONS: &str =
    "No responsable de IVA. Cuenta de cobro emitida bajo el régimen de tributación simplificada.";

/// One billable service entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(alias = "descripcion")]
    pub description: String,
    #[serde(alias = "cantidad")]
    pub quantity: Decimal,
    #[serde(alias = "precio_unitario")]
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// quantity × unit price, `None` when the product does not fit in a
    /// `Decimal`.
    pub fn total(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }
}

/// Everything needed to render one invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub client_name: String,
    pub client_id: String,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub observations: Option<String>,
    pub concept: String,
    pub date: String,
    #[serde(default)]
    pub service_project: Option<String>,
}

impl InvoiceRequest {
    /// Sum of every line total, `None` on overflow. See [`check_totals`]
    /// for the failing line.
    pub fn grand_total(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.total()?))
    }

    /// Text for the "Servicio / Proyecto" line: the service/project label
    /// when one is given, else the concept.
    pub fn service_label(&self) -> &str {
        match self.service_project.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.concept,
        }
    }

    /// Observations worth printing as a paragraph. `None` when they are
    /// absent, empty, or the default placeholder.
    pub fn custom_observations(&self) -> Option<&str> {
        match self.observations.as_deref() {
            Some(text) if !text.is_empty() && text != DEFAULT_OBSERVATIONS => Some(text),
            _ => None,
        }
    }
}

// JSON field names, English first, then the Spanish aliases.
const DESCRIPTION_KEYS: [&str; 2] = ["description", "descripcion"];
const QUANTITY_KEYS: [&str; 2] = ["quantity", "cantidad"];
const UNIT_PRICE_KEYS: [&str; 2] = ["unit_price", "precio_unitario"];

/// Parse and validate a JSON array of line items.
pub fn parse_line_items(json: &str) -> Result<Vec<LineItem>, InputError> {
    let value: Value = serde_json::from_str(json)?;
    let entries = value.as_array().ok_or(InputError::NotAList)?;

    // Shape first: a list of mappings, every one carrying the three keys.
    let mut objects = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let obj = entry
            .as_object()
            .ok_or(InputError::NotAnObject { index })?;
        for keys in [&DESCRIPTION_KEYS, &QUANTITY_KEYS, &UNIT_PRICE_KEYS] {
            if lookup(obj, keys).is_none() {
                return Err(InputError::MissingField {
                    index,
                    field: keys[0],
                });
            }
        }
        objects.push(obj);
    }

    let items = objects
        .into_iter()
        .enumerate()
        .map(|(index, obj)| line_item_from_object(index, obj))
        .collect::<Result<Vec<_>, _>>()?;
    check_totals(&items)?;
    Ok(items)
}

/// Compute the grand total, naming the first line whose total (or whose
/// addition to the running sum) overflows.
pub fn check_totals(items: &[LineItem]) -> Result<Decimal, InputError> {
    let mut grand_total = Decimal::ZERO;
    for (index, item) in items.iter().enumerate() {
        let total = item.total().ok_or_else(|| InputError::InvalidField {
            index,
            field: "total",
            reason: format!(
                "{} × {} is too large to represent",
                item.quantity, item.unit_price
            ),
        })?;
        grand_total = grand_total
            .checked_add(total)
            .ok_or_else(|| InputError::InvalidField {
                index,
                field: "total",
                reason: "the grand total is too large to represent".to_string(),
            })?;
    }
    Ok(grand_total)
}

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str; 2]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

fn line_item_from_object(index: usize, obj: &Map<String, Value>) -> Result<LineItem, InputError> {
    let description = match lookup(obj, &DESCRIPTION_KEYS) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::String(_)) => {
            return Err(InputError::InvalidField {
                index,
                field: DESCRIPTION_KEYS[0],
                reason: "must not be blank".to_string(),
            })
        }
        _ => {
            return Err(InputError::InvalidField {
                index,
                field: DESCRIPTION_KEYS[0],
                reason: "must be a string".to_string(),
            })
        }
    };

    let quantity = non_negative_number(index, &QUANTITY_KEYS, obj)?;
    let unit_price = non_negative_number(index, &UNIT_PRICE_KEYS, obj)?;

    Ok(LineItem {
        description,
        quantity,
        unit_price,
    })
}

fn non_negative_number(
    index: usize,
    keys: &[&'static str; 2],
    obj: &Map<String, Value>,
) -> Result<Decimal, InputError> {
    let field = keys[0];
    let value = lookup(obj, keys).ok_or(InputError::MissingField { index, field })?;

    let invalid = |reason: String| InputError::InvalidField {
        index,
        field,
        reason,
    };

    let number = match value {
        Value::Number(_) | Value::String(_) => serde_json::from_value::<Decimal>(value.clone())
            .map_err(|e| invalid(format!("not a number ({e})")))?,
        other => return Err(invalid(format!("expected a number, got {other}"))),
    };

    if number.is_sign_negative() && !number.is_zero() {
        return Err(invalid(format!("must not be negative, got {number}")));
    }
    Ok(number)
}
