use std::fmt::Display;

use chrono::{DateTime, Utc};
use hpq_common::{Fen, FenConversionError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

//--------------------------------------      QuoteId        ---------------------------------------------------------
/// The server-assigned identifier of an accepted quote, e.g. `Q1718000000123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(pub String);

pub const QUOTE_ID_PREFIX: &str = "Q";

impl QuoteId {
    pub fn from_millis(millis: i64) -> Self {
        Self(format!("{QUOTE_ID_PREFIX}{millis}"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for QuoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------   QuoteSubmission   ---------------------------------------------------------
/// A quote as the front end sends it. Nothing in here is trusted.
///
/// Numeric fields are kept as raw JSON values, since browsers happily send `"30"`, `30` or `""` for the same field.
/// See [`js_number`] for how they are interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSubmission {
    pub customer_name: Option<String>,
    pub customer_contact: Option<String>,
    pub customer_address: Option<String>,
    pub items: Option<Vec<LineItemInput>>,
    pub total: Option<Value>,
    pub order_time: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItemInput {
    pub name: Option<String>,
    pub spec: Option<String>,
    pub price: Option<Value>,
    pub qty: Option<Value>,
    pub subtotal: Option<Value>,
}

/// Interpret a loosely-typed JSON value as a number, the way a browser front end would coerce it.
///
/// * numbers are taken as-is,
/// * strings are trimmed and parsed; the empty string is zero,
/// * `true`/`false` are 1 and 0,
/// * `null` is zero,
/// * anything else (arrays, objects, unparseable strings) is not a number.
pub fn js_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0.0)
            } else {
                s.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        },
        Value::Array(_) | Value::Object(_) => None,
    }
}

//--------------------------------------      LineItem       ---------------------------------------------------------
/// A normalised line item. Money and quantities are numeric, and the text fields are never missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub spec: String,
    pub price: Fen,
    pub qty: u32,
    pub subtotal: Fen,
}

impl LineItem {
    /// Normalise a client line item. Values that are not numbers (or are negative, in the case of quantities) become
    /// zero. A number too large to hold in [`Fen`] is an error rather than a silent zero.
    pub fn from_input(input: &LineItemInput) -> Result<Self, FenConversionError> {
        let money = |v: &Option<Value>| match v.as_ref().and_then(js_number) {
            Some(n) => Fen::from_decimal(n),
            None => Ok(Fen::default()),
        };
        let qty = input
            .qty
            .as_ref()
            .and_then(js_number)
            .filter(|q| *q >= 0.0)
            .map(|q| q.trunc().min(f64::from(u32::MAX)) as u32)
            .unwrap_or(0);
        Ok(Self {
            name: input.name.as_deref().unwrap_or_default().trim().to_string(),
            spec: input.spec.as_deref().unwrap_or_default().trim().to_string(),
            price: money(&input.price)?,
            qty,
            subtotal: money(&input.subtotal)?,
        })
    }
}

impl LineItemInput {
    /// The subtotal exactly as the client sent it, before any rounding. Missing or non-numeric subtotals are zero.
    pub fn raw_subtotal(&self) -> f64 {
        self.subtotal.as_ref().and_then(js_number).unwrap_or(0.0)
    }
}

//--------------------------------------   ValidatedQuote    ---------------------------------------------------------
/// A submission that has passed every business rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuote {
    pub customer_name: String,
    pub customer_contact: String,
    pub customer_address: Option<String>,
    pub items: Vec<LineItem>,
    /// The sum of the item subtotals. This is the authoritative order total.
    pub calculated_total: Fen,
    pub order_time: Option<String>,
    pub created_at: Option<String>,
}

//--------------------------------------     QuoteRecord     ---------------------------------------------------------
/// The server's immutable record of an accepted quote. This is exactly what is written to the quote log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub id: QuoteId,
    pub customer_name: String,
    pub customer_contact: String,
    pub customer_address: Option<String>,
    pub items: Vec<LineItem>,
    pub total: Fen,
    pub order_time: String,
    pub received_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_path: Option<String>,
}

impl QuoteRecord {
    /// Attach the export metadata. The record is consumed, so a record is never changed once it has been handed out.
    pub fn with_export(self, filename: String, path: String) -> Self {
        Self { export_filename: Some(filename), export_path: Some(path), ..self }
    }

    pub fn has_export(&self) -> bool {
        self.export_filename.is_some()
    }
}
