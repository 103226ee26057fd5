//! Business rules for incoming quotes.
//!
//! [`validate_submission`] is pure: it reads nothing but its arguments and writes nothing. Rules are checked in a fixed
//! order and the first failure wins:
//!
//! 1. customer name and contact are present,
//! 2. the name is a plausible Chinese name,
//! 3. the contact is an 11-digit phone number,
//! 4. there is at least one line item,
//! 5. every amount, and the sum of the item subtotals, fits in [`Fen`],
//! 6. the declared total matches that sum, both rounded to the fen,
//! 7. the sum reaches the minimum order amount.
use hpq_common::Fen;
use log::*;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    errors::QuoteRejection,
    quote_types::{js_number, LineItem, LineItemInput, QuoteSubmission, ValidatedQuote},
};

pub const DEFAULT_MINIMUM_ORDER_YUAN: i64 = 100;
pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 8;
pub const CONTACT_DIGITS: usize = 11;

// One or two runs of CJK unified ideographs, joined by a single interpunct.
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\x{4e00}-\x{9fa5}]+(?:·[\x{4e00}-\x{9fa5}]+)?$").expect("name pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteRules {
    /// Orders whose recomputed total falls below this amount are turned away.
    pub minimum_total: Fen,
}

impl Default for QuoteRules {
    fn default() -> Self {
        Self { minimum_total: Fen::from_yuan(DEFAULT_MINIMUM_ORDER_YUAN) }
    }
}

impl QuoteRules {
    pub fn new(minimum_total: Fen) -> Self {
        Self { minimum_total }
    }
}

pub fn is_valid_customer_name(name: &str) -> bool {
    let len = name.chars().count();
    (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) && NAME_PATTERN.is_match(name)
}

pub fn is_valid_contact(contact: &str) -> bool {
    contact.len() == CONTACT_DIGITS && contact.bytes().all(|b| b.is_ascii_digit())
}

/// Check a raw submission against the business rules, returning the normalised quote if it passes.
pub fn validate_submission(submission: &QuoteSubmission, rules: &QuoteRules) -> Result<ValidatedQuote, QuoteRejection> {
    let name = trimmed(submission.customer_name.as_deref());
    let contact = trimmed(submission.customer_contact.as_deref());
    let (name, contact) = match (name, contact) {
        (Some(n), Some(c)) => (n, c),
        _ => return Err(QuoteRejection::MissingCustomer),
    };
    if !is_valid_customer_name(name) {
        trace!("🧾️ Rejecting customer name {name:?}");
        return Err(QuoteRejection::InvalidName);
    }
    if !is_valid_contact(contact) {
        return Err(QuoteRejection::InvalidContact);
    }
    let raw_items = match submission.items.as_deref() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(QuoteRejection::NoItems),
    };
    let items = raw_items.iter().map(LineItem::from_input).collect::<Result<Vec<_>, _>>().map_err(|e| {
        debug!("🧾️ Rejecting line item. {e}");
        QuoteRejection::AmountOutOfRange
    })?;
    // Summed as sent and rounded once, so sub-fen subtotals reconcile the way the ordering page adds them up
    let raw_total = raw_items.iter().map(LineItemInput::raw_subtotal).sum::<f64>();
    let calculated = Fen::from_decimal(raw_total).map_err(|e| {
        debug!("🧾️ Rejecting order total. {e}");
        QuoteRejection::AmountOutOfRange
    })?;
    let declared = submission.total.as_ref().and_then(js_number).and_then(|t| Fen::from_decimal(t).ok());
    if declared != Some(calculated) {
        debug!("🧾️ Declared total {declared:?} does not match the item subtotals, {calculated}");
        return Err(QuoteRejection::TotalMismatch { declared, calculated });
    }
    if calculated < rules.minimum_total {
        return Err(QuoteRejection::BelowMinimum { minimum: rules.minimum_total, calculated });
    }
    Ok(ValidatedQuote {
        customer_name: name.to_string(),
        customer_contact: contact.to_string(),
        customer_address: trimmed(submission.customer_address.as_deref()).map(String::from),
        items,
        calculated_total: calculated,
        order_time: trimmed(submission.order_time.as_deref()).map(String::from),
        created_at: trimmed(submission.created_at.as_deref()).map(String::from),
    })
}

fn trimmed(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
