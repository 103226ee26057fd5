//! Turns a validated quote into a [`QuoteRecord`] by assigning the server-controlled fields.
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use log::*;

use crate::quote_types::{QuoteId, QuoteRecord, ValidatedQuote};

/// Issues quote identifiers of the form `Q<milliseconds>`.
///
/// Identifiers handed out by one generator are strictly increasing, and therefore never repeat, no matter how many
/// requests arrive in the same millisecond: if the clock has not moved past the last issued value, the last value plus
/// one is used instead. A single generator must be shared by everything that creates records.
#[derive(Debug, Default)]
pub struct QuoteIdGenerator {
    last: AtomicI64,
}

impl QuoteIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self, now: DateTime<Utc>) -> QuoteId {
        QuoteId::from_millis(self.next_millis(now))
    }

    /// The numeric part of the next identifier. Compare these, not the `Q…` strings, when ordering quotes.
    pub fn next_millis(&self, now: DateTime<Utc>) -> i64 {
        let now_ms = now.timestamp_millis();
        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let candidate = now_ms.max(last + 1);
            match self.last.compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => {
                    if candidate != now_ms {
                        trace!("🆔️ Clock collision at {now_ms}. Issued {candidate} instead.");
                    }
                    return candidate;
                },
                Err(actual) => last = actual,
            }
        }
    }
}

/// Build the record for a validated quote received at `received_at`, under the identifier issued for it.
///
/// The order time falls back from the client's `orderTime`, to the client's `createdAt`, to the receipt time. The
/// total is always the recomputed one.
pub fn build_record(quote: ValidatedQuote, id: QuoteId, received_at: DateTime<Utc>) -> QuoteRecord {
    let order_time = quote
        .order_time
        .or(quote.created_at)
        .unwrap_or_else(|| received_at.to_rfc3339_opts(SecondsFormat::Millis, true));
    QuoteRecord {
        id,
        customer_name: quote.customer_name,
        customer_contact: quote.customer_contact,
        customer_address: quote.customer_address,
        items: quote.items,
        total: quote.calculated_total,
        order_time,
        received_at,
        export_filename: None,
        export_path: None,
    }
}
