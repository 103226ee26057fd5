use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};
use hotpot_quote_engine::{AcceptedQuote, QuoteRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub ok: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn failure<S: Display>(message: S) -> Self {
        Self { ok: false, message: message.to_string() }
    }
}

/// The body of a successful quote submission.
///
/// The export fields are absent when the spreadsheet could not be produced. The quote is still accepted in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub ok: bool,
    pub id: String,
    pub server_time: String,
    pub record: QuoteRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_base64: Option<String>,
}

impl From<AcceptedQuote> for QuoteResponse {
    fn from(accepted: AcceptedQuote) -> Self {
        let (export_filename, export_base64) = match accepted.export.rendered() {
            Some(export) => (Some(export.filename.clone()), Some(export.base64.clone())),
            None => (None, None),
        };
        let record = accepted.record;
        Self {
            ok: true,
            id: record.id.as_str().to_string(),
            server_time: server_time(&record.received_at),
            record,
            export_filename,
            export_base64,
        }
    }
}

pub fn server_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}
