//! Hot-pot Quote Engine
//!
//! This library contains the core logic for accepting order confirmations ("quotes") from the hot-pot delivery front
//! end. It is transport-agnostic: the HTTP server hands it a deserialized [`QuoteSubmission`] and gets back either an
//! [`AcceptedQuote`] or a [`QuoteFlowError`].
//!
//! A submission passes through the following stages, in order:
//! 1. Validation ([`mod@validation`]). Business rules are checked and the line items are normalised. The order total is
//!    recomputed from the item subtotals and must match what the client declared.
//! 2. Record building ([`mod@record_builder`]). The server assigns the identifier, receipt time and authoritative total.
//! 3. Export ([`mod@spreadsheet`] and [`mod@export_store`]). The record is rendered to a spreadsheet and written to the
//!    export directory. Failures here are *not* fatal; the quote is accepted in a degraded state.
//! 4. Audit logging ([`mod@quote_log`]). The record is appended to the append-only log, in identifier order
//!    ([`mod@log_sequencer`]). This is the authoritative record of acceptance, so failures here fail the submission.
//!
//! [`QuoteFlowApi`] drives the stages. The document encoder and the log sit behind the [`SpreadsheetEncoder`] and
//! [`QuoteLog`] traits so that alternative backends (or test doubles) can be plugged in.
pub mod errors;
pub mod export_store;
pub mod log_sequencer;
pub mod quote_flow_api;
pub mod quote_log;
pub mod quote_types;
pub mod record_builder;
pub mod spreadsheet;
pub mod validation;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use errors::{ExportError, QuoteFlowError, QuoteLogError, QuoteRejection};
pub use export_store::{sanitize_export_id, ExportStore, LocatedExport};
pub use log_sequencer::{LogSequencer, LogTicket};
pub use quote_flow_api::{AcceptedQuote, ExportOutcome, QuoteFlowApi};
pub use quote_log::{JsonLinesLog, QuoteLog};
pub use quote_types::{LineItem, LineItemInput, QuoteId, QuoteRecord, QuoteSubmission, ValidatedQuote};
pub use record_builder::{build_record, QuoteIdGenerator};
pub use spreadsheet::{render_export, render_quote_sheet, Cell, RenderedExport, Sheet, SpreadsheetEncoder, XlsxEncoder};
pub use validation::{validate_submission, QuoteRules};
