use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    errors::{ExportError, QuoteFlowError},
    export_store::ExportStore,
    quote_log::QuoteLog,
    quote_types::{QuoteRecord, QuoteSubmission},
    log_sequencer::LogSequencer,
    record_builder::build_record,
    spreadsheet::{render_export, RenderedExport, SpreadsheetEncoder},
    validation::{validate_submission, QuoteRules},
};

/// What happened to the spreadsheet export of an accepted quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The export was rendered and written to the export directory.
    Exported(RenderedExport),
    /// The export could not be produced. The quote was still accepted and logged, just without export metadata.
    Degraded { reason: String },
}

impl ExportOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn rendered(&self) -> Option<&RenderedExport> {
        match self {
            Self::Exported(export) => Some(export),
            Self::Degraded { .. } => None,
        }
    }
}

/// The result of a successful submission: the record as it was logged, and the fate of its export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedQuote {
    pub record: QuoteRecord,
    pub export: ExportOutcome,
}

/// `QuoteFlowApi` is the entry point for quote submissions.
///
/// A single instance owns the quote log, the document encoder, the export directory and the log sequencer, and must be
/// shared by every request handler. In particular, creating one instance per worker would break the uniqueness of quote
/// identifiers and the ordering of the log.
pub struct QuoteFlowApi<L, E> {
    log: L,
    encoder: E,
    exports: ExportStore,
    sequencer: LogSequencer,
    rules: QuoteRules,
}

impl<L, E> Debug for QuoteFlowApi<L, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "QuoteFlowApi({})", self.exports.dir().display())
    }
}

impl<L, E> QuoteFlowApi<L, E> {
    pub fn new(log: L, encoder: E, exports: ExportStore, rules: QuoteRules) -> Self {
        Self { log, encoder, exports, sequencer: LogSequencer::new(), rules }
    }

    pub fn exports(&self) -> &ExportStore {
        &self.exports
    }

    pub fn rules(&self) -> &QuoteRules {
        &self.rules
    }
}

impl<L, E> QuoteFlowApi<L, E>
where
    L: QuoteLog,
    E: SpreadsheetEncoder,
{
    /// Submit a quote received just now. See [`Self::submit_quote_at`].
    pub async fn submit_quote(&self, submission: QuoteSubmission) -> Result<AcceptedQuote, QuoteFlowError> {
        self.submit_quote_at(submission, Utc::now()).await
    }

    /// Validate, record, export and log a quote.
    ///
    /// The stages run strictly in order and never go back:
    ///
    /// | Stage      | On failure                                                       |
    /// |------------|------------------------------------------------------------------|
    /// | validating | [`QuoteFlowError::Rejected`]. Nothing is written.                |
    /// | building   | cannot fail                                                      |
    /// | exporting  | logged, and the quote continues as [`ExportOutcome::Degraded`]   |
    /// | logging    | [`QuoteFlowError::Persistence`]. Any export written is discarded |
    ///
    /// Exports run concurrently, but appends to the log happen in identifier order: a quote waits for every quote issued
    /// before it to be logged (or to fail) first.
    ///
    /// The export is kept when the log cannot tell whether the record reached it ([`crate::QuoteLogError::Indeterminate`]),
    /// so that a quote which did make it into the log never loses its spreadsheet.
    pub async fn submit_quote_at(
        &self,
        submission: QuoteSubmission,
        received_at: DateTime<Utc>,
    ) -> Result<AcceptedQuote, QuoteFlowError> {
        let quote = validate_submission(&submission, &self.rules).map_err(|e| {
            debug!("🍲️ Quote rejected ({}). {e}", e.reason_code());
            e
        })?;
        let ticket = self.sequencer.issue(received_at);
        let draft = build_record(quote, ticket.id().clone(), received_at);
        trace!("🍲️ Quote {} built. Total: {}", draft.id, draft.total);
        let (record, export) = match self.export(&draft).await {
            Ok((rendered, path)) => {
                let path = path.to_string_lossy().into_owned();
                (draft.with_export(rendered.filename.clone(), path), ExportOutcome::Exported(rendered))
            },
            Err(e) => {
                warn!("🍲️ Could not export quote {}. It will be accepted without a spreadsheet. {e}", draft.id);
                (draft, ExportOutcome::Degraded { reason: e.to_string() })
            },
        };
        ticket.wait_turn().await;
        let logged = self.log.append(&record).await;
        drop(ticket);
        if let Err(e) = logged {
            error!("🍲️ Could not write quote {} to the quote log. The quote is NOT accepted. {e}", record.id);
            match record.export_path.as_deref() {
                Some(path) if e.never_written() => self.exports.discard(Path::new(path)).await,
                Some(path) => warn!("🍲️ Quote {} may be in the log after all. Keeping its export at {path}", record.id),
                None => {},
            }
            return Err(QuoteFlowError::Persistence(e));
        }
        info!("🍲️ Quote {} accepted for {}. Total {}", record.id, record.customer_name, record.total);
        Ok(AcceptedQuote { record, export })
    }

    async fn export(&self, record: &QuoteRecord) -> Result<(RenderedExport, PathBuf), ExportError> {
        let rendered = render_export(record, &self.encoder)?;
        let path = self.exports.save(&rendered).await?;
        Ok((rendered, path))
    }
}
