use log::*;
use serde_json::json;
use tempfile::TempDir;

use crate::{
    quote_types::QuoteSubmission,
    quote_log::JsonLinesLog,
    spreadsheet::SpreadsheetEncoder,
    ExportStore,
    QuoteFlowApi,
    QuoteRules,
};

pub const QUOTE_LOG_FILENAME: &str = "quotes.jsonl";
pub const EXPORT_DIRNAME: &str = "exports";

pub fn prepare_test_env() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
}

/// A scratch directory holding a quote log and an export directory. Everything is removed when this is dropped.
pub struct TestWorkspace {
    pub dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Error creating temporary directory");
        info!("🚀️ Test workspace created at {}", dir.path().display());
        Self { dir }
    }

    pub async fn quote_log(&self) -> JsonLinesLog {
        JsonLinesLog::open(self.dir.path().join(QUOTE_LOG_FILENAME)).await.expect("Error opening quote log")
    }

    pub fn export_store(&self) -> ExportStore {
        ExportStore::new(self.dir.path().join(EXPORT_DIRNAME))
    }

    pub async fn quote_api<E: SpreadsheetEncoder>(&self, encoder: E) -> QuoteFlowApi<JsonLinesLog, E> {
        QuoteFlowApi::new(self.quote_log().await, encoder, self.export_store(), QuoteRules::default())
    }

    /// The raw lines of the quote log.
    pub fn log_lines(&self) -> Vec<String> {
        match std::fs::read_to_string(self.dir.path().join(QUOTE_LOG_FILENAME)) {
            Ok(s) => s.lines().map(String::from).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A valid quote: 毛肚 30 x 2 and a 鸳鸯锅底 at 50, for a total of 110.
pub fn sample_submission() -> QuoteSubmission {
    serde_json::from_value(sample_submission_json()).expect("sample submission is valid")
}

pub fn sample_submission_json() -> serde_json::Value {
    json!({
        "customerName": "张三",
        "customerContact": "13800138000",
        "customerAddress": "成都市武侯区科华北路 1 号",
        "items": [
            { "name": "毛肚", "spec": "大份", "price": 30, "qty": 2, "subtotal": 60 },
            { "name": "鸳鸯锅底", "spec": "微辣", "price": 50, "qty": 1, "subtotal": 50 }
        ],
        "total": 110
    })
}
