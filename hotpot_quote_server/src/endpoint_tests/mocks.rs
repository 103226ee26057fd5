use hotpot_quote_engine::{ExportError, QuoteLog, QuoteLogError, QuoteRecord, Sheet, SpreadsheetEncoder};
use mockall::mock;

mock! {
    pub QuoteLogger {}
    impl QuoteLog for QuoteLogger {
        async fn append(&self, record: &QuoteRecord) -> Result<(), QuoteLogError>;
    }
}

mock! {
    pub Encoder {}
    impl SpreadsheetEncoder for Encoder {
        fn encode(&self, sheet: &Sheet) -> Result<Vec<u8>, ExportError>;
    }
}
