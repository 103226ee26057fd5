use hpq_common::Fen;
use thiserror::Error;

/// The reasons a quote can be turned away by the validator. The messages are shown to the customer as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteRejection {
    #[error("请填写客户姓名和联系电话")]
    MissingCustomer,
    #[error("客户姓名格式不正确，请填写2-8位中文姓名")]
    InvalidName,
    #[error("联系电话格式不正确，请填写11位手机号码")]
    InvalidContact,
    #[error("请至少选择一个菜品")]
    NoItems,
    #[error("菜品金额超出可处理范围，请核对后重新提交")]
    AmountOutOfRange,
    #[error("订单金额与菜品小计合计（{calculated}）不一致，请刷新页面后重新提交")]
    TotalMismatch { declared: Option<Fen>, calculated: Fen },
    #[error("订单金额未达到最低起订金额 {minimum}")]
    BelowMinimum { minimum: Fen, calculated: Fen },
}

impl QuoteRejection {
    /// A stable, machine-friendly code for the rejection. Used in the operational logs.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::MissingCustomer => "missing_customer",
            Self::InvalidName => "invalid_name",
            Self::InvalidContact => "invalid_contact",
            Self::NoItems => "no_items",
            Self::AmountOutOfRange => "amount_out_of_range",
            Self::TotalMismatch { .. } => "total_mismatch",
            Self::BelowMinimum { .. } => "below_minimum",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Could not encode the spreadsheet. {0}")]
    Encoding(String),
    #[error("Could not access the export file. {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum QuoteLogError {
    /// Nothing from this append is in the log.
    #[error("Could not write to the quote log. {0}")]
    Io(#[from] std::io::Error),
    /// The append failed and could not be rolled back, so the record may or may not be in the log.
    #[error("Could not write to the quote log, and the partial write could not be removed. {0}")]
    Indeterminate(std::io::Error),
    #[error("Could not serialize the quote record. {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QuoteLogError {
    /// True when the failed record is known not to be in the log.
    pub fn never_written(&self) -> bool {
        !matches!(self, Self::Indeterminate(_))
    }
}

#[derive(Debug, Error)]
pub enum QuoteFlowError {
    #[error("The quote was rejected. {0}")]
    Rejected(#[from] QuoteRejection),
    #[error("The quote could not be persisted. {0}")]
    Persistence(#[from] QuoteLogError),
}
