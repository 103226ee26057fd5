use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use hotpot_quote_engine::{QuoteFlowError, QuoteRejection};
use log::error;
use thiserror::Error;

use crate::data_objects::JsonResponse;

/// Shown to clients in place of the details of any server-side failure.
pub const GENERIC_SERVER_ERROR: &str = "服务器内部错误，请稍后重试";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("The request body is larger than the {0} byte limit")]
    PayloadTooLarge(usize),
    #[error("Payload deserialization error. {0}")]
    CouldNotDeserializePayload(String),
    #[error("The quote was rejected. {0}")]
    QuoteRejected(#[from] QuoteRejection),
    #[error("Could not persist the quote. {0}")]
    PersistenceError(String),
    #[error("No export exists for quote {0}")]
    ExportNotFound(String),
    #[error("Could not read the export. {0}")]
    ExportReadError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Not Found")]
    RouteNotFound,
}

impl From<QuoteFlowError> for ServerError {
    fn from(e: QuoteFlowError) -> Self {
        match e {
            QuoteFlowError::Rejected(r) => Self::QuoteRejected(r),
            QuoteFlowError::Persistence(e) => Self::PersistenceError(e.to_string()),
        }
    }
}

impl ServerError {
    /// The message that goes back to the client. Validation messages are passed on verbatim; anything that went wrong
    /// inside the server is replaced with [`GENERIC_SERVER_ERROR`].
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidRequestBody(_) | Self::CouldNotDeserializePayload(_) => "请求数据格式不正确".to_string(),
            Self::PayloadTooLarge(_) => "请求数据过大".to_string(),
            Self::QuoteRejected(r) => r.to_string(),
            Self::ExportNotFound(_) => "未找到该报价单的Excel文件".to_string(),
            Self::RouteNotFound => "Not Found".to_string(),
            Self::InitializeError(_) |
            Self::PersistenceError(_) |
            Self::ExportReadError(_) |
            Self::IOError(_) |
            Self::ConfigurationError(_) |
            Self::Unspecified(_) => GENERIC_SERVER_ERROR.to_string(),
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::BAD_REQUEST,
            Self::CouldNotDeserializePayload(_) => StatusCode::BAD_REQUEST,
            Self::QuoteRejected(_) => StatusCode::BAD_REQUEST,
            Self::ExportNotFound(_) => StatusCode::NOT_FOUND,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ExportReadError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ {self}");
        }
        HttpResponse::build(status).insert_header(ContentType::json()).json(JsonResponse::failure(self.client_message()))
    }
}
