use actix_web::{http::header, middleware::DefaultHeaders, web};
use bytes::BytesMut;
use futures::StreamExt;
use log::{debug, trace};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::errors::ServerError;

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// The headers that let the ordering page call the server from any origin. They are added to every response.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .add((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"))
        .add((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
}

/// Read the whole request body, giving up as soon as it grows past `limit` bytes.
///
/// Anything the client managed to send before it disconnected is dropped along with the error.
pub async fn read_capped_body(mut payload: web::Payload, limit: usize) -> Result<BytesMut, ServerError> {
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
        if body.len() + chunk.len() > limit {
            debug!("💻️ Request body exceeds {limit} bytes. Rejecting it.");
            return Err(ServerError::PayloadTooLarge(limit));
        }
        body.extend_from_slice(&chunk);
    }
    trace!("💻️ Read {} byte request body", body.len());
    Ok(body)
}

/// Stream a file back in chunks of up to 64 KiB. A read error ends the stream.
pub fn file_stream(file: File) -> ReaderStream<File> {
    ReaderStream::with_capacity(file, STREAM_CHUNK_SIZE)
}
