//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. The quote log, the export directory and the export downloads are
//! all accessed through tokio's async file API for this reason. Spreadsheet encoding is CPU-bound but only takes a
//! fraction of a millisecond for a quote-sized sheet.
use actix_web::{
    get,
    http::{
        header::{ContentDisposition, DispositionParam, DispositionType},
        Method,
    },
    web,
    HttpRequest,
    HttpResponse,
    Responder,
};
use hotpot_quote_engine::{sanitize_export_id, ExportStore, QuoteFlowApi, QuoteLog, QuoteSubmission, SpreadsheetEncoder};
use log::*;

use crate::{
    config::ServerOptions,
    data_objects::QuoteResponse,
    errors::ServerError,
    helpers::{file_stream, read_capped_body, XLSX_CONTENT_TYPE},
};

// actix's route attributes cannot take generic handlers, so `route!` writes the service factory by hand.
//
// `route!(handler => Method "/path" impl TraitA, TraitB)` defines `HandlerRoute<A, B>`, which registers
// `handler::<A, B>` for `Method` requests on `/path`. The guard sits on the resource, so other methods on the same
// path fall through to the app's default service.
#[macro_export]
macro_rules! route {
    ($handler:ident => $method:ident $path:literal impl $($bound:ident),+) => {
        paste::paste! {
            pub struct [<$handler:camel Route>]<$([<$bound Impl>]),+> {
                _impls: core::marker::PhantomData<fn() -> ($([<$bound Impl>],)+)>,
            }

            impl<$([<$bound Impl>]),+> Default for [<$handler:camel Route>]<$([<$bound Impl>]),+> {
                fn default() -> Self {
                    Self { _impls: core::marker::PhantomData }
                }
            }

            impl<$([<$bound Impl>]),+> [<$handler:camel Route>]<$([<$bound Impl>]),+> {
                pub fn new() -> Self {
                    Self::default()
                }
            }

            impl<$([<$bound Impl>]),+> actix_web::dev::HttpServiceFactory for [<$handler:camel Route>]<$([<$bound Impl>]),+>
            where $([<$bound Impl>]: $bound + 'static),+
            {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let resource = actix_web::Resource::new($path)
                        .name(stringify!($handler))
                        .guard(actix_web::guard::$method())
                        .to($handler::<$([<$bound Impl>]),+>);
                    actix_web::dev::HttpServiceFactory::register(resource, config);
                }
            }
        }
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------   Quotes  ----------------------------------------------------
route!(submit_quote => Post "/hotpot-quote" impl QuoteLog, SpreadsheetEncoder);
/// Route handler for quote submissions.
///
/// The body is read by hand rather than through the `Json` extractor so that oversized and malformed bodies are both
/// reported as a plain 400 with the usual `{ ok, message }` body.
///
/// On success the response carries the quote id, the server's receipt time, the record as it was logged and, if the
/// spreadsheet could be produced, its filename and base64-encoded contents.
pub async fn submit_quote<L, E>(
    payload: web::Payload,
    options: web::Data<ServerOptions>,
    api: web::Data<QuoteFlowApi<L, E>>,
) -> Result<HttpResponse, ServerError>
where
    L: QuoteLog,
    E: SpreadsheetEncoder,
{
    let body = read_capped_body(payload, options.max_body_bytes).await?;
    let submission = serde_json::from_slice::<QuoteSubmission>(&body).map_err(|e| {
        debug!("💻️ Could not parse quote submission. {e}");
        ServerError::CouldNotDeserializePayload(e.to_string())
    })?;
    let accepted = api.submit_quote(submission).await?;
    Ok(HttpResponse::Ok().json(QuoteResponse::from(accepted)))
}

// ----------------------------------------------   Exports  ---------------------------------------------------
/// Route handler for spreadsheet downloads.
///
/// The identifier is sanitized by the export store before it touches the filesystem. Anything that does not resolve
/// to an existing export, including traversal attempts, is a plain 404.
#[get("/hotpot-quote/{id}/excel")]
pub async fn quote_export(path: web::Path<String>, exports: web::Data<ExportStore>) -> Result<HttpResponse, ServerError> {
    let raw_id = path.into_inner();
    trace!("💻️ Export requested for {raw_id:?}");
    let export = exports
        .locate(&raw_id)
        .await
        .map_err(|e| ServerError::ExportReadError(e.to_string()))?
        .ok_or_else(|| ServerError::ExportNotFound(sanitize_export_id(&raw_id)))?;
    let file = tokio::fs::File::open(&export.path).await.map_err(|e| {
        warn!("💻️ Export {} was located but could not be opened. {e}", export.path.display());
        ServerError::ExportReadError(e.to_string())
    })?;
    debug!("💻️ Sending {} ({} bytes)", export.filename, export.len);
    Ok(HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(export.filename)],
        })
        .no_chunking(export.len)
        .streaming(file_stream(file)))
}

// ----------------------------------------------   Fallback  --------------------------------------------------
/// Answers CORS preflight requests for any path, and 404s everything else that no route claimed.
pub async fn fallback(req: HttpRequest) -> Result<HttpResponse, ServerError> {
    if req.method() == Method::OPTIONS {
        trace!("💻️ Preflight request for {}", req.path());
        return Ok(HttpResponse::Ok().finish());
    }
    debug!("💻️ No route for {} {}", req.method(), req.path());
    Err(ServerError::RouteNotFound)
}
