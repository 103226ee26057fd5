use std::time::Duration;

use actix_web::{
    dev::Server,
    http::KeepAlive,
    middleware::{Condition, Logger},
    web,
    App,
    HttpServer,
};
use hotpot_quote_engine::{ExportStore, JsonLinesLog, QuoteFlowApi, QuoteLog, SpreadsheetEncoder, XlsxEncoder};
use log::info;

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    helpers::cors_headers,
    routes::{fallback, health, quote_export, SubmitQuoteRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let log = JsonLinesLog::open(&config.quote_log_file).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let exports = ExportStore::new(&config.export_dir);
    let api = QuoteFlowApi::new(log, XlsxEncoder, exports, config.quote_rules());
    let srv = create_server_instance(config, api)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Build the HTTP server around a single, shared [`QuoteFlowApi`].
///
/// The api is created once, outside the worker factory, so that every worker hands out quote ids from the same
/// generator and appends to the same log handle.
pub fn create_server_instance(
    config: ServerConfig,
    api: QuoteFlowApi<JsonLinesLog, XlsxEncoder>,
) -> Result<Server, ServerError> {
    let api = web::Data::new(api);
    let options = web::Data::new(ServerOptions::from_config(&config));
    let access_log = config.access_log;
    info!("💻️ Accepting request bodies of up to {} bytes", config.max_body_bytes);
    let srv = HttpServer::new(move || {
        let api = api.clone();
        let options = options.clone();
        App::new()
            .wrap(cors_headers())
            .wrap(Condition::new(
                access_log,
                Logger::new("%t (%D ms) %s %a %{Host}i %r").log_target("hpq::access_log"),
            ))
            .configure(|cfg| configure_quote_service(cfg, api, options))
            .default_service(web::to(fallback))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Register the shared state and every route. Used by the server itself and by the endpoint tests.
pub fn configure_quote_service<L, E>(
    cfg: &mut web::ServiceConfig,
    api: web::Data<QuoteFlowApi<L, E>>,
    options: web::Data<ServerOptions>,
) where
    L: QuoteLog + 'static,
    E: SpreadsheetEncoder + 'static,
{
    let exports = web::Data::new(api.exports().clone());
    cfg.app_data(api)
        .app_data(exports)
        .app_data(options)
        .service(health)
        .service(web::scope("/api").service(SubmitQuoteRoute::<L, E>::new()).service(quote_export));
}
