use actix_web::{
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
};
use bytes::Bytes;
use hotpot_quote_engine::{QuoteFlowApi, QuoteLog, SpreadsheetEncoder};
use log::debug;

use crate::{config::ServerOptions, helpers::cors_headers, routes::fallback, server::configure_quote_service};

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Send a single request to an app built the same way as the real server, around the given api.
pub async fn send_request<L, E>(api: QuoteFlowApi<L, E>, options: ServerOptions, req: TestRequest) -> TestResponse
where
    L: QuoteLog + 'static,
    E: SpreadsheetEncoder + 'static,
{
    let mut responses = send_requests(api, options, vec![req]).await;
    responses.remove(0)
}

/// Send a batch of requests concurrently to the same app instance.
pub async fn send_requests<L, E>(
    api: QuoteFlowApi<L, E>,
    options: ServerOptions,
    reqs: Vec<TestRequest>,
) -> Vec<TestResponse>
where
    L: QuoteLog + 'static,
    E: SpreadsheetEncoder + 'static,
{
    let api = web::Data::new(api);
    let options = web::Data::new(options);
    let app = App::new()
        .wrap(cors_headers())
        .configure(|cfg| configure_quote_service(cfg, api, options))
        .default_service(web::to(fallback));
    let service = test::init_service(app).await;
    debug!("Making {} request(s)", reqs.len());
    let calls = reqs.into_iter().map(|req| test::call_service(&service, req.to_request()));
    let mut responses = Vec::new();
    for res in futures::future::join_all(calls).await {
        let status = res.status();
        let headers = res.headers().clone();
        let body = test::read_body(res).await;
        responses.push(TestResponse { status, headers, body });
    }
    responses
}

pub fn post_quote(body: &serde_json::Value) -> TestRequest {
    TestRequest::post()
        .uri("/api/hotpot-quote")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string())
}
