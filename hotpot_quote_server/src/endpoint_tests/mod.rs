mod exports;
mod helpers;
mod mocks;
mod quotes;

mod misc {
    use actix_web::{http::StatusCode, test::TestRequest};
    use hotpot_quote_engine::{test_utils::prepare_env::TestWorkspace, XlsxEncoder};

    use super::helpers::send_request;
    use crate::config::ServerOptions;

    #[actix_web::test]
    async fn health_endpoint() {
        let workspace = TestWorkspace::new();
        let api = workspace.quote_api(XlsxEncoder).await;
        let res = send_request(api, ServerOptions::default(), TestRequest::get().uri("/health")).await;
        assert!(res.status.is_success());
        assert_eq!(res.body, "👍️\n");
    }

    #[actix_web::test]
    async fn preflight_requests_get_cors_headers() {
        let workspace = TestWorkspace::new();
        let api = workspace.quote_api(XlsxEncoder).await;
        let req = TestRequest::default().method(actix_web::http::Method::OPTIONS).uri("/api/hotpot-quote");
        let res = send_request(api, ServerOptions::default(), req).await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.body.is_empty());
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
        assert_eq!(res.header("access-control-allow-methods"), Some("GET, POST, OPTIONS"));
        assert_eq!(res.header("access-control-allow-headers"), Some("Content-Type"));
    }

    #[actix_web::test]
    async fn unknown_paths_are_not_found() {
        let workspace = TestWorkspace::new();
        let api = workspace.quote_api(XlsxEncoder).await;
        let res = send_request(api, ServerOptions::default(), TestRequest::get().uri("/api/orders")).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
        assert_eq!(res.json(), serde_json::json!({ "ok": false, "message": "Not Found" }));
    }

    #[actix_web::test]
    async fn wrong_method_on_a_known_path_is_not_found() {
        let workspace = TestWorkspace::new();
        let api = workspace.quote_api(XlsxEncoder).await;
        let res = send_request(api, ServerOptions::default(), TestRequest::get().uri("/api/hotpot-quote")).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.json()["message"], "Not Found");
    }
}
