use actix_web::{http::StatusCode, test::TestRequest};
use hotpot_quote_engine::{
    test_utils::prepare_env::{prepare_test_env, sample_submission, TestWorkspace},
    XlsxEncoder,
};
use serde_json::json;

use super::helpers::send_request;
use crate::{config::ServerOptions, helpers::XLSX_CONTENT_TYPE};

#[actix_web::test]
async fn download_an_export() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let api = workspace.quote_api(XlsxEncoder).await;
    let accepted = api.submit_quote(sample_submission()).await.expect("sample quote is accepted");
    let id = accepted.record.id.as_str().to_string();
    let expected = std::fs::read(workspace.export_store().dir().join(format!("{id}.xlsx"))).unwrap();

    let req = TestRequest::get().uri(&format!("/api/hotpot-quote/{id}/excel"));
    let res = send_request(api, ServerOptions::default(), req).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("content-type"), Some(XLSX_CONTENT_TYPE));
    assert_eq!(res.header("content-disposition"), Some(format!("attachment; filename=\"{id}.xlsx\"").as_str()));
    assert_eq!(res.header("access-control-allow-origin"), Some("*"));
    assert_eq!(res.body.as_ref(), expected.as_slice());
}

#[actix_web::test]
async fn missing_exports_are_not_found() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let api = workspace.quote_api(XlsxEncoder).await;
    let req = TestRequest::get().uri("/api/hotpot-quote/Q1718000000000/excel");
    let res = send_request(api, ServerOptions::default(), req).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let body = res.json();
    assert_eq!(body["ok"], false);
    assert_eq!(body["message"], "未找到该报价单的Excel文件");
}

#[actix_web::test]
async fn traversal_attempts_are_not_found() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    // Something a naive path join would find
    std::fs::write(workspace.dir.path().join("passwd.xlsx"), b"secret").unwrap();
    let paths = [
        "/api/hotpot-quote/..%2Fpasswd/excel",
        "/api/hotpot-quote/..%2F..%2Fetc%2Fpasswd/excel",
        "/api/hotpot-quote/../../etc/passwd/excel",
        "/api/hotpot-quote/%2E%2E/excel",
    ];
    for path in paths {
        let api = workspace.quote_api(XlsxEncoder).await;
        let res = send_request(api, ServerOptions::default(), TestRequest::get().uri(path)).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(res.json()["ok"], json!(false), "{path}");
        assert_ne!(res.body.as_ref(), b"secret", "{path}");
    }
}
