use std::collections::HashSet;

use actix_web::http::StatusCode;
use hotpot_quote_engine::{
    test_utils::prepare_env::{prepare_test_env, sample_submission_json, TestWorkspace},
    ExportError,
    ExportStore,
    QuoteFlowApi,
    QuoteLogError,
    QuoteRecord,
    QuoteRules,
    XlsxEncoder,
};
use hpq_common::Fen;
use serde_json::{json, Value};

use super::{
    helpers::{post_quote, send_request, send_requests},
    mocks::{MockEncoder, MockQuoteLogger},
};
use crate::{config::ServerOptions, errors::GENERIC_SERVER_ERROR};

fn logged_records(workspace: &TestWorkspace) -> Vec<QuoteRecord> {
    workspace.log_lines().iter().map(|l| serde_json::from_str(l).expect("log line is a quote record")).collect()
}

#[actix_web::test]
async fn submit_a_valid_quote() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let api = workspace.quote_api(XlsxEncoder).await;
    let res = send_request(api, ServerOptions::default(), post_quote(&sample_submission_json())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert_eq!(res.header("access-control-allow-origin"), Some("*"));

    let body = res.json();
    assert_eq!(body["ok"], true);
    let id = body["id"].as_str().expect("id is a string");
    assert!(id.starts_with('Q'));
    assert!(body["serverTime"].as_str().expect("serverTime is a string").ends_with('Z'));
    assert_eq!(body["record"]["id"], id);
    assert_eq!(body["record"]["total"], 110);
    assert_eq!(body["record"]["customerName"], "张三");
    assert_eq!(body["record"]["items"][0]["subtotal"], 60);
    assert_eq!(body["exportFilename"], format!("{id}.xlsx"));

    let encoded = body["exportBase64"].as_str().expect("exportBase64 is a string");
    let bytes = base64::decode(encoded).expect("exportBase64 is valid base64");
    assert_eq!(&bytes[..2], b"PK");
    let on_disk = std::fs::read(workspace.export_store().dir().join(format!("{id}.xlsx"))).unwrap();
    assert_eq!(bytes, on_disk);

    let records = logged_records(&workspace);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.as_str(), id);
    assert_eq!(records[0].total, Fen::from_yuan(110));
    assert_eq!(records[0].export_filename.as_deref(), Some(format!("{id}.xlsx").as_str()));
    let line: Value = serde_json::from_str(&workspace.log_lines()[0]).unwrap();
    assert_eq!(line["total"], 110);
}

#[actix_web::test]
async fn mismatched_totals_are_rejected() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let api = workspace.quote_api(XlsxEncoder).await;
    let mut submission = sample_submission_json();
    submission["total"] = json!(100);
    let res = send_request(api, ServerOptions::default(), post_quote(&submission)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let body = res.json();
    assert_eq!(body["ok"], false);
    assert!(body["message"].as_str().unwrap().contains("不一致"));
    assert!(workspace.log_lines().is_empty());
    assert!(!workspace.export_store().dir().exists());
}

#[actix_web::test]
async fn small_orders_are_rejected_with_the_minimum_in_the_message() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let api = workspace.quote_api(XlsxEncoder).await;
    let submission = json!({
        "customerName": "李四",
        "customerContact": "13912345678",
        "items": [{ "name": "毛肚", "spec": "小份", "price": 30, "qty": 2, "subtotal": 60 }],
        "total": 60
    });
    let res = send_request(api, ServerOptions::default(), post_quote(&submission)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], "订单金额未达到最低起订金额 ¥100.00");
    assert!(workspace.log_lines().is_empty());
}

#[actix_web::test]
async fn the_minimum_comes_from_the_quote_rules() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let api = QuoteFlowApi::new(
        workspace.quote_log().await,
        XlsxEncoder,
        workspace.export_store(),
        QuoteRules::new(Fen::from_yuan(200)),
    );
    let res = send_request(api, ServerOptions::default(), post_quote(&sample_submission_json())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], "订单金额未达到最低起订金额 ¥200.00");
}

#[actix_web::test]
async fn unrepresentable_amounts_are_rejected() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let api = workspace.quote_api(XlsxEncoder).await;
    let submission = json!({
        "customerName": "李四",
        "customerContact": "13912345678",
        "items": [
            { "name": "毛肚", "spec": "大份", "price": 1e17, "qty": 1, "subtotal": 1e17 },
            { "name": "鸳鸯锅底", "spec": "微辣", "price": 110, "qty": 1, "subtotal": 110 }
        ],
        "total": 110
    });
    let res = send_request(api, ServerOptions::default(), post_quote(&submission)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], "菜品金额超出可处理范围，请核对后重新提交");
    assert!(workspace.log_lines().is_empty());
}

#[actix_web::test]
async fn sub_fen_subtotals_reconcile_after_summing() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let api = workspace.quote_api(XlsxEncoder).await;
    let item = json!({ "name": "毛肚", "spec": "大份", "price": 33.334, "qty": 1, "subtotal": 33.334 });
    let submission = json!({
        "customerName": "李四",
        "customerContact": "13912345678",
        "items": [item, item, item],
        "total": 100
    });
    let res = send_request(api, ServerOptions::default(), post_quote(&submission)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["record"]["total"], 100);
    assert_eq!(logged_records(&workspace)[0].total, Fen::from_yuan(100));
}

#[actix_web::test]
async fn latin_names_are_rejected() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let api = workspace.quote_api(XlsxEncoder).await;
    let mut submission = sample_submission_json();
    submission["customerName"] = json!("John");
    let res = send_request(api, ServerOptions::default(), post_quote(&submission)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], "客户姓名格式不正确，请填写2-8位中文姓名");
    assert!(workspace.log_lines().is_empty());
}

#[actix_web::test]
async fn malformed_bodies_are_bad_requests() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let api = workspace.quote_api(XlsxEncoder).await;
    let req = post_quote(&json!(null)).set_payload("{\"customerName\": \"张三\", ");
    let res = send_request(api, ServerOptions::default(), req).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({ "ok": false, "message": "请求数据格式不正确" }));
    assert!(workspace.log_lines().is_empty());
}

#[actix_web::test]
async fn oversized_bodies_are_bad_requests() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let api = workspace.quote_api(XlsxEncoder).await;
    let options = ServerOptions { max_body_bytes: 64 };
    let res = send_request(api, options, post_quote(&sample_submission_json())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({ "ok": false, "message": "请求数据过大" }));
    assert!(workspace.log_lines().is_empty());
}

#[actix_web::test]
async fn encoder_failure_still_accepts_the_quote() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let mut encoder = MockEncoder::new();
    encoder.expect_encode().times(1).returning(|_| Err(ExportError::Encoding("out of cells".into())));
    let api = workspace.quote_api(encoder).await;
    let res = send_request(api, ServerOptions::default(), post_quote(&sample_submission_json())).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["ok"], true);
    let id = body["id"].as_str().unwrap();
    assert!(body.get("exportFilename").is_none());
    assert!(body.get("exportBase64").is_none());
    assert!(body["record"].get("exportFilename").is_none());

    let records = logged_records(&workspace);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.as_str(), id);
    assert!(!records[0].has_export());
}

#[actix_web::test]
async fn log_failure_is_a_server_error() {
    prepare_test_env();
    let workspace = TestWorkspace::new();
    let mut log = MockQuoteLogger::new();
    log.expect_append()
        .times(1)
        .returning(|_| Err(QuoteLogError::Io(std::io::Error::new(std::io::ErrorKind::Other, "No space left on device"))));
    let exports = ExportStore::new(workspace.dir.path().join("exports"));
    let api = QuoteFlowApi::new(log, XlsxEncoder, exports.clone(), QuoteRules::default());
    let res = send_request(api, ServerOptions::default(), post_quote(&sample_submission_json())).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json(), json!({ "ok": false, "message": GENERIC_SERVER_ERROR }));
    // The export written before the log failed is not left behind
    let leftovers = std::fs::read_dir(exports.dir()).map(|d| d.count()).unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[actix_web::test]
async fn concurrent_submissions_get_distinct_ids() {
    prepare_test_env();
    const N: usize = 20;
    let workspace = TestWorkspace::new();
    let api = workspace.quote_api(XlsxEncoder).await;
    let reqs = (0..N).map(|_| post_quote(&sample_submission_json())).collect();
    let responses = send_requests(api, ServerOptions::default(), reqs).await;
    let ids = responses
        .iter()
        .map(|res| {
            assert_eq!(res.status, StatusCode::OK);
            res.json()["id"].as_str().unwrap().to_string()
        })
        .collect::<HashSet<_>>();
    assert_eq!(ids.len(), N);

    let records = logged_records(&workspace);
    assert_eq!(records.len(), N);
    let logged_ids = records.iter().map(|r| r.id.as_str().to_string()).collect::<HashSet<_>>();
    assert_eq!(logged_ids, ids);
    let sequence = records.iter().map(|r| r.id.as_str()[1..].parse::<i64>().unwrap()).collect::<Vec<_>>();
    assert!(sequence.windows(2).all(|w| w[0] < w[1]), "log out of order: {sequence:?}");
}
