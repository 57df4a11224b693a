// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests: configuration in, log lines out.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use logbook::{
    CapturedRequest, CapturedResponse, ExchangeFormatter, LogbookSink, Origin, Precorrelation,
    Sink, StreamLogWriter, capture_request, capture_response,
};
use serde_json::{Value, json};
use std::fs;
use std::io::Write;

mod common;
use common::{TestConfigProvider, recording_sink};

fn inbound_request(call_app: &str) -> CapturedRequest {
    CapturedRequest::new(Origin::Remote, "GET", "/orders/7")
        .with_header("Accept", "application/json")
        .with_header("X-Secret", "abc")
        .with_header("x-original-call-app", call_app)
}

fn default_strategy(app_name: &str) -> TestConfigProvider {
    TestConfigProvider::enabled(app_name)
        .with_value("logbook.request.header_strategy", json!("DEFAULT"))
        .with_value("logbook.response.header_strategy", json!("DEFAULT"))
}

#[test]
fn test_inbound_request_with_default_strategy() {
    let (sink, writer) = recording_sink(default_strategy("my-service"));

    sink.on_request("c-1", &inbound_request("other-service")).unwrap();

    let records = writer.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["headers"], json!({"Accept": ["application/json"]}));
    assert_eq!(record["origin"], "PROVIDER");
    assert_eq!(record["originalCallApp"], "other-service");
}

#[test]
fn test_self_call_is_not_attributed() {
    let (sink, writer) = recording_sink(default_strategy("my-service"));

    sink.on_request("c-2", &inbound_request("my-service")).unwrap();

    let record = &writer.records()[0];
    assert!(record.get("originalCallApp").is_none());
    assert_eq!(record["origin"], "PROVIDER");
}

#[test]
fn test_response_seen_by_client_capture() {
    let (sink, writer) = recording_sink(default_strategy("my-service"));
    let request = inbound_request("other-service");
    let response = CapturedResponse::new(Origin::Remote, 200)
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"code":"OK"}"#);

    sink.on_response("c-3", &request, &response, 42).unwrap();

    let record = &writer.records()[0];
    assert_eq!(record["origin"], "CONSUMER");
    assert_eq!(record["code"], "OK");
    assert_eq!(record["duration"], 42);
    assert_eq!(record["status"], 200);
    assert_eq!(record["body"], json!({"code": "OK"}));
    assert!(record.get("originalCallApp").is_none());
}

#[test]
fn test_response_produced_by_server_capture() {
    let (sink, writer) = recording_sink(default_strategy("my-service"));
    let request = inbound_request("other-service");
    let response = CapturedResponse::new(Origin::Local, 200)
        .with_header("Content-Type", "application/json")
        .with_header("Set-Cookie", "session=1")
        .with_body(r#"{"code":"OK"}"#);

    sink.on_response("c-4", &request, &response, 42).unwrap();

    let raw = &writer.raw()[0];
    assert_eq!(
        raw,
        r#"{"correlation":"c-4","type":"out","uri":"/orders/7","origin":"PROVIDER","duration":42,"status":200,"code":"OK","body":{"code":"OK"},"headers":{"Content-Type":["application/json"]},"originalCallApp":"other-service"}"#
    );
}

#[test]
fn test_obfuscation_and_truncation_from_config() {
    let provider = TestConfigProvider::enabled("billing")
        .with_value("logbook.obfuscate.headers", json!("Authorization"))
        .with_value("logbook.obfuscate.paths", json!(["/accounts/{id}/cards/{card}"]))
        .with_value("logbook.write.max_body_size", json!(10));
    let (sink, writer) = recording_sink(provider);

    let request = CapturedRequest::new(Origin::Local, "POST", "https://bank/accounts/42/cards/9?v=1")
        .with_header("Authorization", "Bearer secret")
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"number":"4111111111111111"}"#);
    sink.on_request("c-5", &request).unwrap();

    let record = &writer.records()[0];
    assert_eq!(record["uri"], "https://bank/accounts/XXX/cards/XXX?v=1");
    assert_eq!(record["origin"], "CONSUMER");
    assert_eq!(record["headers"]["Authorization"], json!(["XXX"]));
    assert_eq!(record["body"], Value::String(r#"{"number":..."#.to_string()));
}

#[test]
fn test_formatting_is_byte_identical() {
    let (sink, writer) = recording_sink(default_strategy("my-service"));
    let request = inbound_request("other-service");
    let response = CapturedResponse::new(Origin::Local, 404).with_body("not here");

    for _ in 0..2 {
        sink.on_request("same", &request).unwrap();
        sink.on_response("same", &request, &response, 5).unwrap();
    }

    let raw = writer.raw();
    assert_eq!(raw[0], raw[2]);
    assert_eq!(raw[1], raw[3]);
}

#[test]
fn test_stream_writer_to_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let stream = file.reopen().unwrap();
    let sink = LogbookSink::new(ExchangeFormatter::new("svc"), StreamLogWriter::new(stream));

    let precorrelation = Precorrelation::new();
    let request = CapturedRequest::new(Origin::Local, "GET", "http://upstream/health");
    sink.on_precorrelated_request(&precorrelation, &request).unwrap();
    let correlation = precorrelation.correlate();
    let response = CapturedResponse::new(Origin::Remote, 204);
    sink.on_correlated_response(&correlation, &request, &response).unwrap();

    let content = fs::read_to_string(file.path()).unwrap();
    let lines: Vec<Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["correlation"], correlation.id());
    assert_eq!(lines[1]["correlation"], correlation.id());
    assert_eq!(lines[1]["code"], "GlobalExceptionHandler.INVALID_REQUEST");
}

#[test]
fn test_loader_from_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "logbook:\n  enabled: true\n  app_name: gateway\n  request:\n    header_strategy: custom\n    custom_headers: X-Trace-Id"
    )
    .unwrap();

    let sink = logbook::LogbookLoader::new()
        .with_config_file(file.path().to_str().unwrap())
        .with_writer(common::RecordingWriter::default())
        .build()
        .unwrap()
        .expect("enabled in file");
    assert_eq!(sink.formatter().app_name(), "gateway");
}

#[tokio::test]
async fn test_hyper_capture_round_trip() {
    let (sink, writer) = recording_sink(TestConfigProvider::enabled("edge"));

    let request = hyper::Request::builder()
        .method("PUT")
        .uri("/items/1")
        .header("content-type", "application/json")
        .header("x-original-call-app", "mobile")
        .body(Full::new(Bytes::from_static(br#"{"name":"lamp"}"#)))
        .unwrap();
    let (captured, forwarded) = capture_request(request, Origin::Remote).await.unwrap();
    sink.on_request("h-1", &captured).unwrap();

    let body = forwarded.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, Bytes::from_static(br#"{"name":"lamp"}"#));

    let response = hyper::Response::builder()
        .status(500)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from_static(br#"{"code":"STOCK_DOWN"}"#)))
        .unwrap();
    let (captured_response, _) = capture_response(response, Origin::Local).await.unwrap();
    sink.on_response("h-1", &captured, &captured_response, 3).unwrap();

    let records = writer.records();
    assert_eq!(records[0]["body"], json!({"name": "lamp"}));
    assert_eq!(records[0]["originalCallApp"], "mobile");
    assert_eq!(records[1]["code"], "STOCK_DOWN");
    assert_eq!(records[1]["origin"], "PROVIDER");
    assert_eq!(records[1]["originalCallApp"], "mobile");
}
