//! Tests for paginated extraction

use super::*;
use crate::http::QueryClientConfig;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_setup(server: &MockServer) -> (QueryClient, ExtractorConfig) {
    let mut config = ExtractorConfig::default();
    config.base_url = server.uri();
    config.service_path = "svc".to_string();
    config.query_entity = "Query".to_string();
    config.pause_ms = 0;
    config.page_top = 100;
    let client = QueryClient::with_config(QueryClientConfig::from_extractor(&config));
    (client, config)
}

#[test]
fn test_filter_expression_escapes_single_quotes() {
    assert_eq!(
        filter_expression("C0CHAR_STRUCTURE", "O'Brien"),
        "C0CHAR_STRUCTURE eq 'O''Brien'"
    );
    assert_eq!(filter_expression("KEY", "plain"), "KEY eq 'plain'");
    assert_eq!(filter_expression("KEY", "a''b"), "KEY eq 'a''''b'");
}

#[tokio::test]
async fn test_single_page_extraction() {
    let server = MockServer::start().await;
    let (client, config) = test_setup(&server);

    Mock::given(method("GET"))
        .and(path("/svc/Query"))
        .and(query_param("$select", "A,B"))
        .and(query_param("$top", "100"))
        .and(query_param("$filter", "KEY eq 'alpha'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {"results": [{"A": "1", "B": "2"}]}
        })))
        .mount(&server)
        .await;

    let extractor = PartitionExtractor::new(&client, &config);
    let mut fields = FieldSet::new(["A", "B"]);
    let records = extractor
        .extract_partition("KEY", "alpha", &mut fields)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["A"], "1");
    assert!(fields.is_frozen());
}

#[tokio::test]
async fn test_three_page_chain_in_order() {
    let server = MockServer::start().await;
    let (client, config) = test_setup(&server);

    let t1 = format!("{}/svc/Query?$skiptoken=T1", server.uri());
    let t2 = format!("{}/svc/Query?$skiptoken=T2", server.uri());

    Mock::given(method("GET"))
        .and(path("/svc/Query"))
        .and(query_param("$filter", "KEY eq 'alpha'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {"results": [{"N": 1}], "__next": t1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Continuation requests carry no additional query parameters
    Mock::given(method("GET"))
        .and(path("/svc/Query"))
        .and(query_param("$skiptoken", "T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {"results": [{"N": 2}], "__next": t2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/svc/Query"))
        .and(query_param("$skiptoken", "T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {"results": [{"N": 3}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let extractor = PartitionExtractor::new(&client, &config);
    let mut fields = FieldSet::new(["N"]);
    let records = extractor
        .extract_partition("KEY", "alpha", &mut fields)
        .await
        .unwrap();

    let order: Vec<i64> = records.iter().map(|r| r["N"].as_i64().unwrap()).collect();
    assert_eq!(order, [1, 2, 3]);
}

#[tokio::test]
async fn test_field_negotiation_on_first_page() {
    let server = MockServer::start().await;
    let (client, config) = test_setup(&server);

    // First attempt with X,Y,Z is rejected naming Y
    Mock::given(method("GET"))
        .and(path("/svc/Query"))
        .and(query_param("$select", "X,Y,Z"))
        .respond_with(ResponseTemplate::new(404).set_body_string(
            "Resource not found for the segment 'Y'. Check the URI and try again.",
        ))
        .expect(1)
        .mount(&server)
        .await;

    // Second attempt must select exactly X,Z
    Mock::given(method("GET"))
        .and(path("/svc/Query"))
        .and(query_param("$select", "X,Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"X": 1, "Z": 2}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let extractor = PartitionExtractor::new(&client, &config);
    let mut fields = FieldSet::new(["X", "Y", "Z"]);
    let records = extractor
        .extract_partition("KEY", "alpha", &mut fields)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(fields.as_slice(), ["X", "Z"]);
    assert!(fields.is_frozen());
}

#[tokio::test]
async fn test_negotiation_exhaustion_fails_partition() {
    let server = MockServer::start().await;
    let (client, config) = test_setup(&server);

    // Every attempt rejects the sole remaining field
    Mock::given(method("GET"))
        .and(path("/svc/Query"))
        .respond_with(ResponseTemplate::new(404).set_body_string(
            "Resource not found for the segment 'ONLY'.",
        ))
        .mount(&server)
        .await;

    let extractor = PartitionExtractor::new(&client, &config);
    let mut fields = FieldSet::new(["ONLY"]);
    let err = extractor
        .extract_partition("KEY", "alpha", &mut fields)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::FieldNegotiationExhausted { .. }));
    assert!(!fields.is_frozen());
}

#[tokio::test]
async fn test_frozen_fields_treat_rejection_as_plain_failure() {
    let server = MockServer::start().await;
    let (client, config) = test_setup(&server);

    Mock::given(method("GET"))
        .and(path("/svc/Query"))
        .respond_with(ResponseTemplate::new(404).set_body_string(
            "Resource not found for the segment 'A'.",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let extractor = PartitionExtractor::new(&client, &config);
    let mut fields = FieldSet::new(["A", "B"]);
    fields.freeze();
    let err = extractor
        .extract_partition("KEY", "alpha", &mut fields)
        .await
        .unwrap_err();

    // No renegotiation after freeze: surfaced as an HTTP failure
    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    assert_eq!(fields.as_slice(), ["A", "B"]);
}

#[tokio::test]
async fn test_mid_chain_failure_fails_whole_partition() {
    let server = MockServer::start().await;
    let (client, config) = test_setup(&server);

    let t1 = format!("{}/svc/Query?$skiptoken=T1", server.uri());

    Mock::given(method("GET"))
        .and(path("/svc/Query"))
        .and(query_param("$filter", "KEY eq 'alpha'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {"results": [{"N": 1}], "__next": t1}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/svc/Query"))
        .and(query_param("$skiptoken", "T1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("mid-chain failure"))
        .mount(&server)
        .await;

    let extractor = PartitionExtractor::new(&client, &config);
    let mut fields = FieldSet::new(["N"]);
    let err = extractor
        .extract_partition("KEY", "alpha", &mut fields)
        .await
        .unwrap_err();

    // Page two failed, so the partition contributes nothing
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_undecodable_success_body_is_malformed() {
    let server = MockServer::start().await;
    let (client, config) = test_setup(&server);

    Mock::given(method("GET"))
        .and(path("/svc/Query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let extractor = PartitionExtractor::new(&client, &config);
    let mut fields = FieldSet::new(["A"]);
    let err = extractor
        .extract_partition("KEY", "alpha", &mut fields)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_quoted_value_reaches_service_escaped() {
    let server = MockServer::start().await;
    let (client, config) = test_setup(&server);

    Mock::given(method("GET"))
        .and(path("/svc/Query"))
        .and(query_param("$filter", "KEY eq 'O''Brien'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(1)
        .mount(&server)
        .await;

    let extractor = PartitionExtractor::new(&client, &config);
    let mut fields = FieldSet::new(["A"]);
    let records = extractor
        .extract_partition("KEY", "O'Brien", &mut fields)
        .await
        .unwrap();
    assert!(records.is_empty());
}
