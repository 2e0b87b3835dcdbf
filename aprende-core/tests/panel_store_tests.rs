//! PostgREST consultation store against a mock server

use aprende_core::config::{ConnectionConfig, PanelConfig, SecretString};
use aprende_core::panel::{
    Consultation, ConsultationStore, PanelError, PanelHandler, RestConsultationStore,
};
use reqwest::{Method, StatusCode};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store(upstream: &MockServer) -> RestConsultationStore {
    RestConsultationStore::new(
        upstream.uri(),
        SecretString::new("service-key"),
        Duration::from_secs(2),
    )
    .unwrap()
}

#[tokio::test]
async fn test_recent_passes_store_json_through() {
    let upstream = MockServer::start().await;
    let rows = json!([
        {"componente": "Ciencias", "ano": "5", "volume": "1", "created_at": "2025-04-02T10:00:00Z", "recursos": null},
        {"componente": "Arte", "ano": "4", "volume": "2", "created_at": "2025-04-01T09:00:00Z", "recursos": ["quiz"]}
    ]);
    Mock::given(method("GET"))
        .and(path("/rest/v1/consultas"))
        .and(query_param("select", "componente,ano,volume,created_at,recursos"))
        .and(query_param("order", "created_at.desc"))
        .and(query_param("limit", "1000"))
        .and(header("apikey", "service-key"))
        .and(header("Authorization", "Bearer service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows.clone()))
        .expect(1)
        .mount(&upstream)
        .await;

    assert_eq!(store(&upstream).recent().await.unwrap(), rows);
}

#[tokio::test]
async fn test_recent_non_json_is_a_store_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&upstream)
        .await;

    let err = store(&upstream).recent().await.unwrap_err();
    assert!(matches!(err, PanelError::Store { .. }));
}

#[tokio::test]
async fn test_insert_sends_only_present_fields() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/consultas"))
        .and(header("Prefer", "return=minimal"))
        .and(header("apikey", "service-key"))
        .and(body_json(json!({"componente": "Arte", "ano": 4, "recursos": ["slides"]})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&upstream)
        .await;

    let consultation = Consultation {
        componente: Some(json!("Arte")),
        ano: Some(json!(4)),
        recursos: Some(json!(["slides"])),
        ..Consultation::default()
    };
    assert!(store(&upstream).insert(&consultation).await.unwrap());
}

#[tokio::test]
async fn test_insert_rejected_by_store() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "JWT expired"})))
        .expect(1)
        .mount(&upstream)
        .await;

    let consultation = Consultation {
        componente: Some(json!("Arte")),
        ano: Some(json!("4")),
        ..Consultation::default()
    };
    assert!(!store(&upstream).insert(&consultation).await.unwrap());
}

#[tokio::test]
async fn test_handler_from_config() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/consultas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&upstream)
        .await;

    let panel_config = PanelConfig {
        store_url: Some(upstream.uri()),
        store_key: SecretString::new("service-key"),
        password: SecretString::new("outra-senha"),
    };
    let panel = PanelHandler::from_config(&panel_config, &ConnectionConfig::default()).unwrap();

    let response = panel.handle(&Method::GET, Some("smed2025"), b"").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = panel.handle(&Method::GET, Some("outra-senha"), b"").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}
