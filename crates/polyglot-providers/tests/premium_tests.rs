use std::collections::HashSet;
use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use polyglot_core::models::LanguageCode;
use polyglot_providers::error::{PermanentKind, ProviderError, TransientKind};
use polyglot_providers::premium::PremiumBackend;
use polyglot_providers::traits::{BackendRequest, TranslationBackend};

fn targets() -> HashSet<LanguageCode> {
    ["es", "fr", "en"].iter().map(LanguageCode::new).collect()
}

fn backend(server: &MockServer) -> PremiumBackend {
    PremiumBackend::new("test-key".to_string(), targets(), Duration::from_secs(2))
        .with_base_url(server.uri())
}

fn request(text: &str, src: Option<&str>, tgt: &str) -> BackendRequest {
    BackendRequest {
        text: text.to_string(),
        src: src.map(LanguageCode::new),
        tgt: LanguageCode::new(tgt),
    }
}

#[tokio::test]
async fn translates_and_lowercases_detected_source() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(header("Authorization", "Premium-Auth-Key test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "translations": [
                {"text": "Hola", "detected_source_language": "EN"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = backend(&server)
        .translate(&request("Hello", None, "es"))
        .await
        .unwrap();

    assert_eq!(result.text, "Hola");
    assert_eq!(result.detected_src, Some(LanguageCode::new("en")));
}

#[tokio::test]
async fn unsupported_target_never_reaches_the_wire() {
    let server = MockServer::start().await;
    // No mock mounted: any request would 404 and surface as Rejected.
    let err = backend(&server)
        .translate(&request("Hello", None, "sw"))
        .await
        .unwrap_err();

    assert_eq!(err, ProviderError::Unsupported(LanguageCode::new("sw")));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn over_cap_text_is_rejected_locally() {
    let server = MockServer::start().await;
    let long_text = "x".repeat(PremiumBackend::MAX_TEXT_CHARS + 1);
    let err = backend(&server)
        .translate(&request(&long_text, Some("en"), "es"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ProviderError::Permanent(PermanentKind::TextTooLong(PremiumBackend::MAX_TEXT_CHARS))
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn rate_limit_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = backend(&server)
        .translate(&request("Hello", None, "es"))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::Transient(TransientKind::RateLimited));
}

#[tokio::test]
async fn server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = backend(&server)
        .translate(&request("Hello", None, "es"))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::Transient(TransientKind::Server(503)));
}

#[tokio::test]
async fn quota_exhausted_status_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(456))
        .mount(&server)
        .await;

    let err = backend(&server)
        .translate(&request("Hello", None, "es"))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::Permanent(PermanentKind::BudgetExhausted));
}

#[tokio::test]
async fn auth_failure_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = backend(&server)
        .translate(&request("Hello", None, "es"))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::Permanent(PermanentKind::AuthFailed));
}

#[tokio::test]
async fn malformed_body_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "translations": []
        })))
        .mount(&server)
        .await;

    let err = backend(&server)
        .translate(&request("Hello", None, "es"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Permanent(PermanentKind::MalformedResponse(_))
    ));
}
