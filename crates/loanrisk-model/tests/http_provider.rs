use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;
use std::time::Duration;

use loanrisk_core::{AssessmentError, FEATURE_COUNT, FEATURE_SCHEMA, FeatureVector};
use loanrisk_model::{
    ClassifierProviderConfig, HttpClassifierConfig, PredictionRequest, ProviderError,
    build_classifier_provider,
};

/// Accepts one connection, answers with `status` + `body`, returns the raw request.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock classifier");
    let addr = listener.local_addr().expect("local addr");
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header");
            request.push_str(&line);
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.is_empty() {
                break;
            }
            if let Some((name, value)) = trimmed.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }
        let mut payload = vec![0_u8; content_length];
        reader.read_exact(&mut payload).expect("read body");
        request.push_str(&String::from_utf8_lossy(&payload));

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).expect("write response");
        stream.flush().expect("flush");
        request
    });
    (format!("http://{addr}"), handle)
}

fn features() -> FeatureVector {
    FeatureVector {
        schema: FEATURE_SCHEMA.to_string(),
        values: vec![0.5; FEATURE_COUNT],
    }
}

fn config(base_url: String) -> HttpClassifierConfig {
    let mut cfg = HttpClassifierConfig::new(base_url);
    cfg.api_key = Some("test-token".to_string());
    cfg.timeout = Duration::from_secs(5);
    cfg
}

#[tokio::test]
async fn posts_named_features_and_reads_probability() {
    let (url, server) = serve_once("200 OK", r#"{"probability":0.07,"model":"gbm-v3"}"#);
    let provider =
        build_classifier_provider(ClassifierProviderConfig::Http(config(url))).expect("provider");

    let out = provider
        .predict(PredictionRequest::new(features()))
        .await
        .expect("predict");
    assert_eq!(out.provider, "http");
    assert_eq!(out.model, "gbm-v3");
    assert!((out.probability - 0.07).abs() < 1e-12);

    let request = server.join().expect("server thread");
    assert!(request.starts_with("POST /v1/predict"));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer test-token"));
    assert!(request.contains("\"schema\":\"loan-risk/v1\""));
    assert!(request.contains("\"loan_to_income_ratio\":0.5"));
}

#[tokio::test]
async fn unprocessable_entity_is_an_invalid_feature_vector() {
    let (url, server) = serve_once("422 Unprocessable Entity", r#"{"error":"schema"}"#);
    let provider =
        build_classifier_provider(ClassifierProviderConfig::Http(config(url))).expect("provider");

    let err = provider
        .predict(PredictionRequest::new(features()))
        .await
        .expect_err("rejected");
    assert!(matches!(err, ProviderError::RejectedFeatures(_)));
    assert!(matches!(
        AssessmentError::from(err),
        AssessmentError::InvalidFeatureVector(_)
    ));
    server.join().expect("server thread");
}

#[tokio::test]
async fn bad_request_is_an_invalid_feature_vector() {
    let (url, server) = serve_once("400 Bad Request", r#"{"error":"width"}"#);
    let provider =
        build_classifier_provider(ClassifierProviderConfig::Http(config(url))).expect("provider");

    let err = provider
        .predict(PredictionRequest::new(features()))
        .await
        .expect_err("rejected");
    assert!(matches!(err, ProviderError::RejectedFeatures(_)));
    assert!(matches!(
        AssessmentError::from(err),
        AssessmentError::InvalidFeatureVector(_)
    ));
    server.join().expect("server thread");
}

#[tokio::test(flavor = "multi_thread")]
async fn silent_classifier_times_out_as_model_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind silent classifier");
    let addr = listener.local_addr().expect("local addr");
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        // Hold the connection open until the client gives up.
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink);
    });

    let mut cfg = config(format!("http://{addr}"));
    cfg.timeout = Duration::from_millis(200);
    let provider = build_classifier_provider(ClassifierProviderConfig::Http(cfg)).expect("provider");

    let err = provider
        .predict(PredictionRequest::new(features()))
        .await
        .expect_err("timeout");
    assert!(matches!(&err, ProviderError::Http(inner) if inner.is_timeout()));
    assert!(matches!(
        AssessmentError::from(err),
        AssessmentError::ModelUnavailable(_)
    ));
    server.join().expect("server thread");
}

#[tokio::test]
async fn server_error_is_model_unavailable() {
    let (url, server) = serve_once("503 Service Unavailable", r#"{"error":"warming up"}"#);
    let provider =
        build_classifier_provider(ClassifierProviderConfig::Http(config(url))).expect("provider");

    let err = provider
        .predict(PredictionRequest::new(features()))
        .await
        .expect_err("unavailable");
    assert!(matches!(err, ProviderError::Api { status: 503, .. }));
    assert!(matches!(
        AssessmentError::from(err),
        AssessmentError::ModelUnavailable(_)
    ));
    server.join().expect("server thread");
}

#[tokio::test]
async fn missing_probability_is_invalid_response() {
    let (url, server) = serve_once("200 OK", r#"{"model":"gbm-v3"}"#);
    let provider =
        build_classifier_provider(ClassifierProviderConfig::Http(config(url))).expect("provider");

    let err = provider
        .predict(PredictionRequest::new(features()))
        .await
        .expect_err("no probability");
    assert!(matches!(err, ProviderError::InvalidResponse(_)));
    server.join().expect("server thread");
}

#[tokio::test]
async fn unreachable_endpoint_is_model_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("reserve addr");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let provider = build_classifier_provider(ClassifierProviderConfig::Http(config(format!(
        "http://{addr}"
    ))))
    .expect("provider");
    let err = provider
        .predict(PredictionRequest::new(features()))
        .await
        .expect_err("connection refused");
    assert!(matches!(err, ProviderError::Http(_)));
    assert!(matches!(
        AssessmentError::from(err),
        AssessmentError::ModelUnavailable(_)
    ));
}

#[test]
fn empty_base_url_is_a_config_error() {
    let result = build_classifier_provider(ClassifierProviderConfig::Http(
        HttpClassifierConfig::new("  "),
    ));
    assert!(matches!(result, Err(ProviderError::Config(_))));
}
