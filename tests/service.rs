//! End-to-end tests of the HTTP router.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{json, Value};
use tower::ServiceExt;

use ndarray::Array1;

use diabeto::pipeline::Model;
use diabeto::repr::LinearClassifier;
use diabeto::service::{router, AppState};
use diabeto::testing::{sample_json, synthetic_frame};
use diabeto::{Pipeline, PipelineKind, TrainConfig};

fn state() -> AppState {
    static STATE: OnceLock<AppState> = OnceLock::new();
    STATE
        .get_or_init(|| {
            let (frame, targets) = synthetic_frame(200, 5).unwrap();
            let config = TrainConfig::default();
            let fit = |kind| Pipeline::fit(kind, &frame, targets.view(), &config).unwrap();
            AppState::new(fit(PipelineKind::Logistic), fit(PipelineKind::Tree)).unwrap()
        })
        .clone()
}

fn app() -> Router {
    router(state())
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[rstest]
#[case::logistic(PipelineKind::Logistic)]
#[case::tree(PipelineKind::Tree)]
#[tokio::test]
async fn predicts_a_label(#[case] kind: PipelineKind) {
    let (status, body) = send(post_json(kind.route(), sample_json().to_string())).await;
    assert_eq!(status, StatusCode::OK);

    let label = body["prediction"].as_str().unwrap();
    assert!(label == "Smoker" || label == "Non-Smoker", "{label}");
    assert_eq!(body.as_object().unwrap().len(), 1);

    let expected = state()
        .pipeline(kind)
        .predict_row(&diabeto::normalize_json(sample_json().to_string().as_bytes()).unwrap())
        .unwrap();
    assert_eq!(label, expected.label());
}

/// Logistic pipeline whose classifier ignores its input and always scores `bias`.
fn constant_logistic(bias: f64) -> Pipeline {
    let state = state();
    let fitted = state.pipeline(PipelineKind::Logistic);
    let model = LinearClassifier::new(Array1::zeros(fitted.n_features()), bias);
    Pipeline::from_parts(
        PipelineKind::Logistic,
        fitted.feature_names().to_vec(),
        fitted.clipper().clone(),
        fitted.encoder().clone(),
        Model::Linear(model),
    )
    .unwrap()
}

#[rstest]
#[case::positive_class(10.0, "Smoker")]
#[case::negative_class(-10.0, "Non-Smoker")]
#[tokio::test]
async fn class_maps_to_exact_label(#[case] bias: f64, #[case] expected: &str) {
    let tree = state().pipeline(PipelineKind::Tree).clone();
    let app = router(AppState::new(constant_logistic(bias), tree).unwrap());

    let response = app
        .oneshot(post_json(PipelineKind::Logistic.route(), sample_json().to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "prediction": expected }));
}

#[rstest]
#[case::missing_field(|v: &mut Value| { v.as_object_mut().unwrap().remove("bmi"); })]
#[case::unknown_category(|v: &mut Value| v["gender"] = json!("Robot"))]
#[case::wrong_type(|v: &mut Value| v["age"] = json!("forty"))]
#[case::flag_out_of_range(|v: &mut Value| v["hypertension_history"] = json!(2))]
#[tokio::test]
async fn invalid_records_get_400_with_detail(#[case] edit: fn(&mut Value)) {
    let mut value = sample_json();
    edit(&mut value);

    for kind in PipelineKind::ALL {
        let (status, body) = send(post_json(kind.route(), value.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body["detail"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn malformed_body_gets_400() {
    let (status, body) = send(post_json("/diabeto/logistic", "{\"age\": ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn missing_field_is_named_in_detail() {
    let mut value = sample_json();
    value.as_object_mut().unwrap().remove("triglycerides");
    let (_, body) = send(post_json("/diabeto/tree", value.to_string())).await;
    assert!(body["detail"].as_str().unwrap().contains("triglycerides"));
}

#[tokio::test]
async fn get_on_predict_route_is_not_allowed() {
    let request = Request::builder().uri("/diabeto/tree").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/diabeto/logistic")
        .header(header::ORIGIN, "http://example.com")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(sample_json().to_string()))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[test]
fn state_rejects_swapped_pipelines() {
    let state = state();
    let logistic = state.pipeline(PipelineKind::Logistic).clone();
    let tree = state.pipeline(PipelineKind::Tree).clone();
    assert!(AppState::new(tree, logistic).is_err());
}
