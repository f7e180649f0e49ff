//! Router tests against stub models

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    Json, Router,
};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use tower::ServiceExt;

use crate::config::Config;
use crate::logic::features::sample_inputs;
use crate::logic::model::predictor::stubs::{StubClassifier, StubRegressor};
use crate::logic::model::ResponsePredictor;
use crate::models::PredictRequest;
use crate::{create_router, AppError, AppState};

fn app() -> Router {
    create_router(state())
}

fn state() -> AppState {
    let predictor = ResponsePredictor::new(
        Box::new(StubRegressor::new([120.5, 45.2, 0.06])),
        Box::new(StubClassifier::new("Pass")),
    );
    AppState {
        predictor: Arc::new(predictor),
        config: Config {
            port: 0,
            bind_address: "127.0.0.1".parse().unwrap(),
            regression_model_path: PathBuf::from("regression_model.json"),
            classification_model_path: PathBuf::from("classification_model.json"),
            environment: "test".to_string(),
        },
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn reference_body() -> Value {
    json!({
        "building_type": "Residential",
        "floor_count": 5,
        "total_height_m": 15.0,
        "plan_aspect_ratio": 1.5,
        "concrete_grade": "M20",
        "steel_grade": "Fe415",
        "dead_load_kpa": 5.0,
        "live_load_kpa": 3.0
    })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn test_schema_lists_columns_in_order() {
    let (status, body) = send(app(), get("/api/v1/schema")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["column_count"], 8);
    assert_eq!(body["columns"][0]["name"], "Building Type");
    assert_eq!(body["columns"][1]["domain"]["max"], 50.0);
    assert_eq!(body["columns"][0]["default"], "Residential");
    assert_eq!(body["columns"][1]["default"], 5);
    assert_eq!(body["columns"][7]["default"], 3.0);
    assert_eq!(body["columns"][7]["name"], "Live Load (kN/m²)");
}

#[tokio::test]
async fn test_predict_reference_building() {
    let (status, body) = send(app(), post_json("/api/v1/predict", reference_body())).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["prediction"]["compliance_label"], "Pass");
    assert_eq!(body["derived"]["is_compliant"], true);
    assert_eq!(body["derived"]["storey_drift_profile"].as_array().unwrap().len(), 5);
    assert_eq!(body["dashboard"]["metrics"][3]["value"], "0.00400");
    assert_eq!(body["dashboard"]["risk_gauge"]["threshold"], 90.0);
    assert_eq!(body["inputs"]["floor_count"], 5);
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn test_predict_rejects_out_of_domain() {
    let mut request = reference_body();
    request["floor_count"] = json!(51);

    let (status, body) = send(app(), post_json("/api/v1/predict", request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("No. of Floors"));
}

#[tokio::test]
async fn test_predict_rejects_missing_field() {
    let mut request = reference_body();
    request.as_object_mut().unwrap().remove("building_type");

    let (status, body) = send(app(), post_json("/api/v1/predict", request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid input: Building Type: is missing");
}

#[tokio::test]
async fn test_predict_wrong_json_type_is_app_error() {
    let mut request = reference_body();
    request["floor_count"] = json!("five");

    let (status, body) = send(app(), post_json("/api/v1/predict", request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().starts_with("invalid request body"));
}

#[tokio::test]
async fn test_predict_malformed_body_is_app_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/predict")
        .header("content-type", "application/json")
        .body(Body::from("{\"building_type\": "))
        .unwrap();

    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_predict_without_content_type_is_app_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/predict")
        .body(Body::from(reference_body().to_string()))
        .unwrap();

    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_models_status_counts_inferences() {
    let app = app();
    let (status, _) = send(app.clone(), post_json("/api/v1/predict", reference_body())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, get("/api/v1/models")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["regression"]["role"], "regression");
    assert_eq!(body["classification"]["format"], "in_memory");
    assert_eq!(body["inference"]["inference_count"], 1);
}

#[tokio::test]
async fn test_predict_handler_direct() {
    let state = state();

    let Json(response) = assert_ok!(super::predict::predict(State(state.clone()), Ok(Json(sample_inputs()))).await);
    assert_eq!(response.prediction.compliance_label.as_str(), "Pass");
    assert_eq!(response.inputs.floor_count(), 5);

    let err = assert_err!(super::predict::predict(State(state.clone()), Ok(Json(PredictRequest::default()))).await);
    match err {
        AppError::ValidationError(msg) => assert!(msg.contains("Building Type: is missing")),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(state.predictor.status().inference_count, 1);
}
