//! End-to-end router tests over in-memory sessions; nothing here talks
//! to the network.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use quakesee_api::state::AppState;
use quakesee_api::{create_router, ApiConfig};

fn app() -> Router {
    create_router(Arc::new(AppState::new(ApiConfig::default())))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_session(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_always_up() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["service"], "quakesee-api");
}

#[tokio::test]
async fn about_lists_the_components() {
    let response = app()
        .oneshot(Request::builder().uri("/api/v1/about").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["name"], "QuakeSee");
    assert_eq!(body["components"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unknown_session_is_a_404() {
    let app = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/events?session=00000000-0000-0000-0000-000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_import_select_and_export() {
    let app = app();
    let session = create_session(&app).await;

    let csv = "time,latitude,longitude,depth,magnitude,magnitude_type\n\
               2023-01-02T01:02:03.400000Z,-6.175,106.827,10,4.5,mb\n";
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/events/import?session={session}"))
                .header(header::CONTENT_TYPE, "text/csv")
                .body(Body::from(csv))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["count"], 1);

    // selecting inside the catalog works, outside is a client error
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/events/select",
            &json!({"session": session, "index": 0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["magnitude"], 4.5);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/events/select",
            &json!({"session": session, "index": 5}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/events/export?session={session}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let exported = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(exported.starts_with("time,latitude,longitude,depth,magnitude,magnitude_type"));
    assert!(exported.contains("-6.175,106.827,10,4.5,mb"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/events/geojson?session={session}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["features"].as_array().unwrap().len(), 1);
    assert_eq!(body["features"][0]["geometry"]["coordinates"][0], 106.827);
}

#[tokio::test]
async fn selection_setters_keep_both_representations_in_sync() {
    let app = app();
    let session = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/selection/geographic")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"session": session, "south": -10.0, "north": 6.0, "west": 95.0, "east": 141.0})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let mercator = body["mercator"].clone();

    // feeding the mercator box back reproduces the bounds
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/selection/mercator")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "session": session,
                        "left": mercator["left"],
                        "right": mercator["right"],
                        "bottom": mercator["bottom"],
                        "top": mercator["top"],
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!((body["geographic"]["south"].as_f64().unwrap() - (-10.0)).abs() < 1e-6);
    assert!((body["geographic"]["east"].as_f64().unwrap() - 141.0).abs() < 1e-6);

    // invalid bounds are rejected and the stored selection survives
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/selection/geographic")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"session": session, "south": 6.0, "north": -10.0, "west": 95.0, "east": 141.0})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/selection?session={session}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!((body["geographic"]["north"].as_f64().unwrap() - 6.0).abs() < 1e-6);
}

#[tokio::test]
async fn station_export_rejects_unknown_formats() {
    let app = app();
    let session = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/stations/export/hyp?session={session}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/stations/export/shp?session={session}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sessions_are_discarded_with_their_state() {
    let app = app();
    let session = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/sessions/{session}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/events?session={session}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
