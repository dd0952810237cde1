//! HTTP endpoints over an artifact directory loaded from disk

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use media_gateway_recsys::server::{configure_routes, AppState};
use media_gateway_recsys::ContentRecommender;
use serde_json::json;
use std::sync::Arc;

fn state(dir: &tempfile::TempDir) -> web::Data<AppState> {
    let config = common::config_for(dir);
    let recommender = ContentRecommender::from_config(&config).unwrap();
    web::Data::new(AppState {
        config: Arc::new(config),
        recommender: Arc::new(recommender),
    })
}

fn body_text(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[actix_web::test]
async fn test_health() {
    let dir = common::artifact_dir();
    let app =
        test::init_service(App::new().app_data(state(&dir)).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["status"], "healthy");
    assert_eq!(resp["service"], "recsys-service");
}

#[actix_web::test]
async fn test_new_user_recommendations_are_html() {
    let dir = common::artifact_dir();
    let app =
        test::init_service(App::new().app_data(state(&dir)).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations/new-user")
        .set_json(json!({"features": [0, 0, 0, 0.5, 0.5, 5.0], "limit": 2}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/html"));

    let html = body_text(&test::read_body(resp).await);
    assert!(html.starts_with("<table>"));
    assert_eq!(html.matches("<tr>").count(), 3);
    assert!(html.contains("Birdcage, The (1996)"));
}

#[actix_web::test]
async fn test_new_user_default_limit_from_config() {
    let dir = common::artifact_dir();
    let app =
        test::init_service(App::new().app_data(state(&dir)).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations/new-user")
        .set_json(json!({"features": [0, 0, 0, 1.0, 1.0, 1.0]}))
        .to_request();
    let html = body_text(&test::call_and_read_body(&app, req).await);
    // header row plus config.prediction.max_rows
    assert_eq!(html.matches("<tr>").count(), 4);
}

#[actix_web::test]
async fn test_new_user_wrong_width_is_bad_request() {
    let dir = common::artifact_dir();
    let app =
        test::init_service(App::new().app_data(state(&dir)).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations/new-user")
        .set_json(json!({"features": [1.0, 2.0]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_existing_user_table_lists_rated_movies() {
    let dir = common::artifact_dir();
    let app =
        test::init_service(App::new().app_data(state(&dir)).configure(configure_routes)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/recommendations/users/7?limit=10")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("<th>user genre ave</th>"));
    assert_eq!(html.matches("<tr>").count(), 3);
    // Drama ranks above Action for this user
    let sense = html.find("Sense &amp; Sensibility (1995)").unwrap();
    let arrow = html.find("Broken Arrow (1996)").unwrap();
    assert!(sense < arrow);
    assert!(html.contains("<td style=\"text-align: right;\">5.0</td>"));
    assert!(!html.contains("Heat (1995)"));
}

#[actix_web::test]
async fn test_unknown_user_is_not_found() {
    let dir = common::artifact_dir();
    let app =
        test::init_service(App::new().app_data(state(&dir)).configure(configure_routes)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/recommendations/users/1234")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_user_without_training_row_is_server_error() {
    let dir = common::artifact_dir();
    let app =
        test::init_service(App::new().app_data(state(&dir)).configure(configure_routes)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/recommendations/users/9")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["error"], "inconsistent_user");
}

#[actix_web::test]
async fn test_training_preview() {
    let dir = common::artifact_dir();
    let app =
        test::init_service(App::new().app_data(state(&dir)).configure(configure_routes)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/training/item/preview?limit=2")
        .to_request();
    let html = body_text(&test::call_and_read_body(&app, req).await);
    assert!(html.contains("<th>Com edy</th>"));
    assert_eq!(html.matches("<tr>").count(), 3);
}
