use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse, Responder};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::config::RecsysConfig;
use crate::error::RecsysError;
use crate::presenter::Table;
use crate::recommendation::{ContentRecommender, TrainingSide};
use crate::types::UserId;

/// Application state shared across all handlers
pub struct AppState {
    pub config: Arc<RecsysConfig>,
    pub recommender: Arc<ContentRecommender>,
}

impl AppState {
    fn limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.config.prediction.max_rows)
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Request body for new-user recommendations
#[derive(Debug, Deserialize)]
pub struct NewUserRequest {
    /// Full user feature row, metadata columns included
    pub features: Vec<f64>,
    /// Maximum number of rows (default: `prediction.max_rows`)
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "recsys-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn html(table: &Table) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(table.to_html())
}

/// POST /api/v1/recommendations/new-user
pub async fn recommend_new_user(
    state: web::Data<AppState>,
    body: web::Json<NewUserRequest>,
) -> Result<HttpResponse, RecsysError> {
    let NewUserRequest { features, limit } = body.into_inner();
    let limit = state.limit(limit);
    let user_vec = Array1::from(features);

    let recommender = Arc::clone(&state.recommender);
    let table = web::block(move || recommender.recommend_new_user(user_vec.view(), limit))
        .await
        .map_err(|e| RecsysError::Model(e.to_string()))??;

    info!("Served new-user recommendations: {} rows", table.len());
    Ok(html(&table))
}

/// GET /api/v1/recommendations/users/{id}
///
/// Unknown users get a 404 with a JSON body.
pub async fn recommend_existing_user(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, RecsysError> {
    let user_id = path.into_inner();
    let limit = state.limit(query.limit);

    let recommender = Arc::clone(&state.recommender);
    let table = web::block(move || recommender.recommend_existing_user(user_id, limit))
        .await
        .map_err(|e| RecsysError::Model(e.to_string()))??;

    match table {
        Some(table) => Ok(html(&table)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "user_not_found",
            "error_description": format!("User {} not in ratings map", user_id)
        }))),
    }
}

/// GET /api/v1/training/{side}/preview
pub async fn preview_training(
    state: web::Data<AppState>,
    path: web::Path<TrainingSide>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, RecsysError> {
    let limit = state.limit(query.limit);
    let table = state.recommender.preview_training(path.into_inner(), limit)?;
    Ok(html(&table))
}

/// Configure application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::scope("/api/v1")
            .route(
                "/recommendations/new-user",
                web::post().to(recommend_new_user),
            )
            .route(
                "/recommendations/users/{id}",
                web::get().to(recommend_existing_user),
            )
            .route(
                "/training/{side}/preview",
                web::get().to(preview_training),
            ),
    );
}
