//! HTTP surface for the feed engine

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::error;

use crate::domain::ReactionKind;
use crate::feed::{FeedAggregator, FeedStore};
use crate::reactions::ReactionService;
use crate::search::SearchGateway;
use std::sync::Arc;

/// Shared application state behind `web::Data`
pub struct AppState {
    pub store: Arc<FeedStore>,
    pub aggregator: FeedAggregator,
    pub reactions: ReactionService,
    pub search: SearchGateway,
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Current feed snapshot; an empty feed is a valid 200, not an error
pub async fn get_feed(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.store.snapshot())
}

/// Re-run the origin aggregation and rebuild the store
///
/// Per-origin failures are absorbed inside the aggregator; only a
/// catastrophic aggregation failure surfaces as a 500.
pub async fn reload_feed(state: web::Data<AppState>) -> impl Responder {
    match state.aggregator.load_feed().await {
        Ok(posts) => {
            let loaded = posts.len();
            state.store.replace_all(posts);
            HttpResponse::Ok().json(serde_json::json!({ "loaded": loaded }))
        }
        Err(e) => {
            error!(error = %e, "feed reload failed");
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "feed load failed" }))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub kind: ReactionKind,
}

pub async fn toggle_reaction(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ReactionRequest>,
) -> impl Responder {
    let post_id = path.into_inner();
    match state.reactions.toggle(&post_id, body.kind) {
        Some(post) => HttpResponse::Ok().json(post),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "post not found" })),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

pub async fn search(state: web::Data<AppState>, query: web::Query<SearchQuery>) -> impl Responder {
    match state.search.search(&query.q).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => {
            error!(error = %e, "search collaborator call failed");
            HttpResponse::BadGateway().json(serde_json::json!({ "error": "search unavailable" }))
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/feed", web::get().to(get_feed))
        .route("/feed/reload", web::post().to(reload_feed))
        .route("/posts/{id}/reaction", web::post().to(toggle_reaction))
        .route("/search", web::get().to(search));
}
