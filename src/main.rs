use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use tracing::{error, info};

use timeline_service::config::Config;
use timeline_service::feed::{FeedAggregator, FeedStore};
use timeline_service::handlers::{self, AppState};
use timeline_service::listener::DeltaListener;
use timeline_service::origins::HttpOrigin;
use timeline_service::reactions::{HttpReactionGateway, ReactionService};
use timeline_service::search::SearchGateway;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    info!("Starting timeline-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: env={}, http_port={}",
        config.app.env, config.app.http_port
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?;

    // Origin order matters: A wins duplicate-id collisions against B
    let origin_a = Arc::new(HttpOrigin::new(
        "origin-a",
        config.origins.origin_a_url.clone(),
        http.clone(),
    ));
    let origin_b = Arc::new(HttpOrigin::new(
        "origin-b",
        config.origins.origin_b_url.clone(),
        http.clone(),
    ));
    let aggregator = FeedAggregator::new(vec![origin_a, origin_b]);

    let store = Arc::new(FeedStore::new());
    match aggregator.load_feed().await {
        Ok(posts) => {
            info!(count = posts.len(), "initial feed loaded");
            store.replace_all(posts);
        }
        Err(e) => {
            // the feed stays empty until a reload succeeds
            error!(error = %e, "initial feed load failed");
        }
    }

    let listener = DeltaListener::new(&config.redis.url, config.redis.delta_channel.clone())
        .context("Failed to create delta listener")?;
    let listener_handle = listener
        .spawn(Arc::clone(&store))
        .await
        .context("Failed to subscribe to delta channel")?;

    let reactions = ReactionService::new(
        Arc::clone(&store),
        Arc::new(HttpReactionGateway::new(
            config.reactions.endpoint.clone(),
            http.clone(),
        )),
    );
    let search = SearchGateway::new(config.search.endpoint.clone(), http);

    let state = web::Data::new(AppState {
        store,
        aggregator,
        reactions,
        search,
    });

    info!(
        "HTTP server listening on {}:{}",
        config.app.host, config.app.http_port
    );
    HttpServer::new(move || App::new().app_data(state.clone()).configure(handlers::configure))
        .bind((config.app.host.as_str(), config.app.http_port))
        .context("Failed to bind HTTP server")?
        .run()
        .await
        .context("HTTP server error")?;

    listener_handle.unsubscribe();
    info!("timeline-service shut down");
    Ok(())
}
