// src/handler.rs

//! HTTP endpoint serving the grouped feed.

use std::sync::Arc;

use axum::{Router, extract::State, http::StatusCode, response::Json, routing::get};
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::GroupedResult;
use crate::pipeline::Pipeline;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Router with the feed endpoint mounted at `route` plus `/health`.
pub fn router(state: AppState, route: &str) -> Router {
    Router::new()
        .route(route, get(feed))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind to `server.bind` and serve until the process stops.
pub async fn serve(pipeline: Pipeline) -> Result<()> {
    let bind = pipeline.config().server.bind.clone();
    let route = pipeline.config().server.route.clone();
    let app = router(AppState::new(pipeline), &route);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    log::info!("Serving {} on {}", route, listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn feed(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    log::info!("Handling feed request");
    respond(state.pipeline.run().await)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Map a pipeline outcome to the response status and body.
///
/// Failure causes are logged and never included in the body.
pub fn respond(outcome: Result<GroupedResult>) -> (StatusCode, Json<Value>) {
    match outcome {
        Ok(grouped) => match serde_json::to_value(&grouped) {
            Ok(body) => {
                log::info!("Served {} entries", grouped.len());
                (StatusCode::OK, Json(body))
            }
            Err(e) => failure(&AppError::from(e)),
        },
        Err(e) if e.is_not_found() => {
            log::warn!("Feed returned no entries");
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "No entries found" })),
            )
        }
        Err(e) => failure(&e),
    }
}

fn failure(cause: &AppError) -> (StatusCode, Json<Value>) {
    log::error!("Feed request failed: {}", cause);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to fetch data" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Config, FeedItem};
    use crate::services::{AssetCache, FeedSource, PatternExtractor};
    use crate::storage::LocalAssetStore;
    use crate::utils::http::create_async_client;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct StaticFeed(Vec<FeedItem>);

    #[async_trait]
    impl FeedSource for StaticFeed {
        async fn fetch(&self) -> Result<Vec<FeedItem>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenFeed;

    #[async_trait]
    impl FeedSource for BrokenFeed {
        async fn fetch(&self) -> Result<Vec<FeedItem>> {
            Err(AppError::http_status("https://www.douban.com/feed", 503))
        }
    }

    fn pipeline(dir: &TempDir, feed: Box<dyn FeedSource>) -> Pipeline {
        let config = Config::default();
        let client = create_async_client(&config.http).unwrap();
        let store = Arc::new(LocalAssetStore::new(dir.path(), "/images/douban"));
        let cache = AssetCache::new(client, store, &config.cache);
        Pipeline::new(config, feed, cache, Box::new(PatternExtractor))
    }

    async fn spawn(pipeline: Pipeline) -> String {
        let app = router(AppState::new(pipeline), "/api/douban");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn body_of(response: reqwest::Response) -> Value {
        serde_json::from_str(&response.text().await.unwrap()).unwrap()
    }

    #[test]
    fn test_respond_not_found() {
        let (status, Json(body)) = respond(Err(AppError::NotFound));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "No entries found" }));
    }

    #[test]
    fn test_respond_hides_failure_cause() {
        let (status, Json(body)) = respond(Err(AppError::Timeout(120)));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch data" }));
    }

    #[test]
    fn test_respond_ok_has_all_buckets() {
        let (status, Json(body)) = respond(Ok(GroupedResult::default()));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["movies"]["wantToWatch"], json!([]));
        assert_eq!(body["books"]["read"], json!([]));
        assert_eq!(body["games"]["playing"], json!([]));
    }

    #[tokio::test]
    async fn test_endpoint_serves_grouped_json() {
        let dir = TempDir::new().unwrap();
        let feed = StaticFeed(vec![FeedItem {
            title: "读过 书名".to_string(),
            link: "https://book.douban.com/subject/2/".to_string(),
            pub_date: "Fri, 05 Jan 2024 12:00:00 GMT".to_string(),
            content: Some("<p>推荐: 推荐</p>".to_string()),
        }]);
        let base = spawn(pipeline(&dir, Box::new(feed))).await;

        let response = reqwest::get(format!("{base}/api/douban")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body = body_of(response).await;
        let read = &body["books"]["read"][0];
        assert_eq!(read["title"], "书名");
        assert_eq!(read["rating"], "推荐");
        assert_eq!(read["type"], "book");
        assert_eq!(read["status"], "读过");
    }

    #[tokio::test]
    async fn test_endpoint_empty_feed_is_404() {
        let dir = TempDir::new().unwrap();
        let base = spawn(pipeline(&dir, Box::new(StaticFeed(Vec::new())))).await;

        let response = reqwest::get(format!("{base}/api/douban")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        let body = body_of(response).await;
        assert_eq!(body, json!({ "error": "No entries found" }));
    }

    #[tokio::test]
    async fn test_endpoint_upstream_failure_is_500() {
        let dir = TempDir::new().unwrap();
        let base = spawn(pipeline(&dir, Box::new(BrokenFeed))).await;

        let response = reqwest::get(format!("{base}/api/douban")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body, json!({ "error": "Failed to fetch data" }));

        let health = reqwest::get(format!("{base}/health")).await.unwrap();
        assert!(health.status().is_success());
    }
}
