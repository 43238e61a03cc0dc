mod reddit;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use bollytics_analytics::{ReportError, Reports};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{enforce_rate_limit, request_id, RequestId};
use crate::rate_limit::KeyedRateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub reports: Reports,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Validation failures are the caller's to fix; storage failures and
/// timeouts are logged and reported without internal detail.
pub(super) fn map_report_error(request_id: String, error: &ReportError) -> ApiError {
    match error {
        ReportError::Validation(e) => ApiError::new(request_id, "validation_error", e.to_string()),
        ReportError::Storage(_) if error.is_timeout() => {
            tracing::error!(error = %error, "report query timed out");
            ApiError::new(request_id, "timeout", "report query timed out")
        }
        ReportError::Storage(_) => {
            tracing::error!(error = %error, "report query failed");
            ApiError::new(request_id, "internal_error", "database query failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn reddit_router() -> Router<AppState> {
    Router::new()
        .route("/api/reddit/{source}/trending", get(reddit::trending_words))
        .route("/api/reddit/{source}/frequency", get(reddit::post_frequency))
        .route(
            "/api/reddit/{source}/{category}/posts",
            get(reddit::top_posts),
        )
        .route(
            "/api/reddit/{source}/{category}/users",
            get(reddit::top_users),
        )
}

/// Builds the router. `rate_limit` of `None` disables per-client limiting.
pub fn build_app(state: AppState, rate_limit: Option<Arc<KeyedRateLimiter>>) -> Router {
    let mut reports = reddit_router();
    if let Some(limiter) = rate_limit {
        reports = reports.layer(axum::middleware::from_fn_with_state(
            limiter,
            enforce_rate_limit,
        ));
    }

    Router::new()
        .route("/api/health", get(health))
        .merge(reports)
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match bollytics_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use bollytics_core::{Category, NewPost, Sources, ValidationError};
    use bollytics_db::{apply_ingest_batch, DbError};
    use tower::ServiceExt;

    use super::*;

    fn app(pool: PgPool, rate_limit: Option<Arc<KeyedRateLimiter>>) -> Router {
        let sources = Sources::new(["kollywood", "bollywood"]).expect("sources");
        let reports = Reports::new(pool.clone(), Arc::new(sources), Duration::from_secs(3), 365);
        build_app(AppState { pool, reports }, rate_limit)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&body).expect("json parse"))
    }

    fn candidate(id: &str, category: Category, score: i64, author: &str) -> NewPost {
        NewPost {
            id: id.to_string(),
            name: format!("t3_{id}"),
            created_at: Utc::now() - chrono::Duration::days(2),
            permalink: format!("/r/kollywood/comments/{id}/"),
            title: format!("Leo discussion {id}"),
            body: String::new(),
            category,
            score,
            upvote_ratio: 0.8,
            num_comments: 30,
            source: "kollywood".to_string(),
            source_id: "t5_2s8ab".to_string(),
            source_size: 250_000,
            author: author.to_string(),
            author_id: "t2_abc".to_string(),
        }
    }

    #[test]
    fn validation_error_maps_to_bad_request() {
        let err = ReportError::Validation(ValidationError::UnknownSource("x".to_string()));
        let response = map_report_error("req-1".to_string(), &err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timeout_maps_to_internal_error() {
        let err = ReportError::Storage(DbError::Timeout(Duration::from_secs(3)));
        let api = map_report_error("req-1".to_string(), &err);
        assert_eq!(api.error.code, "timeout");
        assert_eq!(
            api.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn rate_limited_maps_to_429() {
        let response = ApiError::new("req-1", "rate_limited", "slow down").into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_reports_ok_and_echoes_request_id(pool: PgPool) {
        let response = app(pool, None)
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("x-request-id", "req-health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-request-id").map(|v| v.to_str().ok()),
            Some(Some("req-health"))
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["meta"]["request_id"], "req-health");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn unknown_source_is_bad_request(pool: PgPool) {
        let (status, json) = get_json(app(pool, None), "/api/reddit/tollywood/trending").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn unknown_interval_and_category_are_bad_requests(pool: PgPool) {
        let (status, _) = get_json(
            app(pool.clone(), None),
            "/api/reddit/kollywood/frequency?interval=decade",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(app(pool.clone(), None), "/api/reddit/kollywood/new/posts").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(app(pool, None), "/api/reddit/kollywood/hated/users").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn empty_leaderboard_is_not_found(pool: PgPool) {
        let (status, json) = get_json(app(pool, None), "/api/reddit/kollywood/top/posts").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn top_posts_and_users_are_served(pool: PgPool) {
        apply_ingest_batch(
            &pool,
            vec![
                candidate("a1", Category::Top, 500, "rasigan"),
                candidate("a2", Category::Top, 900, "rasigan"),
                candidate("a3", Category::Top, 100, "critic"),
            ],
            365,
        )
        .await
        .expect("seed");

        let (status, json) = get_json(
            app(pool.clone(), None),
            "/api/reddit/kollywood/top/posts?interval=week",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let posts = json["data"].as_array().expect("data array");
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0]["id"], "a2");
        assert_eq!(posts[0]["category_score"], 720.0);

        let (status, json) = get_json(app(pool, None), "/api/reddit/kollywood/top/users").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"][0]["user"], "rasigan");
        assert_eq!(json["data"][0]["post_count"], 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn frequency_is_a_complete_grid(pool: PgPool) {
        apply_ingest_batch(
            &pool,
            vec![candidate("f1", Category::Top, 10, "rasigan")],
            365,
        )
        .await
        .expect("seed");

        let (status, json) = get_json(app(pool, None), "/api/reddit/kollywood/frequency").await;
        assert_eq!(status, StatusCode::OK);
        let cells = json["data"].as_array().expect("data array");
        assert_eq!(cells.len(), 168);
        let total: i64 = cells.iter().filter_map(|c| c["count"].as_i64()).sum();
        assert_eq!(total, 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn trending_words_are_served(pool: PgPool) {
        apply_ingest_batch(
            &pool,
            vec![
                candidate("t1", Category::Top, 10, "rasigan"),
                candidate("t2", Category::Controversial, 10, "critic"),
            ],
            365,
        )
        .await
        .expect("seed");

        let (status, json) = get_json(app(pool, None), "/api/reddit/kollywood/trending").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"][0]["word"], "discussion");
        assert_eq!(json["data"][0]["count"], 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn clients_over_their_budget_are_refused(pool: PgPool) {
        let limiter = Arc::new(KeyedRateLimiter::new(0, 1));
        let (status, _) = get_json(
            app(pool.clone(), Some(Arc::clone(&limiter))),
            "/api/reddit/kollywood/frequency",
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) =
            get_json(app(pool.clone(), Some(limiter)), "/api/reddit/kollywood/frequency").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"]["code"], "rate_limited");

        let (status, _) = get_json(app(pool, None), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
    }
}
