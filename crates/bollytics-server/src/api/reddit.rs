use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use bollytics_analytics::DEFAULT_TREND_LIMIT;
use bollytics_core::{
    Category, FrequencyCell, RankCategory, RankedPost, TopUser, ValidationError, Window, WordCount,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_report_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct IntervalQuery {
    pub interval: Option<String>,
}

impl IntervalQuery {
    /// `month` when no interval is given.
    fn window(&self) -> Result<Window, ValidationError> {
        self.interval
            .as_deref()
            .map_or(Ok(Window::default()), str::parse)
    }
}

fn validation_error(request_id: String, error: &ValidationError) -> ApiError {
    ApiError::new(request_id, "validation_error", error.to_string())
}

pub(super) async fn trending_words(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(source): Path<String>,
    Query(query): Query<IntervalQuery>,
) -> Result<Json<ApiResponse<Vec<WordCount>>>, ApiError> {
    let window = query
        .window()
        .map_err(|e| validation_error(req_id.0.clone(), &e))?;

    let words = state
        .reports
        .get_trending_words(&source, window.days(), DEFAULT_TREND_LIMIT)
        .await
        .map_err(|e| map_report_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(words, req_id.0)))
}

pub(super) async fn post_frequency(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(source): Path<String>,
    Query(query): Query<IntervalQuery>,
) -> Result<Json<ApiResponse<Vec<FrequencyCell>>>, ApiError> {
    let window = query
        .window()
        .map_err(|e| validation_error(req_id.0.clone(), &e))?;

    let grid = state
        .reports
        .get_post_frequency(&source, window.days())
        .await
        .map_err(|e| map_report_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(grid.cells(), req_id.0)))
}

pub(super) async fn top_posts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((source, category)): Path<(String, String)>,
    Query(query): Query<IntervalQuery>,
) -> Result<Json<ApiResponse<Vec<RankedPost>>>, ApiError> {
    let (category, window) = category
        .parse::<RankCategory>()
        .and_then(|c| Ok((c, query.window()?)))
        .map_err(|e| validation_error(req_id.0.clone(), &e))?;

    let posts = state
        .reports
        .get_top_posts(&source, category, window.days())
        .await
        .map_err(|e| map_report_error(req_id.0.clone(), &e))?;

    if posts.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no {category} posts for {source} in the last {window}"),
        ));
    }
    Ok(Json(ApiResponse::new(posts, req_id.0)))
}

pub(super) async fn top_users(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((source, category)): Path<(String, String)>,
    Query(query): Query<IntervalQuery>,
) -> Result<Json<ApiResponse<Vec<TopUser>>>, ApiError> {
    let (category, window) = category
        .parse::<Category>()
        .and_then(|c| Ok((c, query.window()?)))
        .map_err(|e| validation_error(req_id.0.clone(), &e))?;

    let users = state
        .reports
        .get_top_users(&source, category, window.days())
        .await
        .map_err(|e| map_report_error(req_id.0.clone(), &e))?;

    if users.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no {category} posters for {source} in the last {window}"),
        ));
    }
    Ok(Json(ApiResponse::new(users, req_id.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(interval: Option<&str>) -> IntervalQuery {
        IntervalQuery {
            interval: interval.map(str::to_string),
        }
    }

    #[test]
    fn interval_defaults_to_month() {
        assert_eq!(query(None).window(), Ok(Window::Month));
    }

    #[test]
    fn interval_tokens_map_to_windows() {
        assert_eq!(query(Some("week")).window().map(Window::days), Ok(7));
        assert_eq!(query(Some("6months")).window().map(Window::days), Ok(180));
        assert_eq!(query(Some("year")).window().map(Window::days), Ok(365));
    }

    #[test]
    fn unknown_interval_is_rejected() {
        assert_eq!(
            query(Some("fortnight")).window(),
            Err(ValidationError::UnknownWindow("fortnight".to_string()))
        );
    }
}
