//! HTTP surface for the dashboard.
//!
//! One router, nested under the configured URL base path: two HTML pages and
//! the JSON endpoints they call. Each date-range request runs a single
//! database query; everything after that (sorting, filtering, chart
//! rendering) happens in the browser.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{debug, error, info, instrument, warn};

use crate::config::AppConfig;
use crate::db::{DateRange, DbError, GameRepository, StatsDimension, ValueCount};
use crate::frame::GameFrame;

/// Shared state for all request handlers.
#[derive(Debug, Clone, new)]
pub struct AppState {
    config: Arc<AppConfig>,
    repository: GameRepository,
}

/// Error surface of the JSON endpoints.
#[derive(Debug, Display, Error)]
pub enum ApiError {
    /// Missing or malformed request parameters.
    #[display("Invalid request: {}", message)]
    BadRequest {
        /// What was wrong with the request.
        message: String,
    },
    /// The requested statistics dimension does not exist.
    #[display("Unknown statistics dimension: {}", name)]
    UnknownDimension {
        /// The dimension name from the request path.
        name: String,
    },
    /// The query would return more rows than the configured limit allows.
    #[display("Query matches {} rows, exceeding the configured limit of {}", count, limit)]
    RowLimitExceeded {
        /// Number of rows the query matches.
        count: i64,
        /// The configured row limit.
        limit: u32,
    },
    /// Database failure.
    #[display("{}", _0)]
    Database(DbError),
    /// Request processing failure outside the database.
    #[display("Internal error: {}", message)]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self::Database(err)
    }
}

/// JSON body of an error response. `count` and `limit` are present only for
/// row-limit refusals, where the page uses them in its popup.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::UnknownDimension { .. } => StatusCode::NOT_FOUND,
            Self::RowLimitExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, "Request rejected");
        }

        let (count, limit) = match &self {
            Self::RowLimitExceeded { count, limit } => (Some(*count), Some(*limit)),
            _ => (None, None),
        };
        let body = ErrorBody {
            error: self.to_string(),
            count,
            limit,
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct GamesCount {
    count: i64,
}

/// Date range query parameters, as sent by the date pickers.
#[derive(Debug, Deserialize)]
struct DateRangeParams {
    start_date: Option<String>,
    end_date: Option<String>,
}

/// Builds the dashboard router, nested under the configured URL base path.
pub fn router(state: AppState) -> Router {
    let base = normalize_base_path(state.config.url_base_pathname());

    let routes = Router::new()
        .route("/", get(statistics_page))
        .route("/query", get(query_page))
        .route("/api/games/count", get(games_count))
        .route("/api/games/table", get(games_table))
        .route("/api/stats/{dimension}", get(stats_counts))
        .with_state(state);

    let app = match base {
        None => routes,
        Some(base) => {
            let redirect_to = format!("{}/", base);
            Router::new()
                .nest(&base, routes)
                .route(
                    "/",
                    get(move || {
                        let to = redirect_to.clone();
                        async move { Redirect::permanent(&to) }
                    }),
                )
        }
    };

    app.layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
        debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
        req
    }))
}

/// Returns `None` when the dashboard is served at the root, otherwise the
/// base path without its trailing slash.
fn normalize_base_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

async fn statistics_page() -> Html<&'static str> {
    Html(include_str!("../assets/statistics.html"))
}

async fn query_page() -> Html<&'static str> {
    Html(include_str!("../assets/query.html"))
}

/// Total count of games in the date range, for the total-games card.
#[instrument(skip(state))]
async fn games_count(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<GamesCount>, ApiError> {
    let range = parse_range(&params)?;
    let repository = state.repository.clone();
    let count = run_blocking(move || repository.count_games(&range)).await?;
    Ok(Json(GamesCount { count }))
}

/// The derived table for the query page.
///
/// Counts first and refuses to execute a query whose result would exceed the
/// configured row limit.
#[instrument(skip(state))]
async fn games_table(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<GameFrame>, ApiError> {
    let range = parse_range(&params)?;
    let limit = *state.config.query_row_limit();

    let repository = state.repository.clone();
    let count = run_blocking(move || repository.count_games(&range)).await?;
    if count > i64::from(limit) {
        return Err(ApiError::RowLimitExceeded { count, limit });
    }

    let repository = state.repository.clone();
    let rows = run_blocking(move || repository.fetch_games(&range)).await?;
    let frame = GameFrame::from_rows(&rows);
    info!(rows = frame.len(), "Conditioned table for display");
    Ok(Json(frame))
}

/// Value counts for one donut chart.
#[instrument(skip(state))]
async fn stats_counts(
    State(state): State<AppState>,
    Path(dimension): Path<String>,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<Vec<ValueCount>>, ApiError> {
    let parsed = StatsDimension::from_str(&dimension)
        .map_err(|_| ApiError::UnknownDimension { name: dimension })?;
    let range = parse_range(&params)?;

    let repository = state.repository.clone();
    let counts = run_blocking(move || repository.value_counts(parsed, &range)).await?;
    Ok(Json(counts))
}

fn parse_range(params: &DateRangeParams) -> Result<DateRange, ApiError> {
    let (Some(start), Some(end)) = (params.start_date.as_deref(), params.end_date.as_deref())
    else {
        return Err(ApiError::BadRequest {
            message: "start_date and end_date are required".to_string(),
        });
    };
    Ok(DateRange::from_dates(parse_date(start)?, parse_date(end)?))
}

fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| ApiError::BadRequest {
        message: format!("Invalid date '{}': {}", value, e),
    })
}

/// Runs a synchronous database call on the blocking thread pool.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DbError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal {
            message: format!("Blocking task failed: {}", e),
        })?
        .map_err(ApiError::from)
}
