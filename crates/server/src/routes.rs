use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use portfolio_tracker_core::errors::CoreError;
use portfolio_tracker_core::models::asset::AssetClass;
use portfolio_tracker_core::models::dividend::Dividend;
use portfolio_tracker_core::models::holding::HoldingInput;
use portfolio_tracker_core::models::user::{Credentials, Session};
use portfolio_tracker_core::models::watchlist::WatchlistInput;
use portfolio_tracker_core::PortfolioTracker;

use crate::error::ApiError;
use crate::extract::{JsonBody, Owner};

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<PortfolioTracker>,
    pub expose_reset_token: bool,
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password/validate", get(validate_reset_token))
        .route("/auth/reset-password", post(reset_password))
        // Holdings & portfolio
        .route("/holdings", get(list_holdings).post(create_holding))
        .route("/holdings/:id", put(update_holding).delete(delete_holding))
        .route("/portfolio/summary", get(portfolio_summary))
        // Watchlist
        .route("/watchlist", get(list_watchlist).post(add_to_watchlist))
        .route("/watchlist/:id", axum::routing::delete(remove_from_watchlist))
        // Market data
        .route("/search/:kind", get(search))
        .route("/news", get(news))
        .route("/dividends", get(upcoming_dividends).post(save_dividend))
        .route("/dividends/:key", get(dividends_for).delete(delete_dividend))
        .route("/performance/chart", get(performance_chart))
        .route("/snapshots", get(snapshots));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Run password hashing off the async workers.
async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CoreError::Internal(format!("blocking task failed: {e}")))?
        .map_err(ApiError::from)
}

fn parse_id(raw: &str) -> Result<Uuid, CoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| CoreError::InvalidInput(format!("Invalid id: {raw}")))
}

// ── Auth ────────────────────────────────────────────────────────────

fn session_body(message: &str, session: &Session) -> Value {
    json!({
        "message": message,
        "token": session.token,
        "expiresAt": session.expires_at,
        "user": { "id": session.user_id, "email": session.email },
    })
}

async fn register(State(state): State<AppState>, JsonBody(credentials): JsonBody<Credentials>) -> ApiResult<Json<Value>> {
    let tracker = Arc::clone(&state.tracker);
    let session = blocking(move || tracker.register(&credentials)).await?;
    Ok(Json(session_body("User registered successfully", &session)))
}

async fn login(State(state): State<AppState>, JsonBody(credentials): JsonBody<Credentials>) -> ApiResult<Json<Value>> {
    let tracker = Arc::clone(&state.tracker);
    let session = blocking(move || tracker.login(&credentials)).await?;
    Ok(Json(session_body("Login successful", &session)))
}

#[derive(Debug, Deserialize)]
struct EmailBody {
    #[serde(default)]
    email: String,
}

const RESET_SENT: &str = "If an account with that email exists, a password reset link has been sent.";

async fn forgot_password(State(state): State<AppState>, JsonBody(body): JsonBody<EmailBody>) -> ApiResult<Json<Value>> {
    let token = state.tracker.forgot_password(&body.email)?;
    match token {
        Some(token) if state.expose_reset_token => Ok(Json(json!({ "message": RESET_SENT, "resetToken": token }))),
        _ => Ok(Json(json!({ "message": RESET_SENT }))),
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    #[serde(default)]
    token: String,
}

async fn validate_reset_token(State(state): State<AppState>, Query(query): Query<TokenQuery>) -> ApiResult<Response> {
    if state.tracker.validate_reset_token(&query.token)? {
        return Ok(Json(json!({ "valid": true })).into_response());
    }
    let body = json!({ "valid": false, "error": "Invalid or expired token" });
    Ok((StatusCode::BAD_REQUEST, Json(body)).into_response())
}

#[derive(Debug, Deserialize)]
struct ResetBody {
    #[serde(default)]
    token: String,
    #[serde(default)]
    password: String,
}

async fn reset_password(State(state): State<AppState>, JsonBody(body): JsonBody<ResetBody>) -> ApiResult<Json<Value>> {
    let tracker = Arc::clone(&state.tracker);
    blocking(move || tracker.reset_password(&body.token, &body.password)).await?;
    Ok(Json(json!({ "message": "Password reset successfully" })))
}

// ── Holdings & portfolio ────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct EnrichQuery {
    #[serde(default)]
    enrich: bool,
}

async fn list_holdings(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Query(query): Query<EnrichQuery>,
) -> ApiResult<Json<Value>> {
    if query.enrich {
        let valuation = state.tracker.portfolio_summary(owner).await?;
        return Ok(Json(json!({
            "assets": valuation.lines,
            "totalMarketValue": valuation.total_market_value,
        })));
    }
    let holdings = state.tracker.list_holdings(owner)?;
    Ok(Json(json!({ "assets": holdings })))
}

async fn create_holding(
    State(state): State<AppState>,
    Owner(owner): Owner,
    JsonBody(input): JsonBody<HoldingInput>,
) -> ApiResult<Response> {
    let holding = state.tracker.create_holding(owner, input).await?;
    Ok((StatusCode::CREATED, Json(holding)).into_response())
}

async fn update_holding(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<HoldingInput>,
) -> ApiResult<Response> {
    let holding = state.tracker.update_holding(owner, parse_id(&id)?, input).await?;
    Ok(Json(holding).into_response())
}

async fn delete_holding(State(state): State<AppState>, Owner(owner): Owner, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state.tracker.delete_holding(owner, parse_id(&id)?)?;
    Ok(Json(json!({ "message": "Asset deleted" })))
}

async fn portfolio_summary(State(state): State<AppState>, Owner(owner): Owner) -> ApiResult<Response> {
    let valuation = state.tracker.portfolio_summary(owner).await?;
    Ok(Json(valuation).into_response())
}

// ── Watchlist ───────────────────────────────────────────────────────

async fn list_watchlist(State(state): State<AppState>, Owner(owner): Owner) -> ApiResult<Response> {
    let entries = state.tracker.list_watchlist(owner).await?;
    Ok(Json(entries).into_response())
}

async fn add_to_watchlist(
    State(state): State<AppState>,
    Owner(owner): Owner,
    JsonBody(input): JsonBody<WatchlistInput>,
) -> ApiResult<Response> {
    let entry = state.tracker.add_to_watchlist(owner, input).await?;
    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

async fn remove_from_watchlist(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.tracker.remove_from_watchlist(owner, parse_id(&id)?)?;
    Ok(Json(json!({ "message": "Item removed from watchlist" })))
}

// ── Market data ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search(
    State(state): State<AppState>,
    Owner(_): Owner,
    Path(kind): Path<String>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Value>> {
    let class = kind.parse::<AssetClass>()?;
    let results = state.tracker.search(&query.q, class).await;
    Ok(Json(json!({ "results": results })))
}

async fn news(State(state): State<AppState>) -> Response {
    match state.tracker.latest_news().await {
        Ok(articles) => Json(json!({ "articles": articles })).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "News unavailable");
            let body = json!({ "articles": [], "error": "News service temporarily unavailable" });
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct DaysQuery {
    days: Option<i64>,
}

async fn upcoming_dividends(State(state): State<AppState>, Query(query): Query<DaysQuery>) -> ApiResult<Response> {
    let dividends = state.tracker.upcoming_dividends(query.days)?;
    Ok(Json(dividends).into_response())
}

async fn dividends_for(State(state): State<AppState>, Path(ticker): Path<String>) -> ApiResult<Response> {
    let dividends = state.tracker.dividends_for(&ticker)?;
    Ok(Json(dividends).into_response())
}

async fn save_dividend(
    State(state): State<AppState>,
    Owner(_): Owner,
    JsonBody(dividend): JsonBody<Dividend>,
) -> ApiResult<Response> {
    let saved = state.tracker.save_dividend(dividend)?;
    Ok(Json(saved).into_response())
}

async fn delete_dividend(State(state): State<AppState>, Owner(_): Owner, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.tracker.delete_dividend(parse_id(&id)?)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn performance_chart(State(state): State<AppState>, Owner(owner): Owner) -> ApiResult<Response> {
    let chart = state.tracker.performance_chart(owner)?;
    Ok(Json(chart).into_response())
}

async fn snapshots(State(state): State<AppState>, Owner(_): Owner) -> Json<Value> {
    Json(json!({ "snapshots": state.tracker.snapshots() }))
}
