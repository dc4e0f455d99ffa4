use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod backend;
mod config;
mod error;
mod filter;
mod models;
mod projections;
mod store;


use backend::SqliteBackend;
use config::Config;
use error::StoreError;
use filter::FilterParams;
use models::{ApiResponse, NewGameType, NewLocation, NewSession};
use store::{FetchOutcome, SessionStore};

/// Bankroll HTTP API
/// Every request goes through the one store built at startup
#[derive(Clone)]
struct AppState {
    store: Arc<SessionStore<SqliteBackend>>,
    config: Arc<Config>,
}

type ApiResult = Result<Json<ApiResponse>, StoreError>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    init_tracing(config.log_json);

    let backend = Arc::new(SqliteBackend::open(&config.db_path)?);
    let state = AppState {
        store: Arc::new(SessionStore::new(backend)),
        config: Arc::new(config.clone()),
    };

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "bankroll api listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-out", post(sign_out))
        .route("/sync", post(sync))
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/summary", get(session_summary))
        .route("/sessions/series", get(session_series))
        .route("/locations", get(list_locations).post(create_location))
        .route("/game-types", get(list_game_types).post(create_game_type))
        .route("/settings", get(settings))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn root() -> &'static str {
    "Bankroll API v0.1.0"
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInInput {
    user_id: String,
}

async fn sign_in(State(state): State<AppState>, Json(input): Json<SignInInput>) -> ApiResult {
    let user_id = input.user_id.trim();
    if user_id.is_empty() {
        return Err(StoreError::Validation("userId is required".to_string()));
    }
    // A previous player's lists must not leak into this identity
    state.store.reset().await;
    state.store.backend().sign_in(user_id).await;
    Ok(Json(ApiResponse::success(
        format!("Signed in as {user_id}"),
        serde_json::json!({ "userId": user_id }),
    )))
}

async fn sign_out(State(state): State<AppState>) -> ApiResult {
    state.store.backend().sign_out().await;
    state.store.reset().await;
    Ok(Json(ApiResponse::success("Signed out", serde_json::Value::Null)))
}

fn outcome_json(outcome: &Result<FetchOutcome, StoreError>) -> serde_json::Value {
    match outcome {
        Ok(FetchOutcome::Applied(count)) => serde_json::json!({ "applied": true, "count": count }),
        Ok(FetchOutcome::Superseded) => serde_json::json!({ "applied": false }),
        Err(e) => serde_json::json!({ "applied": false, "error": e.to_string() }),
    }
}

/// Refresh all three lists from the backend.
/// Each list is fetched even if an earlier one failed; the response reports
/// every list's outcome and is a 502 if any of them failed.
async fn sync(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse>) {
    let sessions = state.store.fetch_sessions().await;
    let locations = state.store.fetch_locations().await;
    let game_types = state.store.fetch_game_types().await;

    let data = serde_json::json!({
        "sessions": outcome_json(&sessions),
        "locations": outcome_json(&locations),
        "gameTypes": outcome_json(&game_types),
    });
    if sessions.is_err() || locations.is_err() || game_types.is_err() {
        let response = ApiResponse {
            status: "error".to_string(),
            message: "Sync incomplete".to_string(),
            data: Some(data),
        };
        return (StatusCode::BAD_GATEWAY, Json(response));
    }
    (StatusCode::OK, Json(ApiResponse::success("Synced", data)))
}

async fn list_sessions(State(state): State<AppState>, Query(params): Query<FilterParams>) -> ApiResult {
    let filter = params.into_filter(today())?;
    let sessions = filter.apply(&state.store.sessions().await);

    Ok(Json(ApiResponse::success(
        "Sessions",
        serde_json::json!({
            "count": sessions.len(),
            "sessions": sessions,
        }),
    )))
}

async fn create_session(State(state): State<AppState>, Json(input): Json<NewSession>) -> ApiResult {
    input.validate()?;
    let session = state.store.add_session(input).await?;

    Ok(Json(ApiResponse::success(
        format!("Session recorded at {}", session.location),
        serde_json::json!({
            "session": session,
            "profit": projections::session_profit(&session),
        }),
    )))
}

async fn session_summary(State(state): State<AppState>, Query(params): Query<FilterParams>) -> ApiResult {
    let filter = params.into_filter(today())?;
    let sessions = filter.apply(&state.store.sessions().await);
    let summary = projections::summarize(&sessions);

    Ok(Json(ApiResponse::success(
        "Summary",
        serde_json::json!({ "summary": summary }),
    )))
}

async fn session_series(State(state): State<AppState>, Query(params): Query<FilterParams>) -> ApiResult {
    let filter = params.into_filter(today())?;
    let sessions = filter.apply(&state.store.sessions().await);

    Ok(Json(ApiResponse::success(
        "Profit by month",
        serde_json::json!({ "series": projections::profit_series(&sessions) }),
    )))
}

async fn list_locations(State(state): State<AppState>) -> ApiResult {
    let locations = state.store.locations().await;
    Ok(Json(ApiResponse::success(
        "Locations",
        serde_json::json!({ "locations": locations }),
    )))
}

async fn create_location(State(state): State<AppState>, Json(input): Json<NewLocation>) -> ApiResult {
    input.validate()?;
    let location = state.store.add_location(input.name.trim()).await?;
    Ok(Json(ApiResponse::success(
        format!("Location added: {}", location.name),
        serde_json::json!({ "location": location }),
    )))
}

async fn list_game_types(State(state): State<AppState>) -> ApiResult {
    let game_types: Vec<serde_json::Value> = state
        .store
        .game_types()
        .await
        .into_iter()
        .map(|gt| {
            serde_json::json!({
                "label": gt.label(),
                "gameType": gt,
            })
        })
        .collect();

    Ok(Json(ApiResponse::success(
        "Game types",
        serde_json::json!({ "gameTypes": game_types }),
    )))
}

async fn create_game_type(State(state): State<AppState>, Json(input): Json<NewGameType>) -> ApiResult {
    input.validate()?;
    let game_type = state.store.add_game_type(input).await?;
    Ok(Json(ApiResponse::success(
        format!("Game type added: {}", game_type.label()),
        serde_json::json!({ "gameType": game_type }),
    )))
}

async fn settings(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "defaultBuyIn": state.config.default_buy_in,
    }))
}
