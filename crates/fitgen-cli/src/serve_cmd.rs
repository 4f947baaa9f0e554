use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use fitgen_core::FitgenError;
use fitgen_core::WorkoutService;
use fitgen_core::accounts::{self, Credentials, Registration};
use fitgen_core::preferences::{self, PreferencesInput};
use fitgen_core::profile::UserProfile;
use fitgen_core::workout::CompletionInput;
use fitgen_db::pool;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        tracing::error!(error = %format!("{err:#}"), "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_string(),
        }
    }
}

impl From<FitgenError> for AppError {
    fn from(err: FitgenError) -> Self {
        match err {
            FitgenError::Validation(msg) => Self::bad_request(msg),
            FitgenError::Auth(msg) => Self {
                status: StatusCode::UNAUTHORIZED,
                message: msg,
            },
            FitgenError::NotFound(msg) => Self {
                status: StatusCode::NOT_FOUND,
                message: msg,
            },
            FitgenError::Persistence(err) => Self::internal(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request(format!("Invalid id: {raw}")))
}

// ---------------------------------------------------------------------------
// State and response types
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub service: Arc<WorkoutService>,
}

impl AppState {
    pub fn new(pool: PgPool, service: WorkoutService) -> Self {
        Self {
            pool,
            service: Arc::new(service),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/users/{id}", get(get_user))
        .route(
            "/api/users/{id}/preferences",
            get(get_preferences).put(put_preferences),
        )
        .route("/api/users/{id}/workouts/generate", post(generate_workout))
        .route("/api/users/{id}/workouts", get(list_workouts))
        .route("/api/users/{id}/analytics", get(analytics))
        .route("/api/workouts/{id}", get(get_workout))
        .route("/api/workouts/{id}/complete", post(complete_workout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("fitgen serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("fitgen serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> Json<serde_json::Value> {
    Json(json!({ "message": "fitgen workout generator API is running" }))
}

async fn health(State(state): State<AppState>) -> Response {
    if let Err(e) = pool::ping(&state.pool).await {
        tracing::error!(error = %format!("{e:#}"), "health check: database unreachable");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unhealthy", "error": "Database unavailable" })),
        )
            .into_response();
    }

    let generator = state.service.generator();
    let (status, connection) = match generator.check_connection().await {
        Ok(reply) => ("healthy", format!("ok: {reply}")),
        Err(e) => {
            tracing::warn!(generator = generator.name(), error = %format!("{e:#}"), "health check: generator probe failed");
            ("degraded", format!("failed: {e:#}"))
        }
    };

    Json(json!({
        "status": status,
        "generator": generator.name(),
        "generator_connection": connection,
    }))
    .into_response()
}

async fn register(
    State(state): State<AppState>,
    body: Result<Json<Registration>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(reg) = body?;
    let user = accounts::register(&state.pool, &reg).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user_id": user.id,
            "username": user.username,
        })),
    )
        .into_response())
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(creds) = body?;
    let user = accounts::login(&state.pool, &creds).await?;
    Ok(Json(json!({
        "message": "Login successful",
        "user_id": user.id,
        "username": user.username,
        "email": user.email,
    }))
    .into_response())
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let user = fitgen_db::queries::users::get_user(&state.pool, id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| FitgenError::not_found("User not found"))?;

    let response = UserResponse {
        profile: UserProfile::from(&user),
        created_at: user.created_at,
    };
    Ok(Json(json!({ "user": response })).into_response())
}

async fn get_preferences(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let prefs = preferences::load_preferences(&state.pool, id).await?;
    Ok(Json(json!({ "preferences": prefs })).into_response())
}

async fn put_preferences(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PreferencesInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let Json(input) = body?;
    let prefs = preferences::save_preferences(&state.pool, id, &input).await?;
    Ok(Json(json!({ "preferences": prefs })).into_response())
}

async fn generate_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let workout = state.service.create_plan(id).await?;
    Ok(Json(json!({
        "message": "Workout generated successfully",
        "workout": workout,
    }))
    .into_response())
}

async fn list_workouts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let workouts = state.service.list_plans(id).await?;
    Ok(Json(json!({ "workouts": workouts })).into_response())
}

async fn get_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let workout = state.service.get_plan(id).await?;
    Ok(Json(workout).into_response())
}

async fn complete_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<CompletionInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let Json(input) = body?;
    let record = state.service.complete_plan(id, &input).await?;
    Ok(Json(json!({
        "message": "Workout completed successfully",
        "workout_history_id": record.id,
    }))
    .into_response())
}

async fn analytics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let stats = state.service.analytics(id).await?;
    Ok(Json(stats).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
