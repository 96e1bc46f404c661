//! API route handlers.

use axum::{
    extract::{ConnectInfo, FromRequestParts, Path, Query, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{Local, NaiveDate};
use sha2::{Digest, Sha256};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::rate_limiter::VoteLimiter;
use crate::scraper::{self, FetchError, RefreshSummary};
use crate::storage::{
    BackupStore, ExclusionEntry, NewRelease, ReleaseRecord, SharedRepository, StoreError,
};
use crate::types::{
    BackupResponse, ErrorResponse, HealthResponse, IndexQuery, IndexResponse, PlatformOption,
    RestorePoint, UpdateReleaseForm, VoteForm,
};

/// Shown when a client exceeds its vote allowance
pub const VOTES_LIMIT_MESSAGE: &str = "Votes limit reached. Please come back later!";

const TOP_GAMES: usize = 3;

/// Application state shared across handlers.
pub struct AppState {
    pub repo: SharedRepository,
    pub backups: BackupStore,
    pub client: reqwest::Client,
    pub limiter: VoteLimiter,
    pub config: AppConfig,
}

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) | StoreError::SnapshotNotFound(_) => {
                Self::not_found(e.to_string())
            }
            StoreError::TitleConflict(_) | StoreError::ExcludedTitle(_) => {
                Self::conflict(e.to_string())
            }
            StoreError::InvalidSnapshotName(_) | StoreError::Json(_) => {
                Self::bad_request(e.to_string())
            }
            StoreError::Sqlite(_) | StoreError::Io(_) => {
                warn!(error = %e, "Store operation failed");
                Self::internal(e.to_string())
            }
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        Self::bad_gateway(format!("Source fetch failed: {}", e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Client address: first `X-Forwarded-For` entry, else the peer address.
pub struct ClientAddr(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let addr = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_default();

        Ok(ClientAddr(addr))
    }
}

/// Admin gate: `Authorization: Bearer <admin.token>`.
pub struct AdminGuard;

impl FromRequestParts<Arc<AppState>> for AdminGuard {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin.token.as_deref() else {
            return Err(ApiError::forbidden("Admin access is not configured"));
        };

        let provided = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        if provided.is_some_and(|token| token_matches(token, expected)) {
            Ok(AdminGuard)
        } else {
            Err(ApiError::forbidden("Admin access required"))
        }
    }
}

/// Compare tokens through their SHA-256 digests, touching every byte
fn token_matches(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index).post(vote))
        .route("/health", get(health))
        .route("/refresh", post(trigger_refresh))
        .route("/game/{id}/", get(show_game))
        .route("/game/{id}/delete/", get(delete_game).post(delete_game))
        .route("/game/{id}/update/", get(redirect_index).post(update_game))
        .route("/delete", get(reset))
        .route("/excluded/", get(list_excluded))
        .route("/backup/", get(create_backup))
        .route("/restore/", get(list_restore_points))
        .route("/restore/{filename}/", get(restore_backup))
        .route(
            "/delete_restore_point/{filename}/",
            get(delete_restore_point).post(delete_restore_point),
        )
        .with_state(state)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Purge expired releases and read the listing for `platform`.
async fn render_index(
    state: &AppState,
    platform: &str,
    message: Option<String>,
) -> Result<IndexResponse, ApiError> {
    let repo = state.repo.lock().await;
    repo.purge_expired(today())?;

    Ok(IndexResponse {
        platform: platform.to_string(),
        platforms: PlatformOption::all(),
        games: repo.list_releases(platform)?,
        top_games: repo.top_voted(platform, TOP_GAMES)?,
        message,
    })
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    let releases = state.repo.lock().await.get_release_count()?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        releases,
    }))
}

/// Index page: upcoming releases and the top voted ones.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
) -> Result<Json<IndexResponse>, ApiError> {
    Ok(Json(render_index(&state, query.platform(), None).await?))
}

/// Vote for a release.
pub async fn vote(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
    ClientAddr(client): ClientAddr,
    Form(form): Form<VoteForm>,
) -> Result<Response, ApiError> {
    let platform = query.platform();

    if !state.limiter.try_acquire(&client).await {
        info!(client = %client, "Vote rate limited");
        let page = render_index(&state, platform, Some(VOTES_LIMIT_MESSAGE.to_string())).await?;
        return Ok(Json(page).into_response());
    }

    if let Some(id) = form.game_id.as_deref().and_then(|v| v.trim().parse::<i64>().ok()) {
        if let Some(votes) = state.repo.lock().await.add_vote(id)? {
            info!(id, votes, "Vote recorded");
            return Ok(Redirect::to(&format!("/?platform={}", platform)).into_response());
        }
    }

    Ok(Json(render_index(&state, platform, None).await?).into_response())
}

/// Single release by id.
pub async fn show_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ReleaseRecord>, ApiError> {
    let release = state.repo.lock().await.get_release(id)?;
    release.map(Json).ok_or_else(|| StoreError::NotFound(id).into())
}

/// Delete a release and exclude its title.
pub async fn delete_game(
    _admin: AdminGuard,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    state.repo.lock().await.delete_release(id)?;
    Ok(Redirect::to("/"))
}

/// Edit a release; its previous title is excluded.
pub async fn update_game(
    _admin: AdminGuard,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Form(form): Form<UpdateReleaseForm>,
) -> Result<Redirect, ApiError> {
    let date = NaiveDate::parse_from_str(form.date.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("Invalid date: {}", form.date)))?;
    let title = form.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title must not be empty"));
    }

    let fields = NewRelease {
        date,
        title: title.to_string(),
        platforms: form.platforms.trim().to_string(),
    };
    state.repo.lock().await.update_release(id, &fields)?;
    Ok(Redirect::to("/"))
}

/// Non-mutating admin pages fall back to the index.
pub async fn redirect_index(_admin: AdminGuard) -> Redirect {
    Redirect::to("/")
}

/// Remove every release and exclusion.
pub async fn reset(
    _admin: AdminGuard,
    State(state): State<Arc<AppState>>,
) -> Result<Redirect, ApiError> {
    state.repo.lock().await.reset()?;
    Ok(Redirect::to("/"))
}

/// Titles that will never be imported again.
pub async fn list_excluded(
    _admin: AdminGuard,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ExclusionEntry>>, ApiError> {
    let excluded = state.repo.lock().await.list_excluded()?;
    Ok(Json(excluded))
}

/// Write a snapshot of the full dataset.
pub async fn create_backup(
    _admin: AdminGuard,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BackupResponse>, ApiError> {
    let snapshot = state.repo.lock().await.export_snapshot()?;
    let filename = state.backups.save(&snapshot, Local::now().naive_local())?;
    info!(filename = %filename, entries = snapshot.entries.len(), "Restore point created");

    Ok(Json(BackupResponse {
        filename,
        message: "Restore point created!".to_string(),
    }))
}

/// List snapshots, newest first.
pub async fn list_restore_points(
    _admin: AdminGuard,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<RestorePoint>>, ApiError> {
    let base = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|host| {
            let scheme = headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("http");
            format!("{}://{}", scheme, host)
        })
        .unwrap_or_default();

    let points = state
        .backups
        .list()?
        .into_iter()
        .map(|filename| RestorePoint {
            url: format!("{}/restore/{}/", base, filename),
            filename,
        })
        .collect();

    Ok(Json(points))
}

/// Replace all data with a snapshot.
pub async fn restore_backup(
    _admin: AdminGuard,
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Redirect, ApiError> {
    let snapshot = state.backups.load(&filename)?;
    state.repo.lock().await.import_snapshot(&snapshot)?;
    info!(filename = %filename, "Restored from snapshot");
    Ok(Redirect::to("/"))
}

/// Remove a snapshot file.
pub async fn delete_restore_point(
    _admin: AdminGuard,
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Redirect, ApiError> {
    state.backups.remove(&filename)?;
    info!(filename = %filename, "Restore point deleted");
    Ok(Redirect::to("/"))
}

/// Run the scrape pipeline now.
pub async fn trigger_refresh(
    _admin: AdminGuard,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshSummary>, ApiError> {
    let summary = scraper::refresh(&state.client, &state.repo, &state.config.scraper, today()).await?;
    Ok(Json(summary))
}
