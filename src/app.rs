use crate::error::{ApiError, ApiResult};
use crate::gemini::{GeminiClient, RecommendationApi};
use crate::models::AVAILABLE_GENRES;
use crate::session::{
    SearchPhase, SearchSession, SessionView, LOADING_MESSAGE_INTERVAL, SEARCH_FAILED_MESSAGE,
};
use crate::trailer::{self, PlaybackPlan};
use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::Origin;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

const MAX_BODY_BYTES: usize = 64 * 1024;
const SESSION_IDLE_TTL_SECS: i64 = 3600;
const MAX_SESSIONS: usize = 10_000;

#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<dyn RecommendationApi>,
    pub sessions: Arc<Mutex<HashMap<String, SearchSession>>>,
    pub session_seq: Arc<AtomicU64>,
    /// Cadence of the rotating loading copy; a constant in production,
    /// shortened by tests.
    pub loading_message_interval: Duration,
}

impl AppState {
    pub fn new(recommender: Arc<dyn RecommendationApi>) -> Self {
        Self {
            recommender,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            session_seq: Arc::new(AtomicU64::new(0)),
            loading_message_interval: LOADING_MESSAGE_INTERVAL,
        }
    }
}

pub async fn run_server() -> Result<()> {
    let recommender: Arc<dyn RecommendationApi> = Arc::new(GeminiClient::from_env()?);
    let state = AppState::new(recommender);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3152));
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/genres", get(list_genres))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/query", put(set_query))
        .route(
            "/api/sessions/:id/genres",
            post(toggle_genre).delete(clear_genres),
        )
        .route("/api/sessions/:id/search", post(submit_search))
        .route(
            "/api/sessions/:id/selection",
            post(select_item).delete(clear_selection),
        )
        .route("/api/sessions/:id/trailer", get(trailer_plan))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::limit::RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn list_genres() -> Json<Vec<&'static str>> {
    Json(AVAILABLE_GENRES.to_vec())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSession {
    id: String,
    view: SessionView,
}

async fn create_session(State(state): State<AppState>) -> Json<CreatedSession> {
    let now = Utc::now().timestamp();
    let id = format!(
        "sess-{}-{}",
        Utc::now().timestamp_millis(),
        state.session_seq.fetch_add(1, Ordering::Relaxed)
    );
    let mut sessions = state.sessions.lock().await;
    prune_sessions(&mut sessions, now);
    let session = SearchSession::new(now);
    let view = session.view();
    sessions.insert(id.clone(), session);
    info!("Created session {}", id);
    Json(CreatedSession { id, view })
}

fn prune_sessions(sessions: &mut HashMap<String, SearchSession>, now: i64) {
    sessions.retain(|_, s| now - s.last_touched <= SESSION_IDLE_TTL_SECS);
    if sessions.len() >= MAX_SESSIONS {
        warn!("Session table full ({} entries), clearing", sessions.len());
        sessions.clear();
    }
}

/// Look a session up, refresh its idle clock and run one state transition
/// under the table lock.
async fn with_session<F, T>(state: &AppState, id: &str, f: F) -> ApiResult<T>
where
    F: FnOnce(&mut SearchSession) -> ApiResult<T>,
{
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(id)
        .ok_or_else(|| ApiError::SessionNotFound(id.to_string()))?;
    session.last_touched = Utc::now().timestamp();
    f(session)
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    with_session(&state, &id, |session| Ok(Json(session.view()))).await
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut sessions = state.sessions.lock().await;
    // Dropping the session aborts any live rotation task.
    sessions
        .remove(&id)
        .ok_or(ApiError::SessionNotFound(id.clone()))?;
    info!("Deleted session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    text: String,
}

async fn set_query(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<QueryBody>,
) -> ApiResult<Json<SessionView>> {
    with_session(&state, &id, |session| {
        session.set_query(body.text);
        Ok(Json(session.view()))
    })
    .await
}

#[derive(Debug, Deserialize)]
struct GenreBody {
    genre: String,
}

async fn toggle_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<GenreBody>,
) -> ApiResult<Json<SessionView>> {
    with_session(&state, &id, |session| {
        if !session.toggle_genre(&body.genre) {
            return Err(ApiError::InvalidInput(format!(
                "Unknown genre '{}'",
                body.genre
            )));
        }
        Ok(Json(session.view()))
    })
    .await
}

async fn clear_genres(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    with_session(&state, &id, |session| {
        session.clear_genres();
        Ok(Json(session.view()))
    })
    .await
}

async fn submit_search(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    let (generation, query, genres, view) = {
        let mut sessions = state.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;
        session.last_touched = Utc::now().timestamp();
        if !session.can_submit() {
            // Nothing to search for, or a request already in flight: inert,
            // the current state is echoed back unchanged.
            return Ok(Json(session.view()));
        }
        let generation = session.begin_loading();
        let ticker = tokio::spawn(cycle_loading_messages(
            state.clone(),
            id.clone(),
            generation,
        ));
        session.ticker = Some(ticker.abort_handle());
        (
            generation,
            session.query.clone(),
            session.selected_genres.clone(),
            session.view(),
        )
    };

    info!("Session {} searching (generation {})", id, generation);
    tokio::spawn(run_search(state, id, generation, query, genres));
    Ok(Json(view))
}

async fn run_search(
    state: AppState,
    id: String,
    generation: u64,
    query: String,
    genres: Vec<String>,
) {
    let outcome = state.recommender.get_recommendations(&query, &genres).await;

    let mut sessions = state.sessions.lock().await;
    let Some(session) = sessions.get_mut(&id) else {
        // Session torn down while the request was in flight.
        return;
    };
    if session.generation != generation || session.phase != SearchPhase::Loading {
        return;
    }
    match outcome {
        Ok(items) => {
            info!("Session {} received {} recommendations", id, items.len());
            session.finish_success(items);
        }
        Err(err) => {
            error!("Recommendation request for session {} failed: {:?}", id, err);
            session.finish_error(SEARCH_FAILED_MESSAGE.to_string());
        }
    }
}

/// Advance the loading copy on a fixed cadence until loading ends for this
/// generation. The submit path also holds an abort handle so every loading
/// exit stops the rotation immediately.
async fn cycle_loading_messages(state: AppState, id: String, generation: u64) {
    loop {
        tokio::time::sleep(state.loading_message_interval).await;
        let mut sessions = state.sessions.lock().await;
        match sessions.get_mut(&id) {
            Some(session)
                if session.phase == SearchPhase::Loading && session.generation == generation =>
            {
                session.advance_loading_message();
            }
            _ => return,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SelectionBody {
    id: String,
}

async fn select_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SelectionBody>,
) -> ApiResult<Json<SessionView>> {
    with_session(&state, &id, |session| {
        if !session.select(&body.id) {
            return Err(ApiError::InvalidInput(format!(
                "No result with id '{}'",
                body.id
            )));
        }
        Ok(Json(session.view()))
    })
    .await
}

async fn clear_selection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    with_session(&state, &id, |session| {
        session.clear_selection();
        Ok(Json(session.view()))
    })
    .await
}

async fn trailer_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    origin: Option<TypedHeader<Origin>>,
) -> ApiResult<Json<PlaybackPlan>> {
    let origin = origin.map(|TypedHeader(o)| o.to_string());
    with_session(&state, &id, |session| {
        let item = session
            .selected_item()
            .ok_or_else(|| ApiError::InvalidInput("No item selected".to_string()))?;
        Ok(Json(trailer::resolve_playback(
            item.trailer_url.as_deref(),
            origin.as_deref(),
        )))
    })
    .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
