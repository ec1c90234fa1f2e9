use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::application::TurnOutcome;
use crate::connector::api::Container;
use crate::domain::{ChatSession, DomainError, Turn};

use super::page::{render_page, PageConfig};
use super::sessions::{SessionRegistry, WebSession};

pub const SESSION_COOKIE: &str = "gemchat_session";

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    container: Arc<Container>,
    sessions: SessionRegistry,
    page: Arc<PageConfig>,
}

impl AppState {
    pub fn new(container: Arc<Container>, sessions: SessionRegistry, page: PageConfig) -> Self {
        Self {
            container,
            sessions,
            page: Arc::new(page),
        }
    }
}

pub struct ServeOptions {
    pub addr: SocketAddr,
    pub page: PageConfig,
    pub session_ttl: Duration,
}

#[derive(Deserialize)]
struct ChatForm {
    #[serde(default)]
    prompt: String,
}

#[derive(Deserialize)]
struct ChatRequest {
    prompt: String,
}

#[derive(Serialize)]
struct ChatResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    turns: Vec<Turn>,
}

#[derive(Serialize)]
struct TranscriptResponse {
    session_id: String,
    created_at: i64,
    turns: Vec<Turn>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        .route("/reset", post(reset))
        .route("/api/transcript", get(api_transcript))
        .route("/api/chat", post(api_chat))
        .route("/healthz", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the chat server until Ctrl-C.
pub async fn serve(container: Arc<Container>, options: ServeOptions) -> Result<()> {
    let sessions = SessionRegistry::new();
    let state = AppState::new(container, sessions.clone(), options.page);

    let shutdown = CancellationToken::new();
    let sweeper = spawn_sweeper(sessions, options.session_ttl, shutdown.clone());

    let listener = TcpListener::bind(options.addr).await?;
    info!("Chat server listening on http://{}", listener.local_addr()?);

    let token = shutdown.clone();
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down chat server");
            token.cancel();
        })
        .await?;

    shutdown.cancel();
    let _ = sweeper.await;
    Ok(())
}

/// Periodically evict sessions idle for longer than `ttl`.
pub fn spawn_sweeper(
    sessions: SessionRegistry,
    ttl: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    sessions.evict_idle(ttl).await;
                }
            }
        }
    })
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session, created) = state
        .sessions
        .get_or_open(session_cookie(&headers).as_deref())
        .await;
    let turns = state
        .container
        .transcript_use_case(session.store())
        .execute()
        .await;

    let page = render_page(&state.page, &turns, None);
    with_session_cookie(Html(page).into_response(), &session, created)
}

async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ChatForm>,
) -> Response {
    let (session, created) = state
        .sessions
        .get_or_open(session_cookie(&headers).as_deref())
        .await;

    let notice = {
        let _turn = session.begin_turn().await;
        match submit(&state, &session, &form.prompt).await {
            Ok(TurnOutcome::Replied(_)) => None,
            Ok(TurnOutcome::Failed(e)) => Some(e.to_string()),
            Err(e) if e.is_invalid_input() => None,
            Err(e) => {
                error!("Chat turn failed in session {}: {}", session.id(), e);
                Some(e.to_string())
            }
        }
    };

    let turns = state
        .container
        .transcript_use_case(session.store())
        .execute()
        .await;
    let page = render_page(&state.page, &turns, notice.as_deref());
    with_session_cookie(Html(page).into_response(), &session, created)
}

async fn reset(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_cookie(&headers) {
        state.sessions.close(&id).await;
    }

    let mut response = Redirect::to("/").into_response();
    response.headers_mut().insert(
        SET_COOKIE,
        HeaderValue::from_static("gemchat_session=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"),
    );
    response
}

async fn api_transcript(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session, created) = state
        .sessions
        .get_or_open(session_cookie(&headers).as_deref())
        .await;
    let turns = state
        .container
        .transcript_use_case(session.store())
        .execute()
        .await;

    let body = TranscriptResponse {
        session_id: session.id().to_string(),
        created_at: session.created_at(),
        turns,
    };
    with_session_cookie(Json(body).into_response(), &session, created)
}

async fn api_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Response {
    let (session, created) = state
        .sessions
        .get_or_open(session_cookie(&headers).as_deref())
        .await;

    let (status, reply, error) = {
        let _turn = session.begin_turn().await;
        match submit(&state, &session, &request.prompt).await {
            Ok(TurnOutcome::Replied(turn)) => {
                (StatusCode::OK, Some(turn.content().to_string()), None)
            }
            Ok(TurnOutcome::Failed(e)) => (StatusCode::BAD_GATEWAY, None, Some(e.to_string())),
            Err(e) if e.is_invalid_input() => {
                (StatusCode::BAD_REQUEST, None, Some(e.to_string()))
            }
            Err(e) => {
                error!("API chat turn failed in session {}: {}", session.id(), e);
                (StatusCode::INTERNAL_SERVER_ERROR, None, Some(e.to_string()))
            }
        }
    };

    let turns = state
        .container
        .transcript_use_case(session.store())
        .execute()
        .await;
    let body = ChatResponse {
        reply,
        error,
        turns,
    };
    with_session_cookie((status, Json(body)).into_response(), &session, created)
}

async fn submit(
    state: &AppState,
    session: &WebSession,
    prompt: &str,
) -> Result<TurnOutcome, DomainError> {
    state
        .container
        .submit_use_case(session.store())
        .execute(prompt)
        .await
}

/// Session id from the request's `Cookie` header, if it carries a valid one.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .find(|id| ChatSession::is_valid_id(id))
        .map(str::to_string)
}

fn with_session_cookie(mut response: Response, session: &WebSession, created: bool) -> Response {
    if created {
        let cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            session.id()
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_is_found_among_others() {
        let id = ChatSession::new().id().to_string();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; lang=es")).unwrap(),
        );

        assert_eq!(session_cookie(&headers), Some(id));
    }

    #[test]
    fn test_malformed_session_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("gemchat_session=../../etc; gemchat_sessionx=1"),
        );

        assert_eq!(session_cookie(&headers), None);
    }
}
