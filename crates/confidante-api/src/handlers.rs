//! Route handler functions for all API endpoints.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use confidante_blog::markdown::render_html;
use confidante_blog::{BlogPost, PostFilterQuery, PostSummary};
use confidante_core::ContactAction;
use confidante_dialogue::{action_effect, Message, ScheduledEffect, SessionEvent};

use crate::contact::{ContactRequest, ContactResponse, FieldError};
use crate::error::ApiError;
use crate::state::AppState;

const MAX_RELATED_LIMIT: usize = 10;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RelatedParams {
    pub limit: Option<usize>,
}

/// Body of the resolve and select endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct OptionRequest {
    pub option: String,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub posts: usize,
    pub dialogue_nodes: usize,
    pub active_sessions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: BlogPost,
    pub content_html: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelatedPostsResponse {
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatOptionsResponse {
    pub greeting: String,
    pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub response: String,
    pub options: Vec<String>,
    pub action: Option<ContactAction>,
    pub effect: ScheduledEffect,
    pub matched: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub closed: bool,
    pub messages: Vec<Message>,
}

// =============================================================================
// Health
// =============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        posts: state.catalog.len(),
        dialogue_nodes: state.graph.len(),
        active_sessions: state.sessions.len(),
    })
}

// =============================================================================
// Contact
// =============================================================================

/// POST /api/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> (StatusCode, Json<ContactResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Unreadable contact submission");
            let errors = vec![FieldError {
                field: "body".to_string(),
                message: rejection.body_text(),
            }];
            return (StatusCode::BAD_REQUEST, Json(ContactResponse::invalid(errors)));
        }
    };

    let submission = match request.validate() {
        Ok(submission) => submission,
        Err(errors) => {
            tracing::info!(invalid_fields = errors.len(), "Contact submission rejected");
            return (StatusCode::BAD_REQUEST, Json(ContactResponse::invalid(errors)));
        }
    };

    match state.contact_sink.deliver(&submission) {
        Ok(()) => (
            StatusCode::OK,
            Json(ContactResponse::accepted(
                state.config.contact.recipient_email.clone(),
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Contact submission delivery failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ContactResponse::failed()),
            )
        }
    }
}

// =============================================================================
// Blog
// =============================================================================

/// GET /api/posts?category=&q=
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PostListParams>,
) -> Json<PostListResponse> {
    let query = PostFilterQuery {
        category: params.category,
        search_text: params.q,
    };
    let posts: Vec<PostSummary> = state
        .catalog
        .filter(&query)
        .into_iter()
        .map(PostSummary::from)
        .collect();

    Json(PostListResponse {
        total: posts.len(),
        posts,
    })
}

/// GET /api/posts/categories
pub async fn list_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.catalog.list_categories(),
    })
}

/// GET /api/posts/{slug}
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let post = state
        .catalog
        .find_by_slug(&slug)
        .ok_or_else(|| ApiError::NotFound(format!("No post with slug '{slug}'")))?;

    Ok(Json(PostDetailResponse {
        content_html: render_html(&post.content),
        post: post.clone(),
    }))
}

/// GET /api/posts/{slug}/related?limit=
pub async fn related_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<RelatedParams>,
) -> Result<Json<RelatedPostsResponse>, ApiError> {
    let reference = state
        .catalog
        .find_by_slug(&slug)
        .ok_or_else(|| ApiError::NotFound(format!("No post with slug '{slug}'")))?;

    let limit = params
        .limit
        .unwrap_or(state.config.blog.related_limit)
        .clamp(1, MAX_RELATED_LIMIT);

    let posts = state
        .catalog
        .related_posts(reference, limit)
        .into_iter()
        .map(PostSummary::from)
        .collect();

    Ok(Json(RelatedPostsResponse { posts }))
}

// =============================================================================
// Chat
// =============================================================================

/// GET /api/chat/options
pub async fn chat_options(State(state): State<AppState>) -> Json<ChatOptionsResponse> {
    Json(ChatOptionsResponse {
        greeting: state.graph.greeting().to_string(),
        options: state.graph.initial_options().to_vec(),
    })
}

/// POST /api/chat/resolve - stateless single-step resolution.
pub async fn resolve_option(
    State(state): State<AppState>,
    Json(body): Json<OptionRequest>,
) -> Json<ResolveResponse> {
    let resolution = state.graph.resolve(&body.option);
    let effect = action_effect(
        resolution.action,
        state.sessions.contact(),
        state.sessions.timings(),
    );

    if !resolution.matched {
        tracing::debug!(option = %body.option, "Option resolved to fallback");
    }

    Json(ResolveResponse {
        response: resolution.response,
        options: resolution.options,
        action: resolution.action,
        effect,
        matched: resolution.matched,
    })
}

/// POST /api/chat/sessions
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), ApiError> {
    let session = state.sessions.create()?;
    Ok((
        StatusCode::CREATED,
        Json(SessionCreatedResponse {
            session_id: session.id(),
            created_at: session.created_at(),
        }),
    ))
}

/// GET /api/chat/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let session = state.sessions.get(id)?;
    Ok(Json(TranscriptResponse {
        session_id: session.id(),
        created_at: session.created_at(),
        closed: session.is_closed(),
        messages: session.transcript(),
    }))
}

/// POST /api/chat/sessions/{id}/select
pub async fn select_option(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<OptionRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let session = state.sessions.get(id)?;
    let message = session.select_option(&body.option)?;
    Ok((StatusCode::ACCEPTED, Json(message)))
}

/// GET /api/chat/sessions/{id}/events - SSE stream of session events.
pub async fn session_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>> + Send>, ApiError> {
    let session = state.sessions.get(id)?;
    let rx = session.subscribe();

    // Lagged receivers skip ahead; the transcript endpoint has the full history.
    // The stream ends after `closed`, so shutdown never waits on an idle client.
    let stream = BroadcastStream::new(rx)
        .filter_map(Result::ok)
        .take_while(|event| !matches!(event, SessionEvent::Closed))
        .chain(tokio_stream::once(SessionEvent::Closed))
        .map(|event| Ok::<_, Infallible>(sse_event(&event)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

fn sse_event(event: &SessionEvent) -> Event {
    let name = match event {
        SessionEvent::MessageAppended { .. } => "message",
        SessionEvent::EffectTriggered { .. } => "effect",
        SessionEvent::Closed => "closed",
    };
    let data = serde_json::to_string(event).unwrap_or_default();
    Event::default().event(name).data(data)
}

/// DELETE /api/chat/sessions/{id}
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.close(id)?;
    Ok(StatusCode::NO_CONTENT)
}
