use crate::{
    domain::BookmarkRepository,
    errors::AppError,
    models::partition_by_expiry,
    pagination::{page_from_query, PageSlice, POSTS_PER_PAGE},
    render, AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing;
use uuid::Uuid;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Raw `?page=` value; anything unparseable falls back to page 1.
    pub page: Option<String>,
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Handler for GET /bookmarks.
///
/// The whole page flow lives here: session/premium gate, one unbounded
/// bookmark fetch, expiry partition with fire-and-forget cleanup, in-process
/// pagination, HTML rendering. Fetch failures render as a generic message in
/// the list container rather than an error status; there are no retries.
pub async fn bookmarks_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    // --- Access gate ---
    let Some(token) = session_token(&headers) else {
        return Redirect::to(&state.login_url).into_response();
    };

    let viewer = match state.sessions.resolve(&token).await {
        Ok(Some(viewer)) => viewer,
        Ok(None) => return Redirect::to(&state.login_url).into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "Failed to resolve session");
            return Html(render::page_shell("", &render::fetch_error_fragment(), ""))
                .into_response();
        }
    };

    if !viewer.premium_flag {
        tracing::debug!(user_id = %viewer.user_id, "Non-premium viewer blocked from bookmarks page");
        return (StatusCode::FORBIDDEN, Html(render::access_denied_page())).into_response();
    }

    let current_page = page_from_query(query.page.as_deref());

    // --- Fetch + filter ---
    let items = match state.bookmarks.list_for_user(viewer.user_id).await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!(error = ?e, user_id = %viewer.user_id, "Failed to fetch bookmarks");
            return Html(render::page_shell("", &render::fetch_error_fragment(), ""))
                .into_response();
        }
    };

    if items.is_empty() {
        return Html(render::page_shell("", &render::empty_state(), "")).into_response();
    }

    let now = Utc::now();
    let (valid, expired_ids) = partition_by_expiry(items, now);

    let mut notice = String::new();
    if !expired_ids.is_empty() {
        notice = render::expired_notice();
        spawn_bookmark_cleanup(state.bookmarks.clone(), viewer.user_id, expired_ids);
    }

    if valid.is_empty() {
        return Html(render::page_shell(&notice, &render::empty_state(), "")).into_response();
    }

    // --- Paginate + render ---
    let slice = PageSlice::compute(valid.len(), current_page, POSTS_PER_PAGE);
    let list_html: String = valid[slice.start..slice.end]
        .iter()
        .map(|item| render::render_post(&viewer, item, now))
        .collect();
    let pagination_html = render::render_pagination(&slice);

    tracing::debug!(
        user_id = %viewer.user_id,
        page = slice.page,
        shown = slice.end - slice.start,
        total = valid.len(),
        "Rendering bookmarks page"
    );

    Html(render::page_shell(&notice, &list_html, &pagination_html)).into_response()
}

/// Fire-and-forget removal of expired bookmark rows. The page renders without
/// waiting; a failure here is logged and otherwise dropped, so the rows get
/// another chance on the next load.
fn spawn_bookmark_cleanup(
    repo: Arc<dyn BookmarkRepository>,
    user_id: Uuid,
    post_ids: Vec<Uuid>,
) {
    tokio::spawn(async move {
        tracing::info!(%user_id, count = post_ids.len(), "Removing expired bookmarks");
        if let Err(e) = repo.remove(user_id, &post_ids).await {
            tracing::warn!(%user_id, error = ?e, "Expired bookmark cleanup failed");
        }
    });
}

/// Handler for POST /posts/{id}/delete.
///
/// The confirm dialog already happened client-side; this calls the backend
/// delete procedure and sends the viewer back to the bookmarks page for a
/// full reload. No optimistic update.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(token) = session_token(&headers) else {
        return Ok(Redirect::to(&state.login_url).into_response());
    };
    let viewer = match state.sessions.resolve(&token).await? {
        Some(viewer) => viewer,
        None => return Ok(Redirect::to(&state.login_url).into_response()),
    };

    let post_id = Uuid::parse_str(&id_str)?;
    tracing::debug!(%post_id, user_id = %viewer.user_id, "Deleting post via handler");

    state.forum_rpc.delete_post_with_related(post_id).await?;

    tracing::info!(%post_id, user_id = %viewer.user_id, "Post deleted successfully via handler");
    Ok(Redirect::to("/bookmarks").into_response())
}
