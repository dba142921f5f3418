//! Role gate for mutating routes
//!
//! Session handling lives outside this crate; whatever sits in front of the
//! server resolves the caller and forwards the role in [`ROLE_HEADER`]. A
//! refused request never reaches the repository.

use crate::api::fragments::render_notice;
use crate::api::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

/// Header carrying the caller's role
pub const ROLE_HEADER: &str = "x-deftree-role";

/// Middleware: pass the request on only for an allowed role
pub async fn require_mutation_role(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let role = request
        .headers()
        .get(ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if state.config.allows_role(role) {
        return next.run(request).await;
    }

    tracing::warn!(
        "Refused {} {} for role {:?}",
        request.method(),
        request.uri().path(),
        role
    );
    (
        StatusCode::FORBIDDEN,
        Html(render_notice(
            "You do not have permission to change the definition tree.",
        )),
    )
        .into_response()
}
