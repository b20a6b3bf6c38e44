use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::SessionState;
use crate::http::state::AppState;

/// Admin paths reachable without a session.
pub const PUBLIC_ADMIN_PATHS: [&str; 2] = ["/admin/login", "/admin/access-denied"];

/// Guard for the admin namespace.
///
/// No session redirects to the login page and a session issued to an email
/// off the allowlist redirects to the access-denied page. Allowed requests
/// carry their [`Identity`](crate::auth::Identity) as a request extension.
pub async fn admin_gate(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if PUBLIC_ADMIN_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let identity = state.sessions.identity_from_headers(request.headers());
    match SessionState::from_identity(identity) {
        SessionState::Allowed(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        SessionState::Denied(identity) => {
            tracing::warn!(email = %identity.email, path = %request.uri().path(), "Admin access denied");
            Redirect::to("/admin/access-denied").into_response()
        }
        SessionState::Unauthenticated => Redirect::to("/admin/login").into_response(),
    }
}
