use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension,
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::auth::{Identity, SessionState};
use crate::http::state::AppState;

#[derive(Serialize)]
pub struct AdminOverview {
    pub user: Identity,
    pub content_endpoint: &'static str,
    pub sign_out_endpoint: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ConfigDiagnostics {
    pub public_url: String,
    pub allowed_emails: String,
    pub session_secret: &'static str,
    pub google_client_id: &'static str,
    pub google_client_secret: &'static str,
}

#[derive(Serialize)]
pub struct DebugReport {
    pub status: &'static str,
    pub session: Option<Identity>,
    pub environment: ConfigDiagnostics,
}

fn set_or_not(value: &str) -> &'static str {
    if value.is_empty() {
        "Not Set"
    } else {
        "Set"
    }
}

pub async fn get_overview(Extension(user): Extension<Identity>) -> Json<AdminOverview> {
    Json(AdminOverview {
        user,
        content_endpoint: "/api/content",
        sign_out_endpoint: "/auth/signout",
    })
}

pub async fn get_debug(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
) -> Json<DebugReport> {
    let config = state.config();
    let session = SessionState::from_identity(Some(user));
    let status = session.as_str();
    let session = match session {
        SessionState::Allowed(identity) | SessionState::Denied(identity) => Some(identity),
        SessionState::Unauthenticated => None,
    };

    Json(DebugReport {
        status,
        session,
        environment: ConfigDiagnostics {
            public_url: config.auth.public_url.clone(),
            allowed_emails: config.auth.allowed_emails.clone(),
            session_secret: set_or_not(&config.auth.session_secret),
            google_client_id: set_or_not(&config.auth.google.client_id),
            google_client_secret: set_or_not(&config.auth.google.client_secret),
        },
    })
}

pub async fn get_login() -> impl IntoResponse {
    Json(json!({
        "message": "Sign in to manage portfolio content",
        "signInUrl": "/auth/signin"
    }))
}

pub async fn get_access_denied() -> impl IntoResponse {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "Access denied - email not authorized",
            "signOutUrl": "/auth/signout"
        })),
    )
}
