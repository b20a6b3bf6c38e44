//! Sign-in, session and sign-out handlers.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::oauth::{self, SignInError, STATE_COOKIE, STATE_TTL};
use crate::auth::session::{cookie_value, expire_cookie, set_cookie, SESSION_COOKIE};
use crate::http::error::ApiError;
use crate::http::request::{ClientKey, CurrentSession};
use crate::http::state::AppState;
use crate::observability::metrics;
use crate::security::LimitKind;

const STATE_COOKIE_PATH: &str = "/auth";
const SIGNED_IN_REDIRECT: &str = "/admin";
const DENIED_REDIRECT: &str = "/admin/access-denied";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

pub async fn sign_in(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
) -> Result<Response, ApiError> {
    let config = state.config();
    state.limiters.enforce(LimitKind::Auth, &client, &config.rate_limit)?;

    let csrf = oauth::new_state();
    let redirect_uri = oauth::callback_url(&config.auth.public_url);
    let url = state
        .provider
        .authorize_url(&csrf, &redirect_uri)
        .map_err(|e| {
            tracing::error!(provider = state.provider.name(), error = %e, "Cannot start sign-in");
            ApiError::ServiceUnavailable("Sign-in is not available")
        })?;

    let cookie = set_cookie(
        STATE_COOKIE,
        &csrf,
        STATE_COOKIE_PATH,
        STATE_TTL,
        config.auth.secure_cookies(),
    );
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to(url.as_str()),
    )
        .into_response())
}

/// Finish a sign-in. Not charged to the auth policy: each attempt is counted
/// once at `/auth/signin`, and a callback without that attempt's state cookie
/// is refused.
pub async fn callback(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    let config = state.config();
    let secure = config.auth.secure_cookies();
    let clear_state = expire_cookie(STATE_COOKIE, STATE_COOKIE_PATH, secure);

    if let Err(e) = oauth::verify_state(cookie_value(&headers, STATE_COOKIE), params.state.as_deref()) {
        tracing::warn!(client = %client, error = %e, "Sign-in callback rejected");
        metrics::record_sign_in(e.outcome());
        return Err(ApiError::BadRequest("Invalid sign-in state"));
    }

    let outcome = match (params.code.as_deref(), params.error.as_deref()) {
        (Some(code), None) => {
            let redirect_uri = oauth::callback_url(&config.auth.public_url);
            match state.provider.exchange(code, &redirect_uri).await {
                Ok(profile) => oauth::sign_in(profile, &state.allowlist()),
                Err(e) => Err(SignInError::Provider(e)),
            }
        }
        (_, Some(error)) => Err(SignInError::ProviderDenied(error.to_string())),
        (None, None) => Err(SignInError::MissingCode),
    };

    let identity = match outcome {
        Ok(identity) => identity,
        Err(e) => {
            match &e {
                SignInError::Rejected(email) => {
                    tracing::warn!(email = %email, "Sign-in rejected: email not on allowlist");
                }
                other => {
                    tracing::warn!(provider = state.provider.name(), error = %other, "Sign-in failed");
                }
            }
            metrics::record_sign_in(e.outcome());
            return Ok(denied(clear_state));
        }
    };

    let token = match state.sessions.issue(&identity) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to issue session token");
            metrics::record_sign_in("session_error");
            return Ok(denied(clear_state));
        }
    };

    tracing::info!(email = %identity.email, "Signed in");
    metrics::record_sign_in("allowed");
    let session = set_cookie(SESSION_COOKIE, &token, "/", state.sessions.ttl(), secure);
    Ok((
        AppendHeaders([(header::SET_COOKIE, session), (header::SET_COOKIE, clear_state)]),
        Redirect::to(SIGNED_IN_REDIRECT),
    )
        .into_response())
}

fn denied(clear_state: String) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, clear_state)]),
        Redirect::to(DENIED_REDIRECT),
    )
        .into_response()
}

pub async fn session(CurrentSession(identity): CurrentSession) -> Json<Value> {
    match identity {
        Some(identity) => Json(json!({ "user": identity })),
        None => Json(json!({})),
    }
}

pub async fn sign_out(State(state): State<AppState>) -> Response {
    let secure = state.config().auth.secure_cookies();
    (
        AppendHeaders([(header::SET_COOKIE, expire_cookie(SESSION_COOKIE, "/", secure))]),
        Redirect::to("/"),
    )
        .into_response()
}
