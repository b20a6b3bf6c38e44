//! Content API handlers.
//!
//! Reads: rate limit → store. Writes: rate limit → session → live allowlist
//! → validation → sanitization → store.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::{Allowlist, Identity};
use crate::content::{sanitize, ContentDocument, RawContent};
use crate::http::error::ApiError;
use crate::http::request::{ClientKey, CurrentSession};
use crate::http::state::AppState;
use crate::observability::metrics;
use crate::security::LimitKind;

/// The signed-in identity, if it is on the live allowlist.
pub fn require_editor(identity: Option<Identity>, allowlist: &Allowlist) -> Result<Identity, ApiError> {
    let identity = identity.ok_or(ApiError::Unauthenticated)?;
    if !allowlist.is_authorized(&identity) {
        tracing::warn!(email = %identity.email, "Content change refused: email not on allowlist");
        return Err(ApiError::Forbidden);
    }
    Ok(identity)
}

pub async fn get_content(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
) -> Result<Json<ContentDocument>, ApiError> {
    let config = state.config();
    state.limiters.enforce(LimitKind::Api, &client, &config.rate_limit)?;

    let doc = state
        .content
        .read()
        .await
        .map_err(|e| ApiError::storage("fetch", e))?;
    metrics::record_content_operation("fetch", true);
    Ok(Json(doc))
}

pub async fn put_content(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    CurrentSession(identity): CurrentSession,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let config = state.config();
    state.limiters.enforce(LimitKind::Write, &client, &config.rate_limit)?;
    let editor = require_editor(identity, &state.allowlist())?;

    let validated = RawContent::from_slice(&body)
        .and_then(RawContent::validate)
        .map_err(|report| {
            tracing::info!(email = %editor.email, errors = report.errors.len(), "Rejected invalid content");
            ApiError::ValidationFailed(report.errors)
        })?;

    let doc = state
        .content
        .replace(sanitize(validated))
        .await
        .map_err(|e| ApiError::storage("update", e))?;
    metrics::record_content_operation("update", true);

    tracing::info!(
        email = %editor.email,
        skills = doc.skills.len(),
        projects = doc.projects.len(),
        "Portfolio content updated"
    );
    Ok(Json(json!({ "message": "Portfolio data updated successfully" })))
}

pub async fn delete_content(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    CurrentSession(identity): CurrentSession,
) -> Result<Json<Value>, ApiError> {
    let config = state.config();
    state.limiters.enforce(LimitKind::Write, &client, &config.rate_limit)?;
    let editor = require_editor(identity, &state.allowlist())?;

    let removed = state
        .content
        .clear()
        .await
        .map_err(|e| ApiError::storage("clear", e))?;
    metrics::record_content_operation("clear", true);

    tracing::info!(email = %editor.email, removed, "Portfolio content cleared");
    Ok(Json(json!({ "message": "Portfolio data cleared successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(email: &str) -> Identity {
        Identity {
            id: "sub".into(),
            email: email.into(),
            allowed_at_issue_time: true,
        }
    }

    #[test]
    fn test_require_editor() {
        let allowlist = Allowlist::parse("a@x.com");
        assert!(matches!(require_editor(None, &allowlist), Err(ApiError::Unauthenticated)));
        assert!(matches!(
            require_editor(Some(identity("b@x.com")), &allowlist),
            Err(ApiError::Forbidden)
        ));
        assert_eq!(
            require_editor(Some(identity("a@x.com")), &allowlist).unwrap().email,
            "a@x.com"
        );
    }
}
