//! Integration tests for sign-in, sessions and the admin gate.

use reqwest::header::{COOKIE, LOCATION};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

mod common;

use common::{
    client, set_cookie_value, spawn_server, spawn_server_with, test_config, ScriptedProvider, EDITOR,
};
use portfolio_server::content::MemoryCollection;

const STATE_COOKIE: &str = "portfolio_oauth_state";
const SESSION_COOKIE: &str = "portfolio_session";

#[tokio::test]
async fn test_sign_in_redirects_to_provider_with_state() {
    let server = spawn_server(test_config()).await;

    let res = client().get(server.url("/auth/signin")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let state = set_cookie_value(&res, STATE_COOKIE).unwrap();
    let location = Url::parse(res.headers()[LOCATION].to_str().unwrap()).unwrap();
    let params: std::collections::HashMap<_, _> = location.query_pairs().into_owned().collect();
    assert_eq!(location.host_str(), Some("provider.test"));
    assert_eq!(params["state"], state);
    assert_eq!(params["redirect_uri"], "http://127.0.0.1/auth/callback");
}

#[tokio::test]
async fn test_allowlisted_callback_issues_session() {
    let server = spawn_server(test_config()).await;

    let res = client()
        .get(server.url("/auth/callback?code=c0de&state=s1"))
        .header(COOKIE, format!("{STATE_COOKIE}=s1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], "/admin");
    let token = set_cookie_value(&res, SESSION_COOKIE).unwrap();
    assert!(!token.is_empty());

    let session: Value = client()
        .get(server.url("/auth/session"))
        .header(COOKIE, format!("{SESSION_COOKIE}={token}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["user"]["email"], EDITOR);
    assert_eq!(session["user"]["isAllowed"], true);

    let admin = client()
        .get(server.url("/admin"))
        .header(COOKIE, format!("{SESSION_COOKIE}={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(admin.status(), StatusCode::OK);
    let body: Value = admin.json().await.unwrap();
    assert_eq!(body["user"]["email"], EDITOR);
}

#[tokio::test]
async fn test_unlisted_callback_never_issues_session() {
    let server = spawn_server_with(
        test_config(),
        Arc::new(MemoryCollection::new()),
        Arc::new(ScriptedProvider::with_email("intruder@x.com")),
    )
    .await;

    let res = client()
        .get(server.url("/auth/callback?code=c0de&state=s1"))
        .header(COOKIE, format!("{STATE_COOKIE}=s1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], "/admin/access-denied");
    assert!(set_cookie_value(&res, SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn test_provider_failure_redirects_to_access_denied() {
    let server = spawn_server_with(
        test_config(),
        Arc::new(MemoryCollection::new()),
        Arc::new(ScriptedProvider::failing()),
    )
    .await;

    let res = client()
        .get(server.url("/auth/callback?code=bad&state=s1"))
        .header(COOKIE, format!("{STATE_COOKIE}=s1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()[LOCATION], "/admin/access-denied");
    assert!(set_cookie_value(&res, SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn test_callback_with_mismatched_state_is_rejected() {
    let server = spawn_server(test_config()).await;

    let res = client()
        .get(server.url("/auth/callback?code=c0de&state=forged"))
        .header(COOKIE, format!("{STATE_COOKIE}=s1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client()
        .get(server.url("/auth/callback?code=c0de&state=s1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_in_attempts_are_rate_limited() {
    let server = spawn_server(test_config()).await;

    for _ in 0..5 {
        let res = client().get(server.url("/auth/signin")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }
    let res = client().get(server.url("/auth/signin")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(res.headers().contains_key("retry-after"));
}

#[tokio::test]
async fn test_callback_completes_after_full_sign_in_budget() {
    let server = spawn_server(test_config()).await;

    let mut state = String::new();
    for _ in 0..5 {
        let res = client().get(server.url("/auth/signin")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        state = set_cookie_value(&res, STATE_COOKIE).unwrap();
    }

    let res = client()
        .get(server.url(&format!("/auth/callback?code=c0de&state={state}")))
        .header(COOKIE, format!("{STATE_COOKIE}={state}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], "/admin");
    assert!(set_cookie_value(&res, SESSION_COOKIE).is_some());
}

#[tokio::test]
async fn test_callback_without_code_is_denied() {
    let server = spawn_server(test_config()).await;

    for query in ["error=access_denied&state=s1", "state=s1"] {
        let res = client()
            .get(server.url(&format!("/auth/callback?{query}")))
            .header(COOKIE, format!("{STATE_COOKIE}=s1"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[LOCATION], "/admin/access-denied");
        assert!(set_cookie_value(&res, SESSION_COOKIE).is_none());
    }
}

#[tokio::test]
async fn test_admin_gate_redirects() {
    let server = spawn_server(test_config()).await;

    let res = client().get(server.url("/admin/debug")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], "/admin/login");

    let denied = server.token_for("b@x.com");
    let res = client()
        .get(server.url("/admin"))
        .bearer_auth(&denied)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], "/admin/access-denied");

    let res = client().get(server.url("/admin/access-denied")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_debug_reports_secrets_as_presence_only() {
    let server = spawn_server(test_config()).await;

    let res = client()
        .get(server.url("/admin/debug"))
        .bearer_auth(server.token_for(EDITOR))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "allowed");
    assert_eq!(body["environment"]["SESSION_SECRET"], "Set");
    assert_eq!(body["environment"]["GOOGLE_CLIENT_ID"], "Not Set");
    assert_eq!(body["environment"]["ALLOWED_EMAILS"], EDITOR);
    assert!(!body.to_string().contains(common::SECRET));
}

#[tokio::test]
async fn test_sign_out_clears_session_cookie() {
    let server = spawn_server(test_config()).await;

    let res = client().post(server.url("/auth/signout")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], "/");
    assert_eq!(set_cookie_value(&res, SESSION_COOKIE).as_deref(), Some(""));

    let session: Value = client()
        .get(server.url("/auth/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session, json!({}));
}

#[tokio::test]
async fn test_sitemap_lists_public_url() {
    let server = spawn_server(test_config()).await;

    let res = client().get(server.url("/sitemap.xml")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/xml");
    let body = res.text().await.unwrap();
    assert!(body.contains("<loc>http://127.0.0.1</loc>"));
}
