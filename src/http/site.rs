//! Site-level endpoints.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::http::state::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn sitemap(State(state): State<AppState>) -> impl IntoResponse {
    let body = render_sitemap(&state.config().auth.public_url, Utc::now());
    ([(header::CONTENT_TYPE, "application/xml")], body)
}

/// A one-entry sitemap for the site root.
pub fn render_sitemap(public_url: &str, last_modified: DateTime<Utc>) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            "\n",
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
            "\n  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n",
            "    <changefreq>monthly</changefreq>\n    <priority>1.0</priority>\n",
            "  </url>\n</urlset>\n"
        ),
        xml_escape(public_url),
        last_modified.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    )
}

fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
