//! Lenient normalization of validated content.
//!
//! Runs after validation. Fields are trimmed, stripped of angle brackets and
//! capped in length; collection entries that end up without a required field
//! are dropped instead of failing the write.

use serde_json::Value;
use url::Url;

use crate::content::model::{
    ContentDocument, Project, SocialLink, ValidatedContent, MAX_STRING_LEN,
};

/// Trim, strip `<` and `>`, and cap at [`MAX_STRING_LEN`] characters.
pub fn sanitize_str(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .take(MAX_STRING_LEN)
        .collect()
}

/// Accept an absolute http(s) URL, returned trimmed but otherwise as written.
///
/// URLs containing angle brackets or longer than [`MAX_STRING_LEN`] are
/// refused so that stored links obey the same rules as every other string.
pub fn sanitize_url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.contains(['<', '>']) || trimmed.chars().count() > MAX_STRING_LEN {
        return None;
    }
    let parsed = Url::parse(trimmed).ok()?;
    matches!(parsed.scheme(), "http" | "https").then(|| trimmed.to_string())
}

/// Turn validated input into a document fit for storage.
pub fn sanitize(content: ValidatedContent) -> ContentDocument {
    let data = content.into_value();

    ContentDocument {
        name: string_field(&data, "name"),
        title: string_field(&data, "title"),
        description: string_field(&data, "description"),
        skills: string_list(data.get("skills")),
        social_media: entries(data.get("socialMedia"))
            .filter_map(sanitize_social_link)
            .collect(),
        projects: entries(data.get("projects"))
            .filter_map(sanitize_project)
            .collect(),
        updated_at: None,
    }
}

fn sanitize_social_link(entry: &Value) -> Option<SocialLink> {
    let platform = string_field(entry, "platform");
    let url = entry.get("url").and_then(Value::as_str).and_then(sanitize_url)?;
    if platform.is_empty() {
        return None;
    }
    let icon = Some(string_field(entry, "icon")).filter(|icon| !icon.is_empty());
    Some(SocialLink { platform, url, icon })
}

fn sanitize_project(entry: &Value) -> Option<Project> {
    let name = string_field(entry, "name");
    let description = string_field(entry, "description");
    if name.is_empty() || description.is_empty() {
        return None;
    }
    Some(Project {
        name,
        description,
        technologies: string_list(entry.get("technologies")),
        link: entry.get("link").and_then(Value::as_str).and_then(sanitize_url),
    })
}

/// Sanitized string at `key`; non-strings become empty.
fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(sanitize_str)
        .unwrap_or_default()
}

/// Sanitized non-empty strings of an array; anything else yields nothing.
fn string_list(value: Option<&Value>) -> Vec<String> {
    entries(value)
        .filter_map(Value::as_str)
        .map(sanitize_str)
        .filter(|s| !s.is_empty())
        .collect()
}

fn entries(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value.and_then(Value::as_array).into_iter().flatten()
}
