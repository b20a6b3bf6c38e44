//! Content document types.
//!
//! Untrusted input enters as [`RawContent`] and only becomes a
//! [`ContentDocument`] by going through validation and sanitization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum number of skills.
pub const MAX_SKILLS: usize = 50;
/// Maximum length of a single skill, in characters.
pub const MAX_SKILL_LEN: usize = 50;
/// Maximum number of social media links.
pub const MAX_SOCIAL_LINKS: usize = 20;
/// Maximum number of projects.
pub const MAX_PROJECTS: usize = 20;
/// Maximum number of technologies per project.
pub const MAX_TECHNOLOGIES: usize = 20;
/// Every persisted string is capped at this many characters.
pub const MAX_STRING_LEN: usize = 1000;

/// The singleton portfolio document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub social_media: Vec<SocialLink>,
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Set by the store accessor on every successful write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A request body exactly as the client sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawContent(Value);

impl RawContent {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a request body. A body that is not JSON at all is reported the
    /// same way as a JSON value of the wrong shape.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationReport> {
        serde_json::from_slice(bytes)
            .map(Self)
            .map_err(|_| ValidationReport::invalid_format())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Run the validator; on success the content may be sanitized.
    pub fn validate(self) -> Result<ValidatedContent, ValidationReport> {
        let report = crate::content::validation::validate(&self);
        if report.is_valid() {
            Ok(ValidatedContent(self.0))
        } else {
            Err(report)
        }
    }
}

/// Content that passed validation. Only obtainable through [`RawContent::validate`].
#[derive(Debug, Clone)]
pub struct ValidatedContent(Value);

impl ValidatedContent {
    pub(crate) fn into_value(self) -> Value {
        self.0
    }
}

/// Outcome of validating a [`RawContent`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn invalid_format() -> Self {
        Self {
            errors: vec!["Invalid data format".to_string()],
        }
    }
}
