//! Content served before anything has been saved.

use crate::content::model::{ContentDocument, Project, SocialLink};

pub fn default_document() -> ContentDocument {
    ContentDocument {
        name: "Your Name".to_string(),
        title: "Fullstack Web Developer".to_string(),
        description: "Nothing has been published yet. Sign in to the admin area to replace \
                      this placeholder with your own introduction, skills and projects."
            .to_string(),
        skills: ["Rust", "TypeScript", "SQL", "API Development"]
            .into_iter()
            .map(String::from)
            .collect(),
        social_media: vec![SocialLink {
            platform: "GitHub".to_string(),
            url: "https://github.com".to_string(),
            icon: Some("Github".to_string()),
        }],
        projects: vec![Project {
            name: "Portfolio".to_string(),
            description: "This site: a single-document portfolio with an allowlisted admin editor."
                .to_string(),
            technologies: vec!["Rust".to_string(), "Axum".to_string()],
            link: None,
        }],
        updated_at: None,
    }
}
