//! Strict shape validation of submitted content.
//!
//! Every applicable error is accumulated; nothing short-circuits except a
//! body that is not an object at all. Validation is a pure function of the
//! input and never fails for malformed shapes.

use serde_json::{Map, Value};

use crate::content::model::{
    RawContent, ValidationReport, MAX_PROJECTS, MAX_SKILLS, MAX_SKILL_LEN, MAX_SOCIAL_LINKS,
    MAX_TECHNOLOGIES,
};
use crate::content::sanitize::sanitize_url;

/// Validate a raw submission.
pub fn validate(raw: &RawContent) -> ValidationReport {
    let Some(data) = raw.as_value().as_object() else {
        return ValidationReport::invalid_format();
    };

    let mut errors = Vec::new();

    for (field, label) in [("name", "Name"), ("title", "Title"), ("description", "Description")] {
        if non_blank_str(data.get(field)).is_none() {
            errors.push(format!("{label} is required"));
        }
    }

    validate_skills(data, &mut errors);
    validate_social_media(data, &mut errors);
    validate_projects(data, &mut errors);

    ValidationReport { errors }
}

fn validate_skills(data: &Map<String, Value>, errors: &mut Vec<String>) {
    let Some(skills) = data.get("skills").and_then(Value::as_array) else {
        errors.push("Skills must be an array".to_string());
        return;
    };
    if skills.len() > MAX_SKILLS {
        errors.push(format!("Too many skills (maximum {MAX_SKILLS})"));
        return;
    }

    for (index, skill) in skills.iter().enumerate() {
        match non_blank_str(Some(skill)) {
            None => errors.push(format!("Invalid skill at index {index}")),
            Some(s) if s.chars().count() > MAX_SKILL_LEN => {
                errors.push(format!("Skill at index {index} is too long"))
            }
            Some(_) => {}
        }
    }
}

fn validate_social_media(data: &Map<String, Value>, errors: &mut Vec<String>) {
    let Some(links) = data.get("socialMedia").and_then(Value::as_array) else {
        errors.push("Social media must be an array".to_string());
        return;
    };
    if links.len() > MAX_SOCIAL_LINKS {
        errors.push(format!("Too many social media links (maximum {MAX_SOCIAL_LINKS})"));
        return;
    }

    for (index, link) in links.iter().enumerate() {
        if non_empty_str(link.get("platform")).is_none() {
            errors.push(format!("Invalid platform at index {index}"));
        }
        match non_empty_str(link.get("url")) {
            None => errors.push(format!("Invalid URL at index {index}")),
            Some(url) if sanitize_url(url).is_none() => {
                errors.push(format!("Invalid URL format at index {index}"))
            }
            Some(_) => {}
        }
    }
}

fn validate_projects(data: &Map<String, Value>, errors: &mut Vec<String>) {
    let Some(projects) = data.get("projects").and_then(Value::as_array) else {
        errors.push("Projects must be an array".to_string());
        return;
    };
    if projects.len() > MAX_PROJECTS {
        errors.push(format!("Too many projects (maximum {MAX_PROJECTS})"));
        return;
    }

    for (index, project) in projects.iter().enumerate() {
        if non_empty_str(project.get("name")).is_none() {
            errors.push(format!("Invalid project name at index {index}"));
        }
        if non_empty_str(project.get("description")).is_none() {
            errors.push(format!("Invalid project description at index {index}"));
        }
        match project.get("technologies").and_then(Value::as_array) {
            None => errors.push(format!("Invalid technologies at index {index}")),
            Some(techs) if techs.len() > MAX_TECHNOLOGIES => {
                errors.push(format!("Too many technologies at index {index}"))
            }
            Some(_) => {}
        }
        if let Some(link) = project.get("link").filter(|v| is_present(v)) {
            if link.as_str().and_then(sanitize_url).is_none() {
                errors.push(format!("Invalid project link at index {index}"));
            }
        }
    }
}

/// A string value with at least one character.
fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// A string value with at least one non-whitespace character.
fn non_blank_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

/// Whether an optional field counts as supplied. `null`, `false`, `0` and `""`
/// are treated as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
