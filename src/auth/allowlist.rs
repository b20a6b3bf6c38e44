//! Email allowlist for content editors.

use crate::auth::session::Identity;

/// Exact-match, case-sensitive list of emails allowed to edit content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    emails: Vec<String>,
}

impl Allowlist {
    /// Parse a comma-separated list. Entries are trimmed; empty entries are ignored.
    pub fn parse(csv: &str) -> Self {
        let emails = csv
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(String::from)
            .collect();
        Self { emails }
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.iter().any(|allowed| allowed == email)
    }

    /// Whether `identity` may mutate content according to this list.
    pub fn is_authorized(&self, identity: &Identity) -> bool {
        self.contains(&identity.email)
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}
