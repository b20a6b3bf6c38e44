//! Portfolio content subsystem.
//!
//! # Data Flow
//! ```text
//! PUT body (bytes)
//!     → model.rs (RawContent, untrusted)
//!     → validation.rs (strict: reject the whole write on any error)
//!     → sanitize.rs (lenient: clean strings, drop incomplete entries)
//!     → accessor.rs (stamp updatedAt, strip identifiers)
//!     → store.rs (single upsert into the collection)
//! ```
//!
//! # Design Decisions
//! - Exactly one document exists; writes replace it whole
//! - Only ValidatedContent can be sanitized, only ContentDocument can be stored
//! - Reads fall back to a built-in default document

pub mod accessor;
pub mod defaults;
pub mod model;
pub mod sanitize;
pub mod store;
pub mod validation;

pub use accessor::ContentAccessor;
pub use model::{ContentDocument, Project, RawContent, SocialLink, ValidatedContent, ValidationReport};
pub use sanitize::sanitize;
pub use store::{DocumentCollection, FileCollection, MemoryCollection, StoreError};
pub use validation::validate;
