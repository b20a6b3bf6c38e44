//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware layers)
//!     → request.rs (client key, session identity)
//!     → content.rs / session.rs / site.rs / admin (handlers)
//!     → error.rs (ApiError → JSON response)
//!     → Send to client
//! ```

pub mod content;
pub mod error;
pub mod request;
pub mod server;
pub mod session;
pub mod site;
pub mod state;

pub use error::ApiError;
pub use request::{ClientKey, CurrentSession, X_REQUEST_ID};
pub use server::HttpServer;
pub use state::AppState;
