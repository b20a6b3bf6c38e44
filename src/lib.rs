//! Portfolio site server library.

pub mod admin;
pub mod auth;
pub mod config;
pub mod content;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::PortfolioConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
