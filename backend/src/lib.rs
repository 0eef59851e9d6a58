//! Bookshare Backend service

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Object storage and the resilient upload path
pub mod media_storage;

/// Request middleware
pub mod middleware;

/// HTTP route handlers
pub mod routes;

/// Server setup and lifecycle
pub mod server;

/// Session token verification
pub mod session;

/// Shared types (environment, errors)
pub mod types;
