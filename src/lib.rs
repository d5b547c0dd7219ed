//! Concurrent single-request HTTP file server.
//!
//! Each accepted connection carries one `GET /<path>` request, answered
//! with the named file relative to the document root. The last completed
//! request is recorded to a stats file.

pub mod logger;
pub mod server;

pub use server::HttpServer;
pub use server::config::ServerConfig;
