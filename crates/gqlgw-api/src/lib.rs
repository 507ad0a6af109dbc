//! gqlgw-api: HTTP API layer
//!
//! This crate provides the HTTP-facing surface of the gateway:
//! - The `/graphql/:schema_key` endpoint via Axum
//! - Request-level error mapping to status codes
//! - CORS preflight handling and body-size limits
//! - Logging initialization for the server binary
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 gqlgw-api                    │
//! ├─────────────────────────────────────────────┤
//! │  http/          - Router, handlers, state   │
//! │  observability/ - Logging initialization    │
//! └─────────────────────────────────────────────┘
//! ```

pub mod http;
pub mod observability;
