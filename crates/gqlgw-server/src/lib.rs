//! gqlgw-server: Request pipeline and business logic
//!
//! This crate contains the batch pipeline between the HTTP layer and the
//! query engine:
//! - Request parsing (single object vs array vs persisted query)
//! - Batch-size enforcement
//! - Sequential per-operation execution with error isolation
//! - Result aggregation preserving request order
//! - Configuration management
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                gqlgw-server                  │
//! ├─────────────────────────────────────────────┤
//! │  config.rs   - Configuration management     │
//! │  handlers/   - Request handlers             │
//! │    batch/                                   │
//! │      parser.rs      - Request intake        │
//! │      guard.rs       - Batch-size policy     │
//! │      executor.rs    - Per-operation run     │
//! │      coordinator.rs - Orchestration         │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod handlers;

// Re-exports for convenience
pub use config::{ConfigLoadError, GatewayConfig};
pub use handlers::batch::{BatchCoordinator, GatewayOptions};
