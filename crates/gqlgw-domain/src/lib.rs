//! gqlgw-domain: Core data model and engine-facing traits
//!
//! This crate contains the request-scoped data model shared by the pipeline
//! and the HTTP layer:
//! - Operations, batches, and per-operation results
//! - The lightweight operation-document classifier
//! - Collaborator traits for the external query engine
//! - In-memory reference implementations for tests and the demo binary
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                gqlgw-domain                  │
//! ├─────────────────────────────────────────────┤
//! │  operation.rs - Operation, results, errors  │
//! │  document.rs  - Operation classification    │
//! │  engine.rs    - Collaborator traits         │
//! │  memory.rs    - Fixture-backed engine       │
//! │  error.rs     - EngineError                 │
//! └─────────────────────────────────────────────┘
//! ```

pub mod document;
pub mod engine;
pub mod error;
pub mod memory;
pub mod operation;

// Re-exports for convenience
pub use document::{parse_document, OperationKind, ParsedDocument};
pub use engine::{
    EventKind, ExecutionContext, GatewayEvent, NotificationBus, PersistedQueryResolver,
    QueryHandler, SchemaHandle, SchemaProvider,
};
pub use error::{EngineError, EngineErrorKind, EngineResult};
pub use memory::{BroadcastBus, MemoryEngine, MemoryPersistedQueries};
pub use operation::{
    BatchResponse, GraphQlError, Operation, OperationBatch, OperationResult, Variables,
};
