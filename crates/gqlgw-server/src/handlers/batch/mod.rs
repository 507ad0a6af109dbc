//! Batch intake, validation, and sequential-execution pipeline.
//!
//! A client submits either a single `{query, variables?}` object or an
//! array of them in one request. The pipeline:
//!
//! 1. **Parser** normalizes both shapes (and the non-JSON persisted-query
//!    path) into an ordered operation batch.
//! 2. **Guard** fails closed before anything executes: empty batch or
//!    over-limit batch never reaches the engine.
//! 3. **Executor** runs one operation at a time, converting every failure
//!    into an in-band `errors` payload so a bad operation cannot abort
//!    its siblings, and publishes one notification per success.
//! 4. **Coordinator** preserves request order and picks the wire shape:
//!    bare object for one operation, array for many.
//!
//! Execution within a batch is strictly sequential; "batch" means many
//! operations in one response, not parallel execution.

mod coordinator;
mod executor;
mod guard;
mod parser;
mod types;

pub use coordinator::{BatchCoordinator, GatewayOptions};
pub use executor::OperationExecutor;
pub use guard::check_batch_size;
pub use parser::{ContentKind, RequestParser};
pub use types::{BatchError, BatchResult, RawRequest, DEFAULT_BATCH_LIMIT};

#[cfg(test)]
mod tests;
