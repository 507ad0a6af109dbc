//! HTTP endpoint implementation.

pub mod routes;
pub mod state;

pub use routes::{create_router, create_router_with_body_limit, ApiError, DEFAULT_BODY_LIMIT};
pub use state::{AppState, MemoryAppState};
