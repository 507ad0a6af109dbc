//! Application state for HTTP handlers.

use std::sync::Arc;

use gqlgw_domain::engine::{NotificationBus, PersistedQueryResolver, QueryHandler, SchemaProvider};
use gqlgw_domain::memory::{BroadcastBus, MemoryEngine, MemoryPersistedQueries};
use gqlgw_server::handlers::batch::{BatchCoordinator, GatewayOptions};

/// Application state shared across all HTTP handlers.
///
/// # Type Parameters
///
/// * `E` - The engine backend (schema provider + query handler)
/// * `P` - The persisted-query resolver for non-JSON requests
/// * `B` - The notification bus
pub struct AppState<E, P, B>
where
    E: SchemaProvider + QueryHandler,
    P: PersistedQueryResolver,
    B: NotificationBus,
{
    /// The batch pipeline coordinator.
    pub coordinator: Arc<BatchCoordinator<E, P, B>>,
    /// The engine backend, kept for wiring and tests.
    pub engine: Arc<E>,
    /// The notification bus, kept for subscriber wiring.
    pub bus: Arc<B>,
}

impl<E, P, B> AppState<E, P, B>
where
    E: SchemaProvider + QueryHandler,
    P: PersistedQueryResolver,
    B: NotificationBus,
{
    /// Creates application state around an engine backend.
    pub fn new(engine: Arc<E>, persisted: Arc<P>, bus: Arc<B>, options: GatewayOptions) -> Self {
        let coordinator = Arc::new(BatchCoordinator::new(
            Arc::clone(&engine),
            persisted,
            Arc::clone(&bus),
            options,
        ));
        Self {
            coordinator,
            engine,
            bus,
        }
    }
}

/// State over the in-memory fixture engine, used by the demo binary and
/// the router tests.
pub type MemoryAppState = AppState<MemoryEngine, MemoryPersistedQueries, BroadcastBus>;

impl MemoryAppState {
    /// Creates state backed by a fresh in-memory engine.
    pub fn memory(options: GatewayOptions) -> Self {
        Self::new(
            Arc::new(MemoryEngine::new()),
            Arc::new(MemoryPersistedQueries::new()),
            Arc::new(BroadcastBus::default()),
            options,
        )
    }
}
