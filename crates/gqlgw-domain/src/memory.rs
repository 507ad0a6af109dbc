//! In-memory reference implementations of the collaborator traits.
//!
//! `MemoryEngine` is a fixture-backed engine: results and failures are
//! registered per (schema, operation text) pair. It backs the demo binary
//! and the pipeline tests the same way an in-memory storage backend backs
//! a database-oriented service.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::engine::{
    ExecutionContext, GatewayEvent, NotificationBus, PersistedQueryResolver, QueryHandler,
    SchemaHandle, SchemaProvider,
};
use crate::error::{EngineError, EngineResult};
use crate::operation::Variables;

/// Fixture-backed schema provider and query handler.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    schemas: DashMap<String, SchemaHandle>,
    results: DashMap<(String, String), Value>,
    failures: DashMap<(String, String), String>,
    context: DashMap<String, Value>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under `key` and returns its handle.
    pub fn add_schema(&self, key: &str) -> SchemaHandle {
        let handle = SchemaHandle::new(key);
        self.schemas.insert(key.to_string(), handle.clone());
        handle
    }

    /// Registers the envelope returned for `query` against `schema`.
    pub fn register_result(&self, schema: &str, query: &str, envelope: Value) {
        self.results
            .insert((schema.to_string(), query.to_string()), envelope);
    }

    /// Forces `query` against `schema` to fail with `message`.
    pub fn register_failure(&self, schema: &str, query: &str, message: &str) {
        self.failures
            .insert((schema.to_string(), query.to_string()), message.to_string());
    }

    /// Sets one entry of the request-scoped execution context.
    pub fn set_context_value(&self, key: &str, value: Value) {
        self.context.insert(key.to_string(), value);
    }
}

#[async_trait]
impl SchemaProvider for MemoryEngine {
    async fn get_schema(&self, key: &str) -> Option<SchemaHandle> {
        self.schemas.get(key).map(|entry| entry.value().clone())
    }

    async fn build_schema(&self, key: &str, force: bool) -> EngineResult<SchemaHandle> {
        if !force {
            if let Some(existing) = self.schemas.get(key) {
                return Ok(existing.value().clone());
            }
        }
        Ok(self.add_schema(key))
    }
}

#[async_trait]
impl QueryHandler for MemoryEngine {
    async fn query(
        &self,
        schema: &SchemaHandle,
        query: &str,
        _variables: &Variables,
        _context: &ExecutionContext,
    ) -> EngineResult<Value> {
        let key = (schema.key.clone(), query.to_string());
        if let Some(message) = self.failures.get(&key) {
            return Err(EngineError::execution(message.value().clone()));
        }
        match self.results.get(&key) {
            Some(envelope) => Ok(envelope.value().clone()),
            None => Err(EngineError::execution(format!(
                "no resolver registered for operation against schema '{}'",
                schema.key
            ))),
        }
    }

    fn context(&self) -> ExecutionContext {
        self.context
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

/// Query-ID registry for the non-JSON request path.
///
/// The raw body is interpreted as a persisted-query identifier and looked
/// up in the registry; unknown identifiers resolve to nothing, which the
/// pipeline reports as a missing query.
#[derive(Debug, Default)]
pub struct MemoryPersistedQueries {
    queries: DashMap<String, String>,
}

impl MemoryPersistedQueries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: &str, query: &str) {
        self.queries.insert(id.to_string(), query.to_string());
    }
}

#[async_trait]
impl PersistedQueryResolver for MemoryPersistedQueries {
    async fn resolve(
        &self,
        _content_type: Option<&str>,
        body: &[u8],
    ) -> (Option<String>, Variables) {
        let id = String::from_utf8_lossy(body);
        let id = id.trim();
        if id.is_empty() {
            return (None, Variables::new());
        }
        let text = self.queries.get(id).map(|entry| entry.value().clone());
        (text, Variables::new())
    }
}

/// Broadcast-channel notification bus.
///
/// Events are delivered to every current subscriber; publishing with no
/// subscribers is a no-op.
#[derive(Debug)]
pub struct BroadcastBus {
    tx: broadcast::Sender<GatewayEvent>,
}

impl BroadcastBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl NotificationBus for BroadcastBus {
    fn publish(&self, event: GatewayEvent) {
        tracing::debug!(event = event.name(), schema = %event.schema, "publishing gateway event");
        let _ = self.tx.send(event);
    }
}
