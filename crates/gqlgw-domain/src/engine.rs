//! Collaborator traits for the external query engine.
//!
//! The gateway core does not implement query execution; it dispatches to
//! an engine behind these narrow interfaces. Backends implement
//! [`SchemaProvider`] and [`QueryHandler`]; the non-JSON request path is
//! served by a [`PersistedQueryResolver`]; observable side effects go
//! through a [`NotificationBus`].

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::EngineResult;
use crate::operation::Variables;

/// Handle to a resolved engine schema.
///
/// Opaque to the pipeline; only the key participates in gateway logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaHandle {
    pub key: String,
}

impl SchemaHandle {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Request-scoped execution context applied to the handler per operation.
///
/// The handler may be shared across a batch, so the coordinator re-reads
/// and re-applies this for every operation instead of relying on state
/// left behind by the previous iteration.
pub type ExecutionContext = Map<String, Value>;

/// Resolves schema handles by key, once per incoming HTTP request.
#[async_trait]
pub trait SchemaProvider: Send + Sync + 'static {
    /// Returns the schema for `key`, or `None` if it has not been built.
    async fn get_schema(&self, key: &str) -> Option<SchemaHandle>;

    /// Builds (or rebuilds, when `force` is set) the schema for `key`.
    async fn build_schema(&self, key: &str, force: bool) -> EngineResult<SchemaHandle>;
}

/// Executes one operation against a resolved schema.
#[async_trait]
pub trait QueryHandler: Send + Sync + 'static {
    /// Runs `query` with `variables` under `context` and returns the
    /// engine-defined result envelope.
    async fn query(
        &self,
        schema: &SchemaHandle,
        query: &str,
        variables: &Variables,
        context: &ExecutionContext,
    ) -> EngineResult<Value>;

    /// Current request-scoped context for this handler.
    fn context(&self) -> ExecutionContext;
}

/// Resolves operation text for non-JSON request bodies, e.g. from a
/// registered query-ID mapping.
#[async_trait]
pub trait PersistedQueryResolver: Send + Sync + 'static {
    /// Returns the resolved operation text (or `None`) and its variables.
    async fn resolve(&self, content_type: Option<&str>, body: &[u8]) -> (Option<String>, Variables);
}

/// Classification of a published gateway event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Query,
    Mutation,
}

/// Notification published after each successfully executed operation.
///
/// Fired exactly once per success, never for failures. Consumers include
/// audit logging and cache invalidation.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayEvent {
    pub kind: EventKind,
    /// Declared operation name, absent for anonymous operations.
    pub operation_name: Option<String>,
    /// Key of the schema the operation executed against.
    pub schema: String,
    /// Raw operation text.
    pub query: String,
    /// Context the operation executed under.
    pub context: ExecutionContext,
    /// Operation variables.
    pub variables: Variables,
    /// Engine result envelope.
    pub result: Value,
}

impl GatewayEvent {
    /// Event name consumers subscribe on.
    pub fn name(&self) -> &'static str {
        match self.kind {
            EventKind::Query => "gateway.query.executed",
            EventKind::Mutation => "gateway.mutation.executed",
        }
    }
}

/// Fire-and-forget event publication. Publication failures (e.g. no
/// subscribers) are not surfaced to the pipeline.
pub trait NotificationBus: Send + Sync + 'static {
    fn publish(&self, event: GatewayEvent);
}
