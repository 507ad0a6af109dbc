//! Per-operation execution with error isolation.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use gqlgw_domain::document::parse_document;
use gqlgw_domain::engine::{EventKind, GatewayEvent, NotificationBus, QueryHandler, SchemaHandle};
use gqlgw_domain::error::{EngineError, EngineResult};
use gqlgw_domain::operation::{GraphQlError, Operation, OperationResult};

/// Runs one operation against the engine.
///
/// `execute` never returns an error: every failure during classification
/// or execution is converted into a `Failure` result, so the coordinator
/// can iterate a batch without its own catch layer and one bad operation
/// cannot abort the rest.
pub struct OperationExecutor<H, B>
where
    H: QueryHandler,
    B: NotificationBus,
{
    handler: Arc<H>,
    bus: Arc<B>,
    /// Gates code/file/line/trace fields in failure payloads. Injected at
    /// construction so tests can vary it per case.
    debug: bool,
}

impl<H, B> OperationExecutor<H, B>
where
    H: QueryHandler,
    B: NotificationBus,
{
    pub fn new(handler: Arc<H>, bus: Arc<B>, debug: bool) -> Self {
        Self { handler, bus, debug }
    }

    /// Executes `operation` against `schema` and reports the outcome as
    /// data. Exactly one notification fires on success; none on failure.
    pub async fn execute(&self, schema: &SchemaHandle, operation: &Operation) -> OperationResult {
        match self.try_execute(schema, operation).await {
            Ok(envelope) => OperationResult::success(envelope),
            Err(err) => {
                warn!(schema = %schema.key, error = %err, "operation execution failed");
                OperationResult::failure(vec![self.failure_payload(&err)])
            }
        }
    }

    async fn try_execute(
        &self,
        schema: &SchemaHandle,
        operation: &Operation,
    ) -> EngineResult<Value> {
        // The handler may be shared across the batch; its context is
        // re-read for every operation rather than carried over from the
        // previous iteration.
        let context = self.handler.context();

        let text = operation
            .text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| EngineError::parse("Syntax Error: query must not be empty"))?;

        // Classification only; the engine performs its own validation
        // during execution.
        let document = parse_document(text)?;

        let envelope = self
            .handler
            .query(schema, text, &operation.variables, &context)
            .await?;

        let kind = if document.kind.is_mutation() {
            EventKind::Mutation
        } else {
            EventKind::Query
        };
        let event = GatewayEvent {
            kind,
            operation_name: document.name,
            schema: schema.key.clone(),
            query: text.to_string(),
            context,
            variables: operation.variables.clone(),
            result: envelope.clone(),
        };
        debug!(event = event.name(), operation = ?event.operation_name, "operation executed");
        self.bus.publish(event);

        Ok(envelope)
    }

    fn failure_payload(&self, err: &EngineError) -> GraphQlError {
        if self.debug {
            GraphQlError::debug(err)
        } else {
            GraphQlError::new(err.to_string())
        }
    }
}
