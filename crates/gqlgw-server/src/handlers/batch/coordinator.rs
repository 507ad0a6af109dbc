//! Pipeline orchestration: parse, guard, resolve, execute, aggregate.

use std::sync::Arc;

use tracing::debug;

use gqlgw_domain::engine::{NotificationBus, PersistedQueryResolver, QueryHandler, SchemaProvider};
use gqlgw_domain::operation::BatchResponse;
use gqlgw_domain::SchemaHandle;

use super::executor::OperationExecutor;
use super::guard::check_batch_size;
use super::parser::RequestParser;
use super::types::{BatchError, BatchResult, RawRequest, DEFAULT_BATCH_LIMIT};

/// Gateway behavior knobs, fixed at construction for the life of the
/// coordinator.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Maximum operations per request.
    pub batch_limit: usize,
    /// Build missing schemas on demand instead of failing the request.
    pub autobuild: bool,
    /// Include code/file/line/trace in operation failure payloads.
    pub debug: bool,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            batch_limit: DEFAULT_BATCH_LIMIT,
            autobuild: false,
            debug: false,
        }
    }
}

/// Orchestrates one request through the batch pipeline.
///
/// Operations execute strictly sequentially in submission order; the
/// response is not produced until every operation has completed. Results
/// keep their request positions even when some of them are failures.
pub struct BatchCoordinator<E, P, B>
where
    E: SchemaProvider + QueryHandler,
    P: PersistedQueryResolver,
    B: NotificationBus,
{
    engine: Arc<E>,
    parser: RequestParser<P>,
    executor: OperationExecutor<E, B>,
    options: GatewayOptions,
}

impl<E, P, B> BatchCoordinator<E, P, B>
where
    E: SchemaProvider + QueryHandler,
    P: PersistedQueryResolver,
    B: NotificationBus,
{
    pub fn new(engine: Arc<E>, persisted: Arc<P>, bus: Arc<B>, options: GatewayOptions) -> Self {
        Self {
            parser: RequestParser::new(persisted),
            executor: OperationExecutor::new(Arc::clone(&engine), bus, options.debug),
            engine,
            options,
        }
    }

    pub fn options(&self) -> &GatewayOptions {
        &self.options
    }

    /// Handles one request end to end.
    ///
    /// Request-level failures (empty batch, over-limit batch, unresolvable
    /// schema) surface as `BatchError` before anything executes.
    /// Per-operation failures are in-band in the returned response.
    pub async fn handle(
        &self,
        schema_key: &str,
        request: RawRequest<'_>,
    ) -> BatchResult<BatchResponse> {
        let batch = self.parser.parse(request.content_type, request.body).await;
        check_batch_size(batch.len(), self.options.batch_limit)?;

        // One schema resolution per request, shared by every operation.
        let schema = self.resolve_schema(schema_key).await?;
        debug!(schema = %schema.key, operations = batch.len(), "executing batch");

        if batch.len() == 1 {
            let result = self.executor.execute(&schema, &batch[0]).await;
            return Ok(BatchResponse::Single(result));
        }

        let mut results = Vec::with_capacity(batch.len());
        for operation in &batch {
            results.push(self.executor.execute(&schema, operation).await);
        }
        Ok(BatchResponse::Batch(results))
    }

    async fn resolve_schema(&self, key: &str) -> BatchResult<SchemaHandle> {
        if let Some(schema) = self.engine.get_schema(key).await {
            return Ok(schema);
        }
        if !self.options.autobuild {
            return Err(BatchError::SchemaNotFound {
                schema: key.to_string(),
            });
        }
        self.engine
            .build_schema(key, false)
            .await
            .map_err(|err| BatchError::SchemaBuildFailed {
                schema: key.to_string(),
                message: err.to_string(),
            })
    }
}
