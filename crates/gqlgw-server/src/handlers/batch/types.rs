//! Data types for the batch pipeline.

/// Default maximum number of operations per request.
pub const DEFAULT_BATCH_LIMIT: usize = 10;

/// Raw HTTP request material the pipeline consumes.
#[derive(Debug, Clone, Copy)]
pub struct RawRequest<'a> {
    /// Declared `Content-Type`, if any.
    pub content_type: Option<&'a str>,
    /// Unparsed request body.
    pub body: &'a [u8],
}

/// Request-level errors: fatal to the whole request, raised before any
/// operation executes. Per-operation failures never take this form; they
/// are reported in-band inside an otherwise successful response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// No operation could be extracted from the request.
    #[error("missing query parameter")]
    MissingQuery,

    /// The batch exceeds the configured operation ceiling.
    #[error("batch size {size} exceeds maximum allowed {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// The schema is not available and autobuild is disabled.
    #[error("schema '{schema}' not found")]
    SchemaNotFound { schema: String },

    /// Autobuild was attempted and failed.
    #[error("failed to build schema '{schema}': {message}")]
    SchemaBuildFailed { schema: String, message: String },
}

/// Result type for the batch pipeline.
pub type BatchResult<T> = Result<T, BatchError>;
