//! Structured errors for operation execution.
//!
//! `EngineError` is the only error type the executor ever has to convert
//! into a client-facing payload. It records its construction site via
//! `#[track_caller]` and captures a backtrace eagerly, so debug-mode
//! responses can report `code`, `file`, `line`, and `trace` without the
//! error having to travel as `anyhow` context.

use std::backtrace::Backtrace;
use std::panic::Location;

/// Classification of an execution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// The operation text could not be parsed.
    Parse,
    /// The requested schema does not exist or could not be built.
    Schema,
    /// The engine rejected or failed the operation during execution.
    Execution,
}

impl EngineErrorKind {
    /// Stable error code reported to clients in debug mode.
    pub fn code(self) -> &'static str {
        match self {
            EngineErrorKind::Parse => "graphql_parse_error",
            EngineErrorKind::Schema => "schema_error",
            EngineErrorKind::Execution => "execution_error",
        }
    }
}

/// An execution failure with its origin attached.
///
/// The backtrace is captured at construction and respects
/// `RUST_BACKTRACE`; when backtraces are disabled the trace field of a
/// debug payload degrades to the capture status message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    kind: EngineErrorKind,
    message: String,
    location: &'static Location<'static>,
    trace: String,
}

impl EngineError {
    #[track_caller]
    fn with_kind(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: Location::caller(),
            trace: Backtrace::capture().to_string(),
        }
    }

    /// A syntax-level failure in the operation text.
    #[track_caller]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::with_kind(EngineErrorKind::Parse, message)
    }

    /// A schema-resolution or schema-build failure.
    #[track_caller]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::with_kind(EngineErrorKind::Schema, message)
    }

    /// A failure raised by the engine while executing an operation.
    #[track_caller]
    pub fn execution(message: impl Into<String>) -> Self {
        Self::with_kind(EngineErrorKind::Execution, message)
    }

    pub fn kind(&self) -> EngineErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source location where the error was constructed.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Backtrace captured at construction time.
    pub fn trace(&self) -> &str {
        &self.trace
    }
}

/// Result type for engine-facing operations.
pub type EngineResult<T> = Result<T, EngineError>;
