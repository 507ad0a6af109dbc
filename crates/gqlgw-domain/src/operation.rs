//! Data types for batched operations and their results.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::EngineError;

/// Variables supplied alongside an operation.
///
/// Always a JSON object; the parser coerces `null`, absent, or wrong-typed
/// variables to an empty map.
pub type Variables = Map<String, Value>;

/// A single query or mutation request unit.
///
/// `text` may be `None` when the client omitted the `query` key. Such
/// operations are kept in the batch at their submitted position and fail
/// individually at execution time rather than rejecting the whole batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Raw operation text as submitted by the client.
    pub text: Option<String>,
    /// Operation variables.
    pub variables: Variables,
}

impl Operation {
    /// Creates an operation with the given text and variables.
    pub fn new(text: impl Into<String>, variables: Variables) -> Self {
        Self {
            text: Some(text.into()),
            variables,
        }
    }

    /// Creates an operation with no variables.
    pub fn query(text: impl Into<String>) -> Self {
        Self::new(text, Variables::new())
    }
}

/// Ordered sequence of operations. Client-submission order is the only
/// contract on output ordering: `result[i]` corresponds to `operation[i]`.
pub type OperationBatch = Vec<Operation>;

/// One error entry inside a `Failure` result.
///
/// `message` is always present. The remaining fields are populated only in
/// debug mode; production responses must never leak internal trace data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl GraphQlError {
    /// Creates a production-safe error payload carrying only the message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            file: None,
            line: None,
            trace: None,
        }
    }

    /// Creates a debug-mode payload with code, origin, and backtrace.
    pub fn debug(err: &EngineError) -> Self {
        Self {
            message: err.to_string(),
            code: Some(err.kind().code().to_string()),
            file: Some(err.location().file().to_string()),
            line: Some(err.location().line()),
            trace: Some(err.trace().to_string()),
        }
    }
}

/// Errors wrapper matching the engine's wire envelope for failed operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailurePayload {
    pub errors: Vec<GraphQlError>,
}

/// Result of one operation within a batch.
///
/// `Success` carries the engine-defined envelope verbatim (typically a
/// `data`/`errors` object); `Failure` is produced when classification or
/// execution raised, so one bad operation cannot abort its siblings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    Success(Value),
    Failure(FailurePayload),
}

impl OperationResult {
    pub fn success(envelope: Value) -> Self {
        OperationResult::Success(envelope)
    }

    pub fn failure(errors: Vec<GraphQlError>) -> Self {
        OperationResult::Failure(FailurePayload { errors })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, OperationResult::Failure(_))
    }
}

/// Response body for a whole request.
///
/// Exactly one operation serializes as a bare object; more than one as a
/// JSON array in request order. Batching client libraries distinguish the
/// two shapes, so the difference must be preserved exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchResponse {
    Single(OperationResult),
    Batch(Vec<OperationResult>),
}
