//! Request intake: raw body to ordered operation batch.

use std::sync::Arc;

use serde_json::Value;

use gqlgw_domain::operation::{Operation, OperationBatch, Variables};
use gqlgw_domain::PersistedQueryResolver;

/// Content-type branch dispatch, resolved once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `application/json` (matched by prefix, case-insensitive), the
    /// normal single-or-batch path.
    Json,
    /// Anything else, served by the persisted-query resolver.
    Other,
}

impl ContentKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(value) => match value.trim_start().get(.."application/json".len()) {
                Some(scheme) if scheme.eq_ignore_ascii_case("application/json") => {
                    ContentKind::Json
                }
                _ => ContentKind::Other,
            },
            None => ContentKind::Other,
        }
    }
}

/// Extracts an ordered list of operations from a raw request body.
///
/// This layer is deliberately lenient: malformed bodies yield an empty
/// batch (which the guard reports as a missing query), and array elements
/// without a `query` key are kept at their position with a `None` text so
/// they fail individually downstream instead of rejecting their siblings.
pub struct RequestParser<P> {
    persisted: Arc<P>,
}

impl<P> RequestParser<P>
where
    P: PersistedQueryResolver,
{
    pub fn new(persisted: Arc<P>) -> Self {
        Self { persisted }
    }

    /// Produces an operation batch, possibly empty, never an error.
    pub async fn parse(&self, content_type: Option<&str>, body: &[u8]) -> OperationBatch {
        match ContentKind::from_content_type(content_type) {
            ContentKind::Json => parse_json_body(body),
            ContentKind::Other => {
                let (text, variables) = self.persisted.resolve(content_type, body).await;
                match text {
                    Some(text) => vec![Operation {
                        text: Some(text),
                        variables,
                    }],
                    None => Vec::new(),
                }
            }
        }
    }
}

fn parse_json_body(body: &[u8]) -> OperationBatch {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => return Vec::new(),
    };
    match &value {
        Value::Array(items) => items.iter().map(operation_from_value).collect(),
        Value::Object(_) => vec![operation_from_value(&value)],
        _ => Vec::new(),
    }
}

/// Extracts `query`/`variables` from one request element. A missing or
/// non-string `query` becomes the `None` sentinel; missing or wrong-typed
/// `variables` become an empty map.
fn operation_from_value(value: &Value) -> Operation {
    let text = value
        .get("query")
        .and_then(Value::as_str)
        .map(str::to_string);
    let variables = value
        .get("variables")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Variables::new);
    Operation { text, variables }
}
