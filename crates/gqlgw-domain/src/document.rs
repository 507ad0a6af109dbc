//! Lightweight operation-document classification.
//!
//! The gateway never validates or executes operation text itself; the
//! engine does that during execution. This module only answers the two
//! questions the notification step needs: is the first operation a
//! mutation, and what is its declared name. It therefore reads just far
//! enough into the document to find the first operation definition,
//! skipping ignored tokens, comments, and any leading fragment
//! definitions.

use crate::error::{EngineError, EngineResult};

/// Syntactic kind of the first operation definition in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn is_mutation(self) -> bool {
        self == OperationKind::Mutation
    }
}

/// Classification metadata for an operation document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub kind: OperationKind,
    /// Declared operation name, absent for anonymous operations.
    pub name: Option<String>,
}

/// Classifies the first operation definition in `text`.
///
/// Anonymous shorthand documents (`{ ... }`) classify as queries with no
/// name. Fragment definitions preceding the operation are skipped. An
/// empty or comment-only document is a parse error; so is a document that
/// does not start with an operation definition.
pub fn parse_document(text: &str) -> EngineResult<ParsedDocument> {
    let mut cursor = Cursor::new(text);
    loop {
        cursor.skip_ignored();
        match cursor.peek() {
            None => {
                return Err(EngineError::parse(
                    "Syntax Error: unexpected end of document",
                ))
            }
            Some('{') => {
                return Ok(ParsedDocument {
                    kind: OperationKind::Query,
                    name: None,
                })
            }
            Some(c) if is_name_start(c) => {
                let keyword = cursor.read_name();
                let kind = match keyword {
                    "query" => OperationKind::Query,
                    "mutation" => OperationKind::Mutation,
                    "subscription" => OperationKind::Subscription,
                    "fragment" => {
                        cursor.skip_braced_definition()?;
                        continue;
                    }
                    other => {
                        return Err(EngineError::parse(format!(
                            "Syntax Error: unexpected name '{other}'"
                        )))
                    }
                };
                cursor.skip_ignored();
                let name = match cursor.peek() {
                    Some(c) if is_name_start(c) => Some(cursor.read_name().to_string()),
                    _ => None,
                };
                return Ok(ParsedDocument { kind, name });
            }
            Some(c) => {
                return Err(EngineError::parse(format!(
                    "Syntax Error: unexpected character '{c}'"
                )))
            }
        }
    }
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_name_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Forward-only scanner over document source.
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Skips whitespace, commas, the BOM, and line comments.
    fn skip_ignored(&mut self) {
        loop {
            if let Some(stripped) = self.rest.strip_prefix('\u{feff}') {
                self.rest = stripped;
                continue;
            }
            match self.peek() {
                Some(c) if c.is_whitespace() || c == ',' => {
                    self.rest = &self.rest[c.len_utf8()..];
                }
                Some('#') => match self.rest.find('\n') {
                    Some(end) => self.rest = &self.rest[end + 1..],
                    None => self.rest = "",
                },
                _ => return,
            }
        }
    }

    /// Reads a GraphQL name (`[_A-Za-z][_0-9A-Za-z]*`) at the cursor.
    fn read_name(&mut self) -> &'a str {
        let end = self
            .rest
            .char_indices()
            .find(|&(_, c)| !is_name_continue(c))
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (name, rest) = self.rest.split_at(end);
        self.rest = rest;
        name
    }

    /// Skips past the end of the next balanced `{ ... }` block, accounting
    /// for strings and comments so braces inside them do not count.
    fn skip_braced_definition(&mut self) -> EngineResult<()> {
        let bytes = self.rest.as_bytes();
        let mut depth = 0usize;
        let mut entered = false;
        let mut i = 0usize;
        while i < bytes.len() {
            match bytes[i] {
                b'#' => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                b'"' => {
                    if bytes[i..].starts_with(b"\"\"\"") {
                        i += 3;
                        loop {
                            if i >= bytes.len() {
                                return Err(EngineError::parse(
                                    "Syntax Error: unterminated block string",
                                ));
                            }
                            if bytes[i..].starts_with(b"\"\"\"") {
                                i += 3;
                                break;
                            }
                            i += 1;
                        }
                    } else {
                        i += 1;
                        while i < bytes.len() && bytes[i] != b'"' {
                            if bytes[i] == b'\\' {
                                i += 1;
                            }
                            i += 1;
                        }
                        if i >= bytes.len() {
                            return Err(EngineError::parse(
                                "Syntax Error: unterminated string",
                            ));
                        }
                        i += 1;
                    }
                }
                b'{' => {
                    depth += 1;
                    entered = true;
                    i += 1;
                }
                b'}' => {
                    if depth == 0 {
                        return Err(EngineError::parse("Syntax Error: unbalanced braces"));
                    }
                    depth -= 1;
                    i += 1;
                    if entered && depth == 0 {
                        self.rest = &self.rest[i..];
                        return Ok(());
                    }
                }
                _ => i += 1,
            }
        }
        Err(EngineError::parse(
            "Syntax Error: unterminated fragment definition",
        ))
    }
}
