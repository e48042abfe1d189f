use crate::error::{ElabError, Result};
use serde_json::{Map, Value};

/// Argument bag for one tool invocation. Extraction is where the validation
/// contract lives: a missing required key fails naming that key, before any
/// request is built; a wrong type fails the same way.
#[derive(Debug, Default)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    pub fn new(arguments: Map<String, Value>) -> Self {
        Self(arguments)
    }

    pub fn require_i64(&self, key: &str) -> Result<i64> {
        self.opt_i64(key)?
            .ok_or_else(|| ElabError::MissingArgument(key.to_string()))
    }

    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.opt_str(key)?
            .ok_or_else(|| ElabError::MissingArgument(key.to_string()))
    }

    pub fn opt_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| ElabError::InvalidArgument(format!("'{key}' must be an integer"))),
        }
    }

    pub fn opt_str(&self, key: &str) -> Result<Option<&str>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| ElabError::InvalidArgument(format!("'{key}' must be a string"))),
        }
    }

    pub fn i64_or(&self, key: &str, default: i64) -> Result<i64> {
        Ok(self.opt_i64(key)?.unwrap_or(default))
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str> {
        Ok(self.opt_str(key)?.unwrap_or(default))
    }

    /// Page-size convenience cap: silently clamp, never error. The ceiling is
    /// not a correctness constraint, just protection against runaway pages.
    pub fn limit_or(&self, default: i64, max: i64) -> Result<i64> {
        Ok(self.i64_or("limit", default)?.min(max))
    }

    /// Optional array of strings (tags). Absent means empty.
    pub fn string_vec(&self, key: &str) -> Result<Vec<String>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(values)) => values
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| {
                        ElabError::InvalidArgument(format!("'{key}' must be an array of strings"))
                    })
                })
                .collect(),
            Some(_) => Err(ElabError::InvalidArgument(format!(
                "'{key}' must be an array of strings"
            ))),
        }
    }
}
