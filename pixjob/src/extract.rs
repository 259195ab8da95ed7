//! Result reference extraction from provider output payloads.
//!
//! Providers put the result of a completed job in different places. Each
//! endpoint carries an ordered list of JSON pointers (RFC 6901); the first one
//! that resolves to a non-empty string wins. Supporting a new output shape is
//! a matter of adding a path.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// Pointer tried when an endpoint does not configure its own paths.
pub const DEFAULT_RESULT_PATH: &str = "/result";

/// Ordered candidate locations of a result reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultPaths(Vec<String>);

impl Default for ResultPaths {
    fn default() -> Self {
        Self(vec![DEFAULT_RESULT_PATH.to_string()])
    }
}

impl<S: Into<String>> FromIterator<S> for ResultPaths {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl ResultPaths {
    /// Create from a list of JSON pointers.
    ///
    /// The empty pointer `""` addresses the whole payload, for outputs that
    /// are a bare string.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        paths.into_iter().collect()
    }

    /// The pointers in lookup order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Locate the result reference in `output`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::NoResult`] when no path yields a non-empty string.
    pub fn extract(&self, output: &Value) -> Result<String, ProtocolError> {
        self.0
            .iter()
            .filter_map(|path| output.pointer(path))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(String::from)
            .ok_or_else(|| self.no_result())
    }

    pub(crate) fn no_result(&self) -> ProtocolError {
        ProtocolError::NoResult {
            tried: self.0.clone(),
        }
    }
}
