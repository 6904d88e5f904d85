//! Wire schema for the recognition service.
//!
//! Request:
//!
//! ```json
//! { "image": "data:image/png;base64,...", "dict_of_vars": { "x": "5" } }
//! ```
//!
//! Response:
//!
//! ```json
//! { "data": [ { "expr": "x", "result": "5", "assign": true } ] }
//! ```
//!
//! Responses are validated here so that nothing downstream trusts the shape of
//! a remote payload.

use serde::{Deserialize, Serialize};

use crate::{BindingsSnapshot, CalcError, CalcResult};

/// Body of the POST sent to the recognition service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionRequest {
    /// Data-URL encoded PNG of the canvas.
    pub image: String,
    /// Bindings known before this request.
    pub dict_of_vars: BindingsSnapshot,
}

/// One recognized expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionEntry {
    /// The expression (or variable name, for assignments).
    pub expr: String,
    /// The computed result.
    pub result: String,
    /// Whether this entry binds `expr` to `result` for later requests.
    pub assign: bool,
}

impl RecognitionEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(expr: impl Into<String>, result: impl Into<String>, assign: bool) -> Self {
        Self {
            expr: expr.into(),
            result: result.into(),
            assign,
        }
    }
}

/// A validated batch of results, in service order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResponse {
    /// Ordered results.
    pub data: Vec<RecognitionEntry>,
}

impl RecognitionResponse {
    /// Build a response from entries.
    #[must_use]
    pub fn new(data: Vec<RecognitionEntry>) -> Self {
        Self { data }
    }

    /// Validate a decoded JSON payload.
    ///
    /// Unknown top-level fields (`message`, `status`) are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::MalformedResponse`] if `data` is missing or has the
    /// wrong shape, or an assignment has an empty name.
    pub fn from_value(value: serde_json::Value) -> CalcResult<Self> {
        if !value.is_object() {
            return Err(CalcError::MalformedResponse("expected a JSON object".to_string()));
        }
        let response: Self = serde_json::from_value(value)
            .map_err(|e| CalcError::MalformedResponse(e.to_string()))?;
        response.validate()?;
        Ok(response)
    }

    /// Decode and validate raw response bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::MalformedResponse`] if the bytes are not JSON or
    /// fail validation.
    pub fn from_slice(bytes: &[u8]) -> CalcResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| CalcError::MalformedResponse(e.to_string()))?;
        Self::from_value(value)
    }

    fn validate(&self) -> CalcResult<()> {
        if let Some(index) = self
            .data
            .iter()
            .position(|e| e.assign && e.expr.trim().is_empty())
        {
            return Err(CalcError::MalformedResponse(format!(
                "entry {index} assigns to an empty name"
            )));
        }
        Ok(())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
