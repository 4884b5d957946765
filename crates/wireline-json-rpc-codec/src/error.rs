use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error_codes;
use crate::id::MessageId;

/// Category of a JSON-RPC error code, derived purely from numeric ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// `-32700`, the input was not well-formed JSON.
    Parse,
    /// `-32603`.
    Internal,
    /// `-32602`.
    InvalidParams,
    /// `-32601`.
    MethodNotFound,
    /// `-32600`.
    InvalidRequest,
    /// `[-32099, -32000]`, implementation-defined server errors.
    ServerReserved,
    /// The rest of `[-32768, -32000]`, reserved for future protocol
    /// revisions.
    System,
    /// Anything outside the reserved range; application-defined.
    Application,
}

impl ErrorCategory {
    /// Classifies a wire error code. Named points are matched before the
    /// server-reserved and system ranges that contain them.
    pub fn of(code: i64) -> Self {
        match code {
            error_codes::PARSE_ERROR => ErrorCategory::Parse,
            error_codes::INTERNAL_ERROR => ErrorCategory::Internal,
            error_codes::INVALID_PARAMS => ErrorCategory::InvalidParams,
            error_codes::METHOD_NOT_FOUND => ErrorCategory::MethodNotFound,
            error_codes::INVALID_REQUEST => ErrorCategory::InvalidRequest,
            c if (error_codes::SERVER_ERROR_START..=error_codes::SERVER_ERROR_END).contains(&c) => {
                ErrorCategory::ServerReserved
            }
            c if (error_codes::SYSTEM_RANGE_START..=error_codes::SYSTEM_RANGE_END).contains(&c) => {
                ErrorCategory::System
            }
            _ => ErrorCategory::Application,
        }
    }
}

/// The wire-level JSON-RPC error value: code, message and optional payload.
///
/// Codes are not range-validated at construction; classification happens
/// only through [`ErrorCategory::of`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::of(self.code)
    }

    pub fn parse_error() -> Self {
        Self::new(error_codes::PARSE_ERROR, "Parse error")
    }

    pub fn invalid_request() -> Self {
        Self::new(error_codes::INVALID_REQUEST, "Invalid Request")
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            error_codes::METHOD_NOT_FOUND,
            format!("Method '{}' not found", method),
        )
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_PARAMS, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }

    /// Builds an implementation-defined server error. `code` is expected to
    /// lie in `[-32099, -32000]`; out-of-range codes are still accepted and
    /// simply classify as something else.
    pub fn server_error(code: i64, message: impl Into<String>) -> Self {
        Self::new(code, message)
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

/// Failures raised by the codec itself.
///
/// Element-level variants (`Structural`, `UnknownMethod`, `Configuration`)
/// are wrapped into per-item [`Invalid`](crate::outcome::Item::Invalid)
/// outcomes inside a batch; `Parse` and `DuplicateIdentifier` always abort
/// the whole call. `Encode` marks an operation error on the encode path.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// The input text is not well-formed JSON.
    #[error("parse failure: {0}")]
    Parse(String),

    /// A message or batch element violates wire shape rules.
    #[error("invalid message: {0}")]
    Structural(String),

    /// The request names a method with no registered contract. A client-side
    /// problem, unlike [`CodecError::Configuration`].
    #[error("method not found: {0}")]
    UnknownMethod(String),

    /// A method or identifier is known but its contract or type binding is
    /// missing. A caller bug, kept distinct from [`CodecError::UnknownMethod`]
    /// so logs can tell the two apart.
    #[error("codec misconfigured: {0}")]
    Configuration(String),

    /// Two valid batch elements carry the same non-absent identifier, which
    /// makes the batch ambiguous as a whole.
    #[error("duplicate identifier in batch: {0}")]
    DuplicateIdentifier(MessageId),

    /// An encode operation was asked to produce a contractually invalid
    /// message.
    #[error("cannot encode: {0}")]
    Encode(String),
}

impl CodecError {
    /// The standard JSON-RPC code a transport would report for this failure.
    pub fn wire_code(&self) -> i64 {
        match self {
            CodecError::Parse(_) => error_codes::PARSE_ERROR,
            CodecError::Structural(_) => error_codes::INVALID_REQUEST,
            CodecError::UnknownMethod(_) => error_codes::METHOD_NOT_FOUND,
            CodecError::Configuration(_) => error_codes::INTERNAL_ERROR,
            CodecError::DuplicateIdentifier(_) => error_codes::INVALID_REQUEST,
            CodecError::Encode(_) => error_codes::INTERNAL_ERROR,
        }
    }

    /// Converts the failure into a wire error value ready to send back.
    pub fn to_wire_error(&self) -> JsonRpcError {
        JsonRpcError::new(self.wire_code(), self.to_string())
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_codes_classify_exactly() {
        assert_eq!(ErrorCategory::of(-32700), ErrorCategory::Parse);
        assert_eq!(ErrorCategory::of(-32603), ErrorCategory::Internal);
        assert_eq!(ErrorCategory::of(-32602), ErrorCategory::InvalidParams);
        assert_eq!(ErrorCategory::of(-32601), ErrorCategory::MethodNotFound);
        assert_eq!(ErrorCategory::of(-32600), ErrorCategory::InvalidRequest);
    }

    #[test]
    fn test_range_edges() {
        assert_eq!(ErrorCategory::of(-32099), ErrorCategory::ServerReserved);
        assert_eq!(ErrorCategory::of(-32000), ErrorCategory::ServerReserved);
        assert_eq!(ErrorCategory::of(-32100), ErrorCategory::System);
        assert_eq!(ErrorCategory::of(-32768), ErrorCategory::System);
        assert_eq!(ErrorCategory::of(-31999), ErrorCategory::Application);
        assert_eq!(ErrorCategory::of(-32769), ErrorCategory::Application);
        assert_eq!(ErrorCategory::of(0), ErrorCategory::Application);
        assert_eq!(ErrorCategory::of(42), ErrorCategory::Application);
    }

    #[test]
    fn test_out_of_range_server_code_is_accepted_at_construction() {
        let err = JsonRpcError::server_error(-1, "custom");
        assert_eq!(err.category(), ErrorCategory::Application);
    }

    #[test]
    fn test_error_serialization_skips_absent_data() {
        let plain = JsonRpcError::invalid_request();
        assert_eq!(
            serde_json::to_string(&plain).unwrap(),
            r#"{"code":-32600,"message":"Invalid Request"}"#
        );

        let with_data = JsonRpcError::invalid_params("bad params").with_data(json!({"at": 1}));
        let text = serde_json::to_string(&with_data).unwrap();
        assert!(text.contains(r#""data":{"at":1}"#));
    }

    #[test]
    fn test_codec_error_wire_codes() {
        assert_eq!(CodecError::Parse("x".into()).wire_code(), -32700);
        assert_eq!(CodecError::Structural("x".into()).wire_code(), -32600);
        assert_eq!(CodecError::UnknownMethod("m".into()).wire_code(), -32601);
        assert_eq!(CodecError::Configuration("x".into()).wire_code(), -32603);
        assert_eq!(
            CodecError::DuplicateIdentifier(MessageId::Integer(1)).wire_code(),
            -32600
        );
        assert_eq!(CodecError::Encode("x".into()).wire_code(), -32603);
    }

    #[test]
    fn test_to_wire_error() {
        let err = CodecError::UnknownMethod("foobar".to_string()).to_wire_error();
        assert_eq!(err.code, -32601);
        assert!(err.message.contains("foobar"));
        assert!(err.data.is_none());
    }
}
