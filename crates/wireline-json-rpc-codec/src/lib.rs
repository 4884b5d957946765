//! # Contract-driven JSON-RPC codec
//!
//! A transport-agnostic codec that converts between JSON text (or an
//! already-parsed value tree) and strongly validated request/response
//! objects. What each method's parameters, result and error data look like
//! is declared up front through per-method contracts; the active
//! [`ProtocolLevel`] selects between the 1.0 and 2.0 wire dialects.
//!
//! ## Features
//! - Per-method request and response contracts with typed projection
//! - Both parameter-passing conventions (positional and by-name)
//! - Batch decoding with per-element isolation: one malformed sibling never
//!   discards the others
//! - Batch-wide duplicate-identifier enforcement
//! - Static and dynamic response bindings keyed by message identifier
//! - 1.0 and 2.0 dialects without duplicated decode logic
//! - Optional incremental batch decoding with the `streams` feature
//!
//! The codec performs no dispatch, method invocation or networking; those
//! belong to the transport layer sitting on top of it.

pub mod binding;
pub mod codec;
pub mod contract;
pub mod error;
pub mod id;
pub mod outcome;
pub mod prelude;
pub mod request;
pub mod response;

#[cfg(feature = "streams")]
mod stream;

// Re-export main types
pub use binding::ResponseBindings;
pub use codec::{JsonRpcCodec, ProtocolLevel};
pub use contract::{
    ContractError, ParamsContract, Projection, ProjectionError, Projector, RequestContract,
    ResponseContract, ValueType,
};
pub use error::{CodecError, ErrorCategory, JsonRpcError};
pub use id::MessageId;
pub use outcome::{Data, Item, UsageError};
pub use request::{Request, RequestParams, SYSTEM_METHOD_PREFIX};
pub use response::{Response, ResponseOutcome};

/// JSON-RPC 2.0 protocol tag value
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Implementation-defined server error range
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;

    // Range reserved for the protocol as a whole
    pub const SYSTEM_RANGE_START: i64 = -32768;
    pub const SYSTEM_RANGE_END: i64 = -32000;
}
