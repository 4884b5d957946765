//! Convenience re-exports for the common case: build a codec, register
//! contracts, decode and encode.

pub use crate::binding::ResponseBindings;
pub use crate::codec::{JsonRpcCodec, ProtocolLevel};
pub use crate::contract::{RequestContract, ResponseContract, ValueType};
pub use crate::error::{CodecError, ErrorCategory, JsonRpcError};
pub use crate::id::MessageId;
pub use crate::outcome::{Data, Item};
pub use crate::request::{Request, RequestParams};
pub use crate::response::{Response, ResponseOutcome};
