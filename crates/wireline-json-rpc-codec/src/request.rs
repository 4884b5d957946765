use std::collections::BTreeMap;

use serde_json::Value;

use crate::id::MessageId;

/// Method names starting with this prefix are reserved for protocol-internal
/// use.
pub const SYSTEM_METHOD_PREFIX: &str = "rpc.";

/// Parameters of a decoded request: positional list or name-keyed map.
///
/// The map is ordered and key-unique. Absence of parameters altogether is
/// modeled as `Option<RequestParams>` on [`Request`].
#[derive(Debug, Clone, PartialEq)]
pub enum RequestParams {
    ByPosition(Vec<Value>),
    ByName(BTreeMap<String, Value>),
}

impl RequestParams {
    /// Get a parameter by name (for by-name params only).
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            RequestParams::ByName(map) => map.get(name),
            RequestParams::ByPosition(_) => None,
        }
    }

    /// Get a parameter by index (for positional params only).
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            RequestParams::ByPosition(values) => values.get(index),
            RequestParams::ByName(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RequestParams::ByPosition(values) => values.len(),
            RequestParams::ByName(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<Value>> for RequestParams {
    fn from(values: Vec<Value>) -> Self {
        RequestParams::ByPosition(values)
    }
}

impl From<BTreeMap<String, Value>> for RequestParams {
    fn from(map: BTreeMap<String, Value>) -> Self {
        RequestParams::ByName(map)
    }
}

/// A JSON-RPC request: identifier, method name and parameter variant.
///
/// A request with an absent identifier is a notification; no response is
/// expected for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: MessageId,
    pub method: String,
    pub params: Option<RequestParams>,
}

impl Request {
    pub fn new(id: MessageId, method: impl Into<String>, params: Option<RequestParams>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }

    pub fn no_params(id: MessageId, method: impl Into<String>) -> Self {
        Self::new(id, method, None)
    }

    pub fn by_position(id: MessageId, method: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(id, method, Some(RequestParams::ByPosition(values)))
    }

    pub fn by_name(
        id: MessageId,
        method: impl Into<String>,
        values: BTreeMap<String, Value>,
    ) -> Self {
        Self::new(id, method, Some(RequestParams::ByName(values)))
    }

    /// Builds a notification: a request carrying no identifier.
    pub fn notification(method: impl Into<String>, params: Option<RequestParams>) -> Self {
        Self::new(MessageId::None, method, params)
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Whether the method name falls in the reserved `rpc.` namespace.
    pub fn is_system(&self) -> bool {
        self.method.starts_with(SYSTEM_METHOD_PREFIX)
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.as_ref()?.get(name)
    }

    pub fn param_at(&self, index: usize) -> Option<&Value> {
        self.params.as_ref()?.get_index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notification_has_no_id() {
        let note = Request::notification("tick", None);
        assert!(note.is_notification());
        assert!(!note.is_system());

        let call = Request::no_params(MessageId::Integer(1), "tick");
        assert!(!call.is_notification());
    }

    #[test]
    fn test_system_prefix() {
        let request = Request::no_params(MessageId::Integer(1), "rpc.discover");
        assert!(request.is_system());
        assert!(!Request::no_params(MessageId::Integer(2), "rpcx").is_system());
    }

    #[test]
    fn test_param_accessors() {
        let positional =
            Request::by_position(MessageId::Integer(1), "subtract", vec![json!(42), json!(23)]);
        assert_eq!(positional.param_at(0), Some(&json!(42)));
        assert_eq!(positional.param_at(2), None);
        assert_eq!(positional.param("minuend"), None);

        let mut map = BTreeMap::new();
        map.insert("minuend".to_string(), json!(42));
        map.insert("subtrahend".to_string(), json!(23));
        let named = Request::by_name(MessageId::Integer(2), "subtract", map);
        assert_eq!(named.param("minuend"), Some(&json!(42)));
        assert_eq!(named.param_at(0), None);
    }
}
