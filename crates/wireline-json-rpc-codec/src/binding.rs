use std::collections::HashMap;

use crate::contract::ResponseContract;
use crate::id::MessageId;

/// Tells the decoder which response contract applies to a given message
/// identifier.
///
/// Two maps are kept: a static identifier-to-method map, resolved through
/// the caller's response-contract-by-method table, and a dynamic
/// identifier-to-contract map that wins whenever both are populated.
/// Bindings are mutated only by the owning caller between codec invocations,
/// never concurrently with an in-flight decode.
#[derive(Debug, Clone, Default)]
pub struct ResponseBindings {
    by_method_name: HashMap<MessageId, String>,
    by_contract: HashMap<MessageId, ResponseContract>,
}

impl ResponseBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statically binds an identifier to the method whose response contract
    /// should decode it.
    pub fn bind_method(&mut self, id: MessageId, method: impl Into<String>) {
        self.by_method_name.insert(id, method.into());
    }

    /// Dynamically binds an identifier straight to a response contract.
    pub fn bind_contract(&mut self, id: MessageId, contract: ResponseContract) {
        self.by_contract.insert(id, contract);
    }

    /// Removes both bindings for an identifier, typically once its response
    /// has been decoded.
    pub fn unbind(&mut self, id: &MessageId) {
        self.by_method_name.remove(id);
        self.by_contract.remove(id);
    }

    pub fn clear(&mut self) {
        self.by_method_name.clear();
        self.by_contract.clear();
    }

    pub fn len(&self) -> usize {
        self.by_method_name.len() + self.by_contract.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_method_name.is_empty() && self.by_contract.is_empty()
    }

    /// Resolves the contract for an identifier. Dynamic bindings take
    /// precedence; static bindings fall back to `by_method`. Returns `None`
    /// when unresolved; the engine decides how to react.
    pub fn resolve<'a>(
        &'a self,
        id: &MessageId,
        by_method: &'a HashMap<String, ResponseContract>,
    ) -> Option<&'a ResponseContract> {
        if let Some(contract) = self.by_contract.get(id) {
            return Some(contract);
        }
        self.by_method_name
            .get(id)
            .and_then(|method| by_method.get(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ValueType;

    fn by_method() -> HashMap<String, ResponseContract> {
        let mut map = HashMap::new();
        map.insert(
            "subtract".to_string(),
            ResponseContract::new().with_result(ValueType::Integer),
        );
        map
    }

    #[test]
    fn test_static_binding_resolves_through_method_map() {
        let mut bindings = ResponseBindings::new();
        bindings.bind_method(MessageId::Integer(1), "subtract");

        let contracts = by_method();
        let contract = bindings.resolve(&MessageId::Integer(1), &contracts);
        assert!(contract.is_some());
        assert_eq!(
            contract.unwrap().result().unwrap().describe(),
            "integer"
        );
    }

    #[test]
    fn test_dynamic_binding_takes_precedence() {
        let mut bindings = ResponseBindings::new();
        bindings.bind_method(MessageId::Integer(1), "subtract");
        bindings.bind_contract(
            MessageId::Integer(1),
            ResponseContract::new().with_result(ValueType::String),
        );

        let contracts = by_method();
        let contract = bindings.resolve(&MessageId::Integer(1), &contracts).unwrap();
        assert_eq!(contract.result().unwrap().describe(), "string");
    }

    #[test]
    fn test_unresolved_is_none_not_an_error() {
        let bindings = ResponseBindings::new();
        let contracts = by_method();
        assert!(bindings.resolve(&MessageId::Integer(9), &contracts).is_none());
    }

    #[test]
    fn test_static_binding_to_unknown_method_is_none() {
        let mut bindings = ResponseBindings::new();
        bindings.bind_method(MessageId::Integer(1), "missing");
        let contracts = by_method();
        assert!(bindings.resolve(&MessageId::Integer(1), &contracts).is_none());
    }

    #[test]
    fn test_unbind() {
        let mut bindings = ResponseBindings::new();
        bindings.bind_method(MessageId::Integer(1), "subtract");
        bindings.bind_contract(MessageId::Integer(1), ResponseContract::new());
        assert!(!bindings.is_empty());

        bindings.unbind(&MessageId::Integer(1));
        assert!(bindings.is_empty());
    }
}
