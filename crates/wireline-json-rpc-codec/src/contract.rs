use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// Short name for a JSON node type, used in diagnostics.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A projection failed: the node does not have the declared shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct ProjectionError {
    pub expected: String,
    pub found: String,
}

/// The capability a contract holds for turning a JSON node into a typed
/// value.
///
/// The engine stays agnostic to how projection is implemented; anything that
/// can validate a node and hand back the normalized value qualifies.
/// [`ValueType`] covers the common scalar and container shapes.
pub trait Projection: Send + Sync {
    /// Human-readable name of the target shape, used in diagnostics.
    fn describe(&self) -> &str;

    /// Validates `node` against the target shape and returns the projected
    /// value.
    fn project(&self, node: &Value) -> Result<Value, ProjectionError>;
}

/// Shared handle to a projection; contracts are cloned freely across decode
/// calls.
pub type Projector = Arc<dyn Projection>;

/// Built-in projections for the JSON-native shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    /// A number representable as `i64`.
    Integer,
    /// Any number; integers are accepted as floats.
    Float,
    String,
    Object,
    Array,
    /// Accepts anything, including `null`.
    Any,
}

impl Projection for ValueType {
    fn describe(&self) -> &str {
        match self {
            ValueType::Bool => "boolean",
            ValueType::Integer => "integer",
            ValueType::Float => "number",
            ValueType::String => "string",
            ValueType::Object => "object",
            ValueType::Array => "array",
            ValueType::Any => "any value",
        }
    }

    fn project(&self, node: &Value) -> Result<Value, ProjectionError> {
        let matches = match self {
            ValueType::Bool => node.is_boolean(),
            ValueType::Integer => node.as_i64().is_some(),
            ValueType::Float => node.as_f64().is_some(),
            ValueType::String => node.is_string(),
            ValueType::Object => node.is_object(),
            ValueType::Array => node.is_array(),
            ValueType::Any => true,
        };
        if matches {
            Ok(node.clone())
        } else {
            Err(ProjectionError {
                expected: self.describe().to_string(),
                found: json_kind(node).to_string(),
            })
        }
    }
}

impl From<ValueType> for Projector {
    fn from(ty: ValueType) -> Self {
        Arc::new(ty)
    }
}

/// Construction-time contract violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("positional parameter contract must declare at least one entry")]
    EmptyPositional,
    #[error("named parameter contract must declare at least one entry")]
    EmptyNamed,
}

/// Declared parameter shape for one method.
#[derive(Clone)]
pub enum ParamsContract {
    ByPosition(Vec<Projector>),
    ByName(BTreeMap<String, Projector>),
}

impl ParamsContract {
    pub fn len(&self) -> usize {
        match self {
            ParamsContract::ByPosition(entries) => entries.len(),
            ParamsContract::ByName(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ParamsContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsContract::ByPosition(entries) => f
                .debug_list()
                .entries(entries.iter().map(|p| p.describe()))
                .finish(),
            ParamsContract::ByName(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, p)| (k, p.describe())))
                .finish(),
        }
    }
}

/// Request-side contract: the parameter shape a method accepts.
///
/// Immutable after construction and safe to share across concurrent decode
/// calls. A contract without a parameter shape accepts no parameters; the
/// decoder ignores whatever `params` the payload carries.
#[derive(Debug, Clone, Default)]
pub struct RequestContract {
    params: Option<ParamsContract>,
}

impl RequestContract {
    /// A contract accepting no parameters.
    pub fn no_params() -> Self {
        Self { params: None }
    }

    /// Declares positional parameters. An empty list is rejected; use
    /// [`RequestContract::no_params`] for parameterless methods.
    pub fn by_position(entries: Vec<Projector>) -> Result<Self, ContractError> {
        if entries.is_empty() {
            return Err(ContractError::EmptyPositional);
        }
        Ok(Self {
            params: Some(ParamsContract::ByPosition(entries)),
        })
    }

    /// Declares named parameters. An empty map is rejected.
    pub fn by_name(entries: BTreeMap<String, Projector>) -> Result<Self, ContractError> {
        if entries.is_empty() {
            return Err(ContractError::EmptyNamed);
        }
        Ok(Self {
            params: Some(ParamsContract::ByName(entries)),
        })
    }

    pub fn params(&self) -> Option<&ParamsContract> {
        self.params.as_ref()
    }
}

/// Response-side contract: expected result shape and, optionally, the shape
/// of the `data` member of error responses.
#[derive(Clone, Default)]
pub struct ResponseContract {
    result: Option<Projector>,
    error_data: Option<Projector>,
}

impl ResponseContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, projector: impl Into<Projector>) -> Self {
        self.result = Some(projector.into());
        self
    }

    pub fn with_error_data(mut self, projector: impl Into<Projector>) -> Self {
        self.error_data = Some(projector.into());
        self
    }

    pub fn result(&self) -> Option<&Projector> {
        self.result.as_ref()
    }

    pub fn error_data(&self) -> Option<&Projector> {
        self.error_data.as_ref()
    }
}

impl fmt::Debug for ResponseContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseContract")
            .field("result", &self.result.as_ref().map(|p| p.describe()))
            .field("error_data", &self.error_data.as_ref().map(|p| p.describe()))
            .finish()
    }
}
