use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::JSONRPC_VERSION;
use crate::binding::ResponseBindings;
use crate::contract::{ParamsContract, Projector, RequestContract, ResponseContract, json_kind};
use crate::error::{CodecError, JsonRpcError};
use crate::id::MessageId;
use crate::outcome::{Data, Item};
use crate::request::{Request, RequestParams};
use crate::response::{Response, ResponseOutcome};

/// Selects the wire dialect: the original 1.0 shape or the 2.0 shape with
/// the `"jsonrpc":"2.0"` protocol tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolLevel {
    Level1,
    #[default]
    Level2,
}

/// The codec engine: decodes and encodes JSON-RPC messages against the
/// caller-registered contracts and the active [`ProtocolLevel`].
///
/// The engine is stateless per call; decoding never mutates it. Contracts
/// and bindings are registered by the owning caller between invocations, so
/// a shared engine is safe to use from many threads as long as registration
/// does not race an in-flight call.
pub struct JsonRpcCodec {
    level: ProtocolLevel,
    // A `None` value marks a method that is declared but has no contract
    // yet; decoding it reports a configuration error, not an unknown method.
    request_contracts: HashMap<String, Option<RequestContract>>,
    response_contracts: HashMap<String, ResponseContract>,
    bindings: ResponseBindings,
    default_error_data: Option<Projector>,
}

impl JsonRpcCodec {
    pub fn new(level: ProtocolLevel) -> Self {
        Self {
            level,
            request_contracts: HashMap::new(),
            response_contracts: HashMap::new(),
            bindings: ResponseBindings::new(),
            default_error_data: None,
        }
    }

    pub fn level(&self) -> ProtocolLevel {
        self.level
    }

    /// Registers the request contract for a method.
    pub fn register_request_contract(
        &mut self,
        method: impl Into<String>,
        contract: RequestContract,
    ) {
        self.request_contracts.insert(method.into(), Some(contract));
    }

    /// Declares a method name without supplying its contract. Requests for
    /// it decode to a configuration error rather than an unknown method, so
    /// callers can tell "client sent a bad method" from "server
    /// misconfigured".
    pub fn declare_request_method(&mut self, method: impl Into<String>) {
        self.request_contracts.entry(method.into()).or_insert(None);
    }

    /// Registers the response contract for a method, used by static
    /// identifier bindings.
    pub fn register_response_contract(
        &mut self,
        method: impl Into<String>,
        contract: ResponseContract,
    ) {
        self.response_contracts.insert(method.into(), contract);
    }

    pub fn bindings(&self) -> &ResponseBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut ResponseBindings {
        &mut self.bindings
    }

    /// Fallback projection for the `data` member of error responses whose
    /// contract declares no error-data type.
    pub fn set_default_error_data(&mut self, projector: impl Into<Projector>) {
        self.default_error_data = Some(projector.into());
    }

    // ---------------------------------------------------------------------
    // Decode path
    // ---------------------------------------------------------------------

    /// Decodes one request or a batch of requests from JSON text.
    pub fn decode_request(&self, text: &str) -> Result<Data<Request>, CodecError> {
        let root: Value = serde_json::from_str(text).map_err(|e| CodecError::Parse(e.to_string()))?;
        self.decode_request_value(&root)
    }

    /// Decodes requests from an already-parsed value tree.
    pub fn decode_request_value(&self, root: &Value) -> Result<Data<Request>, CodecError> {
        self.decode_tree(
            root,
            |obj| self.decode_request_element(obj),
            |request: &Request| &request.id,
        )
    }

    /// Decodes one response or a batch of responses from JSON text.
    pub fn decode_response(&self, text: &str) -> Result<Data<Response>, CodecError> {
        let root: Value = serde_json::from_str(text).map_err(|e| CodecError::Parse(e.to_string()))?;
        self.decode_response_value(&root)
    }

    /// Decodes responses from an already-parsed value tree.
    pub fn decode_response_value(&self, root: &Value) -> Result<Data<Response>, CodecError> {
        self.decode_tree(
            root,
            |obj| self.decode_response_element(obj),
            |response: &Response| &response.id,
        )
    }

    /// Shape classification plus the per-element loop shared by requests and
    /// responses.
    ///
    /// A single object yields `Data::Single`; a non-empty array yields
    /// `Data::Batch` with one item per source element, invalid ones
    /// included. Top-level failures (empty batch, non-object element,
    /// non-container root, duplicate identifiers) abort the whole call.
    fn decode_tree<T, F>(
        &self,
        root: &Value,
        decode: F,
        id_of: fn(&T) -> &MessageId,
    ) -> Result<Data<T>, CodecError>
    where
        F: Fn(&Map<String, Value>) -> Result<T, CodecError>,
    {
        match root {
            Value::Object(obj) => match decode(obj) {
                Ok(message) => Ok(Data::Single(Item::Valid(message))),
                // An unregistered method is the peer's mistake; hand it back
                // as an invalid item so the caller can answer it. Structural
                // and configuration failures on a single message abort the
                // call.
                Err(err @ CodecError::UnknownMethod(_)) => {
                    debug!(error = %err, "rejecting single message");
                    Ok(Data::Single(Item::Invalid(err)))
                }
                Err(err) => {
                    if matches!(err, CodecError::Configuration(_)) {
                        warn!(error = %err, "codec configuration error");
                    }
                    Err(err)
                }
            },
            Value::Array(elements) => {
                if elements.is_empty() {
                    return Err(empty_batch_error());
                }
                let mut items = Vec::with_capacity(elements.len());
                let mut seen: HashSet<MessageId> = HashSet::new();
                for (index, element) in elements.iter().enumerate() {
                    let obj = element
                        .as_object()
                        .ok_or_else(|| non_object_element_error(index, element))?;
                    match decode(obj) {
                        Ok(message) => {
                            let id = id_of(&message);
                            // Duplicate identifiers make the whole batch
                            // ambiguous; checked incrementally so the
                            // failure surfaces as soon as it is seen.
                            if !id.is_none() && !seen.insert(id.clone()) {
                                return Err(CodecError::DuplicateIdentifier(id.clone()));
                            }
                            items.push(Item::Valid(message));
                        }
                        Err(err) => {
                            match &err {
                                CodecError::Configuration(_) => {
                                    warn!(index, error = %err, "codec configuration error in batch element");
                                }
                                _ => debug!(index, error = %err, "rejecting batch element"),
                            }
                            items.push(Item::Invalid(err));
                        }
                    }
                }
                Ok(Data::Batch(items))
            }
            other => Err(CodecError::Structural(format!(
                "payload root must be an object or array, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Under Level2 the literal `"jsonrpc":"2.0"` tag is mandatory; Level1
    /// messages carry no tag and none is checked.
    fn check_protocol_tag(&self, obj: &Map<String, Value>) -> Result<(), CodecError> {
        if self.level != ProtocolLevel::Level2 {
            return Ok(());
        }
        match obj.get("jsonrpc") {
            Some(Value::String(tag)) if tag == JSONRPC_VERSION => Ok(()),
            Some(other) => Err(CodecError::Structural(format!(
                "protocol tag must be the string \"2.0\", got {other}"
            ))),
            None => Err(CodecError::Structural(
                "missing protocol tag \"jsonrpc\":\"2.0\"".to_string(),
            )),
        }
    }

    pub(crate) fn decode_request_element(
        &self,
        obj: &Map<String, Value>,
    ) -> Result<Request, CodecError> {
        self.check_protocol_tag(obj)?;
        let id = MessageId::from_json(obj.get("id").unwrap_or(&Value::Null))?;

        let method = match obj.get("method") {
            Some(Value::String(m)) if !m.is_empty() => m.as_str(),
            Some(_) | None => {
                return Err(CodecError::Structural(
                    "request method must be a non-empty string".to_string(),
                ));
            }
        };

        let contract = match self.request_contracts.get(method) {
            None => return Err(CodecError::UnknownMethod(method.to_string())),
            Some(None) => {
                return Err(CodecError::Configuration(format!(
                    "method '{method}' is declared but has no request contract"
                )));
            }
            Some(Some(contract)) => contract,
        };

        let params = self.decode_params(method, contract, obj.get("params"))?;
        Ok(Request::new(id, method, params))
    }

    /// Projects the payload's `params` member through the method's declared
    /// shape.
    fn decode_params(
        &self,
        method: &str,
        contract: &RequestContract,
        node: Option<&Value>,
    ) -> Result<Option<RequestParams>, CodecError> {
        let Some(shape) = contract.params() else {
            // No parameters accepted: whatever the payload carries is
            // ignored structurally.
            return Ok(None);
        };
        match shape {
            ParamsContract::ByPosition(entries) => {
                let supplied = node.and_then(Value::as_array).ok_or_else(|| {
                    CodecError::Structural(format!(
                        "method '{method}' takes positional params as a JSON array"
                    ))
                })?;
                if supplied.len() < entries.len() {
                    return Err(CodecError::Structural(format!(
                        "method '{method}' expects {} positional params, got {}",
                        entries.len(),
                        supplied.len()
                    )));
                }
                let mut values = Vec::with_capacity(entries.len());
                for (index, projector) in entries.iter().enumerate() {
                    let value = projector.project(&supplied[index]).map_err(|e| {
                        CodecError::Structural(format!("param {index} of '{method}': {e}"))
                    })?;
                    values.push(value);
                }
                // Positions beyond the declared length are tolerated and
                // dropped.
                Ok(Some(RequestParams::ByPosition(values)))
            }
            ParamsContract::ByName(entries) => {
                let supplied = node.and_then(Value::as_object).ok_or_else(|| {
                    CodecError::Structural(format!(
                        "method '{method}' takes named params as a JSON object"
                    ))
                })?;
                let mut values = BTreeMap::new();
                for (name, projector) in entries {
                    if let Some(raw) = supplied.get(name) {
                        let value = projector.project(raw).map_err(|e| {
                            CodecError::Structural(format!("param '{name}' of '{method}': {e}"))
                        })?;
                        values.insert(name.clone(), value);
                    }
                }
                // Unknown payload keys are ignored, but every declared key
                // must have been populated.
                if values.len() < entries.len() {
                    return Err(CodecError::Structural(format!(
                        "method '{method}' expects {} named params, got {}",
                        entries.len(),
                        values.len()
                    )));
                }
                Ok(Some(RequestParams::ByName(values)))
            }
        }
    }

    pub(crate) fn decode_response_element(
        &self,
        obj: &Map<String, Value>,
    ) -> Result<Response, CodecError> {
        self.check_protocol_tag(obj)?;
        let id = MessageId::from_json(obj.get("id").unwrap_or(&Value::Null))?;

        let result = obj.get("result");
        let error = obj.get("error");
        let outcome = match self.level {
            ProtocolLevel::Level2 => match (result, error) {
                (Some(_), Some(_)) => {
                    return Err(CodecError::Structural(
                        "response carries both result and error".to_string(),
                    ));
                }
                (None, None) => {
                    return Err(CodecError::Structural(
                        "response carries neither result nor error".to_string(),
                    ));
                }
                (Some(value), None) => self.decode_result(&id, value)?,
                (None, Some(node)) => self.decode_error(&id, node)?,
            },
            // 1.0 responses carry both members; success is signaled by a
            // null error, not by absence.
            ProtocolLevel::Level1 => match error {
                Some(node) if !node.is_null() => self.decode_error(&id, node)?,
                _ => self.decode_result(&id, result.unwrap_or(&Value::Null))?,
            },
        };
        Ok(Response { id, outcome })
    }

    fn decode_result(&self, id: &MessageId, value: &Value) -> Result<ResponseOutcome, CodecError> {
        if id.is_none() {
            return Err(CodecError::Structural(
                "success response is missing an identifier".to_string(),
            ));
        }
        let contract = self
            .bindings
            .resolve(id, &self.response_contracts)
            .ok_or_else(|| {
                CodecError::Configuration(format!(
                    "no response contract bound for identifier '{id}'"
                ))
            })?;
        let projector = contract.result().ok_or_else(|| {
            CodecError::Configuration(format!(
                "response contract for identifier '{id}' declares no result type"
            ))
        })?;
        let value = projector
            .project(value)
            .map_err(|e| CodecError::Structural(format!("result for identifier '{id}': {e}")))?;
        Ok(ResponseOutcome::Result(value))
    }

    fn decode_error(&self, id: &MessageId, node: &Value) -> Result<ResponseOutcome, CodecError> {
        let obj = node.as_object().ok_or_else(|| {
            CodecError::Structural(format!(
                "error member must be an object, got {}",
                json_kind(node)
            ))
        })?;

        let code = match obj.get("code") {
            Some(raw) => raw.as_i64().ok_or_else(|| {
                CodecError::Structural("error code must be an integer".to_string())
            })?,
            // Lenient 1.0 fallback: a missing code defaults to zero.
            None if self.level == ProtocolLevel::Level1 => 0,
            None => {
                return Err(CodecError::Structural(
                    "error object is missing an integer code".to_string(),
                ));
            }
        };

        let message = match obj.get("message") {
            Some(raw) => raw
                .as_str()
                .ok_or_else(|| {
                    CodecError::Structural("error message must be a string".to_string())
                })?
                .to_string(),
            // Lenient 1.0 fallback: a missing message defaults to empty.
            None if self.level == ProtocolLevel::Level1 => String::new(),
            None => {
                return Err(CodecError::Structural(
                    "error object is missing a message string".to_string(),
                ));
            }
        };

        let data = match obj.get("data") {
            None => None,
            Some(raw) => {
                let projector = self
                    .bindings
                    .resolve(id, &self.response_contracts)
                    .and_then(|contract| contract.error_data())
                    .or(self.default_error_data.as_ref());
                let value = match projector {
                    Some(projector) => projector.project(raw).map_err(|e| {
                        CodecError::Structural(format!("error data for identifier '{id}': {e}"))
                    })?,
                    // No declared shape anywhere: keep the payload opaque.
                    None => raw.clone(),
                };
                Some(value)
            }
        };

        Ok(ResponseOutcome::Error(JsonRpcError {
            code,
            message,
            data,
        }))
    }

    // ---------------------------------------------------------------------
    // Encode path
    // ---------------------------------------------------------------------

    /// Encodes a single request to JSON text.
    pub fn encode_request(&self, request: &Request) -> Result<String, CodecError> {
        let value = self.request_to_value(request)?;
        serde_json::to_string(&value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Encodes a request batch. An empty batch is an operation error.
    pub fn encode_request_batch(&self, requests: &[Request]) -> Result<String, CodecError> {
        if requests.is_empty() {
            return Err(CodecError::Encode(
                "request batch must contain at least one message".to_string(),
            ));
        }
        let values = requests
            .iter()
            .map(|request| self.request_to_value(request))
            .collect::<Result<Vec<_>, _>>()?;
        serde_json::to_string(&values).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Builds the token tree for one request under the active dialect.
    pub fn request_to_value(&self, request: &Request) -> Result<Value, CodecError> {
        if request.method.is_empty() {
            return Err(CodecError::Encode(
                "request method must be non-empty".to_string(),
            ));
        }
        let mut obj = Map::new();
        if self.level == ProtocolLevel::Level2 {
            obj.insert(
                "jsonrpc".to_string(),
                Value::String(JSONRPC_VERSION.to_string()),
            );
        }
        obj.insert("method".to_string(), Value::String(request.method.clone()));

        match (&request.params, self.level) {
            // 2.0 omits the member entirely when there are no params.
            (None, ProtocolLevel::Level2) => {}
            // 1.0 always carries a params array.
            (None, ProtocolLevel::Level1) => {
                obj.insert("params".to_string(), Value::Array(Vec::new()));
            }
            (Some(RequestParams::ByPosition(values)), _) => {
                if values.is_empty() {
                    return Err(CodecError::Encode(
                        "positional params must carry at least one value".to_string(),
                    ));
                }
                obj.insert("params".to_string(), Value::Array(values.clone()));
            }
            (Some(RequestParams::ByName(values)), ProtocolLevel::Level2) => {
                let map: Map<String, Value> = values
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                obj.insert("params".to_string(), Value::Object(map));
            }
            (Some(RequestParams::ByName(_)), ProtocolLevel::Level1) => {
                return Err(CodecError::Encode(
                    "the 1.0 dialect does not support by-name params".to_string(),
                ));
            }
        }

        match self.level {
            // 2.0 omits the id for notifications.
            ProtocolLevel::Level2 => {
                if !request.id.is_none() {
                    obj.insert("id".to_string(), request.id.to_json());
                }
            }
            // 1.0 always carries an id, null for notifications.
            ProtocolLevel::Level1 => {
                obj.insert("id".to_string(), request.id.to_json());
            }
        }

        Ok(Value::Object(obj))
    }

    /// Encodes a single response to JSON text.
    pub fn encode_response(&self, response: &Response) -> Result<String, CodecError> {
        let value = self.response_to_value(response)?;
        serde_json::to_string(&value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Encodes a response batch. An empty batch degenerates to empty output
    /// rather than erroring, mirroring the asymmetry with
    /// [`JsonRpcCodec::encode_request_batch`]: a transport that answered
    /// only notifications has nothing to say.
    pub fn encode_response_batch(&self, responses: &[Response]) -> Result<String, CodecError> {
        if responses.is_empty() {
            return Ok(String::new());
        }
        let values = responses
            .iter()
            .map(|response| self.response_to_value(response))
            .collect::<Result<Vec<_>, _>>()?;
        serde_json::to_string(&values).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Builds the token tree for one response under the active dialect.
    pub fn response_to_value(&self, response: &Response) -> Result<Value, CodecError> {
        let mut obj = Map::new();
        if self.level == ProtocolLevel::Level2 {
            obj.insert(
                "jsonrpc".to_string(),
                Value::String(JSONRPC_VERSION.to_string()),
            );
        }
        let error_value = |error: &JsonRpcError| {
            serde_json::to_value(error).map_err(|e| CodecError::Encode(e.to_string()))
        };
        match (self.level, &response.outcome) {
            // 2.0 carries exactly one of the two members.
            (ProtocolLevel::Level2, ResponseOutcome::Result(value)) => {
                obj.insert("result".to_string(), value.clone());
            }
            (ProtocolLevel::Level2, ResponseOutcome::Error(error)) => {
                obj.insert("error".to_string(), error_value(error)?);
            }
            // 1.0 always carries both, null for the unused one.
            (ProtocolLevel::Level1, ResponseOutcome::Result(value)) => {
                obj.insert("result".to_string(), value.clone());
                obj.insert("error".to_string(), Value::Null);
            }
            (ProtocolLevel::Level1, ResponseOutcome::Error(error)) => {
                obj.insert("result".to_string(), Value::Null);
                obj.insert("error".to_string(), error_value(error)?);
            }
        }
        // The id member is always present on responses, null when absent.
        obj.insert("id".to_string(), response.id.to_json());
        Ok(Value::Object(obj))
    }
}

impl std::fmt::Debug for JsonRpcCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcCodec")
            .field("level", &self.level)
            .field("request_contracts", &self.request_contracts.len())
            .field("response_contracts", &self.response_contracts.len())
            .field("bindings", &self.bindings.len())
            .field("default_error_data", &self.default_error_data.is_some())
            .finish()
    }
}

pub(crate) fn empty_batch_error() -> CodecError {
    CodecError::Structural("batch must contain at least one message".to_string())
}

pub(crate) fn non_object_element_error(index: usize, element: &Value) -> CodecError {
    CodecError::Structural(format!(
        "batch element {index} is not an object, got {}",
        json_kind(element)
    ))
}
