//! Incremental batch decoding over an element stream.
//!
//! Transports that frame batch elements themselves (one parsed value at a
//! time) can decode without materializing the whole array first. The
//! validation ordering is identical to the slice path: per-element isolation
//! is preserved, and the duplicate-identifier check runs incrementally so a
//! completed batch is never yielded with ambiguous identifiers. The codec is
//! read-only during the call, so cancelling the future leaves no partial
//! state behind.

use std::collections::HashSet;

use futures::{Stream, StreamExt, pin_mut};
use serde_json::Value;
use tracing::{debug, warn};

use crate::codec::{JsonRpcCodec, empty_batch_error, non_object_element_error};
use crate::error::CodecError;
use crate::id::MessageId;
use crate::outcome::{Data, Item};
use crate::request::Request;
use crate::response::Response;

impl JsonRpcCodec {
    /// Decodes a request batch from a stream of already-parsed elements.
    ///
    /// An exhausted stream with no elements fails like an empty JSON array.
    pub async fn decode_request_stream<S>(&self, elements: S) -> Result<Data<Request>, CodecError>
    where
        S: Stream<Item = Value>,
    {
        self.decode_element_stream(
            elements,
            |codec, obj| codec.decode_request_element(obj),
            |request: &Request| &request.id,
        )
        .await
    }

    /// Decodes a response batch from a stream of already-parsed elements.
    pub async fn decode_response_stream<S>(&self, elements: S) -> Result<Data<Response>, CodecError>
    where
        S: Stream<Item = Value>,
    {
        self.decode_element_stream(
            elements,
            |codec, obj| codec.decode_response_element(obj),
            |response: &Response| &response.id,
        )
        .await
    }

    async fn decode_element_stream<S, T, F>(
        &self,
        elements: S,
        decode: F,
        id_of: fn(&T) -> &MessageId,
    ) -> Result<Data<T>, CodecError>
    where
        S: Stream<Item = Value>,
        F: Fn(&Self, &serde_json::Map<String, Value>) -> Result<T, CodecError>,
    {
        pin_mut!(elements);
        let mut items: Vec<Item<T>> = Vec::new();
        let mut seen: HashSet<MessageId> = HashSet::new();
        let mut index = 0usize;
        while let Some(element) = elements.next().await {
            let obj = element
                .as_object()
                .ok_or_else(|| non_object_element_error(index, &element))?;
            match decode(self, obj) {
                Ok(message) => {
                    let id = id_of(&message);
                    if !id.is_none() && !seen.insert(id.clone()) {
                        return Err(CodecError::DuplicateIdentifier(id.clone()));
                    }
                    items.push(Item::Valid(message));
                }
                Err(err) => {
                    match &err {
                        CodecError::Configuration(_) => {
                            warn!(index, error = %err, "codec configuration error in streamed element");
                        }
                        _ => debug!(index, error = %err, "rejecting streamed element"),
                    }
                    items.push(Item::Invalid(err));
                }
            }
            index += 1;
        }
        if items.is_empty() {
            return Err(empty_batch_error());
        }
        Ok(Data::Batch(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ProtocolLevel;
    use crate::contract::{RequestContract, ResponseContract, ValueType};
    use futures::stream;
    use serde_json::json;

    fn codec() -> JsonRpcCodec {
        let mut codec = JsonRpcCodec::new(ProtocolLevel::Level2);
        codec.register_request_contract(
            "subtract",
            RequestContract::by_position(vec![
                ValueType::Integer.into(),
                ValueType::Integer.into(),
            ])
            .unwrap(),
        );
        codec.register_response_contract(
            "subtract",
            ResponseContract::new().with_result(ValueType::Integer),
        );
        codec
    }

    #[tokio::test]
    async fn test_stream_decode_matches_slice_decode() {
        let codec = codec();
        let elements = vec![
            json!({"jsonrpc":"2.0","method":"subtract","params":[42,23],"id":1}),
            json!({"jsonrpc":"2.0","method":"subtract","params":[1],"id":2}),
            json!({"jsonrpc":"2.0","method":"subtract","params":[9,4],"id":3}),
        ];

        let streamed = codec
            .decode_request_stream(stream::iter(elements.clone()))
            .await
            .unwrap();
        let sliced = codec
            .decode_request_value(&Value::Array(elements))
            .unwrap();

        let streamed_items = streamed.batch_items().unwrap();
        let sliced_items = sliced.batch_items().unwrap();
        assert_eq!(streamed_items.len(), sliced_items.len());
        for (a, b) in streamed_items.iter().zip(sliced_items) {
            assert_eq!(a.is_valid(), b.is_valid());
        }
        assert_eq!(
            streamed_items[0].value().unwrap(),
            sliced_items[0].value().unwrap()
        );
    }

    #[tokio::test]
    async fn test_stream_decode_empty_fails() {
        let codec = codec();
        let err = codec
            .decode_request_stream(stream::iter(Vec::<Value>::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, CodecError::Structural(_)));
    }

    #[tokio::test]
    async fn test_stream_decode_duplicate_identifier_aborts() {
        let codec = codec();
        let elements = vec![
            json!({"jsonrpc":"2.0","method":"subtract","params":[1,2],"id":"a"}),
            json!({"jsonrpc":"2.0","method":"subtract","params":[3,4],"id":"a"}),
        ];
        let err = codec
            .decode_request_stream(stream::iter(elements))
            .await
            .unwrap_err();
        assert!(matches!(err, CodecError::DuplicateIdentifier(_)));
    }

    #[tokio::test]
    async fn test_stream_decode_non_object_element_aborts() {
        let codec = codec();
        let elements = vec![
            json!({"jsonrpc":"2.0","method":"subtract","params":[1,2],"id":1}),
            json!("nope"),
        ];
        let err = codec
            .decode_request_stream(stream::iter(elements))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("element 1"));
    }

    #[tokio::test]
    async fn test_stream_decode_responses() {
        let mut codec = codec();
        codec
            .bindings_mut()
            .bind_method(MessageId::Integer(1), "subtract");
        codec
            .bindings_mut()
            .bind_method(MessageId::Integer(2), "subtract");

        let elements = vec![
            json!({"jsonrpc":"2.0","result":19,"id":1}),
            json!({"jsonrpc":"2.0","result":5,"id":2}),
        ];
        let data = codec
            .decode_response_stream(stream::iter(elements))
            .await
            .unwrap();
        let items = data.batch_items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].value().unwrap().result(), Some(&json!(5)));
    }
}
