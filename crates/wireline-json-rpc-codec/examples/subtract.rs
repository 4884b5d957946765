//! Subtract Codec Example
//!
//! Demonstrates the full decode/encode cycle for one method: register
//! contracts, decode a request, answer it, then decode the response on the
//! client side using a static identifier binding.

use wireline_json_rpc_codec::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut codec = JsonRpcCodec::new(ProtocolLevel::Level2);
    codec.register_request_contract(
        "subtract",
        RequestContract::by_position(vec![ValueType::Integer.into(), ValueType::Integer.into()])?,
    );
    codec.register_response_contract(
        "subtract",
        ResponseContract::new().with_result(ValueType::Integer),
    );

    // Server side: decode an incoming request.
    let incoming = r#"{"jsonrpc":"2.0","method":"subtract","params":[42,23],"id":1}"#;
    let decoded = codec.decode_request(incoming)?;
    let request = decoded.single()?.value()?;
    println!("method: {}", request.method);

    let minuend = request.param_at(0).and_then(|v| v.as_i64()).unwrap_or(0);
    let subtrahend = request.param_at(1).and_then(|v| v.as_i64()).unwrap_or(0);
    let answer = Response::success(request.id.clone(), (minuend - subtrahend).into());
    let outgoing = codec.encode_response(&answer)?;
    println!("response: {outgoing}");

    // Client side: bind the identifier so the response can be decoded.
    codec
        .bindings_mut()
        .bind_method(MessageId::Integer(1), "subtract");
    let parsed = codec.decode_response(&outgoing)?;
    let response = parsed.single()?.value()?;
    println!("result: {:?}", response.result());

    Ok(())
}
