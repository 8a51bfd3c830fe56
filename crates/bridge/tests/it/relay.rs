//! Request relaying and error normalization

use crate::utils::{MockReply, ORIGIN, harness};
use funwallet_provider::ProviderConfig;
use funwallet_rpc::{PageBus, RawError, ResponseResult};
use serde_json::json;
use similar_asserts::assert_eq;

#[tokio::test]
async fn relays_request_and_response() {
    let mut h = harness();
    h.background.respond_to("eth_chainId", MockReply::Respond(ResponseResult::success(json!("0x38"))));

    h.send("id-1", "eth_chainId", json!([]));

    let resp = h.next_response().await;
    assert_eq!(resp.id, "id-1");
    assert_eq!(resp.result, Some(json!("0x38")));
    assert_eq!(resp.error, None);
}

#[tokio::test]
async fn forwards_id_method_params_and_origin() {
    let mut h = harness();
    h.background.respond_to("eth_getBalance", MockReply::Respond(ResponseResult::success(json!("0x0"))));

    h.send("id-2", "eth_getBalance", json!(["0x1111111111111111111111111111111111111111", "latest"]));
    h.next_response().await;

    let seen = h.background.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].id, "id-2");
    assert_eq!(seen[0].method, "eth_getBalance");
    assert_eq!(seen[0].params, json!(["0x1111111111111111111111111111111111111111", "latest"]));
    assert_eq!(seen[0].origin, ORIGIN);
}

#[tokio::test]
async fn structured_errors_pass_through() {
    let mut h = harness();
    h.background.respond_to(
        "eth_call",
        MockReply::Respond(ResponseResult::error(RawError::Structured {
            code: -32000,
            message: "execution reverted".to_string(),
            data: Some(json!("0x08c379a0")),
        })),
    );

    h.send("id-3", "eth_call", json!([{}]));

    let resp = h.next_response().await;
    let error = resp.error.unwrap();
    assert_eq!(error.code(), Some(-32000));
    assert_eq!(
        serde_json::to_value(&error).unwrap(),
        json!({"code": -32000, "message": "execution reverted", "data": "0x08c379a0"})
    );
}

#[tokio::test]
async fn bare_string_errors_are_wrapped_as_internal() {
    let mut h = harness();
    h.background.respond_to(
        "eth_accounts",
        MockReply::Respond(ResponseResult::error(RawError::Message("port closed".to_string()))),
    );

    h.send("id-4", "eth_accounts", json!([]));

    let resp = h.next_response().await;
    assert_eq!(
        serde_json::to_value(resp.error.unwrap()).unwrap(),
        json!({"code": -32603, "message": "port closed"})
    );
}

#[tokio::test]
async fn transport_error_text_is_wrapped_as_internal() {
    let mut h = harness();
    h.background.respond_to(
        "eth_estimateGas",
        MockReply::Fail("message port closed before a response was received".to_string()),
    );

    h.send("id-err", "eth_estimateGas", json!([{}]));

    let resp = h.next_response().await;
    assert_eq!(
        serde_json::to_value(resp.error.unwrap()).unwrap(),
        json!({"code": -32603, "message": "message port closed before a response was received"})
    );
}

#[tokio::test]
async fn transport_failures_are_normalized() {
    let mut h = harness();
    // no reply registered, the transport reports the extension as unreachable
    h.send("id-5", "eth_blockNumber", json!([]));

    let resp = h.next_response().await;
    assert_eq!(
        serde_json::to_value(resp.error.unwrap()).unwrap(),
        json!({"code": -32603, "message": "extension messaging unavailable"})
    );
}

#[tokio::test]
async fn malformed_bus_traffic_is_ignored() {
    let mut h = harness();
    h.background.respond_to("eth_chainId", MockReply::Respond(ResponseResult::success(json!("0x1"))));

    h.bus.post(json!("ping"));
    h.bus.post(json!({"source": "react-devtools", "payload": {}}));
    h.bus.post(json!({"channel": "funwallet-bridge", "direction": "from_inpage", "id": "", "method": "eth_chainId"}));
    h.send("id-6", "eth_chainId", json!([]));

    let resp = h.next_response().await;
    assert_eq!(resp.id, "id-6");
    // only the well-formed request reached the background
    assert_eq!(h.background.seen().len(), 1);
}

#[tokio::test]
async fn requests_posted_before_the_first_poll_are_not_lost() {
    let mut h = harness();
    h.background.respond_to("eth_chainId", MockReply::Respond(ResponseResult::success(json!("0x38"))));

    // post synchronously, before the relay task has ever been polled; the
    // bridge subscribed at spawn time so these must be buffered, not dropped
    h.send("early-1", "eth_chainId", json!([]));
    h.send("early-2", "eth_chainId", json!([]));

    let mut ids = [h.next_response().await.id, h.next_response().await.id];
    ids.sort();
    assert_eq!(ids, ["early-1".to_string(), "early-2".to_string()]);
}

#[tokio::test]
async fn slow_requests_do_not_block_others() {
    let mut h = harness();
    h.background.respond_to("eth_getLogs", MockReply::Hang);
    h.background.respond_to("eth_chainId", MockReply::Respond(ResponseResult::success(json!("0x38"))));

    h.send("id-slow", "eth_getLogs", json!([{}]));
    h.send("id-fast", "eth_chainId", json!([]));

    let resp = h.next_response().await;
    assert_eq!(resp.id, "id-fast");
    assert_eq!(resp.result, Some(json!("0x38")));
}

#[tokio::test]
async fn provider_round_trips_through_the_bridge() {
    let mut h = harness();
    h.background.respond_to("eth_chainId", MockReply::Respond(ResponseResult::success(json!("0x38"))));

    let injection = h.bridge.inject_provider(ProviderConfig::default()).unwrap();
    let result = injection.provider.request("eth_chainId", json!([])).await.unwrap();
    assert_eq!(result, json!("0x38"));

    // the provider already consumed the response; the bus copy is still a
    // valid terminal message
    let resp = h.next_response().await;
    assert_eq!(resp.result, Some(json!("0x38")));
}
