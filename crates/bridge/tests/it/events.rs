//! Wallet event propagation and provider injection

use crate::utils::harness;
use funwallet_bridge::BackgroundPush;
use funwallet_provider::ProviderConfig;
use funwallet_rpc::WalletEvent;
use serde_json::{Value, json};
use similar_asserts::assert_eq;
use std::time::Duration;

#[tokio::test]
async fn chain_changed_reaches_the_page() {
    let mut h = harness();

    h.background.push(BackgroundPush::ChainChanged { chain_id: "0x38".to_string() });

    let event = h.next_event().await;
    assert_eq!(event.event, WalletEvent::ChainChanged);
    assert_eq!(event.data, json!("0x38"));
}

#[tokio::test]
async fn accounts_changed_reaches_the_page() {
    let mut h = harness();

    h.background.push(BackgroundPush::AccountsChanged {
        accounts: vec!["0x1111111111111111111111111111111111111111".to_string()],
    });

    let event = h.next_event().await;
    assert_eq!(event.event, WalletEvent::AccountsChanged);
    assert_eq!(event.data, json!(["0x1111111111111111111111111111111111111111"]));
}

#[tokio::test]
async fn connect_carries_the_chain_id() {
    let mut h = harness();

    h.background.push(BackgroundPush::Connect { chain_id: "0x1".to_string() });

    let event = h.next_event().await;
    assert_eq!(event.event, WalletEvent::Connect);
    assert_eq!(event.data, json!({"chainId": "0x1"}));
}

#[tokio::test]
async fn disconnect_payload_is_fixed_regardless_of_reason() {
    let mut h = harness();

    h.background.push(BackgroundPush::Disconnect {
        reason: json!({"code": 1, "detail": "wallet locked", "extra": [1, 2, 3]}),
    });

    let event = h.next_event().await;
    assert_eq!(event.event, WalletEvent::Disconnect);
    assert_eq!(event.data, json!({"code": 4900, "message": "Disconnected"}));
}

#[tokio::test]
async fn events_update_injected_provider_state() {
    let h = harness();
    let injection = h.bridge.inject_provider(ProviderConfig::default()).unwrap();
    let provider = injection.provider;

    h.background.push(BackgroundPush::ChainChanged { chain_id: "0x38".to_string() });
    while provider.chain_id().is_none() {
        tokio::task::yield_now().await;
    }
    assert_eq!(provider.chain_id().as_deref(), Some("0x38"));
    assert_eq!(provider.network_version().as_deref(), Some("56"));

    h.background.push(BackgroundPush::AccountsChanged {
        accounts: vec![
            "0x1111111111111111111111111111111111111111".to_string(),
            "0x2222222222222222222222222222222222222222".to_string(),
        ],
    });
    while provider.selected_address().is_none() {
        tokio::task::yield_now().await;
    }
    assert_eq!(
        provider.selected_address().as_deref(),
        Some("0x1111111111111111111111111111111111111111")
    );
}

#[tokio::test]
async fn disconnect_listener_sees_fixed_payload() {
    let h = harness();
    let injection = h.bridge.inject_provider(ProviderConfig::default()).unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel::<Value>();
    let tx = parking_lot::Mutex::new(Some(tx));
    injection.provider.on(
        "disconnect",
        std::sync::Arc::new(move |data| {
            if let Some(tx) = tx.lock().take() {
                let _ = tx.send(data.clone());
            }
        }),
    );

    h.background.push(BackgroundPush::Disconnect { reason: Value::Null });

    let data = tokio::time::timeout(Duration::from_secs(1), rx).await.unwrap().unwrap();
    assert_eq!(data, json!({"code": 4900, "message": "Disconnected"}));
}

#[tokio::test]
async fn provider_is_injected_at_most_once() {
    let h = harness();

    assert!(h.bridge.inject_provider(ProviderConfig::default()).is_some());
    assert!(h.bridge.inject_provider(ProviderConfig::default()).is_none());
    assert!(h.bridge.inject_provider(ProviderConfig::default()).is_none());
}
