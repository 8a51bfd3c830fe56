//! EIP-6963 multi-wallet discovery shapes
//!
//! Pages enumerate wallets by listening for announcement events and may ask
//! for re-announcement at any time. The four identity fields are this
//! wallet's public identity and must be stable across reinjection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event type under which providers announce themselves.
pub const ANNOUNCE_EVENT: &str = "eip6963:announceProvider";

/// Event type pages dispatch to ask installed wallets to re-announce.
pub const REQUEST_PROVIDER_EVENT: &str = "eip6963:requestProvider";

/// The wallet identity carried by every announcement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub uuid: String,
    pub name: String,
    pub icon: String,
    pub rdns: String,
}

impl ProviderInfo {
    /// FUN Wallet's fixed identity.
    pub fn fun_wallet() -> Self {
        Self {
            uuid: "350670db-19fa-4704-a166-e52e178b59d2".to_string(),
            name: "FUN Wallet".to_string(),
            icon: "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHZpZXdCb3g9IjAgMCAzMiAzMiI+PHJlY3Qgd2lkdGg9IjMyIiBoZWlnaHQ9IjMyIiByeD0iNiIgZmlsbD0iIzZDNUNFNyIvPjxwYXRoIGQ9Ik05IDIzVjloMTR2M2gtMTB2M2g4djNoLTh2NXoiIGZpbGw9IiNmZmYiLz48L3N2Zz4=".to_string(),
            rdns: "com.funwallet.extension".to_string(),
        }
    }
}

/// An announcement message as posted on the page bus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAnnouncement {
    pub event: String,
    pub info: ProviderInfo,
}

impl ProviderAnnouncement {
    pub fn new(info: ProviderInfo) -> Self {
        Self { event: ANNOUNCE_EVENT.to_string(), info }
    }

    pub fn from_page_message(msg: &Value) -> Option<Self> {
        let ann: Self = serde_json::from_value(msg.clone()).ok()?;
        (ann.event == ANNOUNCE_EVENT).then_some(ann)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("serialization can't fail")
    }
}

/// Returns whether a bus message is a page-dispatched request for providers
/// to re-announce.
pub fn is_request_provider(msg: &Value) -> bool {
    msg.get("event").and_then(Value::as_str) == Some(REQUEST_PROVIDER_EVENT)
}
