//! Message shapes crossing the page's `postMessage` bus.
//!
//! The bus is shared with arbitrary page traffic, so every bridge message is
//! tagged with [`BRIDGE_CHANNEL`] and a [`Direction`]; anything that does not
//! carry both tags is foreign and is silently ignored.

use crate::error::{ProviderError, RawError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Channel tag identifying all bridge traffic on the page's message bus.
pub const BRIDGE_CHANNEL: &str = "funwallet-bridge";

/// Which way a bus message is headed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// page -> content script request
    #[serde(rename = "from_inpage")]
    FromInpage,
    /// content script -> page terminal response
    #[serde(rename = "to_inpage")]
    ToInpage,
    /// content script -> page wallet event
    #[serde(rename = "to_inpage_event")]
    ToInpageEvent,
}

/// A single RPC call as posted by the inpage provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub channel: String,
    pub direction: Direction,
    /// Correlation id, unique for the lifetime of the page session.
    pub id: String,
    pub method: String,
    /// Passed through untouched, only sanitized for logging.
    #[serde(default)]
    pub params: Value,
}

impl BridgeRequest {
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: Value) -> Self {
        Self {
            channel: BRIDGE_CHANNEL.to_string(),
            direction: Direction::FromInpage,
            id: id.into(),
            method: method.into(),
            params,
        }
    }

    /// Parses a raw bus message into a page-originated request.
    ///
    /// Returns `None` for anything that is not a well-formed, page-originated
    /// bridge request: unrelated traffic shares the bus and is not an error.
    pub fn from_page_message(msg: &Value) -> Option<Self> {
        let req: Self = serde_json::from_value(msg.clone()).ok()?;
        (req.channel == BRIDGE_CHANNEL
            && req.direction == Direction::FromInpage
            && !req.id.is_empty()
            && !req.method.is_empty())
        .then_some(req)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("serialization can't fail")
    }
}

/// A terminal response for a single request id, exactly one of `result` or
/// `error`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub channel: String,
    pub direction: Direction,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RawError>,
}

impl BridgeResponse {
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        Self {
            channel: BRIDGE_CHANNEL.to_string(),
            direction: Direction::ToInpage,
            id: id.into(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: impl Into<String>, error: ProviderError) -> Self {
        Self {
            channel: BRIDGE_CHANNEL.to_string(),
            direction: Direction::ToInpage,
            id: id.into(),
            result: None,
            error: Some(error.into()),
        }
    }

    /// Parses a raw bus message into a page-bound response, ignoring
    /// everything else on the bus.
    pub fn from_page_message(msg: &Value) -> Option<Self> {
        let resp: Self = serde_json::from_value(msg.clone()).ok()?;
        (resp.channel == BRIDGE_CHANNEL && resp.direction == Direction::ToInpage && !resp.id.is_empty())
            .then_some(resp)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("serialization can't fail")
    }
}

/// Wallet events the bridge re-emits into the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    #[serde(rename = "chainChanged")]
    ChainChanged,
    #[serde(rename = "accountsChanged")]
    AccountsChanged,
    #[serde(rename = "disconnect")]
    Disconnect,
    #[serde(rename = "connect")]
    Connect,
}

impl WalletEvent {
    /// The event name DApp listeners subscribe under.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ChainChanged => "chainChanged",
            Self::AccountsChanged => "accountsChanged",
            Self::Disconnect => "disconnect",
            Self::Connect => "connect",
        }
    }
}

/// A wallet-originated event message, page bound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeEvent {
    pub channel: String,
    pub direction: Direction,
    pub event: WalletEvent,
    pub data: Value,
}

impl BridgeEvent {
    pub fn new(event: WalletEvent, data: Value) -> Self {
        Self {
            channel: BRIDGE_CHANNEL.to_string(),
            direction: Direction::ToInpageEvent,
            event,
            data,
        }
    }

    /// The `disconnect` event always carries this fixed payload, regardless
    /// of what the background supplied.
    pub fn disconnect() -> Self {
        let err = ProviderError::disconnected();
        Self::new(
            WalletEvent::Disconnect,
            serde_json::json!({ "code": err.code.code(), "message": err.message }),
        )
    }

    pub fn from_page_message(msg: &Value) -> Option<Self> {
        let event: Self = serde_json::from_value(msg.clone()).ok()?;
        (event.channel == BRIDGE_CHANNEL && event.direction == Direction::ToInpageEvent)
            .then_some(event)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("serialization can't fail")
    }
}
