//! The extension-runtime transport seam

use funwallet_rpc::{RawError, ResponseResult};
use futures::channel::mpsc::UnboundedReceiver;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A page request as relayed to the background wallet core.
///
/// The correlation id travels along so deferred outcomes can be pushed back
/// under the same key; the page origin lets the background attribute the
/// request in its approval UI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelayedRequest {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    pub origin: String,
}

/// Failures of the extension's internal message transport.
///
/// These never reach the page as-is; the bridge folds them into a normalized
/// internal error first.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("extension messaging unavailable")]
    Unavailable,
    #[error("{0}")]
    Message(String),
}

/// The channel to the extension background.
///
/// One immediate reply per request, plus a stream of out-of-band pushes
/// (approval completions and wallet events). Injected as a trait so the
/// protocol logic is testable against a scripted fake.
#[async_trait::async_trait]
pub trait BackgroundTransport: Send + Sync + 'static {
    /// Forwards a request and awaits the background's immediate reply.
    async fn request(&self, request: RelayedRequest) -> Result<ResponseResult, TransportError>;

    /// Subscribes to background-initiated pushes.
    fn pushes(&self) -> UnboundedReceiver<BackgroundPush>;
}

/// Out-of-band messages pushed by the background, dispatched by name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackgroundPush {
    /// Terminal outcome of an approval-gated request, keyed by the original
    /// correlation id.
    TransactionCompleted {
        request_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<RawError>,
    },
    /// The wallet switched chains.
    ChainChanged { chain_id: String },
    /// The selected account set changed.
    AccountsChanged { accounts: Vec<String> },
    /// The wallet (re)connected.
    Connect { chain_id: String },
    /// The wallet disconnected; the payload is discarded and replaced with
    /// the fixed disconnect shape before it reaches the page.
    Disconnect {
        #[serde(default)]
        reason: Value,
    },
}
