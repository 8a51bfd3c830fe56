//! # FUN Wallet bridge protocol
//!
//! Wire types shared by the inpage provider and the content-script bridge:
//!
//! - the message shapes crossing the page's `postMessage` bus
//!   ([`BridgeRequest`], [`BridgeResponse`], [`BridgeEvent`])
//! - the provider error type with the DApp-facing numeric codes
//!   ([`ProviderError`], [`ErrorCode`])
//! - the [`RawError`] union that normalizes untrusted error shapes at the
//!   boundary
//! - [EIP-6963](https://eips.ethereum.org/EIPS/eip-6963) discovery
//!   announcements and the wallet's fixed identity
//! - the [`PageBus`] seam over which page and content script exchange
//!   structured-clone messages

mod bus;
mod discovery;
mod error;
mod id;
mod message;
mod response;
mod sanitize;

pub use bus::{InMemoryBus, PageBus};
pub use discovery::{
    ANNOUNCE_EVENT, REQUEST_PROVIDER_EVENT, ProviderAnnouncement, ProviderInfo,
    is_request_provider,
};
pub use error::{ErrorCode, ProviderError, RawError};
pub use id::RequestIdProvider;
pub use message::{BRIDGE_CHANNEL, BridgeEvent, BridgeRequest, BridgeResponse, Direction, WalletEvent};
pub use response::ResponseResult;
pub use sanitize::sanitized;

/// Returns whether `value` has the shape of a transaction hash: a `0x`
/// prefix followed by at least one hex digit.
///
/// Completion pushes claiming success must carry such a value; anything else
/// is a protocol violation and is never forwarded to the page as a result.
pub fn is_tx_hash_shaped(value: &str) -> bool {
    match value.strip_prefix("0x") {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}
