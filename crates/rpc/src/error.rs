//! Provider error bindings
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{borrow::Cow, fmt};

/// Represents a structured provider error as delivered to the page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    pub code: ErrorCode,
    /// error message
    pub message: Cow<'static, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ProviderError {
    /// New [`ProviderError`] with the given [`ErrorCode`].
    pub const fn new(code: ErrorCode) -> Self {
        Self { message: Cow::Borrowed(code.message()), code, data: None }
    }

    /// Creates a new `UserRejected` error.
    pub const fn user_rejected() -> Self {
        Self::new(ErrorCode::UserRejected)
    }

    /// Creates a new `UserRejected` error with a message.
    pub fn user_rejected_with<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self { code: ErrorCode::UserRejected, message: message.into().into(), data: None }
    }

    /// Creates a new `InternalError` error.
    pub const fn internal_error() -> Self {
        Self::new(ErrorCode::InternalError)
    }

    /// Creates a new `InternalError` error with a message.
    pub fn internal_error_with<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self { code: ErrorCode::InternalError, message: message.into().into(), data: None }
    }

    /// Creates a new `Disconnected` error with its fixed payload.
    pub const fn disconnected() -> Self {
        Self::new(ErrorCode::Disconnected)
    }

    /// Creates the error a request is rejected with when no matching
    /// response arrived within the provider's timeout window.
    pub const fn timeout() -> Self {
        Self {
            code: ErrorCode::InternalError,
            message: Cow::Borrowed("Request timed out"),
            data: None,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for ProviderError {}

/// List of provider error codes
///
/// The numeric values are part of the DApp-facing contract and must stay
/// stable, see <https://eips.ethereum.org/EIPS/eip-1193#provider-errors>.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// The user rejected the request, or the request requires explicit user
    /// approval before it can complete.
    UserRejected,
    /// internal call error
    InternalError,
    /// The provider is disconnected from all chains.
    Disconnected,
    /// Used for any other code observed on the wire.
    ServerError(i64),
}

impl ErrorCode {
    /// Returns the error code as `i64`
    pub const fn code(&self) -> i64 {
        match *self {
            Self::UserRejected => 4001,
            Self::InternalError => -32603,
            Self::Disconnected => 4900,
            Self::ServerError(c) => c,
        }
    }

    /// Returns the message associated with the error
    pub const fn message(&self) -> &'static str {
        match *self {
            Self::UserRejected => "User rejected the request",
            Self::InternalError => "Internal error",
            Self::Disconnected => "Disconnected",
            Self::ServerError(_) => "Server error",
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}

impl<'a> Deserialize<'a> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'a>,
    {
        i64::deserialize(deserializer).map(Into::into)
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        match code {
            4001 => Self::UserRejected,
            -32603 => Self::InternalError,
            4900 => Self::Disconnected,
            _ => Self::ServerError(code),
        }
    }
}

/// An error shape as observed on the wire, before normalization.
///
/// The background and page buses carry dynamically shaped errors: either a
/// bare string or a structured `{code, message, data?}` object. Inbound
/// errors are parsed into this union once at the boundary so downstream
/// logic never re-inspects raw JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawError {
    /// structured `{code, message, data?}` error object
    Structured {
        code: i64,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },
    /// bare string error
    Message(String),
}

impl RawError {
    /// Returns the numeric code, if this is a structured error.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Structured { code, .. } => Some(*code),
            Self::Message(_) => None,
        }
    }

    /// Normalizes an error from an immediate background reply.
    ///
    /// Structured errors pass through; bare strings come from the transport
    /// layer and are wrapped with the internal error code.
    pub fn into_response_error(self) -> ProviderError {
        match self {
            Self::Structured { code, message, data } => {
                ProviderError { code: code.into(), message: message.into(), data }
            }
            Self::Message(message) => ProviderError::internal_error_with(message),
        }
    }

    /// Normalizes an error carried by a completion push.
    ///
    /// A bare string means the user rejected the transaction and maps to the
    /// fixed 4001 code; any other shape is treated as an internal error.
    pub fn into_rejection(self) -> ProviderError {
        match self {
            Self::Message(message) => ProviderError::user_rejected_with(message),
            Self::Structured { .. } => ProviderError::internal_error(),
        }
    }
}

impl From<ProviderError> for RawError {
    fn from(err: ProviderError) -> Self {
        Self::Structured { code: err.code.code(), message: err.message.into_owned(), data: err.data }
    }
}
