use crate::error::RawError;
use serde::{Deserialize, Serialize};

/// Represents the outcome of an immediate background reply, either success
/// or error.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub enum ResponseResult {
    #[serde(rename = "result")]
    Success(serde_json::Value),
    #[serde(rename = "error")]
    Error(RawError),
}

impl ResponseResult {
    pub fn success<S>(content: S) -> Self
    where
        S: Serialize + 'static,
    {
        Self::Success(serde_json::to_value(&content).expect("serialization can't fail"))
    }

    pub fn error(error: impl Into<RawError>) -> Self {
        Self::Error(error.into())
    }
}

impl From<RawError> for ResponseResult {
    fn from(err: RawError) -> Self {
        Self::Error(err)
    }
}
