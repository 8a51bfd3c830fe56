//! Correlation id generation
use rand::{Rng, distr::Alphanumeric, rng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Provides correlation ids built from the current time and a random suffix.
///
/// Ids only need to be unique within one page session; the timestamp prefix
/// keeps them monotonic enough to read in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestIdProvider {
    len: usize,
}

impl RequestIdProvider {
    /// Generates the next correlation id.
    pub fn next_id(&self) -> String {
        let millis =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        let salt: String =
            rng().sample_iter(Alphanumeric).map(char::from).take(self.len).collect();
        format!("{millis}-{salt}")
    }
}

impl Default for RequestIdProvider {
    fn default() -> Self {
        Self { len: 8 }
    }
}
