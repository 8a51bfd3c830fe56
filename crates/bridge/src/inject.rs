//! Once-only inpage provider injection

use crate::{bridge::ContentBridge, transport::BackgroundTransport};
use funwallet_provider::{Injection, ProviderConfig};
use std::sync::{Arc, atomic::Ordering};
use tracing::{debug, warn};

impl<B: BackgroundTransport> ContentBridge<B> {
    /// Installs the inpage provider on the page this bridge serves.
    ///
    /// At most one provider per page: repeat calls (duplicate content-script
    /// execution, extension reload) are ignored and return `None`.
    pub fn inject_provider(&self, config: ProviderConfig) -> Option<Injection> {
        if self.injected.swap(true, Ordering::SeqCst) {
            warn!(target: "bridge", "provider already injected, ignoring");
            return None;
        }
        debug!(target: "bridge", "injecting inpage provider");
        Some(funwallet_provider::install(Arc::clone(&self.page), config))
    }
}
