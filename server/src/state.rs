//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds no document itself: the document lives inside the registry
//! task, and handlers reach it through the cloneable `RegistryHandle`.

use std::sync::Arc;

use crate::services::auth::Authenticator;
use crate::services::registry::RegistryHandle;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; every field is a handle.
#[derive(Clone)]
pub struct AppState {
    pub registry: RegistryHandle,
    pub auth: Arc<dyn Authenticator>,
    /// Outbound queue depth for each new session.
    pub client_buffer: usize,
}

impl AppState {
    #[must_use]
    pub fn new(registry: RegistryHandle, auth: Arc<dyn Authenticator>, client_buffer: usize) -> Self {
        Self { registry, auth, client_buffer }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;
