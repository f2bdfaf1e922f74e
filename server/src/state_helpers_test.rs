use super::*;
use crate::services::auth::StaticCredentials;
use crate::services::registry::spawn_registry;
use scene::Document;

pub const TEST_USERS: [(&str, &str); 2] = [("alice", "alice-token"), ("bob", "bob-token")];

/// `AppState` around a fresh registry seeded with the initial document.
#[must_use]
pub fn test_app_state() -> AppState {
    test_app_state_with_doc(Document::initial())
}

/// `AppState` around a fresh registry seeded with `doc`.
#[must_use]
pub fn test_app_state_with_doc(doc: Document) -> AppState {
    let (registry, _task) = spawn_registry(doc, 64);
    AppState::new(registry, Arc::new(StaticCredentials::from_secrets(TEST_USERS)), 64)
}
