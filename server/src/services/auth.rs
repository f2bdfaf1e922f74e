//! Credential check for websocket upgrades.
//!
//! Secrets are never stored; the server holds the SHA-256 hex digest of each
//! user's token and compares digests.

use std::collections::HashMap;

pub use scene::credential::{hash_secret, is_digest};

/// Decides whether a connection may join.
pub trait Authenticator: Send + Sync {
    /// Returns the authenticated username, or `None` to refuse.
    fn authenticate(&self, user: &str, secret: &str) -> Option<String>;
}

/// Fixed username → digest table loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    digests: HashMap<String, String>,
}

impl StaticCredentials {
    #[must_use]
    pub fn new(digests: HashMap<String, String>) -> Self {
        let digests = digests.into_iter().map(|(user, digest)| (user, digest.to_ascii_lowercase())).collect();
        Self { digests }
    }

    /// Table built from plaintext secrets.
    #[cfg(test)]
    #[must_use]
    pub fn from_secrets<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let digests = pairs.into_iter().map(|(user, secret)| (user.to_owned(), hash_secret(secret))).collect();
        Self { digests }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

impl Authenticator for StaticCredentials {
    fn authenticate(&self, user: &str, secret: &str) -> Option<String> {
        let expected = self.digests.get(user)?;
        digests_match(expected, &hash_secret(secret)).then(|| user.to_owned())
    }
}

// Length-then-xor fold so the comparison time does not depend on where the
// first mismatch is.
fn digests_match(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
