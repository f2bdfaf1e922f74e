//! Credential digests shared by the server's check and the CLI's `hash`
//! command. Both sides must agree on the exact text form.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `secret`.
#[must_use]
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    let bytes = hasher.finalize();
    bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
}

/// Whether `s` looks like a digest produced by [`hash_secret`].
#[must_use]
pub fn is_digest(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
#[path = "credential_test.rs"]
mod credential_test;
