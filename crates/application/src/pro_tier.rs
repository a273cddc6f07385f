//! Pro tier flagging by hashed access token.

use std::collections::HashSet;

use crate::hashing::sha256_hex;

/// Resolves whether a presented token belongs to the pro tier.
///
/// Only SHA-256 digests of valid tokens are held in memory.
#[derive(Debug, Clone, Default)]
pub struct ProTierVerifier {
    token_hashes: HashSet<String>,
}

impl ProTierVerifier {
    /// Creates a verifier from hex-encoded SHA-256 token digests.
    #[must_use]
    pub fn new<I, S>(token_hashes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            token_hashes: token_hashes
                .into_iter()
                .map(|hash| hash.as_ref().trim().to_ascii_lowercase())
                .filter(|hash| !hash.is_empty())
                .collect(),
        }
    }

    /// Returns `None` when no token was presented, otherwise whether it is valid.
    #[must_use]
    pub fn resolve(&self, token: Option<&str>) -> Option<bool> {
        let token = token.map(str::trim).filter(|token| !token.is_empty())?;
        Some(self.token_hashes.contains(&hash_token(token)))
    }
}

/// Computes the hex SHA-256 digest of a pro token.
#[must_use]
pub fn hash_token(raw_token: &str) -> String {
    sha256_hex(raw_token)
}
