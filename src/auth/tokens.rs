// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Issued-token lookup.
//!
//! Tokens are issued and revoked by an external credential service. This
//! module only answers "which user does this key belong to?" through the
//! [`CredentialStore`] trait.
//!
//! [`TokenDirectory`] keeps SHA-256 digests of the issued keys, never the
//! keys themselves. It can be loaded from a JSON file:
//!
//! ```json
//! [
//!   { "user_id": "alice", "token": "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b" },
//!   { "user_id": "bob", "token_sha256": "<base64 SHA-256 of the key>" }
//! ]
//! ```
//!
//! or, for development, from an inline `key=user_id,key=user_id` string.

use std::collections::HashMap;
use std::path::Path;

use base64ct::{Base64, Encoding};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::models::UserId;

type TokenDigest = [u8; 32];

/// Resolves opaque keys to user identities.
pub trait CredentialStore: Send + Sync {
    /// `None` when the key is unknown or revoked.
    fn resolve(&self, key: &str) -> Option<UserId>;
}

#[derive(Debug, thiserror::Error)]
pub enum TokenDirectoryError {
    #[error("failed to read token file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse token file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid token entry: {0}")]
    InvalidEntry(String),

    #[error("token for {existing} is also assigned to {conflicting}")]
    Conflict {
        existing: UserId,
        conflicting: UserId,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenEntry {
    user_id: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    token_sha256: Option<String>,
}

fn digest(key: &str) -> TokenDigest {
    Sha256::digest(key.as_bytes()).into()
}

/// Base64 SHA-256 digest of a key, the format used by `token_sha256`.
pub fn token_fingerprint(key: &str) -> String {
    Base64::encode_string(&digest(key))
}

/// A key must be one visible-ASCII word, as it travels in a header.
fn is_well_formed_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_graphic())
}

/// In-memory directory of issued tokens, keyed by digest.
#[derive(Debug, Default, Clone)]
pub struct TokenDirectory {
    by_digest: HashMap<TokenDigest, UserId>,
}

impl TokenDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_digest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_digest.is_empty()
    }

    /// Register a plaintext key.
    pub fn insert(
        &mut self,
        key: &str,
        user_id: impl Into<UserId>,
    ) -> Result<(), TokenDirectoryError> {
        if !is_well_formed_key(key) {
            return Err(TokenDirectoryError::InvalidEntry(
                "token must be non-empty visible ASCII without spaces".to_string(),
            ));
        }
        self.insert_digest(digest(key), user_id.into())
    }

    /// Register a key by its base64 SHA-256 digest.
    pub fn insert_fingerprint(
        &mut self,
        fingerprint: &str,
        user_id: impl Into<UserId>,
    ) -> Result<(), TokenDirectoryError> {
        let bytes = Base64::decode_vec(fingerprint.trim()).map_err(|e| {
            TokenDirectoryError::InvalidEntry(format!("token_sha256 is not base64: {e}"))
        })?;
        let digest: TokenDigest = bytes.try_into().map_err(|_| {
            TokenDirectoryError::InvalidEntry("token_sha256 must decode to 32 bytes".to_string())
        })?;
        self.insert_digest(digest, user_id.into())
    }

    fn insert_digest(
        &mut self,
        digest: TokenDigest,
        user_id: UserId,
    ) -> Result<(), TokenDirectoryError> {
        if user_id.as_str().trim().is_empty() {
            return Err(TokenDirectoryError::InvalidEntry(
                "user_id must not be empty".to_string(),
            ));
        }

        match self.by_digest.get(&digest) {
            Some(existing) if existing != &user_id => Err(TokenDirectoryError::Conflict {
                existing: existing.clone(),
                conflicting: user_id,
            }),
            Some(_) => Ok(()),
            None => {
                self.by_digest.insert(digest, user_id);
                Ok(())
            }
        }
    }

    /// Parse `key=user_id` pairs separated by commas.
    pub fn from_inline(spec: &str) -> Result<Self, TokenDirectoryError> {
        let mut directory = Self::new();
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, user_id) = pair.split_once('=').ok_or_else(|| {
                TokenDirectoryError::InvalidEntry(format!("expected key=user_id, got {pair:?}"))
            })?;
            directory.insert(key.trim(), user_id.trim())?;
        }
        Ok(directory)
    }

    /// Parse the JSON token file format.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, TokenDirectoryError> {
        let entries: Vec<TokenEntry> = serde_json::from_slice(bytes)?;
        let mut directory = Self::new();
        for entry in entries {
            match (entry.token, entry.token_sha256) {
                (Some(key), None) => directory.insert(&key, entry.user_id)?,
                (None, Some(fingerprint)) => {
                    directory.insert_fingerprint(&fingerprint, entry.user_id)?
                }
                _ => {
                    return Err(TokenDirectoryError::InvalidEntry(format!(
                        "entry for {} needs exactly one of token or token_sha256",
                        entry.user_id
                    )))
                }
            }
        }
        Ok(directory)
    }

    /// Load the JSON token file format from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, TokenDirectoryError> {
        let bytes = std::fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    /// Merge another directory into this one.
    pub fn merge(&mut self, other: TokenDirectory) -> Result<(), TokenDirectoryError> {
        for (digest, user_id) in other.by_digest {
            self.insert_digest(digest, user_id)?;
        }
        Ok(())
    }
}

impl CredentialStore for TokenDirectory {
    fn resolve(&self, key: &str) -> Option<UserId> {
        if !is_well_formed_key(key) {
            return None;
        }
        self.by_digest.get(&digest(key)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_registered_keys_only() {
        let mut directory = TokenDirectory::new();
        directory.insert("key-alice", "alice").unwrap();

        assert_eq!(
            directory.resolve("key-alice"),
            Some(UserId::from("alice"))
        );
        assert_eq!(directory.resolve("invalid_token"), None);
        assert_eq!(directory.resolve(""), None);
    }

    #[test]
    fn fingerprint_entries_resolve_like_plain_keys() {
        let mut directory = TokenDirectory::new();
        directory
            .insert_fingerprint(&token_fingerprint("secret"), "bob")
            .unwrap();

        assert_eq!(directory.resolve("secret"), Some(UserId::from("bob")));
    }

    #[test]
    fn rejects_malformed_fingerprints_and_keys() {
        let mut directory = TokenDirectory::new();
        assert!(directory.insert_fingerprint("%%%", "bob").is_err());
        assert!(directory
            .insert_fingerprint(&Base64::encode_string(b"short"), "bob")
            .is_err());
        assert!(directory.insert("has space", "bob").is_err());
        assert!(directory.insert("ok", "  ").is_err());
        assert!(directory.is_empty());
    }

    #[test]
    fn same_key_for_two_users_is_a_conflict() {
        let mut directory = TokenDirectory::new();
        directory.insert("shared", "alice").unwrap();
        directory.insert("shared", "alice").unwrap();

        let err = directory.insert("shared", "bob").unwrap_err();
        assert!(matches!(err, TokenDirectoryError::Conflict { .. }));
    }

    #[test]
    fn parses_inline_pairs() {
        let directory = TokenDirectory::from_inline(" k1=alice, k2=bob ,").unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.resolve("k2"), Some(UserId::from("bob")));

        assert!(TokenDirectory::from_inline("no-separator").is_err());
    }

    #[test]
    fn parses_json_file_format() {
        let json = format!(
            r#"[
                {{"user_id": "alice", "token": "plain"}},
                {{"user_id": "bob", "token_sha256": "{}"}}
            ]"#,
            token_fingerprint("hashed")
        );

        let directory = TokenDirectory::from_json_slice(json.as_bytes()).unwrap();
        assert_eq!(directory.resolve("plain"), Some(UserId::from("alice")));
        assert_eq!(directory.resolve("hashed"), Some(UserId::from("bob")));
    }

    #[test]
    fn json_entries_need_exactly_one_credential() {
        let both = br#"[{"user_id": "a", "token": "x", "token_sha256": "y"}]"#;
        assert!(TokenDirectory::from_json_slice(both).is_err());

        let neither = br#"[{"user_id": "a"}]"#;
        assert!(TokenDirectory::from_json_slice(neither).is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, br#"[{"user_id": "alice", "token": "from-file"}]"#).unwrap();

        let directory = TokenDirectory::from_json_file(&path).unwrap();
        assert_eq!(
            directory.resolve("from-file"),
            Some(UserId::from("alice"))
        );
    }

    #[test]
    fn merge_combines_directories() {
        let mut first = TokenDirectory::from_inline("a=alice").unwrap();
        let second = TokenDirectory::from_inline("b=bob").unwrap();
        first.merge(second).unwrap();
        assert_eq!(first.len(), 2);

        let clash = TokenDirectory::from_inline("a=mallory").unwrap();
        assert!(first.merge(clash).is_err());
    }
}
