// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! This module provides token authentication for the Todo API.
//!
//! ## Auth Flow
//!
//! 1. An external credential service issues an opaque key per user
//! 2. Clients send `Authorization: Token <key>`
//! 3. The server:
//!    - Parses the header (keyword matched case-insensitively)
//!    - Looks up the key's SHA-256 digest in the [`CredentialStore`]
//!    - Yields the owning `user_id`, or rejects with 401
//!
//! ## Security
//!
//! - All `/api` endpoints require authentication
//! - Plaintext keys are not retained after the directory is loaded
//! - 401 responses carry `WWW-Authenticate: Token`

pub mod claims;
pub mod error;
pub mod extractor;
pub mod tokens;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::Auth;
pub use tokens::{CredentialStore, TokenDirectory, TokenDirectoryError};

/// Authorization header keyword.
pub const TOKEN_KEYWORD: &str = "Token";
