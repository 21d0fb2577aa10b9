// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated user representation.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::UserId;

/// Identity resolved from a request token.
///
/// Handlers receive this through the [`Auth`](super::Auth) extractor and pass
/// `user_id` explicitly into every store operation.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Canonical user identifier
    pub user_id: UserId,
}

impl AuthenticatedUser {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
