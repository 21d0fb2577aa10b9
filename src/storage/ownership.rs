// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for all storage operations.
//!
//! Every record read or mutation on behalf of a user passes through these
//! checks. A record owned by someone else is reported exactly like a record
//! that does not exist, so callers cannot probe for other users' ids.

use crate::models::UserId;

use super::{StorageError, StorageResult};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owner's user ID.
    fn owner_user_id(&self) -> &UserId;

    /// Identifier used in not-found messages.
    fn resource_label(&self) -> String;
}

/// Trait for enforcing ownership on storage operations.
pub trait OwnershipEnforcer {
    /// Verify that the user owns this resource.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` if the user doesn't own the resource.
    fn verify_ownership(&self, user_id: &UserId) -> StorageResult<()>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(&self, user_id: &UserId) -> StorageResult<()> {
        if self.owner_user_id() == user_id {
            Ok(())
        } else {
            tracing::debug!(
                requester = %user_id,
                resource = %self.resource_label(),
                "Ownership check failed, reporting as not found"
            );
            Err(StorageError::NotFound(self.resource_label()))
        }
    }
}

/// Ownership verification on optional lookups.
pub trait OwnershipCheck<T> {
    /// Verify ownership and return the resource if authorized.
    fn verify_owner(self, user_id: &UserId) -> StorageResult<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn verify_owner(self, user_id: &UserId) -> StorageResult<T> {
        match self {
            Some(resource) => {
                resource.verify_ownership(user_id)?;
                Ok(resource)
            }
            None => Err(StorageError::NotFound("resource".to_string())),
        }
    }
}
