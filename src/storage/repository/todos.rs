// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Todo repository.
//!
//! Owns every rule about which fields a request may write. Operations take
//! the requester explicitly and apply, in order: input validation, ownership
//! check, field changes, audit stamps. The audit fields (`owner`,
//! `created_by`, `updated_by`, `created_at`, `updated_at`) are only ever set
//! here, from the requester and the clock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UserId;

use super::super::{OwnedResource, OwnershipCheck, OwnershipEnforcer, StorageError, TodoStore};

/// Todo identifier, allocated from a per-store sequence starting at 1.
pub type TodoId = u64;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Todo record as persisted by the backends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Sole user allowed to see or change this record
    pub owner: UserId,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Todo {
    fn owner_user_id(&self) -> &UserId {
        &self.owner
    }

    fn resource_label(&self) -> String {
        format!("Todo {}", self.id)
    }
}

/// Client-supplied fields for a new todo.
///
/// `Some(None)` marks a field sent as an explicit `null`.
#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub title: Option<Option<String>>,
    pub description: Option<String>,
    pub completed: Option<Option<bool>>,
}

/// Client-supplied changes to an existing todo. `None` means "leave as is";
/// `Some(None)` is an explicit `null`, which only `description` accepts.
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub completed: Option<Option<bool>>,
}

/// Errors surfaced by todo operations.
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// Missing, or owned by another user. The two are deliberately merged.
    #[error("Not found.")]
    NotFound,

    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for TodoError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(_) => TodoError::NotFound,
            other => TodoError::Storage(other),
        }
    }
}

impl TodoError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        TodoError::Validation {
            field,
            message: message.into(),
        }
    }
}

const TITLE_REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";

/// Collapse a supplied-or-absent field, rejecting an explicit `null`.
fn non_null<T>(field: &'static str, value: Option<Option<T>>) -> Result<Option<T>, TodoError> {
    match value {
        Some(None) => Err(TodoError::validation(field, NOT_NULL)),
        other => Ok(other.flatten()),
    }
}

/// Trim and check a title.
fn validate_title(title: Option<String>) -> Result<String, TodoError> {
    let Some(title) = title else {
        return Err(TodoError::validation("title", TITLE_REQUIRED));
    };

    let title = title.trim();
    if title.is_empty() {
        return Err(TodoError::validation("title", "This field may not be blank."));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(TodoError::validation(
            "title",
            format!("Ensure this field has no more than {TITLE_MAX_CHARS} characters."),
        ));
    }

    Ok(title.to_string())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.map(|d| d.trim().to_string())
}

/// Next `updated_at` stamp, strictly after `previous` even if the wall clock
/// has not moved (or moved backwards).
fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Validated form of [`TodoChanges`].
struct ValidChanges {
    title: Option<String>,
    description: Option<Option<String>>,
    completed: Option<bool>,
}

impl TodoChanges {
    fn validate(self, title_required: bool) -> Result<ValidChanges, TodoError> {
        let title = match non_null("title", self.title)? {
            Some(title) => Some(validate_title(Some(title))?),
            None if title_required => return Err(TodoError::validation("title", TITLE_REQUIRED)),
            None => None,
        };

        Ok(ValidChanges {
            title,
            description: self.description.map(normalize_description),
            completed: non_null("completed", self.completed)?,
        })
    }
}

/// Repository for todo operations on behalf of a requester.
pub struct TodoRepository<'a> {
    store: &'a dyn TodoStore,
}

impl<'a> TodoRepository<'a> {
    /// Create a new TodoRepository.
    pub fn new(store: &'a dyn TodoStore) -> Self {
        Self { store }
    }

    /// All todos owned by `requester`, newest first.
    pub fn list(&self, requester: &UserId) -> Result<Vec<Todo>, TodoError> {
        Ok(self.store.list_by_owner(requester)?)
    }

    /// A single todo, if it exists and belongs to `requester`.
    pub fn get(&self, requester: &UserId, id: TodoId) -> Result<Todo, TodoError> {
        Ok(self.store.get(id)?.verify_owner(requester)?)
    }

    /// Create a todo owned by `requester`.
    pub fn create(&self, requester: &UserId, input: NewTodo) -> Result<Todo, TodoError> {
        let title = validate_title(non_null("title", input.title)?)?;
        let description = normalize_description(input.description);
        let completed = non_null("completed", input.completed)?.unwrap_or(false);
        let now = Utc::now();

        let todo = self.store.insert(&mut |id| Todo {
            id,
            title: title.clone(),
            description: description.clone(),
            completed,
            owner: requester.clone(),
            created_by: requester.clone(),
            updated_by: requester.clone(),
            created_at: now,
            updated_at: now,
        })?;

        tracing::info!(todo_id = todo.id, user_id = %requester, "Todo created");
        Ok(todo)
    }

    /// Partial update: only supplied fields change.
    pub fn update(
        &self,
        requester: &UserId,
        id: TodoId,
        changes: TodoChanges,
    ) -> Result<Todo, TodoError> {
        let changes = changes.validate(false)?;
        self.apply(requester, id, changes)
    }

    /// Full update: `title` must be supplied.
    pub fn replace(
        &self,
        requester: &UserId,
        id: TodoId,
        changes: TodoChanges,
    ) -> Result<Todo, TodoError> {
        let changes = changes.validate(true)?;
        self.apply(requester, id, changes)
    }

    fn apply(
        &self,
        requester: &UserId,
        id: TodoId,
        changes: ValidChanges,
    ) -> Result<Todo, TodoError> {
        let todo = self.store.update(id, &mut |todo| {
            todo.verify_ownership(requester)?;

            if let Some(title) = &changes.title {
                todo.title = title.clone();
            }
            if let Some(description) = &changes.description {
                todo.description = description.clone();
            }
            if let Some(completed) = changes.completed {
                todo.completed = completed;
            }

            todo.updated_by = requester.clone();
            todo.updated_at = next_stamp(todo.updated_at);
            Ok(())
        })?;

        tracing::info!(todo_id = todo.id, user_id = %requester, "Todo updated");
        Ok(todo)
    }

    /// Permanently delete a todo owned by `requester`.
    pub fn delete(&self, requester: &UserId, id: TodoId) -> Result<(), TodoError> {
        self.store
            .delete(id, &mut |todo| todo.verify_ownership(requester))?;

        tracing::info!(todo_id = id, user_id = %requester, "Todo deleted");
        Ok(())
    }
}
