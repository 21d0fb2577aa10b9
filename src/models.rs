// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `ToSchema` for OpenAPI documentation.
//!
//! ## User Identity Type
//!
//! The [`UserId`] newtype wraps the opaque identity resolved from a request
//! token. The API never accepts it from a request body; it only appears in
//! responses as the `created_by`/`updated_by` audit stamps.
//!
//! ## Read-only Fields
//!
//! Request bodies only declare the mutable todo fields. Anything else a client
//! sends (`id`, `created_at`, `created_by`, ...) is dropped during
//! deserialization rather than rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::storage::{NewTodo, Todo, TodoChanges, TodoId};

// =============================================================================
// User Identity Type
// =============================================================================

/// Opaque identity of an authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        UserId(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId(value.to_string())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

// =============================================================================
// Todo Models
// =============================================================================

/// A todo item as returned by the API.
///
/// The owner is not exposed; it always equals the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TodoResponse {
    /// Unique identifier assigned on creation.
    pub id: TodoId,
    /// Title of the todo item.
    pub title: String,
    /// Detailed description of the todo item.
    pub description: Option<String>,
    /// Whether the todo item is completed.
    pub completed: bool,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last modified.
    pub updated_at: DateTime<Utc>,
    /// User who created the item.
    pub created_by: UserId,
    /// User who last modified the item.
    pub updated_by: UserId,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
            created_by: todo.created_by,
            updated_by: todo.updated_by,
        }
    }
}

/// Request to create a new todo.
///
/// `title` is optional at the type level so a missing or `null` title is
/// reported as a field validation error instead of a body parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    /// Title of the todo item (required, at most 200 characters).
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = String)]
    pub title: Option<Option<String>>,
    /// Detailed description of the todo item.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the todo item is completed (defaults to false).
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<bool>)]
    pub completed: Option<Option<bool>>,
}

impl From<CreateTodoRequest> for NewTodo {
    fn from(request: CreateTodoRequest) -> Self {
        NewTodo {
            title: request.title,
            description: request.description,
            completed: request.completed,
        }
    }
}

/// Request to update an existing todo (PUT or PATCH).
///
/// An explicit `"description": null` clears the description, while an
/// omitted `description` leaves it untouched. `null` for `title` or
/// `completed` is kept so validation can reject it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    /// New title (required for PUT).
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    /// New description; `null` clears it.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// New completion state.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<bool>)]
    pub completed: Option<Option<bool>>,
}

impl From<UpdateTodoRequest> for TodoChanges {
    fn from(request: UpdateTodoRequest) -> Self {
        TodoChanges {
            title: request.title,
            description: request.description,
            completed: request.completed,
        }
    }
}

/// Distinguishes a field sent as `null` (`Some(None)`) from an absent one
/// (`None`, via `#[serde(default)]`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_from_and_into_string() {
        let from_str: UserId = "alice".into();
        assert_eq!(from_str.0, "alice");

        let from_string: UserId = String::from("bob").into();
        assert_eq!(from_string.as_str(), "bob");

        let to_string: String = UserId("carol".into()).into();
        assert_eq!(to_string, "carol");
    }

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let absent: UpdateTodoRequest = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert_eq!(absent.description, None);
        assert_eq!(absent.title, None);
        assert_eq!(absent.completed, Some(Some(true)));

        let cleared: UpdateTodoRequest = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: UpdateTodoRequest = serde_json::from_str(r#"{"description":"x"}"#).unwrap();
        assert_eq!(set.description, Some(Some("x".to_string())));

        let nulls: UpdateTodoRequest =
            serde_json::from_str(r#"{"title":null,"completed":null}"#).unwrap();
        assert_eq!(nulls.title, Some(None));
        assert_eq!(nulls.completed, Some(None));

        let create: CreateTodoRequest = serde_json::from_str(r#"{"title":null}"#).unwrap();
        assert_eq!(create.title, Some(None));
        assert_eq!(create.completed, None);
    }

    #[test]
    fn read_only_fields_in_request_are_ignored() {
        let request: UpdateTodoRequest = serde_json::from_str(
            r#"{"id":99,"created_by":"mallory","created_at":"2020-01-01T00:00:00Z","title":"t"}"#,
        )
        .unwrap();
        assert_eq!(request.title, Some(Some("t".to_string())));
    }

    #[test]
    fn response_omits_owner() {
        let now = Utc::now();
        let todo = Todo {
            id: 7,
            title: "Buy milk".to_string(),
            description: None,
            completed: false,
            owner: UserId::from("alice"),
            created_by: UserId::from("alice"),
            updated_by: UserId::from("alice"),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(TodoResponse::from(todo)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["created_by"], "alice");
        assert!(json.get("owner").is_none());
    }
}
