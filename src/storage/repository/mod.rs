// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed, owner-scoped access to a [`TodoStore`].
//!
//! [`TodoStore`]: super::TodoStore

pub mod todos;

pub use todos::{NewTodo, Todo, TodoChanges, TodoError, TodoId, TodoRepository, TITLE_MAX_CHARS};
