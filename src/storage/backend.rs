// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Storage backends for todo records.
//!
//! [`TodoStore`] is the seam between the todo repository and a concrete
//! storage engine. Backends know nothing about validation or audit stamps;
//! they guarantee that each call is one atomic unit. `update` and `delete`
//! take a callback that runs inside the same critical section (lock or write
//! transaction) as the mutation, so an ownership check and the write it
//! guards can never be separated by another writer.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::UserId;

use super::repository::{Todo, TodoId};
use super::{StorageError, StorageResult};

/// Atomic storage operations over todo records.
pub trait TodoStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;

    /// All records owned by `owner`, newest first.
    fn list_by_owner(&self, owner: &UserId) -> StorageResult<Vec<Todo>>;

    /// Look up a record by id regardless of owner.
    fn get(&self, id: TodoId) -> StorageResult<Option<Todo>>;

    /// Allocate the next id, build the record from it and persist it.
    fn insert(&self, build: &mut dyn FnMut(TodoId) -> Todo) -> StorageResult<Todo>;

    /// Load a record, let `apply` modify it, and persist the result.
    ///
    /// If `apply` fails nothing is written. A missing record yields
    /// `StorageError::NotFound`.
    fn update(
        &self,
        id: TodoId,
        apply: &mut dyn FnMut(&mut Todo) -> StorageResult<()>,
    ) -> StorageResult<Todo>;

    /// Remove a record once `guard` accepts it.
    fn delete(
        &self,
        id: TodoId,
        guard: &mut dyn FnMut(&Todo) -> StorageResult<()>,
    ) -> StorageResult<()>;

    /// Verify that the backend can serve reads.
    fn health_check(&self) -> StorageResult<()>;
}

/// Listing order: `created_at` descending, then `id` descending.
pub(crate) fn sort_newest_first(todos: &mut [Todo]) {
    todos.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

pub(crate) fn not_found(id: TodoId) -> StorageError {
    StorageError::NotFound(format!("Todo {id}"))
}

// =============================================================================
// In-memory backend
// =============================================================================

#[derive(Default)]
struct MemoryState {
    last_id: TodoId,
    todos: HashMap<TodoId, Todo>,
}

/// Process-local backend. Data is lost on restart.
#[derive(Default)]
pub struct MemoryTodoStore {
    state: RwLock<MemoryState>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TodoStore for MemoryTodoStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn list_by_owner(&self, owner: &UserId) -> StorageResult<Vec<Todo>> {
        let state = self.state.read()?;
        let mut todos: Vec<Todo> = state
            .todos
            .values()
            .filter(|todo| &todo.owner == owner)
            .cloned()
            .collect();
        sort_newest_first(&mut todos);
        Ok(todos)
    }

    fn get(&self, id: TodoId) -> StorageResult<Option<Todo>> {
        let state = self.state.read()?;
        Ok(state.todos.get(&id).cloned())
    }

    fn insert(&self, build: &mut dyn FnMut(TodoId) -> Todo) -> StorageResult<Todo> {
        let mut state = self.state.write()?;
        let id = state
            .last_id
            .checked_add(1)
            .ok_or(StorageError::SequenceExhausted)?;

        let todo = build(id);
        state.todos.insert(id, todo.clone());
        state.last_id = id;
        Ok(todo)
    }

    fn update(
        &self,
        id: TodoId,
        apply: &mut dyn FnMut(&mut Todo) -> StorageResult<()>,
    ) -> StorageResult<Todo> {
        let mut state = self.state.write()?;
        let mut todo = state.todos.get(&id).cloned().ok_or_else(|| not_found(id))?;

        apply(&mut todo)?;
        todo.id = id;

        state.todos.insert(id, todo.clone());
        Ok(todo)
    }

    fn delete(
        &self,
        id: TodoId,
        guard: &mut dyn FnMut(&Todo) -> StorageResult<()>,
    ) -> StorageResult<()> {
        let mut state = self.state.write()?;
        let todo = state.todos.get(&id).ok_or_else(|| not_found(id))?;
        guard(todo)?;
        state.todos.remove(&id);
        Ok(())
    }

    fn health_check(&self) -> StorageResult<()> {
        let _state = self.state.read()?;
        Ok(())
    }
}
