// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{CredentialStore, TokenDirectory};
use crate::storage::{MemoryTodoStore, TodoRepository, TodoStore};

#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<dyn TodoStore>,
    pub credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new(todos: impl TodoStore + 'static) -> Self {
        Self {
            todos: Arc::new(todos),
            credentials: Arc::new(TokenDirectory::new()),
        }
    }

    pub fn with_credentials(mut self, credentials: impl CredentialStore + 'static) -> Self {
        self.credentials = Arc::new(credentials);
        self
    }

    /// Repository over the configured backend.
    pub fn todo_repository(&self) -> TodoRepository<'_> {
        TodoRepository::new(self.todos.as_ref())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(MemoryTodoStore::new())
    }
}
