// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Todo Storage Module
//!
//! This module provides per-user todo persistence behind the [`TodoStore`]
//! trait, with two backends:
//!
//! - [`MemoryTodoStore`]: process-local map, used when no data directory is
//!   configured and in tests
//! - [`RedbTodoStore`]: embedded ACID database at `$DATA_DIR/todos.redb`
//!
//! ## Layers
//!
//! ```text
//! api handlers
//!   └── TodoRepository      validation, ownership, audit stamps
//!         └── dyn TodoStore atomic insert/update/delete/list
//! ```
//!
//! ## Ownership Model
//!
//! - Every repository call takes the requesting [`UserId`] explicitly
//! - Records owned by another user are reported as not found
//! - Ownership checks run inside the same lock or write transaction as the
//!   mutation they guard
//!
//! [`UserId`]: crate::models::UserId

pub mod backend;
pub mod error;
pub mod ownership;
pub mod redb_store;
pub mod repository;

pub use backend::{MemoryTodoStore, TodoStore};
pub use error::{StorageError, StorageResult};
pub use ownership::{OwnedResource, OwnershipCheck, OwnershipEnforcer};
pub use redb_store::RedbTodoStore;
pub use repository::{NewTodo, Todo, TodoChanges, TodoError, TodoId, TodoRepository};
