// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded todo database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `todos`: id → serialized [`Todo`] (JSON bytes)
//! - `owner_index`: composite key (owner|!created_at|!id) → id
//! - `sequences`: name → last allocated value
//!
//! Every public operation runs in exactly one redb transaction.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::models::UserId;

use super::backend::{not_found, sort_newest_first, TodoStore};
use super::repository::{Todo, TodoId};
use super::{StorageError, StorageResult};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: id → serialized Todo (JSON bytes).
const TODOS: TableDefinition<u64, &[u8]> = TableDefinition::new("todos");

/// Index: composite key → id, for newest-first range scans per owner.
const OWNER_INDEX: TableDefinition<&[u8], u64> = TableDefinition::new("owner_index");

/// Sequences: name → last allocated value.
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const TODO_ID_SEQUENCE: &str = "todo_id";

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "todos.redb";

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the owner_index table.
///
/// Format: `owner | inverted_created_at_micros_be | inverted_id_be`
///
/// Inverting both numbers makes a forward scan yield newest first.
fn make_index_key(owner: &UserId, todo: &Todo) -> Vec<u8> {
    let owner = owner.as_str().as_bytes();
    let micros = todo.created_at.timestamp_micros();
    let mut key = Vec::with_capacity(owner.len() + 1 + 8 + 1 + 8);
    key.extend_from_slice(owner);
    key.push(b'|');
    key.extend_from_slice(&(!micros as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(&(!todo.id).to_be_bytes());
    key
}

fn make_prefix(owner: &UserId) -> Vec<u8> {
    let owner = owner.as_str().as_bytes();
    let mut prefix = Vec::with_capacity(owner.len() + 1);
    prefix.extend_from_slice(owner);
    prefix.push(b'|');
    prefix
}

/// Upper bound for a range scan (prefix with 0xFF bytes appended).
fn make_prefix_end(owner: &UserId) -> Vec<u8> {
    let mut end = make_prefix(owner);
    end.extend_from_slice(&[0xFF; 20]);
    end
}

// =============================================================================
// RedbTodoStore
// =============================================================================

/// Persistent todo backend.
pub struct RedbTodoStore {
    db: Database,
}

impl RedbTodoStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TODOS)?;
            let _ = write_txn.open_table(OWNER_INDEX)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Opened todo database");
        Ok(Self { db })
    }

    /// Open `todos.redb` inside a data directory.
    pub fn open_in_dir(data_dir: &Path) -> StorageResult<Self> {
        Self::open(&data_dir.join(DATABASE_FILE))
    }
}

fn decode(bytes: &[u8]) -> StorageResult<Todo> {
    Ok(serde_json::from_slice(bytes)?)
}

impl TodoStore for RedbTodoStore {
    fn backend_name(&self) -> &'static str {
        "redb"
    }

    fn list_by_owner(&self, owner: &UserId) -> StorageResult<Vec<Todo>> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(OWNER_INDEX)?;
        let todo_table = read_txn.open_table(TODOS)?;

        let prefix = make_prefix(owner);
        let prefix_end = make_prefix_end(owner);

        let mut todos = Vec::new();
        for entry in idx_table.range(prefix.as_slice()..prefix_end.as_slice())? {
            let (_, id) = entry?;
            let Some(value) = todo_table.get(id.value())? else {
                tracing::warn!(todo_id = id.value(), "Owner index points at a missing todo");
                continue;
            };
            let todo = decode(value.value())?;
            // An owner containing '|' can share a prefix with another owner
            if &todo.owner == owner {
                todos.push(todo);
            }
        }

        // Index order already matches; sorting keeps ties consistent with
        // the other backends when clocks were adjusted between writes.
        sort_newest_first(&mut todos);
        Ok(todos)
    }

    fn get(&self, id: TodoId) -> StorageResult<Option<Todo>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TODOS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    fn insert(&self, build: &mut dyn FnMut(TodoId) -> Todo) -> StorageResult<Todo> {
        let write_txn = self.db.begin_write()?;
        let todo = {
            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let last = sequences
                .get(TODO_ID_SEQUENCE)?
                .map(|v| v.value())
                .unwrap_or(0);
            let id = last.checked_add(1).ok_or(StorageError::SequenceExhausted)?;
            sequences.insert(TODO_ID_SEQUENCE, id)?;

            let todo = build(id);
            let json = serde_json::to_vec(&todo)?;

            let mut todo_table = write_txn.open_table(TODOS)?;
            todo_table.insert(id, json.as_slice())?;

            let mut idx_table = write_txn.open_table(OWNER_INDEX)?;
            let key = make_index_key(&todo.owner, &todo);
            idx_table.insert(key.as_slice(), id)?;

            todo
        };
        write_txn.commit()?;
        Ok(todo)
    }

    fn update(
        &self,
        id: TodoId,
        apply: &mut dyn FnMut(&mut Todo) -> StorageResult<()>,
    ) -> StorageResult<Todo> {
        let write_txn = self.db.begin_write()?;
        let todo = {
            let mut table = write_txn.open_table(TODOS)?;

            // Read existing value and deserialize before mutating
            let existing_bytes = {
                let existing = table.get(id)?.ok_or_else(|| not_found(id))?;
                existing.value().to_vec()
            };

            let mut todo = decode(&existing_bytes)?;
            let before = todo.clone();
            apply(&mut todo)?;
            todo.id = id;

            // The index key only depends on owner and created_at, which
            // callers never change; keep it in sync if they ever differ.
            if before.owner != todo.owner || before.created_at != todo.created_at {
                let mut idx_table = write_txn.open_table(OWNER_INDEX)?;
                idx_table.remove(make_index_key(&before.owner, &before).as_slice())?;
                idx_table.insert(make_index_key(&todo.owner, &todo).as_slice(), id)?;
            }

            let json = serde_json::to_vec(&todo)?;
            table.insert(id, json.as_slice())?;
            todo
        };
        write_txn.commit()?;
        Ok(todo)
    }

    fn delete(
        &self,
        id: TodoId,
        guard: &mut dyn FnMut(&Todo) -> StorageResult<()>,
    ) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TODOS)?;
            let existing_bytes = {
                let existing = table.get(id)?.ok_or_else(|| not_found(id))?;
                existing.value().to_vec()
            };

            let todo = decode(&existing_bytes)?;
            guard(&todo)?;

            table.remove(id)?;
            let mut idx_table = write_txn.open_table(OWNER_INDEX)?;
            idx_table.remove(make_index_key(&todo.owner, &todo).as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn health_check(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(SEQUENCES)?;
        Ok(())
    }
}
