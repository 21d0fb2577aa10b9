// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Todo Server - Multi-user Todo REST Service
//!
//! This crate provides a token-authenticated HTTP API where each user
//! manages a private list of todo items.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token authentication (`Authorization: Token <key>`)
//! - `config` - Environment configuration
//! - `storage` - Todo persistence (in-memory or redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
