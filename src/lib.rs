// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fitness Advisor: AI-generated recommendations for fitness activities
//!
//! This crate consumes activity events from a partitioned topic, asks a
//! generative model for an analysis of each, and stores the extracted
//! recommendation, falling back to a fixed recommendation whenever the
//! model output can't be used.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::MemoryBus;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub bus: Arc<MemoryBus>,
}
