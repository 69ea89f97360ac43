// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod recommendation;

pub use activity::{ActivityEvent, ActivityType};
pub use recommendation::Recommendation;
