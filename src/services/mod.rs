// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod advisor;
pub mod bus;
pub mod envelope;
pub mod extraction;
pub mod prompt;
pub mod pump;
pub mod recommendation;

pub use advisor::{AdvisorClient, MockReply};
pub use bus::{Delivery, MemoryBus, PartitionConsumer};
pub use extraction::RecommendationFields;
pub use pump::ConsumptionPump;
pub use recommendation::{Outcome, RecommendationProcessor};
