// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Consumption pump: one worker per partition of the activity topic.
//!
//! Each worker processes its partition's events strictly in order and
//! acknowledges every event once handled, whatever the outcome. The only
//! way an event is processed twice is a worker stopping between processing
//! and acknowledgment, after which the next consumer sees it again.

use crate::services::bus::{Delivery, MemoryBus, PartitionConsumer};
use crate::services::recommendation::{Outcome, RecommendationProcessor};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Subscription of the recommendation pipeline to the activity topic.
pub struct ConsumptionPump {
    bus: Arc<MemoryBus>,
    group: String,
    processor: Arc<RecommendationProcessor>,
}

impl ConsumptionPump {
    pub fn new(bus: Arc<MemoryBus>, group: &str, processor: RecommendationProcessor) -> Self {
        Self {
            bus,
            group: group.to_string(),
            processor: Arc::new(processor),
        }
    }

    /// Spawn one worker per partition.
    ///
    /// Workers exit when `shutdown` turns true, but only between events:
    /// an event already being processed runs to completion.
    pub fn spawn(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        tracing::info!(
            topic = %self.bus.topic(),
            group = %self.group,
            partitions = self.bus.partition_count(),
            "Starting consumption pump"
        );

        (0..self.bus.partition_count())
            .map(|partition| {
                let consumer = self.bus.consumer(&self.group, partition);
                let processor = Arc::clone(&self.processor);
                let shutdown = shutdown.clone();
                tokio::spawn(run_partition(consumer, processor, shutdown))
            })
            .collect()
    }

    /// Run all workers until shutdown.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        let results = futures_util::future::join_all(self.spawn(shutdown)).await;
        for result in results {
            if let Err(e) = result {
                tracing::error!(error = %e, "Partition worker terminated abnormally");
            }
        }
        tracing::info!(group = %self.group, "Consumption pump stopped");
    }
}

/// Worker loop for a single partition.
async fn run_partition(
    mut consumer: PartitionConsumer,
    processor: Arc<RecommendationProcessor>,
    mut shutdown: watch::Receiver<bool>,
) {
    let partition = consumer.partition();
    tracing::debug!(partition, "Partition worker started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let delivery = tokio::select! {
            delivery = consumer.next() => delivery,
            changed = shutdown.changed() => {
                if changed.is_err() {
                    // Sender dropped: treat as shutdown.
                    break;
                }
                continue;
            }
        };

        handle_delivery(&processor, &delivery).await;
        consumer.commit(&delivery);
    }

    tracing::debug!(partition, "Partition worker stopped");
}

/// Process one delivery, logging the outcome. Never fails.
pub async fn handle_delivery(
    processor: &RecommendationProcessor,
    delivery: &Delivery,
) -> Option<Outcome> {
    match processor.process_payload(delivery.payload.as_deref()).await {
        Ok(outcome) => {
            match &outcome {
                Outcome::Dropped { reason } => tracing::warn!(
                    partition = delivery.partition,
                    offset = delivery.offset,
                    reason = %reason,
                    "Skipped invalid activity payload"
                ),
                Outcome::Parsed(_) | Outcome::Defaulted { .. } => tracing::debug!(
                    partition = delivery.partition,
                    offset = delivery.offset,
                    outcome = outcome.as_str(),
                    "Activity event processed"
                ),
            }
            Some(outcome)
        }
        Err(e) => {
            // Still acknowledged; the pipeline never retries.
            tracing::error!(
                partition = delivery.partition,
                offset = delivery.offset,
                key = %delivery.key,
                error = %e,
                "Failed to store recommendation"
            );
            None
        }
    }
}
