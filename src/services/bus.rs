// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process partitioned message bus with consumer-group offsets.
//!
//! Each partition is an append-only log. A consumer group keeps one
//! committed offset per partition, and a [`PartitionConsumer`] starts
//! reading at that offset. Records delivered but not committed are
//! delivered again to the next consumer of the same (group, partition),
//! which gives at-least-once delivery while the process is running.
//!
//! The log lives only in process memory: records published but not yet
//! committed are lost if the process exits or crashes.
//!
//! Retention: once every group that has opened a consumer on a partition
//! has committed past a record, the record is released. Offsets keep
//! counting from where they were, so a released prefix only moves the
//! partition's base offset. A group that first subscribes after records
//! were released starts at the earliest retained record.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

/// A record read from a partition.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub partition: usize,
    pub offset: u64,
    pub key: String,
    /// `None` for a null record
    pub payload: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
struct Record {
    key: String,
    payload: Option<Vec<u8>>,
}

#[derive(Default)]
struct LogState {
    /// Offset of the first retained record
    base: u64,
    records: VecDeque<Record>,
}

impl LogState {
    fn end(&self) -> u64 {
        self.base + self.records.len() as u64
    }
}

#[derive(Default)]
struct PartitionLog {
    state: Mutex<LogState>,
    appended: Notify,
}

impl PartitionLog {
    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record at `offset`, or the earliest retained one if `offset` was released.
    fn read_from(&self, offset: u64) -> Option<(u64, Record)> {
        let state = self.lock();
        let offset = offset.max(state.base);
        let record = state.records.get((offset - state.base) as usize)?.clone();
        Some((offset, record))
    }

    /// Release every record below `offset`. Returns how many were dropped.
    fn release_below(&self, offset: u64) -> usize {
        let mut state = self.lock();
        let target = offset.min(state.end());
        let count = target.saturating_sub(state.base) as usize;
        state.records.drain(..count);
        state.base += count as u64;
        count
    }
}

/// Topic with a fixed number of partitions.
pub struct MemoryBus {
    topic: String,
    partitions: Vec<PartitionLog>,
    /// Committed offsets keyed by (group, partition)
    committed: DashMap<(String, usize), u64>,
}

impl MemoryBus {
    /// Create a topic with `partitions` partitions (at least one).
    pub fn new(topic: &str, partitions: usize) -> Arc<Self> {
        let count = partitions.max(1);
        Arc::new(Self {
            topic: topic.to_string(),
            partitions: (0..count).map(|_| PartitionLog::default()).collect(),
            committed: DashMap::new(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Partition for a key: FNV-1a hash modulo the partition count.
    pub fn partition_for(&self, key: &str) -> usize {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in key.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        (hash % self.partitions.len() as u64) as usize
    }

    /// Append a record to the key's partition. Returns (partition, offset).
    pub fn publish(&self, key: &str, payload: Option<Vec<u8>>) -> (usize, u64) {
        let partition = self.partition_for(key);
        let log = &self.partitions[partition];
        let offset = {
            let mut state = log.lock();
            let offset = state.end();
            state.records.push_back(Record {
                key: key.to_string(),
                payload,
            });
            offset
        };
        log.appended.notify_waiters();

        tracing::debug!(
            topic = %self.topic,
            partition,
            offset,
            key,
            "Published record"
        );
        (partition, offset)
    }

    /// Offset the next published record on a partition will get.
    pub fn end_offset(&self, partition: usize) -> u64 {
        self.partitions
            .get(partition)
            .map(|log| log.lock().end())
            .unwrap_or(0)
    }

    /// Number of records a partition still holds in memory.
    pub fn retained(&self, partition: usize) -> usize {
        self.partitions
            .get(partition)
            .map(|log| log.lock().records.len())
            .unwrap_or(0)
    }

    /// Committed offset of a group on a partition (next record to deliver).
    pub fn committed_offset(&self, group: &str, partition: usize) -> u64 {
        self.committed
            .get(&(group.to_string(), partition))
            .map(|offset| *offset)
            .unwrap_or(0)
    }

    /// Records not yet committed by a group, across all partitions.
    pub fn lag(&self, group: &str) -> u64 {
        (0..self.partitions.len())
            .map(|p| {
                self.end_offset(p)
                    .saturating_sub(self.committed_offset(group, p))
            })
            .sum()
    }

    /// Open a consumer for one partition, positioned at the group's committed offset.
    ///
    /// Opening a consumer subscribes the group to the partition, so records
    /// are retained until the group commits past them.
    pub fn consumer(self: &Arc<Self>, group: &str, partition: usize) -> PartitionConsumer {
        assert!(partition < self.partitions.len(), "partition out of range");
        let position = *self
            .committed
            .entry((group.to_string(), partition))
            .or_insert(0);
        PartitionConsumer {
            bus: Arc::clone(self),
            group: group.to_string(),
            partition,
            position,
        }
    }

    fn commit(&self, group: &str, partition: usize, next_offset: u64) {
        {
            let mut entry = self
                .committed
                .entry((group.to_string(), partition))
                .or_insert(0);
            if next_offset <= *entry {
                return;
            }
            *entry = next_offset;
        }

        let low_water = self
            .committed
            .iter()
            .filter(|entry| entry.key().1 == partition)
            .map(|entry| *entry.value())
            .min()
            .unwrap_or(0);
        let released = self.partitions[partition].release_below(low_water);
        if released > 0 {
            tracing::trace!(
                topic = %self.topic,
                partition,
                released,
                low_water,
                "Released committed records"
            );
        }
    }
}

/// Reads one partition on behalf of a consumer group.
pub struct PartitionConsumer {
    bus: Arc<MemoryBus>,
    group: String,
    partition: usize,
    position: u64,
}

impl PartitionConsumer {
    pub fn partition(&self) -> usize {
        self.partition
    }

    /// Wait for the next record in this partition.
    pub async fn next(&mut self) -> Delivery {
        let bus = Arc::clone(&self.bus);
        let log = &bus.partitions[self.partition];
        loop {
            let appended = log.appended.notified();
            tokio::pin!(appended);
            // Register before checking so a concurrent publish isn't missed.
            appended.as_mut().enable();

            if let Some(delivery) = self.try_next() {
                return delivery;
            }

            appended.await;
        }
    }

    /// Next record if one is already available.
    pub fn try_next(&mut self) -> Option<Delivery> {
        let (offset, record) = self.bus.partitions[self.partition].read_from(self.position)?;
        self.position = offset + 1;
        Some(Delivery {
            partition: self.partition,
            offset,
            key: record.key,
            payload: record.payload,
        })
    }

    /// Acknowledge a delivery, committing the group offset past it.
    pub fn commit(&self, delivery: &Delivery) {
        self.bus
            .commit(&self.group, self.partition, delivery.offset + 1);
    }
}
