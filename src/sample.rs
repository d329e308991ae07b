//! Sample types and the intake queue the host feeds
//!
//! The host workload generator produces samples; the sink only pulls. The
//! queue is the boundary: `add_batch` is the host-facing intake surface,
//! `drain` is the single atomic retrieval the flush path performs per tick.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// One observation of a named metric at a point in time.
#[derive(Debug, Clone)]
pub struct Sample {
    /// When the observation was made
    pub timestamp: DateTime<Utc>,
    /// Metric name, recorded verbatim
    pub metric: String,
    /// Observed value
    pub value: f64,
    /// Tag key-value context attached to the observation
    pub tags: HashMap<String, String>,
}

/// A group of samples produced together by the host.
#[derive(Debug, Clone, Default)]
pub struct SampleBatch {
    samples: Vec<Sample>,
}

impl SampleBatch {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Buffer of batches awaiting the next flush tick.
///
/// Safe to call from the host's producer threads and from the flush task
/// concurrently. Drain takes everything queued at the instant the lock is
/// acquired; batches added while a drain is in progress land in the next one.
#[derive(Debug, Default)]
pub struct SampleQueue {
    inner: Mutex<Vec<SampleBatch>>,
}

impl SampleQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
        }
    }

    /// Enqueue a batch of samples from the host.
    pub fn add_batch(&self, batch: SampleBatch) {
        if batch.is_empty() {
            return;
        }
        self.inner.lock().push(batch);
    }

    /// Take all currently queued batches, leaving the queue empty.
    pub fn drain(&self) -> Vec<SampleBatch> {
        std::mem::take(&mut *self.inner.lock())
    }

    /// Number of queued batches (not samples).
    pub fn batch_count(&self) -> usize {
        self.inner.lock().len()
    }
}
