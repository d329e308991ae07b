//! S3 CSV output
//!
//! The output is responsible for:
//! - Projecting the host's enabled system tags into fixed CSV columns
//! - Draining queued samples on a one-second cadence and encoding them
//! - Accumulating the encoded rows in memory for the whole run
//! - Uploading the accumulated file to S3 exactly once at stop

mod buffer;
mod flusher;

pub use buffer::{CsvBuffer, RowFailure, WriteOutcome};
pub use flusher::PeriodicFlusher;

use crate::clock::MonotonicClock;
use crate::config::Settings;
use crate::row::{header_row, sample_to_row};
use crate::sample::SampleQueue;
use crate::tags::select_tags;
use crate::{Error, Result};

use bytes::Bytes;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_FLUSH_PERIOD: Duration = Duration::from_secs(1);
const CONTENT_TYPE_CSV: &str = "application/csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Running,
    Stopped,
}

/// Metrics output that accumulates CSV in memory and uploads it at stop.
#[derive(Debug)]
pub struct Output {
    settings: Settings,
    /// Recorded tag columns, sorted, fixed at construction
    tags: Vec<String>,
    queue: Arc<SampleQueue>,
    buffer: Arc<CsvBuffer>,
    store: Option<Arc<dyn ObjectStore>>,
    flusher: Option<PeriodicFlusher>,
    clock: MonotonicClock,
    flush_period: Duration,
    state: Lifecycle,
}

impl Output {
    /// Create an output that builds its S3 client from `settings` at start.
    pub fn new(settings: Settings, enabled_system_tags: &HashMap<String, bool>) -> Result<Self> {
        let tags = select_tags(enabled_system_tags)?;

        Ok(Self {
            settings,
            tags,
            queue: Arc::new(SampleQueue::new()),
            buffer: Arc::new(CsvBuffer::new()),
            store: None,
            flusher: None,
            clock: MonotonicClock::new(),
            flush_period: DEFAULT_FLUSH_PERIOD,
            state: Lifecycle::Idle,
        })
    }

    /// Factory for host integration layers: settings come from the
    /// environment, the client is built at start.
    pub fn from_env(enabled_system_tags: &HashMap<String, bool>) -> Result<Self> {
        Self::new(Settings::from_env()?, enabled_system_tags)
    }

    /// Create an output against an injected store (tests, S3-compatible
    /// backends constructed by the host).
    pub fn with_store(
        settings: Settings,
        enabled_system_tags: &HashMap<String, bool>,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Self> {
        let mut output = Self::new(settings, enabled_system_tags)?;
        output.store = Some(store);
        Ok(output)
    }

    /// Short human-readable description of the output.
    pub fn description(&self) -> String {
        format!("runoff (s3://{}/{})", self.settings.bucket, self.settings.filename)
    }

    /// Intake surface the host feeds sample batches into.
    pub fn queue(&self) -> Arc<SampleQueue> {
        Arc::clone(&self.queue)
    }

    /// Tag columns this output records.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[cfg(test)]
    fn with_flush_period(mut self, period: Duration) -> Self {
        self.flush_period = period;
        self
    }

    /// Start the output: build the storage client if one was not injected,
    /// write the CSV header, and spawn the periodic flush task.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            Lifecycle::Idle => {}
            Lifecycle::Running => return Err(Error::AlreadyStarted),
            Lifecycle::Stopped => return Err(Error::AlreadyStopped),
        }

        if self.store.is_none() {
            self.store = Some(self.settings.build_store()?);
        }

        self.buffer.write_header(&header_row(&self.tags))?;

        let queue = Arc::clone(&self.queue);
        let buffer = Arc::clone(&self.buffer);
        let tags = self.tags.clone();
        self.flusher = Some(PeriodicFlusher::start(self.flush_period, move || {
            flush_samples(&queue, &buffer, &tags);
        }));

        self.state = Lifecycle::Running;
        info!(
            tags = ?self.tags,
            period_ms = self.flush_period.as_millis() as u64,
            "Output started"
        );
        Ok(())
    }

    /// Stop the output and upload the accumulated file.
    ///
    /// Stops the flush task (waiting out any in-flight tick), drains the
    /// queue one final time so samples produced after the last tick are
    /// not lost, then uploads the snapshot under a `{nanos}_{filename}`
    /// key. A second stop returns `Error::AlreadyStopped`. On upload
    /// failure the error is surfaced and the accumulated bytes are gone
    /// with the output; there is no retry.
    pub async fn stop(&mut self) -> Result<()> {
        match self.state {
            Lifecycle::Running => {}
            Lifecycle::Idle => return Err(Error::NotStarted),
            Lifecycle::Stopped => return Err(Error::AlreadyStopped),
        }

        let flusher = self.flusher.take().ok_or(Error::NotStarted)?;
        flusher.stop().await;

        // The flush task is gone; this drain picks up whatever arrived
        // after its last tick.
        flush_samples(&self.queue, &self.buffer, &self.tags);

        // Nothing writes past this point, so the snapshot is the full run.
        self.state = Lifecycle::Stopped;
        let body = Bytes::from(self.buffer.snapshot());
        let size = body.len();

        let key = format!("{}_{}", self.clock.now_nanos(), self.settings.filename);
        let location = Path::from(key.clone());
        let attributes = Attributes::from_iter([(Attribute::ContentType, CONTENT_TYPE_CSV)]);

        let store = self.store.as_ref().ok_or(Error::NotStarted)?;
        store
            .put_opts(
                &location,
                PutPayload::from(body),
                PutOptions {
                    attributes,
                    ..Default::default()
                },
            )
            .await?;

        info!(key = %key, bytes = size, "Uploaded run artifact");
        Ok(())
    }
}

/// One drain-and-write pass: everything queued right now, formatted and
/// appended in arrival order. Shared by the periodic tick and the final
/// drain at stop. Row-level failures are logged and skipped so one
/// malformed sample cannot halt collection.
fn flush_samples(queue: &SampleQueue, buffer: &CsvBuffer, tags: &[String]) {
    let batches = queue.drain();
    if batches.is_empty() {
        return;
    }

    let rows: Vec<Vec<String>> = batches
        .iter()
        .flat_map(|batch| batch.samples().iter().map(|s| sample_to_row(s, tags)))
        .collect();

    match buffer.write_rows(&rows) {
        Ok(outcome) => {
            for failure in &outcome.failures {
                warn!(
                    row = failure.index,
                    error = %failure.error,
                    "Skipping sample row that failed to encode"
                );
            }
            debug!(rows = outcome.rows_written, "Flushed sample rows");
        }
        Err(e) => warn!(error = %e, "Failed to flush sample batch"),
    }
}
