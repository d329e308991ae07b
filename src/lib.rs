//! # runoff
//!
//! An S3 CSV export sink for load-run metrics.
//!
//! A host workload generator feeds timestamped, tagged samples into the
//! sink's queue; the sink encodes them as CSV rows on a one-second cadence
//! and uploads the accumulated file to S3 exactly once when the run stops.
//!
//! ## Architecture
//!
//! - **Tag selection**: the host's enabled system tags become a fixed,
//!   sorted set of CSV columns; high-cardinality tags are never recorded
//! - **Flush pipeline**: a periodic task drains the sample queue, projects
//!   each sample into a row, and appends to a mutex-guarded CSV buffer
//! - **Finalization**: stop halts the task (waiting out an in-flight
//!   tick), drains once more, and uploads the snapshot under a
//!   time-derived key
//!
//! ## Usage
//!
//! ```no_run
//! use runoff::output::Output;
//! use std::collections::HashMap;
//!
//! # async fn run() -> runoff::Result<()> {
//! let enabled = HashMap::from([("method".to_string(), true)]);
//! let mut output = Output::from_env(&enabled)?;
//! output.start()?;
//!
//! let queue = output.queue();
//! // ... host pushes SampleBatch values into `queue` while the run executes
//!
//! output.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod output;
pub mod row;
pub mod sample;
pub mod tags;
pub mod telemetry;

mod error;

pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::output::Output;
    pub use crate::sample::{Sample, SampleBatch, SampleQueue};
    pub use crate::tags::{select_tags, SystemTag};
    pub use crate::{Error, Result};
}
