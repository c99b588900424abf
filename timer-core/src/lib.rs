#![warn(missing_docs)]
//! Timer Core - Measurement Protocol
//!
//! Measures one child process:
//! - Raw monotonic clock for wall-clock time
//! - `getrusage(RUSAGE_CHILDREN)` for CPU time, peak RSS, faults and context switches
//! - Snapshot before spawn, blocking wait, snapshot after, field-wise delta
//! - Exit status classification with the `128 | signal` convention

mod error;
mod measure;
mod protocol;
mod snapshot;

pub use error::{MeasureError, exit_codes};
pub use measure::{
    ChildrenUsage, MonotonicClock, RawMonotonicClock, Timestamp, UsageSample, UsageSource,
};
pub use protocol::{Measurement, Measurer, Outcome, Running};
pub use snapshot::Snapshot;
