//! Measurement Snapshots

use crate::error::MeasureError;
use crate::measure::{MonotonicClock, Timestamp, UsageSample, UsageSource};
use timer_report::{EventCount, ResourceReport};

/// Clock and resource-usage readings taken together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Monotonic clock reading
    pub timestamp: Timestamp,
    /// Cumulative usage of reaped children
    pub usage: UsageSample,
}

impl Snapshot {
    /// Capture the snapshot preceding a spawn.
    ///
    /// Usage is sampled first and the clock last, so the real-time interval
    /// starts as close to the spawn as possible.
    pub fn before(clock: &impl MonotonicClock, usage: &impl UsageSource) -> Result<Self, MeasureError> {
        let usage = usage.sample()?;
        let timestamp = clock.now()?;
        Ok(Self { timestamp, usage })
    }

    /// Capture the snapshot following a wait (clock first, then usage).
    pub fn after(clock: &impl MonotonicClock, usage: &impl UsageSource) -> Result<Self, MeasureError> {
        let timestamp = clock.now()?;
        let usage = usage.sample()?;
        Ok(Self { timestamp, usage })
    }

    /// Field-wise delta from `before` to `self`.
    ///
    /// Times saturate at zero. Peak RSS is a high-water mark, not a
    /// cumulative counter, so the later reading is reported as-is. Event
    /// counters keep their sign so a reset shows up as unknown.
    pub fn report_since(&self, before: &Snapshot) -> ResourceReport {
        let (b, a) = (&before.usage, &self.usage);
        ResourceReport {
            real_ns: self.timestamp.nanos_since(before.timestamp),
            user_ns: a.user_ns.saturating_sub(b.user_ns),
            sys_ns: a.sys_ns.saturating_sub(b.sys_ns),
            max_rss_bytes: a.max_rss_bytes,
            minor_faults: EventCount::delta(b.minor_faults, a.minor_faults),
            major_faults: EventCount::delta(b.major_faults, a.major_faults),
            voluntary_switches: EventCount::delta(b.voluntary_switches, a.voluntary_switches),
            involuntary_switches: EventCount::delta(b.involuntary_switches, a.involuntary_switches),
        }
    }
}
