//! Clock and Resource-Usage Sampling
//!
//! Real time comes from a raw monotonic clock that NTP does not slew
//! (`CLOCK_MONOTONIC_RAW` on Linux, `CLOCK_UPTIME_RAW` on Apple targets).
//! CPU time, peak RSS, faults and context switches come from
//! `getrusage(RUSAGE_CHILDREN)`, which only covers children that have
//! already been reaped.

use crate::error::MeasureError;
use std::io;
use std::mem::MaybeUninit;

const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_MICRO: u64 = 1_000;

#[cfg(target_os = "linux")]
const CLOCK_ID: libc::clockid_t = libc::CLOCK_MONOTONIC_RAW;

#[cfg(any(target_os = "macos", target_os = "ios"))]
const CLOCK_ID: libc::clockid_t = libc::CLOCK_UPTIME_RAW;

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "ios")))]
const CLOCK_ID: libc::clockid_t = libc::CLOCK_MONOTONIC;

/// `ru_maxrss` is reported in bytes on Apple targets and in KiB elsewhere.
#[cfg(any(target_os = "macos", target_os = "ios"))]
const MAXRSS_UNIT: u64 = 1;

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
const MAXRSS_UNIT: u64 = 1024;

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Opaque reading of a monotonic clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    nanos: u64,
}

impl Timestamp {
    /// Reading `nanos` nanoseconds after the clock's origin
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Nanoseconds elapsed since `earlier` (zero if `earlier` is later)
    pub fn nanos_since(self, earlier: Timestamp) -> u64 {
        self.nanos.saturating_sub(earlier.nanos)
    }
}

/// Source of monotonic timestamps.
///
/// Implementations must return readings on a single nanosecond scale; any
/// tick-to-nanosecond conversion happens inside `now`.
pub trait MonotonicClock {
    /// Read the clock
    fn now(&self) -> Result<Timestamp, MeasureError>;
}

/// The platform's raw monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct RawMonotonicClock;

impl MonotonicClock for RawMonotonicClock {
    fn now(&self) -> Result<Timestamp, MeasureError> {
        let mut ts = MaybeUninit::<libc::timespec>::zeroed();
        // SAFETY: `ts` points to writable storage for one timespec.
        let ret = unsafe { libc::clock_gettime(CLOCK_ID, ts.as_mut_ptr()) };
        if ret != 0 {
            return Err(MeasureError::Clock(io::Error::last_os_error()));
        }
        // SAFETY: zero-initialised and filled in by a successful clock_gettime.
        let ts = unsafe { ts.assume_init() };
        let nanos = (ts.tv_sec as u64)
            .saturating_mul(NANOS_PER_SEC)
            .saturating_add(ts.tv_nsec as u64);
        Ok(Timestamp::from_nanos(nanos))
    }
}

// ─── Resource usage ──────────────────────────────────────────────────────────

/// Cumulative usage of all reaped children at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsageSample {
    /// User CPU time (nanoseconds)
    pub user_ns: u64,
    /// System CPU time (nanoseconds)
    pub sys_ns: u64,
    /// Largest resident set of any reaped child (bytes)
    pub max_rss_bytes: u64,
    /// Minor page faults
    pub minor_faults: i64,
    /// Major page faults
    pub major_faults: i64,
    /// Voluntary context switches
    pub voluntary_switches: i64,
    /// Involuntary context switches
    pub involuntary_switches: i64,
}

/// Source of cumulative resource-usage samples
pub trait UsageSource {
    /// Sample the counters
    fn sample(&self) -> Result<UsageSample, MeasureError>;
}

/// `getrusage(RUSAGE_CHILDREN)`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChildrenUsage;

impl UsageSource for ChildrenUsage {
    fn sample(&self) -> Result<UsageSample, MeasureError> {
        let mut usage = MaybeUninit::<libc::rusage>::zeroed();
        // SAFETY: `usage` points to writable storage for one rusage.
        let ret = unsafe { libc::getrusage(libc::RUSAGE_CHILDREN, usage.as_mut_ptr()) };
        if ret != 0 {
            return Err(MeasureError::Usage(io::Error::last_os_error()));
        }
        // SAFETY: zero-initialised and filled in by a successful getrusage.
        let usage = unsafe { usage.assume_init() };
        Ok(UsageSample {
            user_ns: timeval_nanos(&usage.ru_utime),
            sys_ns: timeval_nanos(&usage.ru_stime),
            max_rss_bytes: (usage.ru_maxrss.max(0) as u64).saturating_mul(MAXRSS_UNIT),
            minor_faults: usage.ru_minflt as i64,
            major_faults: usage.ru_majflt as i64,
            voluntary_switches: usage.ru_nvcsw as i64,
            involuntary_switches: usage.ru_nivcsw as i64,
        })
    }
}

fn timeval_nanos(tv: &libc::timeval) -> u64 {
    (tv.tv_sec.max(0) as u64)
        .saturating_mul(NANOS_PER_SEC)
        .saturating_add((tv.tv_usec.max(0) as u64).saturating_mul(NANOS_PER_MICRO))
}
