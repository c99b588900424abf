//! Report Data Structures

use crate::quantity::Quantity;
use crate::template::Field;

/// Resource usage of one measured command: the field-wise delta between
/// the snapshot taken before the spawn and the one taken after the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceReport {
    /// Wall-clock time between the two snapshots (nanoseconds)
    pub real_ns: u64,
    /// CPU time spent in user mode (nanoseconds)
    pub user_ns: u64,
    /// CPU time spent in kernel mode (nanoseconds)
    pub sys_ns: u64,
    /// Peak resident set size of the largest terminated child (bytes)
    pub max_rss_bytes: u64,
    /// Page faults serviced without I/O
    pub minor_faults: EventCount,
    /// Page faults that required I/O
    pub major_faults: EventCount,
    /// Context switches because the child blocked
    pub voluntary_switches: EventCount,
    /// Context switches because the scheduler preempted the child
    pub involuntary_switches: EventCount,
}

impl ResourceReport {
    /// Look up the quantity a format specifier refers to.
    pub fn quantity(&self, field: Field) -> Quantity {
        match field {
            Field::Real => Quantity::Duration(self.real_ns),
            Field::User => Quantity::Duration(self.user_ns),
            Field::System => Quantity::Duration(self.sys_ns),
            Field::MaxRss => Quantity::Bytes(self.max_rss_bytes),
            Field::MinorFaults => Quantity::Count(self.minor_faults),
            Field::MajorFaults => Quantity::Count(self.major_faults),
            Field::VoluntarySwitches => Quantity::Count(self.voluntary_switches),
            Field::InvoluntarySwitches => Quantity::Count(self.involuntary_switches),
        }
    }
}

/// Signed event counter delta.
///
/// The OS may reset or fail to report a counter, which shows up as a negative
/// delta. Such a value is "unknown" and is kept distinct from a real zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventCount(i64);

impl EventCount {
    /// Sentinel for a counter the OS did not report
    pub const UNKNOWN: EventCount = EventCount(-1);

    /// Wrap a raw counter value (negative means unknown)
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Delta between two cumulative readings
    pub fn delta(before: i64, after: i64) -> Self {
        Self(after.wrapping_sub(before))
    }

    /// The count, or `None` if it is unknown
    pub fn value(self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }

    /// The raw signed value, including negative sentinels
    pub fn raw(self) -> i64 {
        self.0
    }
}

impl From<u64> for EventCount {
    fn from(count: u64) -> Self {
        i64::try_from(count).map_or(Self::UNKNOWN, Self)
    }
}
