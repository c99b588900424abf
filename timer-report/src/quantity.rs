//! Quantity Formatters
//!
//! Converts raw measurements into report text. Each quantity kind has an
//! adaptive human presentation plus lossless decimal and hexadecimal forms;
//! durations also have a two-decimal "portable" form.
//!
//! Human presentations keep a bounded width so repeated reports line up:
//!
//! ```text
//!   999 ns     1023   B
//! 1.500 us    1.000 KiB
//! 12.35 ms    12.35 MiB
//! 1.000  s    999.9 GiB
//! ```
//!
//! All rounding is round-half-up at the last displayed digit and done in
//! integer arithmetic, so values on a rounding boundary are exact.

use crate::report::EventCount;
use crate::template::FormatOption;
use std::fmt;

const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_CENTISECOND: u64 = 10_000_000;

/// Units above nanoseconds as (nanoseconds per unit, suffix)
const DURATION_UNITS: [(u64, &str); 3] = [(1_000, "us"), (1_000_000, "ms"), (NANOS_PER_SEC, "s")];

const BYTE_UNITS: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Fractional digits tried per unit, finest first
const PRECISIONS: [u32; 3] = [3, 2, 1];

/// Exclusive bound on a fixed-point value (four significant digits)
const WINDOW: u128 = 10_000;

/// A measured quantity tagged with its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Time span in nanoseconds
    Duration(u64),
    /// Memory size in bytes
    Bytes(u64),
    /// Number of events (faults, context switches)
    Count(EventCount),
}

/// Coarse classification of quantities, which decides the legal options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityKind {
    /// Durations accept every option
    Time,
    /// Byte counts accept `h`, `m` and `M`
    Bytes,
    /// Event counts accept `h`, `m` and `M`
    Count,
}

impl QuantityKind {
    /// Whether `option` is defined for this kind of quantity
    pub fn accepts(self, option: FormatOption) -> bool {
        match self {
            QuantityKind::Time => true,
            QuantityKind::Bytes | QuantityKind::Count => option != FormatOption::Portable,
        }
    }
}

impl Quantity {
    /// Kind of this quantity
    pub fn kind(self) -> QuantityKind {
        match self {
            Quantity::Duration(_) => QuantityKind::Time,
            Quantity::Bytes(_) => QuantityKind::Bytes,
            Quantity::Count(_) => QuantityKind::Count,
        }
    }

    /// Display adapter rendering this quantity under `option`.
    ///
    /// `Portable` is only defined for durations; byte and event counts fall
    /// back to the human presentation.
    pub fn formatted(self, option: FormatOption) -> Formatted {
        Formatted {
            quantity: self,
            option,
        }
    }
}

/// A quantity paired with the presentation it should be written in
#[derive(Debug, Clone, Copy)]
pub struct Formatted {
    quantity: Quantity,
    option: FormatOption,
}

impl fmt::Display for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.quantity, self.option) {
            (Quantity::Duration(nanos), FormatOption::Human) => write_human_duration(f, nanos),
            (Quantity::Duration(nanos), FormatOption::Portable) => {
                write_portable_duration(f, nanos)
            }
            (Quantity::Duration(raw) | Quantity::Bytes(raw), FormatOption::MaxDecimal) => {
                write!(f, "{}", raw)
            }
            (Quantity::Duration(raw) | Quantity::Bytes(raw), FormatOption::MaxHex) => {
                write!(f, "{:x}", raw)
            }
            (Quantity::Bytes(bytes), FormatOption::Human | FormatOption::Portable) => {
                write_human_bytes(f, bytes)
            }
            (Quantity::Count(count), FormatOption::Human | FormatOption::Portable) => {
                match count.value() {
                    Some(value) => f.write_str(&group_thousands(u128::from(value))),
                    None => f.write_str("???"),
                }
            }
            // Negative sentinels print as their two's-complement bit pattern
            (Quantity::Count(count), FormatOption::MaxDecimal) => {
                write!(f, "{}", count.raw() as u64)
            }
            (Quantity::Count(count), FormatOption::MaxHex) => write!(f, "{:x}", count.raw() as u64),
        }
    }
}

/// Format a duration in nanoseconds.
pub fn format_duration(nanos: u64, option: FormatOption) -> String {
    Quantity::Duration(nanos).formatted(option).to_string()
}

/// Format a byte count.
pub fn format_bytes(bytes: u64, option: FormatOption) -> String {
    Quantity::Bytes(bytes).formatted(option).to_string()
}

/// Format an event count.
pub fn format_count(count: EventCount, option: FormatOption) -> String {
    Quantity::Count(count).formatted(option).to_string()
}

/// `value / divisor`, rounded half up.
fn div_round_half_up(value: u128, divisor: u128) -> u128 {
    (2 * value + divisor) / (2 * divisor)
}

/// Render a fixed-point value with `decimals` fractional digits.
fn fixed_point(scaled: u128, decimals: u32) -> String {
    let scale = 10u128.pow(decimals);
    format!(
        "{}.{:0width$}",
        scaled / scale,
        scaled % scale,
        width = decimals as usize
    )
}

/// Digits grouped by thousands with a space, e.g. `1 234 567`.
fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    grouped
}

fn write_human_duration(f: &mut fmt::Formatter<'_>, nanos: u64) -> fmt::Result {
    if nanos < 1_000 {
        return write!(f, "{:>5} {:>2}", nanos, "ns");
    }

    let nanos = u128::from(nanos);
    for (unit_nanos, suffix) in DURATION_UNITS {
        for decimals in PRECISIONS {
            let scaled = div_round_half_up(nanos * 10u128.pow(decimals), u128::from(unit_nanos));
            if scaled < WINDOW {
                return write!(f, "{:>5} {:>2}", fixed_point(scaled, decimals), suffix);
            }
        }
    }

    let secs = div_round_half_up(nanos, u128::from(NANOS_PER_SEC));
    write!(f, "{} s", group_thousands(secs))
}

fn write_portable_duration(f: &mut fmt::Formatter<'_>, nanos: u64) -> fmt::Result {
    let centis = div_round_half_up(u128::from(nanos), u128::from(NANOS_PER_CENTISECOND));
    f.write_str(&fixed_point(centis, 2))
}

fn write_human_bytes(f: &mut fmt::Formatter<'_>, bytes: u64) -> fmt::Result {
    if bytes < 1024 {
        return write!(f, "{:>5} {:>3}", bytes, "B");
    }

    let bytes = u128::from(bytes);
    let mut unit_bytes: u128 = 1;
    for suffix in BYTE_UNITS {
        unit_bytes *= 1024;
        for decimals in PRECISIONS {
            let scaled = div_round_half_up(bytes * 10u128.pow(decimals), unit_bytes);
            if scaled < WINDOW {
                return write!(f, "{:>5} {:>3}", fixed_point(scaled, decimals), suffix);
            }
        }
    }

    // Not reached for u64 input: u64::MAX is below 16 EiB
    let scaled = div_round_half_up(bytes * 10, unit_bytes);
    write!(f, "{:>5} {:>3}", fixed_point(scaled, 1), "EiB")
}
