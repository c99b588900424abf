#![warn(missing_docs)]
//! # timer
//!
//! Run a command and report how long it took and what it consumed.
//!
//! - **Raw Monotonic Clock**: wall-clock time from a clock immune to NTP slewing
//! - **Child Resource Usage**: user/system CPU time, peak RSS, page faults and
//!   context switches of the terminated child
//! - **Format Templates**: `%[option]field` specifiers and `\` escapes, validated
//!   before the child is spawned
//! - **Exit Code Passthrough**: the child's exit code, or `128 | signal`
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::process::Command;
//! use timer::{Measurer, Template, render_to_string};
//!
//! let template: Template = "real %r, peak %R\n".parse()?;
//! let measurement = Measurer::new().run(&mut Command::new("true"))?;
//! print!("{}", render_to_string(&template, &measurement.report));
//! ```
//!
//! ## Formatting Single Values
//!
//! ```ignore
//! use timer::{FormatOption, format_bytes, format_duration};
//!
//! assert_eq!(format_duration(1_500, FormatOption::Human), "1.500 us");
//! assert_eq!(format_bytes(1_024, FormatOption::Human), "1.000 KiB");
//! ```

// Re-export report types
pub use timer_report::{
    COMPLETE_FORMAT, DEFAULT_FORMAT, Directive, Escape, EventCount, Field, FormatOption,
    PORTABLE_FORMAT, Preset, Quantity, QuantityKind, ResourceReport, Template, TemplateError,
    format_bytes, format_count, format_duration, render, render_to_string, validate,
};

// Re-export measurement types
pub use timer_core::{
    MeasureError, Measurement, Measurer, MonotonicClock, Outcome, RawMonotonicClock, Running,
    Snapshot, UsageSource, exit_codes,
};

// Re-export CLI types
pub use timer_cli::{Cli, CliError, RunConfig, TimerConfig};

/// Run the timer CLI.
///
/// The `timer` binary is a thin wrapper around this:
/// ```ignore
/// fn main() -> std::process::ExitCode {
///     timer::run()
/// }
/// ```
pub use timer_cli::run;
