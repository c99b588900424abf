//! Measurement Protocol
//!
//! Brackets one child process with two snapshots:
//!
//! ```text
//! ┌──────────┐  snapshot, spawn   ┌─────────┐  wait, snapshot   ┌─────────────┐
//! │ Measurer │ ─────────────────▶ │ Running │ ────────────────▶ │ Measurement │
//! └──────────┘                    └─────────┘                   └─────────────┘
//! ```
//!
//! Every transition either succeeds or fails fatally; nothing is retried.
//! A failure after the wait drops the child's exit status with it.

use crate::error::MeasureError;
use crate::measure::{ChildrenUsage, MonotonicClock, RawMonotonicClock, UsageSource};
use crate::snapshot::Snapshot;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, ExitStatus};
use timer_report::ResourceReport;

/// How the child terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Normal exit with this status
    Exited(u8),
    /// Killed by this signal
    Signaled(i32),
}

impl Outcome {
    /// Classify a wait status; `None` if the child neither exited nor was killed.
    pub fn from_status(status: ExitStatus) -> Option<Self> {
        match (status.code(), status.signal()) {
            (Some(code), _) => Some(Outcome::Exited((code & 0xff) as u8)),
            (None, Some(signal)) => Some(Outcome::Signaled(signal)),
            (None, None) => None,
        }
    }

    /// Exit code to propagate: the child's own, or `128 | signal` as shells do
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Exited(code) => code,
            Outcome::Signaled(signal) => u8::try_from(128 | signal).unwrap_or(u8::MAX),
        }
    }
}

/// Result of a completed measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// Child termination
    pub outcome: Outcome,
    /// Resource usage of the child
    pub report: ResourceReport,
}

/// Idle protocol: holds the samplers, nothing captured yet
#[derive(Debug, Clone, Default)]
pub struct Measurer<C = RawMonotonicClock, U = ChildrenUsage> {
    clock: C,
    usage: U,
}

impl Measurer {
    /// Measurer using the platform clock and `getrusage`
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: MonotonicClock, U: UsageSource> Measurer<C, U> {
    /// Measurer with custom samplers
    pub fn with_sources(clock: C, usage: U) -> Self {
        Self { clock, usage }
    }

    /// Take the "before" snapshot and spawn `command`.
    pub fn start(self, command: &mut Command) -> Result<Running<C, U>, MeasureError> {
        let before = Snapshot::before(&self.clock, &self.usage)?;
        tracing::debug!(?before, "captured snapshot before spawn");

        let program = command.get_program().to_string_lossy().into_owned();
        let child = command
            .spawn()
            .map_err(|e| MeasureError::spawn(program.clone(), e))?;
        tracing::debug!(pid = child.id(), %program, "spawned child");

        Ok(Running {
            clock: self.clock,
            usage: self.usage,
            before,
            child,
        })
    }

    /// Run `command` to completion and measure it.
    pub fn run(self, command: &mut Command) -> Result<Measurement, MeasureError> {
        self.start(command)?.wait()
    }
}

/// A spawned child being measured
#[derive(Debug)]
pub struct Running<C = RawMonotonicClock, U = ChildrenUsage> {
    clock: C,
    usage: U,
    before: Snapshot,
    child: Child,
}

impl<C: MonotonicClock, U: UsageSource> Running<C, U> {
    /// Process id of the child
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Block until the child terminates, then take the "after" snapshot.
    pub fn wait(mut self) -> Result<Measurement, MeasureError> {
        let status = self.child.wait().map_err(MeasureError::Wait)?;
        let outcome = Outcome::from_status(status).ok_or_else(|| {
            MeasureError::Wait(io::Error::other(format!(
                "unexpected wait status {}",
                status.into_raw()
            )))
        })?;

        match outcome {
            Outcome::Exited(code) => tracing::debug!(code, "child exited"),
            Outcome::Signaled(signal) => tracing::info!(signal, "child terminated by signal"),
        }

        let after = Snapshot::after(&self.clock, &self.usage)?;
        tracing::debug!(?after, "captured snapshot after wait");

        Ok(Measurement {
            outcome,
            report: after.report_since(&self.before),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{Timestamp, UsageSample};
    use std::cell::Cell;

    /// Clock returning scripted readings, failing once the script runs out
    #[derive(Debug)]
    struct ScriptedClock {
        readings: Vec<u64>,
        next: Cell<usize>,
    }

    impl ScriptedClock {
        fn new(readings: &[u64]) -> Self {
            Self {
                readings: readings.to_vec(),
                next: Cell::new(0),
            }
        }
    }

    impl MonotonicClock for ScriptedClock {
        fn now(&self) -> Result<Timestamp, MeasureError> {
            let i = self.next.get();
            self.next.set(i + 1);
            self.readings
                .get(i)
                .map(|&nanos| Timestamp::from_nanos(nanos))
                .ok_or_else(|| MeasureError::Clock(io::Error::other("clock script exhausted")))
        }
    }

    #[derive(Debug)]
    struct FailingUsage;

    impl UsageSource for FailingUsage {
        fn sample(&self) -> Result<UsageSample, MeasureError> {
            Err(MeasureError::Usage(io::Error::other("no rusage")))
        }
    }

    fn sh(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.args(["-c", script]);
        command
    }

    #[test]
    fn test_outcome_exit_codes() {
        assert_eq!(Outcome::Exited(0).exit_code(), 0);
        assert_eq!(Outcome::Exited(3).exit_code(), 3);
        assert_eq!(Outcome::Signaled(9).exit_code(), 137);
        assert_eq!(Outcome::Signaled(15).exit_code(), 143);
        assert_eq!(Outcome::Signaled(2).exit_code(), 130);
    }

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(
            Outcome::from_status(ExitStatus::from_raw(3 << 8)),
            Some(Outcome::Exited(3))
        );
        assert_eq!(
            Outcome::from_status(ExitStatus::from_raw(9)),
            Some(Outcome::Signaled(9))
        );
    }

    #[test]
    fn test_measures_exit_code() {
        let measurement = Measurer::new().run(&mut sh("exit 3")).unwrap();
        assert_eq!(measurement.outcome, Outcome::Exited(3));
        assert!(measurement.report.real_ns > 0);
    }

    #[test]
    fn test_measures_signal_death() {
        let measurement = Measurer::new().run(&mut sh("kill -9 $$")).unwrap();
        assert_eq!(measurement.outcome, Outcome::Signaled(9));
        assert_eq!(measurement.outcome.exit_code(), 137);
    }

    #[test]
    fn test_real_time_from_clock() {
        let measurer = Measurer::with_sources(ScriptedClock::new(&[1_000, 4_500]), ChildrenUsage);
        let measurement = measurer.run(&mut sh("exit 0")).unwrap();
        assert_eq!(measurement.report.real_ns, 3_500);
    }

    #[test]
    fn test_missing_command() {
        let mut command = Command::new("/nonexistent/timer-test-binary");
        let err = Measurer::new().start(&mut command).unwrap_err();
        assert!(matches!(err, MeasureError::CommandNotFound { .. }));
    }

    #[test]
    fn test_before_failure_never_spawns() {
        let marker = tempfile_path("before-failure");
        let measurer = Measurer::with_sources(RawMonotonicClock, FailingUsage);
        let err = measurer
            .start(&mut sh(&format!("touch {}", marker.display())))
            .unwrap_err();

        assert!(matches!(err, MeasureError::Usage(_)));
        assert!(!marker.exists());
    }

    #[test]
    fn test_after_failure_is_fatal() {
        // one reading for "before", none left for "after"
        let measurer = Measurer::with_sources(ScriptedClock::new(&[1_000]), ChildrenUsage);
        let err = measurer.run(&mut sh("exit 7")).unwrap_err();
        assert!(matches!(err, MeasureError::Clock(_)));
    }

    fn tempfile_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("timer-core-{}-{}", tag, std::process::id()))
    }
}
