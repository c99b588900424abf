#![warn(missing_docs)]
//! Timer CLI Library
//!
//! Command-line front end: parses arguments, resolves the report template,
//! measures the command and writes the report.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> std::process::ExitCode {
//!     timer_cli::run()
//! }
//! ```

mod config;

pub use config::*;

use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::{Command, ExitCode};
use thiserror::Error;
use timer_core::{MeasureError, Measurement, Measurer, exit_codes};
use timer_report::{Preset, Template, TemplateError, render};

/// Version string printed by `--version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const FORMAT_HELP: &str = "\
Format Sequences:
  Every % in the format string starts a sequence %[option]specifier. The
  specifier is required, the option defaults to 'h'.

Format Options:
  h  Adaptive units for human readers (default)
  m  Raw value (nanoseconds/bytes/events) as a decimal integer
  M  Raw value as a hexadecimal integer
  p  Seconds with two fractional digits, as printed by shell 'time'

Format Specifiers:
  %[hmMp]r  Real time elapsed
  %[hmMp]u  User time elapsed
  %[hmMp]s  System time elapsed
  %[hmM]R   Maximum resident set size
  %[hmM]f   Minor (reclaimable) page faults
  %[hmM]F   Major (I/O) page faults
  %[hmM]c   Voluntary context switches
  %[hmM]C   Involuntary context switches
  %%        A literal % sign

Escape Sequences:
  Every \\ in the format string starts an escape sequence.
  \\n  New line
  \\t  Tab
  \\%  A literal % sign
  \\\\  A literal \\ character

Presets: default, complete, portable, plus [presets] from timer.toml";

/// Timer CLI arguments
#[derive(Parser, Debug)]
#[command(name = "timer")]
#[command(about = "Watches resource utilization of 'command args'")]
#[command(override_usage = "timer [OPTIONS] [--] <COMMAND>...")]
#[command(after_help = FORMAT_HELP)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Give a complete resource usage report
    #[arg(short, long, overrides_with_all = ["format", "portability", "preset"])]
    pub complete: bool,

    /// Use the format string S for the report
    #[arg(
        short,
        long,
        value_name = "S",
        allow_hyphen_values = true,
        overrides_with_all = ["complete", "portability", "preset"]
    )]
    pub format: Option<String>,

    /// Use the portable format similar to that used by e.g. GNU time and bash time
    #[arg(short, long, overrides_with_all = ["complete", "format", "preset"])]
    pub portability: bool,

    /// Use a named preset template
    #[arg(long, value_name = "NAME", overrides_with_all = ["complete", "format", "portability"])]
    pub preset: Option<String>,

    /// Show version info, then exit
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Log measurement steps to stderr
    #[arg(long)]
    pub verbose: bool,

    /// Command to measure, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        required_unless_present = "version"
    )]
    pub command: Vec<OsString>,
}

/// Errors that end a run before or instead of the report
#[derive(Debug, Error)]
pub enum CliError {
    /// The report template does not parse
    #[error("The given format string is not a legal format string: {0}")]
    InvalidFormat(#[from] TemplateError),

    /// `--preset` names neither a built-in nor a configured preset
    #[error("Unknown preset '{name}' (available: {available})")]
    UnknownPreset {
        /// Requested preset
        name: String,
        /// Comma-separated list of known presets
        available: String,
    },

    /// No program to run
    #[error("No command given")]
    MissingCommand,

    /// Spawning, waiting or sampling failed
    #[error(transparent)]
    Measure(#[from] MeasureError),
}

impl CliError {
    /// Reserved exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidFormat(_) | CliError::UnknownPreset { .. } | CliError::MissingCommand => {
                exit_codes::ARGUMENT_PARSING
            }
            CliError::Measure(e) => e.exit_code(),
        }
    }

    /// Whether the user should be pointed at `--help`
    pub fn is_usage_error(&self) -> bool {
        self.exit_code() == exit_codes::ARGUMENT_PARSING
    }
}

/// Everything needed to measure one command, resolved from CLI and config
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Validated report template
    pub template: Template,
    /// Program to run
    pub program: OsString,
    /// Arguments passed to the program
    pub args: Vec<OsString>,
    /// Report destination
    pub stream: ReportStream,
}

impl RunConfig {
    /// Resolve CLI flags layered over the configuration file.
    ///
    /// Template precedence: `-f`/`-c`/`-p`/`--preset` (last one wins), then
    /// `[report] format`, then the built-in default. The chosen template is
    /// validated here, before anything is spawned.
    pub fn resolve(cli: Cli, config: &TimerConfig) -> Result<Self, CliError> {
        let template = select_template(&cli, config)?;

        let mut command = cli.command.into_iter();
        let program = command.next().ok_or(CliError::MissingCommand)?;

        Ok(Self {
            template,
            program,
            args: command.collect(),
            stream: config.report.stream,
        })
    }

    /// Build the child command
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

fn select_template(cli: &Cli, config: &TimerConfig) -> Result<Template, CliError> {
    if let Some(format) = &cli.format {
        return Ok(Template::parse(format)?);
    }
    if cli.complete {
        return Ok(Preset::Complete.template());
    }
    if cli.portability {
        return Ok(Preset::Portable.template());
    }
    if let Some(name) = &cli.preset {
        if let Some(preset) = Preset::from_name(name) {
            return Ok(preset.template());
        }
        return match config.preset(name) {
            Some(source) => Ok(Template::parse(source)?),
            None => Err(CliError::UnknownPreset {
                name: name.clone(),
                available: available_presets(config),
            }),
        };
    }
    match &config.report.format {
        Some(format) => Ok(Template::parse(format)?),
        None => Ok(Preset::Default.template()),
    }
}

fn available_presets(config: &TimerConfig) -> String {
    Preset::ALL
        .iter()
        .map(|preset| preset.name())
        .chain(config.presets.keys().map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the timer CLI with the process arguments.
pub fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => exit_codes::ARGUMENT_PARSING,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };
    ExitCode::from(run_with_cli(cli))
}

/// Run the timer CLI with pre-parsed arguments, returning the exit code.
pub fn run_with_cli(cli: Cli) -> u8 {
    init_logging(cli.verbose);

    if cli.version {
        println!("timer version {}", VERSION);
        return 0;
    }

    let config = TimerConfig::discover().unwrap_or_default();

    let result = RunConfig::resolve(cli, &config).and_then(|run_config| execute(&run_config));
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e);
            if e.is_usage_error() {
                eprintln!("Use 'timer -h' for more information.");
            }
            e.exit_code()
        }
    }
}

/// Measure the configured command and write its report.
///
/// Returns the exit code to propagate: the child's, or `128 | signal`.
pub fn execute(config: &RunConfig) -> Result<u8, CliError> {
    let measurement = Measurer::new().run(&mut config.command())?;

    if let Err(e) = write_report(config, &measurement) {
        tracing::warn!("cannot write report: {}", e);
    }

    Ok(measurement.outcome.exit_code())
}

fn write_report(config: &RunConfig, measurement: &Measurement) -> io::Result<()> {
    match config.stream {
        ReportStream::Stdout => {
            let mut out = io::BufWriter::new(io::stdout().lock());
            render(&config.template, &measurement.report, &mut out)?;
            out.flush()
        }
        ReportStream::Stderr => {
            let mut out = io::BufWriter::new(io::stderr().lock());
            render(&config.template, &measurement.report, &mut out)?;
            out.flush()
        }
    }
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the default filter.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "timer_cli=debug,timer_core=debug"
    } else {
        "timer_cli=warn,timer_core=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("timer").chain(args.iter().copied())).unwrap()
    }

    fn resolve(args: &[&str]) -> Result<RunConfig, CliError> {
        RunConfig::resolve(parse(args), &TimerConfig::default())
    }

    #[test]
    fn test_command_and_args() {
        let cli = parse(&["ls", "-l", "--color"]);
        assert_eq!(cli.command, vec!["ls", "-l", "--color"]);
        assert!(!cli.complete);
    }

    #[test]
    fn test_flags_after_command_belong_to_child() {
        let cli = parse(&["-c", "grep", "-c", "x"]);
        assert!(cli.complete);
        assert_eq!(cli.command, vec!["grep", "-c", "x"]);
    }

    #[test]
    fn test_double_dash_allows_hyphen_command() {
        let cli = parse(&["--", "-weird", "arg"]);
        assert_eq!(cli.command, vec!["-weird", "arg"]);
    }

    #[test]
    fn test_repeated_selector_last_wins() {
        let cli = parse(&["-f", "%r", "-f", "%u", "true"]);
        assert_eq!(cli.format.as_deref(), Some("%u"));
        assert_eq!(cli.command, vec!["true"]);

        let cli = parse(&["-c", "-c", "true"]);
        assert!(cli.complete);

        let config = resolve(&["--preset", "default", "--preset", "portable", "true"]).unwrap();
        assert_eq!(config.template, Preset::Portable.template());
    }

    #[test]
    fn test_format_value_may_start_with_hyphen() {
        let cli = parse(&["-f", "-- %r", "true"]);
        assert_eq!(cli.format.as_deref(), Some("-- %r"));
        assert_eq!(cli.command, vec!["true"]);

        let config = resolve(&["--format", "-%mr", "true"]).unwrap();
        assert_eq!(config.template.as_str(), "-%mr");
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = Cli::try_parse_from(["timer", "-x", "ls"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_missing_command_rejected() {
        let err = Cli::try_parse_from(["timer", "-c"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_missing_format_value_rejected() {
        assert!(Cli::try_parse_from(["timer", "-f"]).is_err());
    }

    #[test]
    fn test_version_without_command() {
        assert!(parse(&["-v"]).version);
        assert!(parse(&["--version"]).version);
    }

    #[test]
    fn test_help_requested() {
        let err = Cli::try_parse_from(["timer", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        let err = Cli::try_parse_from(["timer", "-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_default_template() {
        let config = resolve(&["true"]).unwrap();
        assert_eq!(config.template, Preset::Default.template());
        assert_eq!(config.program, "true");
        assert!(config.args.is_empty());
    }

    #[test]
    fn test_last_template_selector_wins() {
        let config = resolve(&["-f", "%r", "-p", "true"]).unwrap();
        assert_eq!(config.template, Preset::Portable.template());

        let config = resolve(&["-c", "-f", "%mr", "true"]).unwrap();
        assert_eq!(config.template.as_str(), "%mr");

        let config = resolve(&["-p", "--preset", "complete", "true"]).unwrap();
        assert_eq!(config.template, Preset::Complete.template());
    }

    #[test]
    fn test_invalid_format_is_argument_error() {
        let err = resolve(&["-f", "%pR", "true"]).unwrap_err();
        assert!(matches!(err, CliError::InvalidFormat(_)));
        assert_eq!(err.exit_code(), exit_codes::ARGUMENT_PARSING);
        assert!(err.is_usage_error());
    }

    #[test]
    fn test_config_format_and_presets() {
        let mut config = TimerConfig::default();
        config.report.format = Some("%mr\n".to_string());
        config
            .presets
            .insert("brief".to_string(), "%r\n".to_string());

        let run = RunConfig::resolve(parse(&["true"]), &config).unwrap();
        assert_eq!(run.template.as_str(), "%mr\n");

        let run = RunConfig::resolve(parse(&["--preset", "brief", "true"]), &config).unwrap();
        assert_eq!(run.template.as_str(), "%r\n");

        // CLI wins over the config file
        let run = RunConfig::resolve(parse(&["-c", "true"]), &config).unwrap();
        assert_eq!(run.template, Preset::Complete.template());
    }

    #[test]
    fn test_invalid_config_template_rejected() {
        let mut config = TimerConfig::default();
        config.report.format = Some("%q".to_string());
        let err = RunConfig::resolve(parse(&["true"]), &config).unwrap_err();
        assert!(matches!(err, CliError::InvalidFormat(_)));
    }

    #[test]
    fn test_unknown_preset() {
        let err = resolve(&["--preset", "fancy", "true"]).unwrap_err();
        match &err {
            CliError::UnknownPreset { name, available } => {
                assert_eq!(name, "fancy");
                assert_eq!(available, "default, complete, portable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.exit_code(), exit_codes::ARGUMENT_PARSING);
    }

    #[test]
    fn test_execute_propagates_exit_code() {
        let mut config = resolve(&["sh", "-c", "exit 5"]).unwrap();
        config.stream = ReportStream::Stderr;
        assert_eq!(execute(&config).unwrap(), 5);
    }

    #[test]
    fn test_execute_missing_command() {
        let config = resolve(&["/nonexistent/timer-cli-test"]).unwrap();
        let err = execute(&config).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::COMMAND_NOT_FOUND);
        assert!(!err.is_usage_error());
    }
}
