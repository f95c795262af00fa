//! `ecd_sample_prep`: prepares ECD chip sample files.
//!
//! By default it reads the configuration, the fragment definitions and the
//! fragment distribution, prints the capacity statistics and writes the
//! sample file. `--trace` reads a previously written sample file back one
//! cell at a time, and `--lvds-map` prints the row translation table.

#![warn(missing_docs)]

mod generate;
mod trace;

use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use ecd_config::DEFAULT_CONFIG_FILE;
use ecd_frames::{lvds, SamplePrepError, EXIT_FAILURE};

/// Prepare ECD sample files from fragment and distribution definitions.
#[derive(Parser, Debug)]
#[command(name = "ecd_sample_prep", version, about = "ECD sample file preparation")]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Trace a 0-based cell through every frame of the existing output file
    /// instead of generating it.
    #[arg(long, value_name = "CELL")]
    pub trace: Option<u64>,

    /// Write (or trace) frames in raw cell order, without LVDS row reordering.
    #[arg(long)]
    pub no_lvds: bool,

    /// Print the LVDS translation map and exit.
    #[arg(long, conflicts_with = "trace")]
    pub lvds_map: bool,

    /// Output format for the capacity report and traces.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Suppress all output except errors and trace results.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// What a single invocation does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Validate the definitions and write the sample file.
    Generate,
    /// Trace one cell of the written sample file.
    Trace(u64),
    /// Print the LVDS translation map.
    LvdsMap,
}

impl Cli {
    /// Returns the action selected by the flags.
    pub fn action(&self) -> Action {
        if self.lvds_map {
            Action::LvdsMap
        } else if let Some(cell) = self.trace {
            Action::Trace(cell)
        } else {
            Action::Generate
        }
    }
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Output format for reports.
    pub format: ReportFormat,
    /// Whether frames are LVDS row-reordered.
    pub reorder: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let global = GlobalArgs {
        quiet: cli.quiet,
        format: cli.format,
        reorder: !cli.no_lvds,
    };

    let result = match cli.action() {
        Action::LvdsMap => {
            print!("{}", lvds::map_listing());
            Ok(0)
        }
        Action::Trace(cell) => trace::run(&cli.config, cell, &global),
        Action::Generate => generate::run(&cli.config, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(exit_code(e.as_ref()));
        }
    }
}

/// Sets the log filter from the verbosity flags; `RUST_LOG` overrides it.
fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Maps an error to the process exit status.
fn exit_code(err: &(dyn Error + 'static)) -> i32 {
    err.downcast_ref::<SamplePrepError>()
        .map_or(EXIT_FAILURE, SamplePrepError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecd_config::ConfigError;
    use ecd_frames::{CapacityReport, EXIT_DOES_NOT_FIT};

    #[test]
    fn parse_defaults() {
        let cli = Cli::parse_from(["ecd_sample_prep"]);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(cli.action(), Action::Generate);
        assert_eq!(cli.format, ReportFormat::Text);
        assert!(!cli.no_lvds);
        assert!(!cli.quiet);
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_trace() {
        let cli = Cli::parse_from(["ecd_sample_prep", "--trace", "42", "--no-lvds"]);
        assert_eq!(cli.action(), Action::Trace(42));
        assert!(cli.no_lvds);
    }

    #[test]
    fn parse_config_and_format() {
        let cli = Cli::parse_from([
            "ecd_sample_prep",
            "--config",
            "/etc/ecd/run.toml",
            "--format",
            "json",
        ]);
        assert_eq!(cli.config, PathBuf::from("/etc/ecd/run.toml"));
        assert_eq!(cli.format, ReportFormat::Json);
    }

    #[test]
    fn parse_lvds_map() {
        let cli = Cli::parse_from(["ecd_sample_prep", "--lvds-map"]);
        assert_eq!(cli.action(), Action::LvdsMap);
    }

    #[test]
    fn parse_short_flags() {
        let cli = Cli::parse_from(["ecd_sample_prep", "-v", "-c", "x.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert!(Cli::try_parse_from(["ecd_sample_prep", "--frobnicate"]).is_err());
    }

    #[test]
    fn negative_trace_cell_is_rejected() {
        assert!(Cli::try_parse_from(["ecd_sample_prep", "--trace", "-1"]).is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["ecd_sample_prep", "-q", "-v"]).is_err());
    }

    #[test]
    fn trace_and_lvds_map_conflict() {
        assert!(Cli::try_parse_from(["ecd_sample_prep", "--lvds-map", "--trace", "1"]).is_err());
    }

    #[test]
    fn exit_codes() {
        let report = CapacityReport {
            longest_sequence: 1,
            frame_group_length: 1,
            frame_group_count: 2,
            max_frames: 1,
            total_required_frames: 2,
            total_required_bytes: 4096,
        };
        let capacity: Box<dyn Error> = Box::new(SamplePrepError::CapacityExceeded { report });
        assert_eq!(exit_code(capacity.as_ref()), EXIT_DOES_NOT_FIT);

        let config: Box<dyn Error> = Box::new(ConfigError::MissingField("data_frames".into()));
        assert_eq!(exit_code(config.as_ref()), EXIT_FAILURE);
    }
}
