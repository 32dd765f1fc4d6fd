//! CLI argument definitions for httplog.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.
//! Every monitor flag is optional so that unset flags fall through to
//! environment variables, the config file, and finally the built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use httplog_core::config::{HttplogConfig, parse_duration};
use httplog_core::error::ConfigError;

/// HTTP access log traffic monitor.
///
/// Reads Common Log Format lines, prints the busiest sections every
/// update interval, and warns when total traffic crosses a threshold.
#[derive(Parser, Debug, Default)]
#[command(name = "httplog")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// File to read Common Log Format lines from ('-' for stdin).
    ///
    /// [default: -]
    #[arg(short, long)]
    pub file: Option<String>,

    /// File to write reports to ('-' for stdout).
    ///
    /// [default: -]
    #[arg(short, long)]
    pub out: Option<String>,

    /// How often to print the busiest sections ("0" disables).
    ///
    /// [default: 10s]
    #[arg(long, value_parser = interval_arg)]
    pub update_interval: Option<String>,

    /// How often to check for high traffic ("0" disables).
    ///
    /// [default: 2m]
    #[arg(long, value_parser = interval_arg)]
    pub threshold_interval: Option<String>,

    /// Hits per threshold interval above which a warning is printed.
    ///
    /// [default: 10]
    #[arg(long)]
    pub threshold_value: Option<u64>,

    /// Path to httplog.toml configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration and exit without reading input.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Apply every flag that was given on the command line to `config`.
    pub fn apply_overrides(&self, config: &mut HttplogConfig) {
        if let Some(file) = &self.file {
            config.monitor.input.clone_from(file);
        }
        if let Some(out) = &self.out {
            config.monitor.output.clone_from(out);
        }
        if let Some(interval) = &self.update_interval {
            config.monitor.update_interval.clone_from(interval);
        }
        if let Some(interval) = &self.threshold_interval {
            config.monitor.high_traffic_interval.clone_from(interval);
        }
        if let Some(threshold) = self.threshold_value {
            config.monitor.high_traffic_threshold = threshold;
        }
        if let Some(level) = &self.log_level {
            config.general.log_level.clone_from(level);
        }
        if let Some(format) = &self.log_format {
            config.general.log_format.clone_from(format);
        }
    }
}

/// Reject malformed durations at parse time so clap reports them with usage.
fn interval_arg(value: &str) -> Result<String, ConfigError> {
    parse_duration(value)?;
    Ok(value.to_owned())
}
