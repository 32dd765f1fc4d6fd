//! Daemon wiring: configuration resolution, stream opening, and monitor start.
//!
//! Configuration precedence, highest first:
//! CLI flag > `HTTPLOG_*` environment variable > config file > built-in default.

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncWrite};

use httplog_core::config::{HttplogConfig, STDIO_PATH};
use httplog_monitor::MonitorConfig;

use crate::cli::DaemonCli;

/// Boxed input stream (stdin or a file).
pub type Input = Box<dyn AsyncRead + Unpin + Send>;

/// Boxed output stream (stdout or a file).
pub type Output = Box<dyn AsyncWrite + Unpin + Send>;

/// Build the effective configuration from the config file, environment, and CLI flags.
pub async fn resolve_config(cli: &DaemonCli) -> Result<HttplogConfig> {
    let mut config = match &cli.config {
        Some(path) => HttplogConfig::from_file(path)
            .await
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => HttplogConfig::default(),
    };

    config.apply_env_overrides();
    cli.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    Ok(config)
}

/// Open the access log input. `-` means stdin.
pub async fn open_input(path: &str) -> Result<Input> {
    if path == STDIO_PATH {
        return Ok(Box::new(tokio::io::stdin()));
    }

    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("could not open file: {path}"))?;
    Ok(Box::new(file))
}

/// Create (or truncate) the report output. `-` means stdout.
pub async fn open_output(path: &str) -> Result<Output> {
    if path == STDIO_PATH {
        return Ok(Box::new(tokio::io::stdout()));
    }

    let file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("could not open file: {path}"))?;
    Ok(Box::new(file))
}

/// Open both streams and run the monitor until the input reaches end of file.
pub async fn run_monitor(config: &HttplogConfig) -> Result<()> {
    let monitor_config =
        MonitorConfig::from_core(&config.monitor).context("invalid monitor configuration")?;

    let input = open_input(&config.monitor.input).await?;
    let output = open_output(&config.monitor.output).await?;

    tracing::info!(
        input = %config.monitor.input,
        output = %config.monitor.output,
        "httplog starting"
    );

    httplog_monitor::run(monitor_config, input, output)
        .await
        .context("failed to read input")?;

    tracing::info!("httplog shut down");
    Ok(())
}
