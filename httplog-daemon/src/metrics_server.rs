//! Prometheus scrape endpoint for the traffic monitor.
//!
//! `[metrics] enabled = true` installs a global Prometheus recorder with its
//! built-in HTTP listener, so every `metrics::counter!()` / `metrics::gauge!()`
//! call in `httplog-monitor` becomes visible at `http://<listen_addr>:<port>/metrics`.
//!
//! The monitor only touches a series when something happens, so the recorder
//! is seeded with zeroed series right after installation. A scrape before the
//! first report then already shows `httplog_monitor_high_traffic_active 0`.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;

use httplog_core::config::MetricsConfig;
use httplog_core::metrics as m;

/// Resolve the listener address from `listen_addr` and `port`.
pub fn listen_addr(config: &MetricsConfig) -> Result<SocketAddr> {
    let addr: SocketAddr = format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid metrics listen address '{}:{}'",
                config.listen_addr, config.port
            )
        })?;
    Ok(addr)
}

/// Install the global recorder, start the listener, and seed the monitor series.
///
/// Call once per process, before the monitor starts. Returns the bound address.
///
/// # Errors
///
/// - The listen address does not parse
/// - Socket binding fails
/// - A global recorder is already installed
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<SocketAddr> {
    let addr = listen_addr(config)?;

    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics listener is bound to all interfaces"
        );
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {}", e))?;

    m::describe_all();
    seed_monitor_metrics();

    tracing::info!(listen_addr = %addr, "serving monitor metrics on /metrics");
    Ok(addr)
}

/// Register every monitor series at zero on the current recorder.
pub fn seed_monitor_metrics() {
    for name in [
        m::MONITOR_LINES_READ_TOTAL,
        m::MONITOR_LINES_PARSED_TOTAL,
        m::MONITOR_PARSE_ERRORS_TOTAL,
        m::MONITOR_HIGH_TRAFFIC_TRIGGERED_TOTAL,
        m::MONITOR_HIGH_TRAFFIC_RESOLVED_TOTAL,
    ] {
        metrics::counter!(name).absolute(0);
    }

    for report in ["update", "high_traffic", "malformed_line"] {
        metrics::counter!(m::MONITOR_REPORTS_EMITTED_TOTAL, m::LABEL_REPORT => report).absolute(0);
    }

    metrics::gauge!(m::MONITOR_BUSIEST_HITS_PER_SECOND).set(0.0);
    metrics::gauge!(m::MONITOR_HIGH_TRAFFIC_ACTIVE).set(0.0);
}
