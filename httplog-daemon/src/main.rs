use anyhow::Result;
use clap::Parser;

use httplog_daemon::cli::DaemonCli;
use httplog_daemon::{app, logging, metrics_server};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // 설정 해석 (CLI > 환경변수 > 파일 > 기본값)
    let config = app::resolve_config(&cli).await?;

    if cli.validate {
        println!("configuration is valid");
        return Ok(());
    }

    logging::init_tracing(&config.general)?;

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    app::run_monitor(&config).await
}
