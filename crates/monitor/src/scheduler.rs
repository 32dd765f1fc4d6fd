//! 리포트 스케줄러 -- 두 개의 독립 타이머로 주기 리포트를 실행하는 백그라운드 태스크
//!
//! ```text
//! ReportScheduler (tokio task)
//!   select! (biased)
//!     cancel.cancelled()     -> break
//!     update tick            -> TrafficMonitor::run_update_report()
//!     high traffic tick      -> TrafficMonitor::run_traffic_check()
//! ```
//!
//! 주기가 0인 타이머는 생성하지 않고 영원히 대기하는 future로 대체합니다.
//! 첫 틱은 시작 후 한 주기가 지난 시점에 발생합니다.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::monitor::TrafficMonitor;

/// 백그라운드 리포트 스케줄러 핸들
///
/// [`shutdown`](Self::shutdown)은 취소 신호를 보내고 태스크 종료까지 기다립니다.
/// 반환 이후에는 어떤 리포트도 출력되지 않습니다.
/// 핸들이 그냥 drop되면 취소 신호만 보냅니다.
#[derive(Debug)]
pub struct ReportScheduler {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ReportScheduler {
    /// 스케줄러 태스크를 시작합니다.
    ///
    /// 현재 tokio 런타임 안에서 호출해야 합니다.
    pub fn spawn(monitor: TrafficMonitor) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let config = monitor.config().clone();
            let mut update = periodic(config.update_interval);
            let mut traffic = periodic(config.high_traffic_interval);

            info!(
                update_interval_ms = config.update_interval.as_millis() as u64,
                high_traffic_interval_ms = config.high_traffic_interval.as_millis() as u64,
                high_traffic_threshold = config.high_traffic_threshold,
                "report scheduler started"
            );

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => {
                        debug!("report scheduler received shutdown signal");
                        break;
                    }
                    _ = next_tick(&mut update) => {
                        if let Err(e) = monitor.run_update_report().await {
                            error!(error = %e, "failed to emit update report");
                        }
                    }
                    _ = next_tick(&mut traffic) => {
                        if let Err(e) = monitor.run_traffic_check().await {
                            error!(error = %e, "failed to emit high traffic report");
                        }
                    }
                }
            }

            info!("report scheduler stopped");
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// 취소 신호를 보내고 스케줄러 태스크가 끝날 때까지 기다립니다.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(error = %e, "report scheduler task failed");
            }
        }
    }

    /// 취소 신호가 전송되었는지 확인합니다.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ReportScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// 주기가 0이면 `None`(비활성화)을 반환합니다.
fn periodic(period: Duration) -> Option<Interval> {
    if period.is_zero() {
        return None;
    }
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    Some(interval)
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
