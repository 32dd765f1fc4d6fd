//! 트래픽 모니터 -- 수집 루프와 리포트 동작
//!
//! [`TrafficMonitor`]는 파서, 공유 상태, 출력 핸들을 묶은 집계기입니다.
//!
//! # 데이터 흐름
//! ```text
//! AsyncRead --read_until('\n')--> ingest() --parse--> TrafficStats::record()
//!                                    |
//!                                    +--(malformed)--> ReportSink ("WARNING: ...")
//!
//! ReportScheduler --tick--> run_update_report() / run_traffic_check() --> ReportSink
//! ```
//!
//! # 사용 예시
//! ```ignore
//! use httplog_monitor::{MonitorConfig, ReportSink, TrafficMonitor};
//!
//! let monitor = TrafficMonitor::new(MonitorConfig::default(), ReportSink::new(tokio::io::stdout()))?;
//! monitor.run(tokio::io::stdin()).await?;
//! ```

use std::sync::Arc;

use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, BufReader};
use tracing::{debug, error, info, warn};

use httplog_core::metrics as m;

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::parser::AccessLogParser;
use crate::report::{Report, hits_per_second};
use crate::scheduler::ReportScheduler;
use crate::sink::ReportSink;
use crate::state::{TrafficStats, TrafficTransition};

/// 접근 로그 집계기
///
/// 복제본은 같은 상태와 출력 스트림을 공유합니다.
/// 스케줄러 태스크는 복제본 하나를 소유합니다.
#[derive(Debug, Clone)]
pub struct TrafficMonitor {
    /// 모니터 설정
    config: MonitorConfig,
    /// Common Log Format 파서
    parser: Arc<AccessLogParser>,
    /// 섹션 카운터와 고트래픽 상태
    stats: Arc<TrafficStats>,
    /// 출력 스트림
    sink: ReportSink,
}

impl TrafficMonitor {
    /// 새 모니터를 생성합니다.
    pub fn new(config: MonitorConfig, sink: ReportSink) -> Result<Self, MonitorError> {
        config.validate()?;
        Ok(Self {
            config,
            parser: Arc::new(AccessLogParser::new()?),
            stats: Arc::new(TrafficStats::new()),
            sink,
        })
    }

    /// 모니터 설정을 반환합니다.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// 공유 상태를 반환합니다.
    pub fn stats(&self) -> &TrafficStats {
        &self.stats
    }

    /// 로그 한 줄을 수집합니다.
    ///
    /// 파싱에 실패하면 출력 스트림에 경고를 쓰고 카운터는 건드리지 않습니다.
    /// 에러는 경고 출력 자체가 실패한 경우에만 반환됩니다.
    pub async fn ingest(&self, line: &str) -> Result<(), MonitorError> {
        metrics::counter!(m::MONITOR_LINES_READ_TOTAL).increment(1);

        match self.parser.parse(line) {
            Ok(entry) => {
                self.stats.record(&entry.section);
                metrics::counter!(m::MONITOR_LINES_PARSED_TOTAL).increment(1);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "skipping malformed line");
                metrics::counter!(m::MONITOR_PARSE_ERRORS_TOTAL).increment(1);
                self.sink
                    .emit(&Report::MalformedLine {
                        message: e.to_string(),
                    })
                    .await
            }
        }
    }

    /// 리포트 윈도우를 마감하고 가장 바쁜 섹션 리포트를 출력합니다.
    pub async fn run_update_report(&self) -> Result<Report, MonitorError> {
        let snapshot = self.stats.take_section_hits();
        let report = Report::busiest_sections(&snapshot, self.config.update_interval);

        let rate = match &report {
            Report::BusiestSections {
                hits_per_second, ..
            } => *hits_per_second,
            _ => 0.0,
        };
        metrics::gauge!(m::MONITOR_BUSIEST_HITS_PER_SECOND).set(rate);

        debug!(sections = snapshot.len(), hits_per_second = rate, "update report");
        self.sink.emit(&report).await?;
        Ok(report)
    }

    /// 검사 윈도우를 마감하고 고트래픽 상태 전이가 있으면 경고를 출력합니다.
    pub async fn run_traffic_check(&self) -> Result<Option<Report>, MonitorError> {
        let transition = self
            .stats
            .check_high_traffic(self.config.high_traffic_threshold);

        let report = match transition {
            Some(TrafficTransition::Triggered { total_hits }) => {
                let rate = hits_per_second(total_hits, self.config.high_traffic_interval);
                warn!(
                    total_hits,
                    hits_per_second = rate,
                    threshold = self.config.high_traffic_threshold,
                    "high traffic triggered"
                );
                metrics::counter!(m::MONITOR_HIGH_TRAFFIC_TRIGGERED_TOTAL).increment(1);
                metrics::gauge!(m::MONITOR_HIGH_TRAFFIC_ACTIVE).set(1.0);
                Report::HighTraffic {
                    hits_per_second: rate,
                    triggered_at: Local::now(),
                }
            }
            Some(TrafficTransition::Resolved) => {
                info!("high traffic resolved");
                metrics::counter!(m::MONITOR_HIGH_TRAFFIC_RESOLVED_TOTAL).increment(1);
                metrics::gauge!(m::MONITOR_HIGH_TRAFFIC_ACTIVE).set(0.0);
                Report::TrafficResolved {
                    resolved_at: Local::now(),
                }
            }
            None => return Ok(None),
        };

        self.sink.emit(&report).await?;
        Ok(Some(report))
    }

    /// 입력 스트림이 끝날 때까지 라인을 수집합니다.
    ///
    /// 스케줄러를 시작한 뒤 줄 단위로 읽어 [`ingest`](Self::ingest)를 호출합니다.
    /// EOF에서 `Ok(())`를 반환하고, EOF가 아닌 읽기 에러는 `MonitorError::Io`로 반환합니다.
    /// 어느 경우든 스케줄러가 완전히 멈춘 뒤에 반환합니다.
    pub async fn run<R>(&self, input: R) -> Result<(), MonitorError>
    where
        R: AsyncRead + Unpin,
    {
        info!("traffic monitor started");
        let scheduler = ReportScheduler::spawn(self.clone());

        let result = self.read_lines(input).await;

        scheduler.shutdown().await;
        if let Err(e) = self.sink.flush().await {
            warn!(error = %e, "failed to flush output");
        }

        match &result {
            Ok(()) => info!("traffic monitor stopped"),
            Err(e) => error!(error = %e, "traffic monitor stopped with error"),
        }
        result
    }

    async fn read_lines<R>(&self, input: R) -> Result<(), MonitorError>
    where
        R: AsyncRead + Unpin,
    {
        let mut reader = BufReader::new(input);
        let mut buf = Vec::new();
        // 최대 길이 + CRLF까지 한 번에 읽고, 넘치면 나머지는 버림
        let max_line_length = self.parser.max_line_length();
        let limit = max_line_length as u64 + 2;

        loop {
            buf.clear();
            let read = (&mut reader).take(limit).read_until(b'\n', &mut buf).await?;
            if read == 0 {
                debug!("input stream reached end of file");
                return Ok(());
            }

            let result = if read as u64 == limit && buf.last() != Some(&b'\n') {
                let length = read + skip_line(&mut reader).await?;
                self.reject_oversized_line(&buf, length, max_line_length)
                    .await
            } else {
                let line = String::from_utf8_lossy(&buf);
                self.ingest(line.trim()).await
            };

            if let Err(e) = result {
                error!(error = %e, "failed to write warning");
            }
        }
    }

    /// 길이 제한을 넘은 라인을 경고로 출력합니다. 경고에는 앞부분만 담습니다.
    async fn reject_oversized_line(
        &self,
        head: &[u8],
        length: usize,
        max_line_length: usize,
    ) -> Result<(), MonitorError> {
        metrics::counter!(m::MONITOR_LINES_READ_TOTAL).increment(1);
        metrics::counter!(m::MONITOR_PARSE_ERRORS_TOTAL).increment(1);

        let preview = String::from_utf8_lossy(&head[..head.len().min(OVERSIZED_LINE_PREVIEW)]);
        let err = MonitorError::malformed(
            &format!("{}...", preview.trim()),
            format!("line too long: {length} bytes (max: {max_line_length})"),
        );
        warn!(error = %err, "skipping malformed line");
        self.sink
            .emit(&Report::MalformedLine {
                message: err.to_string(),
            })
            .await
    }
}

/// 길이 초과 라인 경고에 포함할 앞부분 길이 (바이트)
const OVERSIZED_LINE_PREVIEW: usize = 64;

/// 다음 개행(포함)이나 EOF까지 버리고, 개행을 뺀 버린 바이트 수를 반환합니다.
async fn skip_line<B>(reader: &mut B) -> std::io::Result<usize>
where
    B: AsyncBufRead + Unpin,
{
    let mut skipped = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(skipped);
        }

        let (consumed, found) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };
        reader.consume(consumed);
        if found {
            return Ok(skipped + consumed - 1);
        }
        skipped += consumed;
    }
}

/// 설정과 입출력 스트림으로 모니터를 만들어 입력이 끝날 때까지 실행합니다.
pub async fn run<R, W>(config: MonitorConfig, input: R, output: W) -> Result<(), MonitorError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Send + 'static,
{
    let monitor = TrafficMonitor::new(config, ReportSink::new(output))?;
    monitor.run(input).await
}
