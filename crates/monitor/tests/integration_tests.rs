//! 통합 테스트 -- 입력 스트림부터 출력 리포트까지의 전체 흐름 검증
//!
//! 타이머 동작은 일시정지된 tokio 시계(`start_paused`)로 결정적으로 검증합니다.
//! 모든 테스트는 입력을 닫아 `run`을 끝낸 뒤 출력 전체를 한 번에 비교합니다.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use regex::Regex;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, DuplexStream, ReadBuf};
use tokio::task::JoinHandle;

use httplog_monitor::{MonitorConfig, MonitorConfigBuilder, MonitorError, ReportSink, TrafficMonitor};

const RFC3339: &str = r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(Z|[+-]\d{2}:\d{2})";

fn log_line(section: &str) -> String {
    format!(
        r#"127.0.0.1 - james [09/May/2018:16:00:39 +0000] "GET /{section}/item HTTP/1.0" 200 123"#
    )
}

fn config(update: Duration, traffic: Duration, threshold: u64) -> MonitorConfig {
    MonitorConfigBuilder::new()
        .update_interval(update)
        .high_traffic_interval(traffic)
        .high_traffic_threshold(threshold)
        .build()
        .expect("valid config")
}

/// 모니터를 백그라운드에서 실행하고 (입력 writer, 출력 reader, 실행 핸들)을 반환합니다.
fn start(config: MonitorConfig) -> (DuplexStream, DuplexStream, JoinHandle<Result<(), MonitorError>>) {
    let (input_writer, input_reader) = tokio::io::duplex(64 * 1024);
    let (output_writer, output_reader) = tokio::io::duplex(64 * 1024);
    let handle = tokio::spawn(httplog_monitor::run(config, input_reader, output_writer));
    (input_writer, output_reader, handle)
}

async fn send(input: &mut DuplexStream, sections: &[&str]) {
    for section in sections {
        input
            .write_all(format!("{}\n", log_line(section)).as_bytes())
            .await
            .expect("write input");
    }
}

async fn finish(
    input: DuplexStream,
    mut output: DuplexStream,
    handle: JoinHandle<Result<(), MonitorError>>,
) -> String {
    drop(input);
    handle.await.expect("join").expect("run returns Ok on EOF");
    let mut text = String::new();
    output.read_to_string(&mut text).await.expect("read output");
    text
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_update_report_per_window() {
    let (mut input, output, handle) = start(config(Duration::from_secs(1), Duration::ZERO, 10));

    send(&mut input, &["a", "a", "b"]).await;
    sleep_ms(1001).await;

    send(&mut input, &["c", "b", "a"]).await;
    sleep_ms(1000).await;

    // 입력 없는 윈도우
    sleep_ms(1000).await;

    let text = finish(input, output, handle).await;
    assert_eq!(
        text,
        "busiest sections: a (2.00 hits per second)\n\
         busiest sections: a, b, c (1.00 hits per second)\n\
         no hits to server\n"
    );
}

#[tokio::test(start_paused = true)]
async fn test_update_rate_uses_interval() {
    let (mut input, output, handle) = start(config(Duration::from_secs(10), Duration::ZERO, 10));

    send(&mut input, &["api"; 25]).await;
    send(&mut input, &["static"; 5]).await;
    sleep_ms(10_001).await;

    let text = finish(input, output, handle).await;
    assert_eq!(text, "busiest sections: api (2.50 hits per second)\n");
}

#[tokio::test(start_paused = true)]
async fn test_high_traffic_alert_and_resolve() {
    let (mut input, output, handle) = start(config(Duration::ZERO, Duration::from_secs(1), 10));

    // 임계값과 같으면 경고 없음
    send(&mut input, &["a"; 10]).await;
    sleep_ms(1001).await;

    // 임계값 초과 -> 경고 발생
    send(&mut input, &["a"; 11]).await;
    sleep_ms(1000).await;

    // 계속 초과 -> 추가 메시지 없음
    send(&mut input, &["a"; 11]).await;
    sleep_ms(1000).await;

    // 트래픽 없음 -> 해제
    sleep_ms(1000).await;

    // Normal 유지 -> 메시지 없음
    sleep_ms(1000).await;

    let text = finish(input, output, handle).await;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2, "unexpected output: {text:?}");

    let triggered = Regex::new(&format!(
        r"^WARNING: high traffic of 11\.00 hits per second, triggered at {RFC3339}$"
    ))
    .unwrap();
    assert!(triggered.is_match(lines[0]), "unexpected line: {}", lines[0]);

    let resolved =
        Regex::new(&format!(r"^WARNING: high traffic condition resolved at {RFC3339}$")).unwrap();
    assert!(resolved.is_match(lines[1]), "unexpected line: {}", lines[1]);
}

#[tokio::test(start_paused = true)]
async fn test_both_timers_share_the_sink() {
    let (mut input, output, handle) =
        start(config(Duration::from_secs(1), Duration::from_secs(2), 3));

    send(&mut input, &["a", "a", "b", "b"]).await;
    sleep_ms(2001).await;

    let text = finish(input, output, handle).await;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3, "unexpected output: {text:?}");
    assert_eq!(lines[0], "busiest sections: a, b (2.00 hits per second)");
    assert_eq!(lines[1], "no hits to server");
    assert!(lines[2].starts_with("WARNING: high traffic of 2.00 hits per second, triggered at "));
}

#[tokio::test(start_paused = true)]
async fn test_zero_intervals_never_fire() {
    let (mut input, output, handle) = start(config(Duration::ZERO, Duration::ZERO, 0));

    send(&mut input, &["a"; 50]).await;
    sleep_ms(24 * 60 * 60 * 1000).await;

    let text = finish(input, output, handle).await;
    assert_eq!(text, "");
}

#[tokio::test(start_paused = true)]
async fn test_malformed_line_is_reported_and_skipped() {
    let (mut input, output, handle) = start(config(Duration::from_secs(1), Duration::ZERO, 10));

    input
        .write_all(b"garbage line\n")
        .await
        .expect("write input");
    sleep_ms(1001).await;

    let text = finish(input, output, handle).await;
    assert_eq!(
        text,
        "WARNING: could not parse line 'garbage line': does not match Common Log Format\n\
         no hits to server\n"
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_section_is_counted() {
    let (mut input, output, handle) = start(config(Duration::from_secs(1), Duration::ZERO, 10));

    input
        .write_all(
            b"10.0.0.1 - - [09/May/2018:16:00:39 +0000] \"GET / HTTP/1.1\" 304 -\n",
        )
        .await
        .expect("write input");
    sleep_ms(1001).await;

    let text = finish(input, output, handle).await;
    assert_eq!(text, "busiest sections:  (1.00 hits per second)\n");
}

#[tokio::test]
async fn test_run_returns_after_eof_without_reports() {
    let input = [log_line("a"), log_line("b")].join("\n");
    let (output_writer, mut output_reader) = tokio::io::duplex(1024);

    httplog_monitor::run(MonitorConfig::default(), input.as_bytes(), output_writer)
        .await
        .expect("run");

    let mut text = String::new();
    output_reader.read_to_string(&mut text).await.unwrap();
    assert_eq!(text, "");
}

/// 데이터를 한 번 돌려준 뒤 읽기 에러를 내는 입력
struct FailingReader {
    data: Option<Vec<u8>>,
}

impl AsyncRead for FailingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.data.take() {
            Some(data) => {
                buf.put_slice(&data);
                Poll::Ready(Ok(()))
            }
            None => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            ))),
        }
    }
}

#[tokio::test]
async fn test_read_error_is_fatal() {
    let (output_writer, _output_reader) = tokio::io::duplex(1024);
    let monitor =
        TrafficMonitor::new(MonitorConfig::default(), ReportSink::new(output_writer)).unwrap();
    let input = FailingReader {
        data: Some(format!("{}\n", log_line("a")).into_bytes()),
    };

    let err = monitor.run(input).await.unwrap_err();
    assert!(matches!(err, MonitorError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
    // 에러 이전의 라인은 수집됨
    assert_eq!(monitor.stats().total_hits(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ingest_from_many_tasks() {
    let (output_writer, _output_reader) = tokio::io::duplex(1024);
    let monitor = Arc::new(
        TrafficMonitor::new(
            config(Duration::ZERO, Duration::ZERO, 10),
            ReportSink::new(output_writer),
        )
        .unwrap(),
    );

    let mut handles = Vec::new();
    for i in 0..8 {
        let monitor = Arc::clone(&monitor);
        handles.push(tokio::spawn(async move {
            let line = log_line(&format!("s{}", i % 4));
            for _ in 0..500 {
                monitor.ingest(&line).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let hits = monitor.stats().section_hits();
    assert_eq!(hits.len(), 4);
    assert!(hits.values().all(|&count| count == 1000));
    assert_eq!(monitor.stats().total_hits(), 4000);

    // 윈도우 마감 시 카운터와 총합이 동시에 일관됨
    let snapshot = monitor.stats().take_section_hits();
    assert_eq!(snapshot.values().sum::<u64>(), 4000);
    assert!(monitor.stats().section_hits().is_empty());
}
