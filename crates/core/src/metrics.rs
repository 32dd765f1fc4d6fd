//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 모니터는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()` 매크로를 호출합니다.
//! 전역 레코더가 설치되지 않은 경우 매크로 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `httplog_`
//! - 모듈명: `monitor_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(httplog_core::metrics::MONITOR_LINES_READ_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 리포트 종류 레이블 키 (update, high_traffic, malformed_line)
pub const LABEL_REPORT: &str = "report";

// ─── Monitor 메트릭 ─────────────────────────────────────────────────

/// Monitor: 입력 스트림에서 읽은 라인 수 (counter)
pub const MONITOR_LINES_READ_TOTAL: &str = "httplog_monitor_lines_read_total";

/// Monitor: 파싱에 성공한 라인 수 (counter)
pub const MONITOR_LINES_PARSED_TOTAL: &str = "httplog_monitor_lines_parsed_total";

/// Monitor: 파싱 에러 수 (counter)
pub const MONITOR_PARSE_ERRORS_TOTAL: &str = "httplog_monitor_parse_errors_total";

/// Monitor: 출력된 리포트 수 (counter, label: report)
pub const MONITOR_REPORTS_EMITTED_TOTAL: &str = "httplog_monitor_reports_emitted_total";

/// Monitor: 고트래픽 경고 발생 수 (counter)
pub const MONITOR_HIGH_TRAFFIC_TRIGGERED_TOTAL: &str =
    "httplog_monitor_high_traffic_triggered_total";

/// Monitor: 고트래픽 경고 해제 수 (counter)
pub const MONITOR_HIGH_TRAFFIC_RESOLVED_TOTAL: &str = "httplog_monitor_high_traffic_resolved_total";

/// Monitor: 직전 리포트 윈도우의 가장 바쁜 섹션 초당 히트 수 (gauge)
pub const MONITOR_BUSIEST_HITS_PER_SECOND: &str = "httplog_monitor_busiest_hits_per_second";

/// Monitor: 고트래픽 상태 여부 (gauge, 0 또는 1)
pub const MONITOR_HIGH_TRAFFIC_ACTIVE: &str = "httplog_monitor_high_traffic_active";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        MONITOR_LINES_READ_TOTAL,
        "Total number of lines read from the input stream"
    );
    describe_counter!(
        MONITOR_LINES_PARSED_TOTAL,
        "Total number of lines parsed as Common Log Format entries"
    );
    describe_counter!(
        MONITOR_PARSE_ERRORS_TOTAL,
        "Total number of malformed lines skipped"
    );
    describe_counter!(
        MONITOR_REPORTS_EMITTED_TOTAL,
        "Total number of report lines written to the output sink"
    );
    describe_counter!(
        MONITOR_HIGH_TRAFFIC_TRIGGERED_TOTAL,
        "Total number of high traffic alerts triggered"
    );
    describe_counter!(
        MONITOR_HIGH_TRAFFIC_RESOLVED_TOTAL,
        "Total number of high traffic alerts resolved"
    );
    describe_gauge!(
        MONITOR_BUSIEST_HITS_PER_SECOND,
        "Hits per second of the busiest section in the last update window"
    );
    describe_gauge!(
        MONITOR_HIGH_TRAFFIC_ACTIVE,
        "1 while the high traffic condition is active, 0 otherwise"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        MONITOR_LINES_READ_TOTAL,
        MONITOR_LINES_PARSED_TOTAL,
        MONITOR_PARSE_ERRORS_TOTAL,
        MONITOR_REPORTS_EMITTED_TOTAL,
        MONITOR_HIGH_TRAFFIC_TRIGGERED_TOTAL,
        MONITOR_HIGH_TRAFFIC_RESOLVED_TOTAL,
        MONITOR_BUSIEST_HITS_PER_SECOND,
        MONITOR_HIGH_TRAFFIC_ACTIVE,
    ];

    #[test]
    fn all_metrics_start_with_httplog_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("httplog_"),
                "Metric '{}' does not start with 'httplog_' prefix",
                name
            );
        }
    }

    #[test]
    fn counters_end_with_total() {
        let counters = [
            MONITOR_LINES_READ_TOTAL,
            MONITOR_LINES_PARSED_TOTAL,
            MONITOR_PARSE_ERRORS_TOTAL,
            MONITOR_REPORTS_EMITTED_TOTAL,
            MONITOR_HIGH_TRAFFIC_TRIGGERED_TOTAL,
            MONITOR_HIGH_TRAFFIC_RESOLVED_TOTAL,
        ];
        for name in counters {
            assert!(name.ends_with("_total"), "counter '{name}' must end with _total");
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        // 레코더 없이 호출해도 패닉이 없어야 함
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        assert_eq!(LABEL_REPORT.to_lowercase(), LABEL_REPORT);
    }
}
