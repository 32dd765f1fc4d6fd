//! 출력 메시지 -- 모니터가 출력하는 모든 라인의 고정 템플릿
//!
//! ```text
//! no hits to server
//! busiest sections: <s1>, <s2> (<rate> hits per second)
//! WARNING: high traffic of <rate> hits per second, triggered at <RFC 3339>
//! WARNING: high traffic condition resolved at <RFC 3339>
//! WARNING: <parse error>
//! ```

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local, SecondsFormat};

/// 출력 리포트
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// 리포트 윈도우 동안 히트가 없음
    NoHits,
    /// 가장 바쁜 섹션 (동률이면 전부, 사전순)
    BusiestSections {
        /// 최대 히트 수를 기록한 섹션들
        sections: Vec<String>,
        /// 최대 히트 수를 리포트 주기로 나눈 초당 히트 수
        hits_per_second: f64,
    },
    /// 고트래픽 경고 발생
    HighTraffic {
        /// 검사 윈도우의 초당 히트 수
        hits_per_second: f64,
        /// 발생 시각
        triggered_at: DateTime<Local>,
    },
    /// 고트래픽 경고 해제
    TrafficResolved {
        /// 해제 시각
        resolved_at: DateTime<Local>,
    },
    /// 파싱할 수 없는 입력 라인
    MalformedLine {
        /// 에러 메시지 (원문 라인 포함)
        message: String,
    },
}

impl Report {
    /// 섹션 스냅샷에서 리포트 윈도우 요약을 만듭니다.
    ///
    /// 최대 히트 수가 0이면 [`Report::NoHits`]입니다.
    pub fn busiest_sections(section_hits: &HashMap<String, u64>, interval: Duration) -> Self {
        let max_hits = section_hits.values().copied().max().unwrap_or(0);
        if max_hits == 0 {
            return Self::NoHits;
        }

        let mut sections: Vec<String> = section_hits
            .iter()
            .filter(|(_, hits)| **hits == max_hits)
            .map(|(section, _)| section.clone())
            .collect();
        sections.sort_unstable();

        Self::BusiestSections {
            sections,
            hits_per_second: hits_per_second(max_hits, interval),
        }
    }

    /// 메트릭 레이블용 리포트 종류
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoHits | Self::BusiestSections { .. } => "update",
            Self::HighTraffic { .. } | Self::TrafficResolved { .. } => "high_traffic",
            Self::MalformedLine { .. } => "malformed_line",
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHits => f.write_str("no hits to server"),
            Self::BusiestSections {
                sections,
                hits_per_second,
            } => write!(
                f,
                "busiest sections: {} ({:.2} hits per second)",
                sections.join(", "),
                hits_per_second
            ),
            Self::HighTraffic {
                hits_per_second,
                triggered_at,
            } => write!(
                f,
                "WARNING: high traffic of {:.2} hits per second, triggered at {}",
                hits_per_second,
                rfc3339(triggered_at)
            ),
            Self::TrafficResolved { resolved_at } => write!(
                f,
                "WARNING: high traffic condition resolved at {}",
                rfc3339(resolved_at)
            ),
            Self::MalformedLine { message } => write!(f, "WARNING: {message}"),
        }
    }
}

/// 주기 동안의 히트 수를 초당 히트 수로 환산합니다.
pub fn hits_per_second(hits: u64, interval: Duration) -> f64 {
    if interval.is_zero() {
        return 0.0;
    }
    hits as f64 / interval.as_secs_f64()
}

fn rfc3339(at: &DateTime<Local>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
