//! Common Log Format 파서
//!
//! HTTP 접근 로그 한 줄을 [`AccessLogEntry`]로 변환합니다.
//!
//! # Common Log Format
//! ```text
//! <client> <ident> <user> [<DD/Mon/YYYY:HH:MM:SS ±ZZZZ>] "<METHOD> <path> HTTP/<ver>" <status> <size>
//! ```
//! `<ident>`는 무시합니다. 상태 코드 뒤의 크기가 `-`이면 0으로 처리합니다.
//! 크기 뒤에 이어지는 필드(Combined Log Format의 referer, user-agent 등)는 무시합니다.
//!
//! # 사용 예시
//! ```ignore
//! use httplog_monitor::parser::AccessLogParser;
//!
//! let parser = AccessLogParser::new()?;
//! let entry = parser.parse(r#"127.0.0.1 - james [09/May/2018:16:00:39 +0000] "GET /report HTTP/1.0" 200 123"#)?;
//! assert_eq!(entry.section, "report");
//! ```

use chrono::{DateTime, FixedOffset};
use regex::Regex;

use crate::error::MonitorError;

/// Common Log Format 타임스탬프 형식 (`10/Oct/2000:13:55:36 -0700`)
pub const CLF_TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// 타임스탬프 자릿수 검사 패턴
///
/// chrono의 `%d`, `%Y`, `%z`는 한 자리 일, 두 자리 연도, `+00:00` 오프셋까지
/// 받아들이므로 파싱 전에 고정 폭 형식을 먼저 확인합니다.
const CLF_TIMESTAMP_SHAPE: &str = r"^\d{2}/[A-Za-z]{3}/\d{4}:\d{2}:\d{2}:\d{2} [+-]\d{4}$";

/// 기본 최대 라인 길이 (바이트)
const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

const CLF_PATTERN: &str = concat!(
    r"^(?P<client>\S+)",
    r" \S+",
    r" (?P<user>\S+)",
    r" \[(?P<timestamp>[^\]]+)\]",
    r#" "(?P<method>[A-Z]+)"#,
    r#" (?P<resource>[^ "]*) HTTP/[0-9.]+""#,
    r" (?P<status>[0-9]{3})",
    r" (?P<size>[0-9]+|-)",
);

/// 파싱된 접근 로그 한 건
///
/// 파서가 생성하고 집계기가 즉시 소비한 뒤 버립니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogEntry {
    /// 클라이언트 식별자 (보통 IP 주소)
    pub client_ip: String,
    /// 인증된 사용자 ID (`-`이면 익명)
    pub user_id: String,
    /// 요청 시각
    pub timestamp: DateTime<FixedOffset>,
    /// HTTP 메서드
    pub method: String,
    /// 경로의 첫 번째 세그먼트 (`/api/users` -> `api`)
    pub section: String,
    /// 요청 경로 전체
    pub resource: String,
    /// HTTP 상태 코드
    pub status: u16,
    /// 응답 크기 (바이트). `-`이면 0.
    pub size: u64,
}

/// Common Log Format 파서
///
/// 컴파일된 정규식 하나만 보유하는 무상태 파서입니다.
/// `&self`로 호출하므로 여러 태스크에서 동시에 공유할 수 있습니다.
#[derive(Debug, Clone)]
pub struct AccessLogParser {
    /// 라인 전체 패턴
    pattern: Regex,
    /// 타임스탬프 고정 폭 패턴
    timestamp_shape: Regex,
    /// 최대 허용 라인 길이 (바이트)
    max_line_length: usize,
}

impl AccessLogParser {
    /// 기본 설정으로 새 파서를 생성합니다.
    pub fn new() -> Result<Self, MonitorError> {
        Ok(Self {
            pattern: Regex::new(CLF_PATTERN)?,
            timestamp_shape: Regex::new(CLF_TIMESTAMP_SHAPE)?,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        })
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length;
        self
    }

    /// 최대 허용 라인 길이를 반환합니다.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// 한 줄을 파싱합니다.
    ///
    /// 호출자가 앞뒤 공백을 제거한 라인을 넘긴다고 가정합니다.
    /// 패턴 불일치, 타임스탬프/숫자 필드 파싱 실패는 모두
    /// [`MonitorError::MalformedLine`]으로 반환됩니다.
    pub fn parse(&self, line: &str) -> Result<AccessLogEntry, MonitorError> {
        if line.len() > self.max_line_length {
            return Err(MonitorError::malformed(
                line,
                format!(
                    "line too long: {} bytes (max: {})",
                    line.len(),
                    self.max_line_length
                ),
            ));
        }

        let caps = self
            .pattern
            .captures(line)
            .ok_or_else(|| MonitorError::malformed(line, "does not match Common Log Format"))?;

        // 정규식 그룹은 모두 필수이므로 매칭 성공 시 항상 존재
        let field = |name: &str| caps.name(name).map_or("", |m| m.as_str());

        let raw_timestamp = field("timestamp");
        if !self.timestamp_shape.is_match(raw_timestamp) {
            return Err(MonitorError::malformed(
                line,
                format!("invalid timestamp '{raw_timestamp}': expected DD/Mon/YYYY:HH:MM:SS +ZZZZ"),
            ));
        }
        let timestamp = DateTime::parse_from_str(raw_timestamp, CLF_TIMESTAMP_FORMAT).map_err(
            |e| MonitorError::malformed(line, format!("invalid timestamp '{raw_timestamp}': {e}")),
        )?;

        let raw_status = field("status");
        let status: u16 = raw_status.parse().map_err(|e| {
            MonitorError::malformed(line, format!("invalid status '{raw_status}': {e}"))
        })?;

        let raw_size = field("size");
        let size: u64 = if raw_size == "-" {
            0
        } else {
            raw_size.parse().map_err(|e| {
                MonitorError::malformed(line, format!("invalid size '{raw_size}': {e}"))
            })?
        };

        let resource = field("resource");

        Ok(AccessLogEntry {
            client_ip: field("client").to_owned(),
            user_id: field("user").to_owned(),
            timestamp,
            method: field("method").to_owned(),
            section: section_of(resource).to_owned(),
            resource: resource.to_owned(),
            status,
            size,
        })
    }
}

/// 요청 경로에서 섹션(첫 번째 `/` 구분 세그먼트)을 추출합니다.
///
/// `/section-a/posts` -> `section-a`, `/` -> `""`
pub fn section_of(resource: &str) -> &str {
    let path = resource.strip_prefix('/').unwrap_or(resource);
    path.split_once('/').map_or(path, |(first, _)| first)
}
