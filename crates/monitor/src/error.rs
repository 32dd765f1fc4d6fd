//! 트래픽 모니터 에러 타입
//!
//! [`MonitorError`]는 모니터 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<MonitorError> for HttplogError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use httplog_core::error::{ConfigError, HttplogError};

/// 트래픽 모니터 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Common Log Format에 맞지 않는 라인
    ///
    /// 치명적이지 않습니다. 경고로 출력되고 다음 라인을 계속 처리합니다.
    #[error("could not parse line '{line}': {reason}")]
    MalformedLine {
        /// 문제가 된 라인 원문
        line: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러 (입력 읽기, 출력 쓰기)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl MonitorError {
    /// 잘못된 라인 에러를 생성합니다.
    pub fn malformed(line: &str, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            line: line.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<MonitorError> for HttplogError {
    fn from(err: MonitorError) -> Self {
        match err {
            MonitorError::Io(e) => HttplogError::Io(e),
            MonitorError::Config { field, reason } => {
                HttplogError::Config(ConfigError::InvalidValue { field, reason })
            }
            other => HttplogError::Monitor(other.to_string()),
        }
    }
}
