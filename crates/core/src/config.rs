//! 설정 관리 — httplog.toml 파싱 및 런타임 설정
//!
//! [`HttplogConfig`]는 데몬과 모니터의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`HTTPLOG_MONITOR_UPDATE_INTERVAL=5s` 형식)
//! 3. 설정 파일 (`httplog.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), httplog_core::error::HttplogError> {
//! use httplog_core::config::HttplogConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = HttplogConfig::load("httplog.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HttplogConfig::parse("[monitor]\nupdate_interval = \"5s\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, HttplogError};

/// 입력/출력 경로에서 표준 입출력을 뜻하는 값
pub const STDIO_PATH: &str = "-";

/// httplog 통합 설정
///
/// `httplog.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttplogConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 트래픽 모니터 설정
    #[serde(default)]
    pub monitor: MonitorSection,
    /// Prometheus 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl HttplogConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HttplogError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, HttplogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HttplogError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                HttplogError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, HttplogError> {
        toml::from_str(toml_str).map_err(|e| {
            HttplogError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `HTTPLOG_{SECTION}_{FIELD}`
    /// 예: `HTTPLOG_MONITOR_HIGH_TRAFFIC_THRESHOLD=50`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "HTTPLOG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "HTTPLOG_GENERAL_LOG_FORMAT");

        // Monitor
        override_string(&mut self.monitor.input, "HTTPLOG_MONITOR_INPUT");
        override_string(&mut self.monitor.output, "HTTPLOG_MONITOR_OUTPUT");
        override_string(
            &mut self.monitor.update_interval,
            "HTTPLOG_MONITOR_UPDATE_INTERVAL",
        );
        override_string(
            &mut self.monitor.high_traffic_interval,
            "HTTPLOG_MONITOR_HIGH_TRAFFIC_INTERVAL",
        );
        override_u64(
            &mut self.monitor.high_traffic_threshold,
            "HTTPLOG_MONITOR_HIGH_TRAFFIC_THRESHOLD",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "HTTPLOG_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "HTTPLOG_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "HTTPLOG_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HttplogError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        self.monitor.update_interval()?;
        self.monitor.high_traffic_interval()?;

        if self.monitor.input.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "monitor.input".to_owned(),
                reason: format!("must be a file path or '{STDIO_PATH}'"),
            }
            .into());
        }

        if self.monitor.output.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "monitor.output".to_owned(),
                reason: format!("must be a file path or '{STDIO_PATH}'"),
            }
            .into());
        }

        if self.metrics.enabled {
            if self.metrics.port == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "metrics.port".to_owned(),
                    reason: "port must be non-zero when metrics are enabled".to_owned(),
                }
                .into());
            }

            if self.metrics.listen_addr.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "metrics.listen_addr".to_owned(),
                    reason: "listen address must not be empty when metrics are enabled"
                        .to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 트래픽 모니터 설정
///
/// 간격 값은 Go 스타일 duration 문자열입니다 (`"10s"`, `"2m"`, `"1h30m"`).
/// `"0"`은 해당 주기 리포트를 비활성화합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    /// 입력 파일 경로 (`-`이면 표준 입력)
    pub input: String,
    /// 출력 파일 경로 (`-`이면 표준 출력)
    pub output: String,
    /// 가장 바쁜 섹션 리포트 주기
    pub update_interval: String,
    /// 고트래픽 검사 주기
    pub high_traffic_interval: String,
    /// 고트래픽 경고를 발생시키는 검사 주기당 최대 히트 수
    pub high_traffic_threshold: u64,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            input: STDIO_PATH.to_owned(),
            output: STDIO_PATH.to_owned(),
            update_interval: "10s".to_owned(),
            high_traffic_interval: "2m".to_owned(),
            high_traffic_threshold: 10,
        }
    }
}

impl MonitorSection {
    /// 파싱된 리포트 주기를 반환합니다.
    pub fn update_interval(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.update_interval).map_err(|e| with_field(e, "monitor.update_interval"))
    }

    /// 파싱된 고트래픽 검사 주기를 반환합니다.
    pub fn high_traffic_interval(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.high_traffic_interval)
            .map_err(|e| with_field(e, "monitor.high_traffic_interval"))
    }
}

/// Prometheus 메트릭 엔드포인트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트 (스크레이프 경로는 항상 `/metrics`)
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
        }
    }
}

/// Go 스타일 duration 문자열을 파싱합니다.
///
/// 숫자와 단위 쌍의 연속입니다 (`"300ms"`, `"1.5h"`, `"2h45m"`).
/// 지원 단위: `ns`, `us`(`µs`), `ms`, `s`, `m`, `h`. 단위 없는 `"0"`은 0입니다.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let s = input.trim();
    let invalid = |reason: String| ConfigError::InvalidValue {
        field: "duration".to_owned(),
        reason: format!("'{s}': {reason}"),
    };

    if s.is_empty() {
        return Err(invalid("empty duration".to_owned()));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos: u128 = 0;
    let mut rest = s;

    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(invalid("expected a number".to_owned()));
        }
        let (number, tail) = rest.split_at(num_len);

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            "" => return Err(invalid(format!("missing unit after '{number}'"))),
            other => return Err(invalid(format!("unknown unit '{other}'"))),
        };

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("expected a number".to_owned()));
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| invalid(format!("invalid number '{number}'")))?
        };
        total_nanos = whole
            .checked_mul(unit_nanos)
            .and_then(|nanos| total_nanos.checked_add(nanos))
            .ok_or_else(|| invalid("duration out of range".to_owned()))?;

        if !fraction.is_empty() {
            if fraction.contains('.') || fraction.len() > 18 {
                return Err(invalid(format!("invalid number '{number}'")));
            }
            let digits: u128 = fraction
                .parse()
                .map_err(|_| invalid(format!("invalid number '{number}'")))?;
            total_nanos += digits * unit_nanos / 10u128.pow(fraction.len() as u32);
        }

        rest = tail;
    }

    let nanos = u64::try_from(total_nanos).map_err(|_| invalid("duration out of range".to_owned()))?;
    Ok(Duration::from_nanos(nanos))
}

/// duration 파싱 에러의 필드명을 실제 설정 키로 바꿉니다.
fn with_field(err: ConfigError, field: &str) -> ConfigError {
    match err {
        ConfigError::InvalidValue { reason, .. } => ConfigError::InvalidValue {
            field: field.to_owned(),
            reason,
        },
        other => other,
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
