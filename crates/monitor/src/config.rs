//! 트래픽 모니터 설정
//!
//! [`MonitorConfig`]는 core의 [`MonitorSection`](httplog_core::config::MonitorSection)을
//! 파싱된 `Duration` 값으로 변환한 런타임 설정입니다.
//!
//! # 사용 예시
//! ```ignore
//! use httplog_core::config::HttplogConfig;
//! use httplog_monitor::config::MonitorConfig;
//!
//! let core_config = HttplogConfig::default();
//! let config = MonitorConfig::from_core(&core_config.monitor)?;
//! ```

use std::time::Duration;

use httplog_core::config::MonitorSection;

use crate::error::MonitorError;

/// 타이머 주기 상한 (7일)
const MAX_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// 트래픽 모니터 설정
///
/// 간격이 `Duration::ZERO`이면 해당 주기 리포트는 한 번도 실행되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// 가장 바쁜 섹션 리포트 주기 (0 = 비활성화)
    pub update_interval: Duration,
    /// 고트래픽 검사 주기 (0 = 비활성화)
    pub high_traffic_interval: Duration,
    /// 검사 주기당 허용 히트 수. 이 값을 초과해야 경고가 발생합니다.
    pub high_traffic_threshold: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_secs(10),
            high_traffic_interval: Duration::from_secs(2 * 60),
            high_traffic_threshold: 10,
        }
    }
}

impl MonitorConfig {
    /// core의 `MonitorSection`에서 모니터 설정을 생성합니다.
    pub fn from_core(core: &MonitorSection) -> Result<Self, MonitorError> {
        let update_interval = core.update_interval().map_err(config_error)?;
        let high_traffic_interval = core.high_traffic_interval().map_err(config_error)?;

        let config = Self {
            update_interval,
            high_traffic_interval,
            high_traffic_threshold: core.high_traffic_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    /// 리포트 주기가 활성화되어 있는지 확인합니다.
    pub fn update_enabled(&self) -> bool {
        !self.update_interval.is_zero()
    }

    /// 고트래픽 검사가 활성화되어 있는지 확인합니다.
    pub fn high_traffic_enabled(&self) -> bool {
        !self.high_traffic_interval.is_zero()
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.update_interval > MAX_INTERVAL {
            return Err(MonitorError::Config {
                field: "update_interval".to_owned(),
                reason: format!("must be at most {}s", MAX_INTERVAL.as_secs()),
            });
        }

        if self.high_traffic_interval > MAX_INTERVAL {
            return Err(MonitorError::Config {
                field: "high_traffic_interval".to_owned(),
                reason: format!("must be at most {}s", MAX_INTERVAL.as_secs()),
            });
        }

        Ok(())
    }
}

fn config_error(err: httplog_core::ConfigError) -> MonitorError {
    match err {
        httplog_core::ConfigError::InvalidValue { field, reason } => {
            MonitorError::Config { field, reason }
        }
        other => MonitorError::Config {
            field: "monitor".to_owned(),
            reason: other.to_string(),
        },
    }
}

/// 모니터 설정 빌더
#[derive(Default)]
pub struct MonitorConfigBuilder {
    config: MonitorConfig,
}

impl MonitorConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 리포트 주기를 설정합니다.
    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.config.update_interval = interval;
        self
    }

    /// 고트래픽 검사 주기를 설정합니다.
    pub fn high_traffic_interval(mut self, interval: Duration) -> Self {
        self.config.high_traffic_interval = interval;
        self
    }

    /// 고트래픽 임계값을 설정합니다.
    pub fn high_traffic_threshold(mut self, threshold: u64) -> Self {
        self.config.high_traffic_threshold = threshold;
        self
    }

    /// 설정을 검증하고 `MonitorConfig`를 생성합니다.
    pub fn build(self) -> Result<MonitorConfig, MonitorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
