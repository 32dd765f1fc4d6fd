#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`parser`]: Common Log Format 라인 파서
//! - [`state`]: 섹션별 히트 카운터와 고트래픽 상태 (단일 락으로 보호)
//! - [`report`]: 출력 메시지 템플릿
//! - [`sink`]: 출력 스트림 핸들
//! - [`scheduler`]: 두 개의 독립 타이머로 리포트를 실행하는 백그라운드 태스크
//! - [`monitor`]: 수집 루프와 리포트 동작 (진입점)
//! - [`config`]: 모니터 설정 (core 설정 변환)
//! - [`error`]: 도메인 에러 타입

pub mod config;
pub mod error;
pub mod monitor;
pub mod parser;
pub mod report;
pub mod scheduler;
pub mod sink;
pub mod state;

// --- 주요 타입 re-export ---

// 진입점
pub use monitor::{TrafficMonitor, run};

// 설정
pub use config::{MonitorConfig, MonitorConfigBuilder};

// 에러
pub use error::MonitorError;

// 파서
pub use parser::{AccessLogEntry, AccessLogParser};

// 리포트
pub use report::Report;
pub use sink::ReportSink;

// 상태
pub use state::{TrafficStats, TrafficTransition};
