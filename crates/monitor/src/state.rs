//! 공유 트래픽 상태 -- 섹션별 히트 카운터와 고트래픽 상태 플래그
//!
//! 수집 경로와 두 리포트 타이머가 같은 [`TrafficStats`]를 공유합니다.
//! 섹션 카운터, 누적 히트 수, 고트래픽 플래그는 하나의 뮤텍스로 보호되므로
//! 리포트는 항상 갱신 전 또는 갱신 후의 일관된 상태만 관찰합니다.
//! 락은 증가 또는 스냅샷-리셋 구간에서만 잡고, `.await` 지점을 넘어 유지하지 않습니다.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// 고트래픽 상태 전이
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficTransition {
    /// Normal -> Triggered. 검사 윈도우 동안의 총 히트 수를 담습니다.
    Triggered {
        /// 직전 검사 윈도우의 총 히트 수
        total_hits: u64,
    },
    /// Triggered -> Normal
    Resolved,
}

/// 락 안쪽 상태
#[derive(Debug, Default)]
struct Counters {
    /// 리포트 윈도우 내 섹션별 히트 수
    section_hits: HashMap<String, u64>,
    /// 검사 윈도우 내 총 히트 수
    total_hits: u64,
    /// 고트래픽 상태 여부
    high_traffic: bool,
}

/// 섹션 카운터와 고트래픽 상태를 소유하는 공유 상태 객체
///
/// `Arc<TrafficStats>`로 수집 루프와 스케줄러에 전달합니다.
#[derive(Debug, Default)]
pub struct TrafficStats {
    inner: Mutex<Counters>,
}

impl TrafficStats {
    /// 빈 상태를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 히트 한 건을 기록합니다.
    ///
    /// 섹션 카운터와 총 히트 수를 같은 임계 구역에서 함께 증가시킵니다.
    pub fn record(&self, section: &str) {
        let mut counters = self.lock();
        match counters.section_hits.get_mut(section) {
            Some(hits) => *hits += 1,
            None => {
                counters.section_hits.insert(section.to_owned(), 1);
            }
        }
        counters.total_hits += 1;
    }

    /// 섹션 카운터를 빈 맵으로 교체하고 이전 스냅샷을 반환합니다.
    pub fn take_section_hits(&self) -> HashMap<String, u64> {
        std::mem::take(&mut self.lock().section_hits)
    }

    /// 검사 윈도우를 마감합니다.
    ///
    /// 총 히트 수가 임계값을 초과하고 아직 경고 상태가 아니면 `Triggered`,
    /// 임계값 이하이고 경고 상태이면 `Resolved`를 반환합니다.
    /// 전이 여부와 관계없이 총 히트 수는 0으로 리셋됩니다.
    pub fn check_high_traffic(&self, threshold: u64) -> Option<TrafficTransition> {
        let mut counters = self.lock();
        let total_hits = std::mem::take(&mut counters.total_hits);

        if total_hits > threshold && !counters.high_traffic {
            counters.high_traffic = true;
            Some(TrafficTransition::Triggered { total_hits })
        } else if total_hits <= threshold && counters.high_traffic {
            counters.high_traffic = false;
            Some(TrafficTransition::Resolved)
        } else {
            None
        }
    }

    /// 현재 검사 윈도우의 총 히트 수를 반환합니다.
    pub fn total_hits(&self) -> u64 {
        self.lock().total_hits
    }

    /// 현재 리포트 윈도우의 섹션 카운터 복사본을 반환합니다.
    pub fn section_hits(&self) -> HashMap<String, u64> {
        self.lock().section_hits.clone()
    }

    /// 고트래픽 상태인지 확인합니다.
    pub fn is_high_traffic(&self) -> bool {
        self.lock().high_traffic
    }

    // 임계 구역에서 패닉이 나도 카운터 자체는 항상 유효한 값이므로 poison을 무시합니다.
    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
