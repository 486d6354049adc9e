//! 거부 로그 속도 제한
//!
//! 잘못 설정되었거나 악의적인 송신자가 알 수 없는 시크릿으로 패킷을 쏟아내도
//! 시크릿당 쿨다운 동안 한 번만 경고 로그를 남깁니다.
//!
//! 서로 다른 시크릿을 뿌리는 송신자에 대비해 두 가지 상한이 있습니다.
//! - 추적하는 시크릿 수는 [`MAX_TRACKED`]를 넘지 않습니다.
//! - 쿨다운 창 하나에서 남기는 로그는 전체 [`WINDOW_LOG_BUDGET`]건까지입니다.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// 추적하는 시크릿 수 상한
pub const MAX_TRACKED: usize = 4096;

/// 쿨다운 창 하나에서 허용하는 전체 거부 로그 수
pub const WINDOW_LOG_BUDGET: u32 = 64;

/// 가득 찬 상태에서 만료 엔트리 정리를 다시 시도하기까지의 간격
const PRUNE_INTERVAL: Duration = Duration::from_secs(1);

/// 시크릿별 거부 로그 제한기
#[derive(Debug)]
pub struct RejectionLimiter {
    cooldown: Duration,
    /// secret -> 마지막으로 로그를 남긴 시각
    last_logged: HashMap<i64, Instant>,
    /// 현재 전체 예산 창의 시작 시각
    window_start: Option<Instant>,
    window_logged: u32,
    last_prune: Option<Instant>,
    /// 쿨다운이나 상한으로 억제된 로그 수
    suppressed: u64,
}

impl RejectionLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_logged: HashMap::new(),
            window_start: None,
            window_logged: 0,
            last_prune: None,
            suppressed: 0,
        }
    }

    /// 이번 거부를 로그로 남겨야 하는지 판단하고, 그렇다면 시각을 기록합니다.
    pub fn should_log(&mut self, secret: i64, now: Instant) -> bool {
        if let Some(last) = self.last_logged.get(&secret)
            && now.saturating_duration_since(*last) < self.cooldown
        {
            self.suppressed += 1;
            return false;
        }

        match self.window_start {
            Some(start) if now.saturating_duration_since(start) < self.cooldown => {}
            _ => {
                self.window_start = Some(now);
                self.window_logged = 0;
            }
        }
        if self.window_logged >= WINDOW_LOG_BUDGET {
            self.suppressed += 1;
            return false;
        }

        if self.last_logged.len() >= MAX_TRACKED && !self.last_logged.contains_key(&secret) {
            let due = self
                .last_prune
                .is_none_or(|at| now.saturating_duration_since(at) >= PRUNE_INTERVAL);
            if due {
                self.prune(now);
            }
            if self.last_logged.len() >= MAX_TRACKED {
                self.suppressed += 1;
                return false;
            }
        }

        self.last_logged.insert(secret, now);
        self.window_logged += 1;
        true
    }

    /// 쿨다운이 지난 엔트리를 제거합니다.
    pub fn prune(&mut self, now: Instant) {
        let cooldown = self.cooldown;
        self.last_logged
            .retain(|_, last| now.saturating_duration_since(*last) < cooldown);
        self.last_prune = Some(now);
    }

    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn tracked(&self) -> usize {
        self.last_logged.len()
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
