//! 리스너 설정
//!
//! [`PipelineConfig`]는 core의 [`ListenerConfig`](srcstat_core::config::ListenerConfig)를
//! 타입이 있는 값(소켓 주소, 드롭 정책, 쿨다운)으로 변환한 것입니다.
//!
//! # 사용 예시
//! ```
//! use srcstat_core::config::ListenerConfig;
//! use srcstat_log_pipeline::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_core(&ListenerConfig::default()).unwrap();
//! assert_eq!(config.queue_capacity, 4096);
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use srcstat_core::config::ListenerConfig;

use crate::error::LogPipelineError;

const MIN_PACKET_SIZE: usize = 64;
const MAX_PACKET_SIZE: usize = 65_535;
const MAX_QUEUE_CAPACITY: usize = 10_000_000;
const MAX_BATCH_SIZE: usize = 100_000;

/// 큐 오버플로우 시 드롭 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPolicy {
    /// 가장 오래된 패킷을 드롭 (기본값)
    #[default]
    Oldest,
    /// 새 패킷을 거부
    Newest,
}

impl FromStr for DropPolicy {
    type Err = LogPipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oldest" => Ok(Self::Oldest),
            "newest" => Ok(Self::Newest),
            other => Err(LogPipelineError::Config {
                field: "drop_policy".to_owned(),
                reason: format!("unknown drop policy '{other}' (expected oldest|newest)"),
            }),
        }
    }
}

impl fmt::Display for DropPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oldest => f.write_str("oldest"),
            Self::Newest => f.write_str("newest"),
        }
    }
}

/// UDP 리스너 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub bind_addr: SocketAddr,
    /// 데이터그램 수신 버퍼 크기
    pub max_packet_size: usize,
    pub queue_capacity: usize,
    pub drop_policy: DropPolicy,
    /// 디스패치 배치 크기
    pub batch_size: usize,
    /// 알 수 없는 시크릿 거부 로그 쿨다운
    pub reject_cooldown: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 27115)),
            max_packet_size: 2048,
            queue_capacity: 4096,
            drop_policy: DropPolicy::Oldest,
            batch_size: 64,
            reject_cooldown: Duration::from_secs(300),
        }
    }
}

impl PipelineConfig {
    /// core 설정에서 리스너 설정을 만듭니다.
    pub fn from_core(core: &ListenerConfig) -> Result<Self, LogPipelineError> {
        let bind_addr = core
            .bind_addr
            .parse()
            .map_err(|e| LogPipelineError::Config {
                field: "bind_addr".to_owned(),
                reason: format!("'{}': {e}", core.bind_addr),
            })?;

        let config = Self {
            bind_addr,
            max_packet_size: core.max_packet_size,
            queue_capacity: core.queue_capacity,
            drop_policy: core.drop_policy.parse()?,
            batch_size: core.batch_size,
            reject_cooldown: Duration::from_secs(core.reject_cooldown_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        if !(MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&self.max_packet_size) {
            return Err(LogPipelineError::Config {
                field: "max_packet_size".to_owned(),
                reason: format!("must be {MIN_PACKET_SIZE}-{MAX_PACKET_SIZE}"),
            });
        }

        if self.queue_capacity == 0 || self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(LogPipelineError::Config {
                field: "queue_capacity".to_owned(),
                reason: format!("must be 1-{MAX_QUEUE_CAPACITY}"),
            });
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(LogPipelineError::Config {
                field: "batch_size".to_owned(),
                reason: format!("must be 1-{MAX_BATCH_SIZE}"),
            });
        }

        if self.reject_cooldown.is_zero() {
            return Err(LogPipelineError::Config {
                field: "reject_cooldown_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 설정 빌더
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    pub fn max_packet_size(mut self, size: usize) -> Self {
        self.config.max_packet_size = size;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.config.drop_policy = policy;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn reject_cooldown(mut self, cooldown: Duration) -> Self {
        self.config.reject_cooldown = cooldown;
        self
    }

    /// 검증 후 설정을 반환합니다.
    pub fn build(self) -> Result<PipelineConfig, LogPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn from_core_preserves_values() {
        let core = ListenerConfig {
            bind_addr: "127.0.0.1:9999".to_owned(),
            max_packet_size: 4096,
            queue_capacity: 10,
            drop_policy: "Newest".to_owned(),
            batch_size: 5,
            reject_cooldown_secs: 60,
        };
        let config = PipelineConfig::from_core(&core).unwrap();
        assert_eq!(config.bind_addr.port(), 9999);
        assert_eq!(config.max_packet_size, 4096);
        assert_eq!(config.queue_capacity, 10);
        assert_eq!(config.drop_policy, DropPolicy::Newest);
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.reject_cooldown, Duration::from_secs(60));
    }

    #[test]
    fn from_core_rejects_bad_address_and_policy() {
        let bad_addr = ListenerConfig {
            bind_addr: "not-an-address".to_owned(),
            ..ListenerConfig::default()
        };
        assert!(PipelineConfig::from_core(&bad_addr).is_err());

        let bad_policy = ListenerConfig {
            drop_policy: "block".to_owned(),
            ..ListenerConfig::default()
        };
        let err = PipelineConfig::from_core(&bad_policy).unwrap_err();
        assert!(err.to_string().contains("drop_policy"));
    }

    #[test]
    fn builder_rejects_invalid_config() {
        assert!(PipelineConfigBuilder::new().batch_size(0).build().is_err());
        assert!(PipelineConfigBuilder::new().queue_capacity(0).build().is_err());
        assert!(PipelineConfigBuilder::new().max_packet_size(10).build().is_err());
        assert!(
            PipelineConfigBuilder::new()
                .reject_cooldown(Duration::ZERO)
                .build()
                .is_err()
        );
    }

    #[test]
    fn builder_creates_valid_config() {
        let config = PipelineConfigBuilder::new()
            .bind_addr("127.0.0.1:0".parse().unwrap())
            .queue_capacity(16)
            .drop_policy(DropPolicy::Newest)
            .build()
            .unwrap();
        assert_eq!(config.queue_capacity, 16);
        assert_eq!(config.drop_policy, DropPolicy::Newest);
    }

    #[test]
    fn drop_policy_default_is_oldest() {
        assert_eq!(DropPolicy::default(), DropPolicy::Oldest);
        assert_eq!(DropPolicy::Newest.to_string(), "newest");
    }
}
