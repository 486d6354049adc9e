//! 설정 관리 -- srcstat.toml 파싱 및 런타임 설정
//!
//! [`SrcstatConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SRCSTAT_LISTENER_BIND_ADDR=0.0.0.0:27115` 형식)
//! 3. 설정 파일 (`srcstat.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! `match.use_real_dmg`만은 기본값이 없습니다. 원시 피해량과 저항 적용 후 피해량 중
//! 어느 쪽을 집계할지는 운영자가 명시해야 하며, 생략하면 검증에서 실패합니다.
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), srcstat_core::error::SrcstatError> {
//! use srcstat_core::config::SrcstatConfig;
//!
//! let config = SrcstatConfig::load("srcstat.toml").await?;
//! let config = SrcstatConfig::parse("[match]\nuse_real_dmg = true")?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SrcstatError};

/// 수신 패킷 최소/최대 크기 (바이트)
const MIN_PACKET_SIZE: usize = 64;
const MAX_PACKET_SIZE: usize = 65_535;

/// srcstat 통합 설정
///
/// `srcstat.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SrcstatConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// UDP 리스너 설정
    #[serde(default)]
    pub listener: ListenerConfig,
    /// 매치 집계 설정
    #[serde(default, rename = "match")]
    pub match_engine: MatchConfig,
    /// 메트릭 익스포터 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// 로그 시크릿 → 서버 식별 테이블
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

impl SrcstatConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드와 검증을 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SrcstatError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 읽습니다 (환경변수 오버라이드, 검증 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SrcstatError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SrcstatError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SrcstatError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SrcstatError> {
        toml::from_str(toml_str).map_err(|e| {
            SrcstatError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SRCSTAT_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.general.log_level, "SRCSTAT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SRCSTAT_GENERAL_LOG_FORMAT");

        override_string(&mut self.listener.bind_addr, "SRCSTAT_LISTENER_BIND_ADDR");
        override_parse(
            &mut self.listener.max_packet_size,
            "SRCSTAT_LISTENER_MAX_PACKET_SIZE",
        );
        override_parse(
            &mut self.listener.queue_capacity,
            "SRCSTAT_LISTENER_QUEUE_CAPACITY",
        );
        override_string(&mut self.listener.drop_policy, "SRCSTAT_LISTENER_DROP_POLICY");
        override_parse(&mut self.listener.batch_size, "SRCSTAT_LISTENER_BATCH_SIZE");
        override_parse(
            &mut self.listener.reject_cooldown_secs,
            "SRCSTAT_LISTENER_REJECT_COOLDOWN_SECS",
        );

        if let Some(flag) = env_parse::<bool>("SRCSTAT_MATCH_USE_REAL_DMG") {
            self.match_engine.use_real_dmg = Some(flag);
        }
        override_parse(
            &mut self.match_engine.worker_channel_capacity,
            "SRCSTAT_MATCH_WORKER_CHANNEL_CAPACITY",
        );

        override_parse(&mut self.metrics.enabled, "SRCSTAT_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "SRCSTAT_METRICS_LISTEN_ADDR");
        override_parse(&mut self.metrics.port, "SRCSTAT_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SrcstatError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.listener.bind_addr.trim().is_empty() {
            return Err(invalid("listener.bind_addr", "must not be empty".to_owned()));
        }

        if !(MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&self.listener.max_packet_size) {
            return Err(invalid(
                "listener.max_packet_size",
                format!("must be between {MIN_PACKET_SIZE} and {MAX_PACKET_SIZE}"),
            ));
        }

        if self.listener.queue_capacity == 0 {
            return Err(invalid("listener.queue_capacity", "must be greater than 0".to_owned()));
        }

        if self.listener.batch_size == 0 {
            return Err(invalid("listener.batch_size", "must be greater than 0".to_owned()));
        }

        let valid_policies = ["oldest", "newest"];
        if !valid_policies.contains(&self.listener.drop_policy.as_str()) {
            return Err(invalid(
                "listener.drop_policy",
                format!("must be one of: {}", valid_policies.join(", ")),
            ));
        }

        if self.match_engine.use_real_dmg.is_none() {
            return Err(invalid(
                "match.use_real_dmg",
                "must be set explicitly (true = post-resistance damage, false = raw damage)"
                    .to_owned(),
            ));
        }

        if self.match_engine.worker_channel_capacity == 0 {
            return Err(invalid(
                "match.worker_channel_capacity",
                "must be greater than 0".to_owned(),
            ));
        }

        let mut secrets = HashSet::new();
        let mut ids = HashSet::new();
        for server in &self.servers {
            if !secrets.insert(server.secret) {
                return Err(invalid(
                    "servers.secret",
                    format!("duplicate log secret {}", server.secret),
                ));
            }
            if !ids.insert(server.server_id) {
                return Err(invalid(
                    "servers.server_id",
                    format!("duplicate server id {}", server.server_id),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> SrcstatError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
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
            log_format: "json".to_owned(),
        }
    }
}

/// UDP 로그 리스너 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// 바인드 주소 (예: "0.0.0.0:27115")
    pub bind_addr: String,
    /// 데이터그램 수신 버퍼 크기 (바이트)
    pub max_packet_size: usize,
    /// 수신 태스크와 디스패치 태스크 사이 큐 용량
    pub queue_capacity: usize,
    /// 큐가 가득 찼을 때의 드롭 정책 (oldest, newest)
    pub drop_policy: String,
    /// 디스패치 태스크가 한 번에 꺼내는 최대 패킷 수
    pub batch_size: usize,
    /// 알 수 없는 시크릿 거부 로그의 시크릿별 쿨다운 (초)
    pub reject_cooldown_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:27115".to_owned(),
            max_packet_size: 2048,
            queue_capacity: 4096,
            drop_policy: "oldest".to_owned(),
            batch_size: 64,
            reject_cooldown_secs: 300,
        }
    }
}

/// 매치 집계 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// `true`면 realdamage(저항 적용 후), `false`면 damage(원시) 값을 집계
    pub use_real_dmg: Option<bool>,
    /// 매치 워커별 입력 채널 용량
    pub worker_channel_capacity: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            use_real_dmg: None,
            worker_channel_capacity: 1024,
        }
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 리슨 주소
    pub listen_addr: String,
    /// 리슨 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9115,
            endpoint: "/metrics".to_owned(),
        }
    }
}

/// `[[servers]]` 항목 -- 로그 시크릿 하나를 서버 식별자에 연결합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// srcds `sv_logsecret` 값
    pub secret: i64,
    /// 서버 ID
    pub server_id: i64,
    /// 표시용 서버 이름
    pub name: String,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_parse<T: FromStr>(target: &mut T, env_key: &str) {
    if let Some(parsed) = env_parse(env_key) {
        *target = parsed;
    }
}

fn env_parse<T: FromStr>(env_key: &str) -> Option<T> {
    let val = std::env::var(env_key).ok()?;
    match val.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(
                env_key,
                value = val.as_str(),
                expected = std::any::type_name::<T>(),
                "failed to parse env var, ignoring"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn valid_config() -> SrcstatConfig {
        let mut config = SrcstatConfig::default();
        config.match_engine.use_real_dmg = Some(true);
        config
    }

    #[test]
    fn default_config_has_sane_values() {
        let config = SrcstatConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.listener.bind_addr, "0.0.0.0:27115");
        assert_eq!(config.listener.reject_cooldown_secs, 300);
        assert_eq!(config.listener.drop_policy, "oldest");
        assert!(config.match_engine.use_real_dmg.is_none());
        assert!(config.servers.is_empty());
    }

    #[test]
    fn default_config_requires_explicit_damage_mode() {
        let err = SrcstatConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("match.use_real_dmg"));
        valid_config().validate().unwrap();
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[match]
use_real_dmg = false

[[servers]]
secret = 12345
server_id = 7
name = "uncletopia | seattle"
"#;
        let config = SrcstatConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.match_engine.use_real_dmg, Some(false));
        assert_eq!(config.match_engine.worker_channel_capacity, 1024);
        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.servers[0].server_id, 7);
        config.validate().unwrap();
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = SrcstatConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            SrcstatError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = valid_config();
        config.general.log_level = "verbose".to_owned();
        assert!(config.validate().unwrap_err().to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_bad_listener_values() {
        let mut config = valid_config();
        config.listener.queue_capacity = 0;
        assert!(config.validate().unwrap_err().to_string().contains("queue_capacity"));

        let mut config = valid_config();
        config.listener.max_packet_size = 16;
        assert!(config.validate().unwrap_err().to_string().contains("max_packet_size"));

        let mut config = valid_config();
        config.listener.drop_policy = "block".to_owned();
        assert!(config.validate().unwrap_err().to_string().contains("drop_policy"));
    }

    #[test]
    fn validate_rejects_duplicate_secrets() {
        let mut config = valid_config();
        config.servers = vec![
            ServerEntry {
                secret: 1,
                server_id: 1,
                name: "a".to_owned(),
            },
            ServerEntry {
                secret: 1,
                server_id: 2,
                name: "b".to_owned(),
            },
        ];
        assert!(config.validate().unwrap_err().to_string().contains("duplicate log secret"));
    }

    #[test]
    #[serial]
    fn env_override_listener_and_match() {
        let mut config = SrcstatConfig::default();
        // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
        unsafe {
            std::env::set_var("SRCSTAT_LISTENER_BIND_ADDR", "127.0.0.1:9999");
            std::env::set_var("SRCSTAT_LISTENER_QUEUE_CAPACITY", "12");
            std::env::set_var("SRCSTAT_MATCH_USE_REAL_DMG", "false");
        }
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("SRCSTAT_LISTENER_BIND_ADDR");
            std::env::remove_var("SRCSTAT_LISTENER_QUEUE_CAPACITY");
            std::env::remove_var("SRCSTAT_MATCH_USE_REAL_DMG");
        }
        assert_eq!(config.listener.bind_addr, "127.0.0.1:9999");
        assert_eq!(config.listener.queue_capacity, 12);
        assert_eq!(config.match_engine.use_real_dmg, Some(false));
    }

    #[test]
    #[serial]
    fn env_override_invalid_number_keeps_original() {
        let mut val = 42usize;
        // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
        unsafe { std::env::set_var("TEST_SRCSTAT_USIZE_BAD", "lots") };
        override_parse(&mut val, "TEST_SRCSTAT_USIZE_BAD");
        unsafe { std::env::remove_var("TEST_SRCSTAT_USIZE_BAD") };
        assert_eq!(val, 42);
    }

    #[test]
    fn config_serialize_roundtrip_keeps_match_section_name() {
        let config = valid_config();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[match]"));
        let parsed = SrcstatConfig::parse(&toml_str).unwrap();
        assert_eq!(parsed.match_engine.use_real_dmg, Some(true));
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = SrcstatConfig::from_file("/nonexistent/path/srcstat.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SrcstatError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
