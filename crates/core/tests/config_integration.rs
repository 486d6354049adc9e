//! srcstat.toml 통합 설정 테스트
//!
//! - srcstat.toml.example 파싱 테스트
//! - 파일 로딩 + 환경변수 우선순위 테스트
//! - 필수 값 누락 에러 테스트

use std::io::Write;

use serial_test::serial;
use srcstat_core::config::SrcstatConfig;
use srcstat_core::error::{ConfigError, SrcstatError};

#[test]
fn example_config_parses_and_validates() {
    let content = include_str!("../../../srcstat.toml.example");
    let config = SrcstatConfig::parse(content).expect("example config should parse");
    config.validate().expect("example config should pass validation");

    assert_eq!(config.listener.bind_addr, "0.0.0.0:27115");
    assert_eq!(config.match_engine.use_real_dmg, Some(true));
    assert!(config.metrics.enabled);
    assert_eq!(config.servers.len(), 2);
    assert_eq!(config.servers[1].secret, 7654321);
}

#[tokio::test]
#[serial]
async fn load_applies_env_over_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[match]\nuse_real_dmg = true\n[listener]\nbatch_size = 8").unwrap();

    // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
    unsafe { std::env::set_var("SRCSTAT_LISTENER_BATCH_SIZE", "32") };
    let config = SrcstatConfig::load(file.path()).await;
    unsafe { std::env::remove_var("SRCSTAT_LISTENER_BATCH_SIZE") };

    let config = config.expect("config should load");
    assert_eq!(config.listener.batch_size, 32);
}

#[tokio::test]
#[serial]
async fn load_without_damage_mode_fails_validation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[general]\nlog_level = \"debug\"").unwrap();

    let err = SrcstatConfig::load(file.path()).await.unwrap_err();
    match err {
        SrcstatError::Config(ConfigError::InvalidValue { field, .. }) => {
            assert_eq!(field, "match.use_real_dmg");
        }
        other => panic!("unexpected error: {other}"),
    }
}
