//! Configuration loading tests from the daemon's point of view.

use std::io::Write;

use serial_test::serial;
use srcstat_core::config::SrcstatConfig;
use srcstat_daemon::orchestrator::Orchestrator;

const EXAMPLE_CONFIG: &str = include_str!("../../srcstat.toml.example");

#[test]
fn example_config_is_valid() {
    let config = SrcstatConfig::parse(EXAMPLE_CONFIG).expect("example config should parse");
    config.validate().expect("example config should validate");
    assert_eq!(config.servers.len(), 2);
    assert_eq!(config.match_engine.use_real_dmg, Some(true));
}

#[tokio::test]
async fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[listener]
bind_addr = "127.0.0.1:0"

[match]
use_real_dmg = false

[[servers]]
secret = 42
server_id = 7
name = "test"
"#
    )
    .unwrap();

    let config = SrcstatConfig::load(file.path()).await.unwrap();
    assert_eq!(config.listener.bind_addr, "127.0.0.1:0");
    assert_eq!(config.servers[0].server_id, 7);
}

#[tokio::test]
async fn missing_file_is_reported() {
    let result = Orchestrator::build(std::path::Path::new("/nonexistent/srcstat.toml")).await;
    let err = result.err().expect("missing file must fail");
    assert!(err.to_string().contains("failed to load config"));
}

#[test]
fn damage_mode_is_required() {
    let config = SrcstatConfig::parse("[listener]\nbind_addr = \"127.0.0.1:0\"").unwrap();
    let err = Orchestrator::build_from_config(config)
        .err()
        .expect("use_real_dmg is mandatory");
    assert!(err.to_string().contains("match.use_real_dmg"));
}

#[test]
fn duplicate_secrets_are_rejected() {
    let config = SrcstatConfig::parse(
        r#"
[match]
use_real_dmg = true

[[servers]]
secret = 1
server_id = 1
name = "a"

[[servers]]
secret = 1
server_id = 2
name = "b"
"#,
    )
    .unwrap();
    assert!(Orchestrator::build_from_config(config).is_err());
}

#[test]
#[serial]
fn env_override_supplies_damage_mode() {
    // SAFETY: serialized with other env-mutating tests
    unsafe { std::env::set_var("SRCSTAT_MATCH_USE_REAL_DMG", "false") };

    let mut config = SrcstatConfig::parse("").unwrap();
    config.apply_env_overrides();

    unsafe { std::env::remove_var("SRCSTAT_MATCH_USE_REAL_DMG") };

    assert_eq!(config.match_engine.use_real_dmg, Some(false));
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn env_override_bind_addr() {
    unsafe { std::env::set_var("SRCSTAT_LISTENER_BIND_ADDR", "127.0.0.1:27999") };

    let mut config = SrcstatConfig::parse("[match]\nuse_real_dmg = true").unwrap();
    config.apply_env_overrides();

    unsafe { std::env::remove_var("SRCSTAT_LISTENER_BIND_ADDR") };

    assert_eq!(config.listener.bind_addr, "127.0.0.1:27999");
}
