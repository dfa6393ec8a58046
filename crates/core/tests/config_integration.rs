//! tplink-gelf.toml 통합 설정 테스트
//!
//! - tplink-gelf.toml.example 파싱 테스트
//! - 파일 로딩 + 환경변수 우선순위 테스트
//! - 잘못된 형식 에러 테스트

use std::io::Write;

use serial_test::serial;
use tplink_gelf_core::config::RelayConfig;
use tplink_gelf_core::error::{ConfigError, RelayError};

#[test]
fn example_config_parses_and_validates() {
    let content = include_str!("../../../tplink-gelf.toml.example");
    let config = RelayConfig::parse(content).expect("example config should parse");
    config
        .validate()
        .expect("example config should pass validation");

    assert_eq!(config.listener.bind, "0.0.0.0:514");
    assert_eq!(config.output.port, 12201);
    assert_eq!(config.output.default_level, 6);
    assert!(config.output.compress);
}

#[test]
fn example_config_matches_defaults() {
    let content = include_str!("../../../tplink-gelf.toml.example");
    let config = RelayConfig::parse(content).expect("should parse");
    let defaults = RelayConfig::default();

    assert_eq!(config.output.host, defaults.output.host);
    assert_eq!(
        config.output.chunk_warn_threshold,
        defaults.output.chunk_warn_threshold
    );
    assert_eq!(config.metrics.port, defaults.metrics.port);
}

#[tokio::test]
#[serial]
async fn load_applies_env_over_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[output]\nhost = \"from-file\"\nport = 12300").unwrap();

    // SAFETY: #[serial]로 환경변수를 조작하는 테스트를 직렬화합니다.
    unsafe { std::env::set_var("TPLINK_GELF_OUTPUT_HOST", "from-env") };
    let config = RelayConfig::load(file.path()).await.unwrap();
    unsafe { std::env::remove_var("TPLINK_GELF_OUTPUT_HOST") };

    assert_eq!(config.output.host, "from-env");
    // 환경변수가 없는 필드는 파일 값 유지
    assert_eq!(config.output.port, 12300);
}

#[tokio::test]
#[serial]
async fn load_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[output]\ndefault_level = 9").unwrap();

    let err = RelayConfig::load(file.path()).await.unwrap_err();
    assert!(matches!(
        err,
        RelayError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn wrong_type_is_parse_error() {
    let err = RelayConfig::parse("[output]\nport = \"twelve\"").unwrap_err();
    assert!(matches!(
        err,
        RelayError::Config(ConfigError::ParseFailed { .. })
    ));
}
