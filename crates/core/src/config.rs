//! 설정 관리 — tplink-gelf.toml 파싱 및 런타임 설정
//!
//! [`RelayConfig`]는 릴레이의 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`TPLINK_GELF_OUTPUT_HOST=graylog.lan` 형식)
//! 3. 설정 파일 (`tplink-gelf.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), tplink_gelf_core::error::RelayError> {
//! use tplink_gelf_core::config::RelayConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = RelayConfig::load("tplink-gelf.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = RelayConfig::parse("[output]\nhost = \"graylog.lan\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, RelayError};

/// syslog severity 최댓값 (Debug)
const MAX_SEVERITY: u8 = 7;

/// tplink-gelf 통합 설정
///
/// `tplink-gelf.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// syslog 수신 설정
    #[serde(default)]
    pub listener: ListenerConfig,
    /// GELF 출력 설정
    #[serde(default)]
    pub output: OutputConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl RelayConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RelayError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, RelayError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RelayError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                RelayError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, RelayError> {
        toml::from_str(toml_str).map_err(|e| {
            RelayError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `TPLINK_GELF_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "TPLINK_GELF_GENERAL_LOG_LEVEL");
        override_string(
            &mut self.general.log_format,
            "TPLINK_GELF_GENERAL_LOG_FORMAT",
        );

        // Listener
        override_string(&mut self.listener.bind, "TPLINK_GELF_LISTENER_BIND");
        override_usize(
            &mut self.listener.max_datagram_size,
            "TPLINK_GELF_LISTENER_MAX_DATAGRAM_SIZE",
        );

        // Output
        override_string(&mut self.output.host, "TPLINK_GELF_OUTPUT_HOST");
        override_u16(&mut self.output.port, "TPLINK_GELF_OUTPUT_PORT");
        override_u8(
            &mut self.output.default_level,
            "TPLINK_GELF_OUTPUT_DEFAULT_LEVEL",
        );
        override_bool(&mut self.output.compress, "TPLINK_GELF_OUTPUT_COMPRESS");
        override_usize(
            &mut self.output.chunk_warn_threshold,
            "TPLINK_GELF_OUTPUT_CHUNK_WARN_THRESHOLD",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "TPLINK_GELF_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "TPLINK_GELF_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "TPLINK_GELF_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RelayError> {
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

        if self.listener.bind.is_empty() {
            return Err(invalid("listener.bind", "must not be empty".to_owned()));
        }

        if self.listener.max_datagram_size == 0 || self.listener.max_datagram_size > 65_535 {
            return Err(invalid(
                "listener.max_datagram_size",
                "must be 1-65535".to_owned(),
            ));
        }

        if self.output.host.is_empty() {
            return Err(invalid("output.host", "must not be empty".to_owned()));
        }

        if self.output.port == 0 {
            return Err(invalid("output.port", "must not be 0".to_owned()));
        }

        if self.output.default_level > MAX_SEVERITY {
            return Err(invalid(
                "output.default_level",
                format!("must be 0-{MAX_SEVERITY}"),
            ));
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(invalid(
                "metrics.port",
                "must not be 0 when metrics are enabled".to_owned(),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> RelayError {
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

/// syslog UDP 수신 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// 바인드 주소
    pub bind: String,
    /// 최대 데이터그램 크기 (바이트)
    pub max_datagram_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:514".to_owned(),
            max_datagram_size: 65_535,
        }
    }
}

/// GELF 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Graylog GELF UDP 입력 호스트
    pub host: String,
    /// Graylog GELF UDP 입력 포트
    pub port: u16,
    /// PRIVAL이 없을 때 사용할 기본 level (6 = Informational)
    pub default_level: u8,
    /// zlib 압축 여부
    pub compress: bool,
    /// 이 크기(바이트)를 넘는 페이로드는 경고를 남깁니다 (청킹 미지원)
    pub chunk_warn_threshold: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 12201,
            default_level: 6,
            compress: true,
            chunk_warn_threshold: 8192,
        }
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 리스닝 주소
    pub listen_addr: String,
    /// 리스닝 포트
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

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_parsed<T: std::str::FromStr>(target: &mut T, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                expected = std::any::type_name::<T>(),
                "failed to parse env var, ignoring"
            ),
        }
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    override_parsed(target, env_key);
}

fn override_usize(target: &mut usize, env_key: &str) {
    override_parsed(target, env_key);
}

fn override_u16(target: &mut u16, env_key: &str) {
    override_parsed(target, env_key);
}

fn override_u8(target: &mut u8, env_key: &str) {
    override_parsed(target, env_key);
}
