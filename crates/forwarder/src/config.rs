//! 포워더 설정
//!
//! [`ForwarderConfig`]는 core의 [`RelayConfig`](tplink_gelf_core::config::RelayConfig)에서
//! 수신/출력 섹션을 평탄화한 포워더 전용 설정입니다.
//!
//! # 사용 예시
//! ```ignore
//! use tplink_gelf_core::config::RelayConfig;
//! use tplink_gelf_forwarder::config::ForwarderConfig;
//!
//! let core_config = RelayConfig::default();
//! let config = ForwarderConfig::from_core(&core_config);
//! ```

use serde::{Deserialize, Serialize};
use tplink_gelf_core::config::RelayConfig;

use crate::error::ForwarderError;

/// UDP 데이터그램 최대 크기
const MAX_UDP_DATAGRAM: usize = 65_535;

/// syslog severity 최댓값
const MAX_LEVEL: u8 = 7;

/// 포워더 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwarderConfig {
    /// syslog 수신 바인드 주소
    pub bind: String,
    /// 수신 버퍼 크기 (바이트)
    pub max_datagram_size: usize,
    /// GELF 출력 호스트
    pub output_host: String,
    /// GELF 출력 포트
    pub output_port: u16,
    /// 기본 level
    pub default_level: u8,
    /// zlib 압축 여부
    pub compress: bool,
    /// 청크 경고 임계값 (바이트)
    pub chunk_warn_threshold: usize,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:514".to_owned(),
            max_datagram_size: MAX_UDP_DATAGRAM,
            output_host: "127.0.0.1".to_owned(),
            output_port: 12201,
            default_level: 6,
            compress: true,
            chunk_warn_threshold: 8192,
        }
    }
}

impl ForwarderConfig {
    /// core 설정에서 포워더 설정을 생성합니다.
    pub fn from_core(core: &RelayConfig) -> Self {
        Self {
            bind: core.listener.bind.clone(),
            max_datagram_size: core.listener.max_datagram_size,
            output_host: core.output.host.clone(),
            output_port: core.output.port,
            default_level: core.output.default_level,
            compress: core.output.compress,
            chunk_warn_threshold: core.output.chunk_warn_threshold,
        }
    }

    /// 빌더를 생성합니다.
    pub fn builder() -> ForwarderConfigBuilder {
        ForwarderConfigBuilder::new()
    }

    /// 출력 대상 문자열 (`host:port`)
    pub fn output_endpoint(&self) -> String {
        format!("{}:{}", self.output_host, self.output_port)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ForwarderError> {
        if self.bind.is_empty() {
            return Err(config_error("bind", "must not be empty".to_owned()));
        }

        if self.max_datagram_size == 0 || self.max_datagram_size > MAX_UDP_DATAGRAM {
            return Err(config_error(
                "max_datagram_size",
                format!("must be 1-{MAX_UDP_DATAGRAM}"),
            ));
        }

        if self.output_host.is_empty() {
            return Err(config_error("output_host", "must not be empty".to_owned()));
        }

        if self.output_port == 0 {
            return Err(config_error("output_port", "must not be 0".to_owned()));
        }

        if self.default_level > MAX_LEVEL {
            return Err(config_error(
                "default_level",
                format!("must be 0-{MAX_LEVEL}"),
            ));
        }

        if self.chunk_warn_threshold == 0 {
            return Err(config_error(
                "chunk_warn_threshold",
                "must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }
}

fn config_error(field: &str, reason: String) -> ForwarderError {
    ForwarderError::Config {
        field: field.to_owned(),
        reason,
    }
}

/// 포워더 설정 빌더
#[derive(Default)]
pub struct ForwarderConfigBuilder {
    config: ForwarderConfig,
}

impl ForwarderConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 수신 바인드 주소를 설정합니다.
    pub fn bind(mut self, bind: impl Into<String>) -> Self {
        self.config.bind = bind.into();
        self
    }

    /// 수신 버퍼 크기를 설정합니다.
    pub fn max_datagram_size(mut self, size: usize) -> Self {
        self.config.max_datagram_size = size;
        self
    }

    /// 출력 호스트를 설정합니다.
    pub fn output_host(mut self, host: impl Into<String>) -> Self {
        self.config.output_host = host.into();
        self
    }

    /// 출력 포트를 설정합니다.
    pub fn output_port(mut self, port: u16) -> Self {
        self.config.output_port = port;
        self
    }

    /// 기본 level을 설정합니다.
    pub fn default_level(mut self, level: u8) -> Self {
        self.config.default_level = level;
        self
    }

    /// zlib 압축 여부를 설정합니다.
    pub fn compress(mut self, compress: bool) -> Self {
        self.config.compress = compress;
        self
    }

    /// 청크 경고 임계값을 설정합니다.
    pub fn chunk_warn_threshold(mut self, bytes: usize) -> Self {
        self.config.chunk_warn_threshold = bytes;
        self
    }

    /// 설정을 검증하고 `ForwarderConfig`를 생성합니다.
    pub fn build(self) -> Result<ForwarderConfig, ForwarderError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ForwarderConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_preserves_values() {
        let mut core = RelayConfig::default();
        core.listener.bind = "127.0.0.1:5514".to_owned();
        core.output.host = "graylog.lan".to_owned();
        core.output.port = 12202;
        core.output.compress = false;
        core.output.default_level = 4;

        let config = ForwarderConfig::from_core(&core);
        assert_eq!(config.bind, "127.0.0.1:5514");
        assert_eq!(config.output_endpoint(), "graylog.lan:12202");
        assert!(!config.compress);
        assert_eq!(config.default_level, 4);
        assert_eq!(config.chunk_warn_threshold, 8192);
    }

    #[test]
    fn validate_rejects_out_of_range_level() {
        let config = ForwarderConfig {
            default_level: 8,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_level"));
    }

    #[test]
    fn validate_rejects_zero_port_and_empty_host() {
        let zero_port = ForwarderConfig {
            output_port: 0,
            ..Default::default()
        };
        assert!(zero_port.validate().is_err());

        let empty_host = ForwarderConfig {
            output_host: String::new(),
            ..Default::default()
        };
        assert!(empty_host.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_datagram_buffer() {
        let config = ForwarderConfig {
            max_datagram_size: 70_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_creates_valid_config() {
        let config = ForwarderConfig::builder()
            .bind("127.0.0.1:0")
            .output_host("10.0.0.5")
            .output_port(12201)
            .compress(false)
            .chunk_warn_threshold(1024)
            .build()
            .unwrap();
        assert_eq!(config.bind, "127.0.0.1:0");
        assert_eq!(config.output_host, "10.0.0.5");
        assert!(!config.compress);
        assert_eq!(config.chunk_warn_threshold, 1024);
    }

    #[test]
    fn builder_rejects_invalid_config() {
        assert!(ForwarderConfigBuilder::new().default_level(9).build().is_err());
    }
}
