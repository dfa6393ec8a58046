//! GELF 전송 싱크
//!
//! [`GelfSink`]는 직렬화된 GELF 레코드 하나를 외부로 내보내는 확장 포인트입니다.
//! 기본 구현 [`UdpGelfSink`]는 Graylog GELF UDP 입력으로 데이터그램 하나씩 전송합니다.
//!
//! # 제약
//! - 청킹(chunked GELF)은 지원하지 않습니다. `chunk_warn_threshold`를 넘는 페이로드는
//!   경고와 메트릭만 남기고 그대로 전송합니다.
//! - 압축은 zlib만 사용합니다 (gzip 미지원).

use std::future::Future;
use std::io::Write;
use std::net::SocketAddr;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use tplink_gelf_core::metrics as m;

use crate::config::ForwarderConfig;
use crate::error::ForwarderError;

/// GELF 레코드 전송 trait
///
/// 파이프라인은 라인 하나마다 `deliver`를 한 번 호출하고, 실패는 라인 단위로 처리합니다.
pub trait GelfSink: Send + Sync {
    /// 직렬화된 GELF JSON 한 건을 전송합니다.
    fn deliver(&self, payload: &[u8]) -> impl Future<Output = Result<(), ForwarderError>> + Send;
}

/// GELF UDP 싱크
pub struct UdpGelfSink {
    socket: UdpSocket,
    /// 연결된 대상 주소
    target: SocketAddr,
    compress: bool,
    chunk_warn_threshold: usize,
}

impl UdpGelfSink {
    /// 출력 대상을 해석하고 UDP 소켓을 연결합니다.
    pub async fn connect(config: &ForwarderConfig) -> Result<Self, ForwarderError> {
        let endpoint = config.output_endpoint();
        let target = tokio::net::lookup_host(endpoint.as_str())
            .await
            .map_err(|e| delivery_error(&endpoint, format!("failed to resolve: {e}")))?
            .next()
            .ok_or_else(|| delivery_error(&endpoint, "no address resolved".to_owned()))?;

        let local = if target.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(local).await?;
        socket
            .connect(target)
            .await
            .map_err(|e| delivery_error(&endpoint, format!("failed to connect: {e}")))?;

        info!(
            target = %target,
            compress = config.compress,
            "GELF UDP sink ready"
        );

        Ok(Self {
            socket,
            target,
            compress: config.compress,
            chunk_warn_threshold: config.chunk_warn_threshold,
        })
    }

    /// 대상 주소를 반환합니다.
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl GelfSink for UdpGelfSink {
    async fn deliver(&self, payload: &[u8]) -> Result<(), ForwarderError> {
        let datagram = encode_payload(payload, self.compress)?;

        if datagram.len() > self.chunk_warn_threshold {
            warn!(
                size = datagram.len(),
                threshold = self.chunk_warn_threshold,
                "GELF payload exceeds chunk threshold, sending unchunked"
            );
            metrics::counter!(m::OVERSIZE_PAYLOADS_TOTAL).increment(1);
        }

        let sent = self
            .socket
            .send(&datagram)
            .await
            .map_err(|e| delivery_error(&self.target.to_string(), e.to_string()))?;
        debug!(bytes = sent, target = %self.target, "GELF datagram sent");
        Ok(())
    }
}

/// 전송할 데이터그램 바이트를 만듭니다. `compress`이면 zlib으로 압축합니다.
pub fn encode_payload(payload: &[u8], compress: bool) -> Result<Vec<u8>, ForwarderError> {
    if !compress {
        return Ok(payload.to_vec());
    }
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(payload.len() / 2), Compression::default());
    encoder.write_all(payload)?;
    Ok(encoder.finish()?)
}

fn delivery_error(target: &str, reason: String) -> ForwarderError {
    ForwarderError::Delivery {
        target: target.to_owned(),
        reason,
    }
}
