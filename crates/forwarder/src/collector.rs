//! UDP syslog 수집기
//!
//! TP-Link 장비가 보내는 syslog 데이터그램을 UDP 소켓으로 수신하고,
//! 데이터그램 하나씩 [`ForwardingPipeline`]에 넘깁니다.
//!
//! 수신 루프는 하나이며, 데이터그램 처리가 끝난 뒤에 다음 수신을 시작합니다.
//! 취소는 수신 대기 중에만 관찰되므로 처리 중인 데이터그램은 항상 끝까지 처리됩니다.

use std::net::SocketAddr;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ForwarderConfig;
use crate::error::ForwarderError;
use crate::pipeline::{ForwardingPipeline, RawDatagram};
use crate::sink::GelfSink;

/// UDP syslog 수집기
pub struct SyslogUdpCollector {
    socket: UdpSocket,
    /// 수신 버퍼 크기
    max_datagram_size: usize,
    /// graceful shutdown 토큰
    cancel_token: CancellationToken,
}

impl SyslogUdpCollector {
    /// 설정된 주소에 바인드합니다.
    ///
    /// # Errors
    /// 바인드에 실패하면 [`ForwarderError::Collector`]를 반환합니다.
    pub async fn bind(
        config: &ForwarderConfig,
        cancel_token: CancellationToken,
    ) -> Result<Self, ForwarderError> {
        let socket = UdpSocket::bind(&config.bind)
            .await
            .map_err(|e| ForwarderError::Collector {
                reason: format!("failed to bind to {}: {}", config.bind, e),
            })?;

        info!(
            bind = %config.bind,
            max_datagram_size = config.max_datagram_size,
            "UDP syslog collector bound"
        );

        Ok(Self {
            socket,
            max_datagram_size: config.max_datagram_size,
            cancel_token,
        })
    }

    /// 실제 바인드된 주소를 반환합니다 (포트 0 바인드 시 유용).
    pub fn local_addr(&self) -> Result<SocketAddr, ForwarderError> {
        Ok(self.socket.local_addr()?)
    }

    /// 취소될 때까지 데이터그램을 수신해 파이프라인으로 처리합니다.
    ///
    /// 수신 에러는 로그만 남기고 계속 진행합니다.
    pub async fn run<S: GelfSink>(
        &self,
        pipeline: &ForwardingPipeline<S>,
    ) -> Result<(), ForwarderError> {
        let mut buf = vec![0u8; self.max_datagram_size];

        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buf) => {
                    let (len, peer) = match result {
                        Ok(received) => received,
                        Err(e) => {
                            warn!(error = %e, "UDP receive error");
                            continue;
                        }
                    };

                    debug!(bytes = len, peer = %peer, "datagram received");
                    let datagram = RawDatagram::new(Bytes::copy_from_slice(&buf[..len]), peer);
                    pipeline.process_datagram(&datagram).await;
                }
                _ = self.cancel_token.cancelled() => {
                    info!("UDP syslog collector received shutdown signal");
                    break;
                }
            }
        }

        Ok(())
    }
}
