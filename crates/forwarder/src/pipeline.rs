//! 포워딩 파이프라인 -- 데이터그램 하나를 라인 단위 GELF 레코드로 변환해 전송합니다.
//!
//! # 처리 흐름
//! ```text
//! RawDatagram -> split_lines -> LinePatternMatcher -> FieldProjector -> GelfAssembler -> GelfSink
//!                                      ^                    |
//!                                      +-- CarryoverState --+
//! ```
//!
//! 라인 단위 에러(잘못된 JSON 본문, 전송 실패)는 라인 경계에서 잡혀 로그와 메트릭으로
//! 남고, 다음 라인 처리는 계속됩니다. carryover 상태는 데이터그램마다 새로 만듭니다.

use std::net::SocketAddr;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, error, warn};

use tplink_gelf_core::metrics as m;

use crate::carryover::CarryoverState;
use crate::classifier::LinePatternMatcher;
use crate::config::ForwarderConfig;
use crate::error::ForwarderError;
use crate::gelf::{GelfAssembler, GelfRecord};
use crate::projector::{Category, FieldProjector};
use crate::sink::GelfSink;

/// 이 길이(문자 수) 이하의 라인은 분류하지 않고 버립니다
pub const MIN_LINE_CHARS: usize = 3;

/// 수신된 원시 데이터그램
#[derive(Debug, Clone)]
pub struct RawDatagram {
    /// 페이로드 바이트
    pub payload: Bytes,
    /// 송신자 주소
    pub peer: SocketAddr,
}

impl RawDatagram {
    /// 새 데이터그램을 생성합니다.
    pub fn new(payload: impl Into<Bytes>, peer: SocketAddr) -> Self {
        Self {
            payload: payload.into(),
            peer,
        }
    }
}

/// 데이터그램 하나의 처리 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatagramReport {
    /// 비어 있지 않은 라인 수
    pub lines: usize,
    /// 길이 미달로 버린 라인 수
    pub skipped: usize,
    /// 전송에 성공한 레코드 수
    pub forwarded: usize,
    /// 투영/직렬화/전송에 실패한 라인 수
    pub failed: usize,
}

impl DatagramReport {
    /// 분류 단계까지 간 라인 수
    pub fn processed(&self) -> usize {
        self.lines - self.skipped
    }
}

/// 데이터그램 페이로드를 trim된 라인으로 나눕니다.
///
/// 장비는 CRLF로 라인을 구분하지만 여기서는 LF로 나누고 각 라인을 trim하므로
/// CRLF와 LF 모두 구분자가 됩니다. 따라서 라인 안에 단독 LF가 있으면 레코드 두 개로
/// 나뉩니다. 빈 라인은 버립니다.
pub fn split_lines(payload: &str) -> impl Iterator<Item = &str> {
    payload
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

/// 라인이 분류 대상이 되기에 너무 짧은지 여부
pub fn is_trivial(line: &str) -> bool {
    line.chars().count() <= MIN_LINE_CHARS
}

/// TP-Link syslog -> GELF 포워딩 파이프라인
///
/// # 사용 예시
/// ```ignore
/// use tplink_gelf_forwarder::{ForwardingPipeline, UdpGelfSink};
///
/// let sink = UdpGelfSink::connect(&config).await?;
/// let pipeline = ForwardingPipeline::builder()
///     .default_level(config.default_level)
///     .sink(sink)
///     .build()?;
///
/// let report = pipeline.process_datagram(&datagram).await;
/// ```
pub struct ForwardingPipeline<S> {
    matcher: LinePatternMatcher,
    projector: FieldProjector,
    assembler: GelfAssembler,
    sink: S,
}

impl<S: GelfSink> ForwardingPipeline<S> {
    /// 기본 level과 싱크로 파이프라인을 생성합니다.
    pub fn new(sink: S, default_level: u8) -> Result<Self, ForwarderError> {
        Ok(Self {
            matcher: LinePatternMatcher::new()?,
            projector: FieldProjector::new()?,
            assembler: GelfAssembler::new(default_level),
            sink,
        })
    }

    /// 포워더 설정과 싱크로 파이프라인을 생성합니다.
    pub fn from_config(config: &ForwarderConfig, sink: S) -> Result<Self, ForwarderError> {
        config.validate()?;
        Self::new(sink, config.default_level)
    }

    /// 빌더를 생성합니다.
    pub fn builder() -> ForwardingPipelineBuilder<S> {
        ForwardingPipelineBuilder::new()
    }

    /// 싱크 참조를 반환합니다.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 데이터그램 하나를 처리합니다.
    ///
    /// 라인은 순서대로 처리되며, 실패한 라인은 건너뛰고 다음 라인을 계속 처리합니다.
    pub async fn process_datagram(&self, datagram: &RawDatagram) -> DatagramReport {
        let started = Instant::now();
        let host = datagram.peer.ip().to_string();
        let text = String::from_utf8_lossy(&datagram.payload);

        metrics::counter!(m::DATAGRAMS_RECEIVED_TOTAL).increment(1);

        let mut carryover = CarryoverState::new();
        let mut report = DatagramReport::default();

        for line in split_lines(&text) {
            report.lines += 1;
            metrics::counter!(m::LINES_RECEIVED_TOTAL).increment(1);

            if is_trivial(line) {
                debug!(line, peer = %datagram.peer, "skipping trivial line");
                metrics::counter!(m::LINES_SKIPPED_TOTAL).increment(1);
                report.skipped += 1;
                continue;
            }

            match self.forward_line(line, &host, &mut carryover).await {
                Ok(category) => {
                    metrics::counter!(m::RECORDS_FORWARDED_TOTAL, m::LABEL_CATEGORY => category.as_str())
                        .increment(1);
                    report.forwarded += 1;
                }
                Err(_) => report.failed += 1,
            }
        }

        metrics::histogram!(m::DATAGRAM_PROCESSING_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        debug!(
            peer = %datagram.peer,
            lines = report.lines,
            skipped = report.skipped,
            forwarded = report.forwarded,
            failed = report.failed,
            "datagram processed"
        );

        report
    }

    /// 라인 하나를 GELF 레코드로 변환합니다 (전송하지 않음).
    ///
    /// FirstLine이면 `carryover`를 교체합니다.
    pub fn render_line(
        &self,
        line: &str,
        host: &str,
        carryover: &mut CarryoverState,
    ) -> Result<(GelfRecord, Category), ForwarderError> {
        let classification = self.matcher.classify(line);
        let projection = self.projector.project(&classification, line, carryover)?;
        carryover.apply(projection.carryover);

        let record = self.assembler.assemble(
            projection.fields,
            classification.priority(),
            host,
            line,
        );
        Ok((record, projection.category))
    }

    /// 라인 하나를 변환해 전송합니다. 에러는 여기서 로그와 메트릭으로 남깁니다.
    async fn forward_line(
        &self,
        line: &str,
        host: &str,
        carryover: &mut CarryoverState,
    ) -> Result<Category, ForwarderError> {
        let (record, category) = match self.render_line(line, host, carryover) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(error = %e, line, host, "failed to project line, skipping");
                metrics::counter!(m::PROJECTION_ERRORS_TOTAL).increment(1);
                return Err(e);
            }
        };

        let payload = match record.to_json_bytes() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, line, host, "failed to serialize record, skipping");
                metrics::counter!(m::PROJECTION_ERRORS_TOTAL).increment(1);
                return Err(e);
            }
        };

        if let Err(e) = self.sink.deliver(&payload).await {
            error!(
                error = %e,
                record = %String::from_utf8_lossy(&payload),
                "failed to deliver GELF record"
            );
            metrics::counter!(m::DELIVERY_ERRORS_TOTAL).increment(1);
            return Err(e);
        }

        Ok(category)
    }
}

/// 포워딩 파이프라인 빌더
pub struct ForwardingPipelineBuilder<S> {
    sink: Option<S>,
    default_level: u8,
}

impl<S: GelfSink> ForwardingPipelineBuilder<S> {
    /// 새 빌더를 생성합니다. 기본 level은 6 (Informational).
    pub fn new() -> Self {
        Self {
            sink: None,
            default_level: ForwarderConfig::default().default_level,
        }
    }

    /// 전송 싱크를 설정합니다.
    pub fn sink(mut self, sink: S) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 기본 level을 설정합니다.
    pub fn default_level(mut self, level: u8) -> Self {
        self.default_level = level;
        self
    }

    /// 파이프라인을 생성합니다.
    ///
    /// # Errors
    /// 싱크가 없거나 기본 level이 범위를 벗어나면 에러를 반환합니다.
    pub fn build(self) -> Result<ForwardingPipeline<S>, ForwarderError> {
        let sink = self.sink.ok_or_else(|| ForwarderError::Config {
            field: "sink".to_owned(),
            reason: "a GELF sink is required".to_owned(),
        })?;
        if self.default_level > 7 {
            return Err(ForwarderError::Config {
                field: "default_level".to_owned(),
                reason: "must be 0-7".to_owned(),
            });
        }
        ForwardingPipeline::new(sink, self.default_level)
    }
}

impl<S: GelfSink> Default for ForwardingPipelineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
