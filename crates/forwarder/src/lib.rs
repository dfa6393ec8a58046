#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`prival`]: syslog PRIVAL -> facility/severity 디코더
//! - [`classifier`]: 라인 패턴 매칭 (FirstLine, AdditionalLine, ControllerOperation, DhcpInfo, Unparsed)
//! - [`carryover`]: 다중 라인 AP 메시지의 데이터그램 단위 상태
//! - [`projector`]: 분류 결과 -> 정규 필드 투영
//! - [`gelf`]: GELF 1.1 레코드 조립 및 직렬화
//! - [`sink`]: GELF 전송 싱크 (UDP + zlib)
//! - [`pipeline`]: 데이터그램 단위 포워딩 파이프라인
//! - [`collector`]: UDP syslog 수집기
//! - [`config`]: 포워더 설정 (core 설정에서 파생)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! SyslogUdpCollector -> ForwardingPipeline -> UdpGelfSink
//!                         |
//!          classify -> project -> assemble (라인 단위, carryover 공유)
//! ```

pub mod carryover;
pub mod classifier;
pub mod collector;
pub mod config;
pub mod error;
pub mod gelf;
pub mod pipeline;
pub mod prival;
pub mod projector;
pub mod sink;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{
    DatagramReport, ForwardingPipeline, ForwardingPipelineBuilder, RawDatagram, split_lines,
};

// 설정
pub use config::{ForwarderConfig, ForwarderConfigBuilder};

// 에러
pub use error::ForwarderError;

// 분류/투영/조립
pub use carryover::{CarryoverState, CarryoverUpdate};
pub use classifier::{Classification, LineKind, LinePatternMatcher};
pub use gelf::{GelfAssembler, GelfRecord};
pub use prival::{Priority, decode_prival};
pub use projector::{CanonicalFields, Category, FieldProjector, Projection};

// 수집/전송
pub use collector::SyslogUdpCollector;
pub use sink::{GelfSink, UdpGelfSink};
