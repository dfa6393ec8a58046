//! 포워더 에러 타입
//!
//! [`ForwarderError`]는 분류/투영/조립/전송 과정에서 발생하는 모든 에러를 표현합니다.
//! `From<ForwarderError> for RelayError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 라인 단위 에러(`InvalidPayload`, `Serialize`, `Delivery`)는 파이프라인이
//! 라인 경계에서 잡아 로그로 남기며, 수신 루프를 중단시키지 않습니다.

use tplink_gelf_core::error::RelayError;

/// 포워더 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    /// 컨트롤러 operation 라인의 JSON 본문이 잘못됨
    #[error("invalid payload: {reason}")]
    InvalidPayload {
        /// 실패 사유
        reason: String,
    },

    /// GELF 레코드 직렬화 실패
    #[error("serialize error: {0}")]
    Serialize(String),

    /// 싱크 전송 실패
    #[error("delivery error: {target}: {reason}")]
    Delivery {
        /// 전송 대상 (host:port)
        target: String,
        /// 실패 사유
        reason: String,
    },

    /// 수집기 에러 (소켓 바인드/수신)
    #[error("collector error: {reason}")]
    Collector {
        /// 에러 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<ForwarderError> for RelayError {
    fn from(err: ForwarderError) -> Self {
        match err {
            ForwarderError::Io(e) => RelayError::Io(e),
            other => RelayError::Forward(other.to_string()),
        }
    }
}
