//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! forwarder는 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `tplink_gelf_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(tplink_gelf_core::metrics::LINES_RECEIVED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 분류 카테고리 레이블 키 (AP, DHCP, OPERATION, UNPARSED)
pub const LABEL_CATEGORY: &str = "category";

// ─── 수신 메트릭 ────────────────────────────────────────────────────

/// 수신된 UDP 데이터그램 수 (counter)
pub const DATAGRAMS_RECEIVED_TOTAL: &str = "tplink_gelf_datagrams_received_total";

/// 데이터그램에서 분리된 로그 라인 수 (counter)
pub const LINES_RECEIVED_TOTAL: &str = "tplink_gelf_lines_received_total";

/// 길이 미달로 버려진 라인 수 (counter)
pub const LINES_SKIPPED_TOTAL: &str = "tplink_gelf_lines_skipped_total";

// ─── 처리/전송 메트릭 ───────────────────────────────────────────────

/// 전송된 GELF 레코드 수 (counter, label: category)
pub const RECORDS_FORWARDED_TOTAL: &str = "tplink_gelf_records_forwarded_total";

/// 필드 투영 실패 수 (counter) -- 주로 잘못된 JSON 본문
pub const PROJECTION_ERRORS_TOTAL: &str = "tplink_gelf_projection_errors_total";

/// 싱크 전송 실패 수 (counter)
pub const DELIVERY_ERRORS_TOTAL: &str = "tplink_gelf_delivery_errors_total";

/// 청크 임계값을 넘은 페이로드 수 (counter)
pub const OVERSIZE_PAYLOADS_TOTAL: &str = "tplink_gelf_oversize_payloads_total";

/// 데이터그램 하나의 처리 시간 (histogram, 초)
pub const DATAGRAM_PROCESSING_DURATION_SECONDS: &str =
    "tplink_gelf_datagram_processing_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출합니다. 레코더가 없으면 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        DATAGRAMS_RECEIVED_TOTAL,
        "Total number of syslog datagrams received"
    );
    describe_counter!(
        LINES_RECEIVED_TOTAL,
        "Total number of log lines split out of received datagrams"
    );
    describe_counter!(
        LINES_SKIPPED_TOTAL,
        "Total number of trivial lines (3 characters or fewer) discarded"
    );
    describe_counter!(
        RECORDS_FORWARDED_TOTAL,
        "Total number of GELF records delivered, by category"
    );
    describe_counter!(
        PROJECTION_ERRORS_TOTAL,
        "Total number of lines dropped because field projection failed"
    );
    describe_counter!(
        DELIVERY_ERRORS_TOTAL,
        "Total number of GELF records the sink failed to deliver"
    );
    describe_counter!(
        OVERSIZE_PAYLOADS_TOTAL,
        "Total number of GELF payloads larger than the chunking threshold"
    );
    describe_histogram!(
        DATAGRAM_PROCESSING_DURATION_SECONDS,
        "Time to process a single datagram in seconds"
    );
}
