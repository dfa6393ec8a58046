//! GELF 레코드 조립
//!
//! [GELF 1.1](https://go2docs.graylog.org/current/getting_in_log_data/gelf.html) 레코드를
//! 정규 필드로부터 만듭니다.
//!
//! # 규칙
//! - `level`: 분류 severity, 없으면 설정 기본값
//! - `timestamp`: `timestamp` 필드의 숫자 값, 없거나 숫자가 아니면 현재 시각 (항상 숫자)
//! - `full_message`: trim된 원본 라인
//! - `_tp_link`: 카테고리
//! - 나머지 필드: `_` 접두어를 붙인 추가 필드 (`timestamp`, `rest`는 제외)

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ForwarderError;
use crate::prival::Priority;
use crate::projector::{CATEGORY, CanonicalFields, REST, SHORT_MESSAGE, TIMESTAMP};

/// GELF 명세 버전
pub const GELF_VERSION: &str = "1.1";

/// 카테고리를 담는 추가 필드 키
pub const CATEGORY_FIELD: &str = "_tp_link";

/// GELF가 예약한 추가 필드 키
const RESERVED_ID_FIELD: &str = "_id";

/// GELF 1.1 레코드
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GelfRecord {
    /// 항상 "1.1"
    pub version: String,
    /// 소켓에서 관측한 송신자 주소
    pub host: String,
    pub short_message: String,
    /// 원본 라인
    pub full_message: String,
    /// syslog severity (0-7)
    pub level: u8,
    /// 유닉스 초 (소수 허용)
    pub timestamp: f64,
    /// `_` 접두어 추가 필드
    #[serde(flatten)]
    pub additional: BTreeMap<String, Value>,
}

impl GelfRecord {
    /// 키가 정렬된 JSON 바이트로 직렬화합니다.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ForwarderError> {
        // Value::Object는 BTreeMap이므로 최상위 키까지 정렬됩니다
        let value =
            serde_json::to_value(self).map_err(|e| ForwarderError::Serialize(e.to_string()))?;
        serde_json::to_vec(&value).map_err(|e| ForwarderError::Serialize(e.to_string()))
    }

    /// 추가 필드 값을 반환합니다 (`_` 접두어 포함 키).
    pub fn additional(&self, key: &str) -> Option<&Value> {
        self.additional.get(key)
    }
}

/// 정규 필드 -> GELF 레코드 조립기
#[derive(Debug, Clone)]
pub struct GelfAssembler {
    /// severity가 없을 때 사용할 level
    default_level: u8,
}

impl GelfAssembler {
    /// 새 조립기를 생성합니다.
    pub fn new(default_level: u8) -> Self {
        Self { default_level }
    }

    /// 기본 level을 반환합니다.
    pub fn default_level(&self) -> u8 {
        self.default_level
    }

    /// 레코드를 조립합니다.
    pub fn assemble(
        &self,
        mut fields: CanonicalFields,
        priority: Priority,
        host: &str,
        line: &str,
    ) -> GelfRecord {
        let timestamp = fields
            .remove(TIMESTAMP)
            .and_then(|v| numeric_timestamp(&v))
            .unwrap_or_else(now_seconds);
        fields.remove(REST);

        let short_message = match fields.remove(SHORT_MESSAGE) {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => line.to_owned(),
        };

        let category = fields.remove(CATEGORY);

        let mut additional = BTreeMap::new();
        for (name, value) in fields {
            let Some(value) = gelf_value(value) else {
                continue;
            };
            let key = additional_key(&name);
            if key == CATEGORY_FIELD {
                debug!(field = %name, "field collides with category key, dropping");
                continue;
            }
            if additional.insert(key, value).is_some() {
                debug!(field = %name, "sanitized field name collides, keeping last value");
            }
        }

        // 카테고리 키는 어떤 추가 필드로도 덮어쓸 수 없습니다
        if let Some(category) = category {
            additional.insert(CATEGORY_FIELD.to_owned(), category);
        }

        GelfRecord {
            version: GELF_VERSION.to_owned(),
            host: host.to_owned(),
            short_message,
            full_message: line.to_owned(),
            level: priority.severity.unwrap_or(self.default_level),
            timestamp,
            additional,
        }
    }
}

impl Default for GelfAssembler {
    fn default() -> Self {
        Self::new(6)
    }
}

/// `timestamp` 필드를 숫자로 변환합니다. 비어 있거나 숫자가 아니면 None.
fn numeric_timestamp(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(ts) if ts.is_finite() => Some(ts),
        _ => {
            debug!(value = %value, "non-numeric timestamp, using receive time");
            None
        }
    }
}

/// 현재 시각 (유닉스 초, 소수 포함)
fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// 필드 이름을 GELF 추가 필드 키로 변환합니다.
///
/// 이미 `_`로 시작하면 접두어를 다시 붙이지 않고, ASCII `[A-Za-z0-9_.-]` 밖의 문자는 `_`로 바꿉니다.
/// 예약 키 `_id`는 `__id`로 내보냅니다.
pub fn additional_key(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let key = if sanitized.starts_with('_') {
        sanitized
    } else {
        format!("_{sanitized}")
    };

    if key == RESERVED_ID_FIELD {
        format!("_{key}")
    } else {
        key
    }
}

/// 추가 필드 값은 문자열 또는 숫자여야 합니다.
///
/// bool은 `"true"`/`"false"`, 객체/배열은 JSON 텍스트로 바꾸고 null은 생략합니다.
fn gelf_value(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(Value::String(b.to_string())),
        Value::Object(_) | Value::Array(_) => Some(Value::String(value.to_string())),
        scalar => Some(scalar),
    }
}
