//! 필드 투영 -- 분류 결과를 정규 필드 집합으로 변환합니다.
//!
//! [`FieldProjector`]는 분류 변형마다 하나의 투영 규칙을 적용한 뒤,
//! 모든 변형에 공통으로 네트워크 튜플(AP MAC, MAC/IP 출발지·목적지, 프로토콜, 포트)
//! 2차 추출을 수행합니다.
//!
//! 모든 병합은 불변 스냅샷 위의 순서 있는 병합([`CanonicalFields::merged`])입니다.
//! 뒤에 오는 값이 같은 키의 앞선 값을 덮어씁니다.

use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::carryover::{CarryoverState, CarryoverUpdate};
use crate::classifier::{Captures, Classification};
use crate::error::ForwarderError;

/// 2차 추출 패턴: `AP MAC=.. MAC SRC=.. IP SRC=.. IP DST=.. IP proto=.. SPT=.. DPT=..`
const NETWORK_TUPLE_PATTERN: &str = concat!(
    r"AP MAC=(?P<AP_MAC>[0-9A-Fa-f:]{17}) ",
    r"MAC SRC=(?P<MAC_SRC>[0-9A-Fa-f:]{17}) ",
    r"IP SRC=(?P<IP_SRC>[0-9.]{7,15}) ",
    r"IP DST=(?P<IP_DST>[0-9.]{7,15}) ",
    r"IP proto=(?P<IP_PROTO>\d+) ",
    r"SPT=(?P<SPT>\d+) ",
    r"DPT=(?P<DPT>\d+)",
);

/// 2차 추출로 병합되는 필드 이름
pub const NETWORK_TUPLE_FIELDS: [&str; 7] = [
    "AP_MAC", "MAC_SRC", "IP_SRC", "IP_DST", "IP_PROTO", "SPT", "DPT",
];

/// 필드 이름: 요약 메시지
pub const SHORT_MESSAGE: &str = "short_message";
/// 필드 이름: 분류 카테고리
pub const CATEGORY: &str = "category";
/// 필드 이름: 장비 타임스탬프 (조립 단계에서 소비)
pub const TIMESTAMP: &str = "timestamp";
/// 필드 이름: 메시지 나머지 부분 (조립 단계에서 소비)
pub const REST: &str = "rest";

/// 레코드 카테고리 (GELF `_tp_link` 값)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// AP 방화벽/트래픽 로그
    Ap,
    /// 컨트롤러 DHCP 및 일반 텍스트
    Dhcp,
    /// 컨트롤러 operation (JSON)
    Operation,
    /// 매칭 실패
    Unparsed,
}

impl Category {
    /// 카테고리 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ap => "AP",
            Self::Dhcp => "DHCP",
            Self::Operation => "OPERATION",
            Self::Unparsed => "UNPARSED",
        }
    }

    /// `short_message` 접두어
    fn message_prefix(&self) -> &'static str {
        match self {
            Self::Ap => "TP-Link: ",
            Self::Dhcp => "TP-Link DHCP: ",
            Self::Operation => "TP-Link OPERATION: ",
            Self::Unparsed => "TP-Link Unknown: ",
        }
    }
}

/// 정규 필드 매핑 (이름 -> JSON 값)
///
/// 키 순서가 안정적인 `BTreeMap` 위의 얇은 래퍼입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CanonicalFields(BTreeMap<String, Value>);

impl CanonicalFields {
    /// 빈 매핑을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 캡처를 문자열 값 매핑으로 변환합니다.
    pub fn from_captures(captures: &Captures) -> Self {
        captures
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }

    /// 이 스냅샷 위에 `overlay`를 순서대로 덮어쓴 새 매핑을 반환합니다.
    pub fn merged<I>(&self, overlay: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut out = self.clone();
        out.0.extend(overlay);
        out
    }

    /// 값을 삽입합니다. 같은 키가 있으면 덮어씁니다.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// 문자열 값을 삽입합니다.
    pub fn insert_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Value::String(value.into()));
    }

    /// 키를 제거하고 값을 반환합니다.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 문자열 값을 반환합니다. 문자열이 아니면 None.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// `short_message` 값 (투영 결과에는 항상 존재)
    pub fn short_message(&self) -> &str {
        self.get_str(SHORT_MESSAGE).unwrap_or_default()
    }
}

impl FromIterator<(String, Value)> for CanonicalFields {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CanonicalFields {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// 단일 라인의 투영 결과
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// 정규 필드 (`short_message`, `category` 포함)
    pub fields: CanonicalFields,
    /// 레코드 카테고리
    pub category: Category,
    /// carryover에 적용할 변경
    pub carryover: CarryoverUpdate,
}

/// 분류 변형별 필드 투영기
pub struct FieldProjector {
    /// 네트워크 튜플 2차 추출 정규식
    network_tuple: Regex,
}

impl FieldProjector {
    /// 새 투영기를 생성합니다.
    pub fn new() -> Result<Self, ForwarderError> {
        Ok(Self {
            network_tuple: Regex::new(NETWORK_TUPLE_PATTERN)?,
        })
    }

    /// 분류 결과를 정규 필드로 투영합니다.
    ///
    /// ControllerOperation의 JSON 본문이 객체로 디코딩되지 않으면
    /// [`ForwarderError::InvalidPayload`]를 반환합니다.
    pub fn project(
        &self,
        classification: &Classification,
        line: &str,
        carryover: &CarryoverState,
    ) -> Result<Projection, ForwarderError> {
        let (fields, category, update) = match classification {
            Classification::FirstLine(m) => {
                let fields = Self::describe(
                    CanonicalFields::from_captures(&m.captures),
                    Category::Ap,
                    REST,
                    line,
                );
                (fields.clone(), Category::Ap, CarryoverUpdate::Replace(fields))
            }
            Classification::AdditionalLine(m) => {
                if carryover.is_empty() {
                    debug!(line, "continuation line without a preceding first line");
                }
                let base = carryover
                    .snapshot()
                    .merged(CanonicalFields::from_captures(&m.captures));
                let fields = Self::describe(base, Category::Ap, REST, line);
                (fields, Category::Ap, CarryoverUpdate::Keep)
            }
            Classification::DhcpInfo(m) => {
                let fields = Self::describe(
                    CanonicalFields::from_captures(&m.captures),
                    Category::Dhcp,
                    REST,
                    line,
                );
                (fields, Category::Dhcp, CarryoverUpdate::Keep)
            }
            Classification::ControllerOperation(m) => {
                let fields = Self::project_operation(&m.captures, line)?;
                (fields, Category::Operation, CarryoverUpdate::Keep)
            }
            Classification::Unparsed => {
                let mut fields = CanonicalFields::new();
                fields.insert_str(
                    SHORT_MESSAGE,
                    format!("{}{line}", Category::Unparsed.message_prefix()),
                );
                fields.insert_str(CATEGORY, Category::Unparsed.as_str());
                (fields, Category::Unparsed, CarryoverUpdate::Keep)
            }
        };

        Ok(Projection {
            fields: self.extract_network_tuple(fields, line),
            category,
            carryover: update,
        })
    }

    /// `origin`만 남기고 JSON 본문의 최상위 키를 병합합니다.
    fn project_operation(captures: &Captures, line: &str) -> Result<CanonicalFields, ForwarderError> {
        let json = captures.get("json").map(String::as_str).unwrap_or_default();
        let payload = match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(ForwarderError::InvalidPayload {
                    reason: format!("expected JSON object, got {}", json_type_name(&other)),
                });
            }
            Err(e) => {
                return Err(ForwarderError::InvalidPayload {
                    reason: e.to_string(),
                });
            }
        };

        let mut base = CanonicalFields::new();
        if let Some(origin) = captures.get("origin") {
            base.insert_str("origin", origin.clone());
        }
        let merged = base.merged(payload);
        Ok(Self::describe(merged, Category::Operation, "operation", line))
    }

    /// `short_message`와 `category`를 채웁니다.
    ///
    /// `source_key` 값이 비어 있거나 없으면 원본 라인을 사용합니다.
    fn describe(
        mut fields: CanonicalFields,
        category: Category,
        source_key: &str,
        line: &str,
    ) -> CanonicalFields {
        let text = fields
            .get(source_key)
            .and_then(value_text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| line.to_owned());
        fields.insert_str(SHORT_MESSAGE, format!("{}{text}", category.message_prefix()));
        fields.insert_str(CATEGORY, category.as_str());
        fields
    }

    /// `rest`(없으면 원본 라인)에서 네트워크 튜플을 찾아 병합합니다.
    ///
    /// 매칭되지 않으면 필드를 그대로 반환합니다.
    pub fn extract_network_tuple(&self, fields: CanonicalFields, line: &str) -> CanonicalFields {
        let source = fields
            .get_str(REST)
            .filter(|s| !s.is_empty())
            .unwrap_or(line);

        let Some(caps) = self.network_tuple.captures(source) else {
            return fields;
        };

        let tuple: Vec<(String, Value)> = NETWORK_TUPLE_FIELDS
            .iter()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| ((*name).to_owned(), Value::String(m.as_str().to_owned())))
            })
            .collect();
        fields.merged(tuple)
    }
}

/// 스칼라 JSON 값을 텍스트로 변환합니다. null/객체/배열은 None.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
