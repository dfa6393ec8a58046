//! 데이터그램 단위 carryover 상태
//!
//! 다중 라인 AP 메시지에서 첫 라인의 필드를 연속 라인으로 전달합니다.
//! 상태는 데이터그램마다 새로 만들어지며, 데이터그램 사이에 공유되지 않습니다.
//!
//! 상태 변경은 투영 결과가 돌려주는 [`CarryoverUpdate`]로만 일어납니다.
//! - FirstLine: 상태 전체를 교체
//! - 그 외 변형: 유지 (읽기만 하거나 아예 보지 않음)

use crate::projector::CanonicalFields;

/// 투영 후 carryover에 적용할 변경
#[derive(Debug, Clone, PartialEq)]
pub enum CarryoverUpdate {
    /// 상태를 그대로 둡니다
    Keep,
    /// 상태를 주어진 스냅샷으로 교체합니다
    Replace(CanonicalFields),
}

/// 첫 라인에서 넘어온 필드 스냅샷
///
/// 비어 있으면 첫 라인을 기다리는 상태, 채워져 있으면 다중 라인 AP 메시지 안입니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarryoverState {
    fields: CanonicalFields,
}

impl CarryoverState {
    /// 빈 상태를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 첫 라인을 아직 보지 못했는지 여부
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 현재 스냅샷
    pub fn snapshot(&self) -> &CanonicalFields {
        &self.fields
    }

    /// 변경을 적용합니다.
    pub fn apply(&mut self, update: CarryoverUpdate) {
        if let CarryoverUpdate::Replace(fields) = update {
            self.fields = fields;
        }
    }
}
