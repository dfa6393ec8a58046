//! 라인 분류기 -- TP-Link 장비의 메시지 형태를 순서대로 매칭합니다.
//!
//! [`LinePatternMatcher`]는 미리 컴파일한 패턴 목록을 우선순위 순서대로 시도하고,
//! 첫 번째로 매칭된 패턴의 [`Classification`] 변형을 반환합니다.
//! 패턴은 상호 배타적이지 않으므로 순서 자체가 우선순위 규칙입니다.
//!
//! # 패턴 (우선순위 순)
//! ```text
//! FirstLine           <6>Sep 20 21:42:02 192.168.40.5 [1758400919.541010111] AP MAC=...
//! AdditionalLine      [1758400919.891010111] AP MAC=...
//! ControllerOperation <158>1 2025-07-19 23:00:18 Omada-Controller - - - {"operation":...}
//! DhcpInfo            <134>1 2025-07-19 19:21:46 Omada-Controller - - - free text
//! Unparsed            (그 외 전부)
//! ```
//!
//! ControllerOperation은 DhcpInfo 문법의 부분집합(JSON 본문)이므로 반드시 먼저 시도합니다.

use std::collections::BTreeMap;

use regex::{Captures as RegexCaptures, Regex};

use crate::error::ForwarderError;
use crate::prival::{Priority, decode_prival};

/// 패턴에서 추출한 이름 있는 캡처 (이름 -> 값)
pub type Captures = BTreeMap<String, String>;

/// 소비 후 캡처 매핑에서 제거되는 그룹
const CONSUMED_GROUPS: &[&str] = &["prival", "version"];

/// AP 첫 라인: PRI + BSD 날짜 + IPv4 호스트 + [유닉스 타임스탬프] + "AP MAC=..."
const FIRST_LINE_PATTERN: &str = concat!(
    r"^<(?P<prival>\d+)>(?:(?P<version>\d{1,2}) )?",
    r"[A-Z][a-z]{2} +\d{1,2} \d{2}:\d{2}:\d{2} ",
    r"\d{1,3}(?:\.\d{1,3}){3} ",
    r"\[(?P<timestamp>\d+\.\d+)\] ",
    r"(?P<rest>AP MAC=.*)$",
);

/// AP 연속 라인: PRI/날짜/호스트 없이 [유닉스 타임스탬프] + "AP MAC=..."
const ADDITIONAL_LINE_PATTERN: &str =
    r"^\[(?P<timestamp>\d+(?:\.\d+)?)\] (?P<rest>AP MAC=.*)$";

/// RFC 5424 형태 헤더: PRI, VERSION, ISO 날짜, origin, app-name, procid, msgid
const RFC5424_HEADER: &str = concat!(
    r"^<(?P<prival>\d+)>(?:(?P<version>\d{1,2}) ?)?",
    r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})? ",
    r"(?P<origin>\S+) \S+ \S+ \S+ ",
);

/// 분류 결과 종류 (로그/메트릭 레이블용)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// 다중 라인 AP 메시지의 첫 라인
    FirstLine,
    /// 다중 라인 AP 메시지의 연속 라인
    AdditionalLine,
    /// 컨트롤러의 일반 텍스트 메시지 (DHCP 등)
    DhcpInfo,
    /// 컨트롤러의 JSON 본문 operation 메시지
    ControllerOperation,
    /// 어떤 패턴에도 맞지 않음
    Unparsed,
}

impl LineKind {
    /// 종류 이름을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstLine => "first_line",
            Self::AdditionalLine => "additional_line",
            Self::DhcpInfo => "dhcp_info",
            Self::ControllerOperation => "controller_operation",
            Self::Unparsed => "unparsed",
        }
    }
}

impl std::fmt::Display for LineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 매칭된 패턴의 캡처와 PRIVAL에서 얻은 우선순위
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    /// `prival`/`version`을 제외한 캡처
    pub captures: Captures,
    /// PRIVAL 디코딩 결과 (PRIVAL이 없는 패턴은 UNDEFINED)
    pub priority: Priority,
}

/// 라인 분류 결과
///
/// 변형 태그가 어떤 투영(projection)을 실행할지 결정합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// 다중 라인 AP 메시지의 첫 라인 (`timestamp`, `rest`)
    FirstLine(Matched),
    /// 다중 라인 AP 메시지의 연속 라인 (`timestamp`, `rest`)
    AdditionalLine(Matched),
    /// 컨트롤러 텍스트 메시지 (`origin`, `rest`)
    DhcpInfo(Matched),
    /// 컨트롤러 operation 메시지 (`origin`, `json`)
    ControllerOperation(Matched),
    /// 매칭 실패. 원본 라인만 유지합니다.
    Unparsed,
}

impl Classification {
    /// 분류 종류를 반환합니다.
    pub fn kind(&self) -> LineKind {
        match self {
            Self::FirstLine(_) => LineKind::FirstLine,
            Self::AdditionalLine(_) => LineKind::AdditionalLine,
            Self::DhcpInfo(_) => LineKind::DhcpInfo,
            Self::ControllerOperation(_) => LineKind::ControllerOperation,
            Self::Unparsed => LineKind::Unparsed,
        }
    }

    /// 매칭된 캡처를 반환합니다. `Unparsed`이면 None.
    pub fn matched(&self) -> Option<&Matched> {
        match self {
            Self::FirstLine(m)
            | Self::AdditionalLine(m)
            | Self::DhcpInfo(m)
            | Self::ControllerOperation(m) => Some(m),
            Self::Unparsed => None,
        }
    }

    /// PRIVAL에서 얻은 우선순위를 반환합니다.
    pub fn priority(&self) -> Priority {
        self.matched()
            .map(|m| m.priority)
            .unwrap_or(Priority::UNDEFINED)
    }
}

/// 이름 있는 단일 패턴
struct LinePattern {
    kind: LineKind,
    regex: Regex,
}

/// 순서 있는 라인 패턴 매처
///
/// 생성 시 모든 정규식을 한 번 컴파일하며, 이후 분류는 순수 함수입니다.
pub struct LinePatternMatcher {
    /// 우선순위 순서의 패턴 목록
    patterns: Vec<LinePattern>,
}

impl LinePatternMatcher {
    /// 기본 TP-Link 패턴 세트로 매처를 생성합니다.
    pub fn new() -> Result<Self, ForwarderError> {
        let patterns = vec![
            LinePattern {
                kind: LineKind::FirstLine,
                regex: Regex::new(FIRST_LINE_PATTERN)?,
            },
            LinePattern {
                kind: LineKind::AdditionalLine,
                regex: Regex::new(ADDITIONAL_LINE_PATTERN)?,
            },
            LinePattern {
                kind: LineKind::ControllerOperation,
                regex: Regex::new(&format!(r"{RFC5424_HEADER}(?P<json>\{{.*\}})$"))?,
            },
            LinePattern {
                kind: LineKind::DhcpInfo,
                regex: Regex::new(&format!(r"{RFC5424_HEADER}(?P<rest>.*)$"))?,
            },
        ];
        Ok(Self { patterns })
    }

    /// 라인을 분류합니다. 첫 번째로 매칭된 패턴이 이깁니다.
    pub fn classify(&self, line: &str) -> Classification {
        for pattern in &self.patterns {
            if let Some(caps) = pattern.regex.captures(line) {
                let matched = Self::extract(&pattern.regex, &caps);
                return match pattern.kind {
                    LineKind::FirstLine => Classification::FirstLine(matched),
                    LineKind::AdditionalLine => Classification::AdditionalLine(matched),
                    LineKind::DhcpInfo => Classification::DhcpInfo(matched),
                    LineKind::ControllerOperation => Classification::ControllerOperation(matched),
                    LineKind::Unparsed => Classification::Unparsed,
                };
            }
        }
        Classification::Unparsed
    }

    /// 등록된 패턴 종류를 우선순위 순서로 반환합니다.
    pub fn pattern_order(&self) -> Vec<LineKind> {
        self.patterns.iter().map(|p| p.kind).collect()
    }

    /// 이름 있는 그룹을 캡처 매핑으로 옮기고 PRIVAL을 소비합니다.
    fn extract(regex: &Regex, caps: &RegexCaptures<'_>) -> Matched {
        let priority = caps
            .name("prival")
            .map(|m| decode_prival(m.as_str()))
            .unwrap_or(Priority::UNDEFINED);

        let captures = regex
            .capture_names()
            .flatten()
            .filter(|name| !CONSUMED_GROUPS.contains(name))
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_owned(), m.as_str().to_owned()))
            })
            .collect();

        Matched { captures, priority }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST: &str = "<6>Sep 20 21:42:02 192.168.40.5 [1758400919.541010111] AP MAC=aa:bb:5f:e0:a6:aa MAC SRC=bb:aa:da:c8:1e:54 IP SRC=192.168.50.73 IP DST=52.45.111.111 IP proto=6 SPT=49808 DPT=1883";
    const ADDITIONAL: &str = "[1758400919.891010111] AP MAC=aa:bb:5f:e0:a6:aa MAC SRC=bb:aa:da:c8:1e:54 IP SRC=192.168.50.73 IP DST=52.45.111.111 IP proto=6 SPT=49808 DPT=1883";
    const DHCP: &str = "<134>1 2025-07-19 19:21:46 Omada-Controller-XXXX-YYYYYYYYYY - - - 2.5G WAN1: DHCP client lease expired. Began renewing the lease.";
    const OPERATION: &str = r#"<158>1 2025-07-19 23:00:18 Omada-Controller-XXXX - - - {"details":{},"operation":"logged in successfully."}"#;

    fn matcher() -> LinePatternMatcher {
        LinePatternMatcher::new().unwrap()
    }

    #[test]
    fn pattern_order_puts_json_before_text() {
        assert_eq!(
            matcher().pattern_order(),
            vec![
                LineKind::FirstLine,
                LineKind::AdditionalLine,
                LineKind::ControllerOperation,
                LineKind::DhcpInfo,
            ]
        );
    }

    #[test]
    fn classify_first_line() {
        let Classification::FirstLine(m) = matcher().classify(FIRST) else {
            panic!("expected FirstLine");
        };
        assert_eq!(m.priority.facility, Some(0));
        assert_eq!(m.priority.severity, Some(6));
        assert_eq!(m.captures["timestamp"], "1758400919.541010111");
        assert!(m.captures["rest"].starts_with("AP MAC="));
        assert!(!m.captures.contains_key("prival"));
        assert!(!m.captures.contains_key("version"));
    }

    #[test]
    fn classify_first_line_with_version() {
        let line = "<14>1 Sep  2 01:02:03 10.0.0.1 [1.5] AP MAC=x";
        let c = matcher().classify(line);
        assert_eq!(c.kind(), LineKind::FirstLine);
        assert_eq!(c.priority().facility, Some(1));
        assert!(!c.matched().unwrap().captures.contains_key("version"));
    }

    #[test]
    fn classify_additional_line() {
        let Classification::AdditionalLine(m) = matcher().classify(ADDITIONAL) else {
            panic!("expected AdditionalLine");
        };
        assert_eq!(m.priority, Priority::UNDEFINED);
        assert_eq!(m.captures["timestamp"], "1758400919.891010111");
        assert!(m.captures["rest"].starts_with("AP MAC="));
        assert_eq!(m.captures.len(), 2);
    }

    #[test]
    fn classify_dhcp_info() {
        let Classification::DhcpInfo(m) = matcher().classify(DHCP) else {
            panic!("expected DhcpInfo");
        };
        assert_eq!(m.priority.facility, Some(16));
        assert_eq!(m.priority.severity, Some(6));
        assert_eq!(m.captures["origin"], "Omada-Controller-XXXX-YYYYYYYYYY");
        assert!(m.captures["rest"].contains("DHCP client lease expired"));
    }

    #[test]
    fn classify_controller_operation() {
        let Classification::ControllerOperation(m) = matcher().classify(OPERATION) else {
            panic!("expected ControllerOperation");
        };
        assert_eq!(m.priority.facility, Some(19));
        assert_eq!(m.priority.severity, Some(6));
        assert_eq!(m.captures["origin"], "Omada-Controller-XXXX");
        assert_eq!(
            m.captures["json"],
            r#"{"details":{},"operation":"logged in successfully."}"#
        );
        assert!(!m.captures.contains_key("rest"));
    }

    #[test]
    fn malformed_json_body_still_classifies_as_operation() {
        // 형태만 검사하므로 디코딩 실패는 투영 단계의 에러입니다
        let line = "<158>1 2025-07-19 23:00:18 Omada - - - {not json}";
        assert_eq!(
            matcher().classify(line).kind(),
            LineKind::ControllerOperation
        );
    }

    #[test]
    fn text_body_with_braces_inside_is_dhcp() {
        let line = "<134>1 2025-07-19 19:21:46 Omada - - - client {x} connected";
        assert_eq!(matcher().classify(line).kind(), LineKind::DhcpInfo);
    }

    #[test]
    fn unknown_lines_are_unparsed() {
        let m = matcher();
        for line in [
            "hello world",
            "<6>garbage without structure",
            "[notatimestamp] AP MAC=aa",
            "<134>1 2025-07-19 19:21:46 Omada - -",
        ] {
            let c = m.classify(line);
            assert_eq!(c, Classification::Unparsed, "line {line:?}");
            assert_eq!(c.priority(), Priority::UNDEFINED);
        }
    }

    #[test]
    fn out_of_range_facility_keeps_severity() {
        let line = "<192>1 2025-07-19 19:21:46 Omada - - - text";
        let c = matcher().classify(line);
        assert_eq!(c.kind(), LineKind::DhcpInfo);
        assert_eq!(c.priority().facility, None);
        assert_eq!(c.priority().severity, Some(0));
    }

    #[test]
    fn classification_is_idempotent() {
        let m = matcher();
        for line in [FIRST, ADDITIONAL, DHCP, OPERATION, "junk line"] {
            assert_eq!(m.classify(line), m.classify(line));
        }
    }

    #[test]
    fn line_kind_display() {
        assert_eq!(LineKind::ControllerOperation.to_string(), "controller_operation");
    }
}
