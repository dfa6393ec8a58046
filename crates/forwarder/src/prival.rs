//! Syslog PRIVAL 디코더
//!
//! `PRIVAL = facility * 8 + severity` ([RFC 5424 Section 6.2.1]).
//!
//! TP-Link 장비가 보내는 PRIVAL은 항상 정규식의 숫자 그룹에서 오지만,
//! 디코더는 입력을 독립적으로 검증합니다. 숫자가 아닌 입력(음수 포함)은
//! facility/severity 모두 정의되지 않으며, facility가 23을 넘는 경우에도
//! severity는 그대로 보고합니다.
//!
//! [RFC 5424 Section 6.2.1]: https://tools.ietf.org/html/rfc5424#section-6.2.1

/// syslog facility 최댓값 (local7)
pub const MAX_FACILITY: u8 = 23;

/// PRIVAL에서 분리된 facility/severity 쌍
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Priority {
    /// facility (0-23), 범위를 벗어나거나 입력이 잘못되면 None
    pub facility: Option<u8>,
    /// severity (0-7), 입력이 잘못되면 None
    pub severity: Option<u8>,
}

impl Priority {
    /// facility/severity가 모두 정의되지 않은 값
    pub const UNDEFINED: Self = Self {
        facility: None,
        severity: None,
    };
}

/// PRIVAL 문자열을 facility/severity로 분리합니다.
///
/// `^\d+$` 형식만 받습니다. 64비트 정수를 넘는 숫자열은 facility가 범위를
/// 벗어난 것으로 보고, severity는 마지막 세 자리로 계산합니다 (1000은 8의 배수).
pub fn decode_prival(value: &str) -> Priority {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Priority::UNDEFINED;
    }

    match value.parse::<u64>() {
        Ok(prival) => {
            let facility = prival / 8;
            Priority {
                facility: (facility <= u64::from(MAX_FACILITY)).then_some(facility as u8),
                severity: Some((prival % 8) as u8),
            }
        }
        Err(_) => {
            let tail = &value[value.len().saturating_sub(3)..];
            // 숫자 세 자리 이하이므로 파싱은 실패하지 않습니다
            let severity = tail.parse::<u16>().ok().map(|t| (t % 8) as u8);
            Priority {
                facility: None,
                severity,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decoded(value: &str) -> (Option<u8>, Option<u8>) {
        let p = decode_prival(value);
        (p.facility, p.severity)
    }

    #[test]
    fn contract_table() {
        let table: &[(&str, Option<u8>, Option<u8>)] = &[
            ("0", Some(0), Some(0)),
            ("6", Some(0), Some(6)),
            ("7", Some(0), Some(7)),
            ("8", Some(1), Some(0)),
            ("31", Some(3), Some(7)),
            ("32", Some(4), Some(0)),
            ("127", Some(15), Some(7)),
            ("192", None, Some(0)),
            ("256", None, Some(0)),
            ("-1", None, None),
            ("abc", None, None),
        ];
        for (input, facility, severity) in table {
            assert_eq!(
                decoded(input),
                (*facility, *severity),
                "prival {input:?}"
            );
        }
    }

    #[test]
    fn highest_valid_facility() {
        // local7.debug = 23*8+7
        assert_eq!(decoded("191"), (Some(23), Some(7)));
    }

    #[test]
    fn rejects_empty_and_mixed_input() {
        assert_eq!(decode_prival(""), Priority::UNDEFINED);
        assert_eq!(decode_prival("12a"), Priority::UNDEFINED);
        assert_eq!(decode_prival(" 6"), Priority::UNDEFINED);
        assert_eq!(decode_prival("+6"), Priority::UNDEFINED);
        assert_eq!(decode_prival("6.0"), Priority::UNDEFINED);
    }

    #[test]
    fn leading_zeros_are_numeric() {
        assert_eq!(decoded("0134"), (Some(16), Some(6)));
    }

    #[test]
    fn overflowing_digits_keep_severity() {
        // 2^64 = 18446744073709551616 -> % 8 == 0
        assert_eq!(decoded("18446744073709551616"), (None, Some(0)));
        assert_eq!(decoded("99999999999999999999999"), (None, Some((999u16 % 8) as u8)));
    }

    proptest! {
        #[test]
        fn matches_arithmetic(prival in 0u64..100_000) {
            let p = decode_prival(&prival.to_string());
            prop_assert_eq!(p.severity, Some((prival % 8) as u8));
            if prival / 8 <= 23 {
                prop_assert_eq!(p.facility, Some((prival / 8) as u8));
            } else {
                prop_assert_eq!(p.facility, None);
            }
        }

        #[test]
        fn non_digit_input_is_undefined(s in ".*[^0-9].*") {
            prop_assert_eq!(decode_prival(&s), Priority::UNDEFINED);
        }
    }
}
