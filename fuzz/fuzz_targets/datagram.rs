#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tplink_gelf_forwarder::pipeline::is_trivial;
use tplink_gelf_forwarder::{
    CarryoverState, ForwarderError, ForwardingPipeline, GelfSink, split_lines,
};

struct NullSink;

impl GelfSink for NullSink {
    async fn deliver(&self, _payload: &[u8]) -> Result<(), ForwarderError> {
        Ok(())
    }
}

/// 퍼저용 구조적 입력: 장비 라인 조각을 섞은 데이터그램
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    lines: Vec<FuzzLine>,
    crlf: bool,
}

#[derive(Arbitrary, Debug)]
enum FuzzLine {
    First { prival: u16, body: String },
    Additional { body: String },
    Operation { prival: u16, json: String },
    Raw(String),
}

impl FuzzLine {
    fn render(&self) -> String {
        match self {
            Self::First { prival, body } => format!(
                "<{prival}>Sep 20 21:42:02 192.168.40.5 [1758400919.541010111] AP MAC={body}"
            ),
            Self::Additional { body } => format!("[1758400919.891010111] AP MAC={body}"),
            Self::Operation { prival, json } => format!(
                "<{prival}>1 2025-07-19 23:00:18 Omada-Controller-XXXX - - - {{{json}}}"
            ),
            Self::Raw(text) => text.clone(),
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let separator = if input.crlf { "\r\n" } else { "\n" };
    let payload = input
        .lines
        .iter()
        .take(32)
        .map(FuzzLine::render)
        .collect::<Vec<_>>()
        .join(separator);

    let pipeline = ForwardingPipeline::new(NullSink, 6).unwrap();
    let mut carryover = CarryoverState::new();

    for line in split_lines(&payload) {
        assert_eq!(line, line.trim());
        if is_trivial(line) {
            continue;
        }
        if let Ok((record, _)) = pipeline.render_line(line, "198.51.100.7", &mut carryover) {
            assert_eq!(record.full_message, line);
        }
    }
});
