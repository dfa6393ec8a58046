#![no_main]

use libfuzzer_sys::fuzz_target;
use tplink_gelf_forwarder::{CarryoverState, ForwarderError, ForwardingPipeline, GelfSink};

struct NullSink;

impl GelfSink for NullSink {
    async fn deliver(&self, _payload: &[u8]) -> Result<(), ForwarderError> {
        Ok(())
    }
}

fuzz_target!(|data: &str| {
    let line = data.trim();
    if line.is_empty() {
        return;
    }
    let pipeline = ForwardingPipeline::new(NullSink, 6).unwrap();
    let mut carryover = CarryoverState::new();

    // JSON 본문이 잘못된 operation 라인만 실패할 수 있음
    let Ok((record, _)) = pipeline.render_line(line, "198.51.100.7", &mut carryover) else {
        return;
    };
    assert_eq!(record.full_message, line);
    assert!(record.level <= 7);
    assert!(record.timestamp.is_finite());

    let bytes = record.to_json_bytes().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["version"], "1.1");
});
