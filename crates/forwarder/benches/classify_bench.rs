//! 라인 분류/렌더링 벤치마크
//!
//! 패턴별 분류 비용과 라인 하나를 GELF 레코드로 만드는 전체 비용을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tplink_gelf_forwarder::{
    CarryoverState, ForwarderError, ForwardingPipeline, GelfSink, LinePatternMatcher,
};

const FIRST_LINE: &str = "<6>Sep 20 21:42:02 192.168.40.5 [1758400919.541010111] AP MAC=aa:bb:5f:e0:a6:aa MAC SRC=bb:aa:da:c8:1e:54 IP SRC=192.168.50.73 IP DST=52.45.111.111 IP proto=6 SPT=49808 DPT=1883";

const ADDITIONAL_LINE: &str = "[1758400919.891010111] AP MAC=aa:bb:5f:e0:a6:aa MAC SRC=bb:aa:da:c8:1e:54 IP SRC=192.168.50.73 IP DST=52.45.111.111 IP proto=6 SPT=49808 DPT=1883";

const OPERATION: &str = r#"<158>1 2025-07-19 23:00:18 Omada-Controller-XXXX - - - {"details":{"user":"admin","ip":"192.168.40.10"},"operation":"logged in successfully."}"#;

const DHCP: &str = "<134>1 2025-07-19 19:21:46 Omada-Controller-XXXX-YYYYYYYYYY - - - 2.5G WAN1: DHCP client lease expired. Began renewing the lease.";

/// 모든 패턴을 지나쳐 Unparsed로 떨어지는 라인
const UNPARSED: &str = "kernel: eth0 link up 1000Mbps full duplex, flow control rx/tx";

/// 전송하지 않는 싱크
struct NullSink;

impl GelfSink for NullSink {
    async fn deliver(&self, _payload: &[u8]) -> Result<(), ForwarderError> {
        Ok(())
    }
}

fn bench_classify(c: &mut Criterion) {
    let matcher = LinePatternMatcher::new().unwrap();

    let mut group = c.benchmark_group("classify");
    group.throughput(Throughput::Elements(1));

    for (name, line) in [
        ("first_line", FIRST_LINE),
        ("additional_line", ADDITIONAL_LINE),
        ("controller_operation", OPERATION),
        ("dhcp_info", DHCP),
        ("unparsed", UNPARSED),
    ] {
        group.bench_with_input(BenchmarkId::new("kind", name), &line, |b, &line| {
            b.iter(|| matcher.classify(black_box(line)))
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let pipeline = ForwardingPipeline::new(NullSink, 6).unwrap();

    let mut group = c.benchmark_group("render");

    group.throughput(Throughput::Elements(1));
    group.bench_function("operation_to_json", |b| {
        b.iter(|| {
            let mut carryover = CarryoverState::new();
            let (record, _) = pipeline
                .render_line(black_box(OPERATION), "192.168.40.5", &mut carryover)
                .unwrap();
            record.to_json_bytes().unwrap()
        })
    });

    // 다중 라인 AP 메시지 (첫 라인 1 + 연속 라인 9)
    group.throughput(Throughput::Elements(10));
    group.bench_function("multiline_ap_10", |b| {
        b.iter(|| {
            let mut carryover = CarryoverState::new();
            pipeline
                .render_line(black_box(FIRST_LINE), "192.168.40.5", &mut carryover)
                .unwrap();
            for _ in 0..9 {
                pipeline
                    .render_line(black_box(ADDITIONAL_LINE), "192.168.40.5", &mut carryover)
                    .unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_classify, bench_render);
criterion_main!(benches);
