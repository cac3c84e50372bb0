/// Correlation Throughput Benchmarks
///
/// Measures lines per second through the classifier, pending table and
/// histogram for synthetic audit logs with varying record density.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nfdelay::config::DelayConfig;
use nfdelay::LogCorrelator;

const FILLER: &str =
    "type=SYSCALL msg=audit(1494523111.293:1661796): arch=c000003e syscall=42 success=yes exit=0";

/// Build a log where every `stride`-th line is a SOCKADDR/NETFILTER_PKT pair
fn synthetic_log(lines: usize, stride: usize) -> String {
    let mut out = String::with_capacity(lines * 128);
    for i in 0..lines {
        let host = (i / stride) % 250;
        match i % stride {
            0 => out.push_str(&format!(
                "type=SOCKADDR msg=audit(1494523111.293:{i}): saddr=02000050{}0A0000{:02X}",
                "0".repeat(32),
                host
            )),
            3 => out.push_str(&format!(
                "type=NETFILTER_PKT msg=audit(1494469680.359:{i}): action=0 hook=1 len=76 saddr=10.0.2.15 daddr=10.0.0.{host} proto=6 sport=40000 dport=80"
            )),
            _ => out.push_str(FILLER),
        }
        out.push('\n');
    }
    out
}

fn bench_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation");
    let lines = 50_000;

    for stride in [8usize, 64, 512] {
        let log = synthetic_log(lines, stride);
        group.throughput(Throughput::Elements(lines as u64));
        group.bench_with_input(BenchmarkId::new("stride", stride), &log, |b, log| {
            b.iter(|| {
                let report = LogCorrelator::new(&DelayConfig::default()).run(log.as_bytes());
                black_box(report.histogram.total_occurrences())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_correlation);
criterion_main!(benches);
