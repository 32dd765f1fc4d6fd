//! 접근 로그 파서와 집계 벤치마크
//!
//! Common Log Format 파싱과 섹션 카운터 기록의 처리량을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use httplog_monitor::TrafficStats;
use httplog_monitor::parser::{AccessLogParser, section_of};

/// 짧은 경로
const CLF_SHORT: &str =
    r#"127.0.0.1 - james [09/May/2018:16:00:39 +0000] "GET /report HTTP/1.0" 200 123"#;

/// 긴 경로 + Combined Log Format 꼬리 필드
const CLF_LONG: &str = r#"203.0.113.45 - admin@example.com [31/Dec/2023:23:59:59 -0700] "POST /api/v1/users/create/with/a/rather/long/path?query=string&other=value HTTP/1.1" 201 48213 "https://example.com/dashboard" "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36""#;

/// 패턴 불일치
const CLF_MALFORMED: &str = "this line is not in common log format at all";

fn bench_parse(c: &mut Criterion) {
    let parser = AccessLogParser::new().unwrap();

    let mut group = c.benchmark_group("clf_parse");
    group.throughput(Throughput::Elements(1));

    group.bench_function("short", |b| {
        b.iter(|| parser.parse(black_box(CLF_SHORT)).unwrap())
    });

    group.bench_function("long_combined", |b| {
        b.iter(|| parser.parse(black_box(CLF_LONG)).unwrap())
    });

    group.bench_function("malformed", |b| {
        b.iter(|| parser.parse(black_box(CLF_MALFORMED)).unwrap_err())
    });

    // 1000건 반복 처리량
    group.throughput(Throughput::Elements(1000));
    group.bench_function("throughput_1000", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                parser.parse(black_box(CLF_SHORT)).unwrap();
            }
        })
    });

    group.finish();
}

fn bench_section_of(c: &mut Criterion) {
    let mut group = c.benchmark_group("section_of");

    for path in ["/", "/report", "/api/v1/users/create"] {
        group.bench_with_input(BenchmarkId::from_parameter(path), path, |b, path| {
            b.iter(|| section_of(black_box(path)))
        });
    }

    group.finish();
}

fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("traffic_stats_record");

    for sections in [1usize, 16, 256] {
        let names: Vec<String> = (0..sections).map(|i| format!("section-{i}")).collect();
        group.throughput(Throughput::Elements(names.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &names, |b, names| {
            let stats = TrafficStats::new();
            b.iter(|| {
                for name in names {
                    stats.record(black_box(name));
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_section_of, bench_record);
criterion_main!(benches);
