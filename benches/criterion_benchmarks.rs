use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::fs;
use std::path::Path;
use vistext::codec::FlagSet;
use vistext::engine;
use vistext::stream::{UnvisOptions, VisOptions};

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

/// Mostly printable ASCII with a control byte every `stride` bytes.
fn gen_text(size: usize, stride: usize) -> Vec<u8> {
    let mut out: Vec<u8> = (0..size).map(|i| b' ' + (i % 95) as u8).collect();
    for i in (0..out.len()).step_by(stride.max(1)) {
        out[i] = (i % 32) as u8;
    }
    out
}

fn encode(input: &[u8], flags: FlagSet, fold_width: Option<usize>) -> Vec<u8> {
    engine::encode_with_options(
        input,
        &VisOptions {
            flags,
            fold_width,
            ..Default::default()
        },
    )
    .unwrap()
}

const STYLES: [(&str, FlagSet); 5] = [
    ("default", FlagSet::empty()),
    ("cstyle", FlagSet::C_STYLE),
    ("octal", FlagSet::OCTAL),
    ("http", FlagSet::HTTP_STYLE),
    ("mime", FlagSet::MIME_STYLE),
];

fn write_expansion_snapshot() {
    let binary = gen_data(1024 * 1024, 7);
    let text = gen_text(1024 * 1024, 64);
    let mut csv = String::from("style,binary_ratio,text_ratio\n");
    for (name, flags) in STYLES {
        let b = encode(&binary, flags, None).len() as f64 / binary.len() as f64;
        let t = encode(&text, flags, None).len() as f64 / text.len() as f64;
        csv.push_str(&format!("{name},{b},{t}\n"));
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("expansion_snapshot.csv"), csv);
}

fn bench_encoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("encoding_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let data = gen_data(size, 1);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let out = encode(black_box(&data), FlagSet::C_STYLE, None);
                black_box(out);
            });
        });
    }
    g.finish();
}

fn bench_decoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("decoding_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let encoded = encode(&gen_data(size, 2), FlagSet::C_STYLE, None);
        g.throughput(Throughput::Bytes(encoded.len() as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let out = engine::decode(black_box(&encoded), FlagSet::empty()).unwrap();
                black_box(out);
            });
        });
    }
    g.finish();
}

fn bench_styles(c: &mut Criterion) {
    write_expansion_snapshot();
    let mut g = c.benchmark_group("encode_by_style");
    let data = gen_text(1024 * 1024, 16);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for (name, flags) in STYLES {
        g.bench_with_input(BenchmarkId::from_parameter(name), &flags, |b, flags| {
            b.iter(|| black_box(encode(black_box(&data), *flags, None)));
        });
    }
    g.finish();
}

fn bench_folding(c: &mut Criterion) {
    let mut g = c.benchmark_group("fold_width");
    let data = gen_data(1024 * 1024, 4);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for width in [None, Some(16usize), Some(76), Some(1024)] {
        let label = width.map_or_else(|| "off".to_string(), |w| w.to_string());
        g.bench_with_input(BenchmarkId::from_parameter(label), &width, |b, width| {
            b.iter(|| black_box(encode(black_box(&data), FlagSet::OCTAL, *width)));
        });
    }
    g.finish();
}

fn bench_html_entities(c: &mut Criterion) {
    let mut g = c.benchmark_group("html_entity_decode");
    let encoded = b"&lt;p&gt;caf&eacute; &amp; cr&egrave;me &#8364;5&lt;/p&gt; ".repeat(16 * 1024);
    g.throughput(Throughput::Bytes(encoded.len() as u64));
    g.bench_function("lenient", |b| {
        b.iter(|| {
            let out = engine::decode_with_options(
                black_box(&encoded),
                UnvisOptions {
                    flags: FlagSet::HTTP_1866,
                    strict: false,
                },
            )
            .unwrap();
            black_box(out);
        });
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_encoding_speed,
    bench_decoding_speed,
    bench_styles,
    bench_folding,
    bench_html_entities
);
criterion_main!(benches);
