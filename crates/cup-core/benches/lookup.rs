use criterion::{criterion_group, criterion_main, Criterion};
use cup_core::{load_str, Format};
use serde::Deserialize;
use std::hint::black_box;

fn sample_yaml() -> String {
    let mut yaml = String::from("server:\n  port: 8080\n  ssl:\n    enabled: true\n");
    for i in 0..200 {
        yaml.push_str(&format!("section{}:\n  name: s{}\n  value: {}\n", i, i, i));
    }
    yaml
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Section {
    name: String,
    value: u32,
    missing: bool,
}

fn bench_lookup(c: &mut Criterion) {
    let tree = load_str(&sample_yaml(), Format::Yaml).expect("sample parses");

    c.bench_function("get_shallow", |b| {
        b.iter(|| tree.get(black_box("server.port")).as_i32())
    });
    c.bench_function("get_last_section", |b| {
        b.iter(|| tree.get(black_box("section199.value")).as_i32())
    });
    c.bench_function("get_miss", |b| {
        b.iter(|| tree.get(black_box("server.ssl.enabled.nope")).is_null())
    });
    c.bench_function("convert_section", |b| {
        b.iter(|| tree.convert_at::<Section>(black_box("section100")))
    });
}

fn bench_parse(c: &mut Criterion) {
    let yaml = sample_yaml();
    c.bench_function("parse_yaml", |b| {
        b.iter(|| load_str(black_box(&yaml), Format::Yaml))
    });
}

criterion_group!(benches, bench_lookup, bench_parse);
criterion_main!(benches);
