//! Build, lookup, and matching throughput benchmarks.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tridex::{encode_str, Symbol, TrieDict};

/// Deterministic word list: base-26 rendering of the index, so the set has
/// heavy prefix sharing like a real vocabulary.
fn word(mut i: usize) -> String {
    let mut out = String::new();
    loop {
        out.push((b'a' + (i % 26) as u8) as char);
        i /= 26;
        if i == 0 {
            break;
        }
    }
    out
}

fn keys(n: usize) -> Vec<Vec<Symbol>> {
    (0..n).map(|i| encode_str(&word(i))).collect()
}

fn build_dict(keys: &[Vec<Symbol>]) -> TrieDict {
    let mut dict = TrieDict::new();
    for (i, key) in keys.iter().enumerate() {
        dict.assign(key, i as u32).unwrap();
    }
    dict.build_suffix_links();
    dict
}

/// Text with a hit roughly every seventh token.
fn sample_text(keys: &[Vec<Symbol>]) -> Vec<Symbol> {
    let mut text = Vec::new();
    for (i, key) in keys.iter().enumerate() {
        if i % 7 == 0 {
            text.extend_from_slice(key);
        } else {
            text.extend(encode_str("filler"));
        }
        text.push(' ' as Symbol);
    }
    text
}

fn bench_build(c: &mut Criterion) {
    let keys = keys(5000);
    c.bench_function("build_5k_keys", |b| {
        b.iter(|| build_dict(black_box(&keys)))
    });
}

fn bench_lookup(c: &mut Criterion) {
    let keys = keys(5000);
    let dict = build_dict(&keys);
    c.bench_function("lookup_5k_keys", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(dict.lookup(key));
            }
        })
    });
}

fn bench_match(c: &mut Criterion) {
    let keys = keys(5000);
    let dict = build_dict(&keys);
    let text = sample_text(&keys);
    let mut group = c.benchmark_group("matching");
    group.throughput(criterion::Throughput::Elements(text.len() as u64));
    group.bench_function("scan_5k_key_automaton", |b| {
        b.iter(|| dict.find_iter(black_box(&text)).unwrap().count())
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_lookup, bench_match);
criterion_main!(benches);
