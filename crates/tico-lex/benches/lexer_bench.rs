//! Lexer benchmarks.
//!
//! Run with: `cargo bench --package tico-lex`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tico_lex::Tokenizer;

fn token_count(src: &[u8]) -> usize {
    Tokenizer::new(src).count()
}

fn bench_lexer_simple(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    let source = b"set a 10; set b 20; set c [expr $a + $b]";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("simple_set", |b| {
        b.iter(|| token_count(black_box(b"set a 10")))
    });

    group.bench_function("command_sequence", |b| {
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_nested");

    let source: &[u8] = br#"
        proc fib {n} {
            if {$n <= 1} { return $n }
            return [expr [fib [expr $n - 1]] + [fib [expr $n - 2]]]
        }
        fib 10
    "#;
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("proc_with_brackets", |b| {
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

criterion_group!(benches, bench_lexer_simple, bench_lexer_nested);
criterion_main!(benches);
