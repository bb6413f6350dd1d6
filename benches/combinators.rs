//! Combinator throughput benchmarks
//!
//! Measures the hot paths: repetition over character classes, separated
//! lists, and the precedence-climbing loop.
//!
//! Run with: cargo bench --bench combinators

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use combinol::{
    combinator::{between, choice, many1, map, sep1, string_of},
    infix::{infix_left, infix_right, prec},
    parse_str,
    text::{char, one_of},
    Parser,
};

// ============================================================================
// Test Data
// ============================================================================

mod data {
    pub fn digits(n: usize) -> String {
        "1234567890".chars().cycle().take(n).collect()
    }

    pub fn csv_row(fields: usize) -> String {
        (0..fields)
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn expression(terms: usize) -> String {
        let mut out = String::from("1");
        for i in 0..terms {
            out.push(if i % 2 == 0 { '+' } else { '*' });
            out.push_str("23");
        }
        out
    }
}

// ============================================================================
// Parsers
// ============================================================================

fn number() -> Parser<i64> {
    map(many1(one_of("digit"), None), |ds| {
        ds.into_iter()
            .fold(0i64, |acc, d| acc * 10 + i64::from(d as u8 - b'0'))
    })
}

fn expr() -> Parser<i64> {
    let op = choice(vec![
        infix_left(char('+'), 2, |a: i64, b| a.wrapping_add(b)),
        infix_left(char('*'), 3, |a: i64, b| a.wrapping_mul(b)),
        infix_right(char('^'), 4, |a: i64, b| a.wrapping_pow(b as u32)),
    ]);
    prec(number(), op)
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_char_class_runs(c: &mut Criterion) {
    let mut group = c.benchmark_group("char_class_runs");
    let parser = string_of(one_of("digit"), 1..);
    for size in [16usize, 256, 4096] {
        let input = data::digits(size);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| parse_str(black_box(input), &parser).unwrap());
        });
    }
    group.finish();
}

fn bench_separated_lists(c: &mut Criterion) {
    let mut group = c.benchmark_group("separated_lists");
    let parser = sep1(number(), char(','));
    for fields in [8usize, 64, 512] {
        let input = data::csv_row(fields);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fields), &input, |b, input| {
            b.iter(|| parse_str(black_box(input), &parser).unwrap());
        });
    }
    group.finish();
}

fn bench_precedence_climbing(c: &mut Criterion) {
    let mut group = c.benchmark_group("precedence_climbing");
    let parser = expr();
    for terms in [4usize, 32, 256] {
        let input = data::expression(terms);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(terms), &input, |b, input| {
            b.iter(|| parse_str(black_box(input), &parser).unwrap());
        });
    }
    group.finish();
}

fn bench_bracketed(c: &mut Criterion) {
    let parser = between(char('['), char(']'), sep1(number(), char(',')));
    let input = format!("[{}]", data::csv_row(64));
    c.bench_function("bracketed_list", |b| {
        b.iter(|| parse_str(black_box(&input), &parser).unwrap());
    });
}

criterion_group!(
    benches,
    bench_char_class_runs,
    bench_separated_lists,
    bench_precedence_climbing,
    bench_bracketed
);
criterion_main!(benches);
