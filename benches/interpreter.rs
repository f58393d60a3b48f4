//! Benchmarks for the tokenize → parse → evaluate pipeline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use logos_kappa::axioms::Axioms;
use logos_kappa::context::Context;
use logos_kappa::eval::{CycleOptions, Interpreter};
use logos_kappa::lexer::Lexer;
use logos_kappa::parser::Parser;

fn program(n: usize) -> String {
    (0..n)
        .map(|i| format!("(Λ \"n{i}\" (Α \"m{i}\") :weight {i}) ;; link {i}\n"))
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let axioms = Axioms::default();
    let source = program(100);

    c.bench_function("tokenize_100", |bench| {
        bench.iter(|| {
            let lexer = Lexer::new(black_box(&source), &axioms).unwrap();
            black_box(lexer.tokenize().unwrap())
        })
    });
}

fn bench_parse(c: &mut Criterion) {
    let axioms = Axioms::default();
    let source = program(100);
    let tokens = Lexer::new(&source, &axioms).unwrap().tokenize().unwrap();

    c.bench_function("parse_100", |bench| {
        bench.iter(|| black_box(Parser::new(black_box(&tokens)).parse().unwrap()))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let source = program(100);

    c.bench_function("run_source_100", |bench| {
        bench.iter(|| {
            let ctx = Context::new("bench", Axioms::default()).unwrap();
            let mut interp = Interpreter::new(ctx);
            black_box(
                interp
                    .run_source(black_box(&source), &CycleOptions::default())
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_tokenize, bench_parse, bench_evaluate);
criterion_main!(benches);
