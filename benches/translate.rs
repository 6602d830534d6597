//! Benchmarks for method translation.
//!
//! - Straight-line bodies of growing length
//! - A chain of loops, exercising join detection and guarded edges
//! - Batch translation of many independent bodies

extern crate cfglift;

use cfglift::prelude::*;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

/// `x = x + i` repeated `len` times, then return.
fn straight(len: usize) -> Body {
    let mut b = BodyBuilder::new(MethodRef::new("Bench", "straight", vec![], Type::Void));
    let x = b.local("x", Type::Int);
    for i in 0..len {
        b.assign(
            x,
            Value::binary(BinaryOp::Add, x.into(), Value::int(i as i32)),
        );
    }
    b.ret_void();
    b.finish().unwrap()
}

/// `loops` counting loops in sequence, each with a field write in its body.
fn loops(name: &str, loops: usize) -> Body {
    let demo = Type::class("Bench");
    let mut b = BodyBuilder::new(MethodRef::new("Bench", name, vec![demo.clone()], Type::Void));
    let o = b.param("o", 0, demo);
    let i = b.local("i", Type::Int);
    let f = FieldRef::new("Bench", "f", Type::Int);
    for n in 0..loops {
        let (head, exit) = (format!("head{n}"), format!("exit{n}"));
        b.assign(i, Value::int(0));
        b.label(&head).unwrap();
        b.if_goto(Value::binary(BinaryOp::Ge, i.into(), Value::int(100)), &exit);
        b.assign(Value::field(o.into(), f.clone()), i);
        b.assign(i, Value::binary(BinaryOp::Add, i.into(), Value::int(1)));
        b.goto(&head);
        b.label(&exit).unwrap();
    }
    b.ret_void();
    b.finish().unwrap()
}

/// Benchmark straight-line translation at several body sizes.
fn bench_straight(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate_straight");
    for len in [16, 256, 4096] {
        let body = straight(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &body, |b, body| {
            b.iter(|| {
                let program = Program::new();
                let graph = UnitGraph::new(body).unwrap();
                black_box(translate_body(&program, black_box(body), &graph).unwrap())
            });
        });
    }
    group.finish();
}

/// Benchmark a body with many loops.
fn bench_loops(c: &mut Criterion) {
    let body = loops("loops", 64);

    c.bench_function("translate_loops_64", |b| {
        b.iter(|| {
            let program = Program::new();
            let graph = UnitGraph::new(&body).unwrap();
            black_box(translate_body(&program, black_box(&body), &graph).unwrap())
        });
    });
}

/// Benchmark parallel translation of independent bodies.
fn bench_translate_all(c: &mut Criterion) {
    let bodies: Vec<Body> = (0..256).map(|n| loops(&format!("m{n}"), 8)).collect();

    c.bench_function("translate_all_256", |b| {
        b.iter(|| {
            let program = Program::new();
            let results = program.translate_all(black_box(&bodies));
            black_box(results.len())
        });
    });
}

criterion_group!(benches, bench_straight, bench_loops, bench_translate_all);
criterion_main!(benches);
