//! Microbenchmarks for the hot paths: tracked writes and cached reads.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;
use weft_core::Runtime;

fn tracked_write(c: &mut Criterion) {
    c.bench_function("write_with_one_subscriber", |b| {
        let rt = Runtime::new();
        let state = rt.reactive(json!({ "count": 0 })).unwrap();
        let _fx = rt.effect({
            let state = state.clone();
            move || {
                let _ = state.get("count");
            }
        });

        let mut i = 0i64;
        b.iter(|| {
            i += 1;
            state.set("count", black_box(i));
        });
    });

    c.bench_function("write_with_no_subscribers", |b| {
        let rt = Runtime::new();
        let state = rt.reactive(json!({ "count": 0 })).unwrap();

        let mut i = 0i64;
        b.iter(|| {
            i += 1;
            state.set("count", black_box(i));
        });
    });
}

fn computed_read(c: &mut Criterion) {
    c.bench_function("computed_cached_read", |b| {
        let rt = Runtime::new();
        let state = rt.reactive(json!({ "foo": 1 })).unwrap();
        let doubled = rt.computed({
            let state = state.clone();
            move || state.get("foo").unwrap().as_i64().unwrap() * 2
        });
        let _ = doubled.get();

        b.iter(|| black_box(doubled.get()));
    });
}

criterion_group!(benches, tracked_write, computed_read);
criterion_main!(benches);
