//! Benchmarks for signal dispatch and evented map writes.
//!
//! Run with: `cargo bench --package ndv-reactive --bench signal_bench`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ndv_reactive::{EventedMap, Signal};
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_emit");
    for listeners in [1usize, 8, 64] {
        let signal = Signal::<u64>::new();
        let total = Rc::new(Cell::new(0u64));
        for _ in 0..listeners {
            let total = Rc::clone(&total);
            signal.connect(move |v| total.set(total.get().wrapping_add(*v)));
        }
        group.bench_with_input(BenchmarkId::from_parameter(listeners), &signal, |b, s| {
            b.iter(|| s.emit(black_box(&1)));
        });
    }
    group.finish();
}

fn bench_map_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("evented_map_set");
    group.bench_function("add_then_change_256", |b| {
        b.iter(|| {
            let map: EventedMap<u32, u32> = EventedMap::new();
            map.item_changed().connect(|e| {
                black_box(e.new);
            });
            for k in 0..256u32 {
                map.set(k, k).ok();
            }
            for k in 0..256u32 {
                map.set(k, k + 1).ok();
            }
            black_box(map.len())
        });
    });
    group.bench_function("get_default_hit", |b| {
        let map: EventedMap<u32, u32> = EventedMap::new().with_default(7);
        b.iter(|| black_box(map.get(black_box(&42))));
    });
    group.finish();
}

criterion_group!(benches, bench_emit, bench_map_set);
criterion_main!(benches);
