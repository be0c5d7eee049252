use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use planner_engine::freebusy::{find_free_slot, WorkingWindow};
use planner_engine::interval::Interval;
use std::hint::black_box;

/// 5-minute bookings every 9 minutes from 09:00. With 60 or more bookings no
/// 10-minute gap exists and the sweep walks the whole day.
fn packed_day(bookings: usize) -> Vec<Interval> {
    let mut day: Vec<Interval> = (0..bookings as i64)
        .map(|i| {
            let start = 540 + (i * 9) % 540;
            Interval::new(start, start + 5)
        })
        .collect();
    day.sort_by_key(|i| i.start);
    day
}

fn bench_slot_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_free_slot");
    for bookings in [10usize, 60, 500] {
        let day = packed_day(bookings);
        group.bench_with_input(BenchmarkId::from_parameter(bookings), &day, |b, day| {
            b.iter(|| find_free_slot(black_box(day), black_box(10), WorkingWindow::STANDARD))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_slot_sweep);
criterion_main!(benches);
