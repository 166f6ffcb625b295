// Run with:  cargo bench --bench fill

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use hub75_bcm::framebuffer::FrameBuffer;
use hub75_bcm::{compute_rows, Color};

const ROWS: usize = 32;
const COLS: usize = 64;
const NROWS: usize = compute_rows(ROWS);

fn fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");
    group.throughput(Throughput::Elements((ROWS * COLS) as u64));

    group.bench_function("framebuffer_fill", |b| {
        let mut fb = FrameBuffer::<ROWS, COLS, NROWS>::new(1);

        b.iter(|| {
            black_box(&mut fb).fill(black_box(Color::new(200, 100, 50)));
        });
    });

    group.bench_function("framebuffer_clear", |b| {
        let mut fb = FrameBuffer::<ROWS, COLS, NROWS>::new(1);
        fb.fill(Color::WHITE);

        b.iter(|| {
            black_box(&mut fb).clear();
        });
    });

    group.finish();
}

criterion_group!(benches, fill);
criterion_main!(benches);
