// Run with:  cargo bench --bench dump
//
// Measures the refresh loop itself against a do-nothing GPIO, so the numbers
// show the engine's own overhead rather than bus timings.

use std::convert::Infallible;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use hub75_bcm::framebuffer::FrameBuffer;
use hub75_bcm::io::{Gpio, OePulser};
use hub75_bcm::{compute_rows, Color, BIT_PLANES};

const ROWS: usize = 32;
const COLS: usize = 64;
const NROWS: usize = compute_rows(ROWS);

struct NullGpio;

impl Gpio for NullGpio {
    fn init_outputs_bank0(&mut self, mask: u32) -> u32 {
        mask
    }

    fn init_outputs_bank1(&mut self, mask: u32) -> u32 {
        mask
    }

    fn set_bits(&mut self, bank0: u32, bank1: u32) {
        black_box((bank0, bank1));
    }

    fn clear_bits(&mut self, bank0: u32, bank1: u32) {
        black_box((bank0, bank1));
    }

    fn write_masked_bits(&mut self, value0: u32, mask0: u32, value1: u32, mask1: u32) {
        black_box((value0, mask0, value1, mask1));
    }
}

struct NullPulser;

impl OePulser for NullPulser {
    type Error = Infallible;

    fn create<G: Gpio>(
        _io: &mut G,
        _oe_mask: u32,
        _pulse_ns: &[u32; BIT_PLANES],
    ) -> Result<Self, Self::Error> {
        Ok(Self)
    }

    fn send_pulse(&mut self, plane: usize) {
        black_box(plane);
    }

    fn wait_pulse_finished(&mut self) {}
}

fn dump(c: &mut Criterion) {
    let mut group = c.benchmark_group("dump_to_matrix");
    group.throughput(Throughput::Elements((NROWS * BIT_PLANES * COLS) as u64));

    group.bench_function("full_frame", |b| {
        let mut fb = FrameBuffer::<ROWS, COLS, NROWS>::new(1);
        fb.fill(Color::new(128, 128, 128));
        let mut io = NullGpio;
        let mut oe = NullPulser;

        b.iter(|| {
            black_box(&fb).dump_to_matrix(&mut io, &mut oe);
        });
    });

    group.finish();
}

criterion_group!(benches, dump);
criterion_main!(benches);
