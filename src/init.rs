//! One-time GPIO and pulser bring-up.
//!
//! Before the first refresh, every pin the engine will ever touch must be
//! declared an output and the output-enable pulser must exist with its
//! per-plane duration table. Both happen exactly once per process; the
//! refresh loop assumes the pins stay claimed for the life of the program.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::io::{Gpio, OePulser};
use crate::{compute_rows, pins, BASE_TIME_NANOS, BIT_PLANES};

static OUTPUTS_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Output-enable durations per bit-plane, in nanoseconds.
///
/// Plane `b` is lit for `BASE_TIME_NANOS << b`; the exponential ladder is
/// what turns [`BIT_PLANES`] passes into `2^BIT_PLANES` gray levels.
#[must_use]
pub fn bitplane_timings() -> [u32; BIT_PLANES] {
    let mut timings = [0u32; BIT_PLANES];
    for (plane, slot) in timings.iter_mut().enumerate() {
        *slot = BASE_TIME_NANOS << plane;
    }
    timings
}

/// Claims every output pin the engine uses and builds the pulser.
///
/// Computes the union of control lines, the row address lines for the given
/// panel height, and the color bits of the first `parallel` chains, declares
/// them through [`Gpio::init_outputs_bank0`] (and bank 1 on `cm5-chains`
/// builds), then constructs `P` for the output-enable pin with the
/// [`bitplane_timings`] table.
///
/// Returns the pulser on the first call. Later calls are no-ops and return
/// `None`: the pins are already claimed and the first pulser remains the
/// only one allowed to drive output-enable.
///
/// # Panics
///
/// Panics when the GPIO accepts only a subset of the requested pins or the
/// pulser cannot be built. The engine cannot run degraded, so both faults
/// are fatal.
pub fn init_outputs<G: Gpio, P: OePulser>(io: &mut G, rows: usize, parallel: usize) -> Option<P> {
    if OUTPUTS_CLAIMED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return None;
    }

    let mut bank0 = pins::color_mask0(parallel);
    bank0.set_clock(true);
    bank0.set_strobe(true);
    bank0.set_output_enable(true);
    if cfg!(feature = "pi-rev1-pinout") {
        bank0.set_clock_rev1(true);
        bank0.set_output_enable_rev1(true);
    }
    bank0.set_masked(pins::address_mask(compute_rows(rows)).raw(), true);

    let accepted = io.init_outputs_bank0(bank0.raw());
    assert!(
        accepted == bank0.raw(),
        "GPIO bank 0 rejected pins: requested {:#010x}, accepted {:#010x}",
        bank0.raw(),
        accepted
    );

    #[cfg(feature = "cm5-chains")]
    {
        let bank1 = pins::color_mask1(parallel);
        let accepted = io.init_outputs_bank1(bank1.raw());
        assert!(
            accepted == bank1.raw(),
            "GPIO bank 1 rejected pins: requested {:#010x}, accepted {:#010x}",
            bank1.raw(),
            accepted
        );
    }

    let timings = bitplane_timings();
    match P::create(io, pins::output_enable_mask().raw(), &timings) {
        Ok(pulser) => Some(pulser),
        Err(err) => panic!("output-enable pulser unavailable: {err:?}"),
    }
}
