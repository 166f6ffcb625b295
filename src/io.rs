//! Contracts for the two hardware collaborators the engine drives.
//!
//! The engine never touches registers itself. It emits whole-bank bit
//! operations through [`Gpio`] and delegates the timed output-enable window
//! to an [`OePulser`]. Both are supplied by the platform layer; the crate
//! only defines the seams, so the refresh logic can be exercised against
//! recording fakes on a host machine.

use crate::BIT_PLANES;

/// Bulk access to the memory-mapped output pins, two banks wide.
///
/// Banks are independent 32-bit words. Implementations for hardware with a
/// single bank ignore the `bank1` arguments.
pub trait Gpio {
    /// Declares the masked bank-0 pins as outputs and returns the subset
    /// that was actually accepted.
    fn init_outputs_bank0(&mut self, mask: u32) -> u32;

    /// Declares the masked bank-1 pins as outputs and returns the subset
    /// that was actually accepted.
    fn init_outputs_bank1(&mut self, mask: u32) -> u32;

    /// Drives the listed bits high, atomically per bank.
    fn set_bits(&mut self, bank0: u32, bank1: u32);

    /// Drives the listed bits low, atomically per bank.
    fn clear_bits(&mut self, bank0: u32, bank1: u32);

    /// For each bank: where the mask is set, drive the pin to the matching
    /// bit of `value`; leave every other pin untouched.
    fn write_masked_bits(&mut self, value0: u32, mask0: u32, value1: u32, mask1: u32);
}

/// A calibrated pulse generator for the output-enable line.
///
/// The refresh loop asks for pulse `b` to light bit-plane `b`; the
/// implementation drives the masked pin active for the `b`-th entry of the
/// duration table it was created with, then releases it. `send_pulse`
/// returns immediately so the next plane can be clocked in while the panel
/// is lit; a new pulse must not be sent before [`wait_pulse_finished`]
/// confirms the previous one ended.
///
/// [`wait_pulse_finished`]: OePulser::wait_pulse_finished
pub trait OePulser: Sized {
    /// Why a pulser could not be constructed for the requested timings.
    type Error: core::fmt::Debug;

    /// Builds the pulser for the masked output-enable pin(s) with one
    /// duration per bit-plane, in nanoseconds.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform cannot honor the requested
    /// durations; the engine treats that as fatal.
    fn create<G: Gpio>(
        io: &mut G,
        oe_mask: u32,
        pulse_ns: &[u32; BIT_PLANES],
    ) -> Result<Self, Self::Error>;

    /// Starts the pulse for `plane`; returns without waiting.
    fn send_pulse(&mut self, plane: usize);

    /// Blocks until any in-flight pulse has completed; no-op when idle.
    fn wait_pulse_finished(&mut self);
}
