//! Software Binary Code Modulation engine for HUB75 RGB LED matrix panels.
//!
//! ## What this crate does
//!
//! HUB75 panels have no frame memory of their own: a controller must
//! continuously shift serial color data into the panel, latch it row pair by
//! row pair, and light each row for a carefully timed window. This crate is
//! the core of such a controller for machines whose GPIO block is
//! memory-mapped and can be driven with bulk set/clear/masked writes (the
//! classic example being a Raspberry Pi with one or more chains of panels on
//! its header).
//!
//! It owns three things:
//!
//! 1. **The frame representation.** Pixels are stored pre-packed as GPIO
//!    words, laid out bit-plane-major per address row, so that emitting one
//!    bit-plane of one row pair is a single contiguous sweep over `COLS`
//!    words with no per-pixel packing work in the hot loop. See
//!    [`framebuffer::FrameBuffer`].
//! 2. **The color pipeline.** 8-bit sRGB components are mapped to
//!    [`BIT_PLANES`]-bit PWM values, either through the CIE-1931 lightness
//!    curve (perceptually linear brightness) or by plain scaling. See
//!    [`color::ColorMap`].
//! 3. **The refresh loop.** [`framebuffer::FrameBuffer::dump_to_matrix`]
//!    walks address rows and bit-planes, clocks pixel data out through a
//!    [`io::Gpio`], and triggers an output-enable pulse whose width doubles
//!    with each bit-plane: Binary Code Modulation, `2^N` gray levels from
//!    `N` passes.
//!
//! ## Binary Code Modulation
//!
//! A bit-plane holds one binary digit of every pixel's PWM value. Displaying
//! plane `b` for a duration proportional to `2^b` makes each plane contribute
//! its binary weight to the perceived intensity. The engine shows all planes
//! of one row pair before moving to the next row, because row switches are
//! the expensive, ghosting-prone operation. While a plane is lit, the next
//! plane's data is already being clocked into the shift registers, so the
//! serial transfer hides almost entirely inside the output-enable window.
//!
//! ## What this crate does not do
//!
//! The GPIO itself and the calibrated output-enable pulser are collaborators
//! supplied by the caller through the [`io::Gpio`] and [`io::OePulser`]
//! traits. Image decoding, drawing helpers beyond the `embedded-graphics`
//! [`DrawTarget`](embedded_graphics::draw_target::DrawTarget) integration,
//! double buffering and thread plumbing all live above this crate.
//!
//! ## Wiring variants
//!
//! Board differences are cargo features, fixed for the life of the engine:
//!
//! - `adafruit-hat` – the HAT/Bonnet wires a single chain; `parallel > 1` is
//!   rejected.
//! - `pi-rev1-pinout` – revision-1 boards get clock and output-enable
//!   duplicated on their old header positions in every write that touches
//!   them.
//! - `cm5-chains` – enables GPIO bank 1 and parallel chains 4 and 5.
//! - `swap-green-blue` – for panels with G and B swapped on the connector.
//! - `inverse-colors` – active-low color inputs; all color bits and the dark
//!   encoding are inverted.
//! - `single-sub-panel` – 1:N panels that scan one row instead of a pair.
//! - `defmt` – `defmt::Format` impls for the framebuffer types.

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use embedded_graphics::pixelcolor::Rgb888;

pub mod color;
pub mod framebuffer;
pub mod init;
pub mod io;
mod pins;

/// Color type accepted by the framebuffer.
pub type Color = Rgb888;

/// Number of PWM bit-planes kept per pixel, and the output precision of the
/// color mapper. More planes would double refresh time per plane without a
/// visible payoff on these panels.
pub const BIT_PLANES: usize = 11;

/// Output-enable duration of the least significant bit-plane, in nanoseconds.
///
/// Lower values raise the refresh rate but dim the display. Plane `b` is lit
/// for `BASE_TIME_NANOS << b`.
pub const BASE_TIME_NANOS: u32 = 130;

/// Highest number of parallel chains the active wiring can drive.
pub const MAX_PARALLEL: usize = if cfg!(feature = "cm5-chains") {
    5
} else if cfg!(feature = "adafruit-hat") {
    1
} else {
    3
};

/// Computes the number of address rows for a panel height.
///
/// HUB75 panels scan two sub-panels at once, so one address row covers two
/// visible rows; `single-sub-panel` builds scan one.
///
/// # Arguments
///
/// * `rows` - Panel height in pixels
#[must_use]
pub const fn compute_rows(rows: usize) -> usize {
    if cfg!(feature = "single-sub-panel") {
        rows
    } else {
        rows / 2
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    #[cfg(not(feature = "single-sub-panel"))]
    fn test_compute_rows() {
        assert_eq!(compute_rows(8), 4);
        assert_eq!(compute_rows(16), 8);
        assert_eq!(compute_rows(32), 16);
        assert_eq!(compute_rows(64), 32);
    }

    #[test]
    #[cfg(feature = "single-sub-panel")]
    fn test_compute_rows_single_sub_panel() {
        assert_eq!(compute_rows(8), 8);
        assert_eq!(compute_rows(32), 32);
    }

    #[test]
    fn test_constants() {
        assert_eq!(BIT_PLANES, 11);
        assert_eq!(BASE_TIME_NANOS, 130);

        // Address rows must come out a power of two; the framebuffer's row
        // mask depends on it.
        for rows in [8usize, 16, 32, 64] {
            assert!(compute_rows(rows).is_power_of_two());
        }
    }

    #[test]
    fn test_max_parallel_matches_features() {
        if cfg!(feature = "cm5-chains") {
            assert_eq!(MAX_PARALLEL, 5);
        } else if cfg!(feature = "adafruit-hat") {
            assert_eq!(MAX_PARALLEL, 1);
        } else {
            assert_eq!(MAX_PARALLEL, 3);
        }
    }
}
