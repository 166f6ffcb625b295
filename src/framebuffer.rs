//! Bit-plane framebuffer and the refresh loop that streams it to the panels.
//!
//! # Memory layout
//!
//! The store is not a pixel grid. It is organized the way the refresh loop
//! consumes it: per address row, per bit-plane, one packed GPIO word per
//! column. Writing a pixel is therefore the expensive direction. The color
//! mapper produces an 11-bit PWM value per channel and `set_pixel` scatters
//! its bits over the pixel's channel positions in up to eleven plane words,
//! while reading a plane out to the panel is a straight sweep over `COLS`
//! consecutive words.
//!
//! A pixel at `(x, y)` lives on chain `y / ROWS`; within its chain it falls
//! in the upper or lower sub-panel, which selects the `*1` or `*2` color
//! bits, and its address row is `y` masked by the address-row count. Chains
//! 1-3 pack into the bank-0 word; on `cm5-chains` builds chains 4-5 pack
//! into a second, bank-1 word per position.
//!
//! # Refresh
//!
//! [`FrameBuffer::dump_to_matrix`] presents one frame. For every address row
//! it emits the active bit-planes back to back: clock one plane's words out
//! (color bits plus a clock edge per column), wait for the previous plane's
//! output-enable pulse to end, strobe the freshly shifted data into the
//! drivers, and start this plane's pulse of `BASE_TIME_NANOS << plane`
//! nanoseconds of lit panel, during which the next plane is already being
//! clocked in.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::RgbColor;
use embedded_graphics::prelude::Point;
use embedded_graphics::Pixel;

use crate::color::ColorMap;
use crate::io::{Gpio, OePulser};
#[cfg(feature = "cm5-chains")]
use crate::pins::IoBits1;
use crate::pins::{self, IoBits0, BANK0_CHAINS};
use crate::{compute_rows, Color, BIT_PLANES, MAX_PARALLEL};

/// All bit-planes of one address row: `planes[plane][column]`.
#[derive(Clone, Copy)]
#[repr(C)]
struct AddressRow0<const COLS: usize> {
    planes: [[IoBits0; COLS]; BIT_PLANES],
}

impl<const COLS: usize> AddressRow0<COLS> {
    const fn new() -> Self {
        Self {
            planes: [[IoBits0::new(); COLS]; BIT_PLANES],
        }
    }
}

impl<const COLS: usize> Default for AddressRow0<COLS> {
    fn default() -> Self {
        Self::new()
    }
}

/// Bank-1 twin of [`AddressRow0`] for chains 4 and 5.
#[cfg(feature = "cm5-chains")]
#[derive(Clone, Copy)]
#[repr(C)]
struct AddressRow1<const COLS: usize> {
    planes: [[IoBits1; COLS]; BIT_PLANES],
}

#[cfg(feature = "cm5-chains")]
impl<const COLS: usize> AddressRow1<COLS> {
    const fn new() -> Self {
        Self {
            planes: [[IoBits1::new(); COLS]; BIT_PLANES],
        }
    }
}

/// Bit-plane framebuffer for one or more parallel chains of HUB75 panels.
///
/// # Type Parameters
///
/// - `ROWS`: height of one panel (8, 16, 32 or 64)
/// - `COLS`: chain-extended width in pixels
/// - `NROWS`: address rows, always [`compute_rows(ROWS)`](crate::compute_rows)
///
/// The number of parallel chains is a construction argument; the full
/// display is `COLS` wide and `ROWS * parallel` high.
///
/// # Example
///
/// ```rust
/// use embedded_graphics::prelude::Point;
/// use hub75_bcm::framebuffer::FrameBuffer;
/// use hub75_bcm::{compute_rows, Color};
///
/// const ROWS: usize = 32;
/// const COLS: usize = 64;
/// const NROWS: usize = compute_rows(ROWS);
///
/// let mut fb = FrameBuffer::<ROWS, COLS, NROWS>::new(1);
/// fb.set_pixel(Point::new(10, 10), Color::new(255, 64, 0));
/// ```
pub struct FrameBuffer<const ROWS: usize, const COLS: usize, const NROWS: usize> {
    rows0: [AddressRow0<COLS>; NROWS],
    #[cfg(feature = "cm5-chains")]
    rows1: [AddressRow1<COLS>; NROWS],
    parallel: usize,
    height: usize,
    pwm_bits: u8,
    color: ColorMap,
}

impl<const ROWS: usize, const COLS: usize, const NROWS: usize> FrameBuffer<ROWS, COLS, NROWS> {
    /// Creates a dark framebuffer for `parallel` chains.
    ///
    /// # Panics
    ///
    /// Panics when `ROWS` is not one of 8, 16, 32, 64, when `NROWS` does not
    /// match [`compute_rows(ROWS)`](crate::compute_rows), or when `parallel`
    /// is outside what the wiring supports. All of these are wiring
    /// mismatches the engine cannot run with.
    #[must_use]
    pub fn new(parallel: usize) -> Self {
        assert!(
            ROWS == 8 || ROWS == 16 || ROWS == 32 || ROWS == 64,
            "unsupported panel height {ROWS}"
        );
        assert!(
            NROWS == compute_rows(ROWS),
            "NROWS must be compute_rows(ROWS)"
        );
        assert!(
            parallel >= 1 && parallel <= MAX_PARALLEL,
            "parallel must be in 1..={MAX_PARALLEL}, got {parallel}"
        );
        #[cfg(feature = "adafruit-hat")]
        assert!(parallel == 1, "the Adafruit HAT wires a single chain");

        let mut fb = Self {
            rows0: [AddressRow0::new(); NROWS],
            #[cfg(feature = "cm5-chains")]
            rows1: [AddressRow1::new(); NROWS],
            parallel,
            height: ROWS * parallel,
            pwm_bits: BIT_PLANES as u8,
            color: ColorMap::new(),
        };
        fb.clear();
        fb
    }

    /// Width of the display in pixels.
    #[must_use]
    pub const fn width(&self) -> usize {
        COLS
    }

    /// Height of the display in pixels, across all chains.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Restricts refresh to the `bits` most significant bit-planes.
    ///
    /// Fewer planes refresh faster at the cost of color depth. Returns
    /// `false` (and changes nothing) for values outside `1..=BIT_PLANES`.
    pub fn set_pwm_bits(&mut self, bits: u8) -> bool {
        if bits < 1 || bits > BIT_PLANES as u8 {
            return false;
        }
        self.pwm_bits = bits;
        true
    }

    /// Number of bit-planes currently refreshed.
    #[must_use]
    pub const fn pwm_bits(&self) -> u8 {
        self.pwm_bits
    }

    /// Sets the brightness percentage; values outside `1..=100` are clamped.
    pub fn set_brightness(&mut self, percent: u8) {
        self.color.set_brightness(percent);
    }

    /// Current brightness percentage.
    #[must_use]
    pub fn brightness(&self) -> u8 {
        self.color.brightness()
    }

    /// Switches CIE-1931 luminance correction on or off.
    pub fn set_luminance_correct(&mut self, on: bool) {
        self.color.set_luminance_correct(on);
    }

    /// Whether luminance correction is active.
    #[must_use]
    pub fn luminance_correct(&self) -> bool {
        self.color.luminance_correct()
    }

    /// Resets every pixel to the dark encoding.
    ///
    /// Plain panels go dark with all-zero words; `inverse-colors` panels are
    /// active-low, so dark means every color bit set, which is exactly what
    /// filling with black writes.
    pub fn clear(&mut self) {
        #[cfg(feature = "inverse-colors")]
        self.fill(Color::BLACK);
        #[cfg(not(feature = "inverse-colors"))]
        {
            for row in &mut self.rows0 {
                *row = AddressRow0::new();
            }
            #[cfg(feature = "cm5-chains")]
            for row in &mut self.rows1 {
                *row = AddressRow1::new();
            }
        }
    }

    /// Sets every pixel of every chain to `color`.
    ///
    /// Each active plane gets one prototype word replicated across all
    /// columns; chains beyond `parallel` are colored too, which is harmless
    /// because the refresh masks clip them.
    pub fn fill(&mut self, color: Color) {
        let (red, green, blue) = self.map_rgb(color);
        let min_plane = BIT_PLANES - usize::from(self.pwm_bits);
        for plane in min_plane..BIT_PLANES {
            let mask = 1u16 << plane;
            let mut word0 = IoBits0::new();
            word0.set_masked(IoBits0::RED_ALL, red & mask == mask);
            word0.set_masked(IoBits0::GREEN_ALL, green & mask == mask);
            word0.set_masked(IoBits0::BLUE_ALL, blue & mask == mask);
            for row in &mut self.rows0 {
                for slot in &mut row.planes[plane] {
                    *slot = word0;
                }
            }
            #[cfg(feature = "cm5-chains")]
            {
                let mut word1 = IoBits1::new();
                word1.set_masked(IoBits1::RED_ALL, red & mask == mask);
                word1.set_masked(IoBits1::GREEN_ALL, green & mask == mask);
                word1.set_masked(IoBits1::BLUE_ALL, blue & mask == mask);
                for row in &mut self.rows1 {
                    for slot in &mut row.planes[plane] {
                        *slot = word1;
                    }
                }
            }
        }
    }

    /// Sets one pixel; coordinates outside the display are silently dropped.
    pub fn set_pixel(&mut self, p: Point, color: Color) {
        if p.x < 0 || p.y < 0 {
            return;
        }
        self.set_pixel_internal(p.x as usize, p.y as usize, color);
    }

    fn set_pixel_internal(&mut self, x: usize, y: usize, color: Color) {
        if x >= COLS || y >= self.height {
            return;
        }
        let (red, green, blue) = self.map_rgb(color);
        let min_plane = BIT_PLANES - usize::from(self.pwm_bits);
        let d_row = y & (NROWS - 1);
        let chain = y / ROWS;
        let upper = y % ROWS < NROWS;

        if chain < BANK0_CHAINS {
            let (r_mask, g_mask, b_mask) = pins::channel_masks0(chain, upper);
            for plane in min_plane..BIT_PLANES {
                let mask = 1u16 << plane;
                let word = &mut self.rows0[d_row].planes[plane][x];
                word.set_masked(r_mask, red & mask == mask);
                word.set_masked(g_mask, green & mask == mask);
                word.set_masked(b_mask, blue & mask == mask);
            }
            return;
        }
        #[cfg(feature = "cm5-chains")]
        {
            let (r_mask, g_mask, b_mask) = pins::channel_masks1(chain, upper);
            for plane in min_plane..BIT_PLANES {
                let mask = 1u16 << plane;
                let word = &mut self.rows1[d_row].planes[plane][x];
                word.set_masked(r_mask, red & mask == mask);
                word.set_masked(g_mask, green & mask == mask);
                word.set_masked(b_mask, blue & mask == mask);
            }
        }
    }

    fn map_rgb(&self, color: Color) -> (u16, u16, u16) {
        let (green, blue) = if cfg!(feature = "swap-green-blue") {
            (color.b(), color.g())
        } else {
            (color.g(), color.b())
        };
        (
            self.color.map(color.r()),
            self.color.map(green),
            self.color.map(blue),
        )
    }

    /// Streams one complete frame to the panels.
    ///
    /// Walks the address rows; within a row, emits every active bit-plane:
    /// column sweep (masked color write with the clock low, then a clock
    /// rising edge), wait for the previous plane's output-enable pulse,
    /// strobe, and start this plane's pulse. The previous plane stays lit
    /// through the sweep, so clocking costs almost no dark time.
    ///
    /// The caller must have claimed the pins through
    /// [`init::init_outputs`](crate::init::init_outputs) and must be the
    /// only user of `io` and `oe` for the duration of the call. Output
    /// enable itself is never driven here; only the pulser touches it.
    pub fn dump_to_matrix<G: Gpio, P: OePulser>(&self, io: &mut G, oe: &mut P) {
        let mut color_clk_mask0 = pins::color_mask0(self.parallel);
        color_clk_mask0.set_masked(pins::clock_mask().raw(), true);
        #[cfg(feature = "cm5-chains")]
        let color_clk_mask1 = pins::color_mask1(self.parallel);

        let clock = pins::clock_mask();
        let strobe = IoBits0::from_raw(IoBits0::STROBE);
        let address_mask = pins::address_mask(NROWS);

        // Snapshot: the owner may lower pwm_bits while we are refreshing.
        let min_plane = BIT_PLANES - usize::from(self.pwm_bits);

        for (d_row, row0) in self.rows0.iter().enumerate() {
            io.write_masked_bits(pins::address_bits(d_row).raw(), address_mask.raw(), 0, 0);
            #[cfg(feature = "cm5-chains")]
            let row1 = &self.rows1[d_row];

            // Full PWM of one row before switching rows; fast row switches
            // ghost into neighboring rows.
            for plane in min_plane..BIT_PLANES {
                // The previous plane is still lit while this one clocks in.
                #[cfg(not(feature = "cm5-chains"))]
                for word in &row0.planes[plane] {
                    io.write_masked_bits(word.raw(), color_clk_mask0.raw(), 0, 0);
                    io.set_bits(clock.raw(), 0);
                }
                #[cfg(feature = "cm5-chains")]
                for (word0, word1) in row0.planes[plane].iter().zip(&row1.planes[plane]) {
                    io.write_masked_bits(
                        word0.raw(),
                        color_clk_mask0.raw(),
                        word1.raw(),
                        color_clk_mask1.raw(),
                    );
                    io.set_bits(clock.raw(), 0);
                }

                #[cfg(not(feature = "cm5-chains"))]
                io.clear_bits(color_clk_mask0.raw(), 0);
                #[cfg(feature = "cm5-chains")]
                io.clear_bits(color_clk_mask0.raw(), color_clk_mask1.raw());

                // The previous plane's lit window must end before the new
                // data is strobed into the drivers.
                oe.wait_pulse_finished();

                io.set_bits(strobe.raw(), 0);
                io.clear_bits(strobe.raw(), 0);

                oe.send_pulse(plane);
            }
            oe.wait_pulse_finished();
        }
    }
}

impl<const ROWS: usize, const COLS: usize, const NROWS: usize>
    embedded_graphics::prelude::OriginDimensions for FrameBuffer<ROWS, COLS, NROWS>
{
    fn size(&self) -> embedded_graphics::prelude::Size {
        embedded_graphics::prelude::Size::new(COLS as u32, self.height as u32)
    }
}

impl<const ROWS: usize, const COLS: usize, const NROWS: usize>
    embedded_graphics::draw_target::DrawTarget for FrameBuffer<ROWS, COLS, NROWS>
{
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            self.set_pixel_internal(point.x as usize, point.y as usize, color);
        }
        Ok(())
    }
}

impl<const ROWS: usize, const COLS: usize, const NROWS: usize> core::fmt::Debug
    for FrameBuffer<ROWS, COLS, NROWS>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("rows", &ROWS)
            .field("cols", &COLS)
            .field("parallel", &self.parallel)
            .field("pwm_bits", &self.pwm_bits)
            .field("buffer_bytes", &core::mem::size_of_val(&self.rows0))
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const ROWS: usize, const COLS: usize, const NROWS: usize> defmt::Format
    for FrameBuffer<ROWS, COLS, NROWS>
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "FrameBuffer<{}, {}, {}>", ROWS, COLS, NROWS);
        defmt::write!(f, " parallel: {}", self.parallel);
        defmt::write!(f, " pwm_bits: {}", self.pwm_bits);
        defmt::write!(f, " buffer size: {}", core::mem::size_of_val(&self.rows0));
    }
}
