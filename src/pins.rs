//! Pin map: which GPIO bit carries which panel signal.
//!
//! The panels are driven through whole-bank GPIO writes, so every signal is
//! a named bit inside a packed 32-bit word. The positions below follow the
//! classic Raspberry-Pi HUB75 wiring; they are fixed at compile time and the
//! rest of the engine only ever refers to them by name or through the mask
//! builders in this module.
//!
//! Bank 0 carries the control lines (clock, strobe, output-enable), the row
//! address lines A-E and the color bits of chains 1-3. Bank 1 exists only on
//! `cm5-chains` builds and carries the color bits of chains 4 and 5.

use bitfield::bitfield;

/// Chains whose color bits live in bank 0.
pub const BANK0_CHAINS: usize = if cfg!(feature = "adafruit-hat") { 1 } else { 3 };

bitfield! {
    /// One bank-0 GPIO word.
    ///
    /// Bit layout (GPIO number = bit index):
    /// - Bits 0-1: revision-1 duplicates of clock and output-enable
    /// - Bit 4: strobe; bit 17: clock; bit 18: output-enable
    /// - Bits 22-25 and 15: row address A, B, C, D, E
    /// - Remaining bits: R/G/B for the upper (`1`) and lower (`2`) sub-panel
    ///   of chains `p0`-`p2`
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct IoBits0(u32);
    impl Debug;
    pub clock_rev1, set_clock_rev1: 0;
    pub output_enable_rev1, set_output_enable_rev1: 1;
    pub p2_g1, set_p2_g1: 2;
    pub p2_b1, set_p2_b1: 3;
    pub strobe, set_strobe: 4;
    pub p1_g1, set_p1_g1: 5;
    pub p1_b1, set_p1_b1: 6;
    pub p0_b1, set_p0_b1: 7;
    pub p0_r2, set_p0_r2: 8;
    pub p0_g2, set_p0_g2: 9;
    pub p0_b2, set_p0_b2: 10;
    pub p0_r1, set_p0_r1: 11;
    pub p1_r1, set_p1_r1: 12;
    pub p1_g2, set_p1_g2: 13;
    pub p2_r1, set_p2_r1: 14;
    pub e, set_e: 15;
    pub p2_g2, set_p2_g2: 16;
    pub clock, set_clock: 17;
    pub output_enable, set_output_enable: 18;
    pub p1_r2, set_p1_r2: 19;
    pub p1_b2, set_p1_b2: 20;
    pub p2_b2, set_p2_b2: 21;
    pub a, set_a: 22;
    pub b, set_b: 23;
    pub c, set_c: 24;
    pub d, set_d: 25;
    pub p2_r2, set_p2_r2: 26;
    pub p0_g1, set_p0_g1: 27;
}

#[cfg(feature = "cm5-chains")]
bitfield! {
    /// One bank-1 GPIO word: color bits of chains 4 and 5.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct IoBits1(u32);
    impl Debug;
    pub p3_r1, set_p3_r1: 0;
    pub p3_g1, set_p3_g1: 1;
    pub p3_b1, set_p3_b1: 2;
    pub p3_r2, set_p3_r2: 3;
    pub p3_g2, set_p3_g2: 4;
    pub p3_b2, set_p3_b2: 5;
    pub p4_r1, set_p4_r1: 6;
    pub p4_g1, set_p4_g1: 7;
    pub p4_b1, set_p4_b1: 8;
    pub p4_r2, set_p4_r2: 9;
    pub p4_g2, set_p4_g2: 10;
    pub p4_b2, set_p4_b2: 11;
}

impl IoBits0 {
    pub const CLOCK_REV1: u32 = 1 << 0;
    pub const OUTPUT_ENABLE_REV1: u32 = 1 << 1;
    pub const P2_G1: u32 = 1 << 2;
    pub const P2_B1: u32 = 1 << 3;
    pub const STROBE: u32 = 1 << 4;
    pub const P1_G1: u32 = 1 << 5;
    pub const P1_B1: u32 = 1 << 6;
    pub const P0_B1: u32 = 1 << 7;
    pub const P0_R2: u32 = 1 << 8;
    pub const P0_G2: u32 = 1 << 9;
    pub const P0_B2: u32 = 1 << 10;
    pub const P0_R1: u32 = 1 << 11;
    pub const P1_R1: u32 = 1 << 12;
    pub const P1_G2: u32 = 1 << 13;
    pub const P2_R1: u32 = 1 << 14;
    pub const ADDR_E: u32 = 1 << 15;
    pub const P2_G2: u32 = 1 << 16;
    pub const CLOCK: u32 = 1 << 17;
    pub const OUTPUT_ENABLE: u32 = 1 << 18;
    pub const P1_R2: u32 = 1 << 19;
    pub const P1_B2: u32 = 1 << 20;
    pub const P2_B2: u32 = 1 << 21;
    pub const ADDR_A: u32 = 1 << 22;
    pub const ADDR_B: u32 = 1 << 23;
    pub const ADDR_C: u32 = 1 << 24;
    pub const ADDR_D: u32 = 1 << 25;
    pub const P2_R2: u32 = 1 << 26;
    pub const P0_G1: u32 = 1 << 27;

    /// Red bits of every bank-0 chain and sub-panel, as `fill` writes them.
    pub const RED_ALL: u32 = if cfg!(feature = "adafruit-hat") {
        Self::P0_R1 | Self::P0_R2
    } else {
        Self::P0_R1 | Self::P0_R2 | Self::P1_R1 | Self::P1_R2 | Self::P2_R1 | Self::P2_R2
    };
    /// Green bits of every bank-0 chain and sub-panel.
    pub const GREEN_ALL: u32 = if cfg!(feature = "adafruit-hat") {
        Self::P0_G1 | Self::P0_G2
    } else {
        Self::P0_G1 | Self::P0_G2 | Self::P1_G1 | Self::P1_G2 | Self::P2_G1 | Self::P2_G2
    };
    /// Blue bits of every bank-0 chain and sub-panel.
    pub const BLUE_ALL: u32 = if cfg!(feature = "adafruit-hat") {
        Self::P0_B1 | Self::P0_B2
    } else {
        Self::P0_B1 | Self::P0_B2 | Self::P1_B1 | Self::P1_B2 | Self::P2_B1 | Self::P2_B2
    };

    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Sets or clears every bit of `mask` at once.
    pub fn set_masked(&mut self, mask: u32, on: bool) {
        if on {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }
}

#[cfg(feature = "cm5-chains")]
impl IoBits1 {
    pub const P3_R1: u32 = 1 << 0;
    pub const P3_G1: u32 = 1 << 1;
    pub const P3_B1: u32 = 1 << 2;
    pub const P3_R2: u32 = 1 << 3;
    pub const P3_G2: u32 = 1 << 4;
    pub const P3_B2: u32 = 1 << 5;
    pub const P4_R1: u32 = 1 << 6;
    pub const P4_G1: u32 = 1 << 7;
    pub const P4_B1: u32 = 1 << 8;
    pub const P4_R2: u32 = 1 << 9;
    pub const P4_G2: u32 = 1 << 10;
    pub const P4_B2: u32 = 1 << 11;

    /// Red bits of both bank-1 chains and sub-panels.
    pub const RED_ALL: u32 = Self::P3_R1 | Self::P3_R2 | Self::P4_R1 | Self::P4_R2;
    /// Green bits of both bank-1 chains and sub-panels.
    pub const GREEN_ALL: u32 = Self::P3_G1 | Self::P3_G2 | Self::P4_G1 | Self::P4_G2;
    /// Blue bits of both bank-1 chains and sub-panels.
    pub const BLUE_ALL: u32 = Self::P3_B1 | Self::P3_B2 | Self::P4_B1 | Self::P4_B2;

    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn set_masked(&mut self, mask: u32, on: bool) {
        if on {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }
}

/// Color bits of the bank-0 chains actually driven at the given chain count.
pub fn color_mask0(parallel: usize) -> IoBits0 {
    let mut mask = IoBits0::new();
    mask.set_p0_r1(true);
    mask.set_p0_g1(true);
    mask.set_p0_b1(true);
    mask.set_p0_r2(true);
    mask.set_p0_g2(true);
    mask.set_p0_b2(true);
    if BANK0_CHAINS >= 2 && parallel >= 2 {
        mask.set_masked(
            IoBits0::P1_R1
                | IoBits0::P1_G1
                | IoBits0::P1_B1
                | IoBits0::P1_R2
                | IoBits0::P1_G2
                | IoBits0::P1_B2,
            true,
        );
    }
    if BANK0_CHAINS >= 3 && parallel >= 3 {
        mask.set_masked(
            IoBits0::P2_R1
                | IoBits0::P2_G1
                | IoBits0::P2_B1
                | IoBits0::P2_R2
                | IoBits0::P2_G2
                | IoBits0::P2_B2,
            true,
        );
    }
    mask
}

/// Color bits of the bank-1 chains actually driven at the given chain count.
#[cfg(feature = "cm5-chains")]
pub fn color_mask1(parallel: usize) -> IoBits1 {
    let mut mask = IoBits1::new();
    if parallel >= 4 {
        mask.set_masked(
            IoBits1::P3_R1
                | IoBits1::P3_G1
                | IoBits1::P3_B1
                | IoBits1::P3_R2
                | IoBits1::P3_G2
                | IoBits1::P3_B2,
            true,
        );
    }
    if parallel >= 5 {
        mask.set_masked(
            IoBits1::P4_R1
                | IoBits1::P4_G1
                | IoBits1::P4_B1
                | IoBits1::P4_R2
                | IoBits1::P4_G2
                | IoBits1::P4_B2,
            true,
        );
    }
    mask
}

/// Row address lines used by a panel with this many address rows.
pub fn address_mask(double_rows: usize) -> IoBits0 {
    let mut raw = IoBits0::ADDR_A;
    if double_rows >= 4 {
        raw |= IoBits0::ADDR_B;
    }
    if double_rows >= 8 {
        raw |= IoBits0::ADDR_C;
    }
    if double_rows >= 16 {
        raw |= IoBits0::ADDR_D;
    }
    if double_rows >= 32 {
        raw |= IoBits0::ADDR_E;
    }
    IoBits0::from_raw(raw)
}

/// Address-line encoding of one address row.
pub fn address_bits(d_row: usize) -> IoBits0 {
    let mut adr = IoBits0::new();
    adr.set_a(d_row & 1 != 0);
    adr.set_b(d_row & 2 != 0);
    adr.set_c(d_row & 4 != 0);
    adr.set_d(d_row & 8 != 0);
    adr.set_e(d_row & 16 != 0);
    adr
}

/// The clock line, plus its revision-1 duplicate where configured.
pub fn clock_mask() -> IoBits0 {
    let mut mask = IoBits0::from_raw(IoBits0::CLOCK);
    if cfg!(feature = "pi-rev1-pinout") {
        mask.set_masked(IoBits0::CLOCK_REV1, true);
    }
    mask
}

/// The output-enable line, plus its revision-1 duplicate where configured.
pub fn output_enable_mask() -> IoBits0 {
    let mut mask = IoBits0::from_raw(IoBits0::OUTPUT_ENABLE);
    if cfg!(feature = "pi-rev1-pinout") {
        mask.set_masked(IoBits0::OUTPUT_ENABLE_REV1, true);
    }
    mask
}

/// Bank-0 R/G/B field masks owned by a pixel on the given chain and
/// sub-panel (`upper` is the first sub-panel of the pair).
pub const fn channel_masks0(chain: usize, upper: bool) -> (u32, u32, u32) {
    match (chain, upper) {
        (0, true) => (IoBits0::P0_R1, IoBits0::P0_G1, IoBits0::P0_B1),
        (0, false) => (IoBits0::P0_R2, IoBits0::P0_G2, IoBits0::P0_B2),
        (1, true) => (IoBits0::P1_R1, IoBits0::P1_G1, IoBits0::P1_B1),
        (1, false) => (IoBits0::P1_R2, IoBits0::P1_G2, IoBits0::P1_B2),
        (2, true) => (IoBits0::P2_R1, IoBits0::P2_G1, IoBits0::P2_B1),
        (2, false) => (IoBits0::P2_R2, IoBits0::P2_G2, IoBits0::P2_B2),
        _ => (0, 0, 0),
    }
}

/// Bank-1 R/G/B field masks owned by a pixel on chain 3 or 4.
#[cfg(feature = "cm5-chains")]
pub const fn channel_masks1(chain: usize, upper: bool) -> (u32, u32, u32) {
    match (chain, upper) {
        (3, true) => (IoBits1::P3_R1, IoBits1::P3_G1, IoBits1::P3_B1),
        (3, false) => (IoBits1::P3_R2, IoBits1::P3_G2, IoBits1::P3_B2),
        (4, true) => (IoBits1::P4_R1, IoBits1::P4_G1, IoBits1::P4_B1),
        (4, false) => (IoBits1::P4_R2, IoBits1::P4_G2, IoBits1::P4_B2),
        _ => (0, 0, 0),
    }
}
