//! Maps 8-bit sRGB components to the PWM values the bit-planes encode.
//!
//! Two mappings are supported. The default runs the component through the
//! inverse CIE-1931 lightness curve, so that halving the input roughly halves
//! the *perceived* brightness instead of the duty cycle. The alternative is a
//! plain linear scale, left-aligned into the [`BIT_PLANES`] output bits.
//!
//! Both mappings fold the global brightness percentage in before the curve,
//! and both are served from a 256-entry table so the pixel-writing path never
//! touches floating point. The table is rebuilt whenever brightness or the
//! correction mode changes, which is rare and cheap.

use libm::powf;

use crate::BIT_PLANES;

/// Color-mapper state: brightness, correction mode and the output table.
#[derive(Clone)]
pub struct ColorMap {
    brightness: u8,
    luminance_correct: bool,
    table: [u16; 256],
}

impl ColorMap {
    /// Creates a mapper at full brightness with luminance correction on.
    #[must_use]
    pub fn new() -> Self {
        let mut map = Self {
            brightness: 100,
            luminance_correct: true,
            table: [0; 256],
        };
        map.rebuild();
        map
    }

    /// Maps one 8-bit component to its [`BIT_PLANES`]-bit PWM value.
    #[inline]
    #[must_use]
    pub fn map(&self, c: u8) -> u16 {
        self.table[usize::from(c)]
    }

    /// Sets the brightness percentage.
    ///
    /// Values outside `1..=100` are clamped; 0 would make the panel
    /// unrecoverably dark by accident, so it is not representable.
    pub fn set_brightness(&mut self, percent: u8) {
        let percent = percent.clamp(1, 100);
        if percent != self.brightness {
            self.brightness = percent;
            self.rebuild();
        }
    }

    /// Current brightness percentage.
    #[must_use]
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Switches between CIE-1931 luminance correction and linear scaling.
    pub fn set_luminance_correct(&mut self, on: bool) {
        if on != self.luminance_correct {
            self.luminance_correct = on;
            self.rebuild();
        }
    }

    /// Whether luminance correction is active.
    #[must_use]
    pub fn luminance_correct(&self) -> bool {
        self.luminance_correct
    }

    fn rebuild(&mut self) {
        for (c, slot) in self.table.iter_mut().enumerate() {
            let value = if self.luminance_correct {
                luminance_cie1931(c as u8, self.brightness)
            } else {
                scale_linear(c as u8, self.brightness)
            };
            *slot = output_bits(value);
        }
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for ColorMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ColorMap")
            .field("brightness", &self.brightness)
            .field("luminance_correct", &self.luminance_correct)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ColorMap {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "ColorMap {{ brightness: {}, luminance_correct: {} }}",
            self.brightness,
            self.luminance_correct
        );
    }
}

// Inverse CIE-1931 L* curve, scaled to the bit-plane range. The 902.3
// divisor and the truncating conversion are kept bit-for-bit from the
// implementation this table was validated against.
fn luminance_cie1931(c: u8, brightness: u8) -> u16 {
    let out_factor = ((1u32 << BIT_PLANES) - 1) as f32;
    let v = f32::from(c) * f32::from(brightness) / 255.0;
    let l = if v <= 8.0 {
        v / 902.3
    } else {
        powf((v + 16.0) / 116.0, 3.0)
    };
    (out_factor * l) as u16
}

// Scale by brightness, then left-align 8 input bits into the output width.
fn scale_linear(c: u8, brightness: u8) -> u16 {
    let scaled = u16::from(c) * u16::from(brightness) / 100;
    scaled << (BIT_PLANES - 8)
}

#[cfg(feature = "inverse-colors")]
const fn output_bits(value: u16) -> u16 {
    value ^ 0xffff
}

#[cfg(not(feature = "inverse-colors"))]
const fn output_bits(value: u16) -> u16 {
    value
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    const MAX_OUTPUT: u16 = (1 << BIT_PLANES) - 1;

    // Reference curve in f64, kept independent of the table builder.
    #[cfg(not(feature = "inverse-colors"))]
    fn reference_cie1931(c: u8, brightness: u8) -> f64 {
        let out_factor = f64::from(MAX_OUTPUT);
        let v = f64::from(c) * f64::from(brightness) / 255.0;
        let l = if v <= 8.0 {
            v / 902.3
        } else {
            ((v + 16.0) / 116.0).powi(3)
        };
        out_factor * l
    }

    #[test]
    fn test_default_state() {
        let map = ColorMap::new();
        assert_eq!(map.brightness(), 100);
        assert!(map.luminance_correct());
    }

    #[test]
    fn test_brightness_is_clamped() {
        let mut map = ColorMap::new();
        map.set_brightness(0);
        assert_eq!(map.brightness(), 1);
        map.set_brightness(200);
        assert_eq!(map.brightness(), 100);
        map.set_brightness(55);
        assert_eq!(map.brightness(), 55);
    }

    #[test]
    #[cfg(not(feature = "inverse-colors"))]
    fn test_luminance_table_matches_curve() {
        let mut map = ColorMap::new();
        for brightness in [1u8, 10, 50, 99, 100] {
            map.set_brightness(brightness);
            for c in 0..=255u8 {
                let got = i32::from(map.map(c));
                let want = reference_cie1931(c, brightness) as i32;
                assert!(
                    (got - want).abs() <= 1,
                    "c={c} brightness={brightness}: got {got}, curve {want}"
                );
            }
        }
    }

    #[test]
    #[cfg(not(feature = "inverse-colors"))]
    fn test_luminance_endpoints() {
        let map = ColorMap::new();
        assert_eq!(map.map(0), 0);
        // v = 100 lands exactly on ((100 + 16) / 116)^3 = 1.
        assert_eq!(map.map(255), MAX_OUTPUT);
    }

    #[test]
    #[cfg(not(feature = "inverse-colors"))]
    fn test_linear_scale_is_left_aligned() {
        let mut map = ColorMap::new();
        map.set_luminance_correct(false);
        assert!(!map.luminance_correct());

        // 255 left-aligned into 11 bits: the top 8 bits set.
        assert_eq!(map.map(255), 0b111_1111_1000);
        assert_eq!(map.map(1), 1 << (BIT_PLANES - 8));
        assert_eq!(map.map(0), 0);

        map.set_brightness(50);
        assert_eq!(map.map(255), (255 * 50 / 100) << (BIT_PLANES - 8));
    }

    #[test]
    fn test_monotonic_in_component() {
        let mut map = ColorMap::new();
        for correct in [true, false] {
            map.set_luminance_correct(correct);
            for brightness in [1u8, 37, 100] {
                map.set_brightness(brightness);
                let mut prev = map.map(0);
                for c in 1..=255u8 {
                    let cur = map.map(c);
                    #[cfg(not(feature = "inverse-colors"))]
                    assert!(cur >= prev, "correct={correct} brightness={brightness} c={c}");
                    #[cfg(feature = "inverse-colors")]
                    assert!(cur <= prev, "correct={correct} brightness={brightness} c={c}");
                    prev = cur;
                }
            }
        }
    }

    #[test]
    #[cfg(not(feature = "inverse-colors"))]
    fn test_monotonic_in_brightness() {
        let mut map = ColorMap::new();
        for correct in [true, false] {
            map.set_luminance_correct(correct);
            for c in [1u8, 64, 128, 255] {
                map.set_brightness(1);
                let mut prev = map.map(c);
                for brightness in 2..=100u8 {
                    map.set_brightness(brightness);
                    let cur = map.map(c);
                    assert!(cur >= prev, "correct={correct} c={c} brightness={brightness}");
                    prev = cur;
                }
            }
        }
    }

    #[test]
    fn test_output_fits_bit_planes() {
        let mut map = ColorMap::new();
        for correct in [true, false] {
            map.set_luminance_correct(correct);
            for c in 0..=255u8 {
                #[cfg(not(feature = "inverse-colors"))]
                assert!(map.map(c) <= MAX_OUTPUT);
                #[cfg(feature = "inverse-colors")]
                assert!(map.map(c) >= !MAX_OUTPUT);
            }
        }
    }

    #[test]
    #[cfg(feature = "inverse-colors")]
    fn test_inverse_output_is_bit_inverted() {
        let map = ColorMap::new();
        assert_eq!(map.map(0), 0xffff);
        assert_eq!(map.map(255), 0xffff ^ MAX_OUTPUT);
    }
}
