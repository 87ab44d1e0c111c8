//! Gamma correction table
//!
//! Maps 8-bit perceptual intensity onto the drivers' 12-bit PWM duty code
//! along a 3.5 power curve:
//!
//! ```text
//! duty(level) = 3800 * ((level + 20) / 275) ^ 3.5
//! ```
//!
//! The curve is evaluated in integer arithmetic in a `const fn`, so the
//! table is built at compile time and lookups in the scan interrupt are a
//! plain array index.

use crate::encode::BusWord;

/// Number of intensity levels
pub const LEVELS: usize = 256;

/// Duty code for full intensity
pub const MAX_DUTY: u16 = 3800;

/// Offset lifting the bottom of the curve off zero
const OFFSET: u64 = 20;

/// Curve span (top level plus offset)
const SPAN: u64 = 255 + OFFSET;

/// Integer square root (floor)
pub const fn isqrt(n: u64) -> u64 {
    let mut rem = n;
    let mut root = 0u64;
    let mut bit = 1u64 << 62;

    while bit > n {
        bit >>= 2;
    }
    while bit != 0 {
        if rem >= root + bit {
            rem -= root + bit;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }
    root
}

/// Closed-form duty code for an intensity level
///
/// `(n / d) ^ 3.5 = n³ · sqrt(n · d) / d⁴`; the square root is taken with
/// 16 extra fractional bits.
pub const fn duty(level: u8) -> u16 {
    let num = level as u64 + OFFSET;
    let root = isqrt((num * SPAN) << 32);
    let scaled = MAX_DUTY as u64 * num * num * num * root;
    (scaled / ((SPAN * SPAN * SPAN * SPAN) << 16)) as u16
}

/// Precomputed intensity → bus word table
pub struct GammaTable {
    words: [BusWord; LEVELS],
}

impl GammaTable {
    /// Build the table
    pub const fn new() -> Self {
        let mut words = [BusWord::ZERO; LEVELS];
        let mut level = 0;
        while level < LEVELS {
            words[level] = BusWord::from_data(duty(level as u8));
            level += 1;
        }
        Self { words }
    }

    /// Bus word for `level`, latch bits clear
    #[inline]
    pub fn encode(&self, level: u8) -> BusWord {
        self.words[usize::from(level)]
    }

    /// Duty code stored for `level`
    pub fn duty(&self, level: u8) -> u16 {
        self.encode(level).data()
    }
}

impl Default for GammaTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reference(level: u8) -> f64 {
        ((f64::from(level) + 20.0) / 275.0).powf(3.5) * 3800.0
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(u64::MAX), u64::from(u32::MAX));
    }

    #[test]
    fn test_matches_closed_form() {
        for level in 0..=255u8 {
            let expected = reference(level);
            let actual = f64::from(duty(level));
            assert!(
                (actual - expected).abs() <= 1.0,
                "level {level}: {actual} vs {expected}"
            );
        }
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(duty(0), 0);
        assert_eq!(duty(255), MAX_DUTY);
    }

    #[test]
    fn test_table_monotonic() {
        let table = GammaTable::new();
        for level in 1..=255u8 {
            assert!(table.duty(level) >= table.duty(level - 1));
        }
    }

    #[test]
    fn test_table_words_carry_no_latch() {
        let table = GammaTable::new();
        for level in 0..=255u8 {
            assert_eq!(table.encode(level).latch_clocks(), 0);
            assert_eq!(table.duty(level), duty(level));
        }
    }

    proptest! {
        #[test]
        fn prop_brighter_never_dimmer(a in any::<u8>(), b in any::<u8>()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(duty(lo) <= duty(hi));
        }
    }
}
