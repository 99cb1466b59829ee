//! The compiled CRC model: parameters plus every precomputed constant the
//! table scanner, folding engine and combiner need.

use crate::error::CrcError;
use crate::gf2::{clmul, mask64, poly_mod, reflect64, square_mod, x_pow_div, x_pow_mod};

/// A compiled CRC model.
///
/// Construct with [`Model::compile`]. Once built, a `Model` is immutable and
/// cheap to share (`&Model`) across calls to [`crate::crc_table`],
/// [`crate::crc_calc`] and [`crate::crc_combine`] -- none of them mutate it.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) width: u32,
    pub(crate) poly: u64,
    pub(crate) init: u64,
    pub(crate) refin: bool,
    pub(crate) refout: bool,
    pub(crate) xorout: u64,

    /// 256-entry byte table, in the model's native (in-convention) domain.
    pub(crate) table: [u64; 256],

    /// Fold-by-64-byte constants, `x^(512+64) mod P` / `x^512 mod P`
    /// (non-reflected) or their bit-reversed counterparts (reflected),
    /// computed against the width-64-normalized polynomial.
    pub(crate) k1: u64,
    pub(crate) k2: u64,

    /// `combine_table[i] = x^(8 * 2^i) mod P`, in the model's native
    /// (non-width-64-normalized) domain, built by repeated squaring.
    pub(crate) combine_table: [u64; 64],

    /// Barrett's reciprocal constant, `x^128 div P64` (degree 64, stored
    /// with its explicit leading term), where `P64` is the
    /// width-64-normalized polynomial. Precomputed once here so the
    /// folding engine's finalization step never performs a division.
    pub(crate) barrett_recip: u128,
}

impl Model {
    /// Compiles a CRC model from its defining parameters.
    ///
    /// `width` must be in `1..=64`; `poly`, `init` and `xorout` must each fit
    /// in `width` bits (the implicit leading `x^width` term of the
    /// polynomial is not included in `poly`). Returns [`CrcError`] otherwise.
    pub fn compile(
        width: u32,
        poly: u64,
        init: u64,
        refin: bool,
        refout: bool,
        xorout: u64,
    ) -> Result<Model, CrcError> {
        if width < 1 || width > 64 {
            return Err(CrcError::WidthOutOfRange { width });
        }
        let mask = mask64(width);
        if poly & !mask != 0 {
            return Err(CrcError::PolyTooWide { poly, width });
        }
        if init & !mask != 0 {
            return Err(CrcError::InitTooWide { init, width });
        }
        if xorout & !mask != 0 {
            return Err(CrcError::XoroutTooWide { xorout, width });
        }

        let p_native: u128 = (1u128 << width) | (poly as u128);
        let table = build_table(width, p_native, refin);
        let (k1, k2) = fold_constants(width, p_native, refin, 64);
        let combine_table = build_combine_table(p_native, width);
        let p64: u128 = p_native << (64 - width);
        let barrett_recip = x_pow_div(128, p64, 64);

        Ok(Model {
            width,
            poly,
            init,
            refin,
            refout,
            xorout,
            table,
            k1,
            k2,
            combine_table,
            barrett_recip,
        })
    }

    /// The model's bit width, `1..=64`.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The model's polynomial (without the implicit leading term).
    pub fn poly(&self) -> u64 {
        self.poly
    }

    /// The initial register value, already in-convention (reflected if
    /// `refin`).
    pub fn init(&self) -> u64 {
        self.init
    }

    /// Whether input bytes are processed LSB-first.
    pub fn refin(&self) -> bool {
        self.refin
    }

    /// Whether the final register is bit-reversed before `xorout`.
    pub fn refout(&self) -> bool {
        self.refout
    }

    /// The value XORed into the final register.
    pub fn xorout(&self) -> u64 {
        self.xorout
    }

    /// A mask with the model's `width` low bits set.
    pub(crate) fn mask(&self) -> u64 {
        mask64(self.width)
    }

    /// Applies `refout` and `xorout` to an in-convention running CRC,
    /// producing the externally-visible check value.
    pub fn finalize(&self, crc: u64) -> u64 {
        let crc = if self.refout != self.refin {
            reflect64(crc, self.width)
        } else {
            crc
        };
        (crc ^ self.xorout) & self.mask()
    }
}

/// Builds the 256-entry byte table. Each entry is the CRC of a lone byte
/// `i` run through a register pre-loaded with zero, in the model's native
/// convention -- the per-byte analogue of the "mathematical" reference
/// definition: reflect the byte in if `refin`, reduce by the polynomial,
/// reflect the result back out if `refin`. Expressed directly via
/// `poly_mod` this holds for every width, including width < 8.
fn build_table(width: u32, p_native: u128, refin: bool) -> [u64; 256] {
    let mut table = [0u64; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let byte = if refin {
            reflect64(i as u64, 8)
        } else {
            i as u64
        };
        let reduced = poly_mod((byte as u128) << width, 8 + width, p_native, width) as u64;
        *entry = if refin {
            reflect64(reduced, width)
        } else {
            reduced
        };
    }
    table
}

/// Computes the fold-by-`distance`-bytes constants `(k1, k2)`: `x^(8*distance
/// + 64) mod P64` / `x^(8*distance) mod P64` (non-reflected), or their
/// bit-reversed counterparts at exponents one less (reflected), where `P64`
/// is the polynomial normalized to degree 64 (`P << (64 - width)`). Distance
/// 64 gives the model's own `k1`/`k2`; smaller distances are recomputed on
/// demand by the folding engine to merge lanes.
pub(crate) fn fold_constants(width: u32, p_native: u128, refin: bool, distance: u64) -> (u64, u64) {
    let p64: u128 = p_native << (64 - width);
    if refin {
        let k1 = x_pow_mod(8 * distance + 63, p64, 64) as u64;
        let k2 = x_pow_mod(8 * distance - 1, p64, 64) as u64;
        (reflect64(k1, 64), reflect64(k2, 64))
    } else {
        let k1 = x_pow_mod(8 * distance + 64, p64, 64) as u64;
        let k2 = x_pow_mod(8 * distance, p64, 64) as u64;
        (k1 as u64, k2 as u64)
    }
}

/// Builds the combine table by repeated squaring: `g(0) = x^8 mod P`,
/// `g(i+1) = g(i)^2 mod P`, so `combine_table[i] = x^(8 * 2^i) mod P`
/// without ever materializing the literal (astronomically large) exponent.
fn build_combine_table(p_native: u128, width: u32) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut g = poly_mod(1u128 << 8, 9, p_native, width) as u64;
    for entry in table.iter_mut() {
        *entry = g;
        g = square_mod(g, p_native, width) as u64;
    }
    table
}

/// `v * x^(8 * n_bytes) mod P`, via binary exponentiation over the
/// precomputed combine table.
pub(crate) fn shift_by_bytes(v: u64, n_bytes: u64, combine_table: &[u64; 64], p_native: u128, width: u32) -> u64 {
    let mut result = v;
    for (i, &entry) in combine_table.iter().enumerate() {
        if (n_bytes >> i) & 1 != 0 {
            result = poly_mod(clmul(result, entry), 128, p_native, width) as u64;
        }
    }
    result
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_bad_width() {
        assert_eq!(
            Model::compile(0, 0, 0, false, false, 0),
            Err(CrcError::WidthOutOfRange { width: 0 })
        );
        assert_eq!(
            Model::compile(65, 0, 0, false, false, 0),
            Err(CrcError::WidthOutOfRange { width: 65 })
        );
    }

    #[test]
    fn rejects_oversized_params() {
        assert!(Model::compile(8, 0x1ff, 0, false, false, 0).is_err());
        assert!(Model::compile(8, 0, 0x1ff, false, false, 0).is_err());
        assert!(Model::compile(8, 0, 0, false, false, 0x1ff).is_err());
    }

    #[test]
    fn compiles_crc32() {
        let m = Model::compile(32, 0x04c11db7, 0xffffffff, true, true, 0xffffffff).unwrap();
        assert_eq!(m.width(), 32);
        assert_eq!(m.table[0], 0);
    }

    #[test]
    fn combine_table_doubles_each_entry() {
        let m = Model::compile(32, 0x04c11db7, 0, false, false, 0).unwrap();
        let p_native: u128 = (1u128 << 32) | 0x04c11db7;
        for i in 0..10 {
            let squared = square_mod(m.combine_table[i], p_native, 32) as u64;
            assert_eq!(squared, m.combine_table[i + 1]);
        }
    }

    #[test]
    fn barrett_recip_has_expected_degree() {
        // deg(x^128 / P64) == deg(P64) == 64 for every width: the quotient's
        // leading term is always present, same as P64 itself.
        for width in [8, 16, 32, 64] {
            let m = Model::compile(width, 0x04c11db7 & mask64(width), 0, false, false, 0).unwrap();
            assert_eq!(m.barrett_recip >> 64, 1, "width={}", width);
        }
    }
}
