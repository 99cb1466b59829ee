//! CLMUL folding engine: bulk throughput via four parallel 128-bit lanes,
//! falling back to the byte table for short inputs and trailing bytes.

use crate::gf2::{clmul, clmul_deg64, mask64, reflect64, reflect128};
use crate::model::{fold_constants, Model};
use crate::table::crc_table;

const FOLD_STRIDE: usize = 64; // four 16-byte lanes per iteration
const MIN_FOLD_LEN: usize = 128; // one lane load plus at least one full stride

/// Computes the CRC of `buf`, continuing from the in-convention running CRC
/// `crc`. Does not apply `init`, `refout` or `xorout`. Inputs shorter than
/// two folding strides go straight to [`crc_table`]; longer inputs fold the
/// bulk through CLMUL and finish the remainder (at most 63 bytes) through
/// the table scanner, seeded with the folded residue.
pub fn crc_calc(model: &Model, crc: u64, buf: &[u8]) -> u64 {
    if buf.len() < MIN_FOLD_LEN {
        return crc_table(model, crc, buf);
    }
    let (seed, tail) = fold(model, crc, buf);
    crc_table(model, seed, tail)
}

fn load_u128(bytes: &[u8], le: bool) -> u128 {
    let mut arr = [0u8; 16];
    arr.copy_from_slice(&bytes[..16]);
    if le {
        u128::from_le_bytes(arr)
    } else {
        u128::from_be_bytes(arr)
    }
}

fn fold<'a>(model: &Model, crc: u64, buf: &'a [u8]) -> (u64, &'a [u8]) {
    let width = model.width;
    let refin = model.refin;
    let p_native: u128 = (1u128 << width) | (model.poly as u128);

    let mut lanes = [
        load_u128(&buf[0..16], refin),
        load_u128(&buf[16..32], refin),
        load_u128(&buf[32..48], refin),
        load_u128(&buf[48..64], refin),
    ];
    // the running crc is pre-rotated to the width-64 alignment and XORed
    // into the low word of the first lane, regardless of convention.
    lanes[0] ^= (crc as u128) << (64 - width);

    let k1 = model.k1;
    let k2 = model.k2;
    let mut pos = FOLD_STRIDE;
    while buf.len() - pos >= FOLD_STRIDE {
        for (i, lane) in lanes.iter_mut().enumerate() {
            let block = load_u128(&buf[pos + i * 16..pos + i * 16 + 16], refin);
            *lane = fold_step(*lane, k1, k2, block, refin);
        }
        pos += FOLD_STRIDE;
    }

    let merged = merge_lanes(&lanes, width, p_native, refin);

    // non-reflected loads are already in the "mathematical" bit order;
    // reflected folding works in the bit-reversed domain throughout, so the
    // merged residue needs one whole-word reflection before reducing it
    // with an ordinary (non-reflected) division.
    let normal = if refin { reflect128(merged, 128) } else { merged };
    let p64: u128 = p_native << (64 - width);
    let seed64 = barrett_reduce(normal, p64, model.barrett_recip) as u64;
    let native_normal = (seed64 >> (64 - width)) & mask64(width);
    let seed = if refin {
        reflect64(native_normal, width)
    } else {
        native_normal
    };

    (seed, &buf[pos..])
}

/// A single fold step: absorb `block`, shifting `lane`'s old contents
/// forward by the distance `k1`/`k2` encode (64 bytes, for the main loop).
fn fold_step(lane: u128, k1: u64, k2: u64, block: u128, refin: bool) -> u128 {
    block ^ shift_lane(lane, k1, k2, refin)
}

fn shift_lane(lane: u128, k1: u64, k2: u64, refin: bool) -> u128 {
    let lo = lane as u64;
    let hi = (lane >> 64) as u64;
    if refin {
        clmul(lo, k1) ^ clmul(hi, k2)
    } else {
        clmul(hi, k1) ^ clmul(lo, k2)
    }
}

/// Collapses the four lane accumulators -- each one, two or three 16-byte
/// blocks further back than the last -- into a single residue, by shifting
/// each forward to the position of the final lane and XORing together.
/// Mirrors the fold-by-distance technique real multi-lane CLMUL CRCs use to
/// reduce N parallel accumulators to one before the final reduction.
fn merge_lanes(lanes: &[u128; 4], width: u32, p_native: u128, refin: bool) -> u128 {
    let (k1_48, k2_48) = fold_constants(width, p_native, refin, 48);
    let (k1_32, k2_32) = fold_constants(width, p_native, refin, 32);
    let (k1_16, k2_16) = fold_constants(width, p_native, refin, 16);

    lanes[3]
        ^ shift_lane(lanes[2], k1_16, k2_16, refin)
        ^ shift_lane(lanes[1], k1_32, k2_32, refin)
        ^ shift_lane(lanes[0], k1_48, k2_48, refin)
}

/// Barrett-reduces the 128-bit merged residue `v` modulo `p64` (the
/// width-64-normalized polynomial, degree 64), in two carry-less
/// multiplies plus two XORs instead of a bit-serial division (spec §4.5).
/// `recip` is `x^128 div p64`, precomputed once per [`Model`]
/// (`Model::compile`'s `barrett_recip`). Grounded directly in the
/// reference prototype's `barret()` (`research.py`), generalized from its
/// fixed width-64 case to any width via the same `p64` padding
/// `fold_constants` already uses for `k1`/`k2`.
fn barrett_reduce(v: u128, p64: u128, recip: u128) -> u128 {
    let v_hi = (v >> 64) as u64;
    let t1 = clmul_deg64(v_hi, recip);
    let t1_hi = (t1 >> 64) as u64;
    let t2 = clmul_deg64(t1_hi, p64);
    v ^ t2
}
