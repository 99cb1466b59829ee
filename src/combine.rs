//! Algebraic combination of two CRCs without rescanning either buffer.
//!
//! `crc_combine(model, crcA, crcB, lenB)` computes the running CRC of
//! `A || B` given only the in-convention running CRCs of `A` and `B`
//! (neither `xorout`-applied, as produced by [`crate::crc_table`] or
//! [`crate::crc_calc`] seeded with `model.init()`) and the byte length of
//! `B`, via `combine_table`'s precomputed powers of `x`. Like `crc_table`
//! and `crc_calc`, the result is itself in-convention -- callers finish
//! with [`Model::finalize`].

use crate::gf2::reflect64;
use crate::model::{shift_by_bytes, Model};

/// Combines the in-convention running CRCs of two buffers `A` and `B`
/// (each computed independently, seeded with `model.init()`) into the
/// running CRC of their concatenation `A || B`, given only `lenB` (the
/// byte length of `B`) -- without rescanning either buffer's bytes. Does
/// not apply `refout` or `xorout`; chain further calls or finish with
/// [`Model::finalize`].
pub fn crc_combine(model: &Model, crc_a: u64, crc_b: u64, len_b: u64) -> u64 {
    let width = model.width;
    let p_native: u128 = (1u128 << width) | (model.poly as u128);

    // move into the native (non-reflected) domain, where combine_table's
    // powers of x were built.
    let to_native = |v: u64| -> u64 {
        if model.refin {
            reflect64(v, width)
        } else {
            v
        }
    };
    let crc_a_n = to_native(crc_a);
    let crc_b_n = to_native(crc_b);
    let init_n = to_native(model.init);

    // A(x) with its init contribution removed, shifted forward by B's
    // length, combined with B (whose own init contribution cancels by
    // linearity of the shift).
    let shifted = shift_by_bytes(crc_a_n ^ init_n, len_b, &model.combine_table, p_native, width);
    let result_n = shifted ^ crc_b_n;

    if model.refin {
        reflect64(result_n, width)
    } else {
        result_n
    }
}
