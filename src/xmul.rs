//! Carry-less multiplication backends
//!
//! `xmul64` multiplies two 64-bit polynomials in GF(2)[x], producing the
//! full (up to) 128-bit product with XOR standing in for addition. Hardware
//! support (pclmulqdq on x86_64, pmull on aarch64) is dispatched at compile
//! time when the target feature is present; otherwise a bit-by-bit fallback
//! is used. Correctness never depends on which path runs, only throughput
//! does -- the folding engine and Barrett reduction call `xmul64` alone.

use cfg_if::cfg_if;

/// x86_64 provides 64-bit xmul via the pclmulqdq instruction
#[cfg(all(
    target_arch="x86_64",
    target_feature="pclmulqdq"
))]
#[inline]
fn pclmulqdq(a: u64, b: u64) -> u128 {
    use core::arch::x86_64::*;
    unsafe {
        let a = _mm_set_epi64x(0, a as i64);
        let b = _mm_set_epi64x(0, b as i64);
        let x = _mm_clmulepi64_si128::<0>(a, b);
        let x0 = _mm_extract_epi64::<0>(x) as u64;
        let x1 = _mm_extract_epi64::<1>(x) as u64;
        ((x1 as u128) << 64) | (x0 as u128)
    }
}

/// aarch64 provides 64-bit xmul via the pmull instruction
#[cfg(all(
    feature="nightly",
    target_arch="aarch64",
    target_feature="neon"
))]
#[inline]
fn pmull(a: u64, b: u64) -> u128 {
    use core::arch::aarch64::*;
    unsafe {
        vmull_p64(a, b)
    }
}

/// Naive bit-by-bit carry-less multiply: shift-and-xor over every set bit
/// of `a`. Used whenever no hardware xmul instruction is available, and
/// unconditionally when `no-xmul` is enabled.
#[inline]
fn naive(a: u64, b: u64) -> u128 {
    let mut c: u128 = 0;
    let b = b as u128;
    for i in 0..64 {
        if (a >> i) & 1 != 0 {
            c ^= b << i;
        }
    }
    c
}

/// Carry-less (GF(2)[x]) multiply of two 64-bit polynomials, returning the
/// up-to-127-bit product widened to 128 bits.
#[inline]
pub fn xmul64(a: u64, b: u64) -> u128 {
    cfg_if! {
        if #[cfg(feature="no-xmul")] {
            naive(a, b)
        } else if #[cfg(all(target_arch="x86_64", target_feature="pclmulqdq"))] {
            pclmulqdq(a, b)
        } else if #[cfg(all(feature="nightly", target_arch="aarch64", target_feature="neon"))] {
            pmull(a, b)
        } else {
            naive(a, b)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn matches_naive() {
        // clmul(0b1101, 0b1011) == 0b1111111
        assert_eq!(naive(0b1101, 0b1011), 0b1111111);
        assert_eq!(xmul64(0b1101, 0b1011), 0b1111111);
    }

    #[test]
    fn zero() {
        assert_eq!(xmul64(0, 0xffffffffffffffff), 0);
        assert_eq!(xmul64(0xffffffffffffffff, 0), 0);
    }

    #[test]
    fn identity() {
        assert_eq!(xmul64(1, 0x1234), 0x1234);
    }

    #[test]
    fn commutative() {
        assert_eq!(xmul64(0x12345678, 0x9abcdef0), xmul64(0x9abcdef0, 0x12345678));
    }
}
