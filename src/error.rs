//! Errors reported at the sole fallible boundary, [`crate::Model::compile`].

use thiserror::Error;

/// Precondition violations rejected by [`crate::Model::compile`]. Nothing
/// past this boundary is fallible: `crc_table`, `crc_calc` and `crc_combine`
/// operate on an already-validated `Model` and never panic.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcError {
    /// `width` must be in `1..=64`.
    #[error("width {width} out of range 1..=64")]
    WidthOutOfRange {
        /// the rejected width
        width: u32,
    },

    /// `poly` must fit in `width` bits.
    #[error("polynomial 0x{poly:x} does not fit in {width} bits")]
    PolyTooWide {
        /// the rejected polynomial
        poly: u64,
        /// the model's width
        width: u32,
    },

    /// `init` must fit in `width` bits.
    #[error("init 0x{init:x} does not fit in {width} bits")]
    InitTooWide {
        /// the rejected init value
        init: u64,
        /// the model's width
        width: u32,
    },

    /// `xorout` must fit in `width` bits.
    #[error("xorout 0x{xorout:x} does not fit in {width} bits")]
    XoroutTooWide {
        /// the rejected xorout value
        xorout: u64,
        /// the model's width
        width: u32,
    },
}
