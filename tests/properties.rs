//! Property-based coverage of the chunking/associativity and the
//! table/CLMUL-agreement properties across randomly generated models and
//! buffers, complementing the fixed catalog in `tests/catalog.rs`.

use crc_clmul::{crc_calc, crc_table, Model};
use proptest::prelude::*;

fn arb_model() -> impl Strategy<Value = Model> {
    (1u32..=64, any::<bool>(), any::<bool>()).prop_flat_map(|(width, refin, refout)| {
        let mask = if width == 64 {
            u64::MAX
        } else {
            (1u64 << width) - 1
        };
        (0..=mask, 0..=mask, 0..=mask).prop_map(move |(poly, init, xorout)| {
            // a zero polynomial degenerates the field (every reduction is a
            // no-op); bump it to 1 so every generated model is well-formed.
            let poly = if poly == 0 { 1 } else { poly };
            Model::compile(width, poly, init, refin, refout, xorout).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn table_and_calc_agree(
        model in arb_model(),
        data in prop::collection::vec(any::<u8>(), 0..600),
    ) {
        let via_table = crc_table(&model, model.init(), &data);
        let via_calc = crc_calc(&model, model.init(), &data);
        prop_assert_eq!(via_table, via_calc);
    }

    #[test]
    fn chunking_is_associative(
        model in arb_model(),
        data in prop::collection::vec(any::<u8>(), 0..600),
        split in 0usize..600,
    ) {
        let split = split.min(data.len());
        let whole = crc_calc(&model, model.init(), &data);
        let (a, b) = data.split_at(split);
        let partial = crc_calc(&model, model.init(), a);
        let chunked = crc_calc(&model, partial, b);
        prop_assert_eq!(whole, chunked);
    }

    #[test]
    fn empty_input_is_identity(model in arb_model(), crc in any::<u64>()) {
        let mask = if model.width() == 64 { u64::MAX } else { (1u64 << model.width()) - 1 };
        let crc = crc & mask;
        prop_assert_eq!(crc_table(&model, crc, &[]), crc);
        prop_assert_eq!(crc_calc(&model, crc, &[]), crc);
    }
}
