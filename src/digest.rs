//! An incremental, streaming convenience wrapper over the four raw entry
//! points -- no new algorithm, just a running-state holder.

use crate::fold::crc_calc;
use crate::model::Model;

/// An incremental CRC computation over a borrowed [`Model`].
///
/// `Digest` is a thin convenience layer: `update` dispatches to
/// [`crate::crc_calc`] and `finalize` applies `refout`/`xorout` per
/// [`Model::finalize`]. It introduces no behavior the four raw functions
/// don't already have.
#[derive(Debug, Clone)]
pub struct Digest<'m> {
    model: &'m Model,
    running: u64,
}

impl<'m> Digest<'m> {
    /// Starts a new digest seeded with the model's `init` value.
    pub fn new(model: &'m Model) -> Self {
        Digest {
            model,
            running: model.init(),
        }
    }

    /// Feeds more bytes into the digest.
    pub fn update(&mut self, buf: &[u8]) {
        self.running = crc_calc(self.model, self.running, buf);
    }

    /// Produces the check value for all bytes fed so far.
    pub fn finalize(&self) -> u64 {
        self.model.finalize(self.running)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn incremental_matches_one_shot() {
        let m = Model::compile(32, 0x04c11db7, 0xffffffff, true, true, 0xffffffff).unwrap();
        let data = b"123456789";

        let mut d = Digest::new(&m);
        d.update(&data[..4]);
        d.update(&data[4..]);
        assert_eq!(d.finalize(), 0xcbf43926);

        let mut whole = Digest::new(&m);
        whole.update(data);
        assert_eq!(whole.finalize(), 0xcbf43926);
    }
}
