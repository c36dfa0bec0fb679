//! The rolling checksum behind integrity stamps and multiplayer desync detection.

/// ## ChecksumAccumulator
///
/// A rotate-and-add rolling hash over a stream of 32-bit words:
///
/// ```text
/// hi    = (value >> 31) & 1
/// value = (value << 1) + word + hi
/// ```
///
/// All arithmetic wraps at 32 bits. This is not a polynomial CRC. It is order-sensitive, so two
/// peers only agree when they fold the same words in the same order. A mismatch is never raised
/// here; callers compare values produced independently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChecksumAccumulator {
    value: u32,
}

impl ChecksumAccumulator {
    pub fn new() -> Self {
        ChecksumAccumulator { value: 0 }
    }

    #[inline]
    pub fn fold(&mut self, word: u32) {
        let hi = (self.value >> 31) & 1;
        self.value = (self.value << 1).wrapping_add(word).wrapping_add(hi);
    }

    /// Folds every byte of `bytes` as its own word, in stream order.
    pub fn fold_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.fold(u32::from(*byte));
        }
    }

    pub fn clear(&mut self) {
        self.value = 0;
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Computes the integrity stamp of a whole buffer from a cleared accumulator.
    pub fn stamp(bytes: &[u8]) -> u32 {
        let mut accumulator = ChecksumAccumulator::new();
        accumulator.fold_bytes(bytes);
        accumulator.value()
    }
}
