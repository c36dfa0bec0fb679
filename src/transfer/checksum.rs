use super::{Mode, TransferSink};
use crate::checksum::ChecksumAccumulator;
use crate::error::Result;

/// ## ChecksumFolder
///
/// The Checksum-mode sink. Every buffer handed to it is folded into one `ChecksumAccumulator`;
/// nothing is written anywhere and the transferred values are left untouched.
///
/// Word layout is part of the desync contract and does not depend on the host:
///
/// ```text
/// full words:  b0 b1 b2 b3   ->  b0 << 24 | b1 << 16 | b2 << 8 | b3   (big-endian)
/// 1-3 byte tail: b0 [b1 [b2]] ->  b0 | b1 << 8 | b2 << 16              (little-endian, low bytes)
/// ```
///
/// The accumulator is cleared when a pass is opened. Blocks carry no length here and `skip` is a
/// no-op, since there is no input to jump over.
#[derive(Clone, Debug, Default)]
pub struct ChecksumFolder {
    accumulator: ChecksumAccumulator,
}

impl ChecksumFolder {
    pub fn new() -> Self {
        ChecksumFolder {
            accumulator: ChecksumAccumulator::new(),
        }
    }

    pub fn value(&self) -> u32 {
        self.accumulator.value()
    }

    pub fn accumulator(&self) -> &ChecksumAccumulator {
        &self.accumulator
    }

    fn fold_buffer(&mut self, data: &[u8]) {
        let mut words = data.chunks_exact(4);
        for word in &mut words {
            self.accumulator
                .fold(u32::from_be_bytes([word[0], word[1], word[2], word[3]]));
        }

        let tail = words.remainder();
        if !tail.is_empty() {
            let packed = tail
                .iter()
                .enumerate()
                .fold(0u32, |acc, (i, byte)| acc | u32::from(*byte) << (i * 8));
            self.accumulator.fold(packed);
        }
    }
}

impl TransferSink for ChecksumFolder {
    fn mode(&self) -> Mode {
        Mode::Checksum
    }

    fn open(&mut self, _identifier: &str) -> Result<()> {
        self.accumulator.clear();
        Ok(())
    }

    fn begin_block(&mut self) -> Result<usize> {
        Ok(0)
    }

    fn end_block(&mut self) -> Result<()> {
        Ok(())
    }

    fn skip(&mut self, _len: usize) -> Result<()> {
        Ok(())
    }

    fn transfer_bytes(&mut self, data: &mut [u8]) -> Result<()> {
        self.fold_buffer(data);
        Ok(())
    }
}
