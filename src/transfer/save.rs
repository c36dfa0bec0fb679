use std::io::{Seek, SeekFrom, Write};

use num_traits::ToPrimitive;

use super::{Mode, TransferSink};
use crate::error::{Result, TransferError};

/// ## SaveWriter
///
/// The Save-mode sink. Bytes are written to the underlying stream as they arrive.
///
/// A block is written as a 4-byte little-endian length followed by its contents. The length is a
/// placeholder until `end_block`, which seeks back and patches it, so blocks may nest.
///
/// ```text
/// +-------------+----------------------+
/// | len u32 LE  |   len bytes of data  |
/// +-------------+----------------------+
/// ```
#[derive(Debug)]
pub struct SaveWriter<W> {
    inner: W,
    blocks: Vec<u64>,
}

impl<W: Write + Seek> SaveWriter<W> {
    pub fn new(inner: W) -> Self {
        SaveWriter {
            inner,
            blocks: Vec::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Seek> TransferSink for SaveWriter<W> {
    fn mode(&self) -> Mode {
        Mode::Save
    }

    fn close(&mut self) -> Result<()> {
        if !self.blocks.is_empty() {
            return Err(TransferError::UnclosedBlock {
                depth: self.blocks.len(),
            });
        }
        self.inner.flush()?;
        Ok(())
    }

    fn begin_block(&mut self) -> Result<usize> {
        let start = self.inner.seek(SeekFrom::Current(0))?;
        self.inner.write_all(&0u32.to_le_bytes())?;
        self.blocks.push(start);
        Ok(0)
    }

    fn end_block(&mut self) -> Result<()> {
        let start = self.blocks.pop().ok_or(TransferError::BlockUnderflow)?;
        let end = self.inner.seek(SeekFrom::Current(0))?;
        // the length excludes its own four bytes
        let len = end - start - 4;
        let len = len.to_u32().ok_or(TransferError::BlockTooLarge { len })?;
        self.inner.seek(SeekFrom::Start(start))?;
        self.inner.write_all(&len.to_le_bytes())?;
        self.inner.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    fn skip(&mut self, _len: usize) -> Result<()> {
        Err(TransferError::SkipUnsupported { mode: Mode::Save })
    }

    fn transfer_bytes(&mut self, data: &mut [u8]) -> Result<()> {
        self.inner.write_all(data)?;
        Ok(())
    }
}
