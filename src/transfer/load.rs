use std::convert::TryFrom;
use std::io::{Read, Seek, SeekFrom};

use super::{Mode, TransferSink};
use crate::error::Result;

/// ## LoadReader
///
/// The Load-mode sink. Each transfer fills its buffer from the underlying stream. Blocks report
/// their stored length so that a reader can `skip` regions written by a newer schema.
#[derive(Debug)]
pub struct LoadReader<R> {
    inner: R,
}

impl<R: Read + Seek> LoadReader<R> {
    pub fn new(inner: R) -> Self {
        LoadReader { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> TransferSink for LoadReader<R> {
    fn mode(&self) -> Mode {
        Mode::Load
    }

    fn begin_block(&mut self) -> Result<usize> {
        let mut len = [0u8; 4];
        self.inner.read_exact(&mut len)?;
        Ok(u32::from_le_bytes(len) as usize)
    }

    fn end_block(&mut self) -> Result<()> {
        Ok(())
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        let offset = i64::try_from(len).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "skip length out of range")
        })?;
        self.inner.seek(SeekFrom::Current(offset))?;
        Ok(())
    }

    fn transfer_bytes(&mut self, data: &mut [u8]) -> Result<()> {
        self.inner.read_exact(data)?;
        Ok(())
    }
}
