//! Top-level save, load and checksum drivers.

use std::io::Cursor;

use crate::context::StateContext;
use crate::error::Result;
use crate::transfer::{
    ChecksumFolder, LoadReader, SaveWriter, Transfer, TransferOptions, TransferSink,
};

/// State that can be saved, loaded and checksummed through one traversal.
pub trait Snapshot {
    /// Issues the same ordered sequence of transfers in every mode.
    fn transfer_state<S: TransferSink>(
        &mut self,
        xfer: &mut Transfer<S>,
        context: &mut StateContext,
    ) -> Result<()>;

    /// Runs after a successful load, once all state is in place, to rebuild anything derived from
    /// it (caches, cross references). Skipped when `NO_POST_PROCESSING` is set.
    fn load_post_process(&mut self, _context: &mut StateContext) -> Result<()> {
        Ok(())
    }
}

fn run_pass<S, T>(
    xfer: &mut Transfer<S>,
    value: &mut T,
    context: &mut StateContext,
    identifier: &str,
) -> Result<()>
where
    S: TransferSink,
    T: Snapshot,
{
    xfer.open(identifier)?;
    let result = value
        .transfer_state(xfer, context)
        .and_then(|_| xfer.close());
    if let Err(e) = &result {
        log::error!("{:?} pass `{}` failed: {}", xfer.mode(), identifier, e);
    }
    result
}

pub fn save_snapshot<T: Snapshot>(
    value: &mut T,
    context: &mut StateContext,
    identifier: &str,
) -> Result<Vec<u8>> {
    let mut xfer = Transfer::new(SaveWriter::new(Cursor::new(Vec::new())));
    run_pass(&mut xfer, value, context, identifier)?;
    Ok(xfer.into_sink().into_inner().into_inner())
}

/// Loads `value` from `bytes`. On failure `value` is left partially loaded and must be discarded.
pub fn load_snapshot<T: Snapshot>(
    value: &mut T,
    context: &mut StateContext,
    bytes: &[u8],
    identifier: &str,
    options: TransferOptions,
) -> Result<()> {
    let mut xfer = Transfer::new(LoadReader::new(Cursor::new(bytes)));
    xfer.set_options(options);
    run_pass(&mut xfer, value, context, identifier)?;
    if xfer.options().contains(TransferOptions::NO_POST_PROCESSING) {
        log::debug!("skipping post processing for `{}`", identifier);
        return Ok(());
    }
    value.load_post_process(context)
}

pub fn checksum_snapshot<T: Snapshot>(
    value: &mut T,
    context: &mut StateContext,
    identifier: &str,
) -> Result<u32> {
    let mut xfer = Transfer::new(ChecksumFolder::new());
    run_pass(&mut xfer, value, context, identifier)?;
    Ok(xfer.sink().value())
}
