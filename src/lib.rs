// Copyright 2019 The state_xfer Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Deterministic state transfer.
//!
//! One declarative traversal per entity, run three ways: saved to a stream, loaded back from one,
//! or folded into a rolling checksum that peers compare to detect desyncs. Names referenced by
//! transferred state are interned into small integer `Symbol`s by a `SymbolTable` owned by the
//! session's `StateContext`.
pub mod checksum;
pub mod config;
pub mod context;
pub mod error;
pub mod snapshot;
pub mod symbols;
pub mod transfer;
pub mod types;

#[cfg(test)]
mod tests;

pub use checksum::ChecksumAccumulator;
pub use context::{StateContext, StateContextConfig};
pub use error::{ConfigError, Result, TransferError};
pub use snapshot::{checksum_snapshot, load_snapshot, save_snapshot, Snapshot};
pub use symbols::{CaseMode, StaticSymbol, Symbol, SymbolTable, SymbolTableConfig};
pub use transfer::{
    ChecksumFolder, LoadReader, Mode, SaveWriter, Transfer, TransferOptions, TransferSink,
    TransferVersion, Transferable,
};
