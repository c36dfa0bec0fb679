//! The transfer protocol: one traversal of a data graph, run as a save, a load, or a checksum.
//!
//! An entity describes its state once, as an ordered sequence of calls on a `Transfer`. The
//! `TransferSink` behind the transfer decides what those calls mean:
//!
//! * `SaveWriter` writes every value to an output stream,
//! * `LoadReader` overwrites every value with the next one read from an input stream,
//! * `ChecksumFolder` folds every value into a running checksum and leaves it untouched.
//!
//! Because all three share one traversal, save, load and desync checking for an entity cannot
//! drift apart, provided the entity issues the same calls in the same order in every mode.
//!
//! Every primitive travels through the sink's byte channel in little-endian order. Composites are
//! fixed sequences of primitives, and containers follow the (version, count, elements) layout in
//! `container`.

pub mod checksum;
mod container;
pub mod load;
pub mod save;

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use num_traits::ToPrimitive;
use serde_derive::{Deserialize, Serialize};

use crate::error::{Result, TransferError};
use crate::symbols::{CaseMode, Symbol, SymbolTable};

pub use self::checksum::ChecksumFolder;
pub use self::container::CONTAINER_VERSION;
pub use self::load::LoadReader;
pub use self::save::SaveWriter;

pub type TransferVersion = u8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Uninitialized,
    Save,
    Load,
    Checksum,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Uninitialized
    }
}

/// Option bits carried by a transfer pass.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferOptions(u32);

impl TransferOptions {
    pub const NONE: TransferOptions = TransferOptions(0);
    /// Skip the post-load fixup pass after a snapshot has been loaded.
    pub const NO_POST_PROCESSING: TransferOptions = TransferOptions(1 << 0);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: TransferOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, other: TransferOptions) {
        self.0 |= other.0;
    }

    pub fn clear(&mut self, other: TransferOptions) {
        self.0 &= !other.0;
    }
}

impl BitOr for TransferOptions {
    type Output = TransferOptions;

    fn bitor(self, rhs: TransferOptions) -> TransferOptions {
        TransferOptions(self.0 | rhs.0)
    }
}

impl BitAnd for TransferOptions {
    type Output = TransferOptions;

    fn bitand(self, rhs: TransferOptions) -> TransferOptions {
        TransferOptions(self.0 & rhs.0)
    }
}

impl Not for TransferOptions {
    type Output = TransferOptions;

    fn not(self) -> TransferOptions {
        TransferOptions(!self.0)
    }
}

impl fmt::Debug for TransferOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransferOptions({:#b})", self.0)
    }
}

/// ## TransferSink
///
/// The per-mode half of a transfer. A sink only ever sees raw bytes: `transfer_bytes` either
/// writes `data`, fills `data` from its input, or folds `data` into a checksum. Typed primitives,
/// strings, composites and containers are all built on top of it by `Transfer`, so a new
/// primitive never needs a new sink method.
pub trait TransferSink {
    fn mode(&self) -> Mode;

    fn open(&mut self, _identifier: &str) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Starts a length-prefixed region. Sinks that read return the stored length of the region.
    fn begin_block(&mut self) -> Result<usize>;

    fn end_block(&mut self) -> Result<()>;

    /// Jumps over `len` bytes of input.
    fn skip(&mut self, len: usize) -> Result<()>;

    fn transfer_bytes(&mut self, data: &mut [u8]) -> Result<()>;
}

/// Per-type transfer. Implementors issue the same sequence of calls on `xfer` in every mode.
pub trait Transferable {
    fn transfer<S: TransferSink>(&mut self, xfer: &mut Transfer<S>) -> Result<()>;
}

/// Raw access to a transfer's byte channel, for collaborators that only mirror bytes into an
/// active pass without caring about its sink type.
pub trait TransferUser {
    fn transfer_user(&mut self, data: &mut [u8]) -> Result<()>;
}

macro_rules! transfer_primitive {
    ($($(#[$meta:meta])* $name:ident => $ty:ty),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(&mut self, value: &mut $ty) -> Result<()> {
                let mut bytes = value.to_le_bytes();
                self.transfer_bytes(stringify!($name), &mut bytes)?;
                *value = <$ty>::from_le_bytes(bytes);
                Ok(())
            }
        )*
    };
}

/// ## Transfer
///
/// A single pass over a data graph.
///
/// ```text
/// Uninitialized --open(identifier)--> open --(transfers...)--> close() --> Uninitialized
/// ```
///
/// The mode is taken from the sink on `open` and fixed until `close`. Any operation issued while
/// the pass is not open fails with `TransferError::UnknownMode`.
pub struct Transfer<S> {
    sink: S,
    mode: Mode,
    identifier: String,
    options: TransferOptions,
}

impl<S: TransferSink> Transfer<S> {
    pub fn new(sink: S) -> Self {
        Transfer {
            sink,
            mode: Mode::Uninitialized,
            identifier: String::new(),
            options: TransferOptions::NONE,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn options(&self) -> TransferOptions {
        self.options
    }

    pub fn set_options(&mut self, options: TransferOptions) {
        self.options.set(options);
    }

    pub fn clear_options(&mut self, options: TransferOptions) {
        self.options.clear(options);
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn open(&mut self, identifier: &str) -> Result<()> {
        if self.mode != Mode::Uninitialized {
            return Err(TransferError::AlreadyOpen {
                identifier: self.identifier.clone(),
            });
        }
        let mode = self.sink.mode();
        if mode == Mode::Uninitialized {
            return Err(TransferError::UnknownMode { operation: "open" });
        }
        self.sink.open(identifier)?;
        self.mode = mode;
        self.identifier = identifier.to_owned();
        log::debug!("opened {:?} pass `{}`", mode, identifier);
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        self.dispatch("close")?;
        self.sink.close()?;
        log::debug!("closed {:?} pass `{}`", self.mode, self.identifier);
        self.mode = Mode::Uninitialized;
        Ok(())
    }

    /// Starts a length-prefixed region. In `Load` mode, returns the stored length of the region so
    /// the caller can `skip` data it does not understand.
    pub fn begin_block(&mut self) -> Result<usize> {
        self.dispatch("begin_block")?;
        let len = self.sink.begin_block()?;
        log::trace!("begin block ({} bytes)", len);
        Ok(len)
    }

    pub fn end_block(&mut self) -> Result<()> {
        self.dispatch("end_block")?;
        self.sink.end_block()
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.dispatch("skip")?;
        self.sink.skip(len)
    }

    transfer_primitive! {
        transfer_i8 => i8,
        transfer_u8 => u8,
        transfer_i16 => i16,
        transfer_u16 => u16,
        transfer_i32 => i32,
        transfer_u32 => u32,
        transfer_i64 => i64,
        transfer_u64 => u64,
        /// IEEE-754 single precision, bit-exact.
        transfer_f32 => f32,
    }

    /// One byte: 0 or 1 when written; any non-zero byte loads as `true`.
    pub fn transfer_bool(&mut self, value: &mut bool) -> Result<()> {
        let mut byte = [*value as u8];
        self.transfer_bytes("transfer_bool", &mut byte)?;
        *value = byte[0] != 0;
        Ok(())
    }

    /// Transfers a version byte, then rejects data written by a newer schema than `current`.
    pub fn transfer_version(
        &mut self,
        stored: &mut TransferVersion,
        current: TransferVersion,
    ) -> Result<()> {
        self.transfer_u8(stored)?;
        if *stored > current {
            return Err(TransferError::SchemaVersionTooNew {
                stored: *stored,
                current,
            });
        }
        Ok(())
    }

    /// Arbitrary bytes, moved as-is. The caller owns the length.
    pub fn transfer_user(&mut self, data: &mut [u8]) -> Result<()> {
        self.transfer_bytes("transfer_user", data)
    }

    /// Text as UTF-16LE code units, preceded by a `u16` count of units.
    ///
    /// On load the destination's previous contents are ignored and replaced.
    pub fn transfer_string(&mut self, value: &mut String) -> Result<()> {
        let mode = self.dispatch("transfer_string")?;
        let units: Vec<u16> = match mode {
            Mode::Load => Vec::new(),
            _ => value.encode_utf16().collect(),
        };
        let mut count = units
            .len()
            .to_u16()
            .ok_or(TransferError::StringTooLong { len: units.len() })?;
        self.transfer_u16(&mut count)?;

        let mut bytes = vec![0u8; usize::from(count) * 2];
        for (chunk, unit) in bytes.chunks_exact_mut(2).zip(units) {
            chunk.copy_from_slice(&unit.to_le_bytes());
        }
        self.transfer_bytes("transfer_string", &mut bytes)?;

        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect();
        *value = String::from_utf16(&units).map_err(|_| TransferError::InvalidString)?;
        Ok(())
    }

    /// ASCII text as single bytes, preceded by a `u16` byte count.
    pub fn transfer_ascii_string(&mut self, value: &mut String) -> Result<()> {
        let mode = self.dispatch("transfer_ascii_string")?;
        if mode != Mode::Load && !value.is_ascii() {
            return Err(TransferError::InvalidString);
        }
        let source = match mode {
            Mode::Load => "",
            _ => value.as_str(),
        };
        let mut count = source
            .len()
            .to_u16()
            .ok_or(TransferError::StringTooLong { len: source.len() })?;
        self.transfer_u16(&mut count)?;

        let mut bytes = vec![0u8; usize::from(count)];
        for (slot, byte) in bytes.iter_mut().zip(source.bytes()) {
            *slot = byte;
        }
        self.transfer_bytes("transfer_ascii_string", &mut bytes)?;

        if !bytes.is_ascii() {
            return Err(TransferError::InvalidString);
        }
        *value = String::from_utf8(bytes).map_err(|_| TransferError::InvalidString)?;
        Ok(())
    }

    /// The raw 4-byte key. Only meaningful to a reader sharing the writer's table generation.
    pub fn transfer_symbol_key(&mut self, symbol: &mut Symbol) -> Result<()> {
        let mut key = symbol.key();
        self.transfer_u32(&mut key)?;
        *symbol = Symbol::from_key(key);
        Ok(())
    }

    /// The symbol's name, re-interned into `table` on load. Survives table resets and process
    /// restarts. An invalid or unknown symbol travels as the empty name and loads as invalid.
    pub fn transfer_symbol_name(
        &mut self,
        symbol: &mut Symbol,
        table: &mut SymbolTable,
        case_mode: CaseMode,
    ) -> Result<()> {
        let mode = self.dispatch("transfer_symbol_name")?;
        let mut name = match mode {
            Mode::Load => String::new(),
            _ => table.resolve(*symbol).unwrap_or_default().to_owned(),
        };
        self.transfer_ascii_string(&mut name)?;
        if mode == Mode::Load {
            *symbol = if name.is_empty() {
                Symbol::INVALID
            } else {
                table.intern(&name, case_mode)
            };
        }
        Ok(())
    }

    pub fn transfer_value<T: Transferable>(&mut self, value: &mut T) -> Result<()> {
        value.transfer(self)
    }

    fn transfer_bytes(&mut self, operation: &'static str, data: &mut [u8]) -> Result<()> {
        self.dispatch(operation)?;
        self.sink.transfer_bytes(data)
    }

    fn dispatch(&self, operation: &'static str) -> Result<Mode> {
        match self.mode {
            Mode::Uninitialized => Err(TransferError::UnknownMode { operation }),
            mode => Ok(mode),
        }
    }
}

impl<S: TransferSink> TransferUser for Transfer<S> {
    fn transfer_user(&mut self, data: &mut [u8]) -> Result<()> {
        Transfer::transfer_user(self, data)
    }
}

macro_rules! transferable_primitive {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl Transferable for $ty {
                fn transfer<S: TransferSink>(&mut self, xfer: &mut Transfer<S>) -> Result<()> {
                    xfer.$method(self)
                }
            }
        )*
    };
}

transferable_primitive! {
    i8 => transfer_i8,
    u8 => transfer_u8,
    i16 => transfer_i16,
    u16 => transfer_u16,
    i32 => transfer_i32,
    u32 => transfer_u32,
    i64 => transfer_i64,
    u64 => transfer_u64,
    f32 => transfer_f32,
    bool => transfer_bool,
    String => transfer_string,
    Symbol => transfer_symbol_key,
}
