use std::path::PathBuf;

use thiserror::Error;

use crate::transfer::Mode;

pub type Result<T, E = TransferError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("stored schema version {stored} is newer than supported version {current}")]
    SchemaVersionTooNew { stored: u8, current: u8 },
    #[error("destination container must be empty before it is loaded")]
    ContainerNotEmptyOnLoad,
    #[error("container of {len} elements exceeds the 16-bit element count")]
    ContainerTooLarge { len: usize },
    #[error("`{operation}` dispatched in unknown transfer mode")]
    UnknownMode { operation: &'static str },
    #[error("transfer pass `{identifier}` is already open")]
    AlreadyOpen { identifier: String },
    #[error("end_block without a matching begin_block")]
    BlockUnderflow,
    #[error("block of {len} bytes exceeds the 32-bit block length")]
    BlockTooLarge { len: u64 },
    #[error("pass closed with {depth} unterminated blocks")]
    UnclosedBlock { depth: usize },
    #[error("skip is not supported in {mode:?} mode")]
    SkipUnsupported { mode: Mode },
    #[error("string of {len} units exceeds the transferable length")]
    StringTooLong { len: usize },
    #[error("transferred string is not valid text")]
    InvalidString,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown token `{token}` in {file} at line {line}")]
    UnknownToken {
        token: String,
        file: String,
        line: usize,
    },
    #[error("invalid value `{token}` in {file} at line {line}")]
    InvalidValue {
        token: String,
        file: String,
        line: usize,
    },
    #[error("unexpected end of input in {file} at line {line}")]
    UnexpectedEnd { file: String, line: usize },
    #[error("configuration file {path:?} not found")]
    FileNotFound { path: PathBuf },
    #[error("configuration source `{file}` is already open")]
    AlreadyOpen { file: String },
    #[error("no configuration source is open")]
    NotOpen,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}
