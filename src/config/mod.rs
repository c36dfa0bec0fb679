//! Line-oriented configuration text.
//!
//! The loader reads a source one line at a time and hands out whitespace/`=`-delimited tokens
//! from the current line. Block dispatch lives with the caller; `fields` provides the table-driven
//! helpers for the common `Field = value ... End` layout.
//!
//! When a transfer is attached, the raw bytes of every line read (without its line terminator,
//! comments included) are mirrored into it before the line is tokenized. Attaching a checksum pass
//! lets peers verify that they loaded byte-identical configuration.

pub mod fields;
mod tokens;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::ConfigError;
use crate::transfer::TransferUser;

pub use self::fields::*;

#[derive(Debug)]
struct Source {
    name: String,
    data: Vec<u8>,
    offset: usize,
    line_number: usize,
    line: String,
    cursor: usize,
}

pub struct ConfigLoader<'a> {
    source: Option<Source>,
    transfer: Option<&'a mut dyn TransferUser>,
}

impl<'a> Default for ConfigLoader<'a> {
    fn default() -> Self {
        ConfigLoader::new()
    }
}

impl<'a> ConfigLoader<'a> {
    pub fn new() -> Self {
        ConfigLoader {
            source: None,
            transfer: None,
        }
    }

    /// Mirrors every subsequently read line into `transfer`.
    pub fn attach_transfer(&mut self, transfer: &'a mut dyn TransferUser) {
        self.transfer = Some(transfer);
    }

    pub fn detach_transfer(&mut self) -> Option<&'a mut dyn TransferUser> {
        self.transfer.take()
    }

    pub fn open_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        self.ensure_closed()?;
        let data = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Io(e),
        })?;
        self.open_source(path.display().to_string(), data);
        Ok(())
    }

    pub fn open_str(&mut self, name: &str, text: &str) -> Result<(), ConfigError> {
        self.ensure_closed()?;
        self.open_source(name.to_owned(), text.as_bytes().to_vec());
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(source) = self.source.take() {
            log::debug!(
                "closed configuration `{}` after {} lines",
                source.name,
                source.line_number
            );
        }
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    pub fn file_name(&self) -> &str {
        self.source.as_ref().map_or("", |source| source.name.as_str())
    }

    /// One-based number of the current line, or 0 before the first line is read.
    pub fn line_number(&self) -> usize {
        self.source.as_ref().map_or(0, |source| source.line_number)
    }

    /// Advances to the next line. Returns `false` at the end of the source.
    pub fn read_line(&mut self) -> Result<bool, ConfigError> {
        let source = self.source.as_mut().ok_or(ConfigError::NotOpen)?;
        if source.offset >= source.data.len() {
            return Ok(false);
        }

        let rest = &source.data[source.offset..];
        let (raw_len, consumed) = match rest.iter().position(|b| *b == b'\n') {
            Some(newline) => (newline, newline + 1),
            None => (rest.len(), rest.len()),
        };
        let mut raw = rest[..raw_len].to_vec();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        source.offset += consumed;
        source.line_number += 1;

        if let Some(transfer) = self.transfer.as_mut() {
            transfer.transfer_user(&mut raw)?;
        }

        let text = String::from_utf8_lossy(&raw).into_owned();
        source.line = tokens::strip_comment(&text).to_owned();
        source.cursor = 0;
        Ok(true)
    }

    /// Next token on the current line, if any.
    pub fn next_token_opt(&mut self) -> Option<String> {
        let source = self.source.as_mut()?;
        let input = &source.line[source.cursor..];
        let (rest, token) = tokens::token(input).ok()?;
        let token = token.to_owned();
        source.cursor += input.len() - rest.len();
        Some(token)
    }

    pub fn next_token(&mut self) -> Result<String, ConfigError> {
        self.next_token_opt().ok_or_else(|| self.unexpected_end())
    }

    /// A `"`-delimited string, which may contain separators. An unquoted value falls back to a
    /// single token.
    pub fn next_quoted_string(&mut self) -> Result<String, ConfigError> {
        let source = self.source.as_mut().ok_or(ConfigError::NotOpen)?;
        let input = &source.line[source.cursor..];
        let quoted = tokens::quoted(input)
            .ok()
            .map(|(rest, text)| (input.len() - rest.len(), text.to_owned()));
        match quoted {
            Some((consumed, text)) => {
                source.cursor += consumed;
                Ok(text)
            }
            None => self.next_token(),
        }
    }

    pub fn unknown_token(&self, token: &str) -> ConfigError {
        ConfigError::UnknownToken {
            token: token.to_owned(),
            file: self.file_name().to_owned(),
            line: self.line_number(),
        }
    }

    pub fn invalid_value(&self, token: &str) -> ConfigError {
        ConfigError::InvalidValue {
            token: token.to_owned(),
            file: self.file_name().to_owned(),
            line: self.line_number(),
        }
    }

    pub fn unexpected_end(&self) -> ConfigError {
        ConfigError::UnexpectedEnd {
            file: self.file_name().to_owned(),
            line: self.line_number(),
        }
    }

    fn ensure_closed(&self) -> Result<(), ConfigError> {
        match &self.source {
            Some(source) => Err(ConfigError::AlreadyOpen {
                file: source.name.clone(),
            }),
            None => Ok(()),
        }
    }

    fn open_source(&mut self, name: String, data: Vec<u8>) {
        log::info!("loading configuration `{}` ({} bytes)", name, data.len());
        self.source = Some(Source {
            name,
            data,
            offset: 0,
            line_number: 0,
            line: String::new(),
            cursor: 0,
        });
    }
}
