//! Source buffers and byte spans.
//!
//! A [`Source`] is an immutable byte sequence plus an optional file path.
//! Positions are zero-based byte offsets; line and column numbers are
//! computed on demand when a diagnostic needs to be rendered.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error raised while loading a source buffer.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A half-open byte range into a source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// An immutable source buffer.
#[derive(Debug, Clone)]
pub struct Source {
    path: Option<PathBuf>,
    bytes: Vec<u8>,
}

impl Source {
    /// Read an entire file into memory as raw bytes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            bytes,
        })
    }

    /// Wrap in-memory text, e.g. from a CLI argument or a test.
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            path: None,
            bytes: text.into().into_bytes(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Name used when rendering diagnostics.
    pub fn display_name(&self) -> Cow<'_, str> {
        match &self.path {
            Some(path) => path.to_string_lossy(),
            None => Cow::Borrowed("<inline>"),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    /// 1-based line and byte column of `offset`.
    ///
    /// Lines are delimited by `\n`; the column counts bytes from the start
    /// of the line. An offset at end-of-source resolves to the position just
    /// past the last byte.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.bytes.len());
        let mut line = 1;
        let mut line_start = 0;
        for (index, &byte) in self.bytes[..offset].iter().enumerate() {
            if byte == b'\n' {
                line += 1;
                line_start = index + 1;
            }
        }
        (line, offset - line_start + 1)
    }

    /// The full line containing `offset`, without its trailing newline.
    pub fn line_at(&self, offset: usize) -> &[u8] {
        let offset = offset.min(self.bytes.len());
        let start = self.bytes[..offset]
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|index| index + 1)
            .unwrap_or(0);
        let end = self.bytes[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|index| offset + index)
            .unwrap_or(self.bytes.len());
        &self.bytes[start..end]
    }
}
