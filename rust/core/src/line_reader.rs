// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tokenizing Line Reader
//!
//! Reads a whole surface file into memory once, then hands out lines split
//! into whitespace-delimited byte tokens. Buffering the complete file avoids
//! per-line system calls on multi-million point exports; line boundaries are
//! located with memchr.
//!
//! The reader is restartable: every call to [`LineReader::lines`] starts
//! again from the beginning of the buffer.

use std::path::{Path, PathBuf};

use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Number of leading lines sampled to estimate the average line length
const LINE_LENGTH_SAMPLE: usize = 100;

/// In-memory line source for a single surface file
#[derive(Debug, Clone)]
pub struct LineReader {
    path: Option<PathBuf>,
    buffer: Vec<u8>,
}

impl LineReader {
    /// Read the complete file at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let buffer = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            buffer,
        })
    }

    /// Wrap an already-read buffer
    pub fn from_bytes(buffer: impl Into<Vec<u8>>) -> Self {
        Self {
            path: None,
            buffer: buffer.into(),
        }
    }

    /// Source path, if the reader was opened from a file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Raw file contents
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Size of the buffered file in bytes
    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Iterate over all lines from the start of the buffer
    pub fn lines(&self) -> Lines<'_> {
        Lines {
            remaining: &self.buffer,
            number: 0,
        }
    }

    /// Estimate the number of lines from the file size and the average
    /// length of the first lines.
    ///
    /// Used only for progress reporting; may be off in either direction.
    pub fn estimated_line_count(&self) -> u64 {
        if self.buffer.is_empty() {
            return 0;
        }
        let mut sampled_lines = 0usize;
        let mut sampled_bytes = 0usize;
        for line in self.lines().take(LINE_LENGTH_SAMPLE) {
            sampled_lines += 1;
            sampled_bytes += line.raw_len();
        }
        let average = (sampled_bytes / sampled_lines.max(1)).max(1);
        (self.buffer.len() / average).max(sampled_lines) as u64
    }
}

/// Iterator over the lines of a [`LineReader`]
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    remaining: &'a [u8],
    number: usize,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }

        let (raw, rest) = match memchr::memchr(b'\n', self.remaining) {
            Some(pos) => (&self.remaining[..pos + 1], &self.remaining[pos + 1..]),
            None => (self.remaining, &self.remaining[self.remaining.len()..]),
        };
        self.remaining = rest;
        self.number += 1;

        Some(Line {
            number: self.number,
            raw_len: raw.len(),
            text: trim_line_ending(raw),
        })
    }
}

/// Strip a trailing `\n` or `\r\n`
#[inline]
fn trim_line_ending(raw: &[u8]) -> &[u8] {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && raw[end - 1] == b'\r' {
        end -= 1;
    }
    &raw[..end]
}

/// A single line of text
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    number: usize,
    raw_len: usize,
    text: &'a [u8],
}

impl<'a> Line<'a> {
    /// 1-based line number
    #[inline]
    pub fn number(&self) -> usize {
        self.number
    }

    /// Line contents without the line terminator
    #[inline]
    pub fn text(&self) -> &'a [u8] {
        self.text
    }

    /// Length in the buffer, including the terminator
    #[inline]
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    /// Check if the line holds nothing but whitespace
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.text.iter().all(|b| b.is_ascii_whitespace())
    }

    /// Iterate over whitespace-delimited tokens
    #[inline]
    pub fn tokens(&self) -> Tokens<'a> {
        split_tokens(self.text)
    }

    /// Collect tokens into a stack-allocated vector (typical lines fit inline)
    #[inline]
    pub fn token_vec(&self) -> SmallVec<[&'a [u8]; 16]> {
        self.tokens().collect()
    }
}

/// Split a byte buffer on ASCII whitespace, skipping empty tokens
#[inline]
pub fn split_tokens(bytes: &[u8]) -> Tokens<'_> {
    Tokens { remaining: bytes }
}

/// Iterator over whitespace-delimited tokens
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    remaining: &'a [u8],
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.remaining;
        let start = bytes.iter().position(|b| !b.is_ascii_whitespace())?;
        let len = bytes[start..]
            .iter()
            .position(|b| b.is_ascii_whitespace())
            .unwrap_or(bytes.len() - start);
        self.remaining = &bytes[start + len..];
        Some(&bytes[start..start + len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_and_tokens() {
        let reader = LineReader::from_bytes(&b"VRTX 1 0.0 0.0 0.0\r\n\n  TRGL\t1 2 3  \nEND"[..]);
        let lines: Vec<_> = reader.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].number(), 1);
        assert_eq!(lines[0].text(), b"VRTX 1 0.0 0.0 0.0");
        assert!(lines[1].is_blank());
        assert_eq!(lines[1].tokens().next(), None);

        let tokens = lines[2].token_vec();
        assert_eq!(tokens.as_slice(), &[&b"TRGL"[..], &b"1"[..], &b"2"[..], &b"3"[..]]);
        assert_eq!(lines[3].text(), b"END");
    }

    #[test]
    fn test_reader_is_restartable() {
        let reader = LineReader::from_bytes(&b"a\nb\nc\n"[..]);
        assert_eq!(reader.lines().count(), 3);
        assert_eq!(reader.lines().count(), 3);
        assert_eq!(reader.lines().next().unwrap().text(), b"a");
    }

    #[test]
    fn test_empty_buffer() {
        let reader = LineReader::from_bytes(Vec::new());
        assert_eq!(reader.lines().count(), 0);
        assert_eq!(reader.estimated_line_count(), 0);
    }

    #[test]
    fn test_estimated_line_count() {
        let content = "1.0 2.0 3.0\n".repeat(1000);
        let reader = LineReader::from_bytes(content.into_bytes());
        assert_eq!(reader.estimated_line_count(), 1000);
    }

    #[test]
    fn test_open_missing_file() {
        let result = LineReader::open(Path::new("/nonexistent/surface.ts"));
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }
}
