// Input streams
//
//  Copyright (C) 2014-2023 Ryan Specialty, LLC.
//
//  This file is part of retrace.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Source of input for the scanner.
//!
//! An [`InputStream`] is a queue of _units_,
//!   each of which is either a byte of text or a pre-built tree node
//!   (see [`Unit`]).
//! Units are buffered from an optional [`Read`] source on demand,
//!   and may additionally be pushed onto the head of the stream by
//!   semantic actions so that they are scanned before anything that was
//!   already buffered.
//!
//! Every operation that changes the stream has an exact inverse:
//!
//!   - [`InputStream::extract`] is undone by [`InputStream::undo_extract`];
//!   - [`InputStream::take_tree`] is undone by
//!       [`InputStream::untake_tree`]; and
//!   - [`InputStream::push_text`] and [`InputStream::push_tree`] are undone
//!       by [`InputStream::pushback`].
//!
//! Inverses must be applied in the reverse order of the operations they
//!   undo,
//!     which is exactly what the parser's reverse log guarantees.
//!
//! The current [`Position`] advances only when text is consumed;
//!   pushing units onto the stream does not move it.

use crate::{global, span::Position, tree::NodeId};
use std::{
    collections::VecDeque,
    fmt::Debug,
    io::{self, Read},
};

/// A single unit of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Byte(u8),

    /// A tree pushed into the stream,
    ///   to be delivered to the parser as a single token.
    Tree { node: NodeId, ignore: bool },
}

/// Text consumed from the head of a stream.
///
/// This carries everything necessary to put the text back via
///   [`InputStream::undo_extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub text: Box<[u8]>,
    pub start: Position,
}

#[derive(Debug)]
enum Run {
    /// Text beginning at offset `head` of `data`.
    Text { data: Vec<u8>, head: usize },
    Tree { node: NodeId, ignore: bool },
}

impl Run {
    fn text(data: Vec<u8>) -> Self {
        Self::Text { data, head: 0 }
    }

    fn units(&self) -> usize {
        match self {
            Self::Text { data, head } => data.len() - head,
            Self::Tree { .. } => 1,
        }
    }
}

/// Queue of input units with exact position tracking.
///
/// See the [module-level documentation](self) for more information.
pub struct InputStream {
    runs: VecDeque<Run>,
    source: Option<Box<dyn Read>>,

    /// The source has reported end of input,
    ///   or there never was a source.
    source_eof: bool,

    pos: Position,
}

impl InputStream {
    /// A stream with nothing buffered and no source.
    pub fn empty() -> Self {
        Self {
            runs: VecDeque::new(),
            source: None,
            source_eof: true,
            pos: Position::START,
        }
    }

    /// A stream consisting entirely of `data`.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        let mut stream = Self::empty();
        stream.append_text(data.into());
        stream
    }

    /// A stream that is read from `source` in
    ///   [`global::STREAM_READ_LEN`]-byte chunks as the scanner requires
    ///   more input.
    pub fn from_reader<R: Read + 'static>(source: R) -> Self {
        Self {
            source: Some(Box::new(source)),
            source_eof: false,
            ..Self::empty()
        }
    }

    fn append_text(&mut self, data: Vec<u8>) {
        if !data.is_empty() {
            self.runs.push_back(Run::text(data));
        }
    }

    /// Read at least `n` more bytes from the source into the buffer,
    ///   returning the number of bytes actually read.
    ///
    /// Fewer than `n` bytes are read only if the source is exhausted.
    pub fn pull(&mut self, n: usize) -> io::Result<usize> {
        let mut total = 0;

        while total < n && !self.source_eof {
            let source = match self.source.as_mut() {
                Some(source) => source,
                None => {
                    self.source_eof = true;
                    break;
                }
            };

            let mut chunk = vec![0; global::STREAM_READ_LEN.max(n - total)];

            match source.read(&mut chunk) {
                Ok(0) => self.source_eof = true,
                Ok(len) => {
                    chunk.truncate(len);
                    self.append_text(chunk);
                    total += len;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => (),
                Err(e) => return Err(e),
            }
        }

        Ok(total)
    }

    /// The unit `offset` units from the head of the stream,
    ///   pulling from the source as necessary.
    ///
    /// [`None`] indicates that the stream ends before `offset`.
    pub fn peek(&mut self, offset: usize) -> io::Result<Option<Unit>> {
        while self.buffered_len() <= offset && !self.source_eof {
            self.pull(offset + 1 - self.buffered_len())?;
        }

        let mut rest = offset;

        for run in &self.runs {
            match run {
                Run::Text { data, head } if rest < data.len() - head => {
                    return Ok(Some(Unit::Byte(data[head + rest])));
                }
                Run::Tree { node, ignore } if rest == 0 => {
                    return Ok(Some(Unit::Tree {
                        node: *node,
                        ignore: *ignore,
                    }));
                }
                _ => rest -= run.units(),
            }
        }

        Ok(None)
    }

    /// Consume up to `len` bytes of text from the head of the stream,
    ///   advancing the current position.
    ///
    /// Consumption stops early at a pushed tree or at the end of buffered
    ///   input;
    ///     the scanner never asks for more than it has peeked.
    pub fn extract(&mut self, len: usize) -> Extracted {
        let start = self.pos;
        let mut text = Vec::with_capacity(len);

        while text.len() < len {
            match self.runs.front_mut() {
                Some(Run::Text { data, head }) => {
                    let take = (len - text.len()).min(data.len() - *head);
                    text.extend_from_slice(&data[*head..*head + take]);
                    *head += take;

                    if *head == data.len() {
                        self.runs.pop_front();
                    }
                }
                Some(Run::Tree { .. }) | None => break,
            }
        }

        self.pos = start.advance(&text);

        Extracted {
            text: text.into(),
            start,
        }
    }

    /// Restore text consumed by [`Self::extract`].
    ///
    /// The position of the stream becomes `start`.
    pub fn undo_extract(&mut self, text: &[u8], start: Position) {
        if !text.is_empty() {
            self.runs.push_front(Run::text(text.to_vec()));
        }

        self.pos = start;
    }

    /// Consume a tree at the head of the stream,
    ///   if any.
    pub fn take_tree(&mut self) -> Option<(NodeId, bool)> {
        match self.runs.front() {
            Some(Run::Tree { node, ignore }) => {
                let taken = (*node, *ignore);
                self.runs.pop_front();
                Some(taken)
            }
            _ => None,
        }
    }

    /// Restore a tree consumed by [`Self::take_tree`].
    pub fn untake_tree(&mut self, node: NodeId, ignore: bool) {
        self.runs.push_front(Run::Tree { node, ignore });
    }

    /// Push text ahead of everything currently buffered.
    ///
    /// This occupies `text.len()` units for the purpose of
    ///   [`Self::pushback`].
    pub fn push_text(&mut self, text: &[u8]) {
        if !text.is_empty() {
            self.runs.push_front(Run::text(text.to_vec()));
        }
    }

    /// Push a tree ahead of everything currently buffered.
    ///
    /// This occupies a single unit for the purpose of [`Self::pushback`].
    pub fn push_tree(&mut self, node: NodeId, ignore: bool) {
        self.runs.push_front(Run::Tree { node, ignore });
    }

    /// Remove `units` units from the head of the stream,
    ///   undoing the most recent pushes.
    ///
    /// The position is not affected.
    /// Returns the number of units actually removed,
    ///   which is fewer than `units` only if the buffer ran out.
    pub fn pushback(&mut self, units: usize) -> usize {
        let mut removed = 0;

        while removed < units {
            let Some(run) = self.runs.front_mut() else {
                break;
            };

            match run {
                Run::Text { data, head } => {
                    let take = (units - removed).min(data.len() - *head);
                    *head += take;
                    removed += take;

                    if *head == data.len() {
                        self.runs.pop_front();
                    }
                }
                Run::Tree { .. } => {
                    self.runs.pop_front();
                    removed += 1;
                }
            }
        }

        removed
    }

    /// Position of the next unit to be consumed.
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Whether the stream is exhausted,
    ///   with nothing buffered and nothing left to read.
    pub fn is_eof(&self) -> bool {
        self.source_eof && self.runs.is_empty()
    }

    /// Number of units currently buffered.
    pub fn buffered_len(&self) -> usize {
        self.runs.iter().map(Run::units).sum()
    }

    /// Buffered units in stream order,
    ///   without pulling from the source.
    pub fn buffered(&self) -> impl Iterator<Item = Unit> + '_ {
        self.runs.iter().flat_map(|run| {
            let (bytes, tree) = match run {
                Run::Text { data, head } => (&data[*head..], None),
                Run::Tree { node, ignore } => (
                    &[][..],
                    Some(Unit::Tree {
                        node: *node,
                        ignore: *ignore,
                    }),
                ),
            };

            bytes.iter().copied().map(Unit::Byte).chain(tree)
        })
    }

    /// Buffered text,
    ///   skipping any trees.
    pub fn remaining_text(&self) -> Vec<u8> {
        self.buffered()
            .filter_map(|unit| match unit {
                Unit::Byte(b) => Some(b),
                Unit::Tree { .. } => None,
            })
            .collect()
    }
}

impl Default for InputStream {
    fn default() -> Self {
        Self::empty()
    }
}

impl Debug for InputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputStream")
            .field("runs", &self.runs)
            .field("source", &self.source.as_ref().map(|_| "dyn Read"))
            .field("source_eof", &self.source_eof)
            .field("pos", &self.pos)
            .finish()
    }
}
