// Source positions and byte intervals
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

//! Mapping to input byte intervals.
//!
//! A [`Position`] is a location within an
//!   [`InputStream`](crate::input::InputStream),
//!     tracked as the stream is consumed.
//! A [`Span`] is a [`Position`] paired with a byte length and represents
//!   where a token or reduced node originated.
//!
//! Positions are ordered by byte offset first,
//!   which is consistent with line and column ordering for positions
//!   originating from the same stream.
//!
//! Text pushed into a stream ahead of its source text
//!   (e.g. by a generation action)
//!   is assigned the position of the stream at the time it is consumed;
//!     positions therefore describe the order of consumption,
//!     not necessarily a location in any one file.

use memchr::{memchr_iter, memrchr};
use std::fmt::Display;

/// A location within a stream of input.
///
/// Lines and columns are 1-indexed;
///   the byte offset is 0-indexed.
/// Columns count bytes,
///   not characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl Position {
    /// The position of the first byte of a stream.
    pub const START: Self = Self {
        offset: 0,
        line: 1,
        col: 1,
    };

    /// The position immediately following `data`,
    ///   provided that `data` begins at `self`.
    pub fn advance(self, data: &[u8]) -> Self {
        let offset = self.offset + data.len();

        match memrchr(b'\n', data) {
            None => Self {
                offset,
                col: self.col + data.len() as u32,
                ..self
            },
            Some(last_nl) => Self {
                offset,
                line: self.line + memchr_iter(b'\n', data).count() as u32,
                col: (data.len() - last_nl) as u32,
            },
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A byte interval beginning at some [`Position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    start: Position,
    len: usize,
}

/// A span for data that did not originate from any input,
///   such as fabricated tokens,
///   or for errors with no associated location.
pub const UNKNOWN_SPAN: Span = Span {
    start: Position {
        offset: usize::MAX,
        line: 0,
        col: 0,
    },
    len: 0,
};

impl Span {
    pub fn new(start: Position, len: usize) -> Self {
        Self { start, len }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn offset(&self) -> usize {
        self.start.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_unknown(&self) -> bool {
        *self == UNKNOWN_SPAN
    }

    /// Byte offset one past the end of the span.
    pub fn end_offset(&self) -> usize {
        self.start.offset.saturating_add(self.len)
    }

    /// Produce a span covering both `self` and `other`.
    ///
    /// Unknown spans are absorbed by known ones,
    ///   which allows fabricated tokens to appear amongst real ones
    ///   without discarding the location of the real ones.
    pub fn merge(self, other: Span) -> Span {
        match (self.is_unknown(), other.is_unknown()) {
            (true, _) => other,
            (_, true) => self,
            _ => {
                let (first, last) = if self.start <= other.start {
                    (self, other)
                } else {
                    (other, self)
                };

                let end = first.end_offset().max(last.end_offset());
                Span::new(first.start, end - first.start.offset)
            }
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_unknown() {
            write!(f, "<unknown>")
        } else {
            Display::fmt(&self.start, f)
        }
    }
}
