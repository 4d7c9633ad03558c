// Reverse code log
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

//! Log of reverse operations.
//!
//! Every mutating step of forward execution appends a record describing
//!   how to undo it.
//! Rolling back is then a matter of popping records from the tail and
//!   interpreting each one;
//!     the interpreter lives with whatever owns the state being mutated
//!     (see [`pda`](crate::pda)),
//!       since this log is agnostic to the type of record it holds.
//!
//! The log only ever shrinks from the tail,
//!   whether by popping records to be undone or by
//!   [truncating](ReverseLog::truncate_to) records that will never be
//!   undone.
//! A [`LogMark`] is simply a length,
//!   so marks taken earlier remain valid as long as the log has not been
//!   truncated below them.

use std::iter::Rev;
use std::vec::Drain;

/// A position within a [`ReverseLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LogMark(usize);

impl LogMark {
    /// The mark of an empty log.
    pub const START: Self = Self(0);
}

/// Append-only log of reverse records.
///
/// See the [module-level documentation](self) for more information.
#[derive(Debug, PartialEq, Eq)]
pub struct ReverseLog<R> {
    recs: Vec<R>,
}

impl<R> Default for ReverseLog<R> {
    fn default() -> Self {
        Self { recs: Vec::new() }
    }
}

impl<R> ReverseLog<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, rec: R) {
        self.recs.push(rec)
    }

    /// Mark the current tail of the log.
    pub fn mark(&self) -> LogMark {
        LogMark(self.recs.len())
    }

    /// Discard every record newer than `mark` without interpreting it.
    ///
    /// This is used once speculative work has been confirmed,
    ///   after which it will never be undone.
    /// Truncating to a mark beyond the tail does nothing.
    pub fn truncate_to(&mut self, mark: LogMark) {
        self.recs.truncate(mark.0)
    }

    /// Remove and yield every record newer than `from`,
    ///   newest first,
    ///   which is the order in which they must be undone.
    ///
    /// Records are removed from the log even if the iterator is not
    ///   exhausted.
    pub fn replay(&mut self, from: LogMark) -> Rev<Drain<R>> {
        let from = from.0.min(self.recs.len());
        self.recs.drain(from..).rev()
    }

    /// Remove the newest record.
    pub fn pop(&mut self) -> Option<R> {
        self.recs.pop()
    }

    /// The newest record.
    pub fn last(&self) -> Option<&R> {
        self.recs.last()
    }

    pub fn len(&self) -> usize {
        self.recs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recs.is_empty()
    }
}
