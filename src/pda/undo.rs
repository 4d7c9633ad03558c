// Reverse execution of parser operations
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

//! Reverse records and their interpreter.
//!
//! Each mutation made by a [`PdaRun`] is logged as a [`RevRecord`] in
//!   its [`ReverseLog`](crate::rcode::ReverseLog).
//! Interpreting a record reverses exactly that mutation,
//!   provided that every newer record has already been interpreted.

use super::{
    bind::BindId,
    error::{InternalError, PdaError},
    run::PdaRun,
    trace::ParserTrace,
};
use crate::{
    rcode::LogMark,
    span::Position,
    tree::{NodeId, StateId},
};

/// Data recorded by a semantic action so that it may later reverse its
///   own effects.
///
/// The parser does not interpret this data;
///   it is handed back to the caller via
///   [`Status::Reverse`](super::Status::Reverse).
pub type ReverseData = Box<[u8]>;

/// A single undoable mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevRecord {
    /// A scanned token was queued as lookahead.
    Scan { node: NodeId, start: Position },

    /// A scanned token was added to the pending ignore chain.
    Ignore { node: NodeId, start: Position },

    /// A tree was taken from the stream and either queued or,
    ///   if `ignore`,
    ///   added to the pending ignore chain.
    TreeIn { node: NodeId, ignore: bool },

    /// The text of a generation token was consumed.
    Consume { text: Box<[u8]>, start: Position },

    /// A token was fabricated and queued by the caller.
    Send { node: NodeId },

    /// Text of `units` bytes was pushed onto the stream.
    Push { units: usize },

    /// A tree was pushed onto the stream.
    PushTree { node: NodeId },

    /// The lookahead `node` was shifted.
    ///
    /// `ignore` is the pending ignore chain that was attached to it,
    ///   if any.
    Shift {
        node: NodeId,
        prev_state: StateId,
        ignore: Option<NodeId>,
        alt: usize,
        more: bool,
    },

    /// A reduction produced `lhs`.
    Reduce {
        lhs: NodeId,
        prev_state: StateId,
        alt: usize,
        more: bool,
    },

    Bind { id: BindId, prev: Option<NodeId> },

    /// The pending ignore chain was discarded.
    DiscardIgnore { chain: Option<NodeId> },

    /// Backtracking was committed.
    Commit { prev_barrier: LogMark, prev_retry: usize },

    /// The end-of-input action flag changed from `prev`.
    PreEofRan { prev: bool },

    /// Reverse data recorded by a semantic action.
    Action(ReverseData),

    /// A step completed.
    StepEnd,
}

/// Result of interpreting a single record.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Undone {
    Plain,

    /// A decision with untried alternatives was reversed;
    ///   `alt` was the alternative that had been taken.
    Decision { alt: usize },

    /// A semantic action must reverse itself.
    Action(ReverseData),
}

impl<'t, T: ParserTrace> PdaRun<'t, T> {
    /// Reverse the mutation described by `rec`.
    pub(super) fn undo(&mut self, rec: RevRecord) -> Result<Undone, PdaError> {
        use RevRecord::*;

        match rec {
            Scan { node, start } => {
                self.dequeue_back(node)?;
                let text = self.nodes.free(node).map(|n| n.text);

                self.scanner
                    .stream_mut()?
                    .undo_extract(text.as_deref().unwrap_or_default(), start);
            }

            Ignore { node, start } => {
                self.accum_ignore = self.nodes[node].next;
                let text = self.nodes.free(node).map(|n| n.text);

                self.scanner
                    .stream_mut()?
                    .undo_extract(text.as_deref().unwrap_or_default(), start);
            }

            TreeIn { node, ignore } => {
                if ignore {
                    self.accum_ignore = self.nodes[node].next;
                    self.nodes[node].next = None;
                } else {
                    self.dequeue_back(node)?;
                }

                self.scanner.stream_mut()?.untake_tree(node, ignore);
            }

            Consume { text, start } => {
                self.scanner.stream_mut()?.undo_extract(&text, start);
            }

            Send { node } => {
                self.dequeue_back(node)?;
                self.nodes.free_tree(node);
            }

            Push { units } => {
                self.scanner.stream_mut()?.pushback(units);
            }

            // Only the root was allocated by the push;
            //   its children may belong to a tree still in use.
            PushTree { node } => {
                self.scanner.stream_mut()?.pushback(1);
                self.nodes.free(node);
            }

            Shift {
                node,
                prev_state,
                ignore,
                alt,
                more,
            } => {
                let shifted = &mut self.nodes[node];
                self.stack = shifted.next.take();
                shifted.state = 0;

                if ignore.is_some() {
                    shifted.ignore = None;
                    self.accum_ignore = ignore;
                }

                self.queue.push_front(node);
                self.cs = prev_state;

                return Ok(self.undecide(alt, more));
            }

            Reduce {
                lhs,
                prev_state,
                alt,
                more,
            } => {
                self.dequeue_front(lhs)?;

                let children = self.nodes.children(lhs).collect::<Vec<_>>();
                for child in children {
                    self.nodes[child].next = self.stack;
                    self.stack = Some(child);
                }

                self.nodes.free(lhs);
                self.cs = prev_state;

                return Ok(self.undecide(alt, more));
            }

            Bind { id, prev } => self.bindings.restore(id, prev),

            DiscardIgnore { chain } => self.accum_ignore = chain,

            Commit {
                prev_barrier,
                prev_retry,
            } => {
                self.barrier = prev_barrier;
                self.num_retry = prev_retry;
            }

            PreEofRan { prev } => self.pre_eof_ran = prev,

            Action(data) => return Ok(Undone::Action(data)),

            StepEnd => self.steps -= 1,
        }

        Ok(Undone::Plain)
    }

    fn undecide(&mut self, alt: usize, more: bool) -> Undone {
        if more {
            self.num_retry = self.num_retry.saturating_sub(1);
            Undone::Decision { alt }
        } else {
            Undone::Plain
        }
    }

    fn dequeue_back(&mut self, expected: NodeId) -> Result<(), PdaError> {
        match self.queue.back() {
            Some(node) if *node == expected => {
                self.queue.pop_back();
                Ok(())
            }
            found => Err(InternalError::QueueMismatch {
                expected,
                found: found.copied(),
            }
            .into()),
        }
    }

    pub(super) fn dequeue_front(
        &mut self,
        expected: NodeId,
    ) -> Result<(), PdaError> {
        match self.queue.front() {
            Some(node) if *node == expected => {
                self.queue.pop_front();
                Ok(())
            }
            found => Err(InternalError::QueueMismatch {
                expected,
                found: found.copied(),
            }
            .into()),
        }
    }
}
