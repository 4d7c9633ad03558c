// Scanner runtime
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

//! Finite-state scanner.
//!
//! A [`Scanner`] executes compiled [`FsmTables`] over an attached
//!   [`InputStream`] to recognize a single token per call to
//!   [`Scanner::run`].
//! The scanner never consumes input itself;
//!   it reports the length of the token it matched,
//!     and the caller extracts that many bytes from the stream.
//! This keeps the scanner free of any state that would have to be
//!   reversed when the parser backtracks.
//!
//! Longest Match
//! =============
//! Each time the machine arrives in a final state having set a candidate
//!   token (via [`FsmAction::Token`]),
//!     that token and the current scan offset are remembered.
//! The scan continues until the machine enters the error state or input
//!   ends,
//!     at which point the most recently remembered match is accepted.
//! Actions may also accept a token outright
//!   ([`FsmAction::Accept`]),
//!   or accept a token ending at a previously remembered _mark_
//!   ([`FsmAction::AcceptAtMark`]),
//!     which allows a token to be recognized only when followed by some
//!     trailing context that is not itself part of the token.
//!
//! A tree pushed into the stream ends any text token in progress,
//!   exactly as the end of input would;
//!     a tree at the head of the stream is reported as
//!     [`ScanResult::Tree`] for the parser to take whole.

mod tables;

pub use tables::FsmTables;

use crate::{
    diagnose::{Annotate, AnnotatedSpan, Diagnostic},
    fmt::{DisplayWrapper, TtQuote},
    global,
    input::{InputStream, Unit},
    span::UNKNOWN_SPAN,
    tree::{LangElId, NodeId, StateId},
};
use std::{error::Error, fmt::Display, io};

/// Identifier of a scanner region.
///
/// A region is a set of tokens that may be scanned together,
///   with its own entry state.
pub type RegionId = global::RegionSize;

/// An action executed by the scanner on a transition or upon entering,
///   leaving,
///   or reaching the end of input in a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsmAction {
    /// Set the candidate token for the current match.
    Token(LangElId),

    /// Accept a token immediately,
    ///   ending after the unit that caused the transition.
    Accept(LangElId),

    /// Remember the current scan offset in the given mark slot.
    Mark(usize),

    /// Accept `token` immediately,
    ///   ending at the offset remembered in mark `slot`.
    AcceptAtMark { slot: usize, token: LangElId },
}

/// Outcome of a single [`Scanner::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult {
    /// A token of `len` bytes at the head of the stream.
    ///
    /// The bytes remain in the stream until the caller extracts them.
    Token { id: LangElId, len: usize },

    /// A tree pushed into the stream is at its head.
    Tree { node: NodeId, ignore: bool },

    /// The stream is exhausted.
    Eof,

    /// No token of the region matches at the head of the stream.
    NoToken,
}

/// Runtime state of a scanner.
///
/// See the [module-level documentation](self) for more information.
#[derive(Debug)]
pub struct Scanner<'t> {
    tables: &'t FsmTables,
    stream: Option<InputStream>,

    region: RegionId,

    /// Current state.
    cs: StateId,

    /// Scan offset relative to the head of the stream.
    p: usize,

    tokstart: usize,
    tokend: usize,

    marks: [Option<usize>; global::MARK_SLOTS],

    /// Candidate token set by the current transition.
    act: Option<LangElId>,

    matched: Option<LangElId>,
}

impl<'t> Scanner<'t> {
    pub fn new(tables: &'t FsmTables) -> Self {
        Self {
            tables,
            stream: None,
            region: 0,
            cs: tables.start_state,
            p: 0,
            tokstart: 0,
            tokend: 0,
            marks: [None; global::MARK_SLOTS],
            act: None,
            matched: None,
        }
    }

    pub fn tables(&self) -> &'t FsmTables {
        self.tables
    }

    /// Attach a stream for subsequent scans.
    ///
    /// If a stream is already attached,
    ///   `stream` is returned within the error.
    pub fn attach(&mut self, stream: InputStream) -> Result<(), FsmError> {
        match self.stream {
            Some(_) => Err(FsmError::AlreadyAttached(stream)),
            None => {
                self.stream = Some(stream);
                Ok(())
            }
        }
    }

    /// Detach and return the current stream,
    ///   clearing all scan state.
    pub fn detach(&mut self) -> Result<InputStream, FsmError> {
        let stream = self.stream.take().ok_or(FsmError::NotAttached)?;
        self.reset(0, self.tables.start_state);
        self.matched = None;

        Ok(stream)
    }

    pub fn is_attached(&self) -> bool {
        self.stream.is_some()
    }

    pub fn stream(&self) -> Option<&InputStream> {
        self.stream.as_ref()
    }

    pub fn stream_mut(&mut self) -> Result<&mut InputStream, FsmError> {
        self.stream.as_mut().ok_or(FsmError::NotAttached)
    }

    /// Token most recently matched by [`Self::run`].
    pub fn matched_token(&self) -> Option<LangElId> {
        self.matched
    }

    /// Length of the token most recently matched by [`Self::run`].
    pub fn token_len(&self) -> usize {
        self.tokend - self.tokstart
    }

    /// Region of the most recent scan.
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// Offset remembered in mark `slot` during the most recent scan.
    pub fn mark(&self, slot: usize) -> Option<usize> {
        self.marks.get(slot).copied().flatten()
    }

    fn reset(&mut self, region: RegionId, entry: StateId) {
        self.region = region;
        self.cs = entry;
        self.p = 0;
        self.tokstart = 0;
        self.tokend = 0;
        self.marks = [None; global::MARK_SLOTS];
        self.act = None;
    }

    /// Scan a single token of `region` from the head of the attached
    ///   stream.
    pub fn run(&mut self, region: RegionId) -> Result<ScanResult, FsmError> {
        let entry = *self
            .tables
            .entry_by_region
            .get(region as usize)
            .ok_or(FsmError::BadRegion(region))?;

        let mut stream = self.stream.take().ok_or(FsmError::NotAttached)?;

        self.reset(region, entry);
        let result = self.scan(&mut stream);
        self.stream = Some(stream);

        result
    }

    fn scan(
        &mut self,
        stream: &mut InputStream,
    ) -> Result<ScanResult, FsmError> {
        let tables = self.tables;
        let mut longest = None;

        loop {
            let cs = self.cs as usize;
            self.act = None;

            let from = tables.from_state_actions[cs];
            if let Some((id, end)) = self.exec(from, self.p)? {
                return Ok(self.accept(id, end));
            }

            match stream.peek(self.p).map_err(FsmError::Io)? {
                Some(Unit::Byte(key)) => {
                    let trans = tables.transition(self.cs, key);
                    self.cs = tables.trans_targs[trans];

                    let acts = tables.trans_actions[trans];
                    if let Some((id, end)) = self.exec(acts, self.p + 1)? {
                        return Ok(self.accept(id, end));
                    }

                    self.p += 1;

                    if self.cs == tables.error_state {
                        break;
                    }

                    let to = tables.to_state_actions[self.cs as usize];
                    if let Some((id, end)) = self.exec(to, self.p)? {
                        return Ok(self.accept(id, end));
                    }

                    if tables.is_final(self.cs) {
                        if let Some(id) = self.act {
                            longest = Some((id, self.p));
                        }
                    }
                }

                Some(Unit::Tree { node, ignore }) if self.p == 0 => {
                    return Ok(ScanResult::Tree { node, ignore });
                }

                None if self.p == 0 => return Ok(ScanResult::Eof),

                // End of text for the token in progress.
                Some(Unit::Tree { .. }) | None => {
                    let eof = tables.eof_actions[cs];
                    if let Some((id, end)) = self.exec(eof, self.p)? {
                        return Ok(self.accept(id, end));
                    }

                    if tables.is_final(self.cs) {
                        if let Some(id) = self.act {
                            longest = Some((id, self.p));
                        }
                    }

                    break;
                }
            }
        }

        Ok(match longest {
            Some((id, len)) => self.accept(id, len),
            None => ScanResult::NoToken,
        })
    }

    /// Execute the action list at `offset`,
    ///   where an immediate accept ends its token at `end`.
    fn exec(
        &mut self,
        offset: u32,
        end: usize,
    ) -> Result<Option<(LangElId, usize)>, FsmError> {
        let tables = self.tables;

        for act in tables.action_list(offset) {
            match act {
                FsmAction::Token(id) => self.act = Some(id),
                FsmAction::Accept(id) => return Ok(Some((id, end))),

                FsmAction::Mark(slot) => {
                    let mark = self
                        .marks
                        .get_mut(slot)
                        .ok_or(FsmError::MarkSlot(slot))?;

                    *mark = Some(self.p);
                }

                FsmAction::AcceptAtMark { slot, token } => {
                    let end = self
                        .marks
                        .get(slot)
                        .copied()
                        .ok_or(FsmError::MarkSlot(slot))?
                        .ok_or(FsmError::UnsetMark(slot))?;

                    return Ok(Some((token, end)));
                }
            }
        }

        Ok(None)
    }

    fn accept(&mut self, id: LangElId, len: usize) -> ScanResult {
        // An empty token would never advance the stream.
        if len == 0 {
            return ScanResult::NoToken;
        }

        self.tokstart = 0;
        self.tokend = len;
        self.matched = Some(id);

        ScanResult::Token { id, len }
    }
}

/// Misuse of a [`Scanner`] or failure of its input.
#[derive(Debug)]
pub enum FsmError {
    /// No stream is attached.
    NotAttached,

    /// A stream is already attached;
    ///   the stream that could not be attached is returned.
    AlreadyAttached(InputStream),

    /// The region has no entry state.
    BadRegion(RegionId),

    /// A mark action referenced a slot beyond
    ///   [`global::MARK_SLOTS`].
    MarkSlot(usize),

    /// An action accepted a token at a mark that was not set during
    ///   this scan.
    UnsetMark(usize),

    /// The stream's source failed.
    Io(io::Error),
}

impl Display for FsmError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NotAttached => write!(f, "no input stream is attached"),
            Self::AlreadyAttached(_) => {
                write!(f, "an input stream is already attached")
            }
            Self::BadRegion(region) => {
                write!(f, "scanner region {region} has no entry state")
            }
            Self::MarkSlot(slot) => write!(
                f,
                "mark slot {slot} exceeds the limit of {} slots",
                global::MARK_SLOTS,
            ),
            Self::UnsetMark(slot) => write!(
                f,
                "token accepted at mark {} before it was set",
                TtQuote::wrap(slot),
            ),
            Self::Io(e) => write!(f, "failed to read input: {e}"),
        }
    }
}

impl Error for FsmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Diagnostic for FsmError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        match self {
            Self::Io(_) => UNKNOWN_SPAN.error("while reading input").into(),

            Self::MarkSlot(_) | Self::UnsetMark(_) | Self::BadRegion(_) => {
                UNKNOWN_SPAN
                    .internal_error("compiled scanner tables are malformed")
                    .into()
            }

            Self::NotAttached | Self::AlreadyAttached(_) => UNKNOWN_SPAN
                .internal_error("scanner input was mismanaged")
                .into(),
        }
    }
}
