// Resumable, reversible pushdown automaton
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

//! Table-driven pushdown automaton with backtracking.
//!
//! A [`PdaRun`] executes compiled [`PdaTables`] against tokens acquired by
//!   a [`Scanner`](crate::fsm::Scanner),
//!     building a tree of [`Node`](crate::tree::Node)s.
//! The automaton is LR-like:
//!   each state maps a lookahead language element to a list of
//!   [`Action`]s,
//!     and a non-singleton list is a _decision_ whose alternatives are
//!     tried in table order.
//!
//! Suspension
//! ==========
//! The parser never calls out to user code.
//! Instead,
//!   [`PdaRun::parse`] returns a [`Status`] whenever a semantic action is
//!   due
//!     (a reduction with an action,
//!      a generation token,
//!      or the end of input in a region with an end-of-input action),
//!   and the caller later re-enters with the matching [`Entry`].
//! While suspended,
//!   the caller may inspect the run and operate on it by pushing text or
//!   trees onto the input,
//!   sending tokens,
//!   binding pattern variables,
//!   or rejecting the reduction.
//!
//! Reversibility
//! =============
//! Every mutation of the run is logged in a reverse log before control
//!   returns to the caller.
//! This serves two masters:
//!
//!   - On a lexical or syntax error,
//!       or a rejected reduction,
//!       the parser backtracks by undoing records until it reaches the
//!       most recent decision with untried alternatives,
//!         and then takes the next one.
//!   - The caller may roll the entire run back to the boundary of any
//!       earlier step using [`PdaRun::undo_to`].
//!     After rolling back to step _k_,
//!       the stack,
//!       lookahead,
//!       pending ignored tokens,
//!       bindings,
//!       and input stream are exactly as they were when step _k_
//!       completed.
//!
//! A _step_ is a single shift,
//!   reduction,
//!   or shift-reduction.
//! A transition flagged as committing clears all pending alternatives
//!   once its step completes;
//!     backtracking will never undo past that point,
//!     though an explicit [`PdaRun::undo_to`] still may.
//! [`PdaRun::commit_full`] discards the log entirely.
//!
//! Ignored Tokens
//! ==============
//! Tokens flagged as ignored (typically whitespace and comments) never
//!   reach the automaton.
//! They accumulate until the next terminal is shifted,
//!   and are then attached to that terminal.
//! The automaton therefore takes exactly the same actions regardless of
//!   what ignored tokens appear between terminals.

mod bind;
mod error;
mod run;
mod snapshot;
mod tables;
mod trace;
mod undo;

pub use bind::{BindId, Bindings};
pub use error::{InternalError, PdaError};
pub use run::{
    Continuation, Entry, GenerationInfo, Goal, PdaRun, ReductionInfo,
    RunConfig, Status,
};
pub use snapshot::{InputShape, Snapshot, TreeShape};
pub use tables::{
    Action, Decision, LangElInfo, PdaTables, ProdInfo, RegionInfo, ACT_RB,
    ACT_SB,
};
pub use trace::{DefaultTrace, HumanReadableTrace, ParserTrace, VoidTrace};
pub use undo::{RevRecord, ReverseData};

#[cfg(test)]
mod test;
