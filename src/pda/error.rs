// Parser errors
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

//! Errors produced by [`PdaRun`](super::PdaRun).
//!
//! Errors fall into two classes:
//!
//!   - _Parse errors_ are the fault of the input
//!       ([`PdaError::Lexical`],
//!        [`PdaError::Syntax`],
//!        [`PdaError::Rejected`]).
//!     The run is flagged and refuses to continue forward,
//!       but may still be inspected and rolled back to an earlier step,
//!       after which parsing may resume.
//!   - _Fatal errors_ are the fault of the tables,
//!       the caller,
//!       or the environment
//!       ([`PdaError::Internal`],
//!        [`PdaError::Alloc`],
//!        [`PdaError::Scan`]).
//!     The run is aborted and every later operation yields
//!       [`PdaError::Aborted`].

use super::run::{Continuation, Entry};
use crate::{
    diagnose::{Annotate, AnnotatedSpan, Diagnostic},
    fmt::{DisplayWrapper, TtQuote},
    fsm::{FsmError, RegionId},
    pool::AllocError,
    span::{Position, Span, UNKNOWN_SPAN},
    tree::{LangElId, NodeId, ProdId, StateId},
};
use std::{error::Error, fmt::Display};

#[derive(Debug)]
pub enum PdaError {
    /// No token of any region of the current state matches the input at
    ///   `pos`.
    Lexical { region: RegionId, pos: Position },

    /// The automaton has no action for `token` in `state`.
    Syntax {
        token: LangElId,
        state: StateId,
        span: Span,
    },

    /// A reduction action rejected its reduction and no alternatives
    ///   remain.
    Rejected { prod: ProdId, span: Span },

    /// The run has a parse error and may only be rolled back.
    Halted,

    /// The run previously encountered a fatal error.
    Aborted,

    Internal(InternalError),
    Alloc(AllocError),
    Scan(FsmError),
}

impl PdaError {
    /// Whether this error aborts the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Internal(_) | Self::Alloc(_) | Self::Scan(_))
    }
}

impl From<InternalError> for PdaError {
    fn from(e: InternalError) -> Self {
        Self::Internal(e)
    }
}

impl From<AllocError> for PdaError {
    fn from(e: AllocError) -> Self {
        Self::Alloc(e)
    }
}

impl From<FsmError> for PdaError {
    fn from(e: FsmError) -> Self {
        Self::Scan(e)
    }
}

impl Display for PdaError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Lexical { region, pos } => {
                write!(f, "no token of region {region} matches input at {pos}")
            }
            Self::Syntax { token, state, .. } => write!(
                f,
                "unexpected token {} in state {state}",
                TtQuote::wrap(token),
            ),
            Self::Rejected { prod, .. } => {
                write!(f, "reduction by production {prod} was rejected")
            }
            Self::Halted => {
                write!(f, "parser halted on a previous parse error")
            }
            Self::Aborted => {
                write!(f, "parser aborted on a previous fatal error")
            }
            Self::Internal(e) => Display::fmt(e, f),
            Self::Alloc(e) => Display::fmt(e, f),
            Self::Scan(e) => Display::fmt(e, f),
        }
    }
}

impl Error for PdaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Internal(e) => Some(e),
            Self::Alloc(e) => Some(e),
            Self::Scan(e) => Some(e),
            _ => None,
        }
    }
}

impl Diagnostic for PdaError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        match self {
            Self::Lexical { pos, .. } => Span::new(*pos, 0)
                .error("unrecognized input begins here")
                .into(),

            Self::Syntax { span, .. } => span
                .error("this token is not expected here")
                .with_help("no remaining alternative derivation accepts it")
                .into(),

            Self::Rejected { span, .. } => span
                .error("a semantic check rejected this construct")
                .into(),

            Self::Halted => UNKNOWN_SPAN
                .error("parsing cannot continue past a parse error")
                .with_help("roll the parser back to an earlier step first")
                .into(),

            Self::Aborted => UNKNOWN_SPAN
                .internal_error("parser state is no longer consistent")
                .into(),

            Self::Internal(e) => e.describe(),
            Self::Alloc(e) => e.describe(),
            Self::Scan(e) => e.describe(),
        }
    }
}

/// An error that is never the fault of the input being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    /// A production is longer than the parse stack.
    StackUnderflow {
        prod: ProdId,
        needed: usize,
        found: usize,
    },

    /// The reverse log was exhausted before the target step was
    ///   reached.
    UndoPastStart { target: usize, steps: usize },

    /// Undo was requested to a step that has not yet been taken.
    UndoForward { target: usize, steps: usize },

    /// The parser was entered at a point other than the one at which
    ///   it is suspended.
    BadEntry { entry: Entry, cont: Continuation },

    /// The lookahead queue does not hold the node that a shift,
    ///   reduction,
    ///   or its reversal expected.
    QueueMismatch {
        expected: NodeId,
        found: Option<NodeId>,
    },

    /// A reduction was rejected while the parser was not suspended for
    ///   a reduction action.
    RejectOutsideReduction,
}

impl Display for InternalError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::StackUnderflow {
                prod,
                needed,
                found,
            } => write!(
                f,
                "production {prod} reduces {needed} elements \
                   but the stack holds only {found}",
            ),
            Self::UndoPastStart { target, steps } => write!(
                f,
                "cannot undo to step {target} from step {steps}: \
                   reverse log exhausted",
            ),
            Self::UndoForward { target, steps } => write!(
                f,
                "cannot undo to step {target}, \
                   which is beyond the current step {steps}",
            ),
            Self::BadEntry { entry, cont } => write!(
                f,
                "parser entered at {} while suspended at {}",
                TtQuote::wrap(entry),
                TtQuote::wrap(cont),
            ),
            Self::QueueMismatch { expected, found } => match found {
                Some(found) => write!(
                    f,
                    "expected node {expected} at the head of the \
                       lookahead queue, but found {found}",
                ),
                None => write!(
                    f,
                    "expected node {expected} in the lookahead queue, \
                       but the queue is empty",
                ),
            },
            Self::RejectOutsideReduction => {
                write!(f, "reduction rejected outside of a reduction action")
            }
        }
    }
}

impl Error for InternalError {}

impl Diagnostic for InternalError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        let label = match self {
            Self::StackUnderflow { .. } | Self::QueueMismatch { .. } => {
                "compiled parser tables are inconsistent"
            }
            Self::UndoPastStart { .. } => {
                "the requested step was committed and can no longer be undone"
            }
            Self::UndoForward { .. } | Self::BadEntry { .. } => {
                "the parser was driven out of order"
            }
            Self::RejectOutsideReduction => {
                "only a reduction action may reject its reduction"
            }
        };

        UNKNOWN_SPAN.internal_error(label).into()
    }
}
