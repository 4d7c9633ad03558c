// Parser tracing
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

//! Tracing for parsing operations.
//!
//! This provides human-readable traces on standard error for every token
//!   acquired,
//!   every action taken,
//!   every suspension,
//!   every error,
//!   and every record undone.
//! These traces are provided automatically when `cfg(test)`,
//!   which means that they are automatically included in the output of any
//!   test failure.
//!
//! Outside of tests,
//!   this can be enabled at configuration-time using the
//!   `parser-trace-stderr` feature flag.
//!
//! _These traces are not meant to be machine-readable!_
//! Do not try to use the human-readable traces in that way since the format
//!   is subject to change without notice.
//! Implement [`ParserTrace`] instead.

use super::{
    error::PdaError, run::Status, tables::Decision, undo::RevRecord,
};
use crate::{
    fmt::Escaped,
    fsm::RegionId,
    tree::{Node, StateId},
};

pub trait ParserTrace: Default {
    /// A token was acquired from `region`,
    ///   either as lookahead or onto the pending ignore chain.
    ///
    /// There is no means to return an error and a failure to output the
    ///   trace should not interrupt processing.
    fn trace_token(&mut self, region: RegionId, tok: &Node);

    /// The automaton in state `cs` decided upon an action for the
    ///   lookahead `la`.
    fn trace_action(&mut self, cs: StateId, la: &Node, decision: &Decision);

    /// The parser is about to return control to the caller.
    fn trace_suspend(&mut self, status: &Status);

    /// The parser encountered an error,
    ///   which may yet be recovered from by backtracking.
    fn trace_error(&mut self, err: &PdaError);

    /// A record of the reverse log is about to be undone.
    fn trace_undo(&mut self, rec: &RevRecord);
}

/// Perform no tracing.
///
/// This should be used by default for non-test builds,
///   since tracing can incur a significant performance cost.
#[derive(Debug, PartialEq, Default)]
pub struct VoidTrace;

impl ParserTrace for VoidTrace {
    fn trace_token(&mut self, _region: RegionId, _tok: &Node) {
        // Do nothing at all.
    }

    fn trace_action(&mut self, _cs: StateId, _la: &Node, _dec: &Decision) {
        // Do nothing at all.
    }

    fn trace_suspend(&mut self, _status: &Status) {
        // Do nothing at all.
    }

    fn trace_error(&mut self, _err: &PdaError) {
        // Do nothing at all.
    }

    fn trace_undo(&mut self, _rec: &RevRecord) {
        // Do nothing at all.
    }
}

/// Human-readable [`ParserTrace`].
///
/// See [module-level](self) documentation for more information.
#[derive(Debug, PartialEq, Default)]
pub struct HumanReadableTrace;

impl HumanReadableTrace {
    fn note(&self) {
        #[allow(unused_variables)]
        let cfg = ""; // so that this compiles without matching cfg
        #[cfg(feature = "parser-trace-stderr")]
        #[allow(unused_variables)]
        let cfg = "feature = \"parser-trace-stderr\"";
        #[cfg(test)] // takes precedence if both are set
        let cfg = "test";
        eprint!(
            "= note: this trace was output as a debugging aid \
                because `cfg({cfg})`.\n\n",
        );
    }
}

impl ParserTrace for HumanReadableTrace {
    fn trace_token(&mut self, region: RegionId, tok: &Node) {
        eprint!(
            "\
[PdaRun::acquire] (region {region})
| ==> token {id} `{text}` at {span}
|  |  {tok:?}
|\n",
            id = tok.id,
            text = Escaped(&tok.text),
            span = tok.span,
        );
        self.note();
    }

    fn trace_action(&mut self, cs: StateId, la: &Node, decision: &Decision) {
        eprint!(
            "\
[PdaRun::act] (state {cs})
| ==> lookahead {id} `{text}` at {span}
| ==> {action} (alternative {alt}{more})
|  |  {decision:?}
|\n",
            id = la.id,
            text = Escaped(&la.text),
            span = la.span,
            action = decision.action,
            alt = decision.alt,
            more = if decision.more { ", more remain" } else { "" },
        );
        self.note();
    }

    fn trace_suspend(&mut self, status: &Status) {
        eprint!(
            "\
[PdaRun::parse] yielding to caller
| ==> {status:?}
|\n",
        );
        self.note();
    }

    fn trace_error(&mut self, err: &PdaError) {
        eprint!(
            "\
[PdaRun::parse]
| ==> !!! error: {err}.
|  |  {err:?}
|\n",
        );
        self.note();
    }

    fn trace_undo(&mut self, rec: &RevRecord) {
        eprint!(
            "\
[PdaRun::undo]
| <== {rec:?}
|\n",
        );
        self.note();
    }
}

/// Trace used by [`PdaRun`](super::PdaRun) unless otherwise specified.
#[cfg(any(test, feature = "parser-trace-stderr"))]
pub type DefaultTrace = HumanReadableTrace;

/// Trace used by [`PdaRun`](super::PdaRun) unless otherwise specified.
#[cfg(not(any(test, feature = "parser-trace-stderr")))]
pub type DefaultTrace = VoidTrace;
