// Compiled parser tables
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

//! Flat tables describing a compiled pushdown automaton.
//!
//! Classifying a language element `id` in state `cs`:
//!
//!   1. `keys[cs * 2]` and `keys[cs * 2 + 1]` are the lowest and highest
//!        ids with any action in `cs`;
//!          an id outside of that inclusive range is an error.
//!   2. `pos = offsets[cs] + (id - low)`;
//!        if `owners[pos]` is not `cs`,
//!          the slot belongs to another state and this is an error.
//!   3. `indicies[pos]` is the index of the transition,
//!        or negative for an error.
//!
//! A transition `t` has a target state `targs[t]`,
//!   a `0`-terminated list of action codes beginning at
//!   `actions[act_inds[t]]`,
//!   and a commit flag `commit_len[t]`.
//! Each action code is a bit field:
//!   bit 0 ([`ACT_SB`]) requests a shift,
//!   bit 1 ([`ACT_RB`]) requests a reduction,
//!   and the remaining bits hold the production to reduce by.
//! A list of more than one code represents an ambiguity,
//!   whose alternatives are tried in table order.
//!
//! The scanner regions that may produce tokens in state `cs` are the
//!   `0`-terminated list beginning at
//!   `token_regions[token_region_inds[cs]]`;
//!     region `0` is therefore never a real region.

use crate::{
    fsm::RegionId,
    table::{check_len, check_range, TableError},
    tree::{LangElId, ProdId, StateId},
};
use std::fmt::Display;

/// Shift bit of an action code.
pub const ACT_SB: u32 = 0x1;

/// Reduce bit of an action code.
pub const ACT_RB: u32 = 0x2;

/// A decoded action code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift,
    Reduce(ProdId),

    /// Shift the lookahead and then immediately reduce,
    ///   as a single step.
    ShiftReduce(ProdId),
}

impl Action {
    /// Decode an action code,
    ///   or [`None`] if it requests neither a shift nor a reduction.
    pub fn decode(code: u32) -> Option<Self> {
        let prod = code >> 2;

        match (code & ACT_SB != 0, code & ACT_RB != 0) {
            (true, false) => Some(Self::Shift),
            (false, true) => Some(Self::Reduce(prod)),
            (true, true) => Some(Self::ShiftReduce(prod)),
            (false, false) => None,
        }
    }

    pub fn encode(self) -> u32 {
        match self {
            Self::Shift => ACT_SB,
            Self::Reduce(prod) => (prod << 2) | ACT_RB,
            Self::ShiftReduce(prod) => (prod << 2) | ACT_RB | ACT_SB,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Shift => write!(f, "shift"),
            Self::Reduce(prod) => write!(f, "reduce by production {prod}"),
            Self::ShiftReduce(prod) => {
                write!(f, "shift and reduce by production {prod}")
            }
        }
    }
}

/// Language element metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LangElInfo {
    pub name: String,

    /// Tokens of this element are not delivered to the automaton,
    ///   but are instead attached to the next shifted terminal.
    pub ignore: bool,

    /// Tokens of this element suspend the parser to run a generation
    ///   action rather than being parsed.
    pub generation: bool,
}

/// Production metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProdInfo {
    /// Nonterminal produced.
    pub lhs: LangElId,

    /// Number of right-hand side elements.
    pub length: usize,

    pub name: String,

    /// Reducing by this production suspends the parser to run a
    ///   reduction action.
    pub has_action: bool,
}

/// Scanner region metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionInfo {
    pub name: String,

    /// Reaching the end of input while scanning this region suspends the
    ///   parser to run an end-of-input action.
    pub eof_action: bool,
}

/// The action chosen for a lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Transition index.
    pub trans: usize,

    pub action: Action,

    /// Index of this alternative within the transition's action list.
    pub alt: usize,

    /// Whether another alternative follows this one.
    pub more: bool,
}

/// Compiled parser tables.
///
/// See the [module-level documentation](self) for the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdaTables {
    pub indicies: Vec<i32>,
    pub owners: Vec<StateId>,
    pub keys: Vec<LangElId>,
    pub offsets: Vec<u32>,
    pub targs: Vec<StateId>,
    pub act_inds: Vec<u32>,
    pub actions: Vec<u32>,
    pub commit_len: Vec<u32>,
    pub token_region_inds: Vec<u32>,
    pub token_regions: Vec<RegionId>,

    pub lel_info: Vec<LangElInfo>,
    pub prod_info: Vec<ProdInfo>,
    pub region_info: Vec<RegionInfo>,

    pub num_states: usize,
    pub start_state: StateId,

    /// Language elements at or above this id are nonterminals.
    pub first_nonterm: LangElId,

    /// Token delivered at the end of input.
    pub eof_id: LangElId,
}

impl PdaTables {
    /// Index of the transition for `id` in state `cs`,
    ///   if any.
    pub fn lookup(&self, cs: StateId, id: LangElId) -> Option<usize> {
        let s = cs as usize;
        let (low, high) = (self.keys[s * 2], self.keys[s * 2 + 1]);

        if id < low || id > high {
            return None;
        }

        let pos = self.offsets[s] as usize + (id - low) as usize;

        if self.owners[pos] != cs {
            return None;
        }

        usize::try_from(self.indicies[pos]).ok()
    }

    /// Alternative `alt` of the action list of transition `trans`.
    pub fn alternative(&self, trans: usize, alt: usize) -> Option<Decision> {
        let codes = &self.actions[self.act_inds[trans] as usize..];
        let code = *codes.get(alt).filter(|code| **code != 0)?;

        // Codes preceding `alt` must not include the terminator.
        if codes[..alt].contains(&0) {
            return None;
        }

        Some(Decision {
            trans,
            action: Action::decode(code)?,
            alt,
            more: codes.get(alt + 1).map(|next| *next != 0).unwrap_or(false),
        })
    }

    /// Decide the action for `id` in state `cs` using alternative `alt`.
    pub fn decide(
        &self,
        cs: StateId,
        id: LangElId,
        alt: usize,
    ) -> Option<Decision> {
        self.lookup(cs, id)
            .and_then(|trans| self.alternative(trans, alt))
    }

    /// Scanner regions that may produce tokens in state `cs`,
    ///   in the order in which they are to be tried.
    pub fn regions(&self, cs: StateId) -> impl Iterator<Item = RegionId> + '_ {
        let start = self.token_region_inds[cs as usize] as usize;

        self.token_regions[start..]
            .iter()
            .copied()
            .take_while(|region| *region != 0)
    }

    pub fn is_terminal(&self, id: LangElId) -> bool {
        id < self.first_nonterm
    }

    /// Name of a language element,
    ///   or `"?"` if the id is unknown.
    pub fn lel_name(&self, id: LangElId) -> &str {
        self.lel_info
            .get(id as usize)
            .map(|info| info.name.as_str())
            .unwrap_or("?")
    }

    /// Verify that every offset and identifier in these tables is within
    ///   bounds.
    ///
    /// A parser must not be run with tables that fail validation.
    pub fn validate(&self) -> Result<(), TableError> {
        let n = self.num_states;

        check_len("keys", &self.keys, n * 2)?;
        check_len("offsets", &self.offsets, n)?;
        check_len("token_region_inds", &self.token_region_inds, n)?;
        check_len("owners", &self.owners, self.indicies.len())?;
        check_len("act_inds", &self.act_inds, self.targs.len())?;
        check_len("commit_len", &self.commit_len, self.targs.len())?;

        check_range("start_state", 0, self.start_state as usize, n)?;
        check_range("eof_id", 0, self.eof_id as usize, self.lel_info.len())?;

        (0..n).try_for_each(|s| {
            let (low, high) = (self.keys[s * 2], self.keys[s * 2 + 1]);

            if low <= high {
                let last = self.offsets[s] as usize + (high - low) as usize;
                check_range("offsets", s, last, self.indicies.len())?;
            }

            let regions = self.token_region_inds[s] as usize;
            check_range(
                "token_region_inds",
                s,
                regions,
                self.token_regions.len(),
            )?;

            match self.token_regions[regions..].iter().position(|r| *r == 0) {
                Some(_) => Ok(()),
                None => Err(TableError::Length {
                    table: "token_regions",
                    expected: self.token_regions.len() + 1,
                    found: self.token_regions.len(),
                }),
            }
        })?;

        self.indicies.iter().enumerate().try_for_each(|(i, ind)| {
            match usize::try_from(*ind) {
                Ok(trans) => {
                    check_range("indicies", i, trans, self.targs.len())
                }
                Err(_) => Ok(()),
            }
        })?;

        self.targs.iter().enumerate().try_for_each(|(i, targ)| {
            check_range("targs", i, *targ as usize, n)
        })?;

        self.act_inds
            .iter()
            .enumerate()
            .try_for_each(|(i, ind)| self.validate_action_list(i, *ind))?;

        self.token_regions.iter().enumerate().try_for_each(|(i, r)| {
            check_range("token_regions", i, *r as usize, self.region_info.len())
        })?;

        self.prod_info.iter().enumerate().try_for_each(|(i, prod)| {
            check_range("prod_info", i, prod.lhs as usize, self.lel_info.len())
        })
    }

    fn validate_action_list(
        &self,
        trans: usize,
        ind: u32,
    ) -> Result<(), TableError> {
        let start = ind as usize;
        check_range("act_inds", trans, start, self.actions.len())?;

        let codes = &self.actions[start..];
        let len = codes.iter().position(|code| *code == 0).ok_or(
            TableError::Length {
                table: "actions",
                expected: self.actions.len() + 1,
                found: self.actions.len(),
            },
        )?;

        codes[..len].iter().enumerate().try_for_each(|(i, code)| {
            let at = start + i;

            match Action::decode(*code) {
                None => Err(TableError::Range {
                    table: "actions",
                    index: at,
                    value: *code as usize,
                    bound: (ACT_SB | ACT_RB) as usize + 1,
                }),
                Some(Action::Shift) => Ok(()),
                Some(Action::Reduce(prod) | Action::ShiftReduce(prod)) => {
                    check_range(
                        "actions",
                        at,
                        prod as usize,
                        self.prod_info.len(),
                    )
                }
            }
        })
    }
}
