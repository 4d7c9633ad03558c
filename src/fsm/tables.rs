// Compiled scanner tables
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

//! Flat tables describing a compiled scanner.
//!
//! Transitions are stored in a compressed key layout.
//! For each state `s`,
//!   beginning at `trans_keys[key_offsets[s]]`,
//!   are `single_lengths[s]` sorted single keys followed by
//!   `range_lengths[s]` sorted inclusive `(low, high)` key pairs.
//! Transitions are numbered beginning at `index_offsets[s]` in that same
//!   order,
//!     with one final default transition taken when no key matches:
//!
//! ```text
//!   index_offsets[s] + i                      single key i
//!   index_offsets[s] + singles + j            range j
//!   index_offsets[s] + singles + ranges       default
//! ```
//!
//! A transition `t` enters state `trans_targs[t]` and executes the action
//!   list at offset `trans_actions[t]` of `actions`.
//! Action lists are stored as `[n, a1, ..., an]`,
//!   where each `a` indexes [`FsmTables::action_switch`];
//!     offset `0` denotes the empty list,
//!       so `actions[0]` is never itself a list.

use super::FsmAction;
use crate::{
    global,
    table::{check_len, check_range, TableError},
    tree::StateId,
};

/// Compiled scanner tables.
///
/// See the [module-level documentation](self) for the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FsmTables {
    pub actions: Vec<u32>,
    pub key_offsets: Vec<u32>,
    pub trans_keys: Vec<u8>,
    pub single_lengths: Vec<u32>,
    pub range_lengths: Vec<u32>,
    pub index_offsets: Vec<u32>,
    pub trans_targs: Vec<StateId>,
    pub trans_actions: Vec<u32>,

    /// Action list offsets run after arriving in each state.
    pub to_state_actions: Vec<u32>,

    /// Action list offsets run in each state before a unit is consumed.
    pub from_state_actions: Vec<u32>,

    /// Action list offsets run in each state at the end of input.
    pub eof_actions: Vec<u32>,

    /// Entry state for each scanner region.
    pub entry_by_region: Vec<StateId>,

    pub action_switch: Vec<FsmAction>,

    pub num_states: usize,
    pub start_state: StateId,

    /// States at or above this are final.
    pub first_final: StateId,

    /// The dead state;
    ///   entering it ends the scan.
    pub error_state: StateId,
}

impl FsmTables {
    /// The transition taken from state `cs` on `key`.
    pub fn transition(&self, cs: StateId, key: u8) -> usize {
        let s = cs as usize;
        let keys = self.key_offsets[s] as usize;
        let singles = self.single_lengths[s] as usize;
        let ranges = self.range_lengths[s] as usize;
        let base = self.index_offsets[s] as usize;

        let singles_keys = &self.trans_keys[keys..keys + singles];
        if let Ok(i) = singles_keys.binary_search(&key) {
            return base + i;
        }

        let pairs = &self.trans_keys[keys + singles..][..ranges * 2];

        // First range whose upper bound is not below `key`.
        let (mut lo, mut hi) = (0, ranges);
        while lo < hi {
            let mid = (lo + hi) / 2;
            if pairs[mid * 2 + 1] < key {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        if lo < ranges && pairs[lo * 2] <= key {
            base + singles + lo
        } else {
            base + singles + ranges
        }
    }

    /// The actions of the list at `offset` of [`Self::actions`].
    pub fn action_list(
        &self,
        offset: u32,
    ) -> impl Iterator<Item = FsmAction> + '_ {
        let list = match offset as usize {
            0 => &[][..],
            off => {
                let n = self.actions[off] as usize;
                &self.actions[off + 1..off + 1 + n]
            }
        };

        list.iter().map(|a| self.action_switch[*a as usize])
    }

    /// Verify that every offset and identifier in these tables is within
    ///   bounds.
    ///
    /// A scanner must not be run with tables that fail validation.
    pub fn validate(&self) -> Result<(), TableError> {
        let n = self.num_states;

        check_len("key_offsets", &self.key_offsets, n)?;
        check_len("single_lengths", &self.single_lengths, n)?;
        check_len("range_lengths", &self.range_lengths, n)?;
        check_len("index_offsets", &self.index_offsets, n)?;
        check_len("to_state_actions", &self.to_state_actions, n)?;
        check_len("from_state_actions", &self.from_state_actions, n)?;
        check_len("eof_actions", &self.eof_actions, n)?;
        check_len(
            "trans_actions",
            &self.trans_actions,
            self.trans_targs.len(),
        )?;

        check_range("start_state", 0, self.start_state as usize, n)?;
        check_range("error_state", 0, self.error_state as usize, n)?;
        check_range("first_final", 0, self.first_final as usize, n + 1)?;

        self.entry_by_region.iter().enumerate().try_for_each(|(i, s)| {
            check_range("entry_by_region", i, *s as usize, n)
        })?;

        (0..n).try_for_each(|s| {
            let singles = self.single_lengths[s] as usize;
            let ranges = self.range_lengths[s] as usize;

            check_len(
                "trans_keys",
                &self.trans_keys,
                self.key_offsets[s] as usize + singles + ranges * 2,
            )?;

            // Singles, ranges, and the default transition.
            check_len(
                "trans_targs",
                &self.trans_targs,
                self.index_offsets[s] as usize + singles + ranges + 1,
            )
        })?;

        self.trans_targs.iter().enumerate().try_for_each(|(i, t)| {
            check_range("trans_targs", i, *t as usize, n)
        })?;

        [
            ("trans_actions", &self.trans_actions),
            ("to_state_actions", &self.to_state_actions),
            ("from_state_actions", &self.from_state_actions),
            ("eof_actions", &self.eof_actions),
        ]
        .into_iter()
        .try_for_each(|(table, offsets)| {
            offsets.iter().enumerate().try_for_each(|(i, off)| {
                self.validate_action_list(table, i, *off)
            })
        })?;

        self.action_switch
            .iter()
            .enumerate()
            .try_for_each(|(i, act)| match act {
                FsmAction::Mark(slot)
                | FsmAction::AcceptAtMark { slot, .. } => {
                    check_range("action_switch", i, *slot, global::MARK_SLOTS)
                }
                FsmAction::Token(_) | FsmAction::Accept(_) => Ok(()),
            })
    }

    fn validate_action_list(
        &self,
        table: &'static str,
        index: usize,
        offset: u32,
    ) -> Result<(), TableError> {
        let off = offset as usize;

        if off == 0 {
            return Ok(());
        }

        check_range(table, index, off, self.actions.len())?;

        let n = self.actions[off] as usize;
        check_len("actions", &self.actions, off + 1 + n)?;

        self.actions[off + 1..off + 1 + n]
            .iter()
            .enumerate()
            .try_for_each(|(i, a)| {
                let bound = self.action_switch.len();
                check_range("actions", off + 1 + i, *a as usize, bound)
            })
    }

    /// Whether `state` is final.
    pub fn is_final(&self, state: StateId) -> bool {
        state >= self.first_final
    }
}
