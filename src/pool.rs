// Block-based freelist allocator
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

//! Pool allocator for fixed-size items.
//!
//! A [`Pool`] hands out slots from a list of fixed-capacity blocks and
//!   recycles released slots through an intrusive freelist.
//! Items are addressed by [`PoolId`] rather than by reference,
//!   which allows them to be linked together into stacks and chains
//!   without fighting the borrow checker.
//!
//! Blocks are never released until the pool is dropped;
//!   there is no compaction.
//! Backtracking parsers allocate and free nodes at a high rate,
//!   but the number of live nodes stays roughly bounded,
//!   so reuse through the freelist is what matters.
//!
//! Every slot is either live or on the freelist,
//!   never both.

use crate::{
    diagnose::{Annotate, AnnotatedSpan, Diagnostic},
    global,
    span::UNKNOWN_SPAN,
};
use std::{
    error::Error,
    fmt::Display,
    num::NonZeroU32,
    ops::{Index, IndexMut},
};

/// Identifier of a slot within a [`Pool`].
///
/// Ids are 1-indexed internally so that [`Option<PoolId>`] costs nothing
///   over [`PoolId`],
///     which is important since every link between parse nodes is an
///     optional id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolId(NonZeroU32);

assert_eq_size!(Option<PoolId>, PoolId);
assert_eq_size!(PoolId, global::PoolIdSize);

impl PoolId {
    fn from_index(index: usize) -> Option<Self> {
        global::PoolIdSize::try_from(index)
            .ok()
            .and_then(|i| i.checked_add(1))
            .and_then(NonZeroU32::new)
            .map(Self)
    }

    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl Display for PoolId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.index())
    }
}

#[derive(Debug)]
enum Slot<T> {
    Live(T),
    Free(Option<PoolId>),
}

/// Block-based freelist allocator.
///
/// See the [module-level documentation](self) for more information.
#[derive(Debug)]
pub struct Pool<T> {
    blocks: Vec<Vec<Slot<T>>>,

    /// Head of the freelist,
    ///   threaded through [`Slot::Free`].
    free: Option<PoolId>,

    block_len: usize,
    max_blocks: usize,
    live: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    /// A pool of [`global::POOL_BLOCK_LEN`]-sized blocks limited only by
    ///   the id space.
    pub fn new() -> Self {
        Self::with_limits(global::POOL_BLOCK_LEN, usize::MAX)
    }

    /// A pool of `block_len`-sized blocks that will refuse to allocate
    ///   more than `max_blocks` blocks.
    ///
    /// Blocks hold at least one slot;
    ///   a `block_len` of `0` is treated as `1`.
    pub fn with_limits(block_len: usize, max_blocks: usize) -> Self {
        Self {
            blocks: Vec::new(),
            free: None,
            block_len: block_len.max(1),
            max_blocks,
            live: 0,
        }
    }

    /// Allocate a slot for `value`.
    ///
    /// Slots are taken first from the freelist,
    ///   then from the remaining space in the most recent block,
    ///   and finally from a newly allocated block.
    pub fn alloc(&mut self, value: T) -> Result<PoolId, AllocError> {
        let id = match self.free {
            Some(id) => {
                let next = match self.slot_mut(id) {
                    Slot::Free(next) => *next,
                    Slot::Live(_) => {
                        unreachable!("pool freelist references live {id}")
                    }
                };

                self.free = next;
                *self.slot_mut(id) = Slot::Live(value);

                id
            }

            None => self.carve(value)?,
        };

        self.live += 1;
        Ok(id)
    }

    fn carve(&mut self, value: T) -> Result<PoolId, AllocError> {
        let needs_block = self
            .blocks
            .last()
            .map(|block| block.len() == self.block_len)
            .unwrap_or(true);

        if needs_block {
            if self.blocks.len() >= self.max_blocks {
                return Err(AllocError::BlockLimit(self.max_blocks));
            }

            let mut block = Vec::new();
            block
                .try_reserve_exact(self.block_len)
                .map_err(|_| AllocError::Refused(self.block_len))?;

            self.blocks.push(block);
        }

        let bi = self.blocks.len() - 1;
        let index = bi * self.block_len + self.blocks[bi].len();
        let id = PoolId::from_index(index).ok_or(AllocError::IdSpace)?;

        self.blocks[bi].push(Slot::Live(value));
        Ok(id)
    }

    /// Release the slot `id`,
    ///   returning its value.
    ///
    /// Releasing a slot that is already free yields [`None`] and leaves the
    ///   pool unchanged.
    pub fn free(&mut self, id: PoolId) -> Option<T> {
        let head = self.free;
        let slot = self.blocks.get_mut(id.index() / self.block_len)?.get_mut(
            id.index() % self.block_len,
        )?;

        match std::mem::replace(slot, Slot::Free(head)) {
            Slot::Live(value) => {
                self.free = Some(id);
                self.live -= 1;
                Some(value)
            }
            free @ Slot::Free(_) => {
                *slot = free;
                None
            }
        }
    }

    pub fn get(&self, id: PoolId) -> Option<&T> {
        match self
            .blocks
            .get(id.index() / self.block_len)?
            .get(id.index() % self.block_len)?
        {
            Slot::Live(value) => Some(value),
            Slot::Free(_) => None,
        }
    }

    pub fn get_mut(&mut self, id: PoolId) -> Option<&mut T> {
        match self
            .blocks
            .get_mut(id.index() / self.block_len)?
            .get_mut(id.index() % self.block_len)?
        {
            Slot::Live(value) => Some(value),
            Slot::Free(_) => None,
        }
    }

    /// Number of live items.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of slots held by the pool,
    ///   live or free.
    pub fn capacity(&self) -> usize {
        self.blocks.len() * self.block_len
    }

    pub fn blocks(&self) -> usize {
        self.blocks.len()
    }

    fn slot_mut(&mut self, id: PoolId) -> &mut Slot<T> {
        &mut self.blocks[id.index() / self.block_len]
            [id.index() % self.block_len]
    }
}

impl<T> Index<PoolId> for Pool<T> {
    type Output = T;

    /// Panics
    /// ------
    /// Like slice indexing,
    ///   this panics if `id` does not reference a live slot.
    fn index(&self, id: PoolId) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("pool slot {id} is not live"),
        }
    }
}

impl<T> IndexMut<PoolId> for Pool<T> {
    fn index_mut(&mut self, id: PoolId) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("pool slot {id} is not live"),
        }
    }
}

/// The pool is unable to grow.
///
/// This is a resource error and is never the fault of the input being
///   parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// The configured maximum number of blocks has been reached.
    BlockLimit(usize),

    /// The system allocator refused a block of the given number of slots.
    Refused(usize),

    /// The next slot would not be addressable by a [`PoolId`].
    IdSpace,
}

impl Display for AllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::BlockLimit(n) => {
                write!(f, "node pool exhausted its limit of {n} blocks")
            }
            Self::Refused(n) => {
                write!(f, "unable to allocate node pool block of {n} slots")
            }
            Self::IdSpace => write!(f, "node pool exhausted its id space"),
        }
    }
}

impl Error for AllocError {}

impl Diagnostic for AllocError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        UNKNOWN_SPAN
            .internal_error("parse node storage could not grow")
            .into()
    }
}

#[cfg(test)]
mod test;
