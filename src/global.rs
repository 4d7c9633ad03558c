// Global constants across the entire crate
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

//! System-wide static configuration.
//!
//! This module provides a system-wide configuration.
//! Subsystems should reference these values rather than defining their own
//!   and risk incompatibilities or maintenance issues as requirements
//!   change.
//!
//! By convention,
//!   import this entire module rather than individual members and reference
//!   them as `global::foo` to emphasize their nature and risk.

/// Number of mark slots available to the actions of a single scanner.
///
/// Marks remember scan offsets within the token currently being matched.
/// Table compilers must not emit mark ids at or above this value.
pub const MARK_SLOTS: usize = 32;

/// Number of slots in each block carved out by a [`Pool`](crate::pool::Pool)
///   unless otherwise configured.
///
/// Blocks are never returned to the system allocator until the pool is
///   dropped,
///     so this is a tradeoff between the number of system allocations
///     during heavy backtracking and memory held by short parses.
pub const POOL_BLOCK_LEN: usize = 8128;

/// Number of bytes requested from a reader each time an
///   [`InputStream`](crate::input::InputStream) needs more input.
pub const STREAM_READ_LEN: usize = 8192;

/// A size capable of representing every state of a compiled automaton.
pub type StateSize = u32;

/// A size capable of representing every language element
///   (terminal and nonterminal) of a grammar.
pub type LangElSize = u32;

/// A size capable of representing every production of a grammar.
pub type ProdSize = u32;

/// A size capable of representing every live item of a single pool.
///
/// This bounds the number of parse nodes that a single run may hold at
///   once.
pub type PoolIdSize = u32;

/// A size capable of representing every scanner region of a grammar.
pub type RegionSize = u32;
