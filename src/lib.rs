// Resumable, reversible table-driven parsing
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

//! Runtime for table-driven scanners and backtracking parsers.
//!
//! Grammars are compiled elsewhere into flat tables;
//!   this crate executes them.
//! A parse is composed of:
//!
//!   - an [`InputStream`](input::InputStream) of bytes and pushed trees;
//!   - a [`Scanner`](fsm::Scanner) executing [`FsmTables`](fsm::FsmTables)
//!       to recognize one longest-match token at a time;
//!   - a [`PdaRun`](pda::PdaRun) executing [`PdaTables`](pda::PdaTables)
//!       to build a tree of [`Node`](tree::Node)s from those tokens,
//!         suspending whenever the caller's semantic actions are due;
//!   - a [`ReverseLog`](rcode::ReverseLog) of every mutation,
//!       through which the parser backtracks and the caller may roll a
//!       run back to any earlier step;
//!   - and a [`Pool`](pool::Pool) from which parse nodes are allocated.
//!
//! Failures are reported as [`Diagnostic`](diagnose::Diagnostic)s.

// We build docs for private items.
#![allow(rustdoc::private_intra_doc_links)]

pub mod global;

#[macro_use]
extern crate static_assertions;

pub mod diagnose;
pub mod fmt;
pub mod fsm;
pub mod input;
pub mod pda;
pub mod pool;
pub mod rcode;
pub mod span;
pub mod table;
pub mod tree;

#[cfg(test)]
pub mod test;
