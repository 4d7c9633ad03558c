// Compiled table validation
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

//! Structural validation of compiled tables.
//!
//! Scanner and parser tables are produced by a grammar compiler and are
//!   trusted during execution;
//!     indexing with a bad offset will panic like any other slice access.
//! Validating tables once before use turns a malformed table into a
//!   [`TableError`] naming the offending array instead.
//!
//! Validation is structural only:
//!   it checks that every offset and identifier lands within the bounds
//!   of the array it indexes,
//!     not that the automaton is meaningful.

use crate::{
    diagnose::{Annotate, AnnotatedSpan, Diagnostic},
    fmt::{DisplayWrapper, TtQuote},
    span::UNKNOWN_SPAN,
};
use std::{error::Error, fmt::Display};

/// A compiled table is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A table is shorter than the number of entries it must hold.
    Length {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    /// The entry at `index` of `table` holds `value`,
    ///   which is not less than `bound`.
    Range {
        table: &'static str,
        index: usize,
        value: usize,
        bound: usize,
    },
}

impl TableError {
    /// The name of the offending table.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Length { table, .. } | Self::Range { table, .. } => table,
        }
    }
}

/// Require that `table` hold at least `expected` entries.
pub(crate) fn check_len<T>(
    table: &'static str,
    entries: &[T],
    expected: usize,
) -> Result<(), TableError> {
    if entries.len() < expected {
        Err(TableError::Length {
            table,
            expected,
            found: entries.len(),
        })
    } else {
        Ok(())
    }
}

/// Require that `value`,
///   found at `index` of `table`,
///   be less than `bound`.
pub(crate) fn check_range(
    table: &'static str,
    index: usize,
    value: usize,
    bound: usize,
) -> Result<(), TableError> {
    if value >= bound {
        Err(TableError::Range {
            table,
            index,
            value,
            bound,
        })
    } else {
        Ok(())
    }
}

impl Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Length {
                table,
                expected,
                found,
            } => write!(
                f,
                "table {} has {found} entries but requires {expected}",
                TtQuote::wrap(table),
            ),

            Self::Range {
                table,
                index,
                value,
                bound,
            } => write!(
                f,
                "entry {index} of table {} is {value}, \
                   which is out of range (must be less than {bound})",
                TtQuote::wrap(table),
            ),
        }
    }
}

impl Error for TableError {}

impl Diagnostic for TableError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        UNKNOWN_SPAN
            .internal_error("compiled tables are malformed")
            .with_help(
                "tables must be produced by a compatible grammar compiler",
            )
            .into()
    }
}
