// Display formatting utilities
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

//! Typed formatting helpers.
//!
//! These types create composable formatters for use with [`Display`].
//! Whereas [`Display`] operates on data owned by the type implementing it,
//!   these formatters compose into functions that operate on data provided
//!   _to_ it.
//!
//! [`DisplayWrapper::wrap`] can be used to associate wrappers with data,
//!   effectively creating a custom [`Display`] implementation controlled
//!   by the caller:
//!
//! ```
//! # use retrace::fmt::*;
//! assert_eq!(TtQuote::wrap("ws").to_string(), "`ws`");
//! assert_eq!(
//!     TtQuote::wrap(Escaped(b"a\tb")).to_string(),
//!     "`a\\tb`",
//! );
//! ```

use std::{
    fmt::{Display, Formatter, Result},
    marker::PhantomData,
};

/// Wrapper for a [`Display`]-able type.
///
/// See the [module-level documentation](self) for more information.
pub trait DisplayWrapper {
    /// Transform inner data and output using the provided [`Formatter`].
    fn fmt<T: Display>(inner: T, f: &mut Formatter) -> Result;

    /// Associate data with a [`DisplayWrapper`] for rendering using
    ///   [`Display`].
    ///
    /// This has the effect of creating an arbitrary [`Display`]
    ///   implementation for the wrapped object,
    ///     which will work well with [`format!`] and anything else that
    ///     does not have access to an explicit [`Formatter`].
    fn wrap<T: Display>(inner: T) -> Wrap<Self, T> {
        Wrap {
            inner,
            _phantom: Default::default(),
        }
    }
}

/// Wrapper with associated data.
pub struct Wrap<W: DisplayWrapper + ?Sized, T: Display> {
    inner: T,
    _phantom: PhantomData<W>,
}

impl<W: DisplayWrapper, T: Display> Display for Wrap<W, T> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        W::fmt(&self.inner, f)
    }
}

/// Denote text that would conventionally be delimited in a teletypewriter
///   font.
///
/// This produces a markdown-style quote using backticks.
///
/// NB: This does not defend against nested quotes,
///   so this is _not_ safe against format escapes.
pub struct TtQuote;

impl DisplayWrapper for TtQuote {
    fn fmt<T: Display>(inner: T, f: &mut Formatter) -> Result {
        f.write_str("`")?;
        inner.fmt(f)?;
        f.write_str("`")
    }
}

/// Render raw token bytes for humans.
///
/// Token text is arbitrary bytes that may not be valid UTF-8 and may
///   contain whitespace that would otherwise be invisible in diagnostic
///   output.
pub struct Escaped<'a>(pub &'a [u8]);

impl<'a> Display for Escaped<'a> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        self.0
            .iter()
            .flat_map(|b| std::ascii::escape_default(*b))
            .try_for_each(|b| {
                f.write_str(char::from(b).encode_utf8(&mut [0; 4]))
            })
    }
}
