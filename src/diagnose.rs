// Diagnostic system
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

//! Diagnostic system for error reporting.
//!
//! This system is heavily motivated by Rust's.
//! Errors describe themselves as a series of [`AnnotatedSpan`]s,
//!   and a [`Report`] renders those into plain text.
//! Resolving spans against source files is the responsibility of the
//!   caller;
//!     spans produced by this crate carry line and column information
//!     already,
//!       since input streams track position as they are consumed.

use core::fmt;
use std::{borrow::Cow, error::Error, fmt::Display};

use crate::span::Span;

/// Diagnostic report.
///
/// This describes an error condition or other special event using a series
///   of [`Span`]s to describe the source, cause, and circumstances around
///   an event.
pub trait Diagnostic: Error + Sized {
    /// Produce a series of [`AnnotatedSpan`]s describing the source and
    ///   circumstances of the diagnostic event.
    fn describe(&self) -> Vec<AnnotatedSpan>;
}

/// Diagnostic severity level.
///
/// Levels are used both for entire reports and for styling of individual
///   [`AnnotatedSpan`]s.
///
/// Lower levels are more severe
///   (e.g. level 1 is the worst).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
#[repr(u8)]
pub enum Level {
    /// An error internal to the parsing engine,
    ///   which most often represents malformed tables or a caller
    ///   violating the suspension protocol.
    InternalError = 1,

    /// An error resulting from the input being parsed.
    #[default]
    Error,

    /// Useful information that supplements other messages.
    Note,

    /// Additional advice that may help in debugging or fixing a problem.
    Help,
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::InternalError => write!(f, "internal error"),
            Level::Error => write!(f, "error"),
            Level::Note => write!(f, "note"),
            Level::Help => write!(f, "help"),
        }
    }
}

/// A label associated with a report or [`Span`].
///
/// See [`AnnotatedSpan`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Label<'a>(Cow<'a, str>);

impl<'a> Display for Label<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<'a> From<String> for Label<'a> {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

impl<'a> From<&'a str> for Label<'a> {
    fn from(s: &'a str) -> Self {
        Self(Cow::Borrowed(s))
    }
}

/// A span with an associated severity level and optional label.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AnnotatedSpan<'l>(pub Span, pub Level, pub Option<Label<'l>>);

impl<'l> AnnotatedSpan<'l> {
    pub fn with_help<L: Into<Label<'l>>>(
        self,
        label: L,
    ) -> [AnnotatedSpan<'l>; 2] {
        let span = self.0;
        [self, span.help(label)]
    }

    pub fn level(&self) -> Level {
        self.1
    }
}

impl<'l> From<AnnotatedSpan<'l>> for Vec<AnnotatedSpan<'l>> {
    fn from(x: AnnotatedSpan<'l>) -> Self {
        vec![x]
    }
}

pub trait Annotate: Sized {
    /// Annotate a [`Span`] with a severity [`Level`] and an optional
    ///   [`Label`] to display alongside of it.
    fn annotate(self, level: Level, label: Option<Label>) -> AnnotatedSpan;

    /// Annotate a span as an internal error that the user is not expected
    ///   to be able to resolve.
    fn internal_error<'l, L: Into<Label<'l>>>(
        self,
        label: L,
    ) -> AnnotatedSpan<'l> {
        self.annotate(Level::InternalError, Some(label.into()))
    }

    /// Annotate a span with a clarifying label styled as an error.
    ///
    /// (This is not named `err` since it does not return an [`Err`].)
    fn error<'l, L: Into<Label<'l>>>(self, label: L) -> AnnotatedSpan<'l> {
        self.annotate(Level::Error, Some(label.into()))
    }

    /// Like [`Annotate::error`],
    ///   but without a label.
    fn mark_error(self) -> AnnotatedSpan<'static> {
        self.annotate(Level::Error, None)
    }

    /// Supplemental annotated span providing additional context for another
    ///   span.
    fn note<'l, L: Into<Label<'l>>>(self, label: L) -> AnnotatedSpan<'l> {
        self.annotate(Level::Note, Some(label.into()))
    }

    /// Provide additional information that may be used to help the user in
    ///   debugging or fixing a diagnostic.
    fn help<'l, L: Into<Label<'l>>>(self, label: L) -> AnnotatedSpan<'l> {
        self.annotate(Level::Help, Some(label.into()))
    }
}

impl<S: Into<Span>> Annotate for S {
    fn annotate(self, level: Level, label: Option<Label>) -> AnnotatedSpan {
        AnnotatedSpan(self.into(), level, label)
    }
}

/// Plain-text rendering of a [`Diagnostic`].
///
/// The report's level is the most severe level of any of its spans,
///   defaulting to [`Level::Error`].
///
/// ```text
/// error: unexpected `b` in state 3
///   --> 1:3: unexpected token
///   = help: no alternatives remain
/// ```
pub struct Report<'d, D: Diagnostic> {
    diagnostic: &'d D,
}

impl<'d, D: Diagnostic> Report<'d, D> {
    pub fn new(diagnostic: &'d D) -> Self {
        Self { diagnostic }
    }
}

impl<'d, D: Diagnostic> Display for Report<'d, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // NB: `write!` together with `\n` is preferred to `writeln!` so
        //   that there is only a single sequence of characters to search
        //   for while tracking down newlines.
        let spans = self.diagnostic.describe();
        let level = spans.iter().map(AnnotatedSpan::level).min();

        write!(f, "{}: {}\n", level.unwrap_or_default(), self.diagnostic)?;

        spans.iter().try_for_each(|AnnotatedSpan(span, level, label)| {
            match (level, label) {
                (Level::Note | Level::Help, Some(label)) => {
                    write!(f, "  = {level}: {label}\n")
                }
                (_, Some(label)) => write!(f, "  --> {span}: {label}\n"),
                (_, None) => write!(f, "  --> {span}\n"),
            }
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::span::Position;

    #[derive(Debug)]
    struct StubError(Span);

    impl Display for StubError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "stub failure")
        }
    }

    impl Error for StubError {}

    impl Diagnostic for StubError {
        fn describe(&self) -> Vec<AnnotatedSpan> {
            self.0.error("here").with_help("try again").into()
        }
    }

    #[test]
    fn report_renders_spans_in_order() {
        let span = Span::new(Position::START.advance(b"ab"), 1);

        assert_eq!(
            Report::new(&StubError(span)).to_string(),
            "error: stub failure\n  --> 1:3: here\n  = help: try again\n",
        );
    }

    #[test]
    fn report_level_is_most_severe() {
        #[derive(Debug)]
        struct Internal;

        impl Display for Internal {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "bad tables")
            }
        }

        impl Error for Internal {}

        impl Diagnostic for Internal {
            fn describe(&self) -> Vec<AnnotatedSpan> {
                vec![
                    crate::span::UNKNOWN_SPAN.note("context"),
                    crate::span::UNKNOWN_SPAN.internal_error("boom"),
                ]
            }
        }

        assert!(Report::new(&Internal)
            .to_string()
            .starts_with("internal error: bad tables\n"));
    }
}
