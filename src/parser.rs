//! The parser primitive and the entry points
//!
//! A [`Parser<T>`] is a value: a cheaply clonable handle around a shared
//! closure from `(source, cursor)` to a [`Step`]. Combinators compose
//! parsers by wrapping these closures; nothing runs until an entry point
//! applies the parser to a [`Source`].
//!
//! The original formulation threads a continuation through every parser.
//! Here that protocol is linearized into a direct-style result: a step is
//! either `(cursor, value)` or a [`Halt`] carrying the failure and the
//! cursor it surfaced at. The observable contract is unchanged — input,
//! position, and a three-shape outcome — and backtracking is a caller
//! rewinding to a saved cursor instead of declining to invoke a
//! continuation.
//!
//! # Example
//!
//! ```
//! use combinol::{parse_str, text};
//!
//! let parser = text::string("hello");
//! assert_eq!(parse_str("hello world", &parser), Ok("hello".to_string()));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, RenderOptions};
use crate::input::{Cursor, Source};
use crate::log_debug;

/// A failed step: the cursor the failure surfaced at plus the failure
/// itself. The error keeps its own (possibly further) position; `at` is
/// what the enclosing construct reports as its boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halt {
    /// Cursor at which the enclosing construct stopped.
    pub at: Cursor,
    /// The failure, positioned at its own diagnosis point.
    pub error: Error,
}

impl Halt {
    /// A halt whose reported cursor is the failure position itself.
    pub fn new(at: Cursor, error: Error) -> Halt {
        Halt { at, error }
    }
}

/// The outcome of running a parser at a cursor.
pub type Step<T> = Result<(Cursor, T), Halt>;

/// A composable parser producing a `T`.
///
/// Parsers are immutable and `Send + Sync`; cloning shares the underlying
/// closure. They are pure: applying one never mutates shared state, so a
/// single parser value can serve any number of inputs, on any thread.
pub struct Parser<T> {
    run: Arc<dyn for<'s> Fn(&Source<'s>, Cursor) -> Step<T> + Send + Sync>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Parser {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T> fmt::Debug for Parser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser").finish_non_exhaustive()
    }
}

impl<T: 'static> Parser<T> {
    /// Wrap a step function into a parser.
    pub fn new<F>(f: F) -> Parser<T>
    where
        F: for<'s> Fn(&Source<'s>, Cursor) -> Step<T> + Send + Sync + 'static,
    {
        Parser { run: Arc::new(f) }
    }

    /// Run this parser at a cursor.
    #[inline]
    pub fn run(&self, source: &Source<'_>, at: Cursor) -> Step<T> {
        (self.run)(source, at)
    }

    /// Transform the produced value. See [`crate::combinator::map`].
    pub fn map<U, F>(self, f: F) -> Parser<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        crate::combinator::map(self, f)
    }

    /// Replace the produced value. See [`crate::combinator::to`].
    pub fn to<U>(self, value: U) -> Parser<U>
    where
        U: Clone + Send + Sync + 'static,
    {
        crate::combinator::to(self, value)
    }

    /// Monadic chaining. See [`crate::combinator::bind`].
    pub fn bind<U, F>(self, f: F) -> Parser<U>
    where
        U: 'static,
        F: Fn(T) -> Parser<U> + Send + Sync + 'static,
    {
        crate::combinator::bind(self, f)
    }

    /// Keep only values passing a predicate. See
    /// [`crate::combinator::filter`].
    pub fn filter<F>(self, pred: F) -> Parser<T>
    where
        T: fmt::Debug,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        crate::combinator::filter(self, pred)
    }

    /// Rename shallow failures. See [`crate::combinator::label`].
    pub fn label(self, name: impl Into<String>) -> Parser<T> {
        crate::combinator::label(self, name)
    }
}

/// The tuple-shaped outcome of [`try_match`]: either the remaining input
/// with the end cursor and value, or the failure with the cursor it
/// surfaced at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult<'s, T> {
    /// The parser succeeded.
    Success {
        /// Bytes after the consumed prefix.
        rest: &'s [u8],
        /// Codepoints consumed.
        pos: usize,
        /// The produced value.
        value: T,
    },
    /// The parser failed.
    Failure {
        /// Bytes from the reported failure boundary.
        rest: &'s [u8],
        /// Codepoint position of the failure boundary.
        pos: usize,
        /// The failure, positioned at its own diagnosis point.
        error: Error,
    },
}

impl<'s, T> MatchResult<'s, T> {
    /// True on the success shape.
    pub fn is_success(&self) -> bool {
        matches!(self, MatchResult::Success { .. })
    }

    /// The value, when successful.
    pub fn into_value(self) -> Option<T> {
        match self {
            MatchResult::Success { value, .. } => Some(value),
            MatchResult::Failure { .. } => None,
        }
    }

    /// The failure, when failed.
    pub fn into_error(self) -> Option<Error> {
        match self {
            MatchResult::Success { .. } => None,
            MatchResult::Failure { error, .. } => Some(error),
        }
    }
}

/// Run a parser from the start of a source and return the tuple-shaped
/// result.
pub fn try_match<'s, T>(source: &Source<'s>, parser: &Parser<T>) -> MatchResult<'s, T>
where
    T: 'static,
{
    log_debug!("try_match: {} byte(s), {:?}", source.bytes().len(), source.encoding());
    match parser.run(source, Cursor::start()) {
        Ok((at, value)) => MatchResult::Success {
            rest: source.rest(at.byte),
            pos: at.pos,
            value,
        },
        Err(halt) => MatchResult::Failure {
            rest: source.rest(halt.at.byte),
            pos: halt.at.pos,
            error: halt.error,
        },
    }
}

/// Run a parser and either return its value or render the failure against
/// the source with the given options.
pub fn parse_with_options<T>(
    source: &Source<'_>,
    parser: &Parser<T>,
    opts: &RenderOptions,
) -> Result<T, String>
where
    T: 'static,
{
    match parser.run(source, Cursor::start()) {
        Ok((_, value)) => Ok(value),
        Err(halt) => {
            let rendered = halt.error.full_message(source, opts);
            log_debug!("parse failed: {}", rendered);
            Err(rendered)
        }
    }
}

/// Run a parser and either return its value or a rendered failure message
/// (default rendering options).
///
/// Consuming the whole input is not required; grammars that need it end
/// with [`crate::text::eof`].
pub fn parse<T>(source: &Source<'_>, parser: &Parser<T>) -> Result<T, String>
where
    T: 'static,
{
    parse_with_options(source, parser, &RenderOptions::default())
}

/// [`parse`] over a UTF-8 string slice.
pub fn parse_str<T>(input: &str, parser: &Parser<T>) -> Result<T, String>
where
    T: 'static,
{
    parse(&Source::utf8(input), parser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorContent;

    fn unit() -> Parser<char> {
        Parser::new(|src, at| match src.step(at) {
            Some((c, next)) => Ok((next, c)),
            None => Err(Halt::new(at, Error::unexpected("end of input", at.pos))),
        })
    }

    #[test]
    fn test_parser_is_cheaply_clonable() {
        let p = unit();
        let q = p.clone();
        let src = Source::utf8("ab");
        assert!(p.run(&src, Cursor::start()).is_ok());
        assert!(q.run(&src, Cursor::start()).is_ok());
    }

    #[test]
    fn test_try_match_success_shape() {
        let src = Source::utf8("ab");
        match try_match(&src, &unit()) {
            MatchResult::Success { rest, pos, value } => {
                assert_eq!(rest, b"b");
                assert_eq!(pos, 1);
                assert_eq!(value, 'a');
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_try_match_failure_shape() {
        let src = Source::utf8("");
        match try_match(&src, &unit()) {
            MatchResult::Failure { rest, pos, error } => {
                assert_eq!(rest, b"");
                assert_eq!(pos, 0);
                assert_eq!(error.content, ErrorContent::Unexpected("end of input".into()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_renders_failure() {
        let src = Source::utf8("");
        let out = parse(&src, &unit());
        assert_eq!(out, Err("unexpected end of input at 1:1".to_string()));
    }

    #[test]
    fn test_parse_ignores_trailing_input() {
        assert_eq!(parse_str("abc", &unit()), Ok('a'));
    }

    #[test]
    fn test_method_chaining() {
        let p = unit().map(|c| c.to_ascii_uppercase()).to(42u32);
        assert_eq!(parse_str("x", &p), Ok(42));
    }

    #[test]
    fn test_parsers_are_send_sync() {
        fn assert_send_sync<X: Send + Sync>(_: &X) {}
        let p = unit();
        assert_send_sync(&p);
    }
}
