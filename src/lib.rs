//! Combinol - Composable Text Parser Combinators
//!
//! A toolkit for building parsers out of small, typed building blocks.
//! It provides:
//! - Character primitives over Latin-1, UTF-8, UTF-16, and UTF-32 input
//! - A full combinator set: sequencing, choice, repetition, separation,
//!   lookahead, chaining, and monadic binding
//! - A Pratt-style precedence engine for prefix/postfix/infix operators
//! - Interval-set character classes with the POSIX names and the Unicode
//!   general categories
//! - Positioned failures merged across alternatives and rendered as
//!   `line:col` messages
//! - A regex adapter and batch parsing over many inputs
//!
//! ## Quick Start
//!
//! ```rust
//! use combinol::{parse_str, combinator::{map, many1}, text::one_of};
//!
//! let number = map(many1(one_of("digit"), None), |digits| {
//!     digits
//!         .into_iter()
//!         .fold(0i64, |acc, d| acc * 10 + i64::from(d as u8 - b'0'))
//! });
//!
//! assert_eq!(parse_str("42", &number), Ok(42));
//! assert_eq!(
//!     parse_str("x", &number),
//!     Err("digit expected at 1:1".to_string())
//! );
//! ```
//!
//! ## Expressions
//!
//! ```rust
//! use combinol::{parse_str, combinator::{choice, map, many1}, text::{char, one_of}};
//! use combinol::infix::{infix_left, infix_right, prec};
//!
//! let number = map(many1(one_of("digit"), None), |ds| {
//!     ds.into_iter().fold(0i64, |acc, d| acc * 10 + i64::from(d as u8 - b'0'))
//! });
//! let op = choice(vec![
//!     infix_left(char('+'), 2, |a, b| a + b),
//!     infix_left(char('*'), 3, |a, b| a * b),
//!     infix_right(char('^'), 4, |a: i64, b| a.pow(b as u32)),
//! ]);
//! let expr = prec(number, op);
//!
//! assert_eq!(parse_str("1+2*3", &expr), Ok(7));
//! assert_eq!(parse_str("2^3^2", &expr), Ok(512));
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Debug logging in the entry points and the climbing loop
//!   using the `log` crate
//! - `parallel` - Work-stealing batch parsing via rayon

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]
#![allow(clippy::redundant_closure)]

/// Logging macro - no-op when the logging feature is disabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Logging macro - forwards to the log crate when the feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

pub(crate) use log_debug;

pub mod char_class;
pub mod combinator;
pub mod error;
pub mod infix;
pub mod input;
pub mod interval_set;
pub mod parallel;
pub mod parser;
pub mod regex_cache;
pub mod text;

// ============================================================================
// Core Types
// ============================================================================

pub use input::{Cursor, Encoding, Source};
pub use parser::{parse, parse_str, parse_with_options, try_match, Halt, MatchResult, Parser, Step};

// ============================================================================
// Errors
// ============================================================================

pub use error::{Error, ErrorContent, RenderOptions, TextLocation};

// ============================================================================
// Character Classes
// ============================================================================

pub use char_class::{Charset, ClassError, ClassSpec, Registry};
pub use interval_set::IntervalSet;

// ============================================================================
// Primitives and Combinators
// ============================================================================

pub use combinator::{
    alt, between, bind, chain_left, chain_right, choice, combine, concat, cons, empty, exclude,
    fail, filter, label, lazy, lookahead, many, many0, many1, many_until, map, map2, pair,
    parse_as, parse_with, pure, re, reduce, reverse, sappend, sconcat, scons, sep, sep1, sep_end,
    sep_end1, seq, seq_all, skip_around, skip_left, skip_many, skip_right, string_of, tag, to,
    Combine, ExternalParser, IntoCharParser, RepeatBounds, Sequence,
};
pub use text::{any, char, eof, none_of, one_of, satisfy, satisfy_named, string};

// ============================================================================
// Precedence Engine
// ============================================================================

pub use infix::{
    infix_left, infix_left_node, infix_right, infix_right_node, postfix, postfix_node, prec,
    prec_min, prefix, prefix_node, BinaryApply, OpDescriptor, OperatorAst, UnaryApply,
};

// ============================================================================
// Batch Parsing
// ============================================================================

pub use parallel::{parse_batch, parse_batch_owned};
