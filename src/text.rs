//! Character primitives
//!
//! The leaf parsers: each one decodes at most one codepoint (or one
//! literal) at the cursor and either advances or fails with the error
//! content the class of primitive prescribes.
//!
//! Class-based primitives resolve their descriptor when the parser is
//! built, against the Unicode registry; the [`latin1`] submodule provides
//! the flavors that resolve against the Latin-1 table instead. A malformed
//! descriptor (unknown name, inverted range) panics at construction time —
//! it is a programming error in the grammar, not a parse failure.
//!
//! # Example
//!
//! ```
//! use combinol::{parse_str, text::{char, one_of}};
//!
//! assert_eq!(parse_str("x", &one_of("lower")), Ok('x'));
//! assert_eq!(parse_str("+", &char('+')), Ok('+'));
//! assert!(parse_str("", &one_of("lower")).is_err());
//! ```

use crate::char_class::{Charset, ClassSpec, Registry};
use crate::error::{Error, END_OF_INPUT};
use crate::parser::{Halt, Parser};

/// Consume any one codepoint.
///
/// Fails with `unexpected end of input` on empty (or malformed) input.
pub fn any() -> Parser<char> {
    Parser::new(|src, at| match src.step(at) {
        Some((c, next)) => Ok((next, c)),
        None => Err(Halt::new(at, Error::unexpected(END_OF_INPUT, at.pos))),
    })
}

/// Consume exactly the given codepoint.
pub fn char(expected: char) -> Parser<char> {
    Parser::new(move |src, at| match src.step(at) {
        Some((c, next)) if c == expected => Ok((next, c)),
        _ => Err(Halt::new(
            at,
            Error::expected(format!("`{}'", expected), at.pos),
        )),
    })
}

fn class_parser(charset: Charset) -> Parser<char> {
    let desc = charset.expected_desc();
    Parser::new(move |src, at| match src.step(at) {
        Some((c, next)) if charset.contains(c) => Ok((next, c)),
        _ => Err(Halt::new(at, Error::expected(desc.clone(), at.pos))),
    })
}

fn negated_class_parser(charset: Charset, table: &Registry) -> Parser<char> {
    let desc = charset.negated_desc();
    let negated = charset.negate(table);
    Parser::new(move |src, at| match src.step(at) {
        Some((c, next)) if negated.contains(c) => Ok((next, c)),
        _ => Err(Halt::new(at, Error::expected(desc.clone(), at.pos))),
    })
}

/// Consume one codepoint inside the described class (Unicode registry).
///
/// The failure description follows the descriptor's shape: a bare name for
/// a single named class, a back-quoted character for a singleton, and
/// `one of [...]` for anything else.
///
/// # Panics
///
/// Panics if the descriptor names an unknown class or holds an inverted
/// range.
pub fn one_of(desc: impl Into<ClassSpec>) -> Parser<char> {
    let charset = Charset::resolve(desc, Registry::unicode()).expect("invalid charset descriptor");
    class_parser(charset)
}

/// Consume one codepoint outside the described class (Unicode registry).
///
/// # Panics
///
/// As [`one_of`].
pub fn none_of(desc: impl Into<ClassSpec>) -> Parser<char> {
    let charset = Charset::resolve(desc, Registry::unicode()).expect("invalid charset descriptor");
    negated_class_parser(charset, Registry::unicode())
}

/// Consume one codepoint satisfying a predicate.
///
/// Failure reports the offending codepoint, or end of input.
pub fn satisfy<F>(pred: F) -> Parser<char>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    Parser::new(move |src, at| match src.step(at) {
        Some((c, next)) if pred(c) => Ok((next, c)),
        Some((c, _)) => Err(Halt::new(
            at,
            Error::unexpected(format!("`{}'", c), at.pos),
        )),
        None => Err(Halt::new(at, Error::unexpected(END_OF_INPUT, at.pos))),
    })
}

/// [`satisfy`] with a name used in the failure message instead of the
/// offending codepoint.
pub fn satisfy_named<F>(name: impl Into<String>, pred: F) -> Parser<char>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    let name = name.into();
    Parser::new(move |src, at| match src.step(at) {
        Some((c, next)) if pred(c) => Ok((next, c)),
        _ => Err(Halt::new(at, Error::expected(name.clone(), at.pos))),
    })
}

/// Consume the literal, codepoint by codepoint, yielding it as a `String`.
///
/// The position advances by the literal's length in codepoints.
pub fn string(expected: impl Into<String>) -> Parser<String> {
    let expected = expected.into();
    Parser::new(move |src, at| {
        let mut cur = at;
        for want in expected.chars() {
            match src.step(cur) {
                Some((c, next)) if c == want => cur = next,
                _ => {
                    return Err(Halt::new(
                        at,
                        Error::expected(format!("`{}'", expected), at.pos),
                    ))
                }
            }
        }
        Ok((cur, expected.clone()))
    })
}

/// Succeed with `()` only at the end of input.
pub fn eof() -> Parser<()> {
    Parser::new(|src, at| {
        if src.at_end(at.byte) {
            Ok((at, ()))
        } else {
            Err(Halt::new(at, Error::expected(END_OF_INPUT, at.pos)))
        }
    })
}

/// Class primitives resolved against the Latin-1 POSIX table.
///
/// Matching is identical to the Unicode flavors for any codepoint a
/// Latin-1 source can decode; what changes is the meaning of the POSIX
/// names (ASCII-ranged) and the complement universe (`0..=0xFF`).
pub mod latin1 {
    use super::*;

    /// [`one_of`](super::one_of) against the Latin-1 table.
    ///
    /// # Panics
    ///
    /// Panics on a malformed descriptor, including Unicode category names,
    /// which the Latin-1 table does not carry.
    pub fn one_of(desc: impl Into<ClassSpec>) -> Parser<char> {
        let charset =
            Charset::resolve(desc, Registry::latin1()).expect("invalid charset descriptor");
        class_parser(charset)
    }

    /// [`none_of`](super::none_of) against the Latin-1 table.
    ///
    /// # Panics
    ///
    /// As [`one_of`].
    pub fn none_of(desc: impl Into<ClassSpec>) -> Parser<char> {
        let charset =
            Charset::resolve(desc, Registry::latin1()).expect("invalid charset descriptor");
        negated_class_parser(charset, Registry::latin1())
    }

    /// [`string_of`](crate::combinator::string_of) over a Latin-1 class.
    pub fn string_of(
        desc: impl Into<ClassSpec>,
        bounds: impl crate::combinator::RepeatBounds,
    ) -> Parser<String> {
        crate::combinator::string_of(one_of(desc), bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Source;
    use crate::parser::{parse, parse_str, try_match, MatchResult};

    #[test]
    fn test_any_consumes_one_codepoint() {
        let src = Source::utf8("über");
        match try_match(&src, &any()) {
            MatchResult::Success { rest, pos, value } => {
                assert_eq!(value, 'ü');
                assert_eq!(pos, 1);
                assert_eq!(rest, "ber".as_bytes());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_any_on_empty() {
        assert_eq!(
            parse_str("", &any()),
            Err("unexpected end of input at 1:1".to_string())
        );
    }

    #[test]
    fn test_char_match_and_mismatch() {
        assert_eq!(parse_str("+1", &char('+')), Ok('+'));
        assert_eq!(
            parse_str("x", &char('+')),
            Err("`+' expected at 1:1".to_string())
        );
    }

    #[test]
    fn test_one_of_named_class() {
        assert_eq!(parse_str("q", &one_of("lower")), Ok('q'));
        assert_eq!(
            parse_str("", &one_of("lower")),
            Err("lower expected at 1:1".to_string())
        );
        assert_eq!(
            parse_str("Q", &one_of("lower")),
            Err("lower expected at 1:1".to_string())
        );
    }

    #[test]
    fn test_one_of_singleton_renders_quoted() {
        assert_eq!(
            parse_str("y", &one_of('x')),
            Err("`x' expected at 1:1".to_string())
        );
    }

    #[test]
    fn test_one_of_listing() {
        let p = one_of(ClassSpec::list([
            ClassSpec::from("digit"),
            ClassSpec::from('_'),
        ]));
        assert_eq!(parse_str("_", &p), Ok('_'));
        assert_eq!(
            parse_str("x", &p),
            Err("one of [digit, '_'] expected at 1:1".to_string())
        );
    }

    #[test]
    fn test_none_of() {
        let p = none_of("digit");
        assert_eq!(parse_str("x", &p), Ok('x'));
        assert_eq!(
            parse_str("7", &p),
            Err("not digit expected at 1:1".to_string())
        );
    }

    #[test]
    fn test_satisfy_reports_offender() {
        let p = satisfy(|c| c == 'a');
        assert_eq!(parse_str("a", &p), Ok('a'));
        assert_eq!(parse_str("b", &p), Err("unexpected `b' at 1:1".to_string()));
    }

    #[test]
    fn test_satisfy_named() {
        let p = satisfy_named("vowel", |c| "aeiou".contains(c));
        assert_eq!(parse_str("e", &p), Ok('e'));
        assert_eq!(parse_str("z", &p), Err("vowel expected at 1:1".to_string()));
    }

    #[test]
    fn test_string_advances_by_codepoints() {
        let src = Source::utf8("übermensch");
        match try_match(&src, &string("über")) {
            MatchResult::Success { pos, value, .. } => {
                assert_eq!(value, "über");
                assert_eq!(pos, 4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_string_mismatch() {
        assert_eq!(
            parse_str("foobar", &string("food")),
            Err("`food' expected at 1:1".to_string())
        );
    }

    #[test]
    fn test_eof() {
        assert_eq!(parse_str("", &eof()), Ok(()));
        assert_eq!(
            parse_str("x", &eof()),
            Err("end of input expected at 1:1".to_string())
        );
    }

    #[test]
    fn test_latin1_alpha_is_ascii_ranged() {
        let bytes = [b'f', 0xE9]; // 'f', 'é'
        let src = Source::latin1(&bytes);
        assert_eq!(parse(&src, &latin1::one_of("alpha")), Ok('f'));
        // 0xE9 is alphabetic in Unicode but outside the Latin-1 POSIX table
        let tail = [0xE9u8];
        let src = Source::latin1(&tail);
        assert!(parse(&src, &latin1::one_of("alpha")).is_err());
        assert!(parse(&src, &one_of("alpha")).is_ok());
    }

    #[test]
    fn test_latin1_none_of_accepts_high_bytes() {
        let bytes = [0xFEu8];
        let src = Source::latin1(&bytes);
        assert_eq!(parse(&src, &latin1::none_of("digit")), Ok('þ'));
    }

    #[test]
    #[should_panic(expected = "invalid charset descriptor")]
    fn test_unknown_class_panics_at_construction() {
        let _ = one_of("not_a_class");
    }
}
