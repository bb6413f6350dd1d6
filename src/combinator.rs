//! The composition algebra
//!
//! Every function here takes parsers and returns a parser. Three families
//! do the heavy lifting:
//!
//! - **sequencing** threads one cursor through several parsers and shapes
//!   their values (pairs, flat tuples, lists, strings);
//! - **choice** retries alternatives from the branch-entry cursor —
//!   backtracking is unconditional, there is no notion of a committed
//!   branch — and merges the failures of dead alternatives;
//! - **repetition** loops a parser greedily under a [`RepeatBounds`],
//!   stopping the loop whenever an iteration fails to advance the cursor
//!   so that zero-width parsers cannot loop forever.
//!
//! Separation, chaining, lookahead, binding, labeling, and the external
//! adapters round out the set. The precedence engine in [`crate::infix`]
//! builds on the same cursor protocol.
//!
//! # Example
//!
//! ```
//! use combinol::{parse_str, combinator::{between, sep1}, text::char, text::one_of};
//!
//! let digits = sep1(one_of("digit"), char(','));
//! let list = between(char('['), char(']'), digits);
//! assert_eq!(parse_str("[1,2,3]", &list), Ok(vec!['1', '2', '3']));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::char_class::ClassSpec;
use crate::error::Error;
use crate::input::{Cursor, Encoding, Source};
use crate::parser::{Halt, Parser};
use crate::regex_cache;
use crate::text;

// ============================================================================
// Trivial parsers
// ============================================================================

/// Succeed without consuming, yielding a clone of `value`.
pub fn pure<T>(value: T) -> Parser<T>
where
    T: Clone + Send + Sync + 'static,
{
    Parser::new(move |_, at| Ok((at, value.clone())))
}

/// Succeed without consuming, yielding an empty list.
pub fn empty<T: 'static>() -> Parser<Vec<T>> {
    Parser::new(|_, at| Ok((at, Vec::new())))
}

/// Always fail with a free-form message at the current position.
pub fn fail<T: 'static>(message: impl Into<String>) -> Parser<T> {
    let message = message.into();
    Parser::new(move |_, at| Err(Halt::new(at, Error::message(message.clone(), at.pos))))
}

// ============================================================================
// Mapping
// ============================================================================

/// Transform the produced value.
pub fn map<A, B, F>(p: Parser<A>, f: F) -> Parser<B>
where
    A: 'static,
    B: 'static,
    F: Fn(A) -> B + Send + Sync + 'static,
{
    Parser::new(move |src, at| {
        let (cur, value) = p.run(src, at)?;
        Ok((cur, f(value)))
    })
}

/// Discard the produced value, yielding a clone of `value` instead.
pub fn to<A, B>(p: Parser<A>, value: B) -> Parser<B>
where
    A: 'static,
    B: Clone + Send + Sync + 'static,
{
    Parser::new(move |src, at| {
        let (cur, _) = p.run(src, at)?;
        Ok((cur, value.clone()))
    })
}

/// Pair the produced value with a tag.
pub fn tag<K, V>(p: Parser<V>, t: K) -> Parser<(K, V)>
where
    K: Clone + Send + Sync + 'static,
    V: 'static,
{
    Parser::new(move |src, at| {
        let (cur, value) = p.run(src, at)?;
        Ok((cur, (t.clone(), value)))
    })
}

/// Succeed only when the produced value passes the predicate; otherwise
/// fail at the parser's start position.
pub fn filter<T, F>(p: Parser<T>, pred: F) -> Parser<T>
where
    T: fmt::Debug + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    Parser::new(move |src, at| {
        let (cur, value) = p.run(src, at)?;
        if pred(&value) {
            Ok((cur, value))
        } else {
            Err(Halt::new(
                at,
                Error::message(format!("`{:?}' failed predicate", value), at.pos),
            ))
        }
    })
}

/// Reverse the produced list.
pub fn reverse<T: 'static>(p: Parser<Vec<T>>) -> Parser<Vec<T>> {
    map(p, |mut items| {
        items.reverse();
        items
    })
}

// ============================================================================
// Sequencing
// ============================================================================

/// Run `a` then `b`, yielding the pair of their values.
pub fn pair<A, B>(a: Parser<A>, b: Parser<B>) -> Parser<(A, B)>
where
    A: 'static,
    B: 'static,
{
    Parser::new(move |src, at| {
        let (cur, va) = a.run(src, at)?;
        let (cur, vb) = b.run(src, cur)?;
        Ok((cur, (va, vb)))
    })
}

/// A tuple of parsers runnable in order, yielding a flat tuple of values.
///
/// Implemented for tuples of two through six parsers.
pub trait Sequence {
    /// The flat tuple of the element values.
    type Output;

    /// Build the sequenced parser.
    fn sequence(self) -> Parser<Self::Output>;
}

macro_rules! impl_sequence {
    ($($P:ident $T:ident),+) => {
        impl<$($T: 'static),+> Sequence for ($(Parser<$T>,)+) {
            type Output = ($($T,)+);

            #[allow(non_snake_case)]
            fn sequence(self) -> Parser<Self::Output> {
                let ($($P,)+) = self;
                Parser::new(move |src, at| {
                    let cur = at;
                    $(let (cur, $T) = $P.run(src, cur)?;)+
                    Ok((cur, ($($T,)+)))
                })
            }
        }
    };
}

impl_sequence!(P0 T0, P1 T1);
impl_sequence!(P0 T0, P1 T1, P2 T2);
impl_sequence!(P0 T0, P1 T1, P2 T2, P3 T3);
impl_sequence!(P0 T0, P1 T1, P2 T2, P3 T3, P4 T4);
impl_sequence!(P0 T0, P1 T1, P2 T2, P3 T3, P4 T4, P5 T5);

/// Run the tuple's parsers in order, yielding a flat tuple of values.
pub fn seq<S: Sequence>(parsers: S) -> Parser<S::Output> {
    parsers.sequence()
}

/// Run homogeneous parsers in order, collecting their values.
pub fn seq_all<T: 'static>(parsers: Vec<Parser<T>>) -> Parser<Vec<T>> {
    Parser::new(move |src, at| {
        let mut out = Vec::with_capacity(parsers.len());
        let mut cur = at;
        for p in &parsers {
            let (next, v) = p.run(src, cur)?;
            out.push(v);
            cur = next;
        }
        Ok((cur, out))
    })
}

/// Prepend `head`'s value to `tail`'s list.
pub fn cons<T: 'static>(head: Parser<T>, tail: Parser<Vec<T>>) -> Parser<Vec<T>> {
    map(pair(head, tail), |(h, mut t)| {
        t.insert(0, h);
        t
    })
}

/// Concatenate two list-producing parsers.
pub fn concat<T: 'static>(a: Parser<Vec<T>>, b: Parser<Vec<T>>) -> Parser<Vec<T>> {
    map(pair(a, b), |(mut va, mut vb)| {
        va.append(&mut vb);
        va
    })
}

/// Concatenate two string-producing parsers.
pub fn sconcat(a: Parser<String>, b: Parser<String>) -> Parser<String> {
    map(pair(a, b), |(mut va, vb)| {
        va.push_str(&vb);
        va
    })
}

/// Prepend a character to a string.
pub fn scons(c: Parser<char>, s: Parser<String>) -> Parser<String> {
    map(pair(c, s), |(c, mut s)| {
        s.insert(0, c);
        s
    })
}

/// Append a character to a string.
pub fn sappend(s: Parser<String>, c: Parser<char>) -> Parser<String> {
    map(pair(s, c), |(mut s, c)| {
        s.push(c);
        s
    })
}

/// Run `a` then `b`, combining their values with `f`.
pub fn map2<A, B, C, F>(a: Parser<A>, b: Parser<B>, f: F) -> Parser<C>
where
    A: 'static,
    B: 'static,
    C: 'static,
    F: Fn(A, B) -> C + Send + Sync + 'static,
{
    Parser::new(move |src, at| {
        let (cur, va) = a.run(src, at)?;
        let (cur, vb) = b.run(src, cur)?;
        Ok((cur, f(va, vb)))
    })
}

/// Run both, keep the second value.
pub fn skip_left<A: 'static, B: 'static>(a: Parser<A>, b: Parser<B>) -> Parser<B> {
    map(pair(a, b), |(_, vb)| vb)
}

/// Run both, keep the first value.
pub fn skip_right<A: 'static, B: 'static>(a: Parser<A>, b: Parser<B>) -> Parser<A> {
    map(pair(a, b), |(va, _)| va)
}

/// Run `pre`, `p`, `post`; keep `p`'s value.
pub fn skip_around<A: 'static, T: 'static, B: 'static>(
    pre: Parser<A>,
    p: Parser<T>,
    post: Parser<B>,
) -> Parser<T> {
    skip_right(skip_left(pre, p), post)
}

/// Run `open`, `p`, `close`; keep `p`'s value.
pub fn between<A: 'static, B: 'static, T: 'static>(
    open: Parser<A>,
    close: Parser<B>,
    p: Parser<T>,
) -> Parser<T> {
    skip_around(open, p, close)
}

// ============================================================================
// Choice
// ============================================================================

/// Try `a`; on failure, try `b` from the original cursor.
///
/// Backtracking is unconditional: `b` starts from the branch entry even
/// when `a` consumed input before failing. When both fail, the failures
/// merge per [`Error::alt`].
pub fn alt<T: 'static>(a: Parser<T>, b: Parser<T>) -> Parser<T> {
    Parser::new(move |src, at| match a.run(src, at) {
        Ok(ok) => Ok(ok),
        Err(ha) => match b.run(src, at) {
            Ok(ok) => Ok(ok),
            Err(hb) => {
                let win_at = if ha.error.pos > hb.error.pos {
                    ha.at
                } else {
                    hb.at
                };
                Err(Halt::new(win_at, ha.error.alt(hb.error)))
            }
        },
    })
}

/// Left-fold [`alt`] over the alternatives.
///
/// # Panics
///
/// Panics when given no alternatives.
pub fn choice<T: 'static>(parsers: Vec<Parser<T>>) -> Parser<T> {
    let mut iter = parsers.into_iter();
    let first = iter.next().expect("choice requires at least one alternative");
    iter.fold(first, alt)
}

// ============================================================================
// Repetition
// ============================================================================

/// A minimum/maximum repetition count, accepted in every surface form:
/// `n` (exactly `n`), `(min, max)`, `(min, Some(max))`, `min..max`,
/// `min..=max`, `min..`, `..`, `..max`, `..=max`. A missing maximum means
/// unbounded.
pub trait RepeatBounds {
    /// The `(min, max)` pair; `None` max means unbounded.
    fn bounds(&self) -> (usize, Option<usize>);
}

impl RepeatBounds for usize {
    fn bounds(&self) -> (usize, Option<usize>) {
        (*self, Some(*self))
    }
}

impl RepeatBounds for (usize, usize) {
    fn bounds(&self) -> (usize, Option<usize>) {
        (self.0, Some(self.1))
    }
}

impl RepeatBounds for (usize, Option<usize>) {
    fn bounds(&self) -> (usize, Option<usize>) {
        *self
    }
}

impl RepeatBounds for Range<usize> {
    fn bounds(&self) -> (usize, Option<usize>) {
        (self.start, Some(self.end.saturating_sub(1)))
    }
}

impl RepeatBounds for RangeInclusive<usize> {
    fn bounds(&self) -> (usize, Option<usize>) {
        (*self.start(), Some(*self.end()))
    }
}

impl RepeatBounds for RangeFrom<usize> {
    fn bounds(&self) -> (usize, Option<usize>) {
        (self.start, None)
    }
}

impl RepeatBounds for RangeFull {
    fn bounds(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}

impl RepeatBounds for RangeTo<usize> {
    fn bounds(&self) -> (usize, Option<usize>) {
        (0, Some(self.end.saturating_sub(1)))
    }
}

impl RepeatBounds for RangeToInclusive<usize> {
    fn bounds(&self) -> (usize, Option<usize>) {
        (0, Some(self.end))
    }
}

fn checked_bounds(bounds: impl RepeatBounds) -> (usize, Option<usize>) {
    let (min, max) = bounds.bounds();
    if let Some(m) = max {
        assert!(min <= m, "repetition bounds {}..={} are inverted", min, m);
    }
    (min, max)
}

/// Greedily collect `p` until it fails or `max` is reached; succeed when
/// at least `min` values were collected, otherwise propagate the inner
/// failure.
///
/// Each iteration must advance the cursor; an iteration that succeeds
/// without consuming terminates the loop, so `many` is finite for any
/// inner parser.
pub fn many<T: 'static>(p: Parser<T>, bounds: impl RepeatBounds) -> Parser<Vec<T>> {
    let (min, max) = checked_bounds(bounds);
    Parser::new(move |src, at| {
        let mut out = Vec::new();
        let mut cur = at;
        loop {
            if max.is_some_and(|m| out.len() >= m) {
                break;
            }
            match p.run(src, cur) {
                Ok((next, v)) => {
                    if next.pos == cur.pos {
                        break;
                    }
                    out.push(v);
                    cur = next;
                }
                Err(h) => {
                    if out.len() >= min {
                        break;
                    }
                    return Err(h);
                }
            }
        }
        if out.len() >= min {
            Ok((cur, out))
        } else {
            Err(Halt::new(
                cur,
                Error::message("repetition made no progress", cur.pos),
            ))
        }
    })
}

/// One or more, with an optional maximum.
pub fn many1<T: 'static>(p: Parser<T>, max: impl Into<Option<usize>>) -> Parser<Vec<T>> {
    many(p, (1, max.into()))
}

/// Zero or more, unbounded.
pub fn many0<T: 'static>(p: Parser<T>) -> Parser<Vec<T>> {
    many(p, ..)
}

/// Like [`many`], folding each value into an accumulator instead of
/// collecting a list.
pub fn reduce<T, A, F>(p: Parser<T>, zero: A, f: F, bounds: impl RepeatBounds) -> Parser<A>
where
    T: 'static,
    A: Clone + Send + Sync + 'static,
    F: Fn(T, A) -> A + Send + Sync + 'static,
{
    let (min, max) = checked_bounds(bounds);
    Parser::new(move |src, at| {
        let mut acc = zero.clone();
        let mut count = 0usize;
        let mut cur = at;
        loop {
            if max.is_some_and(|m| count >= m) {
                break;
            }
            match p.run(src, cur) {
                Ok((next, v)) => {
                    if next.pos == cur.pos {
                        break;
                    }
                    acc = f(v, acc);
                    count += 1;
                    cur = next;
                }
                Err(h) => {
                    if count >= min {
                        break;
                    }
                    return Err(h);
                }
            }
        }
        if count >= min {
            Ok((cur, acc))
        } else {
            Err(Halt::new(
                cur,
                Error::message("repetition made no progress", cur.pos),
            ))
        }
    })
}

/// Anything [`string_of`] accepts as its element: a codepoint parser, or a
/// charset descriptor shorthand for [`text::one_of`].
pub trait IntoCharParser {
    /// The codepoint parser.
    fn into_char_parser(self) -> Parser<char>;
}

impl IntoCharParser for Parser<char> {
    fn into_char_parser(self) -> Parser<char> {
        self
    }
}

impl IntoCharParser for ClassSpec {
    fn into_char_parser(self) -> Parser<char> {
        text::one_of(self)
    }
}

impl IntoCharParser for char {
    fn into_char_parser(self) -> Parser<char> {
        text::one_of(self)
    }
}

impl IntoCharParser for &str {
    fn into_char_parser(self) -> Parser<char> {
        text::one_of(self)
    }
}

impl IntoCharParser for RangeInclusive<char> {
    fn into_char_parser(self) -> Parser<char> {
        text::one_of(self)
    }
}

/// Repeat a codepoint parser (or charset shorthand) under the bounds,
/// collecting the codepoints into a `String`.
pub fn string_of(element: impl IntoCharParser, bounds: impl RepeatBounds) -> Parser<String> {
    map(many(element.into_char_parser(), bounds), |chars| {
        chars.into_iter().collect()
    })
}

/// Collect `term` until `end` succeeds.
///
/// Each iteration first peeks `end` — a success stops the loop without
/// consuming anything of it — and otherwise requires `term` to succeed and
/// advance. A `term` failure fails the whole construct at its start
/// cursor.
pub fn many_until<T, E>(term: Parser<T>, end: Parser<E>) -> Parser<Vec<T>>
where
    T: 'static,
    E: 'static,
{
    Parser::new(move |src, at| {
        let mut out = Vec::new();
        let mut cur = at;
        loop {
            if end.run(src, cur).is_ok() {
                break;
            }
            match term.run(src, cur) {
                Ok((next, v)) => {
                    if next.pos == cur.pos {
                        break;
                    }
                    out.push(v);
                    cur = next;
                }
                Err(h) => return Err(Halt::new(at, h.error)),
            }
        }
        Ok((cur, out))
    })
}

/// Consume `left` greedily (zero or more, progress required), then match
/// `right` from the final cursor, yielding `right`'s value.
pub fn skip_many<L, R>(left: Parser<L>, right: Parser<R>) -> Parser<R>
where
    L: 'static,
    R: 'static,
{
    Parser::new(move |src, at| {
        let mut cur = at;
        while let Ok((next, _)) = left.run(src, cur) {
            if next.pos == cur.pos {
                break;
            }
            cur = next;
        }
        right.run(src, cur)
    })
}

// ============================================================================
// Separation
// ============================================================================

/// Zero or more `term` separated by `separator`, no trailing separator.
///
/// A separator is only consumed when another `term` follows it; otherwise
/// the list ends before the separator.
pub fn sep<T, S>(term: Parser<T>, separator: Parser<S>) -> Parser<Vec<T>>
where
    T: 'static,
    S: 'static,
{
    Parser::new(move |src, at| {
        let mut out = Vec::new();
        let mut cur = at;
        match term.run(src, cur) {
            Ok((next, v)) => {
                out.push(v);
                cur = next;
            }
            Err(_) => return Ok((at, out)),
        }
        loop {
            let save = cur;
            let Ok((after_sep, _)) = separator.run(src, cur) else {
                break;
            };
            match term.run(src, after_sep) {
                Ok((next, v)) => {
                    if next.pos == save.pos {
                        break;
                    }
                    out.push(v);
                    cur = next;
                }
                Err(_) => {
                    cur = save;
                    break;
                }
            }
        }
        Ok((cur, out))
    })
}

/// One or more `term` separated by `separator`, no trailing separator.
///
/// A failure of the first `term` reports the construct's start cursor.
pub fn sep1<T, S>(term: Parser<T>, separator: Parser<S>) -> Parser<Vec<T>>
where
    T: 'static,
    S: 'static,
{
    let zero_or_more = sep(term.clone(), separator);
    Parser::new(move |src, at| match term.run(src, at) {
        Err(h) => Err(Halt::new(at, h.error)),
        Ok(_) => zero_or_more.run(src, at),
    })
}

/// Like [`sep`], additionally accepting one trailing separator.
///
/// Unlike [`sep`], a separator is consumed unconditionally once seen; when
/// no `term` follows it the list simply ends after it.
pub fn sep_end<T, S>(term: Parser<T>, separator: Parser<S>) -> Parser<Vec<T>>
where
    T: 'static,
    S: 'static,
{
    Parser::new(move |src, at| {
        let mut out = Vec::new();
        let mut cur = at;
        match term.run(src, cur) {
            Ok((next, v)) => {
                out.push(v);
                cur = next;
            }
            Err(_) => return Ok((at, out)),
        }
        loop {
            let before = cur;
            let Ok((after_sep, _)) = separator.run(src, cur) else {
                break;
            };
            cur = after_sep;
            match term.run(src, cur) {
                Ok((next, v)) => {
                    if next.pos == before.pos {
                        break;
                    }
                    out.push(v);
                    cur = next;
                }
                Err(_) => break,
            }
        }
        Ok((cur, out))
    })
}

/// Like [`sep_end`], requiring at least one `term`.
pub fn sep_end1<T, S>(term: Parser<T>, separator: Parser<S>) -> Parser<Vec<T>>
where
    T: 'static,
    S: 'static,
{
    let zero_or_more = sep_end(term.clone(), separator);
    Parser::new(move |src, at| match term.run(src, at) {
        Err(h) => Err(Halt::new(at, h.error)),
        Ok(_) => zero_or_more.run(src, at),
    })
}

// ============================================================================
// Chaining
// ============================================================================

/// A type-erased binary combiner, the value produced by `chain_*` operator
/// parsers.
pub type Combine<V> = Arc<dyn Fn(V, V) -> V + Send + Sync>;

/// Erase a binary function into a [`Combine`], so operator alternatives
/// with different closure types share one parser value type.
pub fn combine<V, F>(f: F) -> Combine<V>
where
    F: Fn(V, V) -> V + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One or more `term` joined left-associatively by the combiners `op`
/// produces.
///
/// An `op` success not followed by a `term` fails the chain at the
/// post-operator cursor; a failure of the first `term` reports the
/// construct's start.
pub fn chain_left<V: 'static>(term: Parser<V>, op: Parser<Combine<V>>) -> Parser<V> {
    Parser::new(move |src, at| {
        let (mut cur, mut acc) = term.run(src, at).map_err(|h| Halt::new(at, h.error))?;
        loop {
            let save = cur;
            let Ok((after_op, f)) = op.run(src, cur) else {
                break;
            };
            match term.run(src, after_op) {
                Ok((next, v)) => {
                    if next.pos == save.pos {
                        break;
                    }
                    acc = f.as_ref()(acc, v);
                    cur = next;
                }
                Err(h) => return Err(Halt::new(after_op, h.error)),
            }
        }
        Ok((cur, acc))
    })
}

/// Like [`chain_left`], combining right-associatively: application is
/// deferred until the chain ends, then folded from the right.
pub fn chain_right<V: 'static>(term: Parser<V>, op: Parser<Combine<V>>) -> Parser<V> {
    Parser::new(move |src, at| {
        let (mut cur, first) = term.run(src, at).map_err(|h| Halt::new(at, h.error))?;
        let mut values = vec![first];
        let mut ops: Vec<Combine<V>> = Vec::new();
        loop {
            let save = cur;
            let Ok((after_op, f)) = op.run(src, cur) else {
                break;
            };
            match term.run(src, after_op) {
                Ok((next, v)) => {
                    if next.pos == save.pos {
                        break;
                    }
                    ops.push(f);
                    values.push(v);
                    cur = next;
                }
                Err(h) => return Err(Halt::new(after_op, h.error)),
            }
        }
        let mut acc = values.pop().expect("chain holds at least one value");
        while let Some(f) = ops.pop() {
            let lhs = values.pop().expect("one value per combiner");
            acc = f.as_ref()(lhs, acc);
        }
        Ok((cur, acc))
    })
}

// ============================================================================
// Lookahead
// ============================================================================

/// Run `p`; on success, restore the entry cursor and yield its value.
pub fn lookahead<T: 'static>(p: Parser<T>) -> Parser<T> {
    Parser::new(move |src, at| {
        let (_, value) = p.run(src, at)?;
        Ok((at, value))
    })
}

/// Negative lookahead: succeed with `()` when `p` fails, fail with
/// `unexpected <value>` when it succeeds. Never consumes.
pub fn exclude<T>(p: Parser<T>) -> Parser<()>
where
    T: fmt::Debug + 'static,
{
    Parser::new(move |src, at| match p.run(src, at) {
        Ok((_, value)) => Err(Halt::new(
            at,
            Error::unexpected(format!("{:?}", value), at.pos),
        )),
        Err(_) => Ok((at, ())),
    })
}

// ============================================================================
// Binding and labeling
// ============================================================================

/// Monadic chaining: on `p`'s success, build the next parser from its
/// value and continue from its end cursor.
pub fn bind<A, B, F>(p: Parser<A>, f: F) -> Parser<B>
where
    A: 'static,
    B: 'static,
    F: Fn(A) -> Parser<B> + Send + Sync + 'static,
{
    Parser::new(move |src, at| {
        let (cur, value) = p.run(src, at)?;
        f(value).run(src, cur)
    })
}

/// Rewrite failures that did not get past the start position into
/// `Expected(name)` there. Failures that got further stay as they are —
/// they carry more information than the label would.
pub fn label<T: 'static>(p: Parser<T>, name: impl Into<String>) -> Parser<T> {
    let name = name.into();
    Parser::new(move |src, at| match p.run(src, at) {
        Ok(ok) => Ok(ok),
        Err(h) if h.error.pos <= at.pos => {
            Err(Halt::new(at, Error::expected(name.clone(), at.pos)))
        }
        Err(h) => Err(h),
    })
}

// ============================================================================
// Recursion
// ============================================================================

/// Defer construction of a parser until first use, enabling recursive
/// grammars. The inner parser is built once and shared afterwards.
///
/// # Example
///
/// ```
/// use combinol::{parse_str, combinator::{alt, between, lazy}, text::char};
/// use combinol::parser::Parser;
///
/// fn parens() -> Parser<char> {
///     alt(
///         between(char('('), char(')'), lazy(parens)),
///         char('x'),
///     )
/// }
/// assert_eq!(parse_str("((x))", &parens()), Ok('x'));
/// ```
pub fn lazy<T, F>(f: F) -> Parser<T>
where
    T: 'static,
    F: Fn() -> Parser<T> + Send + Sync + 'static,
{
    let cell: OnceCell<Parser<T>> = OnceCell::new();
    Parser::new(move |src, at| cell.get_or_init(&f).run(src, at))
}

// ============================================================================
// Adapters
// ============================================================================

/// Decode the remainder of the source as text: zero-copy for valid UTF-8,
/// transcoded otherwise (stopping at the first malformed sequence).
fn remaining_text<'s>(src: &Source<'s>, at: Cursor) -> Cow<'s, str> {
    if src.encoding() == Encoding::Utf8 {
        if let Ok(text) = std::str::from_utf8(src.rest(at.byte)) {
            return Cow::Borrowed(text);
        }
    }
    let mut out = String::new();
    let mut cur = at;
    while let Some((c, next)) = src.step(cur) {
        out.push(c);
        cur = next;
    }
    Cow::Owned(out)
}

fn advance_codepoints(src: &Source<'_>, at: Cursor, count: usize) -> Option<Cursor> {
    let mut cur = at;
    for _ in 0..count {
        cur = src.step(cur)?.1;
    }
    Some(cur)
}

/// Treat an external prefix-parsing function as a parser.
///
/// The function receives the remaining input as text and returns the value
/// plus the unconsumed suffix, or an error message. The cursor advances by
/// the difference in codepoint length. An empty error message reports
/// `Expected(name)`; otherwise the message passes through.
pub fn parse_with<T, F>(name: impl Into<String>, f: F) -> Parser<T>
where
    T: 'static,
    F: for<'x> Fn(&'x str) -> Result<(T, &'x str), String> + Send + Sync + 'static,
{
    let name = name.into();
    Parser::new(move |src, at| {
        let text = remaining_text(src, at);
        match f(&text) {
            Ok((value, rest)) => {
                let consumed = text.chars().count() - rest.chars().count();
                let cur = advance_codepoints(src, at, consumed).ok_or_else(|| {
                    Halt::new(
                        at,
                        Error::message(
                            format!("{} advanced past the end of input", name),
                            at.pos,
                        ),
                    )
                })?;
                Ok((cur, value))
            }
            Err(msg) if msg.is_empty() => {
                Err(Halt::new(at, Error::expected(name.clone(), at.pos)))
            }
            Err(msg) => Err(Halt::new(at, Error::message(msg, at.pos))),
        }
    })
}

/// A type that knows how to parse itself off the front of a string.
/// [`parse_as`] adapts any implementor into a parser.
pub trait ExternalParser: Sized {
    /// Parse a value from the start of `input`, returning the value and
    /// the unconsumed suffix.
    fn parse_prefix(input: &str) -> Result<(Self, &str), String>;
}

/// Adapt an [`ExternalParser`] implementor into a parser.
pub fn parse_as<T>(name: impl Into<String>) -> Parser<T>
where
    T: ExternalParser + 'static,
{
    parse_with(name, T::parse_prefix)
}

/// Match a regular expression at the cursor, yielding the matched text.
///
/// The pattern is implicitly anchored to the cursor; compiled patterns are
/// cached per thread.
///
/// # Panics
///
/// Panics when the pattern does not compile.
pub fn re(pattern: &str) -> Parser<String> {
    let anchored = format!("^(?:{})", pattern);
    let regex = regex_cache::get_or_compile(&anchored)
        .unwrap_or_else(|| panic!("invalid regex pattern `{}'", pattern));
    let desc = format!("pattern `{}'", pattern);
    Parser::new(move |src, at| {
        let text = remaining_text(src, at);
        match regex.find(&text) {
            Some(m) if m.start() == 0 => {
                let matched = m.as_str().to_string();
                let consumed = matched.chars().count();
                let cur = advance_codepoints(src, at, consumed)
                    .expect("regex matched within the decoded remainder");
                Ok((cur, matched))
            }
            _ => Err(Halt::new(at, Error::expected(desc.clone(), at.pos))),
        }
    })
}
