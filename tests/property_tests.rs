//! Property-based tests using proptest
//!
//! Quantified laws for the interval sets, error merging, position
//! rendering, and the combinator algebra.

use combinol::{
    combinator::{alt, bind, many, map, pair, pure},
    parse_str,
    text::one_of,
    Error, ErrorContent, IntervalSet, RenderOptions, Source,
};
use proptest::prelude::*;

fn small_ranges() -> impl Strategy<Value = Vec<(u32, u32)>> {
    proptest::collection::vec((0u32..200, 0u32..40), 0..8)
        .prop_map(|pairs| pairs.into_iter().map(|(lo, w)| (lo, lo + w)).collect())
}

// =============================================================================
// Interval-set laws
// =============================================================================

proptest! {
    /// Singleton membership holds exactly at the member.
    #[test]
    fn prop_singleton_membership(cp in 0u32..300, probe in 0u32..300) {
        let s = IntervalSet::singleton(cp);
        prop_assert_eq!(s.contains(probe), probe == cp);
    }

    /// The canonical invariants hold for any construction: sorted,
    /// disjoint, non-adjacent.
    #[test]
    fn prop_canonical_form(ranges in small_ranges()) {
        let s = IntervalSet::from_ranges(ranges);
        for window in s.ranges().windows(2) {
            let (_, hi_a) = window[0];
            let (lo_b, _) = window[1];
            prop_assert!(hi_a + 1 < lo_b, "ranges {:?} overlap or touch", s.ranges());
        }
        for &(lo, hi) in s.ranges() {
            prop_assert!(lo <= hi);
        }
    }

    /// Union is commutative.
    #[test]
    fn prop_union_commutative(a in small_ranges(), b in small_ranges()) {
        let a = IntervalSet::from_ranges(a);
        let b = IntervalSet::from_ranges(b);
        prop_assert_eq!(a.union(&b), b.union(&a));
    }

    /// Union with itself is the identity.
    #[test]
    fn prop_union_idempotent(a in small_ranges()) {
        let a = IntervalSet::from_ranges(a);
        prop_assert_eq!(a.union(&a), a.clone());
    }

    /// Union membership is pointwise disjunction.
    #[test]
    fn prop_union_membership(a in small_ranges(), b in small_ranges(), probe in 0u32..300) {
        let sa = IntervalSet::from_ranges(a);
        let sb = IntervalSet::from_ranges(b);
        prop_assert_eq!(
            sa.union(&sb).contains(probe),
            sa.contains(probe) || sb.contains(probe)
        );
    }

    /// Exactly one of a set and its complement contains each codepoint of
    /// the universe.
    #[test]
    fn prop_complement_membership_xor(a in small_ranges(), probe in 0u32..=255) {
        let s = IntervalSet::from_ranges(a);
        let c = s.complement(0, 255);
        prop_assert!(s.contains(probe) ^ c.contains(probe));
    }

    /// Complement is an involution within the universe.
    #[test]
    fn prop_complement_involution(a in small_ranges()) {
        let s = IntervalSet::from_ranges(a);
        let clamped = IntervalSet::build(0, 255, |cp| s.contains(cp));
        prop_assert_eq!(s.complement(0, 255).complement(0, 255), clamped);
    }

    /// `build` from a membership predicate reproduces the set.
    #[test]
    fn prop_build_reproduces(a in small_ranges()) {
        let s = IntervalSet::from_ranges(a);
        let rebuilt = IntervalSet::build(0, 300, |cp| s.contains(cp));
        // Inputs are capped below 241, so the 0..=300 window sees it all.
        prop_assert_eq!(rebuilt, s);
    }
}

// =============================================================================
// Error merging
// =============================================================================

proptest! {
    /// Same-position Expected failures merge their descriptions.
    #[test]
    fn prop_merge_same_position(pos in 0usize..100) {
        let merged = Error::expected("a", pos).alt(Error::expected("b", pos));
        prop_assert_eq!(merged, Error::expected("a or b", pos));
    }

    /// The furthest failure always wins, from either side.
    #[test]
    fn prop_furthest_wins(p0 in 0usize..100, p1 in 0usize..100) {
        prop_assume!(p0 != p1);
        let a = Error::expected("a", p0);
        let b = Error::expected("b", p1);
        let expect = if p0 > p1 { a.clone() } else { b.clone() };
        prop_assert_eq!(a.clone().alt(b.clone()), expect.clone());
        let reversed = if p0 > p1 {
            Error::expected("a", p0)
        } else {
            Error::expected("b", p1)
        };
        prop_assert_eq!(b.alt(a), reversed);
    }

    /// Same-position non-mergeable failures keep the second.
    #[test]
    fn prop_tie_second_wins(pos in 0usize..100) {
        let a = Error::expected("a", pos);
        let b = Error::unexpected("b", pos);
        prop_assert_eq!(a.clone().alt(b.clone()), b.clone());
        prop_assert_eq!(b.alt(a.clone()), a);
    }
}

// =============================================================================
// Position rendering
// =============================================================================

fn source_and_location() -> impl Strategy<Value = (String, usize, usize, usize)> {
    proptest::collection::vec("[ -~]{0,10}", 1..6)
        .prop_flat_map(|lines| {
            let count = lines.len();
            (Just(lines), 0..count)
        })
        .prop_flat_map(|(lines, line_idx)| {
            let width = lines[line_idx].len();
            (Just(lines), Just(line_idx), 0..=width)
        })
        .prop_map(|(lines, line_idx, col)| {
            let offset: usize = lines[..line_idx]
                .iter()
                .map(|l| l.chars().count() + 1)
                .sum::<usize>()
                + col;
            (lines.join("\n"), offset, line_idx + 1, col + 1)
        })
}

proptest! {
    /// For any (line, col) inside a tab-free source, the renderer maps the
    /// codepoint offset back to that (line, col).
    #[test]
    fn prop_position_round_trip((source, offset, line, col) in source_and_location()) {
        let src = Source::utf8(&source);
        let loc = Error::expected("x", offset).location(&src, &RenderOptions::default());
        prop_assert_eq!((loc.line, loc.column), (line, col));
    }
}

// =============================================================================
// Combinator laws
// =============================================================================

proptest! {
    /// map over pure is pure of the application.
    #[test]
    fn prop_map_pure(v in 0i64..1000, input in "[a-z]{0,6}") {
        let lhs = map(pure(v), |n| n + 1);
        let rhs = pure(v + 1);
        prop_assert_eq!(parse_str(&input, &lhs), parse_str(&input, &rhs));
    }

    /// bind over pure is application.
    #[test]
    fn prop_bind_pure(v in 0i64..1000, input in "[a-z]{0,6}") {
        let lhs = bind(pure(v), |n| pure(n * 2));
        let rhs = pure(v * 2);
        prop_assert_eq!(parse_str(&input, &lhs), parse_str(&input, &rhs));
    }

    /// alt of a parser with itself behaves like the parser, with the
    /// failure description merged.
    #[test]
    fn prop_alt_self(input in "[a-z0-9]{0,4}") {
        let single = one_of("digit");
        let doubled = alt(one_of("digit"), one_of("digit"));
        match (parse_str(&input, &single), parse_str(&input, &doubled)) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(b)) => prop_assert_eq!(b, "digit or digit expected at 1:1"),
            (a, b) => prop_assert!(false, "disagreement: {:?} vs {:?}", a, b),
        }
    }

    /// Sequencing with pure consumes exactly what the inner parser does.
    #[test]
    fn prop_seq_pure_consumes_like_inner(input in "[0-9]{1,5}") {
        let src = Source::utf8(&input);
        let inner = one_of("digit");
        let seqd = pair(one_of("digit"), pure(()));
        let a = combinol::try_match(&src, &inner);
        let b = combinol::try_match(&src, &seqd);
        match (a, b) {
            (
                combinol::MatchResult::Success { pos: pa, value: va, .. },
                combinol::MatchResult::Success { pos: pb, value: (vb, ()), .. },
            ) => {
                prop_assert_eq!(pa, pb);
                prop_assert_eq!(va, vb);
            }
            (a, b) => prop_assert!(false, "disagreement: {:?} vs {:?}", a, b),
        }
    }

    /// many over a non-advancing parser terminates and collects nothing.
    #[test]
    fn prop_many_zero_width_terminates(input in "[a-z]{0,8}") {
        let p = many(pure('x'), ..);
        prop_assert_eq!(parse_str(&input, &p), Ok(vec![]));
    }

    /// many collects every matching codepoint of a homogeneous input.
    #[test]
    fn prop_many_collects_all(input in "[0-9]{0,12}") {
        let p = many(one_of("digit"), ..);
        let collected = parse_str(&input, &p).unwrap();
        prop_assert_eq!(collected.len(), input.len());
    }

    /// A failure always carries a position no further than the input's
    /// codepoint length.
    #[test]
    fn prop_error_position_in_bounds(input in "[a-z ]{0,10}") {
        let p = pair(one_of("lower"), pair(one_of("lower"), one_of("digit")));
        if let combinol::MatchResult::Failure { error, .. } =
            combinol::try_match(&Source::utf8(&input), &p)
        {
            prop_assert!(error.pos <= input.chars().count());
            match error.content {
                ErrorContent::Expected(_) | ErrorContent::Unexpected(_) => {}
                ErrorContent::Message(m) => prop_assert!(false, "unexpected message {}", m),
            }
        }
    }
}
