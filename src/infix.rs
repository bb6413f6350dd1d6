//! Operator-precedence parsing
//!
//! [`prec`] turns a `term` parser and an `op` parser into an expression
//! parser by precedence climbing. The `op` parser yields an
//! [`OpDescriptor`]: the operator's shape (prefix, postfix, infix-left,
//! infix-right), its binding power, and the function that applies it.
//!
//! Binding powers encode associativity. A user-declared precedence `p`
//! maps to `2p`, leaving `2p - 1` free on the same tier:
//!
//! | shape       | powers             |
//! |-------------|--------------------|
//! | prefix      | `2p`               |
//! | postfix     | `2p - 1`           |
//! | infix-left  | `(2p - 1, 2p)`     |
//! | infix-right | `(2p, 2p - 1)`     |
//!
//! The climbing loop only ever asks `left binding power >= minimum`, and
//! the asymmetry of the pairs makes the same test yield both
//! associativities. This encoding is the whole trick; everything else is
//! a loop.
//!
//! # Example
//!
//! ```
//! use combinol::{parse_str, combinator::{choice, map, many1}, text::{char, one_of}};
//! use combinol::infix::{infix_left, prec};
//!
//! let number = map(many1(one_of("digit"), None), |ds| {
//!     ds.into_iter().fold(0i64, |acc, d| acc * 10 + i64::from(d as u8 - b'0'))
//! });
//! let op = choice(vec![
//!     infix_left(char('+'), 2, |a, b| a + b),
//!     infix_left(char('*'), 3, |a, b| a * b),
//! ]);
//! let expr = prec(number, op);
//! assert_eq!(parse_str("1+2*3", &expr), Ok(7));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::combinator::map;
use crate::input::{Cursor, Source};
use crate::log_debug;
use crate::parser::{Parser, Step};

/// A type-erased unary application.
pub type UnaryApply<V> = Arc<dyn Fn(V) -> V + Send + Sync>;

/// A type-erased binary application.
pub type BinaryApply<V> = Arc<dyn Fn(V, V) -> V + Send + Sync>;

/// The shape, binding power, and application of one parsed operator.
///
/// Produced by the builder functions; consumed by [`prec`]'s climbing
/// loop.
pub enum OpDescriptor<V> {
    /// A prefix operator: binds the operand to its right at `bp`.
    Prefix {
        /// Right binding power.
        bp: u32,
        /// Applied to the operand.
        apply: UnaryApply<V>,
    },
    /// A postfix operator: binds the value to its left at `bp`.
    Postfix {
        /// Left binding power.
        bp: u32,
        /// Applied to the value so far.
        apply: UnaryApply<V>,
    },
    /// A left-associative infix operator.
    InfixLeft {
        /// Left binding power.
        lbp: u32,
        /// Right binding power.
        rbp: u32,
        /// Applied to both operands.
        apply: BinaryApply<V>,
    },
    /// A right-associative infix operator.
    InfixRight {
        /// Left binding power.
        lbp: u32,
        /// Right binding power.
        rbp: u32,
        /// Applied to both operands.
        apply: BinaryApply<V>,
    },
}

// Manual impl: the erased appliers clone regardless of V.
impl<V> Clone for OpDescriptor<V> {
    fn clone(&self) -> Self {
        match self {
            OpDescriptor::Prefix { bp, apply } => OpDescriptor::Prefix {
                bp: *bp,
                apply: Arc::clone(apply),
            },
            OpDescriptor::Postfix { bp, apply } => OpDescriptor::Postfix {
                bp: *bp,
                apply: Arc::clone(apply),
            },
            OpDescriptor::InfixLeft { lbp, rbp, apply } => OpDescriptor::InfixLeft {
                lbp: *lbp,
                rbp: *rbp,
                apply: Arc::clone(apply),
            },
            OpDescriptor::InfixRight { lbp, rbp, apply } => OpDescriptor::InfixRight {
                lbp: *lbp,
                rbp: *rbp,
                apply: Arc::clone(apply),
            },
        }
    }
}

impl<V> fmt::Debug for OpDescriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpDescriptor::Prefix { bp, .. } => f.debug_struct("Prefix").field("bp", bp).finish(),
            OpDescriptor::Postfix { bp, .. } => f.debug_struct("Postfix").field("bp", bp).finish(),
            OpDescriptor::InfixLeft { lbp, rbp, .. } => f
                .debug_struct("InfixLeft")
                .field("lbp", lbp)
                .field("rbp", rbp)
                .finish(),
            OpDescriptor::InfixRight { lbp, rbp, .. } => f
                .debug_struct("InfixRight")
                .field("lbp", lbp)
                .field("rbp", rbp)
                .finish(),
        }
    }
}

fn checked_precedence(precedence: u32) -> u32 {
    assert!(precedence >= 1, "operator precedence must be at least 1");
    precedence
}

/// A prefix operator at the given precedence, applying `f` to its
/// operand.
///
/// # Panics
///
/// Panics when `precedence` is zero (all builders do; the encoding needs
/// `2p - 1 >= 1`).
pub fn prefix<O, V, F>(op: Parser<O>, precedence: u32, f: F) -> Parser<OpDescriptor<V>>
where
    O: 'static,
    V: 'static,
    F: Fn(V) -> V + Send + Sync + 'static,
{
    let bp = 2 * checked_precedence(precedence);
    let apply: UnaryApply<V> = Arc::new(f);
    map(op, move |_| OpDescriptor::Prefix {
        bp,
        apply: Arc::clone(&apply),
    })
}

/// A postfix operator at the given precedence, applying `f` to the value
/// so far.
pub fn postfix<O, V, F>(op: Parser<O>, precedence: u32, f: F) -> Parser<OpDescriptor<V>>
where
    O: 'static,
    V: 'static,
    F: Fn(V) -> V + Send + Sync + 'static,
{
    let bp = 2 * checked_precedence(precedence) - 1;
    let apply: UnaryApply<V> = Arc::new(f);
    map(op, move |_| OpDescriptor::Postfix {
        bp,
        apply: Arc::clone(&apply),
    })
}

/// A left-associative infix operator at the given precedence.
pub fn infix_left<O, V, F>(op: Parser<O>, precedence: u32, f: F) -> Parser<OpDescriptor<V>>
where
    O: 'static,
    V: 'static,
    F: Fn(V, V) -> V + Send + Sync + 'static,
{
    let p = 2 * checked_precedence(precedence);
    let apply: BinaryApply<V> = Arc::new(f);
    map(op, move |_| OpDescriptor::InfixLeft {
        lbp: p - 1,
        rbp: p,
        apply: Arc::clone(&apply),
    })
}

/// A right-associative infix operator at the given precedence.
pub fn infix_right<O, V, F>(op: Parser<O>, precedence: u32, f: F) -> Parser<OpDescriptor<V>>
where
    O: 'static,
    V: 'static,
    F: Fn(V, V) -> V + Send + Sync + 'static,
{
    let p = 2 * checked_precedence(precedence);
    let apply: BinaryApply<V> = Arc::new(f);
    map(op, move |_| OpDescriptor::InfixRight {
        lbp: p,
        rbp: p - 1,
        apply: Arc::clone(&apply),
    })
}

/// Values that know how to wrap an operator and its operands into a node.
///
/// The `*_node` builders use this as the default constructor when no
/// application function is supplied: the operator's own parsed value
/// becomes part of the node, which is the usual shape for building an AST
/// without custom code per operator.
pub trait OperatorAst: Sized {
    /// Wrap a unary operator and its operand.
    fn unary(op: Self, operand: Self) -> Self;

    /// Wrap a binary operator and its operands.
    fn binary(op: Self, lhs: Self, rhs: Self) -> Self;
}

/// [`prefix`] with the default node constructor.
pub fn prefix_node<V>(op: Parser<V>, precedence: u32) -> Parser<OpDescriptor<V>>
where
    V: OperatorAst + Clone + Send + Sync + 'static,
{
    let bp = 2 * checked_precedence(precedence);
    map(op, move |opv: V| OpDescriptor::Prefix {
        bp,
        apply: Arc::new(move |operand| V::unary(opv.clone(), operand)),
    })
}

/// [`postfix`] with the default node constructor.
pub fn postfix_node<V>(op: Parser<V>, precedence: u32) -> Parser<OpDescriptor<V>>
where
    V: OperatorAst + Clone + Send + Sync + 'static,
{
    let bp = 2 * checked_precedence(precedence) - 1;
    map(op, move |opv: V| OpDescriptor::Postfix {
        bp,
        apply: Arc::new(move |operand| V::unary(opv.clone(), operand)),
    })
}

/// [`infix_left`] with the default node constructor.
pub fn infix_left_node<V>(op: Parser<V>, precedence: u32) -> Parser<OpDescriptor<V>>
where
    V: OperatorAst + Clone + Send + Sync + 'static,
{
    let p = 2 * checked_precedence(precedence);
    map(op, move |opv: V| OpDescriptor::InfixLeft {
        lbp: p - 1,
        rbp: p,
        apply: Arc::new(move |lhs, rhs| V::binary(opv.clone(), lhs, rhs)),
    })
}

/// [`infix_right`] with the default node constructor.
pub fn infix_right_node<V>(op: Parser<V>, precedence: u32) -> Parser<OpDescriptor<V>>
where
    V: OperatorAst + Clone + Send + Sync + 'static,
{
    let p = 2 * checked_precedence(precedence);
    map(op, move |opv: V| OpDescriptor::InfixRight {
        lbp: p,
        rbp: p - 1,
        apply: Arc::new(move |lhs, rhs| V::binary(opv.clone(), lhs, rhs)),
    })
}

fn climb<V: 'static>(
    src: &Source<'_>,
    at: Cursor,
    term: &Parser<V>,
    op: &Parser<OpDescriptor<V>>,
    min_bp: u32,
) -> Step<V> {
    // Leading operator position: only a prefix descriptor is meaningful
    // here. Anything else rewinds and the term parser decides.
    let (mut cur, mut value) = match op.run(src, at) {
        Ok((after_op, OpDescriptor::Prefix { bp, apply })) => {
            let (next, operand) = climb(src, after_op, term, op, bp)?;
            (next, apply.as_ref()(operand))
        }
        _ => term.run(src, at)?,
    };

    loop {
        let save = cur;
        let Ok((after_op, desc)) = op.run(src, cur) else {
            break;
        };
        match desc {
            OpDescriptor::Postfix { bp, apply } if bp >= min_bp => {
                log_debug!("climb: postfix bp={} at pos {}", bp, save.pos);
                value = apply.as_ref()(value);
                cur = after_op;
            }
            OpDescriptor::InfixLeft { lbp, rbp, apply }
            | OpDescriptor::InfixRight { lbp, rbp, apply }
                if lbp >= min_bp =>
            {
                log_debug!("climb: infix lbp={} rbp={} at pos {}", lbp, rbp, save.pos);
                let (next, rhs) = climb(src, after_op, term, op, rbp)?;
                value = apply.as_ref()(value, rhs);
                cur = next;
            }
            // Below the threshold (or a prefix in operand position):
            // rewind to before the operator and let the caller finish.
            _ => {
                cur = save;
                break;
            }
        }
    }
    Ok((cur, value))
}

/// Precedence-climbing expression parser over a term and an operator
/// parser, starting at minimum binding power zero.
pub fn prec<V: 'static>(term: Parser<V>, op: Parser<OpDescriptor<V>>) -> Parser<V> {
    prec_min(term, op, 0)
}

/// [`prec`] with an explicit minimum binding power.
pub fn prec_min<V: 'static>(
    term: Parser<V>,
    op: Parser<OpDescriptor<V>>,
    min_bp: u32,
) -> Parser<V> {
    Parser::new(move |src, at| climb(src, at, &term, &op, min_bp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::{choice, many1};
    use crate::parser::parse_str;
    use crate::text::{char, one_of};

    fn number() -> Parser<i64> {
        crate::combinator::map(many1(one_of("digit"), None), |ds| {
            ds.into_iter()
                .fold(0i64, |acc, d| acc * 10 + i64::from(d as u8 - b'0'))
        })
    }

    fn arith_op() -> Parser<OpDescriptor<i64>> {
        choice(vec![
            infix_left(char('+'), 2, |a, b| a + b),
            infix_left(char('-'), 2, |a, b| a - b),
            infix_left(char('*'), 3, |a, b| a * b),
            infix_right(char('^'), 4, |a: i64, b| a.pow(b as u32)),
            prefix(char('~'), 5, |v: i64| -v),
            postfix(char('!'), 6, |v: i64| (1..=v).product()),
        ])
    }

    #[test]
    fn test_single_term() {
        let p = prec(number(), arith_op());
        assert_eq!(parse_str("42", &p), Ok(42));
    }

    #[test]
    fn test_precedence_orders_operations() {
        let p = prec(number(), arith_op());
        assert_eq!(parse_str("1+2*3", &p), Ok(7));
        assert_eq!(parse_str("2*3+1", &p), Ok(7));
    }

    #[test]
    fn test_left_associativity() {
        let p = prec(number(), arith_op());
        assert_eq!(parse_str("10-2-3", &p), Ok(5));
    }

    #[test]
    fn test_right_associativity() {
        let p = prec(number(), arith_op());
        // 2^(3^2), not (2^3)^2
        assert_eq!(parse_str("2^3^2", &p), Ok(512));
    }

    #[test]
    fn test_prefix_operator() {
        let p = prec(number(), arith_op());
        assert_eq!(parse_str("~5", &p), Ok(-5));
        assert_eq!(parse_str("~5+7", &p), Ok(2));
    }

    #[test]
    fn test_prefix_binds_tighter_than_infix() {
        let p = prec(number(), arith_op());
        // (~2)*3: the prefix at precedence 5 outbinds * at 3
        assert_eq!(parse_str("~2*3", &p), Ok(-6));
    }

    #[test]
    fn test_postfix_operator() {
        let p = prec(number(), arith_op());
        assert_eq!(parse_str("4!", &p), Ok(24));
        assert_eq!(parse_str("3!+1", &p), Ok(7));
    }

    #[test]
    fn test_dangling_operator_fails() {
        let p = prec(number(), arith_op());
        assert!(parse_str("1+", &p).is_err());
    }

    #[test]
    fn test_missing_term_fails() {
        let p = prec(number(), arith_op());
        assert!(parse_str("*1", &p).is_err());
    }

    #[test]
    #[should_panic(expected = "precedence must be at least 1")]
    fn test_zero_precedence_panics() {
        let _: Parser<OpDescriptor<i64>> = infix_left(char('+'), 0, |a, b| a + b);
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Ast {
        Sym(char),
        Num(i64),
        Unary(Box<Ast>, Box<Ast>),
        Binary(Box<Ast>, Box<Ast>, Box<Ast>),
    }

    impl OperatorAst for Ast {
        fn unary(op: Ast, operand: Ast) -> Ast {
            Ast::Unary(Box::new(op), Box::new(operand))
        }

        fn binary(op: Ast, lhs: Ast, rhs: Ast) -> Ast {
            Ast::Binary(Box::new(op), Box::new(lhs), Box::new(rhs))
        }
    }

    #[test]
    fn test_node_builders_wrap_operator_value() {
        let term = crate::combinator::map(number(), Ast::Num);
        let op = choice(vec![
            infix_left_node(crate::combinator::map(char('+'), Ast::Sym), 2),
            prefix_node(crate::combinator::map(char('-'), Ast::Sym), 3),
        ]);
        let p = prec(term, op);
        assert_eq!(
            parse_str("-1+2", &p),
            Ok(Ast::Binary(
                Box::new(Ast::Sym('+')),
                Box::new(Ast::Unary(Box::new(Ast::Sym('-')), Box::new(Ast::Num(1)))),
                Box::new(Ast::Num(2)),
            ))
        );
    }
}
