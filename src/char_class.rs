//! Named character classes and charset descriptors
//!
//! Two process-wide registries map symbolic class names to interval sets:
//!
//! - the **Latin-1** registry carries the POSIX class names over `0..=0xFF`
//!   with the classic ASCII-ranged definitions;
//! - the **Unicode** registry carries the same POSIX names derived from the
//!   Unicode general categories, plus all 30 categories under both their
//!   short (`Lu`) and long (`uppercase_letter`) names.
//!
//! Both registries are immutable and built lazily on first use.
//!
//! User-supplied charset descriptors ([`ClassSpec`]) accept codepoints,
//! chars, inclusive ranges, symbolic names, and nested lists of these; they
//! normalize to a [`Charset`] by flattening, resolving names against the
//! active registry, and unioning. Malformed descriptors are rejected when
//! the charset is constructed, never during a parse.
//!
//! # Example
//!
//! ```
//! use combinol::char_class::{Charset, ClassSpec, Registry};
//!
//! let spec = ClassSpec::list(["alpha".into(), ClassSpec::from('_')]);
//! let cs = Charset::resolve(spec, Registry::unicode()).unwrap();
//! assert!(cs.contains('x'));
//! assert!(cs.contains('_'));
//! assert!(!cs.contains('7'));
//! ```

use std::fmt;
use std::ops::RangeInclusive;

use hashbrown::HashMap;
use once_cell::sync::Lazy;
use unicode_general_category::{get_general_category, GeneralCategory};

use crate::interval_set::IntervalSet;

/// Short names of the 30 Unicode general categories, in registry order.
const SHORT_NAMES: [&str; 30] = [
    "Lu", "Ll", "Lt", "Lm", "Lo", "Mn", "Mc", "Me", "Nd", "Nl", "No", "Pc", "Pd", "Ps", "Pe",
    "Pi", "Pf", "Po", "Sm", "Sc", "Sk", "So", "Zs", "Zl", "Zp", "Cc", "Cf", "Cs", "Co", "Cn",
];

/// Long names, aligned with [`SHORT_NAMES`].
const LONG_NAMES: [&str; 30] = [
    "uppercase_letter",
    "lowercase_letter",
    "titlecase_letter",
    "modifier_letter",
    "other_letter",
    "nonspacing_mark",
    "spacing_mark",
    "enclosing_mark",
    "decimal_number",
    "letter_number",
    "other_number",
    "connector_punctuation",
    "dash_punctuation",
    "open_punctuation",
    "close_punctuation",
    "initial_punctuation",
    "final_punctuation",
    "other_punctuation",
    "math_symbol",
    "currency_symbol",
    "modifier_symbol",
    "other_symbol",
    "space_separator",
    "line_separator",
    "paragraph_separator",
    "control",
    "format",
    "surrogate",
    "private_use",
    "unassigned",
];

/// Registry index of a scalar value's general category.
fn category_index(cat: GeneralCategory) -> usize {
    match cat {
        GeneralCategory::UppercaseLetter => 0,
        GeneralCategory::LowercaseLetter => 1,
        GeneralCategory::TitlecaseLetter => 2,
        GeneralCategory::ModifierLetter => 3,
        GeneralCategory::OtherLetter => 4,
        GeneralCategory::NonspacingMark => 5,
        GeneralCategory::SpacingMark => 6,
        GeneralCategory::EnclosingMark => 7,
        GeneralCategory::DecimalNumber => 8,
        GeneralCategory::LetterNumber => 9,
        GeneralCategory::OtherNumber => 10,
        GeneralCategory::ConnectorPunctuation => 11,
        GeneralCategory::DashPunctuation => 12,
        GeneralCategory::OpenPunctuation => 13,
        GeneralCategory::ClosePunctuation => 14,
        GeneralCategory::InitialPunctuation => 15,
        GeneralCategory::FinalPunctuation => 16,
        GeneralCategory::OtherPunctuation => 17,
        GeneralCategory::MathSymbol => 18,
        GeneralCategory::CurrencySymbol => 19,
        GeneralCategory::ModifierSymbol => 20,
        GeneralCategory::OtherSymbol => 21,
        GeneralCategory::SpaceSeparator => 22,
        GeneralCategory::LineSeparator => 23,
        GeneralCategory::ParagraphSeparator => 24,
        GeneralCategory::Control => 25,
        GeneralCategory::Format => 26,
        GeneralCategory::PrivateUse => 28,
        // Surrogates are not scalar values; classified by range below.
        _ => 29,
    }
}

/// An immutable table of named character classes over a fixed universe.
pub struct Registry {
    universe: (u32, u32),
    classes: HashMap<&'static str, IntervalSet>,
}

impl Registry {
    /// The POSIX classes over `0..=0xFF` with their ASCII-ranged
    /// definitions.
    pub fn latin1() -> &'static Registry {
        static LATIN1: Lazy<Registry> = Lazy::new(build_latin1);
        &LATIN1
    }

    /// The Unicode general categories (short and long names) and the POSIX
    /// classes derived from them, over `0..=0x10FFFF`.
    pub fn unicode() -> &'static Registry {
        static UNICODE: Lazy<Registry> = Lazy::new(build_unicode);
        &UNICODE
    }

    /// Look up a class by name.
    pub fn lookup(&self, name: &str) -> Option<&IntervalSet> {
        self.classes.get(name)
    }

    /// The `(lo, hi)` codepoint universe this registry covers.
    pub fn universe(&self) -> (u32, u32) {
        self.universe
    }

    /// All registered names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.classes.keys().copied()
    }
}

fn build_latin1() -> Registry {
    let mut classes: HashMap<&'static str, IntervalSet> = HashMap::new();
    let alnum = IntervalSet::from_ranges([(0x30, 0x39), (0x41, 0x5A), (0x61, 0x7A)]);
    let mut word = alnum.clone();
    word.insert(0x5F, 0x5F);

    classes.insert("alnum", alnum);
    classes.insert(
        "alpha",
        IntervalSet::from_ranges([(0x41, 0x5A), (0x61, 0x7A)]),
    );
    classes.insert("ascii", IntervalSet::from_ranges([(0x00, 0x7F)]));
    classes.insert(
        "blank",
        IntervalSet::from_ranges([(0x09, 0x09), (0x20, 0x20)]),
    );
    classes.insert(
        "cntrl",
        IntervalSet::from_ranges([(0x00, 0x1F), (0x7F, 0x7F)]),
    );
    classes.insert("digit", IntervalSet::from_ranges([(0x30, 0x39)]));
    classes.insert("graph", IntervalSet::from_ranges([(0x21, 0x7E)]));
    classes.insert("lower", IntervalSet::from_ranges([(0x61, 0x7A)]));
    classes.insert("print", IntervalSet::from_ranges([(0x20, 0x7E)]));
    classes.insert(
        "punct",
        IntervalSet::from_ranges([(0x21, 0x2F), (0x3A, 0x40), (0x5B, 0x60), (0x7B, 0x7E)]),
    );
    classes.insert(
        "space",
        IntervalSet::from_ranges([(0x09, 0x0D), (0x20, 0x20)]),
    );
    classes.insert("upper", IntervalSet::from_ranges([(0x41, 0x5A)]));
    classes.insert("word", word);
    classes.insert(
        "xdigit",
        IntervalSet::from_ranges([(0x30, 0x39), (0x41, 0x46), (0x61, 0x66)]),
    );

    Registry {
        universe: (0, 0xFF),
        classes,
    }
}

fn build_unicode() -> Registry {
    // One ascending sweep over the scalar values buckets every codepoint
    // into its category; ascending order keeps each bucket canonical.
    let mut buckets: Vec<Vec<(u32, u32)>> = vec![Vec::new(); 30];
    for cp in 0..=0x10FFFFu32 {
        let Some(ch) = char::from_u32(cp) else {
            continue;
        };
        let idx = category_index(get_general_category(ch));
        match buckets[idx].last_mut() {
            Some(top) if top.1 + 1 == cp => top.1 = cp,
            _ => buckets[idx].push((cp, cp)),
        }
    }
    // Surrogates are exactly the gap char::from_u32 refuses.
    buckets[27].push((0xD800, 0xDFFF));

    let cats: Vec<IntervalSet> = buckets.into_iter().map(IntervalSet::from_ranges).collect();

    let union_of = |indices: &[usize]| -> IntervalSet {
        indices
            .iter()
            .fold(IntervalSet::new(), |acc, &i| acc.union(&cats[i]))
    };

    let alpha = union_of(&[0, 1, 2]);
    let digit = cats[8].clone();
    let alnum = alpha.union(&digit);
    let word = alnum.union(&cats[11]);
    let space = union_of(&[22, 23, 24]).union(&IntervalSet::from_ranges([
        (0x09, 0x0D),
        (0x85, 0x85),
    ]));
    let blank = cats[22].union(&IntervalSet::singleton(0x09));
    let punct = union_of(&[11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21]);
    let graph = union_of(&[
        0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21,
    ]);
    let print = graph.union(&cats[22]);

    let mut classes: HashMap<&'static str, IntervalSet> = HashMap::new();
    for (i, set) in cats.iter().enumerate() {
        classes.insert(SHORT_NAMES[i], set.clone());
        classes.insert(LONG_NAMES[i], set.clone());
    }
    classes.insert("alnum", alnum);
    classes.insert("alpha", alpha);
    classes.insert("ascii", IntervalSet::from_ranges([(0x00, 0x7F)]));
    classes.insert("blank", blank);
    classes.insert("cntrl", cats[25].clone());
    classes.insert("digit", digit);
    classes.insert("graph", graph);
    classes.insert("lower", cats[1].clone());
    classes.insert("print", print);
    classes.insert("punct", punct);
    classes.insert("space", space);
    classes.insert("upper", cats[0].clone());
    classes.insert("word", word);
    classes.insert(
        "xdigit",
        IntervalSet::from_ranges([(0x30, 0x39), (0x41, 0x46), (0x61, 0x66)]),
    );

    Registry {
        universe: (0, 0x10FFFF),
        classes,
    }
}

/// A user-supplied charset descriptor.
///
/// Descriptors are the surface syntax for character classes: a bare
/// codepoint, an inclusive range, a symbolic name, or a list mixing any of
/// these (nesting allowed). They normalize into a [`Charset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassSpec {
    /// A single codepoint.
    Code(u32),
    /// An inclusive codepoint range.
    Range(u32, u32),
    /// A symbolic class name resolved against the active registry.
    Named(String),
    /// A list of descriptors; nested lists are flattened.
    Many(Vec<ClassSpec>),
}

impl ClassSpec {
    /// Build a list descriptor from anything convertible.
    pub fn list<I, S>(items: I) -> ClassSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<ClassSpec>,
    {
        ClassSpec::Many(items.into_iter().map(Into::into).collect())
    }

    /// Flatten nested lists into a single level.
    fn flatten(self, out: &mut Vec<ClassSpec>) {
        match self {
            ClassSpec::Many(items) => {
                for item in items {
                    item.flatten(out);
                }
            }
            leaf => out.push(leaf),
        }
    }
}

impl From<char> for ClassSpec {
    fn from(c: char) -> Self {
        ClassSpec::Code(c as u32)
    }
}

impl From<u32> for ClassSpec {
    fn from(cp: u32) -> Self {
        ClassSpec::Code(cp)
    }
}

impl From<RangeInclusive<char>> for ClassSpec {
    fn from(r: RangeInclusive<char>) -> Self {
        ClassSpec::Range(*r.start() as u32, *r.end() as u32)
    }
}

impl From<RangeInclusive<u32>> for ClassSpec {
    fn from(r: RangeInclusive<u32>) -> Self {
        ClassSpec::Range(*r.start(), *r.end())
    }
}

impl From<&str> for ClassSpec {
    fn from(name: &str) -> Self {
        ClassSpec::Named(name.to_string())
    }
}

impl From<String> for ClassSpec {
    fn from(name: String) -> Self {
        ClassSpec::Named(name)
    }
}

impl From<Vec<ClassSpec>> for ClassSpec {
    fn from(items: Vec<ClassSpec>) -> Self {
        ClassSpec::Many(items)
    }
}

/// Why a descriptor failed to normalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassError {
    /// The name is not present in the active registry.
    UnknownClass(String),
    /// The range's lower bound exceeds its upper bound.
    InvertedRange(u32, u32),
    /// The descriptor resolved to zero codepoints.
    EmptyClass,
}

impl fmt::Display for ClassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassError::UnknownClass(name) => write!(f, "unknown character class `{}'", name),
            ClassError::InvertedRange(lo, hi) => {
                write!(f, "inverted character range {:#X}..{:#X}", lo, hi)
            }
            ClassError::EmptyClass => write!(f, "character class matches nothing"),
        }
    }
}

impl std::error::Error for ClassError {}

/// How a charset describes itself in error messages.
#[derive(Debug, Clone)]
enum ClassDesc {
    /// A single named class: rendered as the bare name.
    Name(String),
    /// A single codepoint: rendered back-quoted.
    Singleton(char),
    /// Anything else: rendered as a bracketed listing.
    Listing(String),
}

/// A normalized character class: an interval set plus the description used
/// in failure messages.
#[derive(Debug, Clone)]
pub struct Charset {
    set: IntervalSet,
    desc: ClassDesc,
}

impl Charset {
    /// Normalize a descriptor against a registry.
    ///
    /// Flattens nested lists, resolves names, unions everything, and keeps
    /// enough of the original shape to render a useful failure description.
    pub fn resolve(spec: impl Into<ClassSpec>, table: &Registry) -> Result<Charset, ClassError> {
        let mut leaves = Vec::new();
        spec.into().flatten(&mut leaves);

        let mut set = IntervalSet::new();
        let mut rendered: Vec<String> = Vec::with_capacity(leaves.len());
        for leaf in &leaves {
            match leaf {
                ClassSpec::Code(cp) => {
                    set.insert(*cp, *cp);
                    rendered.push(render_codepoint(*cp));
                }
                ClassSpec::Range(lo, hi) => {
                    if lo > hi {
                        return Err(ClassError::InvertedRange(*lo, *hi));
                    }
                    set.insert(*lo, *hi);
                    rendered.push(format!(
                        "{}..{}",
                        render_codepoint(*lo),
                        render_codepoint(*hi)
                    ));
                }
                ClassSpec::Named(name) => {
                    let class = table
                        .lookup(name)
                        .ok_or_else(|| ClassError::UnknownClass(name.clone()))?;
                    set = set.union(class);
                    rendered.push(name.clone());
                }
                ClassSpec::Many(_) => unreachable!("flatten removes nested lists"),
            }
        }

        if set.is_empty() {
            return Err(ClassError::EmptyClass);
        }

        let desc = match leaves.as_slice() {
            [ClassSpec::Named(name)] => ClassDesc::Name(name.clone()),
            _ => match set.as_singleton().and_then(char::from_u32) {
                Some(c) => ClassDesc::Singleton(c),
                None => ClassDesc::Listing(format!("[{}]", rendered.join(", "))),
            },
        };

        Ok(Charset { set, desc })
    }

    /// Membership test.
    #[inline]
    pub fn contains(&self, c: char) -> bool {
        self.set.contains(c as u32)
    }

    /// The underlying interval set.
    pub fn set(&self) -> &IntervalSet {
        &self.set
    }

    /// The description used for `Expected` failures: the bare name for a
    /// single named class, a back-quoted character for a singleton, and a
    /// `one of [...]` listing otherwise.
    pub fn expected_desc(&self) -> String {
        match &self.desc {
            ClassDesc::Name(name) => name.clone(),
            ClassDesc::Singleton(c) => format!("`{}'", c),
            ClassDesc::Listing(listing) => format!("one of {}", listing),
        }
    }

    /// The description used by the negated primitive: `not <rendered>`.
    pub fn negated_desc(&self) -> String {
        match &self.desc {
            ClassDesc::Name(name) => format!("not {}", name),
            ClassDesc::Singleton(c) => format!("not `{}'", c),
            ClassDesc::Listing(listing) => format!("not one of {}", listing),
        }
    }

    /// The complement charset over the registry universe.
    pub fn negate(&self, table: &Registry) -> Charset {
        let (lo, hi) = table.universe();
        Charset {
            set: self.set.complement(lo, hi),
            desc: self.desc.clone(),
        }
    }
}

fn render_codepoint(cp: u32) -> String {
    match char::from_u32(cp) {
        Some(c) if !c.is_control() => format!("'{}'", c),
        _ => format!("U+{:04X}", cp),
    }
}
