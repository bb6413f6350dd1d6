//! Failure descriptions and their rendering
//!
//! Every failure carries an [`ErrorContent`] and the codepoint position at
//! which the diagnosis is meaningful. Choice merges sibling failures by
//! keeping the furthest one; two `Expected` failures at the same position
//! merge their descriptions with `" or "`, which is what turns a pile of
//! dead alternatives into a single readable message.
//!
//! Rendering happens once, at the `parse` entry point:
//!
//! ```text
//! lower expected at 1:1
//! unexpected end of input at 3:14
//! ```
//!
//! Line and column are 1-based; the column expands tabs to the next
//! multiple of the configured tab size (default 8).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::input::Source;

/// Description shared by the end-of-input failures.
pub const END_OF_INPUT: &str = "end of input";

/// What went wrong, without the position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorContent {
    /// The parser wanted a specific construct and did not find it.
    Expected(String),
    /// The parser found something it disallows.
    Unexpected(String),
    /// Free-form text from `fail`, `filter`, and adapters.
    Message(String),
}

/// A positioned failure. `pos` counts codepoints from the start of input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Error {
    /// What went wrong.
    pub content: ErrorContent,
    /// Codepoint position where the diagnosis applies.
    pub pos: usize,
}

/// A rendered 1-based line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLocation {
    /// Line number, 1-based.
    pub line: usize,
    /// Column number, 1-based, tab-expanded.
    pub column: usize,
}

/// Options for rendering a failure against its source.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Tabs expand to the next multiple of this width.
    pub tab_size: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { tab_size: 8 }
    }
}

impl Error {
    /// An `Expected` failure.
    pub fn expected(desc: impl Into<String>, pos: usize) -> Error {
        Error {
            content: ErrorContent::Expected(desc.into()),
            pos,
        }
    }

    /// An `Unexpected` failure.
    pub fn unexpected(desc: impl Into<String>, pos: usize) -> Error {
        Error {
            content: ErrorContent::Unexpected(desc.into()),
            pos,
        }
    }

    /// A free-form failure.
    pub fn message(text: impl Into<String>, pos: usize) -> Error {
        Error {
            content: ErrorContent::Message(text.into()),
            pos,
        }
    }

    /// Merge the failures of two alternatives.
    ///
    /// Two `Expected` failures at the same position merge their
    /// descriptions with `" or "`. Otherwise the failure that got further
    /// wins; on a tie of non-mergeable failures the second wins.
    pub fn alt(self, other: Error) -> Error {
        if self.pos == other.pos {
            if let (ErrorContent::Expected(a), ErrorContent::Expected(b)) =
                (&self.content, &other.content)
            {
                return Error::expected(format!("{} or {}", a, b), self.pos);
            }
            return other;
        }
        if self.pos > other.pos {
            self
        } else {
            other
        }
    }

    /// The failure text without position: `"<desc> expected"`,
    /// `"unexpected <desc>"`, or the free-form message.
    pub fn rendered(&self) -> String {
        match &self.content {
            ErrorContent::Expected(desc) => format!("{} expected", desc),
            ErrorContent::Unexpected(desc) => format!("unexpected {}", desc),
            ErrorContent::Message(text) => text.clone(),
        }
    }

    /// The 1-based line/column of this failure within `source`.
    ///
    /// The position counts codepoints, so the walk decodes the source line
    /// by line: each fully consumed line costs its length plus one for the
    /// newline; within the final line, tabs advance the column to the next
    /// multiple of `tab_size`.
    pub fn location(&self, source: &Source<'_>, opts: &RenderOptions) -> TextLocation {
        let lines = source.decode_lines();
        let mut remaining = self.pos;
        let mut line_idx = 0;
        for (i, line) in lines.iter().enumerate() {
            line_idx = i;
            if remaining > line.len() && i + 1 < lines.len() {
                remaining -= line.len() + 1;
            } else {
                break;
            }
        }
        let line = &lines[line_idx];
        let upto = remaining.min(line.len());
        let mut width = 0;
        for &c in &line[..upto] {
            if c == '\t' {
                width = (width / opts.tab_size + 1) * opts.tab_size;
            } else {
                width += 1;
            }
        }
        TextLocation {
            line: line_idx + 1,
            column: width + 1,
        }
    }

    /// The full rendered failure: `"<text> at <line>:<col>"`.
    pub fn full_message(&self, source: &Source<'_>, opts: &RenderOptions) -> String {
        let loc = self.location(source, opts);
        format!("{} at {}:{}", self.rendered(), loc.line, loc.column)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.rendered(), self.pos)
    }
}

impl std::error::Error for Error {}
