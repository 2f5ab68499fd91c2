//! Format tokens.
//!
//! The annotation pass turns the token stream plus the construct tree into a
//! flat list of format tokens: verbatim tokens that must survive formatting
//! byte-for-byte, interleaved with directives that describe the whitespace
//! and indentation the reconciliation pass should realize.
//!
//! The list obeys the alignment invariant: taking only the `Verbatim`
//! entries, in order, reproduces the significant (non-whitespace) tokens of
//! the input stream exactly.

use brio_ir::{Span, TokenKind};

/// One entry in the annotated stream.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FormatToken {
    /// An original token, unchanged.
    Verbatim(Verbatim),
    /// Whitespace to realize between the surrounding verbatim tokens.
    Whitespace(WhitespaceDirective),
    /// Indentation level change, effective for all following directives.
    Indent(IndentDirective),
    /// Zero-width position marker that survives reconciliation.
    Placeholder(Placeholder),
}

/// An original significant token carried through formatting.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Verbatim {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

/// Whitespace requested for one inter-token gap.
///
/// `span` covers the original whitespace (possibly empty) between the two
/// bounding verbatim tokens; `old_text` is its original content.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WhitespaceDirective {
    pub span: Span,
    pub old_text: String,
    pub request: SpaceRequest,
}

/// Concrete whitespace request, resolved to literal text during
/// reconciliation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpaceRequest {
    /// No whitespace at all.
    None,
    /// Exactly one space.
    Space,
    /// `lines` blank lines: realized as `lines + 1` newlines followed by the
    /// current indentation. `Blank { lines: 0 }` is a plain line break.
    Blank { lines: u32 },
    /// Keep the original whitespace untouched (markup regions, unparsed
    /// regions, gaps the engine has no opinion about).
    Preserve,
}

/// Push or pop one indentation frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct IndentDirective {
    pub change: IndentChange,
    pub kind: IndentKind,
    /// Offset the directive was emitted at; only used in diagnostics.
    pub offset: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IndentChange {
    Push,
    Pop,
}

/// Frame flavor: blocks indent by the base width, continuations (wrapped
/// arguments, hanging expressions) by the continuation width. Nested frames
/// compose additively.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IndentKind {
    Block,
    Continuation,
}

/// A tracked caret or template-anchor position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Placeholder {
    pub offset: u32,
}

impl FormatToken {
    /// The offset this entry is anchored at, for ordering checks and
    /// placeholder insertion.
    pub fn anchor(&self) -> u32 {
        match self {
            FormatToken::Verbatim(v) => v.span.start,
            FormatToken::Whitespace(w) => w.span.start,
            FormatToken::Indent(d) => d.offset,
            FormatToken::Placeholder(p) => p.offset,
        }
    }
}
