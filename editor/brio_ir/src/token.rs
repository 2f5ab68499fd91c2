//! Lexical tokens.
//!
//! Tokens are produced by the lexer and consumed read-only by the formatting
//! engine. Every token carries its original text; concatenating the texts of
//! a full token list reproduces the source byte-for-byte, whitespace
//! included. The engine's alignment checks depend on that property.

use std::fmt;

use crate::Span;

/// Language segment a token belongs to.
///
/// Brio documents interleave host code with markup; markup tokens pass
/// through the formatter untouched.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Language {
    /// Brio host code between `<?brio` and `?>`.
    Host,
    /// Surrounding markup (HTML or other template text).
    Markup,
}

/// Lexical category of a token.
///
/// A closed set: the formatter dispatches on these exhaustively.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    /// Identifier: `foo`, `render`
    Ident,
    /// Variable: `$x`
    Variable,
    /// Reserved word: `if`, `while`, `function`, `class`, ...
    Keyword,
    /// Numeric literal: `42`, `3.14`
    Number,
    /// String literal, quotes included: `"hello"`, `'a'`
    Str,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `;`
    Semi,
    /// Binary or unary operator: `+`, `==`, `&&`, `!`, `.`
    Operator,
    /// Assignment operator: `=`, `+=`, `.=`
    Assign,
    /// `->` or `=>`
    Arrow,
    /// `// ...` to end of line
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// Run of spaces, tabs, and newlines
    Whitespace,
    /// `<?brio`
    OpenTag,
    /// `?>`
    CloseTag,
    /// Raw markup text outside host-code regions
    MarkupText,
}

impl TokenKind {
    /// Whitespace tokens separate significant tokens; they are the only
    /// tokens the formatter may rewrite.
    #[inline]
    pub const fn is_whitespace(self) -> bool {
        matches!(self, TokenKind::Whitespace)
    }

    /// Comments are significant for alignment purposes: their text is never
    /// rewritten, but they bound whitespace gaps.
    #[inline]
    pub const fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    /// Everything that is not whitespace must survive formatting unchanged.
    #[inline]
    pub const fn is_significant(self) -> bool {
        !self.is_whitespace()
    }
}

/// A lexical token: kind, language segment, location, and original text.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub language: Language,
    pub span: Span,
    pub text: String,
}

impl Token {
    /// Create a host-language token.
    pub fn host(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Token {
            kind,
            language: Language::Host,
            span,
            text: text.into(),
        }
    }

    /// Create a markup token.
    pub fn markup(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Token {
            kind,
            language: Language::Markup,
            span,
            text: text.into(),
        }
    }

    /// Check if this token belongs to a markup segment.
    #[inline]
    pub fn is_markup(&self) -> bool {
        self.language == Language::Markup
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {} {:?}", self.kind, self.span, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn significant_excludes_whitespace_only() {
        assert!(!TokenKind::Whitespace.is_significant());
        assert!(TokenKind::Ident.is_significant());
        assert!(TokenKind::LineComment.is_significant());
        assert!(TokenKind::MarkupText.is_significant());
    }

    #[test]
    fn comments_are_comments() {
        assert!(TokenKind::LineComment.is_comment());
        assert!(TokenKind::BlockComment.is_comment());
        assert!(!TokenKind::Str.is_comment());
    }

    #[test]
    fn token_constructors_tag_language() {
        let host = Token::host(TokenKind::Ident, Span::new(0, 3), "foo");
        let markup = Token::markup(TokenKind::MarkupText, Span::new(3, 8), "<div>");
        assert_eq!(host.language, Language::Host);
        assert!(markup.is_markup());
        assert_eq!(markup.text, "<div>");
    }
}
