//! Lexer for Brio template source.
//!
//! Scans in two modes: markup mode outside `<?brio ... ?>` regions, host
//! mode inside them. Markup text is emitted as single opaque tokens; host
//! code is tokenized fully, including whitespace and comments, so that the
//! token stream is byte-faithful to the source.

use brio_ir::{Span, Token, TokenKind};

/// Opening delimiter of a host-code region.
pub const OPEN_TAG: &str = "<?brio";
/// Closing delimiter of a host-code region.
pub const CLOSE_TAG: &str = "?>";

/// Reserved words of the host language.
const KEYWORDS: &[&str] = &[
    "class", "function", "if", "else", "while", "for", "return", "echo", "true", "false", "null",
];

/// Lex a full document into tokens.
///
/// The concatenation of all token texts equals `source`.
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        src: source,
        pos: 0,
        out: Vec::new(),
    };
    lexer.run();
    lexer.out
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    out: Vec<Token>,
}

impl Lexer<'_> {
    fn run(&mut self) {
        while self.pos < self.src.len() {
            self.markup();
            if self.pos < self.src.len() {
                self.host();
            }
        }
    }

    /// Scan markup text up to the next open tag (or end of input), then the
    /// open tag itself.
    fn markup(&mut self) {
        let rest = &self.src[self.pos..];
        let tag_at = rest.find(OPEN_TAG);
        let text_end = self.pos + tag_at.unwrap_or(rest.len());
        if text_end > self.pos {
            self.push_markup(TokenKind::MarkupText, self.pos, text_end);
        }
        self.pos = text_end;
        if tag_at.is_some() {
            self.push_host(TokenKind::OpenTag, self.pos, self.pos + OPEN_TAG.len());
            self.pos += OPEN_TAG.len();
        }
    }

    /// Scan host tokens until a close tag or end of input.
    fn host(&mut self) {
        while self.pos < self.src.len() {
            let start = self.pos;
            let kind = self.host_token();
            self.push_host(kind, start, self.pos);
            if kind == TokenKind::CloseTag {
                return;
            }
        }
    }

    /// Scan one host token starting at `self.pos`, advancing past it.
    fn host_token(&mut self) -> TokenKind {
        let bytes = self.src.as_bytes();
        let b = bytes[self.pos];
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => {
                self.eat_while(|c| matches!(c, b' ' | b'\t' | b'\r' | b'\n'));
                TokenKind::Whitespace
            }
            b'/' if self.peek_at(1) == Some(b'/') => {
                self.eat_while(|c| c != b'\n');
                TokenKind::LineComment
            }
            b'/' if self.peek_at(1) == Some(b'*') => {
                self.pos += 2;
                match self.src[self.pos..].find("*/") {
                    Some(at) => self.pos += at + 2,
                    None => self.pos = self.src.len(),
                }
                TokenKind::BlockComment
            }
            b'"' | b'\'' => {
                self.string(b);
                TokenKind::Str
            }
            b'0'..=b'9' => {
                self.eat_while(|c| c.is_ascii_digit() || c == b'.');
                TokenKind::Number
            }
            b'$' => {
                self.pos += 1;
                self.eat_while(|c| c.is_ascii_alphanumeric() || c == b'_');
                TokenKind::Variable
            }
            b'_' | b'a'..=b'z' | b'A'..=b'Z' => {
                let start = self.pos;
                self.eat_while(|c| c.is_ascii_alphanumeric() || c == b'_');
                if KEYWORDS.contains(&&self.src[start..self.pos]) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Ident
                }
            }
            b'?' if self.src[self.pos..].starts_with(CLOSE_TAG) => {
                self.pos += CLOSE_TAG.len();
                TokenKind::CloseTag
            }
            b'(' => self.single(TokenKind::LParen),
            b')' => self.single(TokenKind::RParen),
            b'{' => self.single(TokenKind::LBrace),
            b'}' => self.single(TokenKind::RBrace),
            b'[' => self.single(TokenKind::LBracket),
            b']' => self.single(TokenKind::RBracket),
            b',' => self.single(TokenKind::Comma),
            b';' => self.single(TokenKind::Semi),
            _ => self.operator(),
        }
    }

    /// Multi-character operators are matched longest-first.
    fn operator(&mut self) -> TokenKind {
        const TWO_CHAR: &[(&str, TokenKind)] = &[
            ("=>", TokenKind::Arrow),
            ("->", TokenKind::Arrow),
            ("==", TokenKind::Operator),
            ("!=", TokenKind::Operator),
            ("<=", TokenKind::Operator),
            (">=", TokenKind::Operator),
            ("&&", TokenKind::Operator),
            ("||", TokenKind::Operator),
            ("+=", TokenKind::Assign),
            ("-=", TokenKind::Assign),
            ("*=", TokenKind::Assign),
            ("/=", TokenKind::Assign),
            (".=", TokenKind::Assign),
        ];
        let rest = &self.src[self.pos..];
        for (text, kind) in TWO_CHAR {
            if rest.starts_with(text) {
                self.pos += text.len();
                return *kind;
            }
        }
        if rest.starts_with('=') {
            self.pos += 1;
            return TokenKind::Assign;
        }
        // Anything else advances one character so lexing always makes
        // progress, even over bytes the grammar does not know.
        let ch_len = rest.chars().next().map_or(1, char::len_utf8);
        self.pos += ch_len;
        TokenKind::Operator
    }

    /// Scan a quoted string with backslash escapes. An unterminated string
    /// runs to end of input.
    fn string(&mut self, quote: u8) {
        let bytes = self.src.as_bytes();
        self.pos += 1;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\\' if self.pos + 1 < bytes.len() => self.pos += 2,
                b if b == quote => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + ahead).copied()
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() && pred(bytes[self.pos]) {
            self.pos += 1;
        }
    }

    fn push_host(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.out.push(Token::host(
            kind,
            Span::from_range(start..end),
            &self.src[start..end],
        ));
    }

    fn push_markup(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.out.push(Token::markup(
            kind,
            Span::from_range(start..end),
            &self.src[start..end],
        ));
    }
}
