//! Annotation pass.
//!
//! Walks the construct tree in source order and flattens it into format
//! tokens: every significant input token becomes a `Verbatim` entry, every
//! inter-token gap a `Whitespace` directive, and block/continuation
//! boundaries push and pop `Indent` frames. The pass looks only at the tree,
//! the token stream, and the style; it never measures output text.
//!
//! Inline gaps (spaces within a line) are decided by the declarative rule
//! table in [`rules`]. Line-level gaps (statement separation, brace
//! placement, wrapping) are decided structurally by the tree walk, which
//! plants a pending override consumed by the next emitted gap.

pub mod rules;

use brio_ir::{Span, SyntaxKind, SyntaxNode, Token, TokenKind};
use tracing::debug;

use crate::style::{BlankLines, BracePlacement, StyleConfig, WrapStyle};
use crate::token::{
    FormatToken, IndentChange, IndentDirective, IndentKind, Placeholder, SpaceRequest, Verbatim,
    WhitespaceDirective,
};

use self::rules::SpacingClass;

/// Produce the format-token list for one document.
///
/// `carets` are byte offsets to track through formatting; each becomes a
/// `Placeholder` entry anchored at the nearest following format token.
pub fn annotate(
    source: &str,
    tokens: &[Token],
    tree: &SyntaxNode,
    style: &StyleConfig,
    carets: &[u32],
) -> Vec<FormatToken> {
    debug!(tokens = tokens.len(), carets = carets.len(), "annotating");
    let mut annotator = Annotator {
        tokens,
        source,
        style,
        pos: 0,
        prev: None,
        prev_text_end: 0,
        prev_arrow_fat: false,
        last_operator_binary: false,
        pending: None,
        next_brace: BraceContext::Other,
        preserve_depth: 0,
        out: Vec::with_capacity(tokens.len() * 2),
    };
    annotator.visit(tree);
    // Flush anything past the tree: trailing tags, comments, markup.
    annotator.emit_until(u32::MAX);
    let mut out = annotator.out;
    insert_placeholders(&mut out, carets);
    out
}

/// Line-level override for the next emitted gap.
#[derive(Clone, Copy, Debug)]
enum Gap {
    /// Exactly this request, regardless of the rule table.
    Exact(SpaceRequest),
    /// A line break carrying `min..=max` blank lines, clamped against what
    /// the author wrote.
    Break { min: u32, max: u32 },
}

/// Which construct owns the next `Block` to be visited; selects the brace
/// placement option.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum BraceContext {
    Class,
    Function,
    Control,
    Other,
}

struct Annotator<'a> {
    tokens: &'a [Token],
    source: &'a str,
    style: &'a StyleConfig,
    /// Cursor into `tokens`.
    pos: usize,
    /// Kind of the last emitted significant token.
    prev: Option<TokenKind>,
    /// End offset of the last emitted significant token.
    prev_text_end: u32,
    /// Whether the last emitted arrow was `=>` (spaced) rather than `->`.
    prev_arrow_fat: bool,
    /// Whether the last emitted operator was binary (had an operand before
    /// it) rather than a prefix.
    last_operator_binary: bool,
    pending: Option<Gap>,
    next_brace: BraceContext,
    /// Nonzero inside `Error` regions; forces every gap to `Preserve`.
    preserve_depth: u32,
    out: Vec<FormatToken>,
}

impl Annotator<'_> {
    // ------------------------------------------------------------------
    // Tree walk
    // ------------------------------------------------------------------

    fn visit(&mut self, node: &SyntaxNode) {
        match node.kind {
            SyntaxKind::Program => self.scope_statements(node),
            SyntaxKind::MarkupSegment => self.emit_until(node.span.end),
            SyntaxKind::ClassDecl => self.visit_decl(node, BraceContext::Class),
            SyntaxKind::FunctionDecl => self.visit_decl(node, BraceContext::Function),
            SyntaxKind::Block => self.visit_block(node),
            SyntaxKind::If => self.visit_conditional(node, self.style.space_before_if_paren),
            SyntaxKind::While => self.visit_conditional(node, self.style.space_before_while_paren),
            SyntaxKind::For => self.visit_conditional(node, self.style.space_before_for_paren),
            SyntaxKind::ArgList => self.visit_arglist(node),
            SyntaxKind::Error => {
                self.preserve_depth += 1;
                self.emit_until(node.span.end);
                self.preserve_depth -= 1;
            }
            SyntaxKind::ParamList
            | SyntaxKind::Return
            | SyntaxKind::Echo
            | SyntaxKind::ExprStmt
            | SyntaxKind::Call
            | SyntaxKind::Argument
            | SyntaxKind::Binary
            | SyntaxKind::Assignment
            | SyntaxKind::ArrayLit => self.walk(node),
        }
    }

    /// Default traversal: visit children in order, emitting the tokens
    /// between them with rule-table spacing.
    fn walk(&mut self, node: &SyntaxNode) {
        for child in node.children() {
            self.emit_until(child.span.start);
            self.visit(child);
        }
        self.emit_until(node.span.end);
    }

    /// Statement sequence of a `Program` or `Block` body: each statement
    /// starts on its own line, declarations get blank-line policy, leading
    /// comments stay anchored to their statement.
    fn scope_statements(&mut self, node: &SyntaxNode) {
        let mut prev_decl: Option<SyntaxKind> = None;
        let mut first = true;
        for child in node.children() {
            if child.kind == SyntaxKind::MarkupSegment {
                self.emit_until(child.span.end);
                prev_decl = None;
                first = false;
                continue;
            }
            let chain_start = self.leading_chain_start(child.span.start);
            // Flush open/close tags sitting between statements first; the
            // layout right after `<?brio` is the author's.
            self.emit_until(chain_start);
            let separation = if self.prev == Some(TokenKind::OpenTag) || self.prev.is_none() {
                None
            } else {
                Some(self.separation_policy(child.kind, prev_decl, first))
            };
            self.emit_statement_lead(child.span.start, separation);
            self.visit(child);
            prev_decl = child.kind.is_declaration().then_some(child.kind);
            first = false;
        }
    }

    /// Blank-line policy for the gap before a statement, merged with the
    /// after-policy of a preceding declaration sibling.
    fn separation_policy(
        &self,
        kind: SyntaxKind,
        prev_decl: Option<SyntaxKind>,
        first: bool,
    ) -> BlankLines {
        let preserved = BlankLines {
            min: 0,
            max: self.style.max_preserved_blank_lines,
        };
        let mut policy = match kind {
            SyntaxKind::ClassDecl => self.style.blank_before_class,
            SyntaxKind::FunctionDecl => self.style.blank_before_function,
            _ => preserved,
        };
        if first {
            // Right after `{` nothing forces extra blanks.
            policy = policy.collapse_only();
        }
        match prev_decl {
            Some(SyntaxKind::ClassDecl) => policy.merge(self.style.blank_after_class),
            Some(SyntaxKind::FunctionDecl) => policy.merge(self.style.blank_after_function),
            _ => policy,
        }
    }

    /// First offset of the comment chain leading a statement, or the
    /// statement start when it has no leading comments.
    fn leading_chain_start(&self, stmt_start: u32) -> u32 {
        let mut i = self.pos;
        while let Some(tok) = self.tokens.get(i) {
            if tok.span.start >= stmt_start {
                break;
            }
            if tok.kind.is_comment() {
                return tok.span.start;
            }
            i += 1;
        }
        stmt_start
    }

    /// Emit the leading comments of a statement and plant the separation.
    ///
    /// A comment already on its own line anchors the statement: the
    /// blank-line minimum is not expanded above it, only the maximum is
    /// enforced. A trailing comment (same line as the previous statement)
    /// keeps its inline spacing and passes the separation on.
    fn emit_statement_lead(&mut self, stmt_start: u32, separation: Option<BlankLines>) {
        let mut remaining = separation;
        let had_separation = separation.is_some();
        let mut emitted_comment = false;
        while let Some(i) = self.peek_significant() {
            let tok = &self.tokens[i];
            if tok.span.start >= stmt_start || !tok.kind.is_comment() {
                break;
            }
            let own_line = self.gap_text(tok.span.start).contains('\n');
            if own_line && self.prev != Some(TokenKind::OpenTag) {
                let max = remaining
                    .take()
                    .map_or(self.style.max_preserved_blank_lines, |p| p.max);
                self.pending = Some(Gap::Break { min: 0, max });
            }
            self.emit_next();
            emitted_comment = true;
        }
        if let Some(p) = remaining {
            self.pending = Some(Gap::Break {
                min: p.min,
                max: p.max,
            });
        } else if had_separation && emitted_comment {
            self.pending = Some(Gap::Break {
                min: 0,
                max: self.style.max_preserved_blank_lines,
            });
        }
    }

    fn visit_decl(&mut self, node: &SyntaxNode, context: BraceContext) {
        for child in node.children() {
            self.emit_until(child.span.start);
            match child.kind {
                SyntaxKind::ParamList => {
                    self.pending = Some(Gap::Exact(if self.style.space_before_decl_paren {
                        SpaceRequest::Space
                    } else {
                        SpaceRequest::None
                    }));
                    self.visit(child);
                }
                SyntaxKind::Block => {
                    self.next_brace = context;
                    self.visit(child);
                }
                _ => self.visit(child),
            }
        }
        self.emit_until(node.span.end);
    }

    /// `if`/`while`/`for`: keyword, parenthesized header, body block, and
    /// for `if` an optional else branch (block or chained `if`).
    fn visit_conditional(&mut self, node: &SyntaxNode, space_before_paren: bool) {
        self.emit_next(); // keyword
        self.pending = Some(Gap::Exact(if space_before_paren {
            SpaceRequest::Space
        } else {
            SpaceRequest::None
        }));
        for child in node.children() {
            self.emit_until(child.span.start);
            if child.kind == SyntaxKind::Block {
                self.next_brace = BraceContext::Control;
            }
            self.visit(child);
        }
        self.emit_until(node.span.end);
    }

    fn visit_block(&mut self, node: &SyntaxNode) {
        let context = std::mem::replace(&mut self.next_brace, BraceContext::Other);
        let placement = match context {
            BraceContext::Class => self.style.class_brace,
            BraceContext::Function => self.style.function_brace,
            BraceContext::Control | BraceContext::Other => self.style.control_brace,
        };
        // A block in statement position already carries its separation.
        if self.pending.is_none() && self.prev.is_some() {
            self.pending = Some(match placement {
                BracePlacement::SameLine => Gap::Exact(if self.style.space_before_brace {
                    SpaceRequest::Space
                } else {
                    SpaceRequest::None
                }),
                BracePlacement::NextLine => Gap::Break { min: 0, max: 0 },
            });
        }
        self.emit_next(); // `{`
        self.push_indent(IndentChange::Push, IndentKind::Block);

        let empty = node.children.is_empty()
            && self
                .peek_significant()
                .is_some_and(|i| self.tokens[i].kind == TokenKind::RBrace);
        if empty {
            self.pending = Some(Gap::Exact(SpaceRequest::None));
        } else {
            self.scope_statements(node);
            self.emit_block_trailing_comments(node.span.end);
        }
        self.push_indent(IndentChange::Pop, IndentKind::Block);
        if !empty {
            self.pending = Some(Gap::Break {
                min: 0,
                max: self.style.max_preserved_blank_lines,
            });
        }
        self.emit_next(); // `}`
    }

    /// Comments between the last statement and the closing brace.
    fn emit_block_trailing_comments(&mut self, block_end: u32) {
        while let Some(i) = self.peek_significant() {
            let tok = &self.tokens[i];
            if tok.span.start >= block_end || !tok.kind.is_comment() {
                break;
            }
            if self.gap_text(tok.span.start).contains('\n') {
                self.pending = Some(Gap::Break {
                    min: 0,
                    max: self.style.max_preserved_blank_lines,
                });
            }
            self.emit_next();
        }
    }

    /// Argument list of a call: decides wrapping, then emits one argument
    /// per line inside a continuation frame when wrapping applies.
    fn visit_arglist(&mut self, node: &SyntaxNode) {
        let wrap = !node.children.is_empty()
            && match self.style.wrap_arguments {
                WrapStyle::Never => false,
                WrapStyle::Always => true,
                WrapStyle::IfLong => self.has_break_within(node.span),
            };
        self.emit_next(); // `(`
        if wrap {
            self.push_indent(IndentChange::Push, IndentKind::Continuation);
        }
        for child in node.children() {
            // Commas sit between argument spans; emit them with their
            // inline spacing before planting the wrap break.
            self.emit_until(child.span.start);
            if wrap {
                self.pending = Some(Gap::Break {
                    min: 0,
                    max: self.style.max_preserved_blank_lines,
                });
            }
            self.visit(child);
        }
        if wrap {
            self.push_indent(IndentChange::Pop, IndentKind::Continuation);
            self.pending = Some(Gap::Break { min: 0, max: 0 });
        }
        self.emit_until(node.span.end); // `)`
    }

    /// Whether a whitespace token inside `span` contains a line break.
    /// String literals may span lines without making a list long.
    fn has_break_within(&self, span: Span) -> bool {
        self.tokens[self.pos..]
            .iter()
            .take_while(|t| t.span.start < span.end)
            .any(|t| t.span.start >= span.start && t.kind.is_whitespace() && t.text.contains('\n'))
    }

    // ------------------------------------------------------------------
    // Token emission
    // ------------------------------------------------------------------

    /// Index of the next significant token, if any.
    fn peek_significant(&self) -> Option<usize> {
        let mut i = self.pos;
        while let Some(tok) = self.tokens.get(i) {
            if tok.kind.is_whitespace() {
                i += 1;
            } else {
                return Some(i);
            }
        }
        None
    }

    /// Emit significant tokens until the next one starts at or past
    /// `offset`.
    fn emit_until(&mut self, offset: u32) {
        while let Some(i) = self.peek_significant() {
            if self.tokens[i].span.start >= offset {
                break;
            }
            self.emit_next();
        }
    }

    /// Emit the next significant token, preceded by a whitespace directive
    /// for the gap leading up to it.
    fn emit_next(&mut self) {
        let Some(i) = self.peek_significant() else {
            self.pos = self.tokens.len();
            return;
        };
        let tok = &self.tokens[i];
        let gap = Span::new(self.prev_text_end, tok.span.start);
        let old_text = &self.source[gap.range()];

        let request = self.decide_request(tok, old_text);
        self.out.push(FormatToken::Whitespace(WhitespaceDirective {
            span: gap,
            old_text: old_text.to_string(),
            request,
        }));
        self.out.push(FormatToken::Verbatim(Verbatim {
            kind: tok.kind,
            span: tok.span,
            text: tok.text.clone(),
        }));

        match tok.kind {
            TokenKind::Operator => {
                self.last_operator_binary = self
                    .prev
                    .is_some_and(|k| rules::OPERAND_ENDS.contains(&k));
            }
            TokenKind::Arrow => self.prev_arrow_fat = tok.text == "=>",
            _ => {}
        }
        self.prev = Some(tok.kind);
        self.prev_text_end = tok.span.end;
        self.pos = i + 1;
    }

    /// Resolve the request for the gap before `tok`.
    fn decide_request(&mut self, tok: &Token, old_text: &str) -> SpaceRequest {
        let pending = self.pending.take();
        let Some(prev) = self.prev else {
            // Leading whitespace before the first token is the author's.
            return SpaceRequest::Preserve;
        };
        if self.preserve_depth > 0 || tok.is_markup() || prev == TokenKind::MarkupText {
            return SpaceRequest::Preserve;
        }
        match pending {
            Some(Gap::Exact(req)) => self.finish_inline(req, prev, old_text, false),
            Some(Gap::Break { min, max }) => blank_request(min, max, old_text),
            None => {
                let class = rules::classify(prev, tok.kind);
                let req = self.resolve_class(class, tok);
                // `} else` placement is enforced, not kept: the brace style
                // decides which line the keyword lands on.
                let keeps_breaks = class != SpacingClass::KeywordAfterBlock;
                self.finish_inline(req, prev, old_text, keeps_breaks)
            }
        }
    }

    /// Downgrade an inline request to `Preserve` where rewriting would be
    /// wrong: nothing may be glued onto a line comment, and table-derived
    /// spacing keeps an author's existing line break.
    fn finish_inline(
        &self,
        req: SpaceRequest,
        prev: TokenKind,
        old_text: &str,
        from_table: bool,
    ) -> SpaceRequest {
        match req {
            SpaceRequest::None | SpaceRequest::Space => {
                if prev == TokenKind::LineComment {
                    SpaceRequest::Preserve
                } else if from_table && old_text.contains('\n') {
                    SpaceRequest::Preserve
                } else {
                    req
                }
            }
            SpaceRequest::Blank { .. } | SpaceRequest::Preserve => req,
        }
    }

    /// Map a spacing class to a request under the active style.
    fn resolve_class(&self, class: SpacingClass, tok: &Token) -> SpaceRequest {
        let on = |enabled: bool| {
            if enabled {
                SpaceRequest::Space
            } else {
                SpaceRequest::None
            }
        };
        match class {
            SpacingClass::EmptyDelims => SpaceRequest::None,
            SpacingClass::BeforeComma => on(self.style.space_before_comma),
            SpacingClass::AfterComma => on(self.style.space_after_comma),
            SpacingClass::BeforeSemi => SpaceRequest::None,
            SpacingClass::AfterSemi => on(self.style.space_after_semi_in_for),
            SpacingClass::WithinParens => on(self.style.space_within_parens),
            SpacingClass::WithinBrackets => SpaceRequest::None,
            SpacingClass::AroundAssign => on(self.style.space_around_assign_op),
            SpacingClass::AroundBinary => on(self.style.space_around_binary_op),
            SpacingClass::AfterOperator => {
                if self.last_operator_binary {
                    on(self.style.space_around_binary_op)
                } else {
                    // Prefix operators glue to their operand.
                    SpaceRequest::None
                }
            }
            SpacingClass::AroundArrow => {
                let fat = if tok.kind == TokenKind::Arrow {
                    tok.text == "=>"
                } else {
                    self.prev_arrow_fat
                };
                if fat {
                    SpaceRequest::Space
                } else {
                    SpaceRequest::None
                }
            }
            SpacingClass::AfterKeyword => on(self.style.space_after_keyword),
            SpacingClass::KeywordAfterBlock => {
                if self.style.control_brace == BracePlacement::NextLine {
                    SpaceRequest::Blank { lines: 0 }
                } else {
                    SpaceRequest::Space
                }
            }
            SpacingClass::CallParen => on(self.style.space_before_call_paren),
            SpacingClass::AfterOpenTag | SpacingClass::BeforeCloseTag => SpaceRequest::Space,
            SpacingClass::Keep => SpaceRequest::Preserve,
        }
    }

    fn push_indent(&mut self, change: IndentChange, kind: IndentKind) {
        self.out.push(FormatToken::Indent(IndentDirective {
            change,
            kind,
            offset: self.prev_text_end,
        }));
    }

    /// Original text of the gap between the last emitted token and `until`.
    fn gap_text(&self, until: u32) -> &str {
        &self.source[Span::new(self.prev_text_end, until).range()]
    }
}

/// Clamp the author's blank lines into `min..=max` and request the result.
fn blank_request(min: u32, max: u32, old_text: &str) -> SpaceRequest {
    let newlines = u32::try_from(old_text.matches('\n').count()).unwrap_or(u32::MAX);
    let existing = newlines.saturating_sub(1);
    let lines = BlankLines { min, max }.clamp(existing);
    SpaceRequest::Blank { lines }
}

/// Insert a `Placeholder` for each tracked offset, anchored before the first
/// format token at or past it.
fn insert_placeholders(out: &mut Vec<FormatToken>, carets: &[u32]) {
    for &offset in carets {
        let at = out
            .iter()
            .position(|t| t.anchor() >= offset)
            .unwrap_or(out.len());
        out.insert(at, FormatToken::Placeholder(Placeholder { offset }));
    }
}
