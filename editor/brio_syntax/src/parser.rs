//! Best-effort recursive-descent parser.
//!
//! Produces the construct tree the formatter dispatches on. The parser never
//! fails: statements it cannot interpret are wrapped in `Error` nodes that
//! cover the skipped span, and structural navigation always makes progress.
//!
//! Whitespace and comment tokens are skipped when matching structure but
//! remain inside node spans, since spans are plain byte ranges.

use brio_ir::{Span, SyntaxKind, SyntaxNode, Token, TokenKind};

/// Parse a token stream into a `Program` node.
pub fn parse(tokens: &[Token]) -> SyntaxNode {
    let mut parser = Parser {
        tokens,
        pos: 0,
        last_end: 0,
    };
    parser.program()
}

/// Result of parsing one expression: the span it covered and the composite
/// node, if the expression has structure the formatter cares about.
struct ExprRes {
    span: Span,
    node: Option<SyntaxNode>,
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// End offset of the last structural token consumed.
    last_end: u32,
}

impl Parser<'_> {
    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    fn next_structural(&self) -> Option<usize> {
        let mut i = self.pos;
        while let Some(tok) = self.tokens.get(i) {
            if tok.kind.is_whitespace() || tok.kind.is_comment() {
                i += 1;
            } else {
                return Some(i);
            }
        }
        None
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.next_structural().map(|i| self.tokens[i].kind)
    }

    fn peek_span(&self) -> Option<Span> {
        self.next_structural().map(|i| self.tokens[i].span)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn at_keyword(&self, word: &str) -> bool {
        self.next_structural()
            .map(|i| &self.tokens[i])
            .is_some_and(|t| t.kind == TokenKind::Keyword && t.text == word)
    }

    fn at_text(&self, kind: TokenKind, text: &str) -> bool {
        self.next_structural()
            .map(|i| &self.tokens[i])
            .is_some_and(|t| t.kind == kind && t.text == text)
    }

    /// Advance past the next structural token and return its span.
    fn bump(&mut self) -> Option<Span> {
        let i = self.next_structural()?;
        self.pos = i + 1;
        self.last_end = self.tokens[i].span.end;
        Some(self.tokens[i].span)
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Span> {
        if self.at(kind) {
            self.bump()
        } else {
            None
        }
    }

    // ------------------------------------------------------------------
    // Document structure
    // ------------------------------------------------------------------

    fn program(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::MarkupText => children.push(self.markup_segment()),
                TokenKind::OpenTag | TokenKind::CloseTag => {
                    self.bump();
                }
                _ => children.push(self.statement()),
            }
        }
        let end = self.tokens.last().map_or(0, |t| t.span.end);
        SyntaxNode::new(SyntaxKind::Program, Span::new(0, end), children)
    }

    fn markup_segment(&mut self) -> SyntaxNode {
        let mut span = Span::default();
        let mut first = true;
        while self.at(TokenKind::MarkupText) {
            if let Some(s) = self.bump() {
                if first {
                    span = s;
                    first = false;
                } else {
                    span.end = s.end;
                }
            }
        }
        SyntaxNode::leaf(SyntaxKind::MarkupSegment, span)
    }

    fn statement(&mut self) -> SyntaxNode {
        if self.at_keyword("class") {
            self.class_decl()
        } else if self.at_keyword("function") {
            self.function_decl()
        } else if self.at_keyword("if") {
            self.conditional(SyntaxKind::If)
        } else if self.at_keyword("while") {
            self.conditional(SyntaxKind::While)
        } else if self.at_keyword("for") {
            self.for_stmt()
        } else if self.at_keyword("return") {
            self.keyword_stmt(SyntaxKind::Return)
        } else if self.at_keyword("echo") {
            self.keyword_stmt(SyntaxKind::Echo)
        } else if self.at(TokenKind::LBrace) {
            self.block()
        } else {
            self.expr_stmt()
        }
    }

    fn class_decl(&mut self) -> SyntaxNode {
        let start = self.bump().map_or(0, |s| s.start);
        self.eat(TokenKind::Ident);
        let mut children = Vec::new();
        if self.at(TokenKind::LBrace) {
            children.push(self.block());
        }
        SyntaxNode::new(
            SyntaxKind::ClassDecl,
            Span::new(start, self.last_end),
            children,
        )
    }

    fn function_decl(&mut self) -> SyntaxNode {
        let start = self.bump().map_or(0, |s| s.start);
        self.eat(TokenKind::Ident);
        let mut children = Vec::new();
        if self.at(TokenKind::LParen) {
            children.push(self.param_list());
        }
        if self.at(TokenKind::LBrace) {
            children.push(self.block());
        }
        SyntaxNode::new(
            SyntaxKind::FunctionDecl,
            Span::new(start, self.last_end),
            children,
        )
    }

    /// Parameter lists are kept flat: the formatter drives their interior
    /// from token-pair rules alone.
    fn param_list(&mut self) -> SyntaxNode {
        let start = self.bump().map_or(0, |s| s.start);
        let mut depth = 1u32;
        while depth > 0 {
            match self.peek_kind() {
                None => break,
                Some(TokenKind::LParen) => {
                    depth += 1;
                    self.bump();
                }
                Some(TokenKind::RParen) => {
                    depth -= 1;
                    self.bump();
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        SyntaxNode::leaf(SyntaxKind::ParamList, Span::new(start, self.last_end))
    }

    fn block(&mut self) -> SyntaxNode {
        let start = self.bump().map_or(0, |s| s.start);
        let mut children = Vec::new();
        loop {
            match self.peek_kind() {
                None => break,
                Some(TokenKind::RBrace) => {
                    self.bump();
                    break;
                }
                Some(TokenKind::OpenTag | TokenKind::CloseTag) => {
                    self.bump();
                }
                Some(TokenKind::MarkupText) => children.push(self.markup_segment()),
                Some(_) => children.push(self.statement()),
            }
        }
        SyntaxNode::new(SyntaxKind::Block, Span::new(start, self.last_end), children)
    }

    fn conditional(&mut self, kind: SyntaxKind) -> SyntaxNode {
        let start = self.bump().map_or(0, |s| s.start);
        let mut children = Vec::new();
        if self.eat(TokenKind::LParen).is_some() {
            if let Some(cond) = self.expr() {
                if let Some(node) = cond.node {
                    children.push(node);
                }
            }
            self.eat(TokenKind::RParen);
        }
        if self.at(TokenKind::LBrace) {
            children.push(self.block());
        }
        if kind == SyntaxKind::If && self.at_keyword("else") {
            self.bump();
            if self.at_keyword("if") {
                children.push(self.conditional(SyntaxKind::If));
            } else if self.at(TokenKind::LBrace) {
                children.push(self.block());
            }
        }
        SyntaxNode::new(kind, Span::new(start, self.last_end), children)
    }

    fn for_stmt(&mut self) -> SyntaxNode {
        let start = self.bump().map_or(0, |s| s.start);
        let mut children = Vec::new();
        if self.eat(TokenKind::LParen).is_some() {
            for _ in 0..3 {
                if !self.at(TokenKind::Semi) && !self.at(TokenKind::RParen) {
                    if let Some(part) = self.expr() {
                        if let Some(node) = part.node {
                            children.push(node);
                        }
                    }
                }
                if self.eat(TokenKind::Semi).is_none() {
                    break;
                }
            }
            self.eat(TokenKind::RParen);
        }
        if self.at(TokenKind::LBrace) {
            children.push(self.block());
        }
        SyntaxNode::new(
            SyntaxKind::For,
            Span::new(start, self.last_end),
            children,
        )
    }

    fn keyword_stmt(&mut self, kind: SyntaxKind) -> SyntaxNode {
        let start = self.bump().map_or(0, |s| s.start);
        let mut children = Vec::new();
        if !self.at(TokenKind::Semi) {
            loop {
                if let Some(res) = self.expr() {
                    if let Some(node) = res.node {
                        children.push(node);
                    }
                } else {
                    break;
                }
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.eat(TokenKind::Semi);
        SyntaxNode::new(kind, Span::new(start, self.last_end), children)
    }

    fn expr_stmt(&mut self) -> SyntaxNode {
        let Some(start) = self.peek_span().map(|s| s.start) else {
            return SyntaxNode::leaf(SyntaxKind::Error, Span::new(self.last_end, self.last_end));
        };
        match self.expr() {
            Some(res) => {
                self.eat(TokenKind::Semi);
                let children = res.node.into_iter().collect();
                SyntaxNode::new(
                    SyntaxKind::ExprStmt,
                    Span::new(start, self.last_end),
                    children,
                )
            }
            None => self.error_statement(start),
        }
    }

    /// Skip to the next statement boundary, covering the skipped tokens with
    /// an `Error` node so they pass through formatting untouched.
    fn error_statement(&mut self, start: u32) -> SyntaxNode {
        loop {
            match self.peek_kind() {
                None
                | Some(
                    TokenKind::RBrace
                    | TokenKind::CloseTag
                    | TokenKind::OpenTag
                    | TokenKind::MarkupText,
                ) => break,
                Some(TokenKind::Semi) => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        if self.last_end <= start {
            // Nothing consumable; force progress.
            self.bump();
        }
        SyntaxNode::leaf(SyntaxKind::Error, Span::new(start, self.last_end))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&mut self) -> Option<ExprRes> {
        let lhs = self.binary()?;
        if self.at(TokenKind::Assign) {
            self.bump();
            let rhs = self.expr();
            let end = rhs.as_ref().map_or(self.last_end, |r| r.span.end);
            let span = Span::new(lhs.span.start, end);
            let mut children: Vec<SyntaxNode> = lhs.node.into_iter().collect();
            if let Some(node) = rhs.and_then(|r| r.node) {
                children.push(node);
            }
            return Some(ExprRes {
                span,
                node: Some(SyntaxNode::new(SyntaxKind::Assignment, span, children)),
            });
        }
        Some(lhs)
    }

    /// Binary chains are flattened into one node; `=>` pairs count as binary
    /// for formatting purposes.
    fn binary(&mut self) -> Option<ExprRes> {
        let first = self.unary()?;
        if !(self.at(TokenKind::Operator) || self.at_text(TokenKind::Arrow, "=>")) {
            return Some(first);
        }
        let start = first.span.start;
        let mut end = first.span.end;
        let mut children: Vec<SyntaxNode> = first.node.into_iter().collect();
        while self.at(TokenKind::Operator) || self.at_text(TokenKind::Arrow, "=>") {
            self.bump();
            end = self.last_end;
            match self.unary() {
                Some(rhs) => {
                    end = rhs.span.end;
                    children.extend(rhs.node);
                }
                None => break,
            }
        }
        let span = Span::new(start, end);
        Some(ExprRes {
            span,
            node: Some(SyntaxNode::new(SyntaxKind::Binary, span, children)),
        })
    }

    fn unary(&mut self) -> Option<ExprRes> {
        if self.at(TokenKind::Operator) {
            let start = self.bump().map_or(0, |s| s.start);
            let inner = self.unary();
            let end = inner.as_ref().map_or(self.last_end, |i| i.span.end);
            return Some(ExprRes {
                span: Span::new(start, end),
                node: inner.and_then(|i| i.node),
            });
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Option<ExprRes> {
        let mut res = self.primary()?;
        loop {
            if self.at_text(TokenKind::Arrow, "->") {
                self.bump();
                self.eat(TokenKind::Ident);
                res.span.end = self.last_end;
            } else if self.at(TokenKind::LParen) {
                let args = self.arg_list();
                let span = Span::new(res.span.start, args.span.end);
                let mut children: Vec<SyntaxNode> = res.node.into_iter().collect();
                children.push(args);
                res = ExprRes {
                    span,
                    node: Some(SyntaxNode::new(SyntaxKind::Call, span, children)),
                };
            } else if self.at(TokenKind::LBracket) {
                self.bump();
                let inner = self.expr();
                self.eat(TokenKind::RBracket);
                let span = Span::new(res.span.start, self.last_end);
                let mut children: Vec<SyntaxNode> = res.node.into_iter().collect();
                children.extend(inner.and_then(|i| i.node));
                let node = if children.is_empty() {
                    None
                } else {
                    Some(SyntaxNode::new(SyntaxKind::Binary, span, children))
                };
                res = ExprRes { span, node };
            } else {
                return Some(res);
            }
        }
    }

    fn primary(&mut self) -> Option<ExprRes> {
        match self.peek_kind()? {
            TokenKind::Variable | TokenKind::Ident | TokenKind::Number | TokenKind::Str => {
                let span = self.bump()?;
                Some(ExprRes { span, node: None })
            }
            TokenKind::Keyword
                if self.at_keyword("true") || self.at_keyword("false") || self.at_keyword("null") =>
            {
                let span = self.bump()?;
                Some(ExprRes { span, node: None })
            }
            TokenKind::LParen => {
                let start = self.bump()?.start;
                let inner = self.expr();
                self.eat(TokenKind::RParen);
                Some(ExprRes {
                    span: Span::new(start, self.last_end),
                    node: inner.and_then(|i| i.node),
                })
            }
            TokenKind::LBracket => Some(self.array_lit()),
            _ => None,
        }
    }

    fn array_lit(&mut self) -> ExprRes {
        let start = self.bump().map_or(0, |s| s.start);
        let mut children = Vec::new();
        loop {
            match self.peek_kind() {
                None => break,
                Some(TokenKind::RBracket) => {
                    self.bump();
                    break;
                }
                Some(TokenKind::Comma) => {
                    self.bump();
                }
                Some(_) => match self.expr() {
                    Some(item) => children.extend(item.node),
                    None => {
                        self.bump();
                    }
                },
            }
        }
        let span = Span::new(start, self.last_end);
        ExprRes {
            span,
            node: Some(SyntaxNode::new(SyntaxKind::ArrayLit, span, children)),
        }
    }

    /// Each argument is wrapped in an `Argument` node so the formatter can
    /// place wrap points without re-deriving argument boundaries.
    fn arg_list(&mut self) -> SyntaxNode {
        let start = self.bump().map_or(0, |s| s.start);
        let mut args = Vec::new();
        loop {
            match self.peek_kind() {
                None => break,
                Some(TokenKind::RParen) => {
                    self.bump();
                    break;
                }
                Some(TokenKind::Comma) => {
                    self.bump();
                }
                Some(_) => match self.expr() {
                    Some(res) => {
                        let children = res.node.into_iter().collect();
                        args.push(SyntaxNode::new(SyntaxKind::Argument, res.span, children));
                    }
                    None => {
                        self.bump();
                    }
                },
            }
        }
        SyntaxNode::new(SyntaxKind::ArgList, Span::new(start, self.last_end), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex;
    use pretty_assertions::assert_eq;

    fn parse_source(source: &str) -> SyntaxNode {
        parse(&lex(source))
    }

    fn kinds_of(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.children().map(|c| c.kind).collect()
    }

    #[test]
    fn parse_markup_and_statement() {
        let program = parse_source("<div><?brio echo $x; ?></div>");
        assert_eq!(
            kinds_of(&program),
            vec![
                SyntaxKind::MarkupSegment,
                SyntaxKind::Echo,
                SyntaxKind::MarkupSegment,
            ]
        );
    }

    #[test]
    fn parse_if_with_block() {
        let program = parse_source("<?brio if($x){y();}");
        let if_node = &program.children[0];
        assert_eq!(if_node.kind, SyntaxKind::If);
        // Condition `$x` is a plain primary, so the only child is the block.
        assert_eq!(kinds_of(if_node), vec![SyntaxKind::Block]);
        let block = &if_node.children[0];
        assert_eq!(kinds_of(block), vec![SyntaxKind::ExprStmt]);
    }

    #[test]
    fn parse_if_else_chain() {
        let program = parse_source("<?brio if ($a) { f(); } else if ($b) { g(); } else { h(); }");
        let if_node = &program.children[0];
        assert_eq!(if_node.kind, SyntaxKind::If);
        let nested = if_node
            .child_of_kind(SyntaxKind::If)
            .map(|n| kinds_of(n));
        assert_eq!(nested, Some(vec![SyntaxKind::Block, SyntaxKind::Block]));
    }

    #[test]
    fn parse_function_with_params_and_body() {
        let program = parse_source("<?brio function render($a, $b) { return $a + $b; }");
        let func = &program.children[0];
        assert_eq!(func.kind, SyntaxKind::FunctionDecl);
        assert_eq!(kinds_of(func), vec![SyntaxKind::ParamList, SyntaxKind::Block]);
        let block = func.child_of_kind(SyntaxKind::Block).map(kinds_of);
        assert_eq!(block, Some(vec![SyntaxKind::Return]));
    }

    #[test]
    fn parse_class_members() {
        let program = parse_source("<?brio class View { function a() {} function b() {} }");
        let class = &program.children[0];
        assert_eq!(class.kind, SyntaxKind::ClassDecl);
        let body = class.child_of_kind(SyntaxKind::Block).map(kinds_of);
        assert_eq!(
            body,
            Some(vec![SyntaxKind::FunctionDecl, SyntaxKind::FunctionDecl])
        );
    }

    #[test]
    fn parse_call_arguments_are_wrapped() {
        let program = parse_source("<?brio render($x, g($y), 1 + 2);");
        let stmt = &program.children[0];
        assert_eq!(stmt.kind, SyntaxKind::ExprStmt);
        let call = &stmt.children[0];
        assert_eq!(call.kind, SyntaxKind::Call);
        let args = call.child_of_kind(SyntaxKind::ArgList).map(kinds_of);
        assert_eq!(
            args,
            Some(vec![
                SyntaxKind::Argument,
                SyntaxKind::Argument,
                SyntaxKind::Argument,
            ])
        );
    }

    #[test]
    fn parse_binary_chain_flattens() {
        let program = parse_source("<?brio echo $a + $b + f($c);");
        let echo = &program.children[0];
        assert_eq!(echo.kind, SyntaxKind::Echo);
        let binary = &echo.children[0];
        assert_eq!(binary.kind, SyntaxKind::Binary);
        // Leaf operands carry no node; only the call survives as a child.
        assert_eq!(kinds_of(binary), vec![SyntaxKind::Call]);
    }

    #[test]
    fn parse_lone_operand_stays_flat() {
        let program = parse_source("<?brio echo $a;");
        let echo = &program.children[0];
        assert_eq!(echo.kind, SyntaxKind::Echo);
        assert!(echo.children.is_empty());
    }

    #[test]
    fn parse_for_loop() {
        let program = parse_source("<?brio for ($i = 0; $i < 3; $i += 1) { echo $i; }");
        let node = &program.children[0];
        assert_eq!(node.kind, SyntaxKind::For);
        assert_eq!(node.children.last().map(|c| c.kind), Some(SyntaxKind::Block));
    }

    #[test]
    fn parse_unparseable_region_becomes_error_node() {
        let program = parse_source("<?brio ) ) ; echo $x;");
        assert_eq!(
            kinds_of(&program),
            vec![SyntaxKind::Error, SyntaxKind::Echo]
        );
    }

    #[test]
    fn parse_error_node_covers_skipped_span() {
        let source = "<?brio } ;";
        let program = parse_source(source);
        let error = &program.children[0];
        assert_eq!(error.kind, SyntaxKind::Error);
        assert!(error.span.len() > 0);
    }

    #[test]
    fn parse_markup_inside_block() {
        let program = parse_source("<?brio if ($x) { ?><p>hi</p><?brio echo $y; } ?>");
        let if_node = &program.children[0];
        let block = if_node.child_of_kind(SyntaxKind::Block).map(kinds_of);
        assert_eq!(
            block,
            Some(vec![SyntaxKind::MarkupSegment, SyntaxKind::Echo])
        );
    }

    #[test]
    fn parse_spans_cover_tokens() {
        let source = "<?brio if ($a == 1) { f($b); }";
        let program = parse_source(source);
        let if_node = &program.children[0];
        assert_eq!(if_node.span.start, 7);
        assert_eq!(if_node.span.end as usize, source.len());
    }

    #[test]
    fn parse_assignment_and_array() {
        let program = parse_source("<?brio $m = ['a' => 1, 'b' => 2];");
        let stmt = &program.children[0];
        let assign = &stmt.children[0];
        assert_eq!(assign.kind, SyntaxKind::Assignment);
        assert_eq!(kinds_of(assign), vec![SyntaxKind::ArrayLit]);
    }
}
