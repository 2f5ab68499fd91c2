//! Syntax tree nodes.
//!
//! The parser produces a lightweight construct tree: each node records the
//! construct kind and the byte span it covers. The formatter dispatches on
//! `SyntaxKind` through a single exhaustive match; unknown or unparseable
//! regions are represented explicitly as [`SyntaxKind::Error`] nodes so the
//! formatter can pass them through verbatim instead of dropping them.

use crate::Span;

/// Construct kind for formatter dispatch.
///
/// A closed tagged set (see the crate docs): new grammar constructs get new
/// variants here rather than open-ended subclassing.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SyntaxKind {
    /// Whole document: markup segments and host statements in order.
    Program,
    /// Contiguous markup region, including the text between `?>` and `<?brio`.
    MarkupSegment,
    /// `class Name { ... }`
    ClassDecl,
    /// `function name(params) { ... }`
    FunctionDecl,
    /// Parenthesized parameter list of a declaration.
    ParamList,
    /// `{ ... }` statement block.
    Block,
    /// `if (cond) { ... } else ...`
    If,
    /// `while (cond) { ... }`
    While,
    /// `for (init; cond; step) { ... }`
    For,
    /// `return expr;`
    Return,
    /// `echo expr;`
    Echo,
    /// Expression statement: `expr;`
    ExprStmt,
    /// Call expression: `callee(args)`.
    Call,
    /// Parenthesized argument list of a call.
    ArgList,
    /// One argument inside an [`SyntaxKind::ArgList`].
    Argument,
    /// Binary operator expression.
    Binary,
    /// Assignment expression.
    Assignment,
    /// `[a, b, c]`
    ArrayLit,
    /// Region the parser could not interpret; contents are preserved as-is.
    Error,
}

impl SyntaxKind {
    /// Statement-level constructs start on their own line inside a block.
    #[inline]
    pub const fn is_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::ClassDecl
                | SyntaxKind::FunctionDecl
                | SyntaxKind::If
                | SyntaxKind::While
                | SyntaxKind::For
                | SyntaxKind::Return
                | SyntaxKind::Echo
                | SyntaxKind::ExprStmt
                | SyntaxKind::Block
                | SyntaxKind::Error
        )
    }

    /// Declarations get blank-line policy treatment.
    #[inline]
    pub const fn is_declaration(self) -> bool {
        matches!(self, SyntaxKind::ClassDecl | SyntaxKind::FunctionDecl)
    }
}

/// A node in the construct tree.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Create a leaf node.
    pub fn leaf(kind: SyntaxKind, span: Span) -> Self {
        SyntaxNode {
            kind,
            span,
            children: Vec::new(),
        }
    }

    /// Create a node with children.
    pub fn new(kind: SyntaxKind, span: Span, children: Vec<SyntaxNode>) -> Self {
        SyntaxNode {
            kind,
            span,
            children,
        }
    }

    /// Iterate over direct children.
    pub fn children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter()
    }

    /// First direct child of the given kind.
    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }
}
