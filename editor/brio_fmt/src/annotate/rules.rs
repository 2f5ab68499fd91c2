//! Declarative spacing rules.
//!
//! Inline spacing between two adjacent significant tokens is decided here.
//! Each rule matches a (left, right) token-kind pair and names a spacing
//! class; the annotator maps the class to a concrete request through the
//! active [`StyleConfig`](crate::StyleConfig). Adding a new spacing decision
//! means adding an entry to `SPACE_RULES`.

use brio_ir::TokenKind;

/// What a matched token pair means, independent of configuration.
///
/// Classes keep the table free of style lookups: the same table serves every
/// configuration, and the annotator resolves each class against the active
/// style (and local context such as whether an operator is binary here).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpacingClass {
    /// Empty delimiter pair: `()`, `[]`.
    EmptyDelims,
    /// Gap before `,`.
    BeforeComma,
    /// Gap after `,`.
    AfterComma,
    /// Gap before `;`.
    BeforeSemi,
    /// Gap after `;` (only meaningful inside `for` headers; elsewhere the
    /// statement walk has already decided the separation).
    AfterSemi,
    /// Just inside `(` or just before `)`.
    WithinParens,
    /// Just inside `[` or just before `]`.
    WithinBrackets,
    /// Either side of an assignment operator.
    AroundAssign,
    /// Operand followed by an operator.
    AroundBinary,
    /// Operator followed by its operand; spacing depends on whether the
    /// operator was binary or a prefix.
    AfterOperator,
    /// Either side of `->` or `=>`; resolution depends on the arrow text.
    AroundArrow,
    /// Keyword followed by anything (condition paren, operand, `{`).
    AfterKeyword,
    /// `}` followed by a keyword, e.g. `} else`.
    KeywordAfterBlock,
    /// Identifier directly followed by `(`: a call.
    CallParen,
    /// Host code starting right after `<?brio`.
    AfterOpenTag,
    /// Host code ending right before `?>`.
    BeforeCloseTag,
    /// No opinion: keep whatever whitespace the author wrote.
    Keep,
}

/// Matcher for one side of a token pair.
#[derive(Clone, Copy, Debug)]
pub enum TokenMatcher {
    /// Matches any token.
    Any,
    /// Matches exactly one kind.
    Exact(TokenKind),
    /// Matches any kind in the slice.
    OneOf(&'static [TokenKind]),
}

impl TokenMatcher {
    #[inline]
    pub fn matches(&self, kind: TokenKind) -> bool {
        match self {
            TokenMatcher::Any => true,
            TokenMatcher::Exact(k) => *k == kind,
            TokenMatcher::OneOf(ks) => ks.contains(&kind),
        }
    }
}

/// A declarative spacing rule.
///
/// Rules are evaluated in table order; the first matching rule wins.
#[derive(Clone, Copy, Debug)]
pub struct SpaceRule {
    /// Human-readable name for debugging.
    pub name: &'static str,
    /// Matcher for the left (preceding) token.
    pub left: TokenMatcher,
    /// Matcher for the right (following) token.
    pub right: TokenMatcher,
    /// The spacing class a match resolves to.
    pub class: SpacingClass,
    /// Priority (lower = higher priority). The table is kept sorted; the
    /// field documents intent and guards reordering in tests.
    pub priority: u8,
}

impl SpaceRule {
    #[inline]
    const fn new(
        name: &'static str,
        left: TokenMatcher,
        right: TokenMatcher,
        class: SpacingClass,
        priority: u8,
    ) -> Self {
        SpaceRule {
            name,
            left,
            right,
            class,
            priority,
        }
    }

    /// Check whether this rule matches the given token pair.
    #[inline]
    pub fn matches(&self, left: TokenKind, right: TokenKind) -> bool {
        self.left.matches(left) && self.right.matches(right)
    }
}

#[allow(
    clippy::enum_glob_use,
    reason = "the rule table is much more readable with short names"
)]
use TokenKind::*;
use TokenMatcher::{Any, Exact, OneOf};

/// Kinds that can end an operand, making a following `Operator` binary.
pub static OPERAND_ENDS: &[TokenKind] =
    &[Ident, Variable, Number, Str, Keyword, RParen, RBracket];

/// All spacing rules in evaluation order.
///
/// Sorted by priority, then definition order within a priority:
///
/// - Priority 10: empty delimiter pairs (most specific)
/// - Priority 15: tag boundaries (outrank punctuation: `; ?>` is a tag gap)
/// - Priority 20: comma and semicolon adjacency
/// - Priority 30: inside parens and brackets
/// - Priority 35: arrows
/// - Priority 40: assignment and binary operators
/// - Priority 50: keywords and calls
/// - Priority 90: fallback
pub static SPACE_RULES: &[SpaceRule] = &[
    // Priority 10: empty delimiters
    SpaceRule::new(
        "EmptyParens",
        Exact(LParen),
        Exact(RParen),
        SpacingClass::EmptyDelims,
        10,
    ),
    SpaceRule::new(
        "EmptyBrackets",
        Exact(LBracket),
        Exact(RBracket),
        SpacingClass::EmptyDelims,
        10,
    ),
    // Priority 15: tag boundaries
    SpaceRule::new(
        "AfterOpenTag",
        Exact(OpenTag),
        Any,
        SpacingClass::AfterOpenTag,
        15,
    ),
    SpaceRule::new(
        "BeforeCloseTag",
        Any,
        Exact(CloseTag),
        SpacingClass::BeforeCloseTag,
        15,
    ),
    // Priority 20: comma and semicolon
    SpaceRule::new(
        "BeforeComma",
        Any,
        Exact(Comma),
        SpacingClass::BeforeComma,
        20,
    ),
    SpaceRule::new(
        "AfterComma",
        Exact(Comma),
        Any,
        SpacingClass::AfterComma,
        20,
    ),
    SpaceRule::new("BeforeSemi", Any, Exact(Semi), SpacingClass::BeforeSemi, 20),
    SpaceRule::new("AfterSemi", Exact(Semi), Any, SpacingClass::AfterSemi, 20),
    // Priority 30: inside delimiters
    SpaceRule::new(
        "AfterOpenParen",
        Exact(LParen),
        Any,
        SpacingClass::WithinParens,
        30,
    ),
    SpaceRule::new(
        "BeforeCloseParen",
        Any,
        Exact(RParen),
        SpacingClass::WithinParens,
        30,
    ),
    SpaceRule::new(
        "AfterOpenBracket",
        Exact(LBracket),
        Any,
        SpacingClass::WithinBrackets,
        30,
    ),
    SpaceRule::new(
        "BeforeCloseBracket",
        Any,
        Exact(RBracket),
        SpacingClass::WithinBrackets,
        30,
    ),
    // Priority 35: arrows bind tighter than generic operators
    SpaceRule::new(
        "BeforeArrow",
        Any,
        Exact(Arrow),
        SpacingClass::AroundArrow,
        35,
    ),
    SpaceRule::new(
        "AfterArrow",
        Exact(Arrow),
        Any,
        SpacingClass::AroundArrow,
        35,
    ),
    // Priority 40: assignment and binary operators
    SpaceRule::new(
        "BeforeAssign",
        Any,
        Exact(Assign),
        SpacingClass::AroundAssign,
        40,
    ),
    SpaceRule::new(
        "AfterAssign",
        Exact(Assign),
        Any,
        SpacingClass::AroundAssign,
        40,
    ),
    SpaceRule::new(
        "BeforeBinaryOp",
        OneOf(OPERAND_ENDS),
        Exact(Operator),
        SpacingClass::AroundBinary,
        40,
    ),
    SpaceRule::new(
        "AfterOperator",
        Exact(Operator),
        Any,
        SpacingClass::AfterOperator,
        40,
    ),
    // Priority 50: keywords and calls
    SpaceRule::new(
        "CallParen",
        Exact(Ident),
        Exact(LParen),
        SpacingClass::CallParen,
        50,
    ),
    SpaceRule::new(
        "KeywordParen",
        Exact(Keyword),
        Exact(LParen),
        SpacingClass::AfterKeyword,
        50,
    ),
    SpaceRule::new(
        "AfterKeyword",
        Exact(Keyword),
        Any,
        SpacingClass::AfterKeyword,
        50,
    ),
    SpaceRule::new(
        "KeywordAfterBlock",
        Exact(RBrace),
        Exact(Keyword),
        SpacingClass::KeywordAfterBlock,
        50,
    ),
    // Priority 90: fallback
    SpaceRule::new("Keep", Any, Any, SpacingClass::Keep, 90),
];

/// Find the spacing class for an adjacent token pair. The trailing `Keep`
/// rule guarantees a match.
pub fn classify(left: TokenKind, right: TokenKind) -> SpacingClass {
    for rule in SPACE_RULES {
        if rule.matches(left, right) {
            return rule.class;
        }
    }
    SpacingClass::Keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn table_is_sorted_by_priority() {
        let mut last = 0;
        for rule in SPACE_RULES {
            assert!(
                rule.priority >= last,
                "rule {} is out of priority order",
                rule.name
            );
            last = rule.priority;
        }
    }

    #[test]
    fn fallback_rule_is_last_and_total() {
        let last = &SPACE_RULES[SPACE_RULES.len() - 1];
        assert_eq!(last.class, SpacingClass::Keep);
        assert!(last.matches(TokenKind::Ident, TokenKind::Ident));
    }

    #[test]
    fn empty_parens_beat_within_parens() {
        assert_eq!(
            classify(TokenKind::LParen, TokenKind::RParen),
            SpacingClass::EmptyDelims
        );
    }

    #[test]
    fn comma_rules() {
        assert_eq!(
            classify(TokenKind::Ident, TokenKind::Comma),
            SpacingClass::BeforeComma
        );
        assert_eq!(
            classify(TokenKind::Comma, TokenKind::Variable),
            SpacingClass::AfterComma
        );
    }

    #[test]
    fn keyword_paren_is_not_a_call() {
        assert_eq!(
            classify(TokenKind::Keyword, TokenKind::LParen),
            SpacingClass::AfterKeyword
        );
        assert_eq!(
            classify(TokenKind::Ident, TokenKind::LParen),
            SpacingClass::CallParen
        );
    }

    #[test]
    fn operand_then_operator_is_binary() {
        assert_eq!(
            classify(TokenKind::Variable, TokenKind::Operator),
            SpacingClass::AroundBinary
        );
        // An operator after a comma is a prefix, not binary.
        assert_eq!(
            classify(TokenKind::Comma, TokenKind::Operator),
            SpacingClass::AfterComma
        );
    }

    #[test]
    fn arrows_bind_tighter_than_assign() {
        assert_eq!(
            classify(TokenKind::Variable, TokenKind::Arrow),
            SpacingClass::AroundArrow
        );
        assert_eq!(
            classify(TokenKind::Arrow, TokenKind::Ident),
            SpacingClass::AroundArrow
        );
    }

    #[test]
    fn else_after_block() {
        assert_eq!(
            classify(TokenKind::RBrace, TokenKind::Keyword),
            SpacingClass::KeywordAfterBlock
        );
    }

    #[test]
    fn tag_boundaries() {
        assert_eq!(
            classify(TokenKind::OpenTag, TokenKind::Keyword),
            SpacingClass::AfterOpenTag
        );
        assert_eq!(
            classify(TokenKind::Semi, TokenKind::CloseTag),
            SpacingClass::BeforeCloseTag
        );
    }

    #[test]
    fn unrelated_pair_falls_through_to_keep() {
        assert_eq!(
            classify(TokenKind::Str, TokenKind::Str),
            SpacingClass::Keep
        );
    }
}
