//! Style configuration.
//!
//! One immutable record resolved per formatting run. The editor stores
//! preferences as a key/value table; [`StyleConfig::from_options`] snapshots
//! that table into typed fields, falling back to the documented default for
//! anything missing or of the wrong type. Missing options are never fatal.

use rustc_hash::FxHashMap;
use tracing::debug;

/// Where the opening brace of a construct goes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BracePlacement {
    /// `if (x) {`
    SameLine,
    /// `if (x)` newline `{`
    NextLine,
}

/// How argument lists wrap.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WrapStyle {
    /// Never introduce wrap points; existing layout is preserved.
    Never,
    /// Wrap only lists whose original text already spans multiple lines.
    IfLong,
    /// One argument per line, always.
    Always,
}

/// Blank-line policy for one construct boundary: expand to `min`, collapse
/// to `max`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlankLines {
    pub min: u32,
    pub max: u32,
}

impl BlankLines {
    /// Clamp an existing blank-line count into this policy.
    pub fn clamp(self, existing: u32) -> u32 {
        existing.max(self.min).min(self.max.max(self.min))
    }

    /// The same policy with expansion disabled (used when a comment already
    /// anchors the construct).
    pub fn collapse_only(self) -> Self {
        BlankLines { min: 0, max: self.max }
    }

    /// Merge two policies applying to the same boundary; the stricter
    /// minimum and the more permissive maximum win.
    pub fn merge(self, other: Self) -> Self {
        BlankLines {
            min: self.min.max(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// A single preference value as stored by the editor.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OptionValue {
    Int(u32),
    Bool(bool),
    Placement(BracePlacement),
    Wrap(WrapStyle),
}

/// Recognized option keys.
pub mod keys {
    pub const INDENT_SIZE: &str = "indent.size";
    pub const CONTINUATION_INDENT_SIZE: &str = "indent.continuation";
    pub const TAB_SIZE: &str = "tabs.size";
    pub const EXPAND_TABS: &str = "tabs.expand";
    pub const INITIAL_INDENT: &str = "indent.initial";
    pub const MAX_PRESERVED_BLANK_LINES: &str = "blank.max-preserved";
    pub const BLANK_BEFORE_CLASS_MIN: &str = "blank.before-class.min";
    pub const BLANK_BEFORE_CLASS_MAX: &str = "blank.before-class.max";
    pub const BLANK_AFTER_CLASS_MIN: &str = "blank.after-class.min";
    pub const BLANK_AFTER_CLASS_MAX: &str = "blank.after-class.max";
    pub const BLANK_BEFORE_FUNCTION_MIN: &str = "blank.before-function.min";
    pub const BLANK_BEFORE_FUNCTION_MAX: &str = "blank.before-function.max";
    pub const BLANK_AFTER_FUNCTION_MIN: &str = "blank.after-function.min";
    pub const BLANK_AFTER_FUNCTION_MAX: &str = "blank.after-function.max";
    pub const CLASS_BRACE: &str = "braces.class";
    pub const FUNCTION_BRACE: &str = "braces.function";
    pub const CONTROL_BRACE: &str = "braces.control";
    pub const WRAP_ARGUMENTS: &str = "wrap.arguments";
    pub const SPACE_BEFORE_IF_PAREN: &str = "space.before-if-paren";
    pub const SPACE_BEFORE_WHILE_PAREN: &str = "space.before-while-paren";
    pub const SPACE_BEFORE_FOR_PAREN: &str = "space.before-for-paren";
    pub const SPACE_BEFORE_CALL_PAREN: &str = "space.before-call-paren";
    pub const SPACE_BEFORE_DECL_PAREN: &str = "space.before-decl-paren";
    pub const SPACE_AFTER_COMMA: &str = "space.after-comma";
    pub const SPACE_BEFORE_COMMA: &str = "space.before-comma";
    pub const SPACE_AROUND_BINARY_OP: &str = "space.around-binary-op";
    pub const SPACE_AROUND_ASSIGN_OP: &str = "space.around-assign-op";
    pub const SPACE_WITHIN_PARENS: &str = "space.within-parens";
    pub const SPACE_BEFORE_BRACE: &str = "space.before-brace";
    pub const SPACE_AFTER_KEYWORD: &str = "space.after-keyword";
    pub const SPACE_AFTER_SEMI_IN_FOR: &str = "space.after-semi-in-for";
}

/// Frozen configuration for one formatting run.
///
/// `Default` documents every option's fallback value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StyleConfig {
    /// Spaces per block indent level.
    pub indent_size: u32,
    /// Spaces per continuation/hanging indent frame.
    pub continuation_indent_size: u32,
    /// Column width of one tab when rendering indentation as tabs.
    pub tab_size: u32,
    /// Render indentation as spaces (`true`) or tabs (`false`).
    pub expand_tabs: bool,
    /// Indentation the whole document is embedded at.
    pub initial_indent: u32,
    /// Blank lines preserved between ordinary statements.
    pub max_preserved_blank_lines: u32,
    pub blank_before_class: BlankLines,
    pub blank_after_class: BlankLines,
    pub blank_before_function: BlankLines,
    pub blank_after_function: BlankLines,
    pub class_brace: BracePlacement,
    pub function_brace: BracePlacement,
    pub control_brace: BracePlacement,
    pub wrap_arguments: WrapStyle,
    pub space_before_if_paren: bool,
    pub space_before_while_paren: bool,
    pub space_before_for_paren: bool,
    pub space_before_call_paren: bool,
    pub space_before_decl_paren: bool,
    pub space_after_comma: bool,
    pub space_before_comma: bool,
    pub space_around_binary_op: bool,
    pub space_around_assign_op: bool,
    pub space_within_parens: bool,
    pub space_before_brace: bool,
    pub space_after_keyword: bool,
    pub space_after_semi_in_for: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        StyleConfig {
            indent_size: 4,
            continuation_indent_size: 8,
            tab_size: 8,
            expand_tabs: true,
            initial_indent: 0,
            max_preserved_blank_lines: 1,
            blank_before_class: BlankLines { min: 1, max: 2 },
            blank_after_class: BlankLines { min: 1, max: 2 },
            blank_before_function: BlankLines { min: 1, max: 2 },
            blank_after_function: BlankLines { min: 1, max: 2 },
            class_brace: BracePlacement::SameLine,
            function_brace: BracePlacement::SameLine,
            control_brace: BracePlacement::SameLine,
            wrap_arguments: WrapStyle::IfLong,
            space_before_if_paren: true,
            space_before_while_paren: true,
            space_before_for_paren: true,
            space_before_call_paren: false,
            space_before_decl_paren: false,
            space_after_comma: true,
            space_before_comma: false,
            space_around_binary_op: true,
            space_around_assign_op: true,
            space_within_parens: false,
            space_before_brace: true,
            space_after_keyword: true,
            space_after_semi_in_for: true,
        }
    }
}

impl StyleConfig {
    /// Resolve a preference snapshot into a typed configuration.
    ///
    /// Unknown keys are ignored; missing or mistyped values fall back to the
    /// defaults documented on [`StyleConfig::default`].
    pub fn from_options(options: &FxHashMap<String, OptionValue>) -> Self {
        let defaults = StyleConfig::default();
        StyleConfig {
            indent_size: int_option(options, keys::INDENT_SIZE, defaults.indent_size),
            continuation_indent_size: int_option(
                options,
                keys::CONTINUATION_INDENT_SIZE,
                defaults.continuation_indent_size,
            ),
            tab_size: int_option(options, keys::TAB_SIZE, defaults.tab_size),
            expand_tabs: bool_option(options, keys::EXPAND_TABS, defaults.expand_tabs),
            initial_indent: int_option(options, keys::INITIAL_INDENT, defaults.initial_indent),
            max_preserved_blank_lines: int_option(
                options,
                keys::MAX_PRESERVED_BLANK_LINES,
                defaults.max_preserved_blank_lines,
            ),
            blank_before_class: blank_option(
                options,
                keys::BLANK_BEFORE_CLASS_MIN,
                keys::BLANK_BEFORE_CLASS_MAX,
                defaults.blank_before_class,
            ),
            blank_after_class: blank_option(
                options,
                keys::BLANK_AFTER_CLASS_MIN,
                keys::BLANK_AFTER_CLASS_MAX,
                defaults.blank_after_class,
            ),
            blank_before_function: blank_option(
                options,
                keys::BLANK_BEFORE_FUNCTION_MIN,
                keys::BLANK_BEFORE_FUNCTION_MAX,
                defaults.blank_before_function,
            ),
            blank_after_function: blank_option(
                options,
                keys::BLANK_AFTER_FUNCTION_MIN,
                keys::BLANK_AFTER_FUNCTION_MAX,
                defaults.blank_after_function,
            ),
            class_brace: placement_option(options, keys::CLASS_BRACE, defaults.class_brace),
            function_brace: placement_option(
                options,
                keys::FUNCTION_BRACE,
                defaults.function_brace,
            ),
            control_brace: placement_option(options, keys::CONTROL_BRACE, defaults.control_brace),
            wrap_arguments: wrap_option(options, keys::WRAP_ARGUMENTS, defaults.wrap_arguments),
            space_before_if_paren: bool_option(
                options,
                keys::SPACE_BEFORE_IF_PAREN,
                defaults.space_before_if_paren,
            ),
            space_before_while_paren: bool_option(
                options,
                keys::SPACE_BEFORE_WHILE_PAREN,
                defaults.space_before_while_paren,
            ),
            space_before_for_paren: bool_option(
                options,
                keys::SPACE_BEFORE_FOR_PAREN,
                defaults.space_before_for_paren,
            ),
            space_before_call_paren: bool_option(
                options,
                keys::SPACE_BEFORE_CALL_PAREN,
                defaults.space_before_call_paren,
            ),
            space_before_decl_paren: bool_option(
                options,
                keys::SPACE_BEFORE_DECL_PAREN,
                defaults.space_before_decl_paren,
            ),
            space_after_comma: bool_option(
                options,
                keys::SPACE_AFTER_COMMA,
                defaults.space_after_comma,
            ),
            space_before_comma: bool_option(
                options,
                keys::SPACE_BEFORE_COMMA,
                defaults.space_before_comma,
            ),
            space_around_binary_op: bool_option(
                options,
                keys::SPACE_AROUND_BINARY_OP,
                defaults.space_around_binary_op,
            ),
            space_around_assign_op: bool_option(
                options,
                keys::SPACE_AROUND_ASSIGN_OP,
                defaults.space_around_assign_op,
            ),
            space_within_parens: bool_option(
                options,
                keys::SPACE_WITHIN_PARENS,
                defaults.space_within_parens,
            ),
            space_before_brace: bool_option(
                options,
                keys::SPACE_BEFORE_BRACE,
                defaults.space_before_brace,
            ),
            space_after_keyword: bool_option(
                options,
                keys::SPACE_AFTER_KEYWORD,
                defaults.space_after_keyword,
            ),
            space_after_semi_in_for: bool_option(
                options,
                keys::SPACE_AFTER_SEMI_IN_FOR,
                defaults.space_after_semi_in_for,
            ),
        }
    }
}

fn int_option(options: &FxHashMap<String, OptionValue>, key: &str, default: u32) -> u32 {
    match options.get(key) {
        Some(OptionValue::Int(v)) => *v,
        Some(other) => {
            debug!(key, ?other, "ignoring option with unexpected type");
            default
        }
        None => default,
    }
}

fn bool_option(options: &FxHashMap<String, OptionValue>, key: &str, default: bool) -> bool {
    match options.get(key) {
        Some(OptionValue::Bool(v)) => *v,
        Some(other) => {
            debug!(key, ?other, "ignoring option with unexpected type");
            default
        }
        None => default,
    }
}

fn placement_option(
    options: &FxHashMap<String, OptionValue>,
    key: &str,
    default: BracePlacement,
) -> BracePlacement {
    match options.get(key) {
        Some(OptionValue::Placement(v)) => *v,
        Some(other) => {
            debug!(key, ?other, "ignoring option with unexpected type");
            default
        }
        None => default,
    }
}

fn wrap_option(
    options: &FxHashMap<String, OptionValue>,
    key: &str,
    default: WrapStyle,
) -> WrapStyle {
    match options.get(key) {
        Some(OptionValue::Wrap(v)) => *v,
        Some(other) => {
            debug!(key, ?other, "ignoring option with unexpected type");
            default
        }
        None => default,
    }
}

fn blank_option(
    options: &FxHashMap<String, OptionValue>,
    min_key: &str,
    max_key: &str,
    default: BlankLines,
) -> BlankLines {
    BlankLines {
        min: int_option(options, min_key, default.min),
        max: int_option(options, max_key, default.max),
    }
}
