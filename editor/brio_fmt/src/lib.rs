//! Brio Formatter
//!
//! Whitespace formatting engine for Brio template documents.
//!
//! # Architecture
//!
//! The engine runs two passes over an immutable source snapshot:
//!
//! 1. **Annotation**: a tree-ordered walk flattens the token stream into
//!    format tokens: the significant tokens verbatim, a whitespace directive
//!    for every gap between them, and indent push/pop frames at block and
//!    continuation boundaries.
//! 2. **Reconciliation**: a single sweep realizes each directive against the
//!    style configuration and emits a text edit only where the realized
//!    whitespace differs from what the author wrote.
//!
//! Core principle: the engine never rebuilds the document. Everything that
//! is not whitespace between host-code tokens passes through untouched,
//! markup included, and an already formatted document produces zero edits.
//!
//! # Modules
//!
//! - [`token`]: the format-token model shared by both passes
//! - [`annotate`]: annotation pass and the declarative spacing rules
//! - [`reconcile`]: reconciliation pass producing edits and caret positions
//! - [`style`]: configuration resolved from editor preferences
//! - [`error`]: fatal internal-consistency errors

pub mod annotate;
pub mod error;
pub mod reconcile;
pub mod style;
pub mod token;

pub use annotate::annotate;
pub use error::FormatError;
pub use reconcile::{reconcile, FormatOutput, ResolvedCaret};
pub use style::{BlankLines, BracePlacement, OptionValue, StyleConfig, WrapStyle};
pub use token::{FormatToken, SpaceRequest};

use std::ops::Range;

use brio_ir::{SyntaxNode, Token};

/// One formatting run over a source snapshot.
///
/// `tokens` and `tree` must have been produced from exactly this `source`;
/// the engine verifies that as it goes and aborts on any mismatch.
#[derive(Clone, Debug)]
pub struct FormatRequest<'a> {
    pub source: &'a str,
    pub tokens: &'a [Token],
    pub tree: &'a SyntaxNode,
    pub style: &'a StyleConfig,
    /// Byte range to format; widened outward to token boundaries. Use
    /// `0..source.len()` for the whole document.
    pub range: Range<usize>,
    /// Caret offsets to carry through formatting.
    pub carets: &'a [u32],
}

/// Format a document: annotate, then reconcile.
///
/// On error no edits are returned and the document must be left untouched.
pub fn format(req: &FormatRequest<'_>) -> Result<FormatOutput, FormatError> {
    let list = annotate::annotate(req.source, req.tokens, req.tree, req.style, req.carets);
    reconcile::reconcile(req.source, &list, req.style, req.range.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brio_ir::apply_edits;
    use brio_syntax::{lex, parse};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn run(
        source: &str,
        style: &StyleConfig,
        range: Range<usize>,
        carets: &[u32],
    ) -> Result<FormatOutput, FormatError> {
        let tokens = lex(source);
        let tree = parse(&tokens);
        format(&FormatRequest {
            source,
            tokens: &tokens,
            tree: &tree,
            style,
            range,
            carets,
        })
    }

    fn formatted(source: &str, style: &StyleConfig) -> Result<String, FormatError> {
        let out = run(source, style, 0..source.len(), &[])?;
        Ok(apply_edits(source, &out.edits))
    }

    #[test]
    fn formats_compact_if_statement() {
        assert_eq!(
            formatted("<?brio if($x){y();}", &StyleConfig::default()),
            Ok("<?brio if ($x) {\n    y();\n}".to_string())
        );
    }

    #[test]
    fn formatting_is_idempotent() {
        let style = StyleConfig::default();
        let once = formatted("<?brio if($x){y();}", &style);
        let Ok(once) = once else {
            assert_eq!(once, Ok(String::new()));
            return;
        };
        let twice = run(&once, &style, 0..once.len(), &[]).map(|o| o.edits);
        assert_eq!(twice, Ok(vec![]));
    }

    #[test]
    fn formatting_is_deterministic() {
        let source = "<?brio function f($a,$b) { return $a+$b; }";
        let a = run(source, &StyleConfig::default(), 0..source.len(), &[]);
        let b = run(source, &StyleConfig::default(), 0..source.len(), &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn collapses_blank_lines_to_maximum() {
        assert_eq!(
            formatted("<?brio $a = 1;\n\n\n\n$b = 2;", &StyleConfig::default()),
            Ok("<?brio $a = 1;\n\n$b = 2;".to_string())
        );
    }

    #[test]
    fn expands_blank_lines_between_functions() {
        assert_eq!(
            formatted(
                "<?brio function a() {}\nfunction b() {}",
                &StyleConfig::default()
            ),
            Ok("<?brio function a() {}\n\nfunction b() {}".to_string())
        );
    }

    #[test]
    fn markup_passes_through_untouched() {
        let source = "<div><?brio echo $x; ?></div>";
        let out = run(source, &StyleConfig::default(), 0..source.len(), &[]);
        assert_eq!(out.map(|o| o.edits), Ok(vec![]));
    }

    #[test]
    fn markup_layout_survives_formatting_around_it() {
        let source = "<ul>\n  <li><?brio echo   $x; ?></li>\n</ul>";
        assert_eq!(
            formatted(source, &StyleConfig::default()),
            Ok("<ul>\n  <li><?brio echo $x; ?></li>\n</ul>".to_string())
        );
    }

    #[test]
    fn range_formatting_leaves_the_rest_alone() {
        let source = "<?brio if($x){y();}\nif($y){z();}";
        // Format only the second statement.
        let out = run(source, &StyleConfig::default(), 20..source.len(), &[]);
        let Ok(out) = out else {
            assert_eq!(out.map(|o| o.edits), Ok(vec![]));
            return;
        };
        assert!(out.edits.iter().all(|e| e.span.start >= 20));
        assert_eq!(
            apply_edits(source, &out.edits),
            "<?brio if($x){y();}\nif ($y) {\n    z();\n}"
        );
    }

    #[test]
    fn selection_inside_formatted_block_touches_only_the_selection() {
        let source = "<?brio if ($x) {\n    y( );\n}";
        // Select exactly `y( );`.
        let out = run(source, &StyleConfig::default(), 21..26, &[]);
        assert_eq!(
            out.map(|o| o.edits),
            Ok(vec![brio_ir::Edit::new(brio_ir::Span::new(23, 24), "")])
        );
    }

    #[test]
    fn nested_blocks_indent_additively() {
        assert_eq!(
            formatted(
                "<?brio if ($a) { while ($b) { f(); } }",
                &StyleConfig::default()
            ),
            Ok("<?brio if ($a) {\n    while ($b) {\n        f();\n    }\n}".to_string())
        );
    }

    #[test]
    fn next_line_braces() {
        let style = StyleConfig {
            control_brace: BracePlacement::NextLine,
            ..StyleConfig::default()
        };
        assert_eq!(
            formatted("<?brio if ($x) { y(); }", &style),
            Ok("<?brio if ($x)\n{\n    y();\n}".to_string())
        );
    }

    #[test]
    fn else_moves_to_its_own_line_with_next_line_braces() {
        let style = StyleConfig {
            control_brace: BracePlacement::NextLine,
            ..StyleConfig::default()
        };
        assert_eq!(
            formatted("<?brio if ($x) { y(); } else { z(); }", &style),
            Ok("<?brio if ($x)\n{\n    y();\n}\nelse\n{\n    z();\n}".to_string())
        );
    }

    #[test]
    fn else_stays_on_brace_line_by_default() {
        assert_eq!(
            formatted("<?brio if ($x) { y(); }\nelse { z(); }", &StyleConfig::default()),
            Ok("<?brio if ($x) {\n    y();\n} else {\n    z();\n}".to_string())
        );
    }

    #[test]
    fn wrap_always_puts_each_argument_on_its_own_line() {
        let style = StyleConfig {
            wrap_arguments: WrapStyle::Always,
            ..StyleConfig::default()
        };
        assert_eq!(
            formatted("<?brio render($a, $b);", &style),
            Ok("<?brio render(\n        $a,\n        $b\n);".to_string())
        );
    }

    #[test]
    fn wrap_if_long_keeps_single_line_calls_inline() {
        assert_eq!(
            formatted("<?brio render($a, $b);", &StyleConfig::default()),
            Ok("<?brio render($a, $b);".to_string())
        );
    }

    #[test]
    fn wrap_if_long_wraps_calls_the_author_broke() {
        assert_eq!(
            formatted("<?brio render($a,\n$b);", &StyleConfig::default()),
            Ok("<?brio render(\n        $a,\n        $b\n);".to_string())
        );
    }

    #[test]
    fn wrap_if_long_ignores_newlines_inside_string_arguments() {
        // The break lives in a string literal, not between arguments.
        let source = "<?brio render(\"a\nb\", $x);";
        assert_eq!(
            formatted(source, &StyleConfig::default()),
            Ok(source.to_string())
        );
    }

    #[test]
    fn caret_tracks_through_shrinking_gap() {
        let source = "<?brio echo   $x;";
        let caret = 14; // start of `$x`
        let out = run(source, &StyleConfig::default(), 0..source.len(), &[caret]);
        assert_eq!(
            out.map(|o| o.carets),
            Ok(vec![ResolvedCaret {
                original: 14,
                resolved: 12,
            }])
        );
    }

    #[test]
    fn caret_inside_a_rewritten_gap_lands_at_the_write_cursor() {
        let source = "<?brio echo   $x;";
        let caret = 13; // inside the triple space
        let out = run(source, &StyleConfig::default(), 0..source.len(), &[caret]);
        // The gap collapses to one space ending at offset 12; the caret
        // follows the write cursor instead of landing inside the old gap.
        assert_eq!(
            out.map(|o| o.carets),
            Ok(vec![ResolvedCaret {
                original: 13,
                resolved: 12,
            }])
        );
    }

    #[test]
    fn stale_snapshot_is_an_alignment_violation() {
        // Annotate one snapshot, reconcile against a different one.
        let old = "<?brio echo $x;";
        let new = "<?brio echo $y;";
        let tokens = lex(old);
        let tree = parse(&tokens);
        let style = StyleConfig::default();
        let list = annotate(old, &tokens, &tree, &style, &[]);
        let out = reconcile(new, &list, &style, 0..new.len());
        assert_eq!(
            out,
            Err(FormatError::AlignmentViolation {
                offset: 12,
                expected: "$x".to_string(),
                found: "$y".to_string(),
            })
        );
    }

    #[test]
    fn unparseable_region_passes_through() {
        let source = "<?brio ) )   ;\necho   $x;";
        assert_eq!(
            formatted(source, &StyleConfig::default()),
            Ok("<?brio ) )   ;\necho $x;".to_string())
        );
    }

    #[test]
    fn line_comment_keeps_following_token_off_its_line() {
        let source = "<?brio if ($x) // guard\n{ y(); }";
        let out = run(source, &StyleConfig::default(), 0..source.len(), &[]);
        let Ok(out) = out else {
            assert_eq!(out.map(|o| o.edits), Ok(vec![]));
            return;
        };
        let result = apply_edits(source, &out.edits);
        // The brace must not be pulled up onto the comment line.
        assert!(result.contains("// guard\n"));
    }

    #[test]
    fn initial_indent_applies_to_every_emitted_line() {
        let style = StyleConfig {
            initial_indent: 4,
            ..StyleConfig::default()
        };
        assert_eq!(
            formatted("<?brio if($x){y();}", &style),
            Ok("<?brio if ($x) {\n        y();\n    }".to_string())
        );
    }

    #[test]
    fn empty_output_for_empty_input() {
        let out = run("", &StyleConfig::default(), 0..0, &[]);
        assert_eq!(out, Ok(FormatOutput::default()));
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    fn arb_statement() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("$a = 1;"),
            Just("echo $x;"),
            Just("if ($x) { y(); }"),
            Just("while ($b) { $b = $b - 1; }"),
            Just("render($a, $b);"),
            Just("function f() { return 1; }"),
        ]
    }

    fn arb_separator() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just(" "), Just("\n"), Just("\n\n"), Just("\n\n\n\n"), Just("\t")]
    }

    fn arb_source() -> impl Strategy<Value = String> {
        (
            proptest::collection::vec((arb_statement(), arb_separator()), 1..5),
            arb_separator(),
        )
            .prop_map(|(stmts, lead)| {
                let mut source = String::from("<?brio");
                source.push_str(lead);
                for (stmt, sep) in stmts {
                    source.push_str(stmt);
                    source.push_str(sep);
                }
                source
            })
    }

    proptest! {
        /// Formatting never fails on parseable input and applying the edits
        /// yields a fixed point: a second run produces no edits.
        #[test]
        fn formatting_reaches_a_fixed_point(source in arb_source()) {
            let style = StyleConfig::default();
            let once = formatted(&source, &style);
            prop_assert!(once.is_ok());
            let once = once.unwrap_or_default();
            let again = run(&once, &style, 0..once.len(), &[]).map(|o| o.edits);
            prop_assert_eq!(again, Ok(vec![]));
        }

        /// Edits never overlap and stay sorted, as the editor requires.
        #[test]
        fn edits_are_sorted_and_disjoint(source in arb_source()) {
            let out = run(&source, &StyleConfig::default(), 0..source.len(), &[]);
            prop_assert!(out.is_ok());
            let edits = out.map(|o| o.edits).unwrap_or_default();
            for pair in edits.windows(2) {
                prop_assert!(pair[0].span.end <= pair[1].span.start);
            }
        }

        /// Everything that is not whitespace survives formatting.
        #[test]
        fn significant_text_is_never_changed(source in arb_source()) {
            let style = StyleConfig::default();
            let result = formatted(&source, &style);
            prop_assert!(result.is_ok());
            let result = result.unwrap_or_default();
            let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
            prop_assert_eq!(strip(&source), strip(&result));
        }
    }
}
