//! Text edits.
//!
//! The formatter's output: an ordered, non-overlapping list of replacements
//! against the source snapshot the run was computed from. Applying edits to
//! any other text is invalid; offsets are only meaningful relative to that
//! snapshot.

use crate::Span;

/// A single replacement: the bytes at `span` are replaced with `text`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Edit {
    pub span: Span,
    pub text: String,
}

impl Edit {
    /// Create a new edit.
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Edit {
            span,
            text: text.into(),
        }
    }

    /// Byte-length delta this edit introduces.
    #[allow(clippy::cast_possible_wrap)]
    pub fn delta(&self) -> i64 {
        self.text.len() as i64 - i64::from(self.span.len())
    }
}

/// Apply a sorted, non-overlapping edit list to source text.
///
/// Edits are applied from the end of the document backwards so earlier
/// offsets stay valid while replacing.
pub fn apply_edits(source: &str, edits: &[Edit]) -> String {
    debug_assert!(
        edits.windows(2).all(|w| w[0].span.end <= w[1].span.start),
        "edit list must be sorted and non-overlapping"
    );

    let mut result = source.to_string();
    for edit in edits.iter().rev() {
        let range = edit.span.range();
        if range.end <= result.len() {
            result.replace_range(range, &edit.text);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn apply_single_edit() {
        let edits = vec![Edit::new(Span::new(0, 5), "goodbye")];
        assert_eq!(apply_edits("hello world", &edits), "goodbye world");
    }

    #[test]
    fn apply_multiple_edits_preserves_offsets() {
        let edits = vec![
            Edit::new(Span::new(0, 3), "XXX"),
            Edit::new(Span::new(8, 11), "ZZZZZ"),
        ];
        assert_eq!(apply_edits("aaa bbb ccc", &edits), "XXX bbb ZZZZZ");
    }

    #[test]
    fn apply_empty_list_is_identity() {
        assert_eq!(apply_edits("unchanged", &[]), "unchanged");
    }

    #[test]
    fn apply_insertion_at_empty_span() {
        let edits = vec![Edit::new(Span::new(5, 5), " there")];
        assert_eq!(apply_edits("hello world", &edits), "hello there world");
    }

    #[test]
    fn edit_delta_tracks_growth_and_shrink() {
        assert_eq!(Edit::new(Span::new(0, 2), "abcd").delta(), 2);
        assert_eq!(Edit::new(Span::new(0, 4), "").delta(), -4);
    }
}
