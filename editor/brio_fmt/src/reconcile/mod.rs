//! Reconciliation pass.
//!
//! Consumes the format-token list in one left-to-right sweep, maintaining
//! the indent stack, and turns every whitespace directive whose realized
//! text differs from the original into a text edit. Verbatim tokens are
//! checked against the source snapshot as the sweep passes them; a mismatch
//! aborts the run with no edits rather than risking corruption.
//!
//! Only directives whose gap lies entirely inside the requested range
//! produce edits. Out-of-range directives are still swept so the indent
//! stack stays correct for the in-range portion.

use std::ops::Range;

use brio_ir::Edit;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::FormatError;
use crate::style::StyleConfig;
use crate::token::{FormatToken, IndentChange, IndentKind, SpaceRequest};

/// Result of a formatting run: edits against the source snapshot, and the
/// post-edit position of each tracked caret.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct FormatOutput {
    /// Sorted, non-overlapping replacements.
    pub edits: Vec<Edit>,
    /// One entry per tracked caret, in input order.
    pub carets: Vec<ResolvedCaret>,
}

/// A caret position carried through formatting.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ResolvedCaret {
    /// Offset in the source snapshot.
    pub original: u32,
    /// Offset in the document after all edits are applied.
    pub resolved: u32,
}

/// Realize whitespace directives into edits.
///
/// `range` bounds the region being formatted; it is widened outward to
/// token boundaries before filtering.
pub fn reconcile(
    source: &str,
    list: &[FormatToken],
    style: &StyleConfig,
    range: Range<usize>,
) -> Result<FormatOutput, FormatError> {
    let (start, end) = widen_range(list, range);
    let mut stack: SmallVec<[u32; 16]> = SmallVec::new();
    let mut edits = Vec::new();
    let mut carets = Vec::new();
    let mut delta: i64 = 0;
    // Post-edit end offset of the most recently rewritten gap.
    let mut rewrite_end: u32 = 0;

    for tok in list {
        match tok {
            FormatToken::Verbatim(v) => {
                let found = source.get(v.span.range()).unwrap_or("");
                if found != v.text {
                    return Err(FormatError::AlignmentViolation {
                        offset: v.span.start,
                        expected: v.text.clone(),
                        found: found.to_string(),
                    });
                }
            }
            FormatToken::Indent(d) => match d.change {
                IndentChange::Push => stack.push(frame_width(d.kind, style)),
                IndentChange::Pop => {
                    if stack.pop().is_none() {
                        return Err(FormatError::IndentUnderflow { offset: d.offset });
                    }
                }
            },
            FormatToken::Whitespace(w) => {
                if w.request == SpaceRequest::Preserve {
                    continue;
                }
                let new_text = realize(w.request, indent_width(&stack, style), style);
                if new_text != w.old_text && w.span.start >= start && w.span.end <= end {
                    let edit = Edit::new(w.span, new_text);
                    delta += edit.delta();
                    rewrite_end = offset_after(w.span.end, delta);
                    edits.push(edit);
                }
            }
            FormatToken::Placeholder(p) => {
                // A caret inside a rewritten gap lands after the replacement
                // text, never inside it.
                carets.push(ResolvedCaret {
                    original: p.offset,
                    resolved: offset_after(p.offset, delta).max(rewrite_end),
                });
            }
        }
    }

    if !stack.is_empty() {
        debug!(depth = stack.len(), "indent stack not empty after sweep");
    }
    Ok(FormatOutput { edits, carets })
}

/// Widen a byte range outward so it never splits a verbatim token.
fn widen_range(list: &[FormatToken], range: Range<usize>) -> (u32, u32) {
    let mut start = u32::try_from(range.start).unwrap_or(u32::MAX);
    let mut end = u32::try_from(range.end).unwrap_or(u32::MAX);
    for tok in list {
        if let FormatToken::Verbatim(v) = tok {
            if v.span.start < start && start < v.span.end {
                start = v.span.start;
            }
            if v.span.start < end && end < v.span.end {
                end = v.span.end;
            }
        }
    }
    (start, end)
}

/// Column width one indent frame contributes.
fn frame_width(kind: IndentKind, style: &StyleConfig) -> u32 {
    match kind {
        IndentKind::Block => style.indent_size,
        IndentKind::Continuation => style.continuation_indent_size,
    }
}

/// Total indentation at the current stack depth, in columns.
fn indent_width(stack: &[u32], style: &StyleConfig) -> u32 {
    style.initial_indent + stack.iter().sum::<u32>()
}

/// Turn a request into literal whitespace text.
fn realize(request: SpaceRequest, indent: u32, style: &StyleConfig) -> String {
    match request {
        SpaceRequest::None => String::new(),
        SpaceRequest::Space => " ".to_string(),
        SpaceRequest::Blank { lines } => {
            let mut text = "\n".repeat(lines as usize + 1);
            text.push_str(&indentation(indent, style));
            text
        }
        // Filtered out by the caller; harmless identity if it gets here.
        SpaceRequest::Preserve => String::new(),
    }
}

/// Render `width` columns of indentation as spaces or tabs.
fn indentation(width: u32, style: &StyleConfig) -> String {
    if style.expand_tabs || style.tab_size == 0 {
        " ".repeat(width as usize)
    } else {
        let tabs = (width / style.tab_size) as usize;
        let spaces = (width % style.tab_size) as usize;
        let mut text = "\t".repeat(tabs);
        text.push_str(&" ".repeat(spaces));
        text
    }
}

/// Shift a snapshot offset by the accumulated edit delta.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn offset_after(offset: u32, delta: i64) -> u32 {
    let shifted = i64::from(offset) + delta;
    if shifted < 0 {
        0
    } else {
        shifted as u32
    }
}
