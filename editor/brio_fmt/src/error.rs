//! Engine errors.
//!
//! Both variants indicate an internal-consistency defect, not bad input: a
//! failed run returns no edits, so the document is left untouched.

use thiserror::Error;

/// Fatal conditions detected during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A verbatim format token no longer matches the source snapshot at its
    /// claimed offset. Applying edits past this point would corrupt
    /// unrelated text, so the run aborts instead of re-synchronizing.
    #[error("verbatim token at offset {offset} does not match source: expected {expected:?}, found {found:?}")]
    AlignmentViolation {
        offset: u32,
        expected: String,
        found: String,
    },

    /// An indent pop arrived with an empty indent stack, meaning the
    /// annotation pass violated its push/pop discipline.
    #[error("indent stack underflow at offset {offset}")]
    IndentUnderflow { offset: u32 },
}
