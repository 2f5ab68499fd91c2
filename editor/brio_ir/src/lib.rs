//! Brio IR - Shared Data Model
//!
//! This crate contains the core data structures shared by the Brio editor
//! tooling:
//! - Spans for source locations
//! - Tokens and language-segment tags for lexer output
//! - Syntax tree nodes for parser output
//! - Edits for formatter output
//!
//! # Design Philosophy
//!
//! - **Tokens are lossless**: every token carries its original text, and the
//!   concatenation of all token texts reproduces the source byte-for-byte.
//!   The formatting engine relies on this to keep its edits aligned.
//! - **Closed enums**: token kinds and syntax kinds are closed tagged sets
//!   so downstream dispatch tables can be matched exhaustively.
//! - **Read-only inputs**: tokens and syntax nodes are never mutated after
//!   construction; consumers only observe them.

mod edit;
mod span;
mod syntax;
mod token;

pub use edit::{apply_edits, Edit};
pub use span::Span;
pub use syntax::{SyntaxKind, SyntaxNode};
pub use token::{Language, Token, TokenKind};
