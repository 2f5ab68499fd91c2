//! Brio Syntax - Lexer and Parser
//!
//! Turns Brio template source into the token stream and construct tree the
//! editor tooling consumes. Brio documents are markup with host code
//! embedded between `<?brio` and `?>`.
//!
//! # Guarantees
//!
//! - **Lossless lexing**: concatenating the `text` of every token in lex
//!   order reproduces the source byte-for-byte. Whitespace and comments are
//!   tokens, not trivia.
//! - **Best-effort parsing**: [`parse`] never fails. Regions the parser
//!   cannot interpret become [`SyntaxKind::Error`] nodes covering their
//!   span, so downstream passes can preserve them untouched.
//!
//! [`SyntaxKind::Error`]: brio_ir::SyntaxKind::Error

mod lexer;
mod parser;

pub use lexer::lex;
pub use parser::parse;
