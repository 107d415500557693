//! Parser module for toysh scripts
//!
//! Scripts are not parsed into a tree; the interpreter walks the lexer's
//! token stream directly.

pub mod lexer;

// Re-exports
pub use lexer::{is_keyword, is_operator, tokenize, Lexer, Token, TokenKind};
