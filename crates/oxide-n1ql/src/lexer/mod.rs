//! N1QL Lexer
//!
//! A hand-written scanner plus the namespace-aware adapter the parser pulls
//! tokens from.

mod adapter;
mod span;
mod token;
mod tokenizer;

pub use adapter::{TokenSource, TokenStream};
pub use span::{Position, Span};
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
