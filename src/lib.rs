//! cflat: the semantic analysis pass of a small C-like language, plus the
//! lexer/parser/interner infrastructure needed to feed it a real program.
//!
//! The checker (`checking`) is the part worth reading closely: name
//! resolution, type rules and control-flow validation over an AST built by
//! the rest of this crate.

pub mod checking;
pub mod diagnostics;
pub mod intern;
pub mod lexing;
pub mod parsing;
pub mod stream;
