//! TypeScript source front end: tokens, syntax tree, parser.
pub mod ast;
pub mod lexer;
pub mod parser;

pub use parser::{SyntaxError, parse_module};

/// 1-based line and column of a byte offset.
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
    (line, column)
}
