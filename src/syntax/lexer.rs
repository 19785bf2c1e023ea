//! Token stream for the TypeScript subset, built on logos.
//!
//! Keywords are not distinguished here: TypeScript keywords are mostly
//! contextual, so every word is an `Ident` and the parser compares text.

use logos::Logos;

use super::ast::Span;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"#?[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Str,
    #[regex(r"`([^`\\]|\\.)*`")]
    Template,
    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9]+)?n?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"0[xX][0-9a-fA-F_]+n?")]
    #[regex(r"0[bB][01_]+n?")]
    #[regex(r"0[oO][0-7_]+n?")]
    Number,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("...")]
    Ellipsis,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("=>")]
    Arrow,
    #[token("=")]
    Eq,
    #[token("@")]
    At,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token("!")]
    Bang,
    #[token("*")]
    Star,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[regex(r"[/%^~]")]
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Str,
    Template,
    Number,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Semi,
    Comma,
    Ellipsis,
    Dot,
    Colon,
    Question,
    Arrow,
    Eq,
    At,
    Pipe,
    Amp,
    Bang,
    Star,
    Minus,
    Plus,
    Operator,
    /// `/pattern/flags`, recognised only where an expression can start.
    Regex,
    /// A character no rule matched. Fatal only if the parser consumes it.
    Error,
    Eof,
}

/// Skip to the closing `*/`. An unterminated comment swallows the rest of
/// the input as an error token.
fn block_comment(lexer: &mut logos::Lexer<RawToken>) -> bool {
    match lexer.remainder().find("*/") {
        Some(end) => {
            lexer.bump(end + 2);
            true
        }
        None => {
            lexer.bump(lexer.remainder().len());
            false
        }
    }
}

/// Words after which `/` starts a regular expression rather than a division.
const REGEX_PREFIX_WORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do", "else",
    "yield", "await",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// A line break separates this token from the previous one.
    pub newline_before: bool,
}

/// Lex a source file. The returned list always ends with `Eof`.
pub fn lex(source: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut lexer = RawToken::lexer(source);
    let mut prev_end = 0usize;
    let mut pending_newline = false;

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let newline_before = pending_newline || source[prev_end..range.start].contains('\n');
        pending_newline = false;
        prev_end = range.end;

        let kind = match result {
            Ok(RawToken::LineComment) => {
                pending_newline = newline_before;
                continue;
            }
            Ok(RawToken::BlockComment) => {
                pending_newline = newline_before || lexer.slice().contains('\n');
                continue;
            }
            Ok(RawToken::Operator) if lexer.slice() == "/" && regex_allowed(source, out.last()) => {
                match regex_len(lexer.remainder()) {
                    Some(len) => {
                        lexer.bump(len);
                        prev_end = lexer.span().end;
                        TokenKind::Regex
                    }
                    None => TokenKind::Operator,
                }
            }
            Ok(raw) => convert(raw),
            Err(()) => TokenKind::Error,
        };
        out.push(Token { kind, span: Span::new(range.start, prev_end), newline_before });
    }

    out.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(source.len(), source.len()),
        newline_before: true,
    });
    out
}

/// A `/` can open a regex unless the previous token ends an operand.
fn regex_allowed(source: &str, prev: Option<&Token>) -> bool {
    let Some(prev) = prev else { return true };
    match prev.kind {
        TokenKind::Ident => REGEX_PREFIX_WORDS.contains(&&source[prev.span.start..prev.span.end]),
        TokenKind::Str
        | TokenKind::Template
        | TokenKind::Number
        | TokenKind::Regex
        | TokenKind::RParen
        | TokenKind::RBracket
        | TokenKind::RBrace => false,
        _ => true,
    }
}

/// Length of the regex body after the opening `/`, through the closing `/`
/// and any flags. `None` when the line ends first.
fn regex_len(rest: &str) -> Option<usize> {
    let mut in_class = false;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        match c {
            '\n' | '\r' => return None,
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => {
                if i == 0 {
                    return None;
                }
                let body = i + 1;
                let flags = rest[body..].find(|ch: char| !ch.is_ascii_alphabetic()).unwrap_or(rest.len() - body);
                return Some(body + flags);
            }
            _ => {}
        }
    }
    None
}

fn convert(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::Ident => TokenKind::Ident,
        RawToken::Str => TokenKind::Str,
        RawToken::Template => TokenKind::Template,
        RawToken::Number => TokenKind::Number,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Question => TokenKind::Question,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::Eq => TokenKind::Eq,
        RawToken::At => TokenKind::At,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Star => TokenKind::Star,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Operator => TokenKind::Operator,
        // comments never reach here
        RawToken::LineComment | RawToken::BlockComment => TokenKind::Error,
    }
}

/// Decode the body of a quoted string or template literal (quotes included).
pub fn unquote(raw: &str) -> String {
    let inner = if raw.len() >= 2 { &raw[1..raw.len() - 1] } else { raw };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('\n') => {}
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn comments_are_dropped_and_newlines_tracked() {
        let src = "a // one\n/* two\n */ b";
        let toks = lex(src);
        assert_eq!(toks.len(), 3);
        assert_eq!(&src[toks[0].span.start..toks[0].span.end], "a");
        assert!(!toks[0].newline_before);
        assert!(toks[1].newline_before);
        assert_eq!(toks[2].kind, TokenKind::Eof);
    }

    #[test]
    fn block_comments_with_stars() {
        assert_eq!(kinds("a /* x */ b"), vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Eof]);
        assert_eq!(kinds("/** doc **/ a /***/"), vec![TokenKind::Ident, TokenKind::Eof]);
        assert_eq!(kinds("a /* open"), vec![TokenKind::Ident, TokenKind::Error, TokenKind::Eof]);
    }

    #[test]
    fn regex_literals_where_expressions_start() {
        let src = "s.split(/[(]/g); return /\\{/.test(a / b)";
        let toks = lex(src);
        let text: Vec<(TokenKind, &str)> =
            toks.iter().map(|t| (t.kind, &src[t.span.start..t.span.end])).collect();
        assert_eq!(
            text,
            vec![
                (TokenKind::Ident, "s"),
                (TokenKind::Dot, "."),
                (TokenKind::Ident, "split"),
                (TokenKind::LParen, "("),
                (TokenKind::Regex, "/[(]/g"),
                (TokenKind::RParen, ")"),
                (TokenKind::Semi, ";"),
                (TokenKind::Ident, "return"),
                (TokenKind::Regex, "/\\{/"),
                (TokenKind::Dot, "."),
                (TokenKind::Ident, "test"),
                (TokenKind::LParen, "("),
                (TokenKind::Ident, "a"),
                (TokenKind::Operator, "/"),
                (TokenKind::Ident, "b"),
                (TokenKind::RParen, ")"),
                (TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn generic_closers_stay_separate() {
        assert_eq!(
            kinds("A<B<C>>"),
            vec![
                TokenKind::Ident,
                TokenKind::Lt,
                TokenKind::Ident,
                TokenKind::Lt,
                TokenKind::Ident,
                TokenKind::Gt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            kinds(r#"'a\'b' "c" `d` 1.5 0x1F => ..."#),
            vec![
                TokenKind::Str,
                TokenKind::Str,
                TokenKind::Template,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Arrow,
                TokenKind::Ellipsis,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unquote_escapes() {
        assert_eq!(unquote(r#"'it\'s'"#), "it's");
        assert_eq!(unquote(r#""a\nb""#), "a\nb");
        assert_eq!(unquote(r#""A\u{42}""#), "AB");
    }
}
