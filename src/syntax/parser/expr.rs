//! Expression grammar: just enough structure for decorator arguments and
//! `export const` initializers. Everything else collapses to `Expr::Other`.

use super::Parser;
use crate::syntax::SyntaxError;
use crate::syntax::ast::*;
use crate::syntax::lexer::{TokenKind, unquote};

impl<'src> Parser<'src> {
    pub(super) fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.peek().span.start;
        let expr = self.parse_unary()?;

        // casts are transparent to the literal
        while (self.at_word("as") || self.at_word("satisfies")) && !self.peek().newline_before {
            self.advance();
            if !self.eat_word("const") {
                self.parse_type()?;
            }
        }

        if self.at_expression_end() {
            return Ok(expr);
        }
        self.skip_initializer()?;
        Ok(Expr::Other(self.slice_from(start)))
    }

    fn at_expression_end(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Comma
                | TokenKind::Semi
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Eof
        ) || self.at_asi_boundary()
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        if self.match_token(TokenKind::Minus) {
            return Ok(Expr::Neg(Box::new(self.parse_unary()?)));
        }
        if self.check(TokenKind::Plus) && self.kind_at(1) == TokenKind::Number {
            self.advance();
        }
        self.parse_postfix_expr()
    }

    fn parse_postfix_expr(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.peek().span.start;
        let mut expr = self.parse_primary_expr()?;

        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.ident("expected property name after `.`")?;
                    expr = Expr::Member { object: Box::new(expr), property };
                }
                TokenKind::Question if self.kind_at(1) == TokenKind::Dot => {
                    self.advance();
                    self.advance();
                    if self.check(TokenKind::LParen) || self.check(TokenKind::LBracket) {
                        self.skip_group()?;
                    } else {
                        self.ident("expected property name after `?.`")?;
                    }
                    expr = Expr::Other(self.slice_from(start));
                }
                TokenKind::LParen => {
                    let args = self.parse_arguments()?;
                    expr = Expr::Call { callee: Box::new(expr), args };
                }
                TokenKind::LBracket if !self.peek().newline_before => {
                    self.skip_group()?;
                    expr = Expr::Other(self.slice_from(start));
                }
                // non-null assertion
                TokenKind::Bang if !self.peek().newline_before && self.kind_at(1) != TokenKind::Eq => {
                    self.advance();
                }
                TokenKind::Template if !self.peek().newline_before => {
                    self.advance();
                    expr = Expr::Other(self.slice_from(start));
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.peek().span.start;
        match self.peek().kind {
            TokenKind::Str => {
                let value = unquote(self.text());
                self.advance();
                Ok(Expr::Str(value))
            }
            TokenKind::Number => {
                let value = self.text().to_string();
                self.advance();
                Ok(Expr::Num(value))
            }
            TokenKind::Template => {
                let raw = self.text();
                let substitutions = raw.contains("${");
                let text = unquote(raw);
                self.advance();
                Ok(Expr::Template { text, substitutions })
            }
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::LBracket => {
                self.advance();
                let elements = self.parse_expr_list(TokenKind::RBracket)?;
                self.consume(TokenKind::RBracket, "expected `]` after array elements")?;
                Ok(Expr::Array(elements))
            }
            TokenKind::LParen => {
                let is_arrow = self
                    .matching_close(0)
                    .and_then(|idx| self.tokens.get(idx + 1))
                    .is_some_and(|tok| tok.kind == TokenKind::Arrow);
                if is_arrow {
                    self.skip_group()?;
                    self.skip_arrow_body()?;
                    return Ok(Expr::Other(self.slice_from(start)));
                }
                self.advance();
                let inner = self.parse_expr()?;
                self.consume(TokenKind::RParen, "expected `)`")?;
                Ok(inner)
            }
            TokenKind::Ident => self.parse_word_expr(start),
            TokenKind::Comma
            | TokenKind::Semi
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::Eof => Err(self.error("expected expression")),
            _ => {
                self.advance();
                self.skip_initializer()?;
                Ok(Expr::Other(self.slice_from(start)))
            }
        }
    }

    fn parse_word_expr(&mut self, start: usize) -> Result<Expr, SyntaxError> {
        match self.text() {
            "true" | "false" => {
                let value = self.at_word("true");
                self.advance();
                Ok(Expr::Bool(value))
            }
            "null" => {
                self.advance();
                Ok(Expr::Null)
            }
            "new" => {
                self.advance();
                let mut callee = Expr::Ident(self.ident("expected constructor after `new`")?);
                while self.match_token(TokenKind::Dot) {
                    let property = self.ident("expected name after `.`")?;
                    callee = Expr::Member { object: Box::new(callee), property };
                }
                if self.check(TokenKind::Lt) {
                    self.parse_type_args()?;
                }
                let args = if self.check(TokenKind::LParen) { self.parse_arguments()? } else { Vec::new() };
                Ok(Expr::New { callee: Box::new(callee), args })
            }
            "function" | "class" => {
                while !self.check(TokenKind::LBrace) {
                    if self.check(TokenKind::Eof) {
                        return Err(self.error("expected body"));
                    }
                    if self.check(TokenKind::LParen) || self.check(TokenKind::LBracket) {
                        self.skip_group()?;
                    } else {
                        self.advance();
                    }
                }
                self.skip_group()?;
                Ok(Expr::Other(self.slice_from(start)))
            }
            _ if self.kind_at(1) == TokenKind::Arrow => {
                self.advance();
                self.skip_arrow_body()?;
                Ok(Expr::Other(self.slice_from(start)))
            }
            "async" if matches!(self.kind_at(1), TokenKind::LParen | TokenKind::Ident) => {
                self.advance();
                self.skip_initializer()?;
                Ok(Expr::Other(self.slice_from(start)))
            }
            _ => {
                let name = self.text().to_string();
                self.advance();
                Ok(Expr::Ident(name))
            }
        }
    }

    fn skip_arrow_body(&mut self) -> Result<(), SyntaxError> {
        if self.match_token(TokenKind::Colon) {
            self.parse_type()?;
        }
        self.consume(TokenKind::Arrow, "expected `=>`")?;
        if self.check(TokenKind::LBrace) { self.skip_group() } else { self.skip_initializer() }
    }

    pub(super) fn parse_arguments(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        self.consume(TokenKind::LParen, "expected `(`")?;
        let args = self.parse_expr_list(TokenKind::RParen)?;
        self.consume(TokenKind::RParen, "expected `)` after arguments")?;
        Ok(args)
    }

    /// Comma-separated expressions up to (not including) `close`.
    fn parse_expr_list(&mut self, close: TokenKind) -> Result<Vec<Expr>, SyntaxError> {
        let mut out = Vec::new();
        while !self.check(close) {
            let start = self.peek().span.start;
            if self.check(TokenKind::Comma) {
                // array hole
                self.advance();
                out.push(Expr::Other(String::new()));
                continue;
            }
            if self.match_token(TokenKind::Ellipsis) {
                self.parse_expr()?;
                out.push(Expr::Other(self.slice_from(start)));
            } else {
                out.push(self.parse_expr()?);
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(out)
    }

    fn parse_object_literal(&mut self) -> Result<Expr, SyntaxError> {
        self.consume(TokenKind::LBrace, "expected `{`")?;
        let mut members = Vec::new();

        while !self.check(TokenKind::RBrace) {
            let start = self.peek().span.start;

            if self.match_token(TokenKind::Ellipsis) {
                self.parse_expr()?;
                members.push(ObjectMember::Other(self.slice_from(start)));
            } else {
                let prefixed = (self.at_word("get") || self.at_word("set") || self.at_word("async"))
                    && self.is_name_start_at(1);
                if prefixed {
                    self.advance();
                }
                self.match_token(TokenKind::Star);

                let (key, computed) = match self.peek().kind {
                    TokenKind::Ident | TokenKind::Number => (self.text().to_string(), false),
                    TokenKind::Str => (unquote(self.text()), false),
                    TokenKind::LBracket => (String::new(), true),
                    _ => return Err(self.error("expected property name")),
                };
                let shorthand_ok = self.check(TokenKind::Ident);
                if computed {
                    self.skip_group()?;
                } else {
                    self.advance();
                }

                if self.check(TokenKind::LParen) || self.check(TokenKind::Lt) {
                    self.parse_type_params()?;
                    self.parse_params()?;
                    if self.match_token(TokenKind::Colon) {
                        self.parse_return_type()?;
                    }
                    self.skip_body()?;
                    members.push(ObjectMember::Other(self.slice_from(start)));
                } else if self.match_token(TokenKind::Colon) {
                    let value = self.parse_expr()?;
                    if computed || prefixed {
                        members.push(ObjectMember::Other(self.slice_from(start)));
                    } else {
                        members.push(ObjectMember::Property { key, value });
                    }
                } else if shorthand_ok && (self.check(TokenKind::Comma) || self.check(TokenKind::RBrace)) {
                    members.push(ObjectMember::Shorthand(key));
                } else if self.match_token(TokenKind::Eq) {
                    self.skip_initializer()?;
                    members.push(ObjectMember::Other(self.slice_from(start)));
                } else {
                    return Err(self.error("expected `:` in object literal"));
                }
            }

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.consume(TokenKind::RBrace, "expected `}` to close object literal")?;
        Ok(Expr::Object(members))
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::ast::*;
    use crate::syntax::parse_module;

    fn init(src: &str) -> Expr {
        let module = parse_module(src).expect("parses");
        match module.items.into_iter().next() {
            Some(Item::Variable(mut v)) => v.declarations.remove(0).initializer.expect("initializer"),
            other => panic!("expected variable, got {other:?}"),
        }
    }

    #[test]
    fn object_literal_members() {
        let Expr::Object(members) = init(
            "const x = { a: 1, 'b-c': 'two', d, ...rest, [k]: 3, m() { return 1 }, e: [1, -2], f: -x };",
        ) else {
            panic!("expected object")
        };
        assert_eq!(members.len(), 8);
        assert!(matches!(&members[0], ObjectMember::Property { key, value: Expr::Num(n) } if key == "a" && n == "1"));
        assert!(matches!(&members[1], ObjectMember::Property { key, .. } if key == "b-c"));
        assert!(matches!(&members[2], ObjectMember::Shorthand(k) if k == "d"));
        assert!(matches!(&members[3], ObjectMember::Other(t) if t == "...rest"));
        assert!(matches!(&members[4], ObjectMember::Other(_)));
        assert!(matches!(&members[5], ObjectMember::Other(_)));
        let ObjectMember::Property { value: Expr::Array(items), .. } = &members[6] else {
            panic!("expected array")
        };
        assert!(matches!(&items[1], Expr::Neg(inner) if matches!(**inner, Expr::Num(_))));
    }

    #[test]
    fn casts_are_transparent() {
        assert!(matches!(init("const x = { a: 1 } as const;"), Expr::Object(_)));
        assert!(matches!(init("const x = 'a' satisfies string;"), Expr::Str(_)));
    }

    #[test]
    fn unmodelled_expressions_become_other() {
        let Expr::Other(text) = init("const x = a ? b : c;") else { panic!("expected other") };
        assert_eq!(text, "a ? b : c");
        assert!(matches!(init("const f = (a: number) => { return a; };"), Expr::Other(_)));
        assert!(matches!(init("const g = async () => 1\nexport const y = 2;"), Expr::Other(_)));
    }

    #[test]
    fn templates_and_member_chains() {
        assert!(matches!(init("const t = `plain`;"), Expr::Template { substitutions: false, .. }));
        assert!(matches!(init("const t = `a${b}`;"), Expr::Template { substitutions: true, .. }));
        let Expr::Member { object, property } = init("export const handler = new Fn().handler") else {
            panic!("expected member")
        };
        assert_eq!(property, "handler");
        assert!(matches!(*object, Expr::New { .. }));
    }
}
