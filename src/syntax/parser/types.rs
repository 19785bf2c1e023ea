//! Type annotation grammar.

use super::Parser;
use crate::syntax::ast::*;
use crate::syntax::lexer::{TokenKind, unquote};
use crate::syntax::SyntaxError;

impl<'src> Parser<'src> {
    pub(super) fn parse_type(&mut self) -> Result<TypeNode, SyntaxError> {
        let start = self.peek().span.start;

        if self.check(TokenKind::Lt) || (self.check(TokenKind::LParen) && self.is_function_type_start()) {
            return self.parse_function_type(start, OpaqueKind::Function);
        }
        if self.at_word("new") || (self.at_word("abstract") && self.at_word_at(1, "new")) {
            self.eat_word("abstract");
            self.advance();
            return self.parse_function_type(start, OpaqueKind::Constructor);
        }

        let ty = self.parse_union_type()?;

        if self.at_word("extends") {
            self.advance();
            self.parse_union_type()?;
            self.consume(TokenKind::Question, "expected `?` in conditional type")?;
            self.parse_type()?;
            self.consume(TokenKind::Colon, "expected `:` in conditional type")?;
            self.parse_type()?;
            return Ok(TypeNode::Opaque { kind: OpaqueKind::Conditional, text: self.slice_from(start) });
        }
        Ok(ty)
    }

    /// `(` whose matching `)` is followed by `=>`.
    fn is_function_type_start(&self) -> bool {
        self.matching_close(0)
            .and_then(|idx| self.tokens.get(idx + 1))
            .is_some_and(|tok| tok.kind == TokenKind::Arrow)
    }

    fn parse_function_type(&mut self, start: usize, kind: OpaqueKind) -> Result<TypeNode, SyntaxError> {
        self.parse_type_params()?;
        self.parse_params()?;
        self.consume(TokenKind::Arrow, "expected `=>` in function type")?;
        self.parse_return_type()?;
        Ok(TypeNode::Opaque { kind, text: self.slice_from(start) })
    }

    /// Return annotation, including `x is T` and `asserts x is T` predicates.
    pub(super) fn parse_return_type(&mut self) -> Result<TypeNode, SyntaxError> {
        let start = self.peek().span.start;
        if self.at_word("asserts") && self.kind_at(1) == TokenKind::Ident {
            self.advance();
            self.advance();
            if self.eat_word("is") {
                self.parse_type()?;
            }
            return Ok(TypeNode::Opaque { kind: OpaqueKind::Predicate, text: self.slice_from(start) });
        }
        if self.kind_at(0) == TokenKind::Ident && self.at_word_at(1, "is") {
            self.advance();
            self.advance();
            self.parse_type()?;
            return Ok(TypeNode::Opaque { kind: OpaqueKind::Predicate, text: self.slice_from(start) });
        }
        self.parse_type()
    }

    fn parse_union_type(&mut self) -> Result<TypeNode, SyntaxError> {
        self.match_token(TokenKind::Pipe);
        let first = self.parse_intersection_type()?;
        if !self.check(TokenKind::Pipe) {
            return Ok(first);
        }
        let mut arms = vec![first];
        while self.match_token(TokenKind::Pipe) {
            arms.push(self.parse_intersection_type()?);
        }
        Ok(TypeNode::Union(arms))
    }

    fn parse_intersection_type(&mut self) -> Result<TypeNode, SyntaxError> {
        self.match_token(TokenKind::Amp);
        let first = self.parse_postfix_type()?;
        if !self.check(TokenKind::Amp) {
            return Ok(first);
        }
        let mut parts = vec![first];
        while self.match_token(TokenKind::Amp) {
            parts.push(self.parse_postfix_type()?);
        }
        Ok(TypeNode::Intersection(parts))
    }

    fn parse_postfix_type(&mut self) -> Result<TypeNode, SyntaxError> {
        let start = self.peek().span.start;

        if (self.at_word("keyof") || self.at_word("unique") || self.at_word("readonly"))
            && !matches!(
                self.kind_at(1),
                TokenKind::Comma | TokenKind::RParen | TokenKind::Gt | TokenKind::Semi | TokenKind::Eq
            )
        {
            let readonly = self.at_word("readonly");
            self.advance();
            let inner = self.parse_postfix_type()?;
            // `readonly T[]` is still an array of T for rendering
            if readonly && matches!(inner, TypeNode::Array(_) | TypeNode::Tuple(_)) {
                return Ok(inner);
            }
            return Ok(TypeNode::Opaque { kind: OpaqueKind::Operator, text: self.slice_from(start) });
        }
        if self.at_word("infer") && self.kind_at(1) == TokenKind::Ident {
            self.advance();
            self.advance();
            return Ok(TypeNode::Opaque { kind: OpaqueKind::Infer, text: self.slice_from(start) });
        }

        let mut ty = self.parse_primary_type()?;
        while self.check(TokenKind::LBracket) && !self.peek().newline_before {
            if self.kind_at(1) == TokenKind::RBracket {
                self.advance();
                self.advance();
                ty = TypeNode::Array(Box::new(ty));
            } else {
                self.advance();
                self.parse_type()?;
                self.consume(TokenKind::RBracket, "expected `]` in indexed access type")?;
                ty = TypeNode::Opaque { kind: OpaqueKind::IndexedAccess, text: self.slice_from(start) };
            }
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> Result<TypeNode, SyntaxError> {
        let start = self.peek().span.start;
        match self.peek().kind {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.consume(TokenKind::RParen, "expected `)`")?;
                Ok(TypeNode::Parenthesized(Box::new(inner)))
            }
            TokenKind::LBrace => {
                if self.at_mapped_type() {
                    self.skip_group()?;
                    return Ok(TypeNode::Opaque { kind: OpaqueKind::Mapped, text: self.slice_from(start) });
                }
                Ok(TypeNode::Shape(self.parse_type_members()?))
            }
            TokenKind::LBracket => self.parse_tuple_type(),
            TokenKind::Str => {
                let value = unquote(self.text());
                self.advance();
                Ok(TypeNode::Literal(LiteralType::Str(value)))
            }
            TokenKind::Template => {
                self.advance();
                Ok(TypeNode::Opaque { kind: OpaqueKind::TemplateLiteral, text: self.slice_from(start) })
            }
            TokenKind::Number => {
                let value = self.text().to_string();
                self.advance();
                Ok(TypeNode::Literal(LiteralType::Num(value)))
            }
            TokenKind::Minus if self.kind_at(1) == TokenKind::Number => {
                self.advance();
                let value = format!("-{}", self.text());
                self.advance();
                Ok(TypeNode::Literal(LiteralType::Num(value)))
            }
            TokenKind::Ident => self.parse_named_type(start),
            _ => Err(self.error("expected type")),
        }
    }

    fn parse_named_type(&mut self, start: usize) -> Result<TypeNode, SyntaxError> {
        match self.text() {
            "true" | "false" => {
                let value = self.at_word("true");
                self.advance();
                return Ok(TypeNode::Literal(LiteralType::Bool(value)));
            }
            "typeof" => {
                self.advance();
                if self.at_word("import") && self.kind_at(1) == TokenKind::LParen {
                    self.advance();
                    self.skip_group()?;
                    while self.match_token(TokenKind::Dot) {
                        self.ident("expected name after `.`")?;
                    }
                } else {
                    self.parse_qualified_name()?;
                }
                if self.check(TokenKind::Lt) {
                    self.parse_type_args()?;
                }
                return Ok(TypeNode::Opaque { kind: OpaqueKind::Query, text: self.slice_from(start) });
            }
            "import" if self.kind_at(1) == TokenKind::LParen => {
                self.advance();
                self.skip_group()?;
                while self.match_token(TokenKind::Dot) {
                    self.ident("expected name after `.`")?;
                }
                if self.check(TokenKind::Lt) {
                    self.parse_type_args()?;
                }
                return Ok(TypeNode::Opaque { kind: OpaqueKind::Query, text: self.slice_from(start) });
            }
            word => {
                let keyword = Keyword::from_ident(word).filter(|_| self.kind_at(1) != TokenKind::Dot);
                if let Some(keyword) = keyword {
                    self.advance();
                    return Ok(TypeNode::Keyword(keyword));
                }
            }
        }

        let name = self.parse_qualified_name()?;
        let args = if self.check(TokenKind::Lt) { self.parse_type_args()? } else { Vec::new() };
        Ok(TypeNode::Reference { name, args })
    }

    pub(super) fn parse_type_args(&mut self) -> Result<Vec<TypeNode>, SyntaxError> {
        self.consume(TokenKind::Lt, "expected `<`")?;
        let mut args = Vec::new();
        while !self.check(TokenKind::Gt) {
            args.push(self.parse_type()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::Gt, "expected `>` after type arguments")?;
        Ok(args)
    }

    fn parse_tuple_type(&mut self) -> Result<TypeNode, SyntaxError> {
        self.consume(TokenKind::LBracket, "expected `[`")?;
        let mut elements = Vec::new();
        while !self.check(TokenKind::RBracket) {
            self.match_token(TokenKind::Ellipsis);
            // named member `name: T` / `name?: T`
            if self.check(TokenKind::Ident)
                && (self.kind_at(1) == TokenKind::Colon
                    || (self.kind_at(1) == TokenKind::Question && self.kind_at(2) == TokenKind::Colon))
            {
                self.advance();
                self.match_token(TokenKind::Question);
                self.advance();
            }
            elements.push(self.parse_type()?);
            self.match_token(TokenKind::Question);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RBracket, "expected `]` after tuple elements")?;
        Ok(TypeNode::Tuple(elements))
    }

    fn at_mapped_type(&self) -> bool {
        let mut n = 1;
        if matches!(self.kind_at(n), TokenKind::Plus | TokenKind::Minus) {
            n += 1;
        }
        if self.at_word_at(n, "readonly") {
            n += 1;
        }
        self.kind_at(n) == TokenKind::LBracket
            && self.kind_at(n + 1) == TokenKind::Ident
            && self.at_word_at(n + 2, "in")
    }

    /// `{ ... }` body of an interface or inline type literal.
    pub(super) fn parse_type_members(&mut self) -> Result<Vec<TypeMember>, SyntaxError> {
        self.consume(TokenKind::LBrace, "expected `{`")?;
        let mut members = Vec::new();

        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::Eof) {
                return Err(self.error("unterminated type body"));
            }
            if self.match_token(TokenKind::Semi) || self.match_token(TokenKind::Comma) {
                continue;
            }
            if self.at_word("readonly") && self.is_name_start_at(1) {
                self.advance();
            }

            // call and construct signatures
            if self.check(TokenKind::LParen) || self.check(TokenKind::Lt) {
                self.skip_signature()?;
                members.push(TypeMember::Method { name: "()".into() });
                continue;
            }
            if self.at_word("new") && matches!(self.kind_at(1), TokenKind::LParen | TokenKind::Lt) {
                self.advance();
                self.skip_signature()?;
                members.push(TypeMember::Method { name: "new".into() });
                continue;
            }

            let mut accessor = false;
            if (self.at_word("get") || self.at_word("set")) && self.is_name_start_at(1) {
                self.advance();
                accessor = true;
            }

            let name = match self.peek().kind {
                TokenKind::LBracket => {
                    if self.kind_at(1) == TokenKind::Ident && self.kind_at(2) == TokenKind::Colon {
                        members.push(TypeMember::Index(self.parse_index_signature()?));
                        continue;
                    }
                    self.skip_group()?;
                    "[computed]".to_string()
                }
                TokenKind::Ident | TokenKind::Number => {
                    let name = self.text().to_string();
                    self.advance();
                    name
                }
                TokenKind::Str => {
                    let name = unquote(self.text());
                    self.advance();
                    name
                }
                _ => return Err(self.error("expected type member")),
            };
            let optional = self.match_token(TokenKind::Question);

            if accessor || self.check(TokenKind::LParen) || self.check(TokenKind::Lt) {
                self.skip_signature()?;
                members.push(TypeMember::Method { name });
                continue;
            }

            let ty = if self.match_token(TokenKind::Colon) { Some(self.parse_type()?) } else { None };
            members.push(TypeMember::Property { name, optional, ty });
        }

        self.consume(TokenKind::RBrace, "expected `}`")?;
        Ok(members)
    }

    fn skip_signature(&mut self) -> Result<(), SyntaxError> {
        self.parse_type_params()?;
        self.parse_params()?;
        if self.match_token(TokenKind::Colon) {
            self.parse_return_type()?;
        }
        Ok(())
    }

    pub(super) fn parse_index_signature(&mut self) -> Result<IndexSignature, SyntaxError> {
        self.consume(TokenKind::LBracket, "expected `[`")?;
        let key_name = self.ident("expected index parameter name")?;
        self.consume(TokenKind::Colon, "expected `:` in index signature")?;
        let key_type = self.parse_type()?;
        self.consume(TokenKind::RBracket, "expected `]` in index signature")?;
        self.consume(TokenKind::Colon, "expected `:` after index signature")?;
        let ty = self.parse_type()?;
        Ok(IndexSignature { key_name, key_type, ty })
    }
}
