//! Recursive-descent parser for the declaration-level TypeScript subset.
//!
//! Statements the analyzer has no use for (functions, namespaces, re-exports,
//! expression statements) and all function bodies are skipped as balanced
//! token runs. Type and expression grammar live in `types.rs` / `expr.rs`.

mod expr;
mod types;

use super::ast::*;
use super::lexer::{Token, TokenKind, lex, unquote};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    /// Byte offset into the source.
    pub offset: usize,
}

pub fn parse_module(source: &str) -> Result<Module, SyntaxError> {
    Parser::new(source).parse_module()
}

pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
}

const MEMBER_MODIFIERS: &[&str] = &[
    "public", "private", "protected", "static", "readonly", "abstract", "declare", "override",
    "accessor", "async",
];

const PARAM_MODIFIERS: &[&str] = &["public", "private", "protected", "readonly", "override"];

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source, tokens: lex(source), pos: 0 }
    }

    pub fn parse_module(mut self) -> Result<Module, SyntaxError> {
        let mut items = Vec::new();
        while !self.check(TokenKind::Eof) {
            if self.match_token(TokenKind::Semi) {
                continue;
            }
            if let Some(item) = self.parse_statement()? {
                items.push(item);
            }
        }
        Ok(Module { items })
    }

    // ————————————————————————————————————————————————————————————————————————————
    // TOKEN ACCESS
    // ————————————————————————————————————————————————————————————————————————————

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn kind_at(&self, n: usize) -> TokenKind {
        self.peek_at(n).kind
    }

    fn text(&self) -> &'src str {
        self.text_at(0)
    }

    fn text_at(&self, n: usize) -> &'src str {
        let span = self.peek_at(n).span;
        &self.source[span.start..span.end]
    }

    fn prev_end(&self) -> usize {
        if self.pos == 0 { 0 } else { self.tokens[self.pos - 1].span.end }
    }

    fn slice_from(&self, start: usize) -> String {
        let end = self.prev_end().max(start);
        self.source[start..end].trim().to_string()
    }

    fn advance(&mut self) -> Token {
        let tok = *self.peek();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, msg: &str) -> Result<Token, SyntaxError> {
        if self.check(kind) { Ok(self.advance()) } else { Err(self.error(msg)) }
    }

    fn at_word(&self, word: &str) -> bool {
        self.at_word_at(0, word)
    }

    fn at_word_at(&self, n: usize, word: &str) -> bool {
        self.kind_at(n) == TokenKind::Ident && self.text_at(n) == word
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<(), SyntaxError> {
        if self.eat_word(word) { Ok(()) } else { Err(self.error(&format!("expected `{word}`"))) }
    }

    fn ident(&mut self, msg: &str) -> Result<String, SyntaxError> {
        if self.check(TokenKind::Ident) {
            let name = self.text().to_string();
            self.advance();
            Ok(name)
        } else {
            Err(self.error(msg))
        }
    }

    fn error(&self, msg: &str) -> SyntaxError {
        let tok = self.peek();
        let found = match tok.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Error => format!("unexpected character `{}`", self.text()),
            _ => format!("`{}`", self.text()),
        };
        SyntaxError { message: format!("{msg}, found {found}"), offset: tok.span.start }
    }

    /// True when the token at `n` can start a member or property name.
    fn is_name_start_at(&self, n: usize) -> bool {
        matches!(
            self.kind_at(n),
            TokenKind::Ident | TokenKind::Str | TokenKind::Number | TokenKind::LBracket | TokenKind::Star
        )
    }

    /// A line break before an identifier that cannot continue the previous expression.
    fn at_asi_boundary(&self) -> bool {
        let tok = self.peek();
        if !tok.newline_before || !matches!(tok.kind, TokenKind::Ident | TokenKind::At) {
            return false;
        }
        self.pos > 0
            && matches!(
                self.tokens[self.pos - 1].kind,
                TokenKind::Ident
                    | TokenKind::Str
                    | TokenKind::Number
                    | TokenKind::Template
                    | TokenKind::Regex
                    | TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::RBrace
            )
    }

    // ————————————————————————————————————————————————————————————————————————————
    // SKIPPING
    // ————————————————————————————————————————————————————————————————————————————

    fn closer(kind: TokenKind) -> Option<TokenKind> {
        match kind {
            TokenKind::LParen => Some(TokenKind::RParen),
            TokenKind::LBracket => Some(TokenKind::RBracket),
            TokenKind::LBrace => Some(TokenKind::RBrace),
            _ => None,
        }
    }

    /// Index of the token closing the group opened at `self.pos + n`.
    fn matching_close(&self, n: usize) -> Option<usize> {
        let mut depth = 0usize;
        for idx in (self.pos + n)..self.tokens.len() {
            match self.tokens[idx].kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(idx);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
        }
        None
    }

    /// Skip one bracketed group, the opening token included.
    fn skip_group(&mut self) -> Result<(), SyntaxError> {
        let open = self.advance();
        let Some(first) = Self::closer(open.kind) else {
            return Err(SyntaxError {
                message: "expected an opening bracket".into(),
                offset: open.span.start,
            });
        };
        let mut stack = vec![first];
        loop {
            let tok = *self.peek();
            match tok.kind {
                TokenKind::Eof => {
                    return Err(SyntaxError {
                        message: "unclosed bracket".into(),
                        offset: open.span.start,
                    });
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    stack.extend(Self::closer(tok.kind));
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if stack.last() != Some(&tok.kind) {
                        return Err(self.error("mismatched closing bracket"));
                    }
                    stack.pop();
                }
                _ => {}
            }
            self.advance();
            if stack.is_empty() {
                return Ok(());
            }
        }
    }

    /// Skip a statement the analyzer does not model.
    fn skip_statement(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Semi => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::LParen | TokenKind::LBracket => self.skip_group()?,
                TokenKind::LBrace => {
                    self.skip_group()?;
                    self.match_token(TokenKind::Semi);
                    return Ok(());
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    return Err(self.error("unexpected closing bracket"));
                }
                _ => {
                    if self.pos > start && self.at_asi_boundary() {
                        return Ok(());
                    }
                    self.advance();
                }
            }
        }
    }

    /// Skip an initializer expression up to the next separator at depth zero.
    fn skip_initializer(&mut self) -> Result<(), SyntaxError> {
        loop {
            let kind = self.peek().kind;
            match kind {
                TokenKind::Eof
                | TokenKind::Semi
                | TokenKind::Comma
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace => return Ok(()),
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => self.skip_group()?,
                TokenKind::Lt if self.skip_call_type_args() => {}
                _ => {
                    if self.at_asi_boundary() {
                        return Ok(());
                    }
                    self.advance();
                }
            }
        }
    }

    /// Consume `<...>` when it is the type argument list of a call such as
    /// `new Map<string, number>()`. Leaves the position untouched otherwise.
    fn skip_call_type_args(&mut self) -> bool {
        if self.pos == 0 || self.tokens[self.pos - 1].kind != TokenKind::Ident {
            return false;
        }
        let saved = self.pos;
        if self.parse_type_args().is_ok() && self.check(TokenKind::LParen) {
            return true;
        }
        self.pos = saved;
        false
    }

    // ————————————————————————————————————————————————————————————————————————————
    // STATEMENTS
    // ————————————————————————————————————————————————————————————————————————————

    fn parse_statement(&mut self) -> Result<Option<Item>, SyntaxError> {
        let mut decorators = self.parse_decorators()?;
        let mut modifiers = Modifiers::default();

        loop {
            if self.at_word("export") {
                let reexport = matches!(self.kind_at(1), TokenKind::LBrace | TokenKind::Star | TokenKind::Eq)
                    || self.at_word_at(1, "as")
                    || (self.at_word_at(1, "type") && self.kind_at(2) == TokenKind::LBrace);
                if reexport {
                    self.skip_statement()?;
                    return Ok(None);
                }
                self.advance();
                modifiers.exported = true;
            } else if modifiers.exported && self.at_word("default") {
                self.advance();
                modifiers.default = true;
            } else if self.at_word("declare") && self.kind_at(1) == TokenKind::Ident {
                self.advance();
                modifiers.declare = true;
            } else if self.at_word("abstract") && self.at_word_at(1, "class") {
                self.advance();
                modifiers.is_abstract = true;
            } else {
                break;
            }
        }
        decorators.extend(self.parse_decorators()?);

        if self.at_word("import") && !matches!(self.kind_at(1), TokenKind::LParen | TokenKind::Dot) {
            return self.parse_import();
        }
        if self.at_word("class") {
            return Ok(Some(Item::Class(self.parse_class(modifiers, decorators)?)));
        }
        if self.at_word("interface") && self.kind_at(1) == TokenKind::Ident {
            return Ok(Some(Item::Interface(self.parse_interface(modifiers)?)));
        }
        if self.at_word("enum") || (self.at_word("const") && self.at_word_at(1, "enum")) {
            return Ok(Some(Item::Enum(self.parse_enum(modifiers)?)));
        }
        if self.at_word("type")
            && self.kind_at(1) == TokenKind::Ident
            && matches!(self.kind_at(2), TokenKind::Eq | TokenKind::Lt)
        {
            return Ok(Some(Item::TypeAlias(self.parse_type_alias(modifiers)?)));
        }
        if (self.at_word("const") || self.at_word("let") || self.at_word("var"))
            && matches!(self.kind_at(1), TokenKind::Ident | TokenKind::LBrace | TokenKind::LBracket)
        {
            return Ok(Some(Item::Variable(self.parse_variable(modifiers)?)));
        }

        self.skip_statement()?;
        Ok(None)
    }

    fn parse_decorators(&mut self) -> Result<Vec<Decorator>, SyntaxError> {
        let mut out = Vec::new();
        while self.match_token(TokenKind::At) {
            let mut path = vec![self.ident("expected decorator name")?];
            while self.match_token(TokenKind::Dot) {
                path.push(self.ident("expected decorator name")?);
            }
            let arguments = if self.check(TokenKind::LParen) { self.parse_arguments()? } else { Vec::new() };
            out.push(Decorator { path, arguments });
        }
        Ok(out)
    }

    fn parse_import(&mut self) -> Result<Option<Item>, SyntaxError> {
        self.expect_word("import")?;

        if self.check(TokenKind::Str) {
            let source = unquote(self.text());
            self.advance();
            self.match_token(TokenKind::Semi);
            return Ok(Some(Item::Import(ImportDecl {
                source,
                default: None,
                bindings: ImportBindings::None,
                type_only: false,
            })));
        }

        let mut type_only = false;
        if self.at_word("type")
            && (matches!(self.kind_at(1), TokenKind::LBrace | TokenKind::Star)
                || (self.kind_at(1) == TokenKind::Ident && !self.at_word_at(1, "from")))
        {
            self.advance();
            type_only = true;
        }

        let mut default = None;
        if self.check(TokenKind::Ident) && !self.at_word("from") {
            if self.kind_at(1) == TokenKind::Eq {
                // `import x = require('..')`
                self.skip_statement()?;
                return Ok(None);
            }
            default = Some(self.ident("expected import binding")?);
            self.match_token(TokenKind::Comma);
        }

        let bindings = if self.match_token(TokenKind::Star) {
            self.expect_word("as")?;
            ImportBindings::Namespace(self.ident("expected namespace alias")?)
        } else if self.check(TokenKind::LBrace) {
            ImportBindings::Named(self.parse_import_specifiers()?)
        } else {
            ImportBindings::None
        };

        self.expect_word("from")?;
        if !self.check(TokenKind::Str) {
            return Err(self.error("expected module specifier"));
        }
        let source = unquote(self.text());
        self.advance();

        if (self.at_word("with") || self.at_word("assert")) && self.kind_at(1) == TokenKind::LBrace {
            self.advance();
            self.skip_group()?;
        }
        self.match_token(TokenKind::Semi);

        Ok(Some(Item::Import(ImportDecl { source, default, bindings, type_only })))
    }

    fn parse_import_specifiers(&mut self) -> Result<Vec<ImportSpecifier>, SyntaxError> {
        self.consume(TokenKind::LBrace, "expected `{`")?;
        let mut specifiers = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.at_word("type")
                && matches!(self.kind_at(1), TokenKind::Ident | TokenKind::Str)
                && !self.at_word_at(1, "as")
            {
                self.advance();
            }
            let imported = match self.peek().kind {
                TokenKind::Ident => self.text().to_string(),
                TokenKind::Str => unquote(self.text()),
                _ => return Err(self.error("expected import specifier")),
            };
            self.advance();
            let local = if self.eat_word("as") { self.ident("expected local binding")? } else { imported.clone() };
            specifiers.push(ImportSpecifier { imported, local });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RBrace, "expected `}` after import specifiers")?;
        Ok(specifiers)
    }

    fn parse_class(&mut self, modifiers: Modifiers, decorators: Vec<Decorator>) -> Result<ClassDecl, SyntaxError> {
        self.expect_word("class")?;
        let name = if self.check(TokenKind::Ident) && !self.at_word("extends") && !self.at_word("implements") {
            self.ident("expected class name")?
        } else {
            "default".to_string()
        };
        let type_params = self.parse_type_params()?;

        let extends = if self.eat_word("extends") { Some(self.parse_heritage()?) } else { None };
        let mut implements = Vec::new();
        if self.eat_word("implements") {
            loop {
                implements.push(self.parse_heritage()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::LBrace, "expected `{` to open class body")?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::Eof) {
                return Err(self.error(&format!("unterminated body of class `{name}`")));
            }
            if let Some(member) = self.parse_class_member()? {
                members.push(member);
            }
        }
        self.consume(TokenKind::RBrace, "expected `}` to close class body")?;

        Ok(ClassDecl { name, modifiers, decorators, type_params, extends, implements, members })
    }

    fn parse_heritage(&mut self) -> Result<HeritageType, SyntaxError> {
        let name = self.parse_qualified_name()?;
        let type_args = if self.check(TokenKind::Lt) { self.parse_type_args()? } else { Vec::new() };
        if self.check(TokenKind::LParen) {
            // mixin call, e.g. `extends Mixin(Base)`
            self.skip_group()?;
        }
        Ok(HeritageType { name, type_args })
    }

    fn parse_qualified_name(&mut self) -> Result<QualifiedName, SyntaxError> {
        let mut segments = vec![self.ident("expected type name")?];
        while self.check(TokenKind::Dot) && self.kind_at(1) == TokenKind::Ident {
            self.advance();
            segments.push(self.ident("expected type name")?);
        }
        let name = segments.pop().unwrap_or_default();
        let namespace = if segments.is_empty() { None } else { Some(segments.swap_remove(0)) };
        Ok(QualifiedName { namespace, name })
    }

    fn parse_class_member(&mut self) -> Result<Option<ClassMember>, SyntaxError> {
        if self.match_token(TokenKind::Semi) {
            return Ok(None);
        }
        let decorators = self.parse_decorators()?;

        let mut is_static = false;
        while self.check(TokenKind::Ident) && MEMBER_MODIFIERS.contains(&self.text()) {
            if self.at_word("static") && self.kind_at(1) == TokenKind::LBrace {
                self.advance();
                self.skip_group()?;
                return Ok(None);
            }
            if !self.is_name_start_at(1) {
                break;
            }
            is_static |= self.at_word("static");
            self.advance();
        }

        let mut kind = MethodKind::Method;
        if (self.at_word("get") || self.at_word("set")) && self.is_name_start_at(1) {
            kind = if self.at_word("get") { MethodKind::Getter } else { MethodKind::Setter };
            self.advance();
        }
        self.match_token(TokenKind::Star);

        let name = match self.peek().kind {
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
            TokenKind::LBracket => {
                if self.kind_at(1) == TokenKind::Ident && self.kind_at(2) == TokenKind::Colon {
                    let index = self.parse_index_signature()?;
                    self.match_token(TokenKind::Semi);
                    return Ok(Some(ClassMember::Index(index)));
                }
                self.skip_group()?;
                "[computed]".to_string()
            }
            _ => return Err(self.error("expected class member")),
        };

        let optional = self.match_token(TokenKind::Question);
        self.match_token(TokenKind::Bang);

        if name == "constructor" && self.check(TokenKind::LParen) {
            let params = self.parse_params()?;
            self.skip_body()?;
            return Ok(Some(ClassMember::Constructor(params)));
        }

        if self.check(TokenKind::LParen) || self.check(TokenKind::Lt) {
            let type_params = self.parse_type_params()?;
            let params = self.parse_params()?;
            let return_type =
                if self.match_token(TokenKind::Colon) { Some(self.parse_return_type()?) } else { None };
            self.skip_body()?;
            return Ok(Some(ClassMember::Method(MethodDecl {
                name,
                kind,
                is_static,
                type_params,
                params,
                return_type,
                decorators,
            })));
        }

        let ty = if self.match_token(TokenKind::Colon) { Some(self.parse_type()?) } else { None };
        if self.match_token(TokenKind::Eq) {
            self.skip_initializer()?;
        }
        self.match_token(TokenKind::Semi);

        Ok(Some(ClassMember::Property(PropertyDecl { name, ty, optional, is_static, decorators })))
    }

    /// Function body or overload terminator.
    fn skip_body(&mut self) -> Result<(), SyntaxError> {
        if self.check(TokenKind::LBrace) {
            self.skip_group()
        } else {
            self.match_token(TokenKind::Semi);
            Ok(())
        }
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, SyntaxError> {
        self.consume(TokenKind::LParen, "expected `(`")?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) {
            let decorators = self.parse_decorators()?;
            let mut property = false;
            while self.check(TokenKind::Ident)
                && PARAM_MODIFIERS.contains(&self.text())
                && matches!(
                    self.kind_at(1),
                    TokenKind::Ident | TokenKind::LBrace | TokenKind::LBracket | TokenKind::Ellipsis
                )
            {
                property = true;
                self.advance();
            }
            let rest = self.match_token(TokenKind::Ellipsis);
            let name = match self.peek().kind {
                TokenKind::Ident => self.ident("expected parameter name")?,
                TokenKind::LBrace | TokenKind::LBracket => {
                    self.skip_group()?;
                    "__destructured".to_string()
                }
                _ => return Err(self.error("expected parameter name")),
            };
            let optional = self.match_token(TokenKind::Question);
            let ty = if self.match_token(TokenKind::Colon) { Some(self.parse_type()?) } else { None };
            if self.match_token(TokenKind::Eq) {
                self.skip_initializer()?;
            }
            params.push(Param { name, ty, optional, rest, property, decorators });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RParen, "expected `)` after parameters")?;
        Ok(params)
    }

    fn parse_type_params(&mut self) -> Result<Vec<TypeParam>, SyntaxError> {
        let mut params = Vec::new();
        if !self.match_token(TokenKind::Lt) {
            return Ok(params);
        }
        while !self.check(TokenKind::Gt) {
            while (self.at_word("const") || self.at_word("in") || self.at_word("out"))
                && self.kind_at(1) == TokenKind::Ident
            {
                self.advance();
            }
            let name = self.ident("expected type parameter name")?;
            let constraint = if self.eat_word("extends") { Some(self.parse_type()?) } else { None };
            let default = if self.match_token(TokenKind::Eq) { Some(self.parse_type()?) } else { None };
            params.push(TypeParam { name, constraint, default });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::Gt, "expected `>` after type parameters")?;
        Ok(params)
    }

    fn parse_interface(&mut self, modifiers: Modifiers) -> Result<InterfaceDecl, SyntaxError> {
        self.expect_word("interface")?;
        let name = self.ident("expected interface name")?;
        let type_params = self.parse_type_params()?;
        let mut extends = Vec::new();
        if self.eat_word("extends") {
            loop {
                extends.push(self.parse_heritage()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        let members = self.parse_type_members()?;
        Ok(InterfaceDecl { name, modifiers, type_params, extends, members })
    }

    fn parse_enum(&mut self, modifiers: Modifiers) -> Result<EnumDecl, SyntaxError> {
        let is_const = self.eat_word("const");
        self.expect_word("enum")?;
        let name = self.ident("expected enum name")?;
        self.consume(TokenKind::LBrace, "expected `{` to open enum body")?;

        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let member = match self.peek().kind {
                TokenKind::Ident => self.text().to_string(),
                TokenKind::Str => unquote(self.text()),
                _ => return Err(self.error("expected enum member")),
            };
            self.advance();
            let initializer = if self.match_token(TokenKind::Eq) { Some(self.parse_expr()?) } else { None };
            members.push(EnumMember { name: member, initializer });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RBrace, "expected `}` to close enum body")?;
        Ok(EnumDecl { name, modifiers, is_const, members })
    }

    fn parse_type_alias(&mut self, modifiers: Modifiers) -> Result<TypeAliasDecl, SyntaxError> {
        self.expect_word("type")?;
        let name = self.ident("expected type alias name")?;
        let type_params = self.parse_type_params()?;
        self.consume(TokenKind::Eq, "expected `=` in type alias")?;
        let ty = self.parse_type()?;
        self.match_token(TokenKind::Semi);
        Ok(TypeAliasDecl { name, modifiers, type_params, ty })
    }

    fn parse_variable(&mut self, modifiers: Modifiers) -> Result<VariableStmt, SyntaxError> {
        self.advance(); // const / let / var
        let mut declarations = Vec::new();
        loop {
            let name = match self.peek().kind {
                TokenKind::Ident => self.ident("expected binding name")?,
                TokenKind::LBrace | TokenKind::LBracket => {
                    self.skip_group()?;
                    "__destructured".to_string()
                }
                _ => return Err(self.error("expected binding name")),
            };
            self.match_token(TokenKind::Bang);
            if self.match_token(TokenKind::Colon) {
                self.parse_type()?;
            }
            let initializer = if self.match_token(TokenKind::Eq) { Some(self.parse_expr()?) } else { None };
            declarations.push(VarDeclarator { name, initializer });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.match_token(TokenKind::Semi);
        Ok(VariableStmt { exported: modifiers.exported, declarations })
    }
}
