//! Parsed source modules, loaded at most once per canonical path.
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::ParseError;
use crate::syntax::ast::{
    ClassDecl, ClassMember, Decorator, EnumDecl, Expr, ImportBindings, ImportSpecifier, InterfaceDecl, Item,
    Module, TypeAliasDecl, TypeParam,
};
use crate::syntax::{line_column, parse_module};

// ———————————————————————————————————————————————————————————————————————————
// TYPES
// ———————————————————————————————————————————————————————————————————————————

#[derive(Debug)]
pub struct SourceModule {
    /// Canonical path; identity of the module for the whole run.
    pub path: PathBuf,
    pub declarations: Vec<Declaration>,
    pub imports: Vec<ImportEntry>,
    /// Declarators of exported variable statements, in source order.
    pub bindings: Vec<ExportedBinding>,
    pub attributes: AttributeTable,
}

#[derive(Debug, Clone)]
pub enum Declaration {
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    TypeAlias(TypeAliasDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Namespace,
    Named,
}

#[derive(Debug, Clone)]
pub struct ImportEntry {
    /// Module specifier as written, e.g. `./models`.
    pub source: String,
    pub kind: ImportKind,
    pub namespace: Option<String>,
    pub members: Vec<ImportSpecifier>,
}

#[derive(Debug, Clone)]
pub struct ExportedBinding {
    pub name: String,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeTarget {
    Class(String),
    Parameter { class: String, method: String, index: usize },
}

/// One decorator occurrence.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub target: AttributeTarget,
    pub name: String,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    records: Vec<Attribute>,
}

/// Owned by one analysis session; never global.
#[derive(Debug, Default)]
pub struct ModuleCache {
    modules: IndexMap<PathBuf, Rc<SourceModule>>,
}

// ———————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ———————————————————————————————————————————————————————————————————————————

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Class(d) => &d.name,
            Declaration::Interface(d) => &d.name,
            Declaration::Enum(d) => &d.name,
            Declaration::TypeAlias(d) => &d.name,
        }
    }

    pub fn type_params(&self) -> &[TypeParam] {
        match self {
            Declaration::Class(d) => &d.type_params,
            Declaration::Interface(d) => &d.type_params,
            Declaration::Enum(_) => &[],
            Declaration::TypeAlias(d) => &d.type_params,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Declaration::Interface(_) => 0,
            Declaration::Class(_) => 1,
            Declaration::Enum(_) => 2,
            Declaration::TypeAlias(_) => 3,
        }
    }
}

impl ImportEntry {
    /// Relative specifiers (`./x`, `../x`) point into the project.
    pub fn is_local(&self) -> bool {
        self.source.starts_with('.')
    }
}

impl AttributeTable {
    fn record(&mut self, target: AttributeTarget, decorators: &[Decorator]) {
        for decorator in decorators {
            self.records.push(Attribute {
                target: target.clone(),
                name: decorator.name(),
                arguments: decorator.arguments.clone(),
            });
        }
    }

    fn build(declarations: &[Declaration]) -> Self {
        let mut table = Self::default();
        for decl in declarations {
            let Declaration::Class(class) = decl else { continue };
            table.record(AttributeTarget::Class(class.name.clone()), &class.decorators);
            for member in &class.members {
                match member {
                    ClassMember::Method(method) => {
                        for (index, param) in method.params.iter().enumerate() {
                            table.record(
                                AttributeTarget::Parameter {
                                    class: class.name.clone(),
                                    method: method.name.clone(),
                                    index,
                                },
                                &param.decorators,
                            );
                        }
                    }
                    ClassMember::Constructor(params) => {
                        for (index, param) in params.iter().enumerate() {
                            table.record(
                                AttributeTarget::Parameter {
                                    class: class.name.clone(),
                                    method: "constructor".into(),
                                    index,
                                },
                                &param.decorators,
                            );
                        }
                    }
                    ClassMember::Property(_) | ClassMember::Index(_) => {}
                }
            }
        }
        table
    }

    pub fn on_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Attribute> + 'a {
        self.records
            .iter()
            .filter(move |a| matches!(&a.target, AttributeTarget::Class(c) if c == class))
    }

    pub fn class_attribute<'a>(&'a self, class: &'a str, name: &str) -> Option<&'a Attribute> {
        self.on_class(class).find(move |a| a.name == name)
    }

    pub fn on_parameter<'a>(
        &'a self,
        class: &'a str,
        method: &'a str,
        index: usize,
    ) -> impl Iterator<Item = &'a Attribute> + 'a {
        self.records.iter().filter(move |a| {
            matches!(
                &a.target,
                AttributeTarget::Parameter { class: c, method: m, index: i }
                    if c == class && m == method && *i == index
            )
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SourceModule {
    pub fn from_ast(path: PathBuf, module: Module) -> Self {
        let mut declarations = Vec::new();
        let mut imports = Vec::new();
        let mut bindings = Vec::new();

        for item in module.items {
            match item {
                Item::Import(import) => {
                    let entry = match import.bindings {
                        ImportBindings::Namespace(alias) => ImportEntry {
                            source: import.source,
                            kind: ImportKind::Namespace,
                            namespace: Some(alias),
                            members: Vec::new(),
                        },
                        ImportBindings::Named(members) => ImportEntry {
                            source: import.source,
                            kind: ImportKind::Named,
                            namespace: None,
                            members,
                        },
                        // default-only and side-effect imports carry no named bindings
                        ImportBindings::None => continue,
                    };
                    imports.push(entry);
                }
                Item::Class(d) => declarations.push(Declaration::Class(d)),
                Item::Interface(d) => declarations.push(Declaration::Interface(d)),
                Item::Enum(d) => declarations.push(Declaration::Enum(d)),
                Item::TypeAlias(d) => declarations.push(Declaration::TypeAlias(d)),
                Item::Variable(stmt) if stmt.exported => {
                    bindings.extend(
                        stmt.declarations
                            .into_iter()
                            .map(|d| ExportedBinding { name: d.name, initializer: d.initializer }),
                    );
                }
                Item::Variable(_) => {}
            }
        }

        let attributes = AttributeTable::build(&declarations);
        Self { path, declarations, imports, bindings, attributes }
    }

    /// First declaration named `name`, preferring interface, then class, enum, alias.
    pub fn find_declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .filter(|d| d.name() == name)
            .min_by_key(|d| d.rank())
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.declarations.iter().find_map(|d| match d {
            Declaration::Class(c) if c.name == name => Some(c),
            _ => None,
        })
    }

    pub fn namespace_import(&self, alias: &str) -> Option<&ImportEntry> {
        self.imports
            .iter()
            .find(|i| i.kind == ImportKind::Namespace && i.namespace.as_deref() == Some(alias))
    }

    /// Named import binding `local` in this module, with its specifier.
    pub fn named_import(&self, local: &str) -> Option<(&ImportEntry, &ImportSpecifier)> {
        self.imports.iter().filter(|i| i.kind == ImportKind::Named).find_map(|entry| {
            entry.members.iter().find(|m| m.local == local).map(|m| (entry, m))
        })
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and parse `path`, or return the module already loaded for it.
    pub fn open(&mut self, path: &Path) -> Result<Rc<SourceModule>, ParseError> {
        let key = std::fs::canonicalize(path)
            .map_err(|source| ParseError::Read { path: path.to_path_buf(), source })?;
        if let Some(module) = self.modules.get(&key) {
            return Ok(Rc::clone(module));
        }
        let text = std::fs::read_to_string(&key)
            .map_err(|source| ParseError::Read { path: key.clone(), source })?;
        self.load_source(key, &text)
    }

    /// Parse `text` as the module at `path`. The path is used as given.
    pub fn load_source(&mut self, path: impl Into<PathBuf>, text: &str) -> Result<Rc<SourceModule>, ParseError> {
        let path = path.into();
        if let Some(module) = self.modules.get(&path) {
            return Ok(Rc::clone(module));
        }

        let ast = parse_module(text).map_err(|err| {
            let (line, column) = line_column(text, err.offset);
            ParseError::Syntax { path: path.clone(), line, column, message: err.message }
        })?;

        let module = Rc::new(SourceModule::from_ast(path.clone(), ast));
        tracing::debug!(
            path = %path.display(),
            declarations = module.declarations.len(),
            imports = module.imports.len(),
            attributes = module.attributes.len(),
            "loaded module"
        );
        self.modules.insert(path, Rc::clone(&module));
        Ok(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
import { Item, Other as Renamed } from './models';
import * as shared from '../shared';
import Default from 'pkg';
import 'side-effect';

export interface Item { id: string }
export class Item {}
export type Id = string;

@LambdaFunction({ Type: 'AWS::Serverless::Function' })
export class GetItem {
    handle(@FromPath('id') id: string, @FromQuery('q') @Other() query: string) {}
}

const hidden = 1;
export const handler = new GetItem().handler, second = 2;
"#;

    #[test]
    fn builds_tables_from_ast() {
        let mut cache = ModuleCache::new();
        let module = cache.load_source("/project/get-item.ts", SOURCE).expect("parses");

        assert_eq!(module.imports.len(), 2);
        assert!(module.imports.iter().all(ImportEntry::is_local));
        assert!(module.namespace_import("shared").is_some());
        let (entry, spec) = module.named_import("Renamed").expect("renamed import");
        assert_eq!(entry.source, "./models");
        assert_eq!(spec.imported, "Other");

        let names: Vec<_> = module.bindings.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["handler", "second"]);

        assert!(matches!(module.find_declaration("Item"), Some(Declaration::Interface(_))));
        assert!(module.class("GetItem").is_some());

        assert_eq!(module.attributes.class_attribute("GetItem", "LambdaFunction").map(|a| a.arguments.len()), Some(1));
        assert_eq!(module.attributes.on_parameter("GetItem", "handle", 1).count(), 2);
        assert_eq!(module.attributes.on_parameter("GetItem", "handle", 0).next().map(|a| a.name.as_str()), Some("FromPath"));
    }

    #[test]
    fn doc_comments_and_regex_literals_load() {
        let source = r#"/*
 * Licensed under the Apache License, Version 2.0.
 */
const re = /\{/;

/** An item. */
export interface Item {
    /** identifier */
    id: string;
}

/**
 * Handler.
 */
@LambdaFunction({ Properties: { Timeout: 3 } })
export class Split {
    /** Splits at parentheses. */
    handle(s: string) {
        const cleaned = s.replace(/\(/g, '').replace(/'/g, '{');
        return cleaned.split(/[(]/);
    }
}

export type Id = string;
"#;
        let mut cache = ModuleCache::new();
        let module = cache.load_source("/project/split.ts", source).expect("parses");

        assert!(matches!(module.find_declaration("Item"), Some(Declaration::Interface(_))));
        assert!(matches!(module.find_declaration("Id"), Some(Declaration::TypeAlias(_))));
        assert!(module.attributes.class_attribute("Split", "LambdaFunction").is_some());
    }

    #[test]
    fn open_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("a.ts");
        std::fs::write(&file, "export type A = string;").expect("write");

        let mut cache = ModuleCache::new();
        let first = cache.open(&file).expect("open");
        let again = cache.open(&dir.path().join(".").join("a.ts")).expect("open again");
        assert!(Rc::ptr_eq(&first, &again));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn syntax_errors_carry_position() {
        let mut cache = ModuleCache::new();
        let err = cache.load_source("/x.ts", "export interface A {\n  a: ;\n}").unwrap_err();
        match err {
            ParseError::Syntax { line, column, .. } => assert_eq!((line, column), (2, 6)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_read_error() {
        let mut cache = ModuleCache::new();
        assert!(matches!(cache.open(Path::new("/definitely/not/here.ts")), Err(ParseError::Read { .. })));
    }
}
