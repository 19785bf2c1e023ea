//! Type Resolver: renders type annotations to text and pulls every named type
//! they reach into the `TypeTable`, following relative imports.
pub mod table;
mod render;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexSet;
use tracing::debug;

use crate::analysis::Analysis;
use crate::cache::SourceModule;
use crate::error::{Diagnostic, ParseError};
use crate::syntax::ast::{LiteralType, OpaqueKind, QualifiedName, TypeMember, TypeNode};

pub use table::{TypeDefinition, TypeStatus, TypeTable};

/// Ambient library types. Left unresolved without a diagnostic.
const GLOBAL_TYPES: &[&str] = &[
    "Array", "ReadonlyArray", "Promise", "Record", "Partial", "Required", "Readonly", "Pick", "Omit",
    "Exclude", "Extract", "NonNullable", "ReturnType", "Parameters", "Awaited", "Date", "Map", "Set",
    "ReadonlyMap", "ReadonlySet", "Error", "RegExp", "Uint8Array", "ArrayBuffer", "Blob", "File",
    "Object", "String", "Number", "Boolean", "Function", "Symbol", "BigInt",
];

enum Located {
    Found(Rc<SourceModule>),
    Missing(String),
}

impl Analysis {
    /// Render `ty` as it appears inside `module`. Names in `scope` are type
    /// parameters and render as themselves. Every named reference is added to
    /// `refs` and defined in the type table.
    pub fn resolve_type(
        &mut self,
        ty: &TypeNode,
        module: &Rc<SourceModule>,
        scope: &[String],
        refs: &mut IndexSet<String>,
    ) -> Result<String, ParseError> {
        Ok(match ty {
            TypeNode::Keyword(keyword) => keyword.as_str().to_string(),
            TypeNode::Literal(LiteralType::Str(s)) => quote(s),
            TypeNode::Literal(LiteralType::Num(n)) => n.clone(),
            TypeNode::Literal(LiteralType::Bool(b)) => b.to_string(),
            TypeNode::Reference { name, args } => {
                if name.namespace.is_none() && scope.iter().any(|p| p == &name.name) {
                    return Ok(name.name.clone());
                }
                refs.insert(name.name.clone());
                self.define(name, module)?;
                if args.is_empty() {
                    name.name.clone()
                } else {
                    let args = self.resolve_list(args, module, scope, refs, ", ")?;
                    format!("{}<{args}>", name.name)
                }
            }
            TypeNode::Array(element) => {
                let text = self.resolve_type(element, module, scope, refs)?;
                match element.as_ref() {
                    TypeNode::Union(_) | TypeNode::Intersection(_) => format!("({text})[]"),
                    TypeNode::Opaque { kind: OpaqueKind::Function | OpaqueKind::Constructor, .. } => {
                        format!("({text})[]")
                    }
                    _ => format!("{text}[]"),
                }
            }
            TypeNode::Tuple(elements) => format!("[{}]", self.resolve_list(elements, module, scope, refs, ", ")?),
            TypeNode::Union(arms) => self.resolve_list(arms, module, scope, refs, " | ")?,
            TypeNode::Intersection(parts) => self.resolve_list(parts, module, scope, refs, " & ")?,
            TypeNode::Parenthesized(inner) => format!("({})", self.resolve_type(inner, module, scope, refs)?),
            TypeNode::Shape(members) => self.resolve_shape(members, module, scope, refs)?,
            TypeNode::Opaque { text, .. } => {
                self.diagnostics.push(Diagnostic::UnsupportedType {
                    module: module.path.clone(),
                    excerpt: text.clone(),
                });
                "unknown".to_string()
            }
        })
    }

    fn resolve_list(
        &mut self,
        types: &[TypeNode],
        module: &Rc<SourceModule>,
        scope: &[String],
        refs: &mut IndexSet<String>,
        separator: &str,
    ) -> Result<String, ParseError> {
        let mut parts = Vec::with_capacity(types.len());
        for ty in types {
            parts.push(self.resolve_type(ty, module, scope, refs)?);
        }
        Ok(parts.join(separator))
    }

    fn resolve_shape(
        &mut self,
        members: &[TypeMember],
        module: &Rc<SourceModule>,
        scope: &[String],
        refs: &mut IndexSet<String>,
    ) -> Result<String, ParseError> {
        let mut fields = Vec::new();
        for member in members {
            if let Some(line) = self.render_type_member(member, module, scope, refs)? {
                fields.push(line);
            }
        }
        if fields.is_empty() {
            return Ok("{}".to_string());
        }
        Ok(format!("{{ {} }}", fields.join(" ")))
    }

    /// `name?: T;` or `[k: K]: V;`. Method signatures render as nothing.
    fn render_type_member(
        &mut self,
        member: &TypeMember,
        module: &Rc<SourceModule>,
        scope: &[String],
        refs: &mut IndexSet<String>,
    ) -> Result<Option<String>, ParseError> {
        Ok(match member {
            TypeMember::Property { name, optional, ty } => {
                let ty = match ty {
                    Some(ty) => self.resolve_type(ty, module, scope, refs)?,
                    None => "any".to_string(),
                };
                let mark = if *optional { "?" } else { "" };
                Some(format!("{}{mark}: {ty};", property_name(name)))
            }
            TypeMember::Index(index) => {
                let key = self.resolve_type(&index.key_type, module, scope, refs)?;
                let value = self.resolve_type(&index.ty, module, scope, refs)?;
                Some(format!("[{}: {key}]: {value};", index.key_name))
            }
            TypeMember::Method { .. } => None,
        })
    }

    /// Ensure `name` has a table entry, rendering its declaration if found.
    fn define(&mut self, name: &QualifiedName, module: &Rc<SourceModule>) -> Result<(), ParseError> {
        if !self.types.begin(&name.name) {
            return Ok(());
        }
        match self.locate(name, module)? {
            Located::Found(origin) => {
                debug!(name = %name.name, origin = %origin.path.display(), "rendering type");
                let Some(decl) = origin.find_declaration(&name.name).cloned() else {
                    return Ok(());
                };
                let mut references = IndexSet::new();
                let text = self.render_declaration(&decl, &origin, &mut references)?;
                self.types.finish(&name.name, text, references, origin.path.clone());
            }
            Located::Missing(reason) => {
                let first = self.types.mark_external(&name.name);
                if first && !GLOBAL_TYPES.contains(&name.name.as_str()) {
                    self.diagnostics.push(Diagnostic::UnresolvedType {
                        module: module.path.clone(),
                        name: name.name.clone(),
                        reason,
                    });
                } else {
                    debug!(name = %name.name, %reason, "type left unresolved");
                }
            }
        }
        Ok(())
    }

    /// Find the module declaring `name`: the current one, else through its
    /// imports. Each module is visited at most once.
    fn locate(&mut self, name: &QualifiedName, module: &Rc<SourceModule>) -> Result<Located, ParseError> {
        let mut current = Rc::clone(module);
        let mut namespace = name.namespace.clone();
        let mut visited = IndexSet::<PathBuf>::new();

        loop {
            if !visited.insert(current.path.clone()) {
                return Ok(Located::Missing("import cycle".into()));
            }
            if namespace.is_none() && current.find_declaration(&name.name).is_some() {
                return Ok(Located::Found(current));
            }

            let entry = match namespace.take() {
                Some(alias) => match current.namespace_import(&alias) {
                    Some(entry) => entry,
                    None => return Ok(Located::Missing(format!("no namespace import `{alias}`"))),
                },
                None => match current.named_import(&name.name) {
                    Some((_, spec)) if spec.imported != spec.local => {
                        return Ok(Located::Missing(format!("imported under alias from `{}`", spec.imported)));
                    }
                    Some((entry, _)) => entry,
                    None => return Ok(Located::Missing("no matching import".into())),
                },
            };

            if !entry.is_local() {
                return Ok(Located::Missing(format!("package import `{}`", entry.source)));
            }
            let path = import_target(current.dir(), &entry.source);
            debug!(name = %name.name, from = %current.path.display(), to = %path.display(), "following import");
            current = self.modules.open(&path)?;
        }
    }
}

/// File a relative specifier points at. Falls back to `<spec>.ts`.
pub fn import_target(dir: &Path, specifier: &str) -> PathBuf {
    let base = dir.join(specifier);
    let mut candidates = Vec::new();
    if let Some(stem) = specifier.strip_suffix(".js") {
        candidates.push(with_suffix(&dir.join(stem), ".ts"));
    }
    let fallback = with_suffix(&base, ".ts");
    candidates.push(fallback.clone());
    candidates.push(with_suffix(&base, ".tsx"));
    candidates.push(base.join("index.ts"));
    candidates.into_iter().find(|p| p.is_file()).unwrap_or(fallback)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub(crate) fn property_name(name: &str) -> String {
    let is_ident = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_ident { name.to_string() } else { quote(name) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis_with(files: &[(&str, &str)]) -> (Analysis, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, text) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("mkdir");
            }
            std::fs::write(path, text).expect("write");
        }
        (Analysis::new(), dir)
    }

    fn resolve_alias(analysis: &mut Analysis, module: &Rc<SourceModule>, alias: &str) -> (String, IndexSet<String>) {
        let decl = module.find_declaration(alias).cloned().expect("alias");
        let crate::cache::Declaration::TypeAlias(alias) = decl else { panic!("expected alias") };
        let mut refs = IndexSet::new();
        let text = analysis.resolve_type(&alias.ty, module, &[], &mut refs).expect("resolves");
        (text, refs)
    }

    #[test]
    fn renders_structural_types() {
        let (mut analysis, dir) = analysis_with(&[(
            "a.ts",
            "type T = { id: string; 'x-y'?: number[]; tags: (string | null)[]; pair: [number, boolean] } | 'lit' | 3;",
        )]);
        let module = analysis.modules.open(&dir.path().join("a.ts")).expect("open");
        let (text, refs) = resolve_alias(&mut analysis, &module, "T");
        assert_eq!(
            text,
            "{ id: string; 'x-y'?: number[]; tags: (string | null)[]; pair: [number, boolean]; } | 'lit' | 3"
        );
        assert!(refs.is_empty());
    }

    #[test]
    fn follows_relative_import_chain() {
        let (mut analysis, dir) = analysis_with(&[
            ("a.ts", "import { B } from './b';\ntype Root = B;"),
            ("b.ts", "import { C } from './lib/c';\nexport interface B { c: C }"),
            ("lib/c.ts", "export enum C { One = 'one', Two = 2, Three }"),
        ]);
        let module = analysis.modules.open(&dir.path().join("a.ts")).expect("open");
        let (text, refs) = resolve_alias(&mut analysis, &module, "Root");
        assert_eq!(text, "B");
        assert_eq!(refs.iter().collect::<Vec<_>>(), ["B"]);

        let b = analysis.types.get("B").expect("B defined");
        assert_eq!(b.status, TypeStatus::Rendered);
        assert_eq!(b.text, "export interface B {\n    c: C;\n}");
        assert!(b.references.contains("C"));
        let c = analysis.types.get("C").expect("C defined");
        assert_eq!(c.text, "export enum C {\n    One = 'one',\n    Two = 2,\n    Three,\n}");
        assert_eq!(analysis.modules.len(), 3);
    }

    #[test]
    fn follows_namespace_import() {
        let (mut analysis, dir) = analysis_with(&[
            ("a.ts", "import * as M from './models';\ntype Root = M.Either[];"),
            (
                "models.ts",
                "export type Either = Item | Other;\nexport interface Item { id: string }\nexport interface Other { code: number }",
            ),
        ]);
        let module = analysis.modules.open(&dir.path().join("a.ts")).expect("open");
        let (text, refs) = resolve_alias(&mut analysis, &module, "Root");
        assert_eq!(text, "Either[]");
        assert_eq!(refs.iter().collect::<Vec<_>>(), ["Either"]);

        let either = analysis.types.get("Either").expect("Either defined");
        assert_eq!(either.status, TypeStatus::Rendered);
        assert_eq!(either.text, "export type Either = Item | Other;");
        assert!(analysis.types.is_rendered("Item"));
        assert!(analysis.types.is_rendered("Other"));
        assert!(analysis.diagnostics.items().is_empty());
    }

    #[test]
    fn unknown_namespace_is_external() {
        let (mut analysis, dir) = analysis_with(&[("a.ts", "import * as M from './models';\ntype Root = N.Item;")]);
        let module = analysis.modules.open(&dir.path().join("a.ts")).expect("open");
        let (text, _) = resolve_alias(&mut analysis, &module, "Root");
        assert_eq!(text, "Item");
        assert_eq!(analysis.types.status("Item"), Some(TypeStatus::External));
    }

    #[test]
    fn package_imports_stay_external() {
        let (mut analysis, dir) = analysis_with(&[("a.ts", "import { Remote } from 'pkg';\ntype Root = Remote<string>;")]);
        let module = analysis.modules.open(&dir.path().join("a.ts")).expect("open");
        let (text, _) = resolve_alias(&mut analysis, &module, "Root");
        assert_eq!(text, "Remote<string>");
        assert_eq!(analysis.types.status("Remote"), Some(TypeStatus::External));
        assert!(matches!(
            analysis.diagnostics.items(),
            [Diagnostic::UnresolvedType { name, .. }] if name == "Remote"
        ));
    }

    #[test]
    fn cyclic_types_terminate() {
        let (mut analysis, dir) = analysis_with(&[
            ("a.ts", "import { Node } from './node';\ntype Root = Node;"),
            ("node.ts", "import { Edge } from './edge';\nexport interface Node { children: Node[]; edge?: Edge }"),
            ("edge.ts", "import { Node } from './node';\nexport interface Edge { from: Node; to: Node }"),
        ]);
        let module = analysis.modules.open(&dir.path().join("a.ts")).expect("open");
        resolve_alias(&mut analysis, &module, "Root");
        assert!(analysis.types.is_rendered("Node"));
        assert!(analysis.types.is_rendered("Edge"));
        assert_eq!(analysis.types.rendered().count(), 2);
    }

    #[test]
    fn import_cycles_without_declaration_end_external() {
        let (mut analysis, dir) = analysis_with(&[
            ("a.ts", "import { Ghost } from './b';\ntype Root = Ghost;"),
            ("b.ts", "import { Ghost } from './a';\nexport const x = 1;"),
        ]);
        let module = analysis.modules.open(&dir.path().join("a.ts")).expect("open");
        resolve_alias(&mut analysis, &module, "Root");
        assert_eq!(analysis.types.status("Ghost"), Some(TypeStatus::External));
    }

    #[test]
    fn opaque_types_render_unknown() {
        let (mut analysis, dir) = analysis_with(&[("a.ts", "type Root = keyof Foo | Array<string>;")]);
        let module = analysis.modules.open(&dir.path().join("a.ts")).expect("open");
        let (text, _) = resolve_alias(&mut analysis, &module, "Root");
        assert_eq!(text, "unknown | Array<string>");
        // Array is ambient: no diagnostic
        assert!(matches!(analysis.diagnostics.items(), [Diagnostic::UnsupportedType { .. }]));
    }
}
