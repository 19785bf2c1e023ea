//! Declaration → standalone declaration text.
use std::rc::Rc;

use indexmap::IndexSet;

use crate::analysis::Analysis;
use crate::cache::{Declaration, SourceModule};
use crate::error::ParseError;
use crate::syntax::ast::{
    ClassDecl, ClassMember, EnumDecl, Expr, HeritageType, InterfaceDecl, TypeAliasDecl, TypeNode, TypeParam,
};

const INDENT: &str = "    ";

impl Analysis {
    pub(super) fn render_declaration(
        &mut self,
        decl: &Declaration,
        module: &Rc<SourceModule>,
        refs: &mut IndexSet<String>,
    ) -> Result<String, ParseError> {
        let scope: Vec<String> = decl.type_params().iter().map(|p| p.name.clone()).collect();
        match decl {
            Declaration::Interface(d) => self.render_interface(d, module, &scope, refs),
            Declaration::Class(d) => self.render_class(d, module, &scope, refs),
            Declaration::Enum(d) => Ok(render_enum(d)),
            Declaration::TypeAlias(d) => self.render_alias(d, module, &scope, refs),
        }
    }

    fn render_interface(
        &mut self,
        decl: &InterfaceDecl,
        module: &Rc<SourceModule>,
        scope: &[String],
        refs: &mut IndexSet<String>,
    ) -> Result<String, ParseError> {
        let header = self.render_header(&decl.name, &decl.type_params, decl.extends.iter(), module, scope, refs)?;
        let mut lines = Vec::new();
        for member in &decl.members {
            if let Some(line) = self.render_type_member(member, module, scope, refs)? {
                lines.push(line);
            }
        }
        Ok(body(header, lines))
    }

    /// Classes are emitted as interfaces over their data members.
    fn render_class(
        &mut self,
        decl: &ClassDecl,
        module: &Rc<SourceModule>,
        scope: &[String],
        refs: &mut IndexSet<String>,
    ) -> Result<String, ParseError> {
        let header = self.render_header(&decl.name, &decl.type_params, decl.heritage(), module, scope, refs)?;
        let mut lines = Vec::new();
        for member in &decl.members {
            match member {
                ClassMember::Property(prop) if !prop.is_static && !prop.name.starts_with('#') => {
                    let ty = self.render_optional(prop.ty.as_ref(), module, scope, refs)?;
                    let mark = if prop.optional { "?" } else { "" };
                    lines.push(format!("{}{mark}: {ty};", super::property_name(&prop.name)));
                }
                ClassMember::Constructor(params) => {
                    for param in params.iter().filter(|p| p.property) {
                        let ty = self.render_optional(param.ty.as_ref(), module, scope, refs)?;
                        let mark = if param.optional { "?" } else { "" };
                        lines.push(format!("{}{mark}: {ty};", param.name));
                    }
                }
                ClassMember::Index(index) => {
                    let key = self.resolve_type(&index.key_type, module, scope, refs)?;
                    let value = self.resolve_type(&index.ty, module, scope, refs)?;
                    lines.push(format!("[{}: {key}]: {value};", index.key_name));
                }
                _ => {}
            }
        }
        Ok(body(header, lines))
    }

    fn render_alias(
        &mut self,
        decl: &TypeAliasDecl,
        module: &Rc<SourceModule>,
        scope: &[String],
        refs: &mut IndexSet<String>,
    ) -> Result<String, ParseError> {
        let params = self.render_type_params(&decl.type_params, module, scope, refs)?;
        let ty = self.resolve_type(&decl.ty, module, scope, refs)?;
        Ok(format!("export type {}{params} = {ty};", decl.name))
    }

    fn render_header<'a>(
        &mut self,
        name: &str,
        type_params: &[TypeParam],
        heritage: impl Iterator<Item = &'a HeritageType>,
        module: &Rc<SourceModule>,
        scope: &[String],
        refs: &mut IndexSet<String>,
    ) -> Result<String, ParseError> {
        let params = self.render_type_params(type_params, module, scope, refs)?;
        let mut parents = Vec::new();
        for parent in heritage {
            let reference = TypeNode::Reference { name: parent.name.clone(), args: parent.type_args.clone() };
            parents.push(self.resolve_type(&reference, module, scope, refs)?);
        }
        let extends = if parents.is_empty() { String::new() } else { format!(" extends {}", parents.join(", ")) };
        Ok(format!("export interface {name}{params}{extends} {{"))
    }

    fn render_type_params(
        &mut self,
        params: &[TypeParam],
        module: &Rc<SourceModule>,
        scope: &[String],
        refs: &mut IndexSet<String>,
    ) -> Result<String, ParseError> {
        if params.is_empty() {
            return Ok(String::new());
        }
        let mut out = Vec::with_capacity(params.len());
        for param in params {
            let mut text = param.name.clone();
            if let Some(constraint) = &param.constraint {
                text.push_str(" extends ");
                text.push_str(&self.resolve_type(constraint, module, scope, refs)?);
            }
            if let Some(default) = &param.default {
                text.push_str(" = ");
                text.push_str(&self.resolve_type(default, module, scope, refs)?);
            }
            out.push(text);
        }
        Ok(format!("<{}>", out.join(", ")))
    }

    fn render_optional(
        &mut self,
        ty: Option<&TypeNode>,
        module: &Rc<SourceModule>,
        scope: &[String],
        refs: &mut IndexSet<String>,
    ) -> Result<String, ParseError> {
        match ty {
            Some(ty) => self.resolve_type(ty, module, scope, refs),
            None => Ok("any".to_string()),
        }
    }
}

fn body(header: String, lines: Vec<String>) -> String {
    let mut out = header;
    out.push('\n');
    for line in lines {
        out.push_str(INDENT);
        out.push_str(&line);
        out.push('\n');
    }
    out.push('}');
    out
}

fn render_enum(decl: &EnumDecl) -> String {
    let lines = decl
        .members
        .iter()
        .map(|member| {
            let name = super::property_name(&member.name);
            match &member.initializer {
                Some(Expr::Str(s)) => format!("{name} = {},", super::quote(s)),
                Some(Expr::Num(n)) => format!("{name} = {n},"),
                Some(Expr::Neg(inner)) => match inner.as_ref() {
                    Expr::Num(n) => format!("{name} = -{n},"),
                    _ => format!("{name},"),
                },
                _ => format!("{name},"),
            }
        })
        .collect();
    body(format!("export enum {} {{", decl.name), lines)
}
