//! Metadata Extractor: exported `new Handler().handler` bindings whose class
//! carries `@LambdaFunction(...)` become `FunctionDescriptor`s.
use std::rc::Rc;

use indexmap::IndexSet;
use tracing::{debug, info};

use crate::analysis::Analysis;
use crate::cache::SourceModule;
use crate::error::{Diagnostic, ParseError};
use crate::ir::{FunctionDescriptor, ParamBinding, ParamSource};
use crate::literal::{LiteralValue, evaluate};
use crate::syntax::ast::{ClassDecl, Expr, TypeNode};

const LAMBDA_DECORATOR: &str = "LambdaFunction";
const ENTRY_METHOD: &str = "handle";
const HANDLER_SUFFIX: &str = "Handler";
const HTTP_EVENT_TYPES: &[&str] = &["Api", "HttpApi"];

impl Analysis {
    pub fn extract_module(&mut self, module: &Rc<SourceModule>) -> Result<(), ParseError> {
        let _span = tracing::debug_span!("extract", module = %module.path.display()).entered();

        for binding in &module.bindings {
            let Some(class_name) = binding.initializer.as_ref().and_then(instantiated_class) else {
                continue;
            };
            let Some(class) = module.class(class_name) else { continue };
            if module.attributes.class_attribute(&class.name, LAMBDA_DECORATOR).is_none() {
                continue;
            }
            if let Some(descriptor) = self.describe(module, class, &binding.name)? {
                info!(
                    function = %descriptor.name,
                    method = descriptor.http_method.as_deref().unwrap_or("-"),
                    path = descriptor.http_path.as_deref().unwrap_or("-"),
                    "found function"
                );
                self.functions.push(descriptor);
            }
        }
        Ok(())
    }

    fn describe(
        &mut self,
        module: &Rc<SourceModule>,
        class: &ClassDecl,
        handler_export: &str,
    ) -> Result<Option<FunctionDescriptor>, ParseError> {
        let metadata = match module
            .attributes
            .class_attribute(&class.name, LAMBDA_DECORATOR)
            .and_then(|attr| attr.arguments.first())
        {
            Some(argument) => evaluate(argument, &module.path, &mut self.diagnostics),
            None => {
                self.diagnostics.push(Diagnostic::MissingMetadata {
                    module: module.path.clone(),
                    class: class.name.clone(),
                });
                LiteralValue::Unknown(String::new())
            }
        };

        let (http_method, http_path) = self.http_trigger(module, class, &metadata);

        let Some(method) = class.method(ENTRY_METHOD) else {
            self.diagnostics.push(Diagnostic::MissingEntryPoint {
                module: module.path.clone(),
                class: class.name.clone(),
            });
            return Ok(None);
        };

        let scope: Vec<String> =
            class.type_params.iter().chain(method.type_params.iter()).map(|p| p.name.clone()).collect();
        let mut references = IndexSet::new();

        let mut parameters = Vec::with_capacity(method.params.len());
        for (index, param) in method.params.iter().enumerate() {
            let binding = module
                .attributes
                .on_parameter(&class.name, ENTRY_METHOD, index)
                .find_map(|attr| ParamSource::from_decorator(&attr.name).map(|source| (source, attr)));
            let (source, key) = match binding {
                Some((source, attr)) => {
                    let key = match attr.arguments.first() {
                        Some(Expr::Str(key)) if !key.is_empty() => key.clone(),
                        _ => param.name.clone(),
                    };
                    (source, key)
                }
                None => (ParamSource::Query, param.name.clone()),
            };
            let ty = match &param.ty {
                Some(ty) => self.resolve_type(ty, module, &scope, &mut references)?,
                None => "any".to_string(),
            };
            parameters.push(ParamBinding { source, key, name: param.name.clone(), ty });
        }

        let mut return_type = "any".to_string();
        let handler_base = class
            .heritage()
            .find(|h| h.name.name.ends_with(HANDLER_SUFFIX) && !h.type_args.is_empty());
        if let Some(base) = handler_base {
            let ty: &TypeNode = &base.type_args[0];
            return_type = self.resolve_type(ty, module, &scope, &mut references)?;
        }

        debug!(class = %class.name, params = parameters.len(), %return_type, "described handler");

        Ok(Some(FunctionDescriptor {
            name: class.name.clone(),
            source_path: module.path.clone(),
            handler_export: handler_export.to_string(),
            metadata,
            parameters,
            return_type,
            http_method,
            http_path,
            references,
        }))
    }

    /// Path and method of the HTTP event; the last one declared wins.
    fn http_trigger(
        &mut self,
        module: &Rc<SourceModule>,
        class: &ClassDecl,
        metadata: &LiteralValue,
    ) -> (Option<String>, Option<String>) {
        let Some(events) = metadata.path(&["Properties", "Events"]).and_then(LiteralValue::as_object) else {
            return (None, None);
        };

        let http_events: Vec<&LiteralValue> = events
            .values()
            .filter(|event| {
                event
                    .get("Type")
                    .and_then(LiteralValue::as_str)
                    .is_some_and(|kind| HTTP_EVENT_TYPES.contains(&kind))
            })
            .collect();

        if http_events.len() > 1 {
            self.diagnostics.push(Diagnostic::AmbiguousHttpTrigger {
                module: module.path.clone(),
                class: class.name.clone(),
                count: http_events.len(),
            });
        }

        let Some(event) = http_events.last() else { return (None, None) };
        let field = |key: &str| event.path(&["Properties", key]).and_then(LiteralValue::as_str).map(str::to_string);
        (field("Method"), field("Path"))
    }
}

/// `new C(..).member` or `new C(..)(..)` → `C`.
fn instantiated_class(expr: &Expr) -> Option<&str> {
    let instance = match expr {
        Expr::Member { object, .. } => object.as_ref(),
        Expr::Call { callee, .. } => callee.as_ref(),
        _ => return None,
    };
    match instance {
        Expr::New { callee, .. } => match callee.as_ref() {
            Expr::Ident(name) => Some(name.as_str()),
            _ => None,
        },
        _ => None,
    }
}
