// Shared fact base the generators consume. Built by the extractor.
use std::path::PathBuf;

use indexmap::IndexSet;

use crate::literal::LiteralValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    Body,
    Query,
    Path,
}

impl ParamSource {
    pub fn from_decorator(name: &str) -> Option<Self> {
        match name {
            "FromBody" => Some(Self::Body),
            "FromQuery" => Some(Self::Query),
            "FromPath" => Some(Self::Path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamBinding {
    pub source: ParamSource,
    /// Wire name: query key or path placeholder. Defaults to `name`.
    pub key: String,
    pub name: String,
    /// Rendered type text.
    pub ty: String,
}

#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    /// Handler class name; unique key in the deployment descriptor.
    pub name: String,
    pub source_path: PathBuf,
    /// Exported binding holding the runtime handler, e.g. `handler`.
    pub handler_export: String,
    pub metadata: LiteralValue,
    pub parameters: Vec<ParamBinding>,
    pub return_type: String,
    pub http_method: Option<String>,
    pub http_path: Option<String>,
    /// Named types referenced by parameters and return type, first-seen order.
    pub references: IndexSet<String>,
}

impl FunctionDescriptor {
    /// HTTP method and path, when the function has an HTTP trigger.
    pub fn http_route(&self) -> Option<(&str, &str)> {
        Some((self.http_method.as_deref()?, self.http_path.as_deref()?))
            .filter(|(method, path)| !method.is_empty() && !path.is_empty())
    }

    pub fn body_param(&self) -> Option<&ParamBinding> {
        self.parameters.iter().find(|p| p.source == ParamSource::Body)
    }

    pub fn params_from(&self, source: ParamSource) -> impl Iterator<Item = &ParamBinding> {
        self.parameters.iter().filter(move |p| p.source == source)
    }
}
