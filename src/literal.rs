//! Literal syntax → closed `LiteralValue`, and `LiteralValue` → YAML.
use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::value::{Tag, TaggedValue};

use crate::error::{Diagnostic, Diagnostics};
use crate::syntax::ast::{Expr, ObjectMember};

const EXCERPT_MAX: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Bool(bool),
    Array(Vec<LiteralValue>),
    Object(IndexMap<String, LiteralValue>),
    /// Unsupported expression; carries a short excerpt of its source.
    Unknown(String),
}

impl LiteralValue {
    pub fn get(&self, key: &str) -> Option<&LiteralValue> {
        match self {
            LiteralValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn path(&self, keys: &[&str]) -> Option<&LiteralValue> {
        keys.iter().try_fold(self, |value, key| value.get(key))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, LiteralValue>> {
        match self {
            LiteralValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// YAML form. `Unknown` has none: it is dropped from mappings and becomes
    /// `null` in sequences.
    pub fn to_yaml(&self) -> Option<serde_yaml::Value> {
        use serde_yaml::Value;
        Some(match self {
            LiteralValue::String(s) => short_form_tag(s).unwrap_or_else(|| Value::String(s.clone())),
            LiteralValue::Number(n) => json_num_pref_i64(*n),
            LiteralValue::Bool(b) => Value::Bool(*b),
            LiteralValue::Array(items) => {
                Value::Sequence(items.iter().map(|v| v.to_yaml().unwrap_or(Value::Null)).collect())
            }
            LiteralValue::Object(map) => {
                let mut out = serde_yaml::Mapping::new();
                for (key, value) in map {
                    if let Some(value) = value.to_yaml() {
                        out.insert(Value::String(key.clone()), value);
                    }
                }
                Value::Mapping(out)
            }
            LiteralValue::Unknown(_) => return None,
        })
    }
}

/// Integral numbers are emitted as integers.
fn json_num_pref_i64(n: f64) -> serde_yaml::Value {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
        serde_yaml::Value::Number((n as i64).into())
    } else {
        serde_yaml::Value::Number(n.into())
    }
}

static SHORT_FORM_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!([A-Za-z][A-Za-z0-9:._-]*)(?:\s+(.*))?$").unwrap());

/// `"!Ref Bucket"` → `!Ref Bucket`.
fn short_form_tag(s: &str) -> Option<serde_yaml::Value> {
    let caps = SHORT_FORM_TAG.captures(s)?;
    let tag = caps.get(1)?.as_str();
    let rest = caps.get(2).map_or("", |m| m.as_str());
    Some(serde_yaml::Value::Tagged(Box::new(TaggedValue {
        tag: Tag::new(tag),
        value: serde_yaml::Value::String(rest.to_string()),
    })))
}

// ————————————————————————————————————————————————————————————————————————————
// EVALUATION
// ————————————————————————————————————————————————————————————————————————————

/// Evaluate literal syntax. Unsupported sub-expressions become `Unknown` and
/// are reported against `module`.
pub fn evaluate(expr: &Expr, module: &Path, diagnostics: &mut Diagnostics) -> LiteralValue {
    match expr {
        Expr::Object(members) => {
            let mut map = IndexMap::new();
            for member in members {
                match member {
                    ObjectMember::Property { key, value } => {
                        map.insert(key.clone(), evaluate(value, module, diagnostics));
                    }
                    ObjectMember::Shorthand(name) => {
                        map.insert(name.clone(), unsupported(name, module, diagnostics));
                    }
                    ObjectMember::Other(text) => {
                        unsupported(text, module, diagnostics);
                    }
                }
            }
            LiteralValue::Object(map)
        }
        Expr::Array(items) => {
            LiteralValue::Array(items.iter().map(|e| evaluate(e, module, diagnostics)).collect())
        }
        Expr::Str(s) => LiteralValue::String(s.clone()),
        Expr::Template { text, substitutions: false } => LiteralValue::String(text.clone()),
        Expr::Bool(b) => LiteralValue::Bool(*b),
        Expr::Num(text) => match parse_number(text) {
            Some(n) => LiteralValue::Number(n),
            None => unsupported(text, module, diagnostics),
        },
        Expr::Neg(inner) => match inner.as_ref() {
            Expr::Num(text) => match parse_number(text) {
                Some(n) => LiteralValue::Number(-n),
                None => unsupported(&expr.describe(), module, diagnostics),
            },
            _ => unsupported(&expr.describe(), module, diagnostics),
        },
        other => unsupported(&other.describe(), module, diagnostics),
    }
}

fn unsupported(excerpt: &str, module: &Path, diagnostics: &mut Diagnostics) -> LiteralValue {
    let excerpt = truncate(excerpt);
    diagnostics.push(Diagnostic::UnsupportedLiteral { module: module.to_path_buf(), excerpt: excerpt.clone() });
    LiteralValue::Unknown(excerpt)
}

fn truncate(text: &str) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= EXCERPT_MAX {
        return text;
    }
    let mut out: String = text.chars().take(EXCERPT_MAX).collect();
    out.push('…');
    out
}

/// Numeric literal text (decimal, hex, octal, binary, separators) → f64.
fn parse_number(text: &str) -> Option<f64> {
    let clean: String = text.chars().filter(|c| *c != '_').collect();
    let clean = clean.strip_suffix('n').unwrap_or(&clean);
    let radix = |prefix_len: usize, radix: u32| u64::from_str_radix(&clean[prefix_len..], radix).ok().map(|n| n as f64);
    match clean.get(..2) {
        Some("0x" | "0X") => radix(2, 16),
        Some("0o" | "0O") => radix(2, 8),
        Some("0b" | "0B") => radix(2, 2),
        _ => clean.parse::<f64>().ok(),
    }
}
