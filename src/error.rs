use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ————————————————————————————————————————————————————————————————————————————
// FATAL
// ————————————————————————————————————————————————————————————————————————————

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No \"{}\" file found!", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    /// The compiler configuration was never set. Reported with its config key.
    #[error("No compiler configuration found: \"tsconfig\" is not configured")]
    MissingCompilerConfig,

    #[error("No output configured!")]
    MissingOutput,

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read source module {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}:{column}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("deployment descriptor {}: {source}", path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("deployment descriptor {}: {message}", path.display())]
    DescriptorShape { path: PathBuf, message: String },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid discovery pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to walk project tree: {0}")]
    Walk(#[from] glob::GlobError),
}

// ————————————————————————————————————————————————————————————————————————————
// NON-FATAL
// ————————————————————————————————————————————————————————————————————————————

/// Problems recorded while analysing; none of them stop the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    #[error("{}: unsupported literal `{excerpt}`, value dropped", module.display())]
    UnsupportedLiteral { module: PathBuf, excerpt: String },

    #[error("{}: unsupported type `{excerpt}`, rendered as unknown", module.display())]
    UnsupportedType { module: PathBuf, excerpt: String },

    #[error("{}: type `{name}` not resolved ({reason}), emitted as-is", module.display())]
    UnresolvedType { module: PathBuf, name: String, reason: String },

    #[error("{}: class `{class}` has no `handle` method, skipped", module.display())]
    MissingEntryPoint { module: PathBuf, class: String },

    #[error("{}: `@LambdaFunction` on `{class}` has no metadata argument", module.display())]
    MissingMetadata { module: PathBuf, class: String },

    #[error("{}: `{class}` declares {count} HTTP events, using the last one", module.display())]
    AmbiguousHttpTrigger { module: PathBuf, class: String, count: usize },
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{diagnostic}");
        self.items.push(diagnostic);
    }

    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
