use std::path::Path;

use crate::cache::ModuleCache;
use crate::error::{Diagnostics, ParseError};
use crate::ir::FunctionDescriptor;
use crate::resolve::TypeTable;

/// State of one run: parsed modules, the type arena, collected descriptors.
#[derive(Debug, Default)]
pub struct Analysis {
    pub modules: ModuleCache,
    pub types: TypeTable,
    pub diagnostics: Diagnostics,
    pub functions: Vec<FunctionDescriptor>,
}

impl Analysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `path` (or reuse it) and extract every handler it exports.
    pub fn analyze_file(&mut self, path: &Path) -> Result<(), ParseError> {
        let module = self.modules.open(path)?;
        self.extract_module(&module)
    }

    pub fn analyze_files<'a>(&mut self, paths: impl IntoIterator<Item = &'a Path>) -> Result<(), ParseError> {
        for path in paths {
            self.analyze_file(path)?;
        }
        Ok(())
    }
}
