//! One full regeneration: configuration, discovery, analysis, then every
//! artifact rendered in memory before anything on disk is touched.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::analysis::Analysis;
use crate::codegen::{self, BuildDefaults, DescriptorDocument, OutputFile};
use crate::config::{CompilerOptions, Config};
use crate::discover::discover_sources;
use crate::error::{ConfigError, Diagnostic, Error, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Analyse and report without writing anything.
    pub no_op: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSummary {
    pub name: String,
    pub route: Option<(String, String)>,
}

/// What a run found and produced.
#[derive(Debug)]
pub struct Report {
    pub template: PathBuf,
    pub output: PathBuf,
    pub sources: usize,
    pub functions: Vec<FunctionSummary>,
    /// Generated file names, relative to `output`.
    pub files: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub written: bool,
}

/// Everything a run would write, kept in memory.
#[derive(Debug)]
pub struct Artifacts {
    pub descriptor: String,
    pub files: Vec<OutputFile>,
}

pub fn run(cwd: &Path, options: RunOptions) -> Result<Report> {
    let root = cwd.canonicalize().map_err(|source| ConfigError::Read { path: cwd.to_path_buf(), source })?;
    let config = Config::load(&root)?;
    let compiler = match &config.tsconfig {
        Some(path) => CompilerOptions::load(path)?,
        None => return Err(ConfigError::MissingCompilerConfig.into()),
    };
    let output = config.output.canonicalize().unwrap_or_else(|_| config.output.clone());
    let mut descriptor = DescriptorDocument::load(&config.template)?;

    let sources = discover_sources(&root, &output)?;
    let mut analysis = Analysis::new();
    analysis.analyze_files(sources.iter().map(PathBuf::as_path))?;
    info!(
        sources = sources.len(),
        functions = analysis.functions.len(),
        types = analysis.types.rendered().count(),
        "analysis complete"
    );

    let artifacts = render(&analysis, &mut descriptor, &root, &BuildDefaults::from_compiler_options(&compiler))?;

    if !options.no_op {
        write_outputs(&output, &artifacts.files)?;
        fs::write(&config.template, &artifacts.descriptor)
            .map_err(|source| Error::Io { path: config.template.clone(), source })?;
        info!(output = %output.display(), files = artifacts.files.len(), "outputs written");
    }

    Ok(Report {
        template: config.template,
        output,
        sources: sources.len(),
        functions: analysis
            .functions
            .iter()
            .map(|f| FunctionSummary {
                name: f.name.clone(),
                route: f.http_route().map(|(m, p)| (m.to_string(), p.to_string())),
            })
            .collect(),
        files: artifacts.files.into_iter().map(|f| f.name).collect(),
        diagnostics: analysis.diagnostics.into_vec(),
        written: !options.no_op,
    })
}

/// Merge the descriptor and generate every output file.
pub fn render(
    analysis: &Analysis,
    descriptor: &mut DescriptorDocument,
    root: &Path,
    defaults: &BuildDefaults,
) -> Result<Artifacts> {
    descriptor.merge(&analysis.functions, root, defaults)?;
    let descriptor = descriptor.to_yaml_string()?;

    let mut files = codegen::types::emit_types(&analysis.types);
    files.push(codegen::client::emit_client(&analysis.functions, &analysis.types));
    files.push(codegen::barrel::emit_token());
    files.push(codegen::barrel::emit_index(&analysis.functions, &analysis.types));
    files.push(codegen::barrel::emit_module());
    Ok(Artifacts { descriptor, files })
}

/// Create `output`, drop the `.ts` files directly inside it, write `files`.
fn write_outputs(output: &Path, files: &[OutputFile]) -> Result<()> {
    let io = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| Error::Io { path, source }
    };
    fs::create_dir_all(output).map_err(io(output))?;

    for entry in fs::read_dir(output).map_err(io(output))? {
        let path = entry.map_err(io(output))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "ts") {
            debug!(file = %path.display(), "removing stale output");
            fs::remove_file(&path).map_err(io(&path))?;
        }
    }

    for file in files {
        let path = output.join(&file.name);
        fs::write(&path, &file.contents).map_err(io(&path))?;
    }
    Ok(())
}
