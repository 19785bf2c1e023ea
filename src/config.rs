//! `samgen.json` and the compiler configuration it points at.
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::path_de::from_str_with_path;

pub const CONFIG_FILE: &str = "samgen.json";
const DEFAULT_TEMPLATE: &str = "template.yaml";
/// Substituted for the *template* when `tsconfig` is unset.
const UNSET_COMPILER_TEMPLATE: &str = "tsconfig.yaml";

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    tsconfig: Option<String>,
    #[serde(default)]
    output: Option<String>,
}

/// Resolved configuration; every path is absolute under the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub root: PathBuf,
    pub template: PathBuf,
    pub tsconfig: Option<PathBuf>,
    pub output: PathBuf,
}

impl Config {
    /// Load `samgen.json` from `root`. Checks run in a fixed order: output
    /// configured, template present, compiler configuration present.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let file = root.join(CONFIG_FILE);
        if !file.is_file() {
            return Err(ConfigError::NotFound { what: "configuration", path: PathBuf::from(CONFIG_FILE) });
        }
        let text = std::fs::read_to_string(&file).map_err(|source| ConfigError::Read { path: file.clone(), source })?;
        let raw: RawConfig = from_str_with_path(&file, &text)?;
        Self::resolve(root, raw)
    }

    fn resolve(root: &Path, raw: RawConfig) -> Result<Self, ConfigError> {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());
        let tsconfig = present(raw.tsconfig);
        let mut template = present(raw.template).unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
        if tsconfig.is_none() {
            template = UNSET_COMPILER_TEMPLATE.to_string();
        }
        let output = present(raw.output).ok_or(ConfigError::MissingOutput)?;

        let template_path = root.join(&template);
        if !template_path.is_file() {
            return Err(ConfigError::NotFound { what: "deployment descriptor", path: PathBuf::from(template) });
        }
        let tsconfig = tsconfig.ok_or(ConfigError::MissingCompilerConfig)?;
        let tsconfig_path = root.join(&tsconfig);
        if !tsconfig_path.is_file() {
            return Err(ConfigError::NotFound { what: "compiler configuration", path: PathBuf::from(tsconfig) });
        }

        let config = Self {
            root: root.to_path_buf(),
            template: template_path,
            tsconfig: Some(tsconfig_path),
            output: root.join(output),
        };
        debug!(?config, "loaded configuration");
        Ok(config)
    }
}

/// The two compiler options that feed build defaults. Any JSON value is
/// accepted and passed through.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompilerOptions {
    #[serde(default)]
    pub target: Option<serde_json::Value>,
    #[serde(default, rename = "sourceMap")]
    pub source_map: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct CompilerConfig {
    #[serde(default, rename = "compilerOptions")]
    compiler_options: Option<CompilerOptions>,
}

impl CompilerOptions {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: CompilerConfig = from_str_with_path(path, &text)?;
        Ok(config.compiler_options.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).expect("write fixture");
        }
        dir
    }

    #[test]
    fn loads_full_configuration() {
        let dir = project(&[
            (CONFIG_FILE, r#"{ "tsconfig": "tsconfig.json", "output": "client/src" }"#),
            ("template.yaml", "Resources: {}\n"),
            ("tsconfig.json", r#"{ "compilerOptions": { "target": "es2019", "sourceMap": true, "strict": true } }"#),
        ]);
        let config = Config::load(dir.path()).expect("loads");
        assert_eq!(config.template, dir.path().join("template.yaml"));
        assert_eq!(config.output, dir.path().join("client/src"));

        let options = CompilerOptions::load(config.tsconfig.as_deref().expect("set")).expect("compiler options");
        assert_eq!(options.target, Some(serde_json::json!("es2019")));
        assert_eq!(options.source_map, Some(serde_json::json!(true)));
    }

    #[test]
    fn missing_file_and_output() {
        let dir = project(&[]);
        assert!(matches!(Config::load(dir.path()), Err(ConfigError::NotFound { what: "configuration", .. })));

        let dir = project(&[(CONFIG_FILE, r#"{ "tsconfig": "tsconfig.json", "output": "" }"#)]);
        assert!(matches!(Config::load(dir.path()), Err(ConfigError::MissingOutput)));
    }

    #[test]
    fn output_is_checked_before_template() {
        let dir = project(&[(CONFIG_FILE, r#"{ "template": "missing.yaml" }"#)]);
        assert!(matches!(Config::load(dir.path()), Err(ConfigError::MissingOutput)));
    }

    #[test]
    fn unset_tsconfig_replaces_template_path() {
        let dir = project(&[(CONFIG_FILE, r#"{ "output": "out" }"#), ("template.yaml", "")]);
        match Config::load(dir.path()) {
            Err(ConfigError::NotFound { path, .. }) => assert_eq!(path, PathBuf::from("tsconfig.yaml")),
            other => panic!("unexpected: {other:?}"),
        }

        let dir = project(&[(CONFIG_FILE, r#"{ "output": "out" }"#), ("tsconfig.yaml", "")]);
        assert!(matches!(Config::load(dir.path()), Err(ConfigError::MissingCompilerConfig)));
    }

    #[test]
    fn type_errors_name_the_key() {
        let dir = project(&[(CONFIG_FILE, r#"{ "output": 5 }"#)]);
        match Config::load(dir.path()) {
            Err(ConfigError::Invalid { message, .. }) => assert!(message.contains("output"), "{message}"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn compiler_options_default_when_absent() {
        let dir = project(&[("tsconfig.json", "{}")]);
        let options = CompilerOptions::load(&dir.path().join("tsconfig.json")).expect("loads");
        assert_eq!(options, CompilerOptions::default());
    }
}
