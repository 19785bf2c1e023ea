//! Source discovery: every `.ts` file under the project root.
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::Result;

/// Directory names never descended into.
pub const SKIPPED_DIRS: &[&str] = &["dist", "node_modules", ".aws", ".aws-sam"];

/// `**/*.ts` under `root` in glob order, minus skipped directories and
/// anything inside `output`.
pub fn discover_sources(root: &Path, output: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/**/*.ts", Pattern::escape(&root.to_string_lossy()));
    let options = MatchOptions { case_sensitive: true, require_literal_separator: true, require_literal_leading_dot: false };

    let mut out = Vec::new();
    for entry in glob::glob_with(&pattern, options)? {
        let path = entry?;
        if !path.is_file() || path.starts_with(output) || in_skipped_dir(&path, root) {
            continue;
        }
        out.push(path);
    }
    tracing::debug!(count = out.len(), root = %root.display(), "discovered source files");
    Ok(out)
}

fn in_skipped_dir(path: &Path, root: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let Some(dirs) = rel.parent() else { return false };
    dirs.components().any(|c| match c {
        Component::Normal(name) => name.to_str().is_some_and(|n| SKIPPED_DIRS.contains(&n)),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn skips_build_dirs_and_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        for file in [
            "src/a.ts",
            "src/nested/b.ts",
            "src/readme.md",
            "node_modules/pkg/index.ts",
            "dist/a.ts",
            ".aws-sam/build/a.ts",
            "client/api.service.ts",
            "lib/dist.ts",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            fs::write(path, "").expect("write");
        }

        let found = discover_sources(root, &root.join("client")).expect("walks");
        let rel: Vec<_> = found.iter().map(|p| p.strip_prefix(root).expect("under root").to_path_buf()).collect();
        assert_eq!(
            rel,
            [PathBuf::from("lib/dist.ts"), PathBuf::from("src/a.ts"), PathBuf::from("src/nested/b.ts")]
        );
    }
}
