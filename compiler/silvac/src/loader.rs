//! Project discovery and loading.
//!
//! A project is a directory tree of module descriptions, one JSON file per
//! module, named after the module with a `.json` suffix:
//!
//! ```text
//! shop/
//!   orders.si.json        -> module `orders.si`
//!   orders.si             -> its DSL text, shown in diagnostics (optional)
//!   share/setup.si.json   -> module `share/setup.si`
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use silvera_diagnostic::{Diagnostic, ErrorCode};
use silvera_ir::syntax::SourceModule;
use silvera_ir::{lower, LowerError, Model, MODULE_EXTENSION};

/// Suffix of a module description file.
pub const DESCRIPTION_SUFFIX: &str = ".si.json";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("`{}` is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("cannot read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{}` is not a valid module description: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Lower(#[from] LowerError),
}

impl LoadError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LoadError::NotADirectory(_) | LoadError::Io { .. } | LoadError::Json { .. } => {
                ErrorCode::E0006
            }
            LoadError::Lower(LowerError::DuplicateModule(_)) => ErrorCode::E0004,
            LoadError::Lower(_) => ErrorCode::E0005,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            LoadError::Lower(LowerError::UnknownClassifier { module, span, .. })
            | LoadError::Lower(LowerError::IncompleteCrudEvent { module, span, .. }) => {
                diag.with_label_in(module.clone(), *span, "declared here")
            }
            LoadError::Lower(LowerError::TypeSyntax { module, error }) => {
                diag.with_label_in(module.clone(), error.span, error.reason.clone())
            }
            _ => diag,
        }
    }
}

/// A loaded project: its root and the modules found under it.
#[derive(Clone, Debug)]
pub struct Project {
    pub root: PathBuf,
    pub modules: Vec<SourceModule>,
}

impl Project {
    pub fn lower(self) -> Result<Model, LoadError> {
        Ok(lower(self.modules)?)
    }
}

/// All module description files under `root`, sorted by path.
pub fn discover_modules(root: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !root.is_dir() {
        return Err(LoadError::NotADirectory(root.to_path_buf()));
    }
    let mut files = Vec::new();
    discover_recursive(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn discover_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            if matches!(name, "target" | "node_modules") {
                continue;
            }
            discover_recursive(&path, files)?;
        } else if name.ends_with(DESCRIPTION_SUFFIX) {
            files.push(path);
        }
    }
    Ok(())
}

/// Module path of a description file: relative to `root`, `/`-separated,
/// without the `.json` suffix.
pub fn module_path(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    let joined = parts.join("/");
    let path = joined.strip_suffix(".json")?;
    path.ends_with(MODULE_EXTENSION).then(|| path.to_string())
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load one description file.
///
/// When the description carries no source text and a sibling DSL file
/// exists, its text is attached for diagnostics.
pub fn load_module(root: &Path, file: &Path) -> Result<SourceModule, LoadError> {
    let text = read(file)?;
    let mut module: SourceModule = serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: file.to_path_buf(),
        source,
    })?;

    if let Some(path) = module_path(root, file) {
        module.path = path;
    }
    if module.source.is_empty() {
        let dsl = file.with_extension("");
        if dsl.is_file() {
            module.source = read(&dsl)?;
        }
    }
    tracing::trace!(module = %module.path, decls = module.decls.len(), "loaded module");
    Ok(module)
}

#[tracing::instrument(level = "debug", skip_all, fields(root = %root.display()))]
pub fn load_project(root: &Path) -> Result<Project, LoadError> {
    let files = discover_modules(root)?;
    let modules = files
        .iter()
        .map(|file| load_module(root, file))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(modules = modules.len(), "loaded project");
    Ok(Project {
        root: root.to_path_buf(),
        modules,
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
