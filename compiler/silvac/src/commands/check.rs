//! The `check` command: load and resolve a project.

use std::fmt;
use std::io::Write;

use silvera_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use silvera_diagnostic::span_utils::SourceMap;
use silvera_diagnostic::Diagnostic;
use silvera_ir::{Model, ModuleId};
use silvera_resolve::{resolve_with, ResolvedModel};

use crate::loader::load_project;
use crate::options::CheckArgs;

/// Counts for one resolved module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleSummary {
    pub path: String,
    pub services: usize,
    pub functions: usize,
    pub dependency_clones: usize,
}

impl ModuleSummary {
    fn of(model: &Model, module: ModuleId) -> Self {
        let m = model.module(module);
        let mut summary = ModuleSummary {
            path: m.path.clone(),
            services: 0,
            functions: 0,
            dependency_clones: 0,
        };
        for service in m.decls.iter().filter_map(|&d| model.service(d)) {
            summary.services += 1;
            summary.functions += service.api.functions.len() + service.api.internal.len();
            summary.dependency_clones += service.dep_functions.len();
        }
        summary
    }
}

impl fmt::Display for ModuleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OK: {} ({} services, {} functions, {} dependency clones)",
            self.path, self.services, self.functions, self.dependency_clones
        )
    }
}

/// A failed check: the diagnostic, plus the sources needed to place it.
#[derive(Debug)]
pub struct CheckFailure {
    pub diagnostic: Diagnostic,
    pub sources: SourceMap,
}

impl CheckFailure {
    /// Render the diagnostic with `path:line:col` locations.
    pub fn render<W: Write>(&self, writer: W, colors: ColorMode, is_tty: bool) -> W {
        let mut emitter =
            TerminalEmitter::with_color_mode(writer, colors, is_tty).with_sources(&self.sources);
        emitter.emit(&self.diagnostic);
        emitter.flush();
        emitter.into_inner()
    }
}

/// Load and resolve the project named by `args`.
pub fn check_project(args: &CheckArgs) -> Result<(ResolvedModel, Vec<ModuleSummary>), CheckFailure> {
    let project = load_project(&args.project).map_err(|e| CheckFailure {
        diagnostic: e.to_diagnostic(),
        sources: SourceMap::new(),
    })?;

    let mut sources = SourceMap::new();
    for module in &project.modules {
        sources.add(module.path.clone(), module.source.clone());
    }

    let model = match project.lower() {
        Ok(model) => model,
        Err(e) => {
            return Err(CheckFailure {
                diagnostic: e.to_diagnostic(),
                sources,
            })
        }
    };
    let resolved = match resolve_with(model, &args.options) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::debug!(code = %e.code(), "resolution failed");
            return Err(CheckFailure {
                diagnostic: e.to_diagnostic(),
                sources,
            });
        }
    };

    let summaries = resolved
        .modules()
        .map(|(id, _)| ModuleSummary::of(&resolved, id))
        .collect();
    Ok((resolved, summaries))
}

/// Run `check`, print the outcome, and return the process exit code.
pub fn run_check(args: &CheckArgs) -> i32 {
    match check_project(args) {
        Ok((_, summaries)) => {
            for summary in &summaries {
                println!("{summary}");
            }
            0
        }
        Err(failure) => {
            let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
            failure.render(std::io::stderr(), ColorMode::Auto, is_tty);
            1
        }
    }
}
