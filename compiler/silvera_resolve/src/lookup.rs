//! Name lookup across modules.
//!
//! A dotted name is fully qualified and looked up directly. A simple name is
//! looked up in its own module first, then in every module reachable through
//! imports. More than one match through imports is ambiguous.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use silvera_ir::{split_fqn, DeclId, DeclKind, Model, ModuleId, Symbol};

use crate::{Location, ResolveError};

/// Find the declaration `symbol` names, as seen from `module`.
pub fn lookup(model: &Model, module: ModuleId, symbol: &Symbol) -> Result<DeclId, ResolveError> {
    let unresolved = || ResolveError::UnresolvedReference {
        name: symbol.name.clone(),
        at: Location::in_module(model, module, symbol.span),
    };

    if symbol.is_qualified() {
        let (path, name) = split_fqn(&symbol.name).ok_or_else(unresolved)?;
        return model
            .module_by_path(&path)
            .and_then(|m| model.decl_by_name(m, name))
            .ok_or_else(unresolved);
    }

    if let Some(local) = model.decl_by_name(module, &symbol.name) {
        return Ok(local);
    }

    let mut found = Vec::new();
    for imported in reachable_imports(model, module) {
        if let Some(id) = model.decl_by_name(imported, &symbol.name) {
            found.push(id);
        }
    }

    match found.as_slice() {
        [] => Err(unresolved()),
        [single] => Ok(*single),
        _ => Err(ResolveError::AmbiguousReference {
            name: symbol.name.clone(),
            candidates: found
                .iter()
                .map(|&id| model.module(model.decl(id).module).path.clone())
                .collect(),
            at: Location::in_module(model, module, symbol.span),
        }),
    }
}

/// Modules reachable through imports, breadth first, excluding `module`.
///
/// Imports of modules that were never loaded are skipped; the module graph
/// reports them.
fn reachable_imports(model: &Model, module: ModuleId) -> Vec<ModuleId> {
    let mut visited = FxHashSet::default();
    visited.insert(module);
    let mut queue = VecDeque::from([module]);
    let mut reachable = Vec::new();

    while let Some(current) = queue.pop_front() {
        for import in &model.module(current).imports {
            let Some(target) = model.module_by_path(&import.module_path()) else {
                continue;
            };
            if visited.insert(target) {
                reachable.push(target);
                queue.push_back(target);
            }
        }
    }
    reachable
}

/// [`lookup`], then require a particular declaration kind.
pub(crate) fn lookup_kind(
    model: &Model,
    module: ModuleId,
    symbol: &Symbol,
    expected: &'static str,
    accepts: fn(&DeclKind) -> bool,
) -> Result<DeclId, ResolveError> {
    let id = lookup(model, module, symbol)?;
    let kind = &model.decl(id).kind;
    if accepts(kind) {
        Ok(id)
    } else {
        Err(ResolveError::WrongKind {
            name: symbol.name.clone(),
            expected,
            found: kind.describe(),
            at: Location::in_module(model, module, symbol.span),
        })
    }
}

pub(crate) fn lookup_service(
    model: &Model,
    module: ModuleId,
    symbol: &Symbol,
) -> Result<DeclId, ResolveError> {
    lookup_kind(model, module, symbol, "service", |k| {
        matches!(k, DeclKind::Service(_))
    })
}

pub(crate) fn lookup_config_server(
    model: &Model,
    module: ModuleId,
    symbol: &Symbol,
) -> Result<DeclId, ResolveError> {
    lookup_kind(model, module, symbol, "config server", |k| {
        matches!(k, DeclKind::ConfigServer(_))
    })
}

pub(crate) fn lookup_registry(
    model: &Model,
    module: ModuleId,
    symbol: &Symbol,
) -> Result<DeclId, ResolveError> {
    lookup_kind(model, module, symbol, "service registry", |k| {
        matches!(k, DeclKind::ServiceRegistry(_))
    })
}
