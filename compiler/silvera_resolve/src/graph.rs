//! Module import graph and resolution order.
//!
//! Modules are resolved dependencies first. Kahn's algorithm over the import
//! edges yields importers before the modules they import; reversing that
//! order gives the resolution order.
//!
//! ```text
//! app.si ──imports──▶ orders.si ──imports──▶ share/setup.si
//!
//! Kahn order:       app, orders, share/setup
//! resolution order: share/setup, orders, app
//! ```

use std::collections::VecDeque;

use silvera_ir::{Model, ModuleId};

use crate::{Location, ResolveError};

/// Import edges between the modules of a model.
#[derive(Clone, Debug)]
pub struct ModuleGraph {
    /// Imports of each module, indexed by module, in import order.
    imports: Vec<Vec<ModuleId>>,
}

impl ModuleGraph {
    /// Build the graph, failing on imports of modules that were not loaded.
    #[tracing::instrument(level = "debug", skip_all, fields(modules = model.module_count()))]
    pub fn build(model: &Model) -> Result<Self, ResolveError> {
        let mut imports = Vec::with_capacity(model.module_count());
        for (id, module) in model.modules() {
            let mut edges = Vec::with_capacity(module.imports.len());
            for import in &module.imports {
                let path = import.module_path();
                let Some(target) = model.module_by_path(&path) else {
                    return Err(ResolveError::ModuleNotFound {
                        path,
                        at: Location::in_module(model, id, import.span),
                    });
                };
                edges.push(target);
            }
            imports.push(edges);
        }
        Ok(ModuleGraph { imports })
    }

    /// Build directly from edge lists.
    pub fn from_edges(imports: Vec<Vec<ModuleId>>) -> Self {
        ModuleGraph { imports }
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    pub fn imports(&self, module: ModuleId) -> &[ModuleId] {
        &self.imports[module.index()]
    }

    /// Kahn order: every module precedes the modules it imports.
    ///
    /// Ties are broken by load order. Returns the modules that could not be
    /// ordered if the graph has a cycle.
    pub fn topological_order(&self) -> Result<Vec<ModuleId>, Vec<ModuleId>> {
        // In-degree here counts importers: a module is ready once nothing
        // still waiting imports it.
        let mut in_degree = vec![0usize; self.imports.len()];
        for edges in &self.imports {
            for target in edges {
                in_degree[target.index()] += 1;
            }
        }

        let mut queue: VecDeque<ModuleId> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(i, _)| module_id(i))
            .collect();

        let mut order = Vec::with_capacity(self.imports.len());
        while let Some(module) = queue.pop_front() {
            order.push(module);
            for target in &self.imports[module.index()] {
                let degree = &mut in_degree[target.index()];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*target);
                }
            }
        }

        if order.len() == self.imports.len() {
            Ok(order)
        } else {
            Err(in_degree
                .iter()
                .enumerate()
                .filter(|(_, &degree)| degree > 0)
                .map(|(i, _)| module_id(i))
                .collect())
        }
    }

    /// Dependencies-first order, or a cycle error naming the stuck modules.
    pub fn resolution_order(&self, model: &Model) -> Result<Vec<ModuleId>, ResolveError> {
        match self.topological_order() {
            Ok(mut order) => {
                order.reverse();
                Ok(order)
            }
            Err(stuck) => Err(ResolveError::CyclicImport {
                modules: stuck
                    .into_iter()
                    .map(|m| model.module(m).path.clone())
                    .collect(),
            }),
        }
    }
}

fn module_id(index: usize) -> ModuleId {
    ModuleId::new(u32::try_from(index).unwrap_or(u32::MAX))
}
