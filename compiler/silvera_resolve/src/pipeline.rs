//! Pass ordering.
//!
//! ```text
//! module graph ──▶ duplicate names ──▶ message catalog
//!      │
//!      ▼  for each phase, modules in resolution order
//! declarations ──▶ types + messaging ──▶ dependencies ──▶ REST
//! ```
//!
//! Each phase visits every module, imports first, before the next phase
//! starts. Later phases can therefore rely on anything an earlier phase
//! produced anywhere in the model, including modules reached by
//! fully-qualified name rather than import.
//!
//! Modules are not resolved one at a time. An imported module has finished a
//! phase before its importer enters that phase, but it has not finished later
//! phases. When the importer's declarations are resolved, for example, the
//! imported module's types are still unresolved. No pass looks at the result
//! of a later phase, so the resolved model is the same as one produced by
//! resolving each module completely before its importers.

use rustc_hash::FxHashMap;
use silvera_ir::{DeclId, DeclKind, Model, ModuleId};

use crate::defaults::PortAllocator;
use crate::graph::ModuleGraph;
use crate::rest::{strategy_for, RestResolver};
use crate::{messaging, Location, ResolveError, ResolveOptions};

/// Progress of inheritance linking for one service.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum LinkState {
    InProgress,
    Done,
}

/// Mutable state shared by the per-declaration passes.
pub(crate) struct ResolveContext<'m> {
    pub(crate) model: &'m mut Model,
    pub(crate) ports: PortAllocator,
    pub(crate) links: FxHashMap<DeclId, LinkState>,
}

impl<'m> ResolveContext<'m> {
    pub(crate) fn new(model: &'m mut Model, options: &ResolveOptions) -> Self {
        ResolveContext {
            model,
            ports: PortAllocator::new(options.first_port),
            links: FxHashMap::default(),
        }
    }

    fn module_decls(&self, module: ModuleId) -> Vec<DeclId> {
        self.model.module(module).decls.clone()
    }

    #[tracing::instrument(level = "debug", skip_all, fields(module = %self.model.module(module).path))]
    fn resolve_declarations(&mut self, module: ModuleId) -> Result<(), ResolveError> {
        for decl in self.module_decls(module) {
            match &self.model.decl(decl).kind {
                DeclKind::Service(_) => self.link_service(decl)?,
                DeclKind::ApiGateway(_) => self.resolve_gateway(decl)?,
                DeclKind::ServiceRegistry(_) | DeclKind::ConfigServer(_) => {
                    self.apply_deployment_defaults(decl);
                }
                DeclKind::Dependency(_) | DeclKind::MessagePool(_) | DeclKind::MessageBroker(_) => {}
            }
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(module = %self.model.module(module).path))]
    fn resolve_types(&mut self, module: ModuleId) -> Result<(), ResolveError> {
        for decl in self.module_decls(module) {
            if self.model.decl(decl).is_service() {
                self.resolve_service_types(decl)?;
                self.bind_service_messaging(decl)?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(module = %self.model.module(module).path))]
    fn resolve_dependencies(&mut self, module: ModuleId) -> Result<(), ResolveError> {
        for decl in self.module_decls(module) {
            if matches!(self.model.decl(decl).kind, DeclKind::Dependency(_)) {
                self.resolve_dependency(decl)?;
            }
        }
        Ok(())
    }
}

/// Reject two named declarations with the same name in one module.
fn check_unique_names(model: &Model) -> Result<(), ResolveError> {
    for (module, m) in model.modules() {
        let mut seen: FxHashMap<&str, DeclId> = FxHashMap::default();
        for &id in &m.decls {
            let decl = model.decl(id);
            let Some(name) = decl.name.as_deref() else {
                continue;
            };
            if let Some(&first) = seen.get(name) {
                return Err(ResolveError::DuplicateDeclaration {
                    name: name.to_string(),
                    at: Location::in_module(model, module, decl.span),
                    first: model.decl(first).span,
                });
            }
            seen.insert(name, id);
        }
    }
    Ok(())
}

/// Run every pass over `model`, in order.
#[tracing::instrument(level = "debug", skip_all, fields(modules = model.module_count()))]
pub(crate) fn run(model: &mut Model, options: &ResolveOptions) -> Result<(), ResolveError> {
    let graph = ModuleGraph::build(model)?;
    let order = graph.resolution_order(model)?;
    tracing::debug!(
        order = ?order.iter().map(|&m| model.module(m).path.as_str()).collect::<Vec<_>>(),
        "module resolution order"
    );

    check_unique_names(model)?;
    messaging::resolve_catalog(model)?;

    let mut cx = ResolveContext::new(model, options);
    for &module in &order {
        cx.resolve_declarations(module)?;
    }
    for &module in &order {
        cx.resolve_types(module)?;
    }
    for &module in &order {
        cx.resolve_dependencies(module)?;
    }

    let strategy = strategy_for(options.rest_strategy);
    let rest = RestResolver::new(strategy.as_ref())?;
    rest.resolve(model, &order)?;
    Ok(())
}
