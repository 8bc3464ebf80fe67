//! Type resolution within a service API.
//!
//! User type names are resolved by simple name against the typedefs visible
//! in the owning service's API, inherited ones included. Collections are
//! resolved element by element, so `list<list<Order>>` ends at the same
//! `TypeDefId` as `Order`.

use rustc_hash::FxHashMap;
use silvera_ir::{DeclId, Ref, TypeDefId, TypeRef};

use crate::pipeline::ResolveContext;
use crate::{Location, ResolveError};

/// Typedefs visible in one service, by simple name.
struct TypeScope {
    owner: String,
    module: String,
    types: FxHashMap<String, TypeDefId>,
}

impl TypeScope {
    fn resolve(&self, ty: &mut TypeRef) -> Result<(), ResolveError> {
        ty.for_each_user_slot(&mut |slot: &mut Ref<TypeDefId>| {
            let Ref::Unresolved(symbol) = slot else {
                return Ok(());
            };
            match self.types.get(&symbol.name) {
                Some(&id) => {
                    *slot = Ref::Resolved(id);
                    Ok(())
                }
                None => Err(ResolveError::TypeNotFound {
                    owner: self.owner.clone(),
                    type_name: symbol.name.clone(),
                    at: Location::new(self.module.clone(), symbol.span),
                }),
            }
        })
    }
}

impl ResolveContext<'_> {
    /// Resolve fields, parameters, and return types of everything `service`
    /// declares itself. Inherited members were resolved with their base.
    pub(crate) fn resolve_service_types(&mut self, service: DeclId) -> Result<(), ResolveError> {
        let Some(svc) = self.model.service(service) else {
            return Ok(());
        };
        let decl = self.model.decl(service);
        let scope = TypeScope {
            owner: decl.display_name().to_string(),
            module: self.model.module(decl.module).path.clone(),
            types: svc
                .api
                .typedefs
                .iter()
                .map(|&id| (self.model.typedef(id).name.clone(), id))
                .collect(),
        };
        let typedefs: Vec<_> = svc
            .api
            .typedefs
            .iter()
            .copied()
            .filter(|&id| self.model.typedef(id).owner == service)
            .collect();
        let functions: Vec<_> = svc
            .api
            .functions
            .iter()
            .chain(&svc.api.internal)
            .copied()
            .filter(|&id| self.model.function(id).owner == service)
            .collect();

        for id in typedefs {
            for field in &mut self.model.typedef_mut(id).fields {
                scope.resolve(&mut field.ty)?;
            }
        }
        for id in functions {
            let function = self.model.function_mut(id);
            scope.resolve(&mut function.ret)?;
            for param in &mut function.params {
                scope.resolve(&mut param.ty)?;
            }
        }

        tracing::trace!(service = %scope.owner, types = scope.types.len(), "resolved types");
        Ok(())
    }
}
