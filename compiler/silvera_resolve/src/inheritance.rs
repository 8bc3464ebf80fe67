//! Service linking: `extends`, deployments, and infrastructure references.
//!
//! A derived service is linked after its base, whatever their order in
//! source:
//!
//! ```text
//! link(Derived)
//!   ├─ link(Base)                   recursively, memoized
//!   ├─ config server / registry     copied from Base where Derived has none
//!   ├─ deployment                   shared if Derived has none, else merged
//!   ├─ API                          Base members appended, no redefinition
//!   └─ own config server / registry looked up
//! ```
//!
//! Only a service that extends nothing gets deployment defaults and a port.

use silvera_ir::{DeclId, DeclKind, Model, ModuleId, Ref, Span, Symbol};

use crate::lookup::{lookup_config_server, lookup_registry, lookup_service};
use crate::pipeline::{LinkState, ResolveContext};
use crate::{Location, MemberKind, ResolveError};

impl ResolveContext<'_> {
    /// Link a service to its base and its infrastructure. Idempotent.
    pub(crate) fn link_service(&mut self, id: DeclId) -> Result<(), ResolveError> {
        match self.links.get(&id) {
            Some(LinkState::Done) => return Ok(()),
            Some(LinkState::InProgress) => {
                return Err(ResolveError::CyclicInheritance {
                    service: self.model.decl(id).display_name().to_string(),
                    at: Location::of_decl(self.model, id),
                })
            }
            None => {}
        }
        self.links.insert(id, LinkState::InProgress);

        let extends = self.model.service(id).and_then(|s| s.extends.clone());
        match extends {
            Some(base_ref) => {
                let base = match base_ref {
                    Ref::Resolved(base) => base,
                    Ref::Unresolved(symbol) => {
                        let module = self.model.decl(id).module;
                        lookup_service(self.model, module, &symbol)?
                    }
                };
                if let Some(service) = self.model.service_mut(id) {
                    service.extends = Some(Ref::Resolved(base));
                }
                self.link_service(base)?;
                self.inherit(id, base)?;
            }
            None => self.apply_deployment_defaults(id),
        }

        let (config_server, registry) = match self.model.service(id) {
            Some(s) => (s.config_server.clone(), s.service_registry.clone()),
            None => (None, None),
        };
        let config_server = self.resolve_config_server(id, config_server)?;
        let registry = self.resolve_registry(id, registry)?;
        if let Some(service) = self.model.service_mut(id) {
            service.config_server = config_server;
            service.service_registry = registry;
        }

        self.links.insert(id, LinkState::Done);
        tracing::debug!(service = %self.model.decl_fqn(id), "linked service");
        Ok(())
    }

    /// Copy what `derived` leaves unset from an already linked `base`.
    fn inherit(&mut self, derived: DeclId, base: DeclId) -> Result<(), ResolveError> {
        let Some(base_svc) = self.model.service(base).cloned() else {
            return Err(ResolveError::internal(format!(
                "base {base:?} of {derived:?} is not a service"
            )));
        };

        // API members first, so a rejected override leaves nothing half-merged.
        let mut typedefs = Vec::new();
        for &td in &base_svc.api.typedefs {
            let name = &self.model.typedef(td).name;
            if let Some(own) = self.model.api_typedef(derived, name) {
                let span = self.model.typedef(own).span;
                return Err(self.override_error(derived, base, name, MemberKind::TypeDef, span));
            }
            typedefs.push(td);
        }
        let mut functions = Vec::new();
        for &f in &base_svc.api.functions {
            let name = &self.model.function(f).name;
            if let Some(own) = self.model.api_function(derived, name) {
                let span = self.model.function(own).span;
                return Err(self.override_error(derived, base, name, MemberKind::Function, span));
            }
            functions.push(f);
        }

        let Some(service) = self.model.service_mut(derived) else {
            return Err(ResolveError::internal(format!("{derived:?} is not a service")));
        };
        service.api.typedefs.extend(typedefs);
        service.api.functions.extend(functions);
        if service.config_server.is_none() {
            service.config_server = base_svc.config_server;
        }
        if service.service_registry.is_none() {
            service.service_registry = base_svc.service_registry;
        }

        match (service.deployment, base_svc.deployment) {
            (None, shared) => service.deployment = shared,
            (Some(own), Some(inherited)) => {
                let inherited = self.model.deployment(inherited).clone();
                self.model.deployment_mut(own).inherit_from(&inherited);
            }
            (Some(_), None) => {}
        }

        tracing::trace!(
            service = %self.model.decl_fqn(derived),
            base = %self.model.decl_fqn(base),
            "inherited from base"
        );
        Ok(())
    }

    fn override_error(
        &self,
        derived: DeclId,
        base: DeclId,
        member: &str,
        kind: MemberKind,
        span: Span,
    ) -> ResolveError {
        ResolveError::UnsupportedOverride {
            service: self.model.decl(derived).display_name().to_string(),
            base: self.model.decl(base).display_name().to_string(),
            member: member.to_string(),
            kind,
            at: Location::near_decl(self.model, derived, span),
        }
    }

    fn resolve_config_server(
        &self,
        owner: DeclId,
        slot: Option<Ref<DeclId>>,
    ) -> Result<Option<Ref<DeclId>>, ResolveError> {
        self.resolve_slot(owner, slot, lookup_config_server)
    }

    fn resolve_registry(
        &self,
        owner: DeclId,
        slot: Option<Ref<DeclId>>,
    ) -> Result<Option<Ref<DeclId>>, ResolveError> {
        self.resolve_slot(owner, slot, lookup_registry)
    }

    fn resolve_slot(
        &self,
        owner: DeclId,
        slot: Option<Ref<DeclId>>,
        find: fn(&Model, ModuleId, &Symbol) -> Result<DeclId, ResolveError>,
    ) -> Result<Option<Ref<DeclId>>, ResolveError> {
        match slot {
            Some(Ref::Unresolved(symbol)) => {
                let module = self.model.decl(owner).module;
                Ok(Some(Ref::Resolved(find(self.model, module, &symbol)?)))
            }
            resolved => Ok(resolved),
        }
    }

    /// Defaults, infrastructure references, and routes of an API gateway.
    pub(crate) fn resolve_gateway(&mut self, id: DeclId) -> Result<(), ResolveError> {
        self.apply_deployment_defaults(id);

        let Some(gateway) = self.model.decl(id).as_gateway().cloned() else {
            return Ok(());
        };
        let module = self.model.decl(id).module;
        let config_server = self.resolve_config_server(id, gateway.config_server)?;
        let registry = self.resolve_registry(id, gateway.service_registry)?;
        let mut routes = gateway.gateway_for;
        for route in &mut routes {
            if let Ref::Unresolved(symbol) = &route.service {
                route.service = Ref::Resolved(lookup_service(self.model, module, symbol)?);
            }
        }

        if let DeclKind::ApiGateway(gateway) = &mut self.model.decl_mut(id).kind {
            gateway.config_server = config_server;
            gateway.service_registry = registry;
            gateway.gateway_for = routes;
        }
        tracing::debug!(gateway = %self.model.decl_fqn(id), "resolved gateway");
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
