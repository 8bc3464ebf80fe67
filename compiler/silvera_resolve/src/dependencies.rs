//! Dependency edges between services.
//!
//! For `start -> end` with directives on methods of `end`, `start` receives a
//! clone of each named method plus every user type those clones mention:
//!
//! ```text
//! Payment -> User { login: fallback_method }
//!
//! Payment.dep_functions  += login'      dep = User.login
//!                                        cb_pattern = fallback_method
//!                                        cb_fallback = "login_fallback"
//! Payment.dep_typedefs   += Credentials, Session, ...  (closed over fields)
//! Payment.dependencies   += User
//! ```

use rustc_hash::FxHashSet;
use silvera_ir::{DeclId, DeclKind, DependencyDecl, FunctionId, Ref, TypeDefId};

use crate::lookup::lookup_service;
use crate::pipeline::ResolveContext;
use crate::{Location, ResolveError};

impl ResolveContext<'_> {
    pub(crate) fn resolve_dependency(&mut self, id: DeclId) -> Result<(), ResolveError> {
        let DeclKind::Dependency(dependency) = &self.model.decl(id).kind else {
            return Ok(());
        };
        let DependencyDecl {
            start,
            end,
            directives,
        } = dependency.clone();

        let start = self.resolve_endpoint(id, &start)?;
        let end = self.resolve_endpoint(id, &end)?;
        if let DeclKind::Dependency(dependency) = &mut self.model.decl_mut(id).kind {
            dependency.start = Ref::Resolved(start);
            dependency.end = Ref::Resolved(end);
        }

        let missing: Vec<String> = directives
            .iter()
            .filter(|d| self.model.api_function(end, &d.method).is_none())
            .map(|d| d.method.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ResolveError::MissingDependencyMethods {
                service: self.model.decl(end).display_name().to_string(),
                missing,
                at: Location::of_decl(self.model, id),
            });
        }

        let end_functions = self
            .model
            .service(end)
            .map(|s| s.api.functions.clone())
            .unwrap_or_default();
        let mut clones = Vec::new();
        for origin in end_functions {
            let name = &self.model.function(origin).name;
            let Some(directive) = directives.iter().find(|d| &d.method == name) else {
                continue;
            };
            let mut clone = self.model.function(origin).dependency_clone(start, origin);
            clone.cb_pattern = Some(directive.failure_pattern);
            clone.cb_fallback = Some(
                directive
                    .fallback
                    .clone()
                    .unwrap_or_else(|| format!("{}_fallback", clone.name)),
            );
            tracing::trace!(
                start = %self.model.decl_fqn(start),
                method = %clone.name,
                "cloned dependency method"
            );
            clones.push(self.model.push_function(clone));
        }

        let typedefs = self.referenced_typedefs(&clones);
        let Some(service) = self.model.service_mut(start) else {
            return Err(ResolveError::internal(format!("{start:?} is not a service")));
        };
        service.dep_functions.extend(clones);
        for td in typedefs {
            if !service.dep_typedefs.contains(&td) {
                service.dep_typedefs.push(td);
            }
        }
        if !service.dependencies.contains(&end) {
            service.dependencies.push(end);
        }

        tracing::debug!(
            start = %self.model.decl_fqn(start),
            end = %self.model.decl_fqn(end),
            "resolved dependency"
        );
        Ok(())
    }

    fn resolve_endpoint(&self, dependency: DeclId, slot: &Ref<DeclId>) -> Result<DeclId, ResolveError> {
        match slot {
            Ref::Resolved(id) => Ok(*id),
            Ref::Unresolved(symbol) => {
                lookup_service(self.model, self.model.decl(dependency).module, symbol)
            }
        }
    }

    /// User types mentioned by `functions`, closed over typedef fields.
    ///
    /// Ordered by first discovery: return type, then parameters, then the
    /// fields of each type found so far.
    fn referenced_typedefs(&self, functions: &[FunctionId]) -> Vec<TypeDefId> {
        let mut found = Vec::new();
        let mut visited = FxHashSet::default();
        let mut visit = |id: TypeDefId| {
            if visited.insert(id) {
                found.push(id);
            }
        };
        for &f in functions {
            let function = self.model.function(f);
            function.ret.for_each_user_type(&mut visit);
            for param in &function.params {
                param.ty.for_each_user_type(&mut visit);
            }
        }

        // `found` doubles as the work queue.
        let mut next = 0;
        while next < found.len() {
            let typedef = self.model.typedef(found[next]);
            next += 1;
            for field in &typedef.fields {
                field.ty.for_each_user_type(&mut |id| {
                    if visited.insert(id) {
                        found.push(id);
                    }
                });
            }
        }
        found
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
