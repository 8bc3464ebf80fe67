//! HTTP verbs and REST paths.
//!
//! Every public function a service declares gets a verb and a path:
//!
//! - `@rest(method=V, mapping=M)`: verb `V`, path `M` verbatim
//! - `@rest(method=V)`: verb `V`, default path
//! - no annotation: verb from the [`RestStrategy`], default path
//!
//! The default path is `<service>/<function>/`, lowercased, followed for
//! `GET` by one `{param}` segment per parameter. Placeholders and query keys
//! in the final path must name parameters and are flagged on them.
//!
//! Dependency clones then copy the verb, path, and flags of their origin.

use regex::Regex;
use silvera_ir::{DeclId, FunctionId, HttpVerb, Model, ModuleId};

use crate::{Location, ResolveError, RestStrategyKind};

/// Chooses the verb of a function without a `@rest` annotation.
pub trait RestStrategy {
    fn name(&self) -> &'static str;

    fn infer_verb(&self, model: &Model, function: FunctionId) -> Result<HttpVerb, ResolveError>;
}

/// Everything is `GET`.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultStrategy;

impl RestStrategy for DefaultStrategy {
    fn name(&self) -> &'static str {
        RestStrategyKind::Default.as_str()
    }

    fn infer_verb(&self, _model: &Model, _function: FunctionId) -> Result<HttpVerb, ResolveError> {
        Ok(HttpVerb::Get)
    }
}

/// A named strategy with no inference rules. Any unannotated function is
/// an error.
#[derive(Copy, Clone, Debug)]
pub struct UnsupportedStrategy(pub RestStrategyKind);

impl RestStrategy for UnsupportedStrategy {
    fn name(&self) -> &'static str {
        self.0.as_str()
    }

    fn infer_verb(&self, model: &Model, function: FunctionId) -> Result<HttpVerb, ResolveError> {
        let f = model.function(function);
        Err(ResolveError::UnsupportedRestStrategy {
            strategy: self.name(),
            function: f.name.clone(),
            at: Location::near_decl(model, f.owner, f.span),
        })
    }
}

pub fn strategy_for(kind: RestStrategyKind) -> Box<dyn RestStrategy> {
    match kind {
        RestStrategyKind::Default => Box::new(DefaultStrategy),
        other => Box::new(UnsupportedStrategy(other)),
    }
}

/// Lowercased `<service>/<function>/`, plus `{param}` segments for `GET`.
pub fn default_path(service: &str, function: &str, verb: HttpVerb, params: &[&str]) -> String {
    let mut path = format!("{}/{}/", service.to_lowercase(), function.to_lowercase());
    if verb == HttpVerb::Get {
        let segments: Vec<String> = params.iter().map(|p| format!("{{{p}}}")).collect();
        path.push_str(&segments.join("/"));
    }
    path
}

/// Names used by a REST path: `{placeholder}` segments, then query keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathNames {
    pub placeholders: Vec<String>,
    pub query: Vec<String>,
}

pub(crate) struct RestResolver<'s> {
    strategy: &'s dyn RestStrategy,
    placeholder: Regex,
}

impl<'s> RestResolver<'s> {
    pub(crate) fn new(strategy: &'s dyn RestStrategy) -> Result<Self, ResolveError> {
        let placeholder = Regex::new(r"\{(.*?)\}")
            .map_err(|e| ResolveError::internal(format!("placeholder pattern: {e}")))?;
        Ok(RestResolver {
            strategy,
            placeholder,
        })
    }

    /// Placeholder and query-string names in `path`.
    ///
    /// Placeholders are collected from the whole mapping, query string included.
    pub(crate) fn path_names(&self, path: &str) -> PathNames {
        let query = path.split_once('?').map(|(_, query)| query);
        PathNames {
            placeholders: self
                .placeholder
                .captures_iter(path)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .collect(),
            query: query
                .map(|q| {
                    url::form_urlencoded::parse(q.as_bytes())
                        .map(|(key, _)| key.into_owned())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(strategy = self.strategy.name()))]
    pub(crate) fn resolve(&self, model: &mut Model, order: &[ModuleId]) -> Result<(), ResolveError> {
        let services = services_in(model, order);
        for &service in &services {
            let owned: Vec<_> = model
                .service(service)
                .map(|s| s.api.functions.clone())
                .unwrap_or_default()
                .into_iter()
                .filter(|&f| model.function(f).owner == service)
                .collect();
            for function in owned {
                self.resolve_function(model, service, function)?;
            }
        }

        for &service in &services {
            let clones = model
                .service(service)
                .map(|s| s.dep_functions.clone())
                .unwrap_or_default();
            for clone in clones {
                copy_from_origin(model, clone);
            }
        }
        Ok(())
    }

    fn resolve_function(
        &self,
        model: &mut Model,
        service: DeclId,
        id: FunctionId,
    ) -> Result<(), ResolveError> {
        let f = model.function(id);
        let (verb, mapping) = match f.rest_annotation() {
            Some((verb, mapping)) => (verb, mapping.map(str::to_string)),
            None => (self.strategy.infer_verb(model, id)?, None),
        };
        let path = mapping.unwrap_or_else(|| {
            let params: Vec<&str> = f.params.iter().map(|p| p.name.as_str()).collect();
            default_path(model.decl(service).display_name(), &f.name, verb, &params)
        });

        let names = self.path_names(&path);
        let at = || Location::near_decl(model, service, f.span);
        if let Some(unknown) = names.placeholders.iter().find(|n| f.param(n).is_none()) {
            return Err(ResolveError::UnknownPlaceholder {
                function: f.name.clone(),
                placeholder: unknown.clone(),
                mapping: path,
                at: at(),
            });
        }
        if let Some(unknown) = names.query.iter().find(|n| f.param(n).is_none()) {
            return Err(ResolveError::UnknownQueryParam {
                function: f.name.clone(),
                param: unknown.clone(),
                mapping: path,
                at: at(),
            });
        }

        tracing::trace!(function = %f.name, %verb, %path, "assigned route");
        let f = model.function_mut(id);
        for param in &mut f.params {
            param.url_placeholder = names.placeholders.contains(&param.name);
            param.query_param = names.query.contains(&param.name);
        }
        f.http_verb = Some(verb);
        f.rest_path = Some(path);
        Ok(())
    }
}

/// Services of the given modules, in module then declaration order.
fn services_in(model: &Model, order: &[ModuleId]) -> Vec<DeclId> {
    order
        .iter()
        .flat_map(|&m| model.module(m).decls.iter().copied())
        .filter(|&d| model.decl(d).is_service())
        .collect()
}

fn copy_from_origin(model: &mut Model, clone: FunctionId) {
    let Some(origin) = model.function(clone).dep else {
        return;
    };
    let source = model.function(origin);
    let verb = source.http_verb;
    let path = source.rest_path.clone();
    let flags: Vec<(bool, bool)> = source
        .params
        .iter()
        .map(|p| (p.url_placeholder, p.query_param))
        .collect();

    let f = model.function_mut(clone);
    f.http_verb = verb;
    f.rest_path = path;
    for (param, (placeholder, query)) in f.params.iter_mut().zip(flags) {
        param.url_placeholder = placeholder;
        param.query_param = query;
    }
}
