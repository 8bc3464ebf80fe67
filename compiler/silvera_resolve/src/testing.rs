//! Builders for source modules in tests.
//!
//! ```ignore
//! let model = model(vec![module("orders.si", &["share.setup"], vec![
//!     ServiceBuilder::new("Orders").config_server("Config").build(),
//! ])]);
//! ```

use silvera_ir::syntax::{
    SourceAnnotation, SourceBroker, SourceChannel, SourceConfigServer, SourceDecl,
    SourceDependency, SourceDirective, SourceField, SourceFunction, SourceGateway, SourceGroup,
    SourceImport, SourceMessage, SourceModule, SourceParam, SourcePool, SourceRegistry,
    SourceRoute, SourceService, SourceSubscription, SourceTypeDef,
};
use silvera_ir::{lower, Deployment, FailurePattern, HttpVerb, Model, Span};

use crate::{resolve, resolve_with, ResolveError, ResolveOptions, ResolvedModel};

pub(crate) fn module(path: &str, imports: &[&str], decls: Vec<SourceDecl>) -> SourceModule {
    SourceModule {
        path: path.into(),
        source: String::new(),
        imports: imports
            .iter()
            .map(|url| SourceImport {
                url: (*url).to_string(),
                span: Span::DUMMY,
            })
            .collect(),
        decls,
    }
}

/// Lower modules into an unresolved model.
pub(crate) fn model(modules: Vec<SourceModule>) -> Model {
    lower(modules).unwrap()
}

pub(crate) fn resolve_modules(modules: Vec<SourceModule>) -> Result<ResolvedModel, ResolveError> {
    resolve(model(modules))
}

pub(crate) fn resolve_modules_with(
    modules: Vec<SourceModule>,
    options: &ResolveOptions,
) -> Result<ResolvedModel, ResolveError> {
    resolve_with(model(modules), options)
}

pub(crate) struct ServiceBuilder(SourceService);

impl ServiceBuilder {
    pub(crate) fn new(name: &str) -> Self {
        ServiceBuilder(SourceService {
            name: name.into(),
            ..SourceService::default()
        })
    }

    pub(crate) fn extends(mut self, base: &str) -> Self {
        self.0.extends = Some(base.into());
        self
    }

    pub(crate) fn config_server(mut self, name: &str) -> Self {
        self.0.config_server = Some(name.into());
        self
    }

    pub(crate) fn registry(mut self, name: &str) -> Self {
        self.0.service_registry = Some(name.into());
        self
    }

    pub(crate) fn deployment(mut self, deployment: Deployment) -> Self {
        self.0.deployment = Some(deployment);
        self
    }

    pub(crate) fn typedef(mut self, typedef: SourceTypeDef) -> Self {
        self.0.api.typedefs.push(typedef);
        self
    }

    pub(crate) fn function(mut self, function: SourceFunction) -> Self {
        self.0.api.functions.push(function);
        self
    }

    pub(crate) fn internal(mut self, function: SourceFunction) -> Self {
        self.0.api.internal.push(function);
        self
    }

    pub(crate) fn build(self) -> SourceDecl {
        SourceDecl::Service(self.0)
    }
}

/// `ret name(p1: t1, ...)`.
pub(crate) fn function(name: &str, ret: &str, params: &[(&str, &str)]) -> SourceFunction {
    SourceFunction {
        name: name.into(),
        ret: ret.into(),
        params: params
            .iter()
            .map(|(name, ty)| SourceParam {
                name: (*name).to_string(),
                ty: (*ty).to_string(),
                ..SourceParam::default()
            })
            .collect(),
        ..SourceFunction::default()
    }
}

pub(crate) fn with_annotation(mut f: SourceFunction, annotation: SourceAnnotation) -> SourceFunction {
    f.annotations.push(annotation);
    f
}

pub(crate) fn rest(verb: HttpVerb, mapping: Option<&str>) -> SourceAnnotation {
    SourceAnnotation::Rest {
        verb,
        mapping: mapping.map(str::to_string),
        span: Span::DUMMY,
    }
}

fn subscription(message: &str, channel: &str) -> SourceSubscription {
    SourceSubscription {
        message: message.into(),
        channel: channel.into(),
        span: Span::DUMMY,
    }
}

pub(crate) fn producer(message: &str, channel: &str) -> SourceAnnotation {
    SourceAnnotation::Producer {
        subscriptions: vec![subscription(message, channel)],
    }
}

pub(crate) fn consumer(message: &str, channel: &str) -> SourceAnnotation {
    SourceAnnotation::Consumer {
        subscriptions: vec![subscription(message, channel)],
    }
}

fn field(name: &str, ty: &str) -> SourceField {
    SourceField {
        name: name.into(),
        ty: ty.into(),
        ..SourceField::default()
    }
}

pub(crate) fn typedef(name: &str, fields: &[(&str, &str)]) -> SourceTypeDef {
    SourceTypeDef {
        name: name.into(),
        fields: fields.iter().map(|(n, t)| field(n, t)).collect(),
        ..SourceTypeDef::default()
    }
}

/// Dependency with one fail-fast directive per method.
pub(crate) fn dependency(start: &str, end: &str, methods: &[&str]) -> SourceDecl {
    dependency_with(
        start,
        end,
        methods
            .iter()
            .map(|m| directive(m, FailurePattern::FailFast, None))
            .collect(),
    )
}

pub(crate) fn dependency_with(start: &str, end: &str, directives: Vec<SourceDirective>) -> SourceDecl {
    SourceDecl::Dependency(SourceDependency {
        span: Span::DUMMY,
        start: start.into(),
        end: end.into(),
        directives,
    })
}

pub(crate) fn directive(
    method: &str,
    failure_pattern: FailurePattern,
    fallback: Option<&str>,
) -> SourceDirective {
    SourceDirective {
        method: method.into(),
        span: Span::DUMMY,
        failure_pattern,
        fallback: fallback.map(str::to_string),
    }
}

pub(crate) fn config_server(name: &str) -> SourceDecl {
    SourceDecl::ConfigServer(SourceConfigServer {
        name: name.into(),
        ..SourceConfigServer::default()
    })
}

pub(crate) fn registry(name: &str) -> SourceDecl {
    SourceDecl::ServiceRegistry(SourceRegistry {
        name: name.into(),
        ..SourceRegistry::default()
    })
}

/// Gateway routing `(service, path)` pairs.
pub(crate) fn gateway(name: &str, routes: &[(&str, &str)]) -> SourceDecl {
    SourceDecl::ApiGateway(SourceGateway {
        name: name.into(),
        gateway_for: routes
            .iter()
            .map(|(service, path)| SourceRoute {
                service: (*service).to_string(),
                path: (*path).to_string(),
                span: Span::DUMMY,
            })
            .collect(),
        ..SourceGateway::default()
    })
}

pub(crate) fn pool(groups: Vec<SourceGroup>) -> SourceDecl {
    SourceDecl::MessagePool(SourcePool {
        span: Span::DUMMY,
        groups,
    })
}

pub(crate) fn group(name: &str, messages: Vec<SourceMessage>, groups: Vec<SourceGroup>) -> SourceGroup {
    SourceGroup {
        name: name.into(),
        span: Span::DUMMY,
        groups,
        messages,
    }
}

pub(crate) fn message(name: &str, fields: &[(&str, &str)]) -> SourceMessage {
    SourceMessage {
        name: name.into(),
        span: Span::DUMMY,
        fields: fields.iter().map(|(n, t)| field(n, t)).collect(),
    }
}

/// Broker with `(channel, message)` pairs.
pub(crate) fn broker(name: &str, channels: &[(&str, &str)]) -> SourceDecl {
    SourceDecl::MessageBroker(SourceBroker {
        name: name.into(),
        span: Span::DUMMY,
        channels: channels
            .iter()
            .map(|(channel, message)| SourceChannel {
                name: (*channel).to_string(),
                message: (*message).to_string(),
                ..SourceChannel::default()
            })
            .collect(),
    })
}
