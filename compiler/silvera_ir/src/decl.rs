//! Top-level declarations.
//!
//! Every declaration kind is one variant of the closed [`DeclKind`] enum.
//! Cross-declaration references are [`Ref`] slots that resolution fills in.

use crate::{
    DeclId, DeploymentId, FailurePattern, FunctionId, MessageBroker, MessagePool, ModuleId, Ref,
    Span, TypeDefId,
};

/// How a service talks to its dependencies.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum CommStyle {
    #[default]
    Rpc,
    Messaging,
}

/// Public and internal surface of a service.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Api {
    pub typedefs: Vec<TypeDefId>,
    pub functions: Vec<FunctionId>,
    /// Functions not exposed to other services.
    pub internal: Vec<FunctionId>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ServiceDecl {
    pub extends: Option<Ref<DeclId>>,
    pub deployment: Option<DeploymentId>,
    pub config_server: Option<Ref<DeclId>>,
    pub service_registry: Option<Ref<DeclId>>,
    pub comm_style: CommStyle,
    pub api: Api,
    /// Local copies of the functions this service calls on others.
    pub dep_functions: Vec<FunctionId>,
    /// Every user type those copies mention, transitively through fields.
    pub dep_typedefs: Vec<TypeDefId>,
    /// Services this one depends on, in declaration order.
    pub dependencies: Vec<DeclId>,
    pub docstring: Option<String>,
}

impl ServiceDecl {
    pub fn new(comm_style: CommStyle) -> Self {
        ServiceDecl {
            extends: None,
            deployment: None,
            config_server: None,
            service_registry: None,
            comm_style,
            api: Api::default(),
            dep_functions: Vec::new(),
            dep_typedefs: Vec::new(),
            dependencies: Vec::new(),
            docstring: None,
        }
    }
}

/// Route from a gateway path prefix to a service.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct GatewayRoute {
    pub service: Ref<DeclId>,
    pub path: String,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ApiGatewayDecl {
    pub deployment: Option<DeploymentId>,
    pub config_server: Option<Ref<DeclId>>,
    pub service_registry: Option<Ref<DeclId>>,
    pub comm_style: CommStyle,
    pub gateway_for: Vec<GatewayRoute>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ServiceRegistryDecl {
    pub deployment: Option<DeploymentId>,
    /// The registry also registers itself as a client of a peer.
    pub client_mode: bool,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ConfigServerDecl {
    pub deployment: Option<DeploymentId>,
    pub search_path: Option<String>,
}

/// Per-method resilience settings on a dependency edge.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ResilienceDirective {
    pub method: String,
    pub failure_pattern: FailurePattern,
    pub fallback: Option<String>,
    pub span: Span,
}

/// `start -> end` edge: `start` calls the listed methods of `end`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DependencyDecl {
    pub start: Ref<DeclId>,
    pub end: Ref<DeclId>,
    pub directives: Vec<ResilienceDirective>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum DeclKind {
    Service(ServiceDecl),
    ApiGateway(ApiGatewayDecl),
    ServiceRegistry(ServiceRegistryDecl),
    ConfigServer(ConfigServerDecl),
    Dependency(DependencyDecl),
    MessagePool(MessagePool),
    MessageBroker(MessageBroker),
}

impl DeclKind {
    /// Human-readable kind, used in diagnostics.
    pub const fn describe(&self) -> &'static str {
        match self {
            DeclKind::Service(_) => "service",
            DeclKind::ApiGateway(_) => "API gateway",
            DeclKind::ServiceRegistry(_) => "service registry",
            DeclKind::ConfigServer(_) => "config server",
            DeclKind::Dependency(_) => "dependency",
            DeclKind::MessagePool(_) => "message pool",
            DeclKind::MessageBroker(_) => "message broker",
        }
    }
}

/// A top-level declaration.
///
/// `name` is `None` for dependencies and the message pool, which are
/// anonymous in source.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Decl {
    pub name: Option<String>,
    pub span: Span,
    pub module: ModuleId,
    pub kind: DeclKind,
}

impl Decl {
    /// Name for diagnostics; anonymous declarations use their kind.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.describe())
    }

    pub fn as_service(&self) -> Option<&ServiceDecl> {
        match &self.kind {
            DeclKind::Service(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_service_mut(&mut self) -> Option<&mut ServiceDecl> {
        match &mut self.kind {
            DeclKind::Service(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_gateway(&self) -> Option<&ApiGatewayDecl> {
        match &self.kind {
            DeclKind::ApiGateway(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_broker(&self) -> Option<&MessageBroker> {
        match &self.kind {
            DeclKind::MessageBroker(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_broker_mut(&mut self) -> Option<&mut MessageBroker> {
        match &mut self.kind {
            DeclKind::MessageBroker(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_service(&self) -> bool {
        matches!(self.kind, DeclKind::Service(_))
    }

    /// Whether the declaration describes something that gets deployed.
    pub fn is_deployable(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Service(_)
                | DeclKind::ApiGateway(_)
                | DeclKind::ServiceRegistry(_)
                | DeclKind::ConfigServer(_)
        )
    }

    pub fn deployment(&self) -> Option<DeploymentId> {
        match &self.kind {
            DeclKind::Service(s) => s.deployment,
            DeclKind::ApiGateway(g) => g.deployment,
            DeclKind::ServiceRegistry(r) => r.deployment,
            DeclKind::ConfigServer(c) => c.deployment,
            DeclKind::Dependency(_) | DeclKind::MessagePool(_) | DeclKind::MessageBroker(_) => None,
        }
    }

    /// `Some(slot)` for deployable declarations, `None` for the rest.
    pub fn deployment_slot(&self) -> Option<Option<DeploymentId>> {
        self.is_deployable().then(|| self.deployment())
    }

    /// The deployment slot of a deployable declaration.
    pub fn deployment_slot_mut(&mut self) -> Option<&mut Option<DeploymentId>> {
        match &mut self.kind {
            DeclKind::Service(s) => Some(&mut s.deployment),
            DeclKind::ApiGateway(g) => Some(&mut g.deployment),
            DeclKind::ServiceRegistry(r) => Some(&mut r.deployment),
            DeclKind::ConfigServer(c) => Some(&mut c.deployment),
            DeclKind::Dependency(_) | DeclKind::MessagePool(_) | DeclKind::MessageBroker(_) => None,
        }
    }

    /// Whether this is a service that extends another.
    pub fn extends_another(&self) -> bool {
        self.as_service().is_some_and(|s| s.extends.is_some())
    }
}
