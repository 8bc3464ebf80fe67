//! Source-level declarations, as produced by a parser front end.
//!
//! These mirror the declaration model but keep every reference as text and
//! every type as an unparsed type expression. [`lower`](crate::lower) turns a
//! set of source modules into a [`Model`](crate::Model).
//!
//! With the `serde` feature the tree deserializes from the JSON form the
//! driver loads (`*.si.json`). Declarations are tagged by `kind`:
//!
//! ```text
//! { "kind": "service", "name": "Orders", "extends": "Base", "api": { ... } }
//! ```

use crate::{CommStyle, Deployment, FailurePattern, HttpVerb, Span};

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(deny_unknown_fields))]
pub struct SourceModule {
    /// Set by the loader from the file location.
    #[cfg_attr(feature = "serde", serde(default))]
    pub path: String,
    /// Original DSL text, used to render diagnostics.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub imports: Vec<SourceImport>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub decls: Vec<SourceDecl>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(deny_unknown_fields))]
pub struct SourceImport {
    pub url: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(tag = "kind", rename_all = "kebab-case")
)]
pub enum SourceDecl {
    Service(SourceService),
    ApiGateway(SourceGateway),
    ServiceRegistry(SourceRegistry),
    ConfigServer(SourceConfigServer),
    Dependency(SourceDependency),
    MessagePool(SourcePool),
    MessageBroker(SourceBroker),
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceService {
    pub name: String,
    pub span: Span,
    pub extends: Option<String>,
    pub config_server: Option<String>,
    pub service_registry: Option<String>,
    pub deployment: Option<Deployment>,
    pub comm_style: CommStyle,
    pub api: SourceApi,
    pub docstring: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceApi {
    pub typedefs: Vec<SourceTypeDef>,
    pub functions: Vec<SourceFunction>,
    pub internal: Vec<SourceFunction>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceTypeDef {
    pub name: String,
    pub span: Span,
    pub inherits: Vec<String>,
    pub fields: Vec<SourceField>,
    pub crud: Vec<SourceCrud>,
    pub docstring: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceField {
    pub name: String,
    pub span: Span,
    /// Type expression, e.g. `list<Order>`.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: String,
    pub classifiers: Vec<String>,
    pub constraints: Vec<String>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SourceCrudOp {
    Create,
    Read,
    Update,
    Delete,
    /// Shorthand for all four.
    All,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(deny_unknown_fields))]
pub struct SourceCrud {
    pub op: SourceCrudOp,
    /// Message published on completion, with the `Broker.channel` it goes to.
    #[cfg_attr(feature = "serde", serde(default))]
    pub message: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub channel: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceFunction {
    pub name: String,
    pub span: Span,
    #[cfg_attr(feature = "serde", serde(rename = "returns"))]
    pub ret: String,
    pub params: Vec<SourceParam>,
    pub annotations: Vec<SourceAnnotation>,
    pub docstring: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceParam {
    pub name: String,
    pub span: Span,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: String,
    pub default: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(tag = "kind", rename_all = "lowercase")
)]
pub enum SourceAnnotation {
    Rest {
        verb: HttpVerb,
        #[cfg_attr(feature = "serde", serde(default))]
        mapping: Option<String>,
        #[cfg_attr(feature = "serde", serde(default))]
        span: Span,
    },
    Producer {
        subscriptions: Vec<SourceSubscription>,
    },
    Consumer {
        subscriptions: Vec<SourceSubscription>,
    },
    Async,
}

/// `message -> Broker.channel`.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(deny_unknown_fields))]
pub struct SourceSubscription {
    pub message: String,
    pub channel: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceGateway {
    pub name: String,
    pub span: Span,
    pub config_server: Option<String>,
    pub service_registry: Option<String>,
    pub deployment: Option<Deployment>,
    pub comm_style: CommStyle,
    pub gateway_for: Vec<SourceRoute>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(deny_unknown_fields))]
pub struct SourceRoute {
    pub service: String,
    pub path: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceRegistry {
    pub name: String,
    pub span: Span,
    pub deployment: Option<Deployment>,
    pub client_mode: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceConfigServer {
    pub name: String,
    pub span: Span,
    pub deployment: Option<Deployment>,
    pub search_path: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceDependency {
    pub span: Span,
    pub start: String,
    pub end: String,
    pub directives: Vec<SourceDirective>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceDirective {
    pub method: String,
    pub span: Span,
    pub failure_pattern: FailurePattern,
    pub fallback: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourcePool {
    pub span: Span,
    pub groups: Vec<SourceGroup>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceGroup {
    pub name: String,
    pub span: Span,
    pub groups: Vec<SourceGroup>,
    pub messages: Vec<SourceMessage>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceMessage {
    pub name: String,
    pub span: Span,
    pub fields: Vec<SourceField>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceBroker {
    pub name: String,
    pub span: Span,
    pub channels: Vec<SourceChannel>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SourceChannel {
    pub name: String,
    pub span: Span,
    pub message: String,
    pub p2p: bool,
    pub timeout: Option<u32>,
}
