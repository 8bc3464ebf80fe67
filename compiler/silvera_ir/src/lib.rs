//! Declaration model for Silvera architecture descriptions.
//!
//! A Silvera project is a set of modules, each declaring services, API
//! gateways, service registries, config servers, dependencies between
//! services, a message pool, and message brokers. This crate holds those
//! declarations in arenas addressed by typed handles:
//!
//! - [`Model`] owns every module and declaration
//! - [`Ref`] is a reference slot, symbolic until resolution fills it
//! - [`syntax`] is the source-level tree a front end produces
//! - [`lower`] turns source modules into a [`Model`]
//!
//! Resolution itself lives in `silvera_resolve`.

mod decl;
mod deployment;
mod function;
mod ids;
mod lower;
mod messaging;
mod model;
mod reference;
mod span;
pub mod syntax;
mod typedef;
mod types;

pub use decl::{
    Api, ApiGatewayDecl, CommStyle, ConfigServerDecl, Decl, DeclKind, DependencyDecl,
    GatewayRoute, ResilienceDirective, ServiceDecl, ServiceRegistryDecl,
};
pub use deployment::{Deployment, HostKind, RestartPolicy};
pub use function::{Annotation, FailurePattern, Function, HttpVerb, Param, Subscription};
pub use ids::{ChannelHandle, DeclId, DeploymentId, FunctionId, GroupId, MessageId, ModuleId, TypeDefId};
pub use lower::{lower, LowerError};
pub use messaging::{Message, MessageBroker, MessageChannel, MessageGroup, MessagePool};
pub use model::{split_fqn, DuplicateModule, Import, Model, Module, MODULE_EXTENSION};
pub use reference::{Ref, Symbol};
pub use span::Span;
pub use typedef::{Classifiers, CrudDirective, CrudEvent, CrudOp, TypeDef, TypeField};
pub use types::{Primitive, TypeRef, TypeSyntaxError, MAX_TYPE_NESTING};
