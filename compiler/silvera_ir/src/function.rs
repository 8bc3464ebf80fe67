//! Service API functions and their annotations.

use std::fmt;

use crate::{ChannelHandle, DeclId, FunctionId, MessageId, Ref, Span, TypeRef};

/// HTTP method of a REST endpoint.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub enum HttpVerb {
    #[cfg_attr(feature = "serde", serde(rename = "GET"))]
    Get,
    #[cfg_attr(feature = "serde", serde(rename = "POST"))]
    Post,
    #[cfg_attr(feature = "serde", serde(rename = "PUT"))]
    Put,
    #[cfg_attr(feature = "serde", serde(rename = "DELETE"))]
    Delete,
}

impl HttpVerb {
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Circuit-breaker behavior for a dependency call.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum FailurePattern {
    #[default]
    FailFast,
    FailSilent,
    FallbackMethod,
    FallbackStatic,
    FallbackCache,
}

impl FailurePattern {
    pub const fn as_str(self) -> &'static str {
        match self {
            FailurePattern::FailFast => "fail_fast",
            FailurePattern::FailSilent => "fail_silent",
            FailurePattern::FallbackMethod => "fallback_method",
            FailurePattern::FallbackStatic => "fallback_static",
            FailurePattern::FallbackCache => "fallback_cache",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Param {
    pub name: String,
    pub span: Span,
    pub ty: TypeRef,
    pub default: Option<String>,
    /// Appears as `{name}` in the REST path.
    pub url_placeholder: bool,
    /// Appears as a key in the REST path's query string.
    pub query_param: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef, span: Span) -> Self {
        Param {
            name: name.into(),
            span,
            ty,
            default: None,
            url_placeholder: false,
            query_param: false,
        }
    }
}

/// A `message -> broker.channel` pair from a producer or consumer annotation.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Subscription {
    pub message: Ref<MessageId>,
    pub channel: Ref<ChannelHandle>,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Annotation {
    Rest {
        verb: HttpVerb,
        mapping: Option<String>,
        span: Span,
    },
    Producer(Vec<Subscription>),
    Consumer(Vec<Subscription>),
    Async,
}

/// A function in a service API.
///
/// Dependency clones are ordinary functions owned by the dependent service
/// with `dep` pointing at the function they were copied from.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Function {
    pub name: String,
    pub span: Span,
    pub owner: DeclId,
    pub ret: TypeRef,
    pub params: Vec<Param>,
    pub annotations: Vec<Annotation>,
    pub docstring: Option<String>,
    pub http_verb: Option<HttpVerb>,
    pub rest_path: Option<String>,
    pub cb_pattern: Option<FailurePattern>,
    pub cb_fallback: Option<String>,
    pub dep: Option<FunctionId>,
}

impl Function {
    pub fn new(name: impl Into<String>, owner: DeclId, ret: TypeRef, span: Span) -> Self {
        Function {
            name: name.into(),
            span,
            owner,
            ret,
            params: Vec::new(),
            annotations: Vec::new(),
            docstring: None,
            http_verb: None,
            rest_path: None,
            cb_pattern: None,
            cb_fallback: None,
            dep: None,
        }
    }

    /// Explicit `@rest` annotation, if present.
    pub fn rest_annotation(&self) -> Option<(HttpVerb, Option<&str>)> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Rest { verb, mapping, .. } => Some((*verb, mapping.as_deref())),
            _ => None,
        })
    }

    pub fn is_async(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| matches!(a, Annotation::Async))
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Subscriptions from every producer annotation.
    pub fn produced(&self) -> impl Iterator<Item = &Subscription> {
        self.annotations.iter().flat_map(|a| match a {
            Annotation::Producer(subs) => subs.as_slice(),
            _ => [].as_slice(),
        })
    }

    /// Subscriptions from every consumer annotation.
    pub fn consumed(&self) -> impl Iterator<Item = &Subscription> {
        self.annotations.iter().flat_map(|a| match a {
            Annotation::Consumer(subs) => subs.as_slice(),
            _ => [].as_slice(),
        })
    }

    pub fn is_producer(&self) -> bool {
        self.produced().next().is_some()
    }

    pub fn is_consumer(&self) -> bool {
        self.consumed().next().is_some()
    }

    /// Copy this function into `owner`'s dependency list.
    ///
    /// The copy keeps name, types, annotations, and HTTP verb. REST path and
    /// parameter URL flags are recomputed for it later; circuit-breaker
    /// settings are the caller's to fill in.
    pub fn dependency_clone(&self, owner: DeclId, origin: FunctionId) -> Function {
        Function {
            name: self.name.clone(),
            span: self.span,
            owner,
            ret: self.ret.clone(),
            params: self
                .params
                .iter()
                .map(|p| Param {
                    default: p.default.clone(),
                    ..Param::new(p.name.clone(), p.ty.clone(), p.span)
                })
                .collect(),
            annotations: self.annotations.clone(),
            docstring: self.docstring.clone(),
            http_verb: self.http_verb,
            rest_path: None,
            cb_pattern: None,
            cb_fallback: None,
            dep: Some(origin),
        }
    }
}
