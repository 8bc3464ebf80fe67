//! Resolution errors.
//!
//! Resolution stops at the first error. Each variant carries the module and
//! span it points at, and converts into a [`Diagnostic`] for the driver.

use std::fmt;

use silvera_diagnostic::{Diagnostic, ErrorCode};
use silvera_ir::{DeclId, Model, ModuleId, Span};

/// A span inside a named module.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Location {
    pub module: String,
    pub span: Span,
}

impl Location {
    pub fn new(module: impl Into<String>, span: Span) -> Self {
        Location {
            module: module.into(),
            span,
        }
    }

    pub fn in_module(model: &Model, module: ModuleId, span: Span) -> Self {
        Location::new(model.module(module).path.clone(), span)
    }

    /// Location of a declaration's own span.
    pub fn of_decl(model: &Model, decl: DeclId) -> Self {
        let d = model.decl(decl);
        Location::in_module(model, d.module, d.span)
    }

    /// A span inside the module that holds `decl`.
    pub fn near_decl(model: &Model, decl: DeclId, span: Span) -> Self {
        Location::in_module(model, model.decl(decl).module, span)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.module, self.span)
    }
}

/// API member that a derived service tried to redefine.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberKind {
    Function,
    TypeDef,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Function => f.write_str("function"),
            MemberKind::TypeDef => f.write_str("type"),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum ResolveError {
    // Module graph
    #[error("cyclic import between modules: {}", .modules.join(", "))]
    CyclicImport { modules: Vec<String> },

    #[error("imported module `{path}` does not exist")]
    ModuleNotFound { path: String, at: Location },

    #[error("`{name}` is declared more than once in `{}`", .at.module)]
    DuplicateDeclaration {
        name: String,
        at: Location,
        first: Span,
    },

    // References
    #[error("unresolved reference `{name}`")]
    UnresolvedReference { name: String, at: Location },

    #[error("reference `{name}` is ambiguous; it is declared in {}", .candidates.join(", "))]
    AmbiguousReference {
        name: String,
        candidates: Vec<String>,
        at: Location,
    },

    #[error("`{name}` is a {found}, expected a {expected}")]
    WrongKind {
        name: String,
        expected: &'static str,
        found: &'static str,
        at: Location,
    },

    // Types
    #[error("unknown type `{type_name}` in service `{owner}`")]
    TypeNotFound {
        owner: String,
        type_name: String,
        at: Location,
    },

    #[error("field `{field}` of message `{message}` must use primitive types")]
    NonPrimitiveMessageField {
        message: String,
        field: String,
        at: Location,
    },

    // Messaging
    #[error("more than one message pool is declared")]
    MultipleMessagePools { at: Location, first: Location },

    #[error("message group `{group}` has no messages")]
    EmptyMessageGroup { group: String, at: Location },

    #[error("message group `{group}` is declared more than once")]
    DuplicateMessageGroup { group: String, at: Location },

    #[error("message `{message}` is declared more than once in group `{group}`")]
    DuplicateMessage {
        message: String,
        group: String,
        at: Location,
    },

    #[error("channel `{channel}` is declared more than once in broker `{broker}`")]
    DuplicateChannel {
        channel: String,
        broker: String,
        at: Location,
    },

    #[error("message broker `{broker}` is declared more than once")]
    DuplicateBroker { broker: String, at: Location },

    #[error("message broker `{broker}` is declared but there is no message pool")]
    BrokerWithoutPool { broker: String, at: Location },

    #[error("channel `{channel}` of broker `{broker}` carries unknown message `{message}`")]
    ChannelMessageNotFound {
        channel: String,
        broker: String,
        message: String,
        at: Location,
    },

    #[error("unknown message `{message}`")]
    UnknownMessage { message: String, at: Location },

    #[error("unknown message broker `{broker}`")]
    UnknownBroker { broker: String, at: Location },

    #[error("unknown channel `{channel}` in broker `{broker}`")]
    UnknownChannel {
        channel: String,
        broker: String,
        at: Location,
    },

    // Inheritance
    #[error("service `{service}` redefines {kind} `{member}` inherited from `{base}`")]
    UnsupportedOverride {
        service: String,
        base: String,
        member: String,
        kind: MemberKind,
        at: Location,
    },

    #[error("service `{service}` inherits from itself")]
    CyclicInheritance { service: String, at: Location },

    // Dependencies
    #[error("service `{service}` has no methods named {}", .missing.join(", "))]
    MissingDependencyMethods {
        service: String,
        missing: Vec<String>,
        at: Location,
    },

    // REST
    #[error("placeholder `{{{placeholder}}}` in mapping `{mapping}` of `{function}` is not a parameter")]
    UnknownPlaceholder {
        function: String,
        placeholder: String,
        mapping: String,
        at: Location,
    },

    #[error("query parameter `{param}` in mapping `{mapping}` of `{function}` is not a parameter")]
    UnknownQueryParam {
        function: String,
        param: String,
        mapping: String,
        at: Location,
    },

    #[error("REST strategy `{strategy}` cannot infer a verb for `{function}`")]
    UnsupportedRestStrategy {
        strategy: &'static str,
        function: String,
        at: Location,
    },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ResolveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolveError::CyclicImport { .. } => ErrorCode::E0001,
            ResolveError::ModuleNotFound { .. } => ErrorCode::E0002,
            ResolveError::DuplicateDeclaration { .. } => ErrorCode::E0003,
            ResolveError::UnresolvedReference { .. } => ErrorCode::E1001,
            ResolveError::AmbiguousReference { .. } => ErrorCode::E1002,
            ResolveError::WrongKind { .. } => ErrorCode::E1003,
            ResolveError::TypeNotFound { .. } => ErrorCode::E2001,
            ResolveError::NonPrimitiveMessageField { .. } => ErrorCode::E2002,
            ResolveError::MultipleMessagePools { .. } => ErrorCode::E3001,
            ResolveError::EmptyMessageGroup { .. } => ErrorCode::E3002,
            ResolveError::DuplicateMessageGroup { .. } => ErrorCode::E3003,
            ResolveError::DuplicateMessage { .. } => ErrorCode::E3004,
            ResolveError::DuplicateChannel { .. } => ErrorCode::E3005,
            ResolveError::DuplicateBroker { .. } => ErrorCode::E3006,
            ResolveError::BrokerWithoutPool { .. } => ErrorCode::E3007,
            ResolveError::ChannelMessageNotFound { .. } => ErrorCode::E3008,
            ResolveError::UnknownMessage { .. } => ErrorCode::E3009,
            ResolveError::UnknownBroker { .. } => ErrorCode::E3010,
            ResolveError::UnknownChannel { .. } => ErrorCode::E3011,
            ResolveError::UnsupportedOverride { .. } => ErrorCode::E4001,
            ResolveError::CyclicInheritance { .. } => ErrorCode::E4002,
            ResolveError::MissingDependencyMethods { .. } => ErrorCode::E5001,
            ResolveError::UnknownPlaceholder { .. } => ErrorCode::E6001,
            ResolveError::UnknownQueryParam { .. } => ErrorCode::E6002,
            ResolveError::UnsupportedRestStrategy { .. } => ErrorCode::E6003,
            ResolveError::Internal { .. } => ErrorCode::E9001,
        }
    }

    /// Where the error points, if anywhere.
    pub fn location(&self) -> Option<&Location> {
        match self {
            ResolveError::CyclicImport { .. } | ResolveError::Internal { .. } => None,
            ResolveError::ModuleNotFound { at, .. }
            | ResolveError::DuplicateDeclaration { at, .. }
            | ResolveError::UnresolvedReference { at, .. }
            | ResolveError::AmbiguousReference { at, .. }
            | ResolveError::WrongKind { at, .. }
            | ResolveError::TypeNotFound { at, .. }
            | ResolveError::NonPrimitiveMessageField { at, .. }
            | ResolveError::MultipleMessagePools { at, .. }
            | ResolveError::EmptyMessageGroup { at, .. }
            | ResolveError::DuplicateMessageGroup { at, .. }
            | ResolveError::DuplicateMessage { at, .. }
            | ResolveError::DuplicateChannel { at, .. }
            | ResolveError::DuplicateBroker { at, .. }
            | ResolveError::BrokerWithoutPool { at, .. }
            | ResolveError::ChannelMessageNotFound { at, .. }
            | ResolveError::UnknownMessage { at, .. }
            | ResolveError::UnknownBroker { at, .. }
            | ResolveError::UnknownChannel { at, .. }
            | ResolveError::UnsupportedOverride { at, .. }
            | ResolveError::CyclicInheritance { at, .. }
            | ResolveError::MissingDependencyMethods { at, .. }
            | ResolveError::UnknownPlaceholder { at, .. }
            | ResolveError::UnknownQueryParam { at, .. }
            | ResolveError::UnsupportedRestStrategy { at, .. } => Some(at),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        ResolveError::Internal {
            message: message.into(),
        }
    }

    /// Convert into a diagnostic for rendering.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code()).with_message(self.to_string());
        if let Some(at) = self.location() {
            diag = diag.with_label_in(at.module.clone(), at.span, self.label());
        }

        match self {
            ResolveError::DuplicateDeclaration { at, first, .. } => diag
                .with_secondary_label_in(at.module.clone(), *first, "first declared here"),
            ResolveError::MultipleMessagePools { first, .. } => diag.with_secondary_label_in(
                first.module.clone(),
                first.span,
                "first pool declared here",
            ),
            ResolveError::CyclicImport { .. } => {
                diag.with_suggestion("move shared declarations into a module both sides import")
            }
            ResolveError::AmbiguousReference { name, candidates, .. } => {
                let qualified = candidates.first().map_or_else(String::new, |m| {
                    format!("`{}.{name}`", m.trim_end_matches(".si").replace('/', "."))
                });
                diag.with_suggestion(format!("use a fully-qualified name such as {qualified}"))
            }
            ResolveError::UnsupportedOverride { .. } => {
                diag.with_note("a derived service may add members but not redefine inherited ones")
            }
            ResolveError::UnsupportedRestStrategy { .. } => diag
                .with_note("only the default strategy infers verbs")
                .with_suggestion("annotate the function with `@rest(method=...)`"),
            ResolveError::Internal { .. } => {
                diag.with_note("this is a compiler bug; please report it")
            }
            _ => diag,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ResolveError::ModuleNotFound { .. } => "imported here",
            ResolveError::DuplicateDeclaration { .. } => "declared again here",
            ResolveError::UnresolvedReference { .. } => "not found in this module or its imports",
            ResolveError::AmbiguousReference { .. } => "matches more than one declaration",
            ResolveError::WrongKind { .. } => "referenced here",
            ResolveError::TypeNotFound { .. } => "not declared in this service's API",
            ResolveError::MissingDependencyMethods { .. } => "dependency declared here",
            ResolveError::UnsupportedOverride { .. } => "redefined here",
            ResolveError::CyclicInheritance { .. } => "inheritance cycle starts here",
            ResolveError::UnknownPlaceholder { .. }
            | ResolveError::UnknownQueryParam { .. }
            | ResolveError::UnsupportedRestStrategy { .. } => "in this function",
            _ => "here",
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_messages_and_codes() {
        let err = ResolveError::CyclicImport {
            modules: vec!["a.si".into(), "b.si".into()],
        };
        assert_eq!(err.to_string(), "cyclic import between modules: a.si, b.si");
        assert_eq!(err.code(), ErrorCode::E0001);
        assert!(err.location().is_none());

        let err = ResolveError::ChannelMessageNotFound {
            channel: "orders".into(),
            broker: "Bus".into(),
            message: "orders.Gone".into(),
            at: Location::new("msgs.si", Span::new(3, 9)),
        };
        assert_eq!(
            err.to_string(),
            "channel `orders` of broker `Bus` carries unknown message `orders.Gone`"
        );
        assert_eq!(err.code(), ErrorCode::E3008);

        let err = ResolveError::UnknownPlaceholder {
            function: "getOrder".into(),
            placeholder: "oid".into(),
            mapping: "orders/{oid}".into(),
            at: Location::new("orders.si", Span::DUMMY),
        };
        assert_eq!(
            err.to_string(),
            "placeholder `{oid}` in mapping `orders/{oid}` of `getOrder` is not a parameter"
        );
    }

    #[test]
    fn test_missing_methods_lists_all() {
        let err = ResolveError::MissingDependencyMethods {
            service: "Billing".into(),
            missing: vec!["charge".into(), "refund".into()],
            at: Location::new("orders.si", Span::new(0, 10)),
        };
        assert_eq!(err.to_string(), "service `Billing` has no methods named charge, refund");
    }

    #[test]
    fn test_to_diagnostic_labels_module() {
        let err = ResolveError::DuplicateDeclaration {
            name: "Orders".into(),
            at: Location::new("orders.si", Span::new(40, 46)),
            first: Span::new(0, 6),
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.code, ErrorCode::E0003);
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.labels[0].module.as_deref(), Some("orders.si"));
        assert_eq!(diag.primary_span(), Some(Span::new(40, 46)));
    }

    #[test]
    fn test_ambiguous_suggests_fqn() {
        let err = ResolveError::AmbiguousReference {
            name: "Gateway".into(),
            candidates: vec!["billing/core.si".into(), "shipping.si".into()],
            at: Location::new("orders.si", Span::DUMMY),
        };
        let diag = err.to_diagnostic();
        assert_eq!(
            diag.suggestions,
            vec!["use a fully-qualified name such as `billing.core.Gateway`".to_string()]
        );
    }
}
