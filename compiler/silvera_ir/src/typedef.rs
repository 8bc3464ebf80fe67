//! User-defined types declared in a service API.

use bitflags::bitflags;

use crate::{ChannelHandle, DeclId, MessageId, Ref, Span, TypeRef};

bitflags! {
    /// Field classifiers.
    ///
    /// `ID` implies `UNIQUE` and `REQUIRED`; the query methods account for it.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Classifiers: u8 {
        const ID = 1;
        const UNIQUE = 1 << 1;
        const REQUIRED = 1 << 2;
        const ORDERED = 1 << 3;
    }
}

impl Classifiers {
    /// Classifier for a DSL keyword such as `unique`.
    pub fn from_keyword(name: &str) -> Option<Classifiers> {
        match name {
            "id" => Some(Classifiers::ID),
            "unique" => Some(Classifiers::UNIQUE),
            "required" => Some(Classifiers::REQUIRED),
            "ordered" => Some(Classifiers::ORDERED),
            _ => None,
        }
    }

    pub fn is_id(self) -> bool {
        self.contains(Classifiers::ID)
    }

    pub fn is_unique(self) -> bool {
        self.intersects(Classifiers::ID | Classifiers::UNIQUE)
    }

    pub fn is_required(self) -> bool {
        self.intersects(Classifiers::ID | Classifiers::REQUIRED)
    }

    pub fn is_ordered(self) -> bool {
        self.contains(Classifiers::ORDERED)
    }
}

/// A field of a user type or a message.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TypeField {
    pub name: String,
    pub span: Span,
    pub ty: TypeRef,
    pub classifiers: Classifiers,
    pub constraints: Vec<String>,
}

/// A CRUD operation requested for a type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CrudOp {
    Create,
    Read,
    Update,
    Delete,
}

impl CrudOp {
    pub const ALL: [CrudOp; 4] = [CrudOp::Create, CrudOp::Read, CrudOp::Update, CrudOp::Delete];

    pub const fn as_str(self) -> &'static str {
        match self {
            CrudOp::Create => "create",
            CrudOp::Read => "read",
            CrudOp::Update => "update",
            CrudOp::Delete => "delete",
        }
    }
}

/// Message published when a CRUD operation completes.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CrudEvent {
    pub message: Ref<MessageId>,
    pub channel: Ref<ChannelHandle>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CrudDirective {
    pub op: CrudOp,
    pub event: Option<CrudEvent>,
    pub span: Span,
}

/// A user-defined type.
///
/// `owner` is the service that declares it. Derived services append their
/// base's typedefs by handle, so one typedef can appear in several APIs.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TypeDef {
    pub name: String,
    pub span: Span,
    pub owner: DeclId,
    pub inherits: Vec<String>,
    pub fields: Vec<TypeField>,
    pub crud: Vec<CrudDirective>,
    pub docstring: Option<String>,
}

impl TypeDef {
    pub fn field(&self, name: &str) -> Option<&TypeField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The field flagged `id`, if any.
    pub fn id_field(&self) -> Option<&TypeField> {
        self.fields.iter().find(|f| f.classifiers.is_id())
    }

    pub fn has_crud(&self, op: CrudOp) -> bool {
        self.crud.iter().any(|d| d.op == op)
    }

    /// Event published by the given operation, if it declares one.
    pub fn event_for(&self, op: CrudOp) -> Option<&CrudEvent> {
        self.crud
            .iter()
            .find(|d| d.op == op)
            .and_then(|d| d.event.as_ref())
    }
}
