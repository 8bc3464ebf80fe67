//! Two-state reference slots.

use crate::Span;

/// A name as written in source, with the place it was written.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Symbol {
    pub name: String,
    pub span: Span,
}

impl Symbol {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Symbol {
            name: name.into(),
            span,
        }
    }

    /// Whether the name is fully qualified (`pkg.module.Name`).
    pub fn is_qualified(&self) -> bool {
        self.name.contains('.')
    }
}

/// A reference that is a symbolic name until resolution replaces it with a
/// typed handle.
///
/// After a successful resolution run no `Unresolved` slot remains anywhere
/// in the model.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Ref<T> {
    Unresolved(Symbol),
    Resolved(T),
}

impl<T: Copy> Ref<T> {
    pub fn unresolved(name: impl Into<String>, span: Span) -> Self {
        Ref::Unresolved(Symbol::new(name, span))
    }

    /// The handle, if resolved.
    #[inline]
    pub fn get(&self) -> Option<T> {
        match self {
            Ref::Resolved(id) => Some(*id),
            Ref::Unresolved(_) => None,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Ref::Resolved(_))
    }

    /// The pending symbol, if not yet resolved.
    #[inline]
    pub fn symbol(&self) -> Option<&Symbol> {
        match self {
            Ref::Unresolved(symbol) => Some(symbol),
            Ref::Resolved(_) => None,
        }
    }
}
