//! Type expressions used by fields, parameters, and return values.
//!
//! A type is either a built-in primitive, a reference to a user-defined type
//! in the enclosing service, or a collection of types:
//!
//! ```text
//! TypeRef
//!  ├─ Primitive     str, i32, date, ...
//!  ├─ User          Ref<TypeDefId>, by simple name until resolved
//!  ├─ List / Set    list<T>, set<T>
//!  └─ Dict          dict<K, V>
//! ```

use std::fmt;

use crate::{Ref, Span, TypeDefId};

/// Built-in primitive types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Primitive {
    Date,
    I16,
    I32,
    I64,
    Bool,
    Int,
    Void,
    Str,
    Double,
    Float,
    Pwd,
}

impl Primitive {
    pub const ALL: [Primitive; 11] = [
        Primitive::Date,
        Primitive::I16,
        Primitive::I32,
        Primitive::I64,
        Primitive::Bool,
        Primitive::Int,
        Primitive::Void,
        Primitive::Str,
        Primitive::Double,
        Primitive::Float,
        Primitive::Pwd,
    ];

    pub fn from_name(name: &str) -> Option<Primitive> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Primitive::Date => "date",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Void => "void",
            Primitive::Str => "str",
            Primitive::Double => "double",
            Primitive::Float => "float",
            Primitive::Pwd => "pwd",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type expression.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeRef {
    Primitive(Primitive),
    User(Ref<TypeDefId>),
    List(Box<TypeRef>),
    Set(Box<TypeRef>),
    Dict {
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },
}

impl TypeRef {
    /// Parse a type expression such as `list<dict<str, Order>>`.
    ///
    /// User type names become unresolved references carrying `span`.
    pub fn parse(text: &str, span: Span) -> Result<TypeRef, TypeSyntaxError> {
        let mut parser = TypeParser {
            text,
            pos: 0,
            span,
            depth: 0,
        };
        let ty = parser.parse_type()?;
        parser.skip_whitespace();
        if parser.pos != text.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }

    /// Whether every user-type leaf is resolved.
    pub fn is_resolved(&self) -> bool {
        match self {
            TypeRef::Primitive(_) => true,
            TypeRef::User(r) => r.is_resolved(),
            TypeRef::List(elem) | TypeRef::Set(elem) => elem.is_resolved(),
            TypeRef::Dict { key, value } => key.is_resolved() && value.is_resolved(),
        }
    }

    /// Whether the expression mentions no user types at all.
    pub fn is_primitive_only(&self) -> bool {
        match self {
            TypeRef::Primitive(_) => true,
            TypeRef::User(_) => false,
            TypeRef::List(elem) | TypeRef::Set(elem) => elem.is_primitive_only(),
            TypeRef::Dict { key, value } => key.is_primitive_only() && value.is_primitive_only(),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            TypeRef::List(_) | TypeRef::Set(_) | TypeRef::Dict { .. }
        )
    }

    /// Visit every resolved user type, outermost first, key before value.
    pub fn for_each_user_type(&self, f: &mut impl FnMut(TypeDefId)) {
        match self {
            TypeRef::Primitive(_) => {}
            TypeRef::User(r) => {
                if let Some(id) = r.get() {
                    f(id);
                }
            }
            TypeRef::List(elem) | TypeRef::Set(elem) => elem.for_each_user_type(f),
            TypeRef::Dict { key, value } => {
                key.for_each_user_type(f);
                value.for_each_user_type(f);
            }
        }
    }

    /// Mutable access to every user-type leaf.
    pub fn for_each_user_slot<E>(
        &mut self,
        f: &mut impl FnMut(&mut Ref<TypeDefId>) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            TypeRef::Primitive(_) => Ok(()),
            TypeRef::User(r) => f(r),
            TypeRef::List(elem) | TypeRef::Set(elem) => elem.for_each_user_slot(f),
            TypeRef::Dict { key, value } => {
                key.for_each_user_slot(f)?;
                value.for_each_user_slot(f)
            }
        }
    }
}

/// Renders resolved user types as `#<index>` since names live in the model.
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => write!(f, "{p}"),
            TypeRef::User(Ref::Unresolved(symbol)) => f.write_str(&symbol.name),
            TypeRef::User(Ref::Resolved(id)) => write!(f, "#{}", id.raw()),
            TypeRef::List(elem) => write!(f, "list<{elem}>"),
            TypeRef::Set(elem) => write!(f, "set<{elem}>"),
            TypeRef::Dict { key, value } => write!(f, "dict<{key}, {value}>"),
        }
    }
}

/// Malformed type expression text.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("invalid type `{text}` at byte {offset}: {reason}")]
pub struct TypeSyntaxError {
    pub text: String,
    pub offset: usize,
    pub reason: String,
    pub span: Span,
}

/// Deepest collection nesting a type expression may use.
///
/// Every later walk over a `TypeRef` recurses, so the bound holds for them too.
pub const MAX_TYPE_NESTING: usize = 64;

struct TypeParser<'a> {
    text: &'a str,
    pos: usize,
    span: Span,
    depth: usize,
}

impl<'a> TypeParser<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, reason: impl Into<String>) -> TypeSyntaxError {
        TypeSyntaxError {
            text: self.text.to_string(),
            offset: self.pos,
            reason: reason.into(),
            span: self.span,
        }
    }

    fn ident(&mut self) -> Result<&'a str, TypeSyntaxError> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            self.pos += c.len_utf8();
        }
        if start == self.pos {
            return Err(self.error("expected a type name"));
        }
        Ok(&self.text[start..self.pos])
    }

    fn expect(&mut self, expected: char) -> Result<(), TypeSyntaxError> {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            Ok(())
        } else {
            Err(self.error(format!("expected `{expected}`")))
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, TypeSyntaxError> {
        let name = self.ident()?;
        if matches!(name, "list" | "set" | "dict") {
            if self.depth == MAX_TYPE_NESTING {
                return Err(self.error(format!(
                    "collections nested deeper than {MAX_TYPE_NESTING} levels"
                )));
            }
            self.depth += 1;
        }
        let ty = self.parse_type_after(name);
        if matches!(name, "list" | "set" | "dict") {
            self.depth -= 1;
        }
        ty
    }

    fn parse_type_after(&mut self, name: &str) -> Result<TypeRef, TypeSyntaxError> {
        match name {
            "list" | "set" => {
                self.expect('<')?;
                let elem = Box::new(self.parse_type()?);
                self.expect('>')?;
                Ok(if name == "list" {
                    TypeRef::List(elem)
                } else {
                    TypeRef::Set(elem)
                })
            }
            "dict" => {
                self.expect('<')?;
                let key = Box::new(self.parse_type()?);
                self.expect(',')?;
                let value = Box::new(self.parse_type()?);
                self.expect('>')?;
                Ok(TypeRef::Dict { key, value })
            }
            _ => Ok(match Primitive::from_name(name) {
                Some(p) => TypeRef::Primitive(p),
                None => TypeRef::User(Ref::unresolved(name, self.span)),
            }),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
