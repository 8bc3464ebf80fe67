//! Semantic resolution for Silvera architecture models.
//!
//! [`resolve`] takes a freshly lowered [`Model`] whose cross-references are
//! still symbolic and returns it with every reference bound, every derived
//! service merged with its base, every deployment complete, and every public
//! function routed:
//!
//! ```text
//! Model (symbolic) ──▶ resolve ──▶ ResolvedModel ──▶ views::* / code generators
//!                        │
//!                        └── first failure ──▶ ResolveError ──▶ Diagnostic
//! ```
//!
//! # Module Organization
//!
//! - `graph`: import graph and resolution order
//! - `lookup`: name lookup through imports and fully-qualified names
//! - `inheritance`, `defaults`: `extends` merging, deployment defaults, ports
//! - `types`, `messaging`: type references, message catalog, subscriptions
//! - `dependencies`: dependency clones and the types they carry
//! - `rest`: HTTP verbs and paths
//! - [`views`]: read-only queries for code generators
//!
//! Resolution is all-or-nothing: the input model is consumed, and on error
//! no partially resolved model is handed back.

mod defaults;
mod dependencies;
mod error;
mod graph;
mod inheritance;
mod lookup;
mod messaging;
mod options;
mod pipeline;
mod rest;
mod types;
pub mod views;

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod testing;

use std::ops::Deref;

use silvera_ir::Model;

pub use defaults::PortAllocator;
pub use error::{Location, MemberKind, ResolveError};
pub use graph::ModuleGraph;
pub use lookup::lookup;
pub use options::{ResolveOptions, RestStrategyKind, UnknownStrategy};
pub use rest::{default_path, strategy_for, DefaultStrategy, PathNames, RestStrategy, UnsupportedStrategy};
pub use views::{MessageChannels, ServiceInstance};

/// A model that passed every resolution phase.
///
/// Only [`resolve`] and [`resolve_with`] construct one, so holding a
/// `ResolvedModel` means every reference slot is bound.
#[derive(Clone, Debug)]
pub struct ResolvedModel(Model);

impl ResolvedModel {
    pub fn into_inner(self) -> Model {
        self.0
    }
}

impl Deref for ResolvedModel {
    type Target = Model;

    fn deref(&self) -> &Model {
        &self.0
    }
}

/// Resolve `model` with default options.
pub fn resolve(model: Model) -> Result<ResolvedModel, ResolveError> {
    resolve_with(model, &ResolveOptions::default())
}

/// Resolve `model`, stopping at the first error.
pub fn resolve_with(mut model: Model, options: &ResolveOptions) -> Result<ResolvedModel, ResolveError> {
    pipeline::run(&mut model, options)?;
    Ok(ResolvedModel(model))
}
