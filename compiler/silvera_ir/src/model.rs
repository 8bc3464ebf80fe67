//! The whole-program model: modules plus arenas of everything they declare.
//!
//! ```text
//! Model
//!  ├─ modules      path, source, imports, decls
//!  ├─ decls        services, gateways, registries, ...
//!  ├─ functions    API functions and dependency clones
//!  ├─ typedefs
//!  ├─ deployments  shared by handle between base and derived services
//!  ├─ groups       message groups
//!  └─ messages
//! ```
//!
//! Arenas only grow. Handles stay valid for the lifetime of the model.

use rustc_hash::FxHashMap;

use crate::{
    Decl, DeclId, DeclKind, Deployment, DeploymentId, Function, FunctionId, GroupId, Message,
    MessageGroup, MessageId, ModuleId, ServiceDecl, Span, TypeDef, TypeDefId,
};

/// Module file extension.
pub const MODULE_EXTENSION: &str = ".si";

/// An `import` line: a dotted module URL.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Import {
    pub url: String,
    pub span: Span,
}

impl Import {
    /// Module path the URL names: `share.setup` is `share/setup.si`.
    pub fn module_path(&self) -> String {
        url_to_path(&self.url)
    }
}

/// One loaded source file.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Module {
    /// Path relative to the project root, using `/` separators.
    pub path: String,
    pub source: String,
    pub imports: Vec<Import>,
    pub decls: Vec<DeclId>,
}

impl Module {
    /// Dotted prefix used in fully-qualified names: `share/setup.si` is `share.setup`.
    pub fn qualifier(&self) -> String {
        self.path
            .strip_suffix(MODULE_EXTENSION)
            .unwrap_or(&self.path)
            .replace('/', ".")
    }
}

fn url_to_path(url: &str) -> String {
    format!("{}{MODULE_EXTENSION}", url.replace('.', "/"))
}

/// Split `share.setup.Config` into the module path `share/setup.si` and the
/// local name `Config`. Returns `None` for unqualified names.
pub fn split_fqn(fqn: &str) -> Option<(String, &str)> {
    let (qualifier, name) = fqn.rsplit_once('.')?;
    Some((url_to_path(qualifier), name))
}

/// A second module was registered under an existing path.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("module `{0}` is loaded twice")]
pub struct DuplicateModule(pub String);

#[derive(Clone, Debug, Default)]
pub struct Model {
    modules: Vec<Module>,
    decls: Vec<Decl>,
    functions: Vec<Function>,
    typedefs: Vec<TypeDef>,
    deployments: Vec<Deployment>,
    groups: Vec<MessageGroup>,
    messages: Vec<Message>,
    by_path: FxHashMap<String, ModuleId>,
    msg_pool: Option<DeclId>,
    brokers: FxHashMap<String, DeclId>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    // Modules

    pub fn add_module(
        &mut self,
        path: impl Into<String>,
        source: impl Into<String>,
        imports: Vec<Import>,
    ) -> Result<ModuleId, DuplicateModule> {
        let path = path.into();
        if self.by_path.contains_key(&path) {
            return Err(DuplicateModule(path));
        }
        let id = ModuleId::from_len(self.modules.len());
        self.by_path.insert(path.clone(), id);
        self.modules.push(Module {
            path,
            source: source.into(),
            imports,
            decls: Vec::new(),
        });
        Ok(id)
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    /// Modules in load order.
    pub fn modules(&self) -> impl ExactSizeIterator<Item = (ModuleId, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(i, m)| (ModuleId::from_len(i), m))
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn module_by_path(&self, path: &str) -> Option<ModuleId> {
        self.by_path.get(path).copied()
    }

    // Declarations

    /// Add a declaration to `module`, after the ones already there.
    pub fn add_decl(
        &mut self,
        module: ModuleId,
        name: Option<String>,
        span: Span,
        kind: DeclKind,
    ) -> DeclId {
        let id = DeclId::from_len(self.decls.len());
        self.decls.push(Decl {
            name,
            span,
            module,
            kind,
        });
        self.modules[module.index()].decls.push(id);
        id
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    /// Declarations in module load order, then declaration order.
    pub fn decls(&self) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.modules
            .iter()
            .flat_map(|m| m.decls.iter().map(|&id| (id, self.decl(id))))
    }

    /// Named declaration in a single module.
    pub fn decl_by_name(&self, module: ModuleId, name: &str) -> Option<DeclId> {
        self.module(module)
            .decls
            .iter()
            .copied()
            .find(|&id| self.decl(id).name.as_deref() == Some(name))
    }

    /// Declaration by fully-qualified name, ignoring imports.
    pub fn decl_by_fqn(&self, fqn: &str) -> Option<DeclId> {
        let (path, name) = split_fqn(fqn)?;
        self.decl_by_name(self.module_by_path(&path)?, name)
    }

    pub fn service(&self, id: DeclId) -> Option<&ServiceDecl> {
        self.decl(id).as_service()
    }

    pub fn service_mut(&mut self, id: DeclId) -> Option<&mut ServiceDecl> {
        self.decl_mut(id).as_service_mut()
    }

    /// Every service, in module then declaration order.
    pub fn services(&self) -> impl Iterator<Item = (DeclId, &ServiceDecl)> {
        self.decls()
            .filter_map(|(id, decl)| decl.as_service().map(|s| (id, s)))
    }

    /// `module.qualifier.Name` of a named declaration.
    pub fn decl_fqn(&self, id: DeclId) -> String {
        let decl = self.decl(id);
        format!(
            "{}.{}",
            self.module(decl.module).qualifier(),
            decl.display_name()
        )
    }

    // Functions and types

    pub fn push_function(&mut self, function: Function) -> FunctionId {
        let id = FunctionId::from_len(self.functions.len());
        self.functions.push(function);
        id
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Public API function of a service by name, inherited ones included.
    pub fn api_function(&self, service: DeclId, name: &str) -> Option<FunctionId> {
        let svc = self.service(service)?;
        svc.api
            .functions
            .iter()
            .copied()
            .find(|&f| self.function(f).name == name)
    }

    /// Dependency clone held by a service, by name.
    pub fn dep_function(&self, service: DeclId, name: &str) -> Option<FunctionId> {
        let svc = self.service(service)?;
        svc.dep_functions
            .iter()
            .copied()
            .find(|&f| self.function(f).name == name)
    }

    pub fn push_typedef(&mut self, typedef: TypeDef) -> TypeDefId {
        let id = TypeDefId::from_len(self.typedefs.len());
        self.typedefs.push(typedef);
        id
    }

    pub fn typedef(&self, id: TypeDefId) -> &TypeDef {
        &self.typedefs[id.index()]
    }

    pub fn typedef_mut(&mut self, id: TypeDefId) -> &mut TypeDef {
        &mut self.typedefs[id.index()]
    }

    /// Typedef in a service API by name, inherited ones included.
    pub fn api_typedef(&self, service: DeclId, name: &str) -> Option<TypeDefId> {
        let svc = self.service(service)?;
        svc.api
            .typedefs
            .iter()
            .copied()
            .find(|&t| self.typedef(t).name == name)
    }

    // Deployments

    pub fn push_deployment(&mut self, deployment: Deployment) -> DeploymentId {
        let id = DeploymentId::from_len(self.deployments.len());
        self.deployments.push(deployment);
        id
    }

    pub fn deployment(&self, id: DeploymentId) -> &Deployment {
        &self.deployments[id.index()]
    }

    pub fn deployment_mut(&mut self, id: DeploymentId) -> &mut Deployment {
        &mut self.deployments[id.index()]
    }

    // Messaging

    pub fn push_group(&mut self, group: MessageGroup) -> GroupId {
        let id = GroupId::from_len(self.groups.len());
        self.groups.push(group);
        id
    }

    pub fn group(&self, id: GroupId) -> &MessageGroup {
        &self.groups[id.index()]
    }

    pub fn group_mut(&mut self, id: GroupId) -> &mut MessageGroup {
        &mut self.groups[id.index()]
    }

    pub fn push_message(&mut self, message: Message) -> MessageId {
        let id = MessageId::from_len(self.messages.len());
        self.messages.push(message);
        id
    }

    pub fn message(&self, id: MessageId) -> &Message {
        &self.messages[id.index()]
    }

    pub fn message_mut(&mut self, id: MessageId) -> &mut Message {
        &mut self.messages[id.index()]
    }

    /// Dotted path of a group from the pool root.
    pub fn group_fqn(&self, id: GroupId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(g) = current {
            let group = self.group(g);
            parts.push(group.name.as_str());
            current = group.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    pub fn message_fqn(&self, id: MessageId) -> String {
        let message = self.message(id);
        format!("{}.{}", self.group_fqn(message.group), message.name)
    }

    /// Pool declaration, once the messaging pass has located it.
    pub fn msg_pool(&self) -> Option<DeclId> {
        self.msg_pool
    }

    pub fn set_msg_pool(&mut self, pool: DeclId) {
        self.msg_pool = Some(pool);
    }

    /// Top-level groups of the pool.
    pub fn pool_groups(&self) -> &[GroupId] {
        match self.msg_pool.map(|id| &self.decl(id).kind) {
            Some(DeclKind::MessagePool(pool)) => &pool.groups,
            _ => &[],
        }
    }

    /// Message by fully-qualified name (`group.sub.Name`).
    pub fn find_message(&self, fqn: &str) -> Option<MessageId> {
        let (group_path, name) = fqn.rsplit_once('.')?;
        let mut segments = group_path.split('.');
        let first = segments.next()?;
        let mut group = self
            .pool_groups()
            .iter()
            .copied()
            .find(|&g| self.group(g).name == first)?;
        for segment in segments {
            group = self
                .group(group)
                .groups
                .iter()
                .copied()
                .find(|&g| self.group(g).name == segment)?;
        }
        self.group(group)
            .messages
            .iter()
            .copied()
            .find(|&m| self.message(m).name == name)
    }

    pub fn register_broker(&mut self, name: impl Into<String>, broker: DeclId) {
        self.brokers.insert(name.into(), broker);
    }

    pub fn broker_by_name(&self, name: &str) -> Option<DeclId> {
        self.brokers.get(name).copied()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
