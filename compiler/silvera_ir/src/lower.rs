//! Lowering from source declarations to the arena model.
//!
//! Lowering is purely structural: it allocates arena entries, parses type
//! expressions, and turns every textual reference into an unresolved
//! [`Ref`]. Nothing is looked up across declarations here.

use crate::syntax::{
    SourceAnnotation, SourceBroker, SourceConfigServer, SourceCrud, SourceCrudOp, SourceDecl,
    SourceDependency, SourceField, SourceFunction, SourceGateway, SourceGroup, SourceModule,
    SourcePool, SourceRegistry, SourceService, SourceSubscription, SourceTypeDef,
};
use crate::{
    Annotation, ApiGatewayDecl, Classifiers, ConfigServerDecl, CrudDirective, CrudEvent, CrudOp,
    DeclId, DeclKind, DependencyDecl, DuplicateModule, Function, GatewayRoute, GroupId, Import,
    Message, MessageBroker, MessageChannel, MessageGroup, MessagePool, Model, ModuleId, Param,
    Ref, ResilienceDirective, ServiceDecl, ServiceRegistryDecl, Span, Subscription, TypeDef,
    TypeField, TypeRef, TypeSyntaxError,
};

/// Structural error while lowering source modules.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum LowerError {
    #[error(transparent)]
    DuplicateModule(#[from] DuplicateModule),

    #[error("{module}: {error}")]
    TypeSyntax {
        module: String,
        #[source]
        error: TypeSyntaxError,
    },

    #[error("{module}: unknown classifier `{classifier}` on field `{field}`")]
    UnknownClassifier {
        module: String,
        field: String,
        classifier: String,
        span: Span,
    },

    #[error("{module}: event on `{op}` names a message but no channel, or a channel but no message")]
    IncompleteCrudEvent {
        module: String,
        op: &'static str,
        span: Span,
    },
}

impl LowerError {
    /// Module path and span the error points at.
    pub fn location(&self) -> Option<(&str, Span)> {
        match self {
            LowerError::DuplicateModule(_) => None,
            LowerError::TypeSyntax { module, error } => Some((module, error.span)),
            LowerError::UnknownClassifier { module, span, .. }
            | LowerError::IncompleteCrudEvent { module, span, .. } => Some((module, *span)),
        }
    }
}

/// Build a model from source modules, keeping their order.
#[tracing::instrument(level = "debug", skip_all, fields(modules = sources.len()))]
pub fn lower(sources: Vec<SourceModule>) -> Result<Model, LowerError> {
    let mut model = Model::new();
    let mut pending = Vec::with_capacity(sources.len());
    for source in sources {
        let imports = source
            .imports
            .into_iter()
            .map(|i| Import {
                url: i.url,
                span: i.span,
            })
            .collect();
        let id = model.add_module(source.path.clone(), source.source, imports)?;
        pending.push((id, source.path, source.decls));
    }

    for (module, path, decls) in pending {
        let mut cx = LowerCtx {
            model: &mut model,
            module,
            path: &path,
        };
        for decl in decls {
            cx.lower_decl(decl)?;
        }
        tracing::debug!(module = %path, decls = model.module(module).decls.len(), "lowered module");
    }
    Ok(model)
}

struct LowerCtx<'a> {
    model: &'a mut Model,
    module: ModuleId,
    path: &'a str,
}

impl LowerCtx<'_> {
    fn lower_decl(&mut self, decl: SourceDecl) -> Result<DeclId, LowerError> {
        match decl {
            SourceDecl::Service(s) => self.lower_service(s),
            SourceDecl::ApiGateway(g) => Ok(self.lower_gateway(g)),
            SourceDecl::ServiceRegistry(r) => Ok(self.lower_registry(r)),
            SourceDecl::ConfigServer(c) => Ok(self.lower_config_server(c)),
            SourceDecl::Dependency(d) => Ok(self.lower_dependency(d)),
            SourceDecl::MessagePool(p) => self.lower_pool(p),
            SourceDecl::MessageBroker(b) => Ok(self.lower_broker(b)),
        }
    }

    fn parse_type(&self, text: &str, span: Span) -> Result<TypeRef, LowerError> {
        TypeRef::parse(text, span).map_err(|error| LowerError::TypeSyntax {
            module: self.path.to_string(),
            error,
        })
    }

    fn lower_service(&mut self, s: SourceService) -> Result<DeclId, LowerError> {
        let mut service = ServiceDecl::new(s.comm_style);
        service.extends = s.extends.map(|name| Ref::unresolved(name, s.span));
        service.config_server = s.config_server.map(|name| Ref::unresolved(name, s.span));
        service.service_registry = s.service_registry.map(|name| Ref::unresolved(name, s.span));
        service.deployment = s.deployment.map(|d| self.model.push_deployment(d));
        service.docstring = s.docstring;

        let id = self.model.add_decl(
            self.module,
            Some(s.name),
            s.span,
            DeclKind::Service(service),
        );

        let mut typedefs = Vec::with_capacity(s.api.typedefs.len());
        for td in s.api.typedefs {
            typedefs.push(self.lower_typedef(id, td)?);
        }
        let mut functions = Vec::with_capacity(s.api.functions.len());
        for f in s.api.functions {
            functions.push(self.lower_function(id, f)?);
        }
        let mut internal = Vec::with_capacity(s.api.internal.len());
        for f in s.api.internal {
            internal.push(self.lower_function(id, f)?);
        }

        if let Some(service) = self.model.service_mut(id) {
            service.api.typedefs = typedefs;
            service.api.functions = functions;
            service.api.internal = internal;
        }
        Ok(id)
    }

    fn lower_field(&self, field: SourceField) -> Result<TypeField, LowerError> {
        let mut classifiers = Classifiers::empty();
        for name in &field.classifiers {
            let Some(flag) = Classifiers::from_keyword(name) else {
                return Err(LowerError::UnknownClassifier {
                    module: self.path.to_string(),
                    field: field.name,
                    classifier: name.clone(),
                    span: field.span,
                });
            };
            classifiers |= flag;
        }
        Ok(TypeField {
            ty: self.parse_type(&field.ty, field.span)?,
            name: field.name,
            span: field.span,
            classifiers,
            constraints: field.constraints,
        })
    }

    fn lower_typedef(
        &mut self,
        owner: DeclId,
        td: SourceTypeDef,
    ) -> Result<crate::TypeDefId, LowerError> {
        let fields = td
            .fields
            .into_iter()
            .map(|f| self.lower_field(f))
            .collect::<Result<Vec<_>, _>>()?;

        let mut crud = Vec::new();
        for directive in td.crud {
            self.lower_crud(directive, &mut crud)?;
        }

        Ok(self.model.push_typedef(TypeDef {
            name: td.name,
            span: td.span,
            owner,
            inherits: td.inherits,
            fields,
            crud,
            docstring: td.docstring,
        }))
    }

    fn lower_crud(
        &self,
        directive: SourceCrud,
        out: &mut Vec<CrudDirective>,
    ) -> Result<(), LowerError> {
        let ops: &[CrudOp] = match directive.op {
            SourceCrudOp::Create => &[CrudOp::Create],
            SourceCrudOp::Read => &[CrudOp::Read],
            SourceCrudOp::Update => &[CrudOp::Update],
            SourceCrudOp::Delete => &[CrudOp::Delete],
            SourceCrudOp::All => &CrudOp::ALL,
        };
        let event = match (directive.message, directive.channel) {
            (None, None) => None,
            (Some(message), Some(channel)) => Some(CrudEvent {
                message: Ref::unresolved(message, directive.span),
                channel: Ref::unresolved(channel, directive.span),
            }),
            _ => {
                return Err(LowerError::IncompleteCrudEvent {
                    module: self.path.to_string(),
                    op: ops.first().map_or("crud", |op| op.as_str()),
                    span: directive.span,
                })
            }
        };
        for &op in ops {
            out.push(CrudDirective {
                op,
                event: event.clone(),
                span: directive.span,
            });
        }
        Ok(())
    }

    fn lower_function(&mut self, owner: DeclId, f: SourceFunction) -> Result<crate::FunctionId, LowerError> {
        let ret = self.parse_type(&f.ret, f.span)?;
        let mut function = Function::new(f.name, owner, ret, f.span);
        for p in f.params {
            let mut param = Param::new(p.name, self.parse_type(&p.ty, p.span)?, p.span);
            param.default = p.default;
            function.params.push(param);
        }
        function.annotations = f.annotations.into_iter().map(lower_annotation).collect();
        function.docstring = f.docstring;
        Ok(self.model.push_function(function))
    }

    fn lower_gateway(&mut self, g: SourceGateway) -> DeclId {
        let deployment = g.deployment.map(|d| self.model.push_deployment(d));
        let gateway = ApiGatewayDecl {
            deployment,
            config_server: g.config_server.map(|name| Ref::unresolved(name, g.span)),
            service_registry: g.service_registry.map(|name| Ref::unresolved(name, g.span)),
            comm_style: g.comm_style,
            gateway_for: g
                .gateway_for
                .into_iter()
                .map(|r| GatewayRoute {
                    service: Ref::unresolved(r.service, r.span),
                    path: r.path,
                    span: r.span,
                })
                .collect(),
        };
        self.model
            .add_decl(self.module, Some(g.name), g.span, DeclKind::ApiGateway(gateway))
    }

    fn lower_registry(&mut self, r: SourceRegistry) -> DeclId {
        let registry = ServiceRegistryDecl {
            deployment: r.deployment.map(|d| self.model.push_deployment(d)),
            client_mode: r.client_mode,
        };
        self.model.add_decl(
            self.module,
            Some(r.name),
            r.span,
            DeclKind::ServiceRegistry(registry),
        )
    }

    fn lower_config_server(&mut self, c: SourceConfigServer) -> DeclId {
        let server = ConfigServerDecl {
            deployment: c.deployment.map(|d| self.model.push_deployment(d)),
            search_path: c.search_path,
        };
        self.model.add_decl(
            self.module,
            Some(c.name),
            c.span,
            DeclKind::ConfigServer(server),
        )
    }

    fn lower_dependency(&mut self, d: SourceDependency) -> DeclId {
        let dependency = DependencyDecl {
            start: Ref::unresolved(d.start, d.span),
            end: Ref::unresolved(d.end, d.span),
            directives: d
                .directives
                .into_iter()
                .map(|r| ResilienceDirective {
                    method: r.method,
                    failure_pattern: r.failure_pattern,
                    fallback: r.fallback,
                    span: r.span,
                })
                .collect(),
        };
        self.model
            .add_decl(self.module, None, d.span, DeclKind::Dependency(dependency))
    }

    fn lower_pool(&mut self, p: SourcePool) -> Result<DeclId, LowerError> {
        let mut groups = Vec::with_capacity(p.groups.len());
        for group in p.groups {
            groups.push(self.lower_group(None, group)?);
        }
        Ok(self.model.add_decl(
            self.module,
            None,
            p.span,
            DeclKind::MessagePool(MessagePool { groups }),
        ))
    }

    fn lower_group(&mut self, parent: Option<GroupId>, g: SourceGroup) -> Result<GroupId, LowerError> {
        let id = self.model.push_group(MessageGroup {
            name: g.name,
            span: g.span,
            parent,
            groups: Vec::new(),
            messages: Vec::new(),
        });
        for sub in g.groups {
            let child = self.lower_group(Some(id), sub)?;
            self.model.group_mut(id).groups.push(child);
        }
        for m in g.messages {
            let fields = m
                .fields
                .into_iter()
                .map(|f| self.lower_field(f))
                .collect::<Result<Vec<_>, _>>()?;
            let message = self.model.push_message(Message {
                name: m.name,
                span: m.span,
                group: id,
                fields,
            });
            self.model.group_mut(id).messages.push(message);
        }
        Ok(id)
    }

    fn lower_broker(&mut self, b: SourceBroker) -> DeclId {
        let channels = b
            .channels
            .into_iter()
            .map(|c| MessageChannel {
                message: Ref::unresolved(c.message, c.span),
                name: c.name,
                span: c.span,
                p2p: c.p2p,
                timeout: c.timeout,
            })
            .collect();
        self.model.add_decl(
            self.module,
            Some(b.name),
            b.span,
            DeclKind::MessageBroker(MessageBroker::new(channels)),
        )
    }
}

fn lower_subscriptions(subs: Vec<SourceSubscription>) -> Vec<Subscription> {
    subs.into_iter()
        .map(|s| Subscription {
            message: Ref::unresolved(s.message, s.span),
            channel: Ref::unresolved(s.channel, s.span),
            span: s.span,
        })
        .collect()
}

fn lower_annotation(annotation: SourceAnnotation) -> Annotation {
    match annotation {
        SourceAnnotation::Rest {
            verb,
            mapping,
            span,
        } => Annotation::Rest {
            verb,
            mapping,
            span,
        },
        SourceAnnotation::Producer { subscriptions } => {
            Annotation::Producer(lower_subscriptions(subscriptions))
        }
        SourceAnnotation::Consumer { subscriptions } => {
            Annotation::Consumer(lower_subscriptions(subscriptions))
        }
        SourceAnnotation::Async => Annotation::Async,
    }
}
