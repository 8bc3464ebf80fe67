//! Message catalog validation and messaging bindings.
//!
//! The catalog is checked once, before any service is touched:
//!
//! ```text
//! pools ──▶ groups ──▶ messages ──▶ brokers ──▶ channels
//!  ≤ 1      unique      unique       need a      unique, carry a
//!           non-empty   per group    pool        known message
//! ```
//!
//! Producer and consumer annotations, and CRUD events on typedefs, are bound
//! per service afterwards. A subscription names a message by its dotted path
//! in the pool and a channel as `Broker.channel`.

use rustc_hash::FxHashSet;
use silvera_ir::{
    Annotation, ChannelHandle, DeclId, DeclKind, GroupId, MessageId, Model, Ref, Span, Symbol,
};

use crate::pipeline::ResolveContext;
use crate::{Location, ResolveError};

/// Validate the pool and brokers and resolve channel message types.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn resolve_catalog(model: &mut Model) -> Result<(), ResolveError> {
    let mut pool = None;
    let mut brokers = Vec::new();
    for (id, decl) in model.decls() {
        match decl.kind {
            DeclKind::MessagePool(_) => {
                if let Some(first) = pool {
                    return Err(ResolveError::MultipleMessagePools {
                        at: Location::of_decl(model, id),
                        first: Location::of_decl(model, first),
                    });
                }
                pool = Some(id);
            }
            DeclKind::MessageBroker(_) => brokers.push(id),
            _ => {}
        }
    }

    if let Some(pool) = pool {
        model.set_msg_pool(pool);
        validate_pool(model, pool)?;
    }
    for broker in brokers {
        resolve_broker(model, broker)?;
    }
    Ok(())
}

fn validate_pool(model: &Model, pool: DeclId) -> Result<(), ResolveError> {
    let at = |span: Span| Location::near_decl(model, pool, span);

    let mut groups = Vec::new();
    let mut stack: Vec<GroupId> = model.pool_groups().iter().rev().copied().collect();
    while let Some(group) = stack.pop() {
        groups.push(group);
        stack.extend(model.group(group).groups.iter().rev().copied());
    }

    let mut seen = FxHashSet::default();
    for &group in &groups {
        let g = model.group(group);
        let fqn = model.group_fqn(group);
        if !seen.insert(fqn.clone()) {
            return Err(ResolveError::DuplicateMessageGroup {
                group: fqn,
                at: at(g.span),
            });
        }
        if is_empty_group(model, group) {
            return Err(ResolveError::EmptyMessageGroup {
                group: fqn,
                at: at(g.span),
            });
        }

        let mut names = FxHashSet::default();
        for &message in &g.messages {
            let m = model.message(message);
            if !names.insert(m.name.as_str()) {
                return Err(ResolveError::DuplicateMessage {
                    message: m.name.clone(),
                    group: fqn,
                    at: at(m.span),
                });
            }
            // Messages have no type table of their own.
            if let Some(field) = m.fields.iter().find(|f| !f.ty.is_primitive_only()) {
                return Err(ResolveError::NonPrimitiveMessageField {
                    message: model.message_fqn(message),
                    field: field.name.clone(),
                    at: at(field.span),
                });
            }
        }
    }

    tracing::debug!(groups = groups.len(), "validated message pool");
    Ok(())
}

/// A group is empty if neither it nor any group below it holds a message.
fn is_empty_group(model: &Model, group: GroupId) -> bool {
    let g = model.group(group);
    g.messages.is_empty() && g.groups.iter().all(|&sub| is_empty_group(model, sub))
}

fn resolve_broker(model: &mut Model, broker: DeclId) -> Result<(), ResolveError> {
    let decl = model.decl(broker);
    let name = decl.display_name().to_string();
    let at = Location::of_decl(model, broker);

    if model.msg_pool().is_none() {
        return Err(ResolveError::BrokerWithoutPool { broker: name, at });
    }
    if model.broker_by_name(&name).is_some() {
        return Err(ResolveError::DuplicateBroker { broker: name, at });
    }

    let Some(b) = decl.as_broker() else {
        return Ok(());
    };
    let mut names = FxHashSet::default();
    let mut resolved = Vec::with_capacity(b.channels.len());
    for channel in &b.channels {
        let channel_at = Location::near_decl(model, broker, channel.span);
        if !names.insert(channel.name.as_str()) {
            return Err(ResolveError::DuplicateChannel {
                channel: channel.name.clone(),
                broker: name,
                at: channel_at,
            });
        }
        let message = match &channel.message {
            Ref::Resolved(id) => *id,
            Ref::Unresolved(symbol) => {
                model
                    .find_message(&symbol.name)
                    .ok_or_else(|| ResolveError::ChannelMessageNotFound {
                        channel: channel.name.clone(),
                        broker: name.clone(),
                        message: symbol.name.clone(),
                        at: channel_at.clone(),
                    })?
            }
        };
        resolved.push(message);
    }

    if let Some(b) = model.decl_mut(broker).as_broker_mut() {
        for (channel, message) in b.channels.iter_mut().zip(resolved) {
            channel.message = Ref::Resolved(message);
        }
    }
    tracing::debug!(broker = %name, "resolved broker");
    model.register_broker(name, broker);
    Ok(())
}

/// Resolve a pool message by dotted path.
fn find_message(model: &Model, symbol: &Symbol, module: &str) -> Result<MessageId, ResolveError> {
    model
        .find_message(&symbol.name)
        .ok_or_else(|| ResolveError::UnknownMessage {
            message: symbol.name.clone(),
            at: Location::new(module, symbol.span),
        })
}

/// Resolve `Broker.channel`.
fn find_channel(model: &Model, symbol: &Symbol, module: &str) -> Result<ChannelHandle, ResolveError> {
    let at = || Location::new(module, symbol.span);
    let Some((broker_name, channel)) = symbol.name.split_once('.') else {
        return Err(ResolveError::UnknownBroker {
            broker: symbol.name.clone(),
            at: at(),
        });
    };
    let broker = model
        .broker_by_name(broker_name)
        .ok_or_else(|| ResolveError::UnknownBroker {
            broker: broker_name.to_string(),
            at: at(),
        })?;
    model
        .decl(broker)
        .as_broker()
        .and_then(|b| b.channel_index(channel))
        .map(|index| ChannelHandle::new(broker, index))
        .ok_or_else(|| ResolveError::UnknownChannel {
            channel: channel.to_string(),
            broker: broker_name.to_string(),
            at: at(),
        })
}

fn bind<T: Copy>(
    slot: &mut Ref<T>,
    find: impl FnOnce(&Symbol) -> Result<T, ResolveError>,
) -> Result<T, ResolveError> {
    match slot {
        Ref::Resolved(id) => Ok(*id),
        Ref::Unresolved(symbol) => {
            let id = find(symbol)?;
            *slot = Ref::Resolved(id);
            Ok(id)
        }
    }
}

#[derive(Copy, Clone)]
enum Role {
    Producer,
    Consumer,
}

impl ResolveContext<'_> {
    /// Bind the messaging annotations and CRUD events `service` declares,
    /// registering its functions on the brokers they use.
    pub(crate) fn bind_service_messaging(&mut self, service: DeclId) -> Result<(), ResolveError> {
        let Some(svc) = self.model.service(service) else {
            return Ok(());
        };
        let module = self.model.module(self.model.decl(service).module).path.clone();
        let functions: Vec<_> = svc
            .api
            .functions
            .iter()
            .chain(&svc.api.internal)
            .copied()
            .filter(|&f| self.model.function(f).owner == service)
            .collect();
        let typedefs: Vec<_> = svc
            .api
            .typedefs
            .iter()
            .copied()
            .filter(|&t| self.model.typedef(t).owner == service)
            .collect();

        let mut registrations = Vec::new();
        for f in functions {
            let mut annotations = std::mem::take(&mut self.model.function_mut(f).annotations);
            let bound = self.bind_annotations(&mut annotations, &module);
            self.model.function_mut(f).annotations = annotations;
            registrations.extend(bound?.into_iter().map(|(role, channel)| (role, channel, f)));
        }

        for t in typedefs {
            let mut crud = std::mem::take(&mut self.model.typedef_mut(t).crud);
            let bound = crud.iter_mut().try_for_each(|directive| {
                let Some(event) = &mut directive.event else {
                    return Ok(());
                };
                bind(&mut event.message, |s| find_message(self.model, s, &module))?;
                bind(&mut event.channel, |s| find_channel(self.model, s, &module))?;
                Ok(())
            });
            self.model.typedef_mut(t).crud = crud;
            bound?;
        }

        for (role, channel, function) in registrations {
            let Some(broker) = self.model.decl_mut(channel.broker).as_broker_mut() else {
                continue;
            };
            match role {
                Role::Producer => broker.register_producer(channel.index, function),
                Role::Consumer => broker.register_consumer(channel.index, function),
            }
            tracing::trace!(?function, ?channel, "registered on broker");
        }
        Ok(())
    }

    fn bind_annotations(
        &self,
        annotations: &mut [Annotation],
        module: &str,
    ) -> Result<Vec<(Role, ChannelHandle)>, ResolveError> {
        let mut bound = Vec::new();
        for annotation in annotations {
            let (role, subscriptions) = match annotation {
                Annotation::Producer(subs) => (Role::Producer, subs),
                Annotation::Consumer(subs) => (Role::Consumer, subs),
                Annotation::Rest { .. } | Annotation::Async => continue,
            };
            for sub in subscriptions {
                bind(&mut sub.message, |s| find_message(self.model, s, module))?;
                let channel = bind(&mut sub.channel, |s| find_channel(self.model, s, module))?;
                bound.push((role, channel));
            }
        }
        Ok(bound)
    }
}
