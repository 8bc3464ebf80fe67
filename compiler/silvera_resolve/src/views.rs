//! Read-only queries over a resolved model.
//!
//! These are the facts a code generator asks about one service: which
//! messages it publishes and listens to, where gateways expose it, and how
//! many instances it runs on which ports. Every query assumes resolution has
//! succeeded; unresolved references are skipped rather than reported.

use silvera_ir::{ChannelHandle, CrudOp, DeclId, FunctionId, Model, MessageId, Subscription};

/// Messages paired with the channels they travel on, in first-appearance order.
pub type MessageChannels = Vec<(MessageId, Vec<ChannelHandle>)>;

/// One replica of a deployed service.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ServiceInstance {
    pub index: u32,
    pub port: u16,
}

fn collect<'a>(into: &mut MessageChannels, subscriptions: impl IntoIterator<Item = &'a Subscription>) {
    for sub in subscriptions {
        let (Some(message), Some(channel)) = (sub.message.get(), sub.channel.get()) else {
            continue;
        };
        insert(into, message, channel);
    }
}

fn insert(into: &mut MessageChannels, message: MessageId, channel: ChannelHandle) {
    match into.iter_mut().find(|(m, _)| *m == message) {
        Some((_, channels)) => {
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }
        None => into.push((message, vec![channel])),
    }
}

/// Public functions followed by internal ones.
fn api_functions(model: &Model, service: DeclId) -> impl Iterator<Item = FunctionId> + '_ {
    model
        .service(service)
        .into_iter()
        .flat_map(|s| s.api.functions.iter().chain(&s.api.internal).copied())
}

/// Messages the service consumes.
pub fn consumes(model: &Model, service: DeclId) -> MessageChannels {
    let mut out = Vec::new();
    for f in api_functions(model, service) {
        collect(&mut out, model.function(f).consumed());
    }
    out
}

/// Messages the service produces, from producer annotations and CRUD events.
pub fn produces(model: &Model, service: DeclId) -> MessageChannels {
    let mut out = Vec::new();
    let Some(svc) = model.service(service) else {
        return out;
    };
    for &f in &svc.api.functions {
        collect(&mut out, model.function(f).produced());
    }
    for &td in &svc.api.typedefs {
        let typedef = model.typedef(td);
        for op in CrudOp::ALL {
            let Some(event) = typedef.event_for(op) else {
                continue;
            };
            if let (Some(message), Some(channel)) = (event.message.get(), event.channel.get()) {
                insert(&mut out, message, channel);
            }
        }
    }
    out
}

pub fn consumer_functions(model: &Model, service: DeclId) -> Vec<FunctionId> {
    api_functions(model, service)
        .filter(|&f| model.function(f).is_consumer())
        .collect()
}

pub fn uses_messaging(model: &Model, service: DeclId) -> bool {
    !produces(model, service).is_empty() || !consumes(model, service).is_empty()
}

pub fn has_async(model: &Model, service: DeclId) -> bool {
    api_functions(model, service).any(|f| model.function(f).is_async())
}

/// `<url>:<port><path>` for every gateway route that targets `service`.
pub fn gateway_urls(model: &Model, service: DeclId) -> Vec<String> {
    let mut urls = Vec::new();
    for (_, decl) in model.decls() {
        let Some(gateway) = decl.as_gateway() else {
            continue;
        };
        let Some(deployment) = gateway.deployment.map(|d| model.deployment(d)) else {
            continue;
        };
        let port = deployment.port.map(|p| p.to_string()).unwrap_or_default();
        for route in &gateway.gateway_for {
            if route.service.get() == Some(service) {
                urls.push(format!("{}:{}{}", deployment.url(), port, route.path));
            }
        }
    }
    urls
}

/// FQN of the service a function belongs to. Dependency clones report the
/// service they were cloned from.
pub fn service_fqn(model: &Model, function: FunctionId) -> String {
    let f = model.function(function);
    let owner = f.dep.map_or(f.owner, |origin| model.function(origin).owner);
    model.decl_fqn(owner)
}

/// One instance per replica, on consecutive ports from the deployment's port.
pub fn instances(model: &Model, service: DeclId) -> Vec<ServiceInstance> {
    let Some(deployment) = model.decl(service).deployment().map(|d| model.deployment(d)) else {
        return Vec::new();
    };
    let Some(base) = deployment.port else {
        return Vec::new();
    };
    (0..deployment.replicas())
        .map_while(|index| {
            let offset = u16::try_from(index).ok()?;
            let port = base.checked_add(offset)?;
            Some(ServiceInstance { index, port })
        })
        .collect()
}

/// Public API functions followed by dependency clones.
pub fn all_functions(model: &Model, service: DeclId) -> Vec<FunctionId> {
    model
        .service(service)
        .map(|s| s.api.functions.iter().chain(&s.dep_functions).copied().collect())
        .unwrap_or_default()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
