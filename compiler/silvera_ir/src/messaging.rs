//! Message catalog and brokers.
//!
//! The single message pool holds a tree of groups; each message is addressed
//! by the dotted path of its enclosing groups plus its own name:
//!
//! ```text
//! pool
//!  └─ orders            group "orders"
//!      ├─ Created       message "orders.Created"
//!      └─ audit         group "orders.audit"
//!          └─ Logged    message "orders.audit.Logged"
//! ```
//!
//! Brokers own named channels. Each channel carries one message type and
//! remembers which functions produce to it and consume from it.

use crate::{FunctionId, GroupId, MessageId, Ref, Span, TypeField};

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MessageGroup {
    pub name: String,
    pub span: Span,
    pub parent: Option<GroupId>,
    pub groups: Vec<GroupId>,
    pub messages: Vec<MessageId>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Message {
    pub name: String,
    pub span: Span,
    pub group: GroupId,
    pub fields: Vec<TypeField>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MessagePool {
    /// Top-level groups.
    pub groups: Vec<GroupId>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MessageChannel {
    pub name: String,
    pub span: Span,
    pub message: Ref<MessageId>,
    /// Point-to-point (queue) rather than publish/subscribe.
    pub p2p: bool,
    pub timeout: Option<u32>,
}

impl MessageChannel {
    pub fn is_p2p(&self) -> bool {
        self.p2p
    }

    /// Messages are kept for `timeout` milliseconds when no consumer is
    /// connected.
    pub fn is_persistent(&self) -> bool {
        self.timeout.is_some_and(|t| t > 0)
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MessageBroker {
    pub channels: Vec<MessageChannel>,
    producers: Vec<Vec<FunctionId>>,
    consumers: Vec<Vec<FunctionId>>,
}

impl MessageBroker {
    pub fn new(channels: Vec<MessageChannel>) -> Self {
        let slots = channels.len();
        MessageBroker {
            channels,
            producers: vec![Vec::new(); slots],
            consumers: vec![Vec::new(); slots],
        }
    }

    /// Position of the first channel with this name.
    pub fn channel_index(&self, name: &str) -> Option<u32> {
        self.channels
            .iter()
            .position(|c| c.name == name)
            .and_then(|i| u32::try_from(i).ok())
    }

    pub fn channel(&self, index: u32) -> Option<&MessageChannel> {
        self.channels.get(index as usize)
    }

    pub fn channel_mut(&mut self, index: u32) -> Option<&mut MessageChannel> {
        self.channels.get_mut(index as usize)
    }

    /// Record `function` as a producer on a channel. Repeated registration
    /// is a no-op.
    pub fn register_producer(&mut self, channel: u32, function: FunctionId) {
        register(&mut self.producers, channel, function);
    }

    pub fn register_consumer(&mut self, channel: u32, function: FunctionId) {
        register(&mut self.consumers, channel, function);
    }

    pub fn producers(&self, channel: u32) -> &[FunctionId] {
        self.producers
            .get(channel as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn consumers(&self, channel: u32) -> &[FunctionId] {
        self.consumers
            .get(channel as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn register(table: &mut [Vec<FunctionId>], channel: u32, function: FunctionId) {
    if let Some(slot) = table.get_mut(channel as usize) {
        if !slot.contains(&function) {
            slot.push(function);
        }
    }
}
