//! Typed handles into the [`Model`](crate::Model) arenas.
//!
//! Every cross-declaration edge in the model is one of these handles rather
//! than a pointer, so a resolved model is a plain graph of indices that can
//! be cloned, compared, and walked without lifetimes.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create a handle from a raw index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Handle for the next slot of an arena with `len` entries.
            ///
            /// # Panics
            /// Panics if the arena outgrows `u32::MAX` entries.
            #[inline]
            pub(crate) fn from_len(len: usize) -> Self {
                let raw = u32::try_from(len).unwrap_or_else(|_| {
                    panic!(concat!(stringify!($name), " arena exceeds u32::MAX entries"))
                });
                Self(raw)
            }

            /// Position in the owning arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id! {
    /// A loaded module (one source file).
    ModuleId
}

define_id! {
    /// A top-level declaration: service, gateway, registry, config server,
    /// dependency, message pool, or message broker.
    DeclId
}

define_id! {
    /// A function in some service API, or a dependency clone of one.
    FunctionId
}

define_id! {
    /// A user-defined type in some service API.
    TypeDefId
}

define_id! {
    /// A deployment record. Derived services may share their base's record.
    DeploymentId
}

define_id! {
    /// A message group inside the pool.
    GroupId
}

define_id! {
    /// A message inside some group.
    MessageId
}

/// A channel addressed by its broker and position in the broker's channel list.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ChannelHandle {
    pub broker: DeclId,
    pub index: u32,
}

impl ChannelHandle {
    #[inline]
    pub const fn new(broker: DeclId, index: u32) -> Self {
        ChannelHandle { broker, index }
    }
}
