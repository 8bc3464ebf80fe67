//! Deployment defaults and port allocation.

use silvera_ir::{DeclId, Deployment};

use crate::pipeline::ResolveContext;

/// Hands out consecutive ports to deployments that do not set one.
///
/// A deployment with `n` replicas reserves `n` ports, one per instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortAllocator {
    first: u16,
    next: u16,
}

impl PortAllocator {
    pub fn new(first: u16) -> Self {
        PortAllocator { first, next: first }
    }

    /// Reserve ports for `replicas` instances and return the first.
    pub fn allocate(&mut self, replicas: u32) -> u16 {
        let port = self.next;
        let width = u16::try_from(replicas.max(1)).unwrap_or(u16::MAX);
        self.next = self.next.saturating_add(width);
        port
    }

    /// Port the next allocation will return.
    pub fn peek(&self) -> u16 {
        self.next
    }

    /// Start over from the first port.
    pub fn reset(&mut self) {
        self.next = self.first;
    }
}

impl ResolveContext<'_> {
    /// Give a deployable declaration a complete deployment.
    ///
    /// Creates an empty record if the declaration has none, fills unset
    /// attributes with defaults, then allocates a port if none was set.
    pub(crate) fn apply_deployment_defaults(&mut self, decl: DeclId) {
        let Some(existing) = self.model.decl(decl).deployment_slot() else {
            return;
        };
        let id = match existing {
            Some(id) => id,
            None => {
                let id = self.model.push_deployment(Deployment::default());
                if let Some(slot) = self.model.decl_mut(decl).deployment_slot_mut() {
                    *slot = Some(id);
                }
                id
            }
        };

        let deployment = self.model.deployment_mut(id);
        deployment.apply_defaults();
        if deployment.port.is_none() {
            let port = self.ports.allocate(deployment.replicas());
            deployment.port = Some(port);
            tracing::trace!(decl = ?decl, port, "allocated port");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_advances_by_replicas() {
        let mut ports = PortAllocator::new(8080);
        assert_eq!(ports.allocate(1), 8080);
        assert_eq!(ports.allocate(3), 8081);
        assert_eq!(ports.allocate(0), 8084);
        assert_eq!(ports.peek(), 8085);
    }

    #[test]
    fn test_reset() {
        let mut ports = PortAllocator::new(9000);
        ports.allocate(2);
        ports.reset();
        assert_eq!(ports.allocate(1), 9000);
    }

    #[test]
    fn test_allocation_saturates() {
        let mut ports = PortAllocator::new(u16::MAX - 1);
        assert_eq!(ports.allocate(5), u16::MAX - 1);
        assert_eq!(ports.allocate(1), u16::MAX);
    }
}
