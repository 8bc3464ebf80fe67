//! Deployment records.
//!
//! Every attribute is optional in source. Resolution fills the gaps in two
//! ways: a derived service copies whatever its base defines, and a service
//! that extends nothing takes the built-in defaults below.

/// Deployment attributes of a service, gateway, registry, or config server.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct Deployment {
    pub version: Option<String>,
    pub url: Option<String>,
    pub port: Option<u16>,
    pub lang: Option<String>,
    pub packaging: Option<String>,
    pub host: Option<HostKind>,
    pub replicas: Option<u32>,
    pub restart_policy: Option<RestartPolicy>,
}

/// Where the service runs.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub enum HostKind {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "PC"))]
    Pc,
    #[cfg_attr(feature = "serde", serde(rename = "container"))]
    Container,
}

/// Container restart policy.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct RestartPolicy {
    pub condition: Option<String>,
    pub max_attempts: Option<u32>,
    pub delay: Option<String>,
    pub window: Option<String>,
}

impl RestartPolicy {
    fn inherit_from(&mut self, base: &RestartPolicy) {
        fill(&mut self.condition, base.condition.as_ref());
        fill(&mut self.max_attempts, base.max_attempts.as_ref());
        fill(&mut self.delay, base.delay.as_ref());
        fill(&mut self.window, base.window.as_ref());
    }
}

impl Deployment {
    pub const DEFAULT_VERSION: &'static str = "0.0.1b";
    pub const DEFAULT_URL: &'static str = "http://localhost";
    pub const DEFAULT_LANG: &'static str = "java";
    pub const DEFAULT_PACKAGING: &'static str = "jar";
    pub const DEFAULT_REPLICAS: u32 = 1;

    /// Copy every attribute this record leaves unset from `base`.
    ///
    /// The restart policy is merged attribute by attribute.
    pub fn inherit_from(&mut self, base: &Deployment) {
        fill(&mut self.version, base.version.as_ref());
        fill(&mut self.url, base.url.as_ref());
        fill(&mut self.port, base.port.as_ref());
        fill(&mut self.lang, base.lang.as_ref());
        fill(&mut self.packaging, base.packaging.as_ref());
        fill(&mut self.host, base.host.as_ref());
        fill(&mut self.replicas, base.replicas.as_ref());
        if let Some(inherited) = &base.restart_policy {
            self.restart_policy
                .get_or_insert_with(RestartPolicy::default)
                .inherit_from(inherited);
        }
    }

    /// Fill unset attributes with built-in defaults. The port is left alone;
    /// it comes from the resolver's port allocator.
    pub fn apply_defaults(&mut self) {
        self.version
            .get_or_insert_with(|| Self::DEFAULT_VERSION.to_string());
        self.url.get_or_insert_with(|| Self::DEFAULT_URL.to_string());
        self.lang.get_or_insert_with(|| Self::DEFAULT_LANG.to_string());
        self.packaging
            .get_or_insert_with(|| Self::DEFAULT_PACKAGING.to_string());
        self.host.get_or_insert(HostKind::Pc);
        self.replicas.get_or_insert(Self::DEFAULT_REPLICAS);
    }

    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(Self::DEFAULT_VERSION)
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or(Self::DEFAULT_URL)
    }

    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or(Self::DEFAULT_LANG)
    }

    pub fn packaging(&self) -> &str {
        self.packaging.as_deref().unwrap_or(Self::DEFAULT_PACKAGING)
    }

    pub fn host(&self) -> HostKind {
        self.host.unwrap_or_default()
    }

    pub fn replicas(&self) -> u32 {
        self.replicas.unwrap_or(Self::DEFAULT_REPLICAS)
    }

    pub fn is_container(&self) -> bool {
        self.host() == HostKind::Container
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, base: Option<&T>) {
    if slot.is_none() {
        *slot = base.cloned();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults_fill_only_gaps() {
        let mut dep = Deployment {
            version: Some("1.2".into()),
            replicas: Some(3),
            ..Deployment::default()
        };
        dep.apply_defaults();
        assert_eq!(dep.version(), "1.2");
        assert_eq!(dep.url(), "http://localhost");
        assert_eq!(dep.lang(), "java");
        assert_eq!(dep.packaging(), "jar");
        assert_eq!(dep.host(), HostKind::Pc);
        assert_eq!(dep.replicas(), 3);
        assert_eq!(dep.port, None);
    }

    #[test]
    fn test_inherit_merges_restart_policy_per_attribute() {
        let base = Deployment {
            version: Some("2.0".into()),
            port: Some(9000),
            restart_policy: Some(RestartPolicy {
                condition: Some("on-failure".into()),
                max_attempts: Some(5),
                delay: Some("5s".into()),
                window: Some("120s".into()),
            }),
            ..Deployment::default()
        };
        let mut derived = Deployment {
            url: Some("http://orders".into()),
            restart_policy: Some(RestartPolicy {
                max_attempts: Some(2),
                ..RestartPolicy::default()
            }),
            ..Deployment::default()
        };

        derived.inherit_from(&base);

        assert_eq!(derived.version.as_deref(), Some("2.0"));
        assert_eq!(derived.url.as_deref(), Some("http://orders"));
        assert_eq!(derived.port, Some(9000));
        assert_eq!(
            derived.restart_policy,
            Some(RestartPolicy {
                condition: Some("on-failure".into()),
                max_attempts: Some(2),
                delay: Some("5s".into()),
                window: Some("120s".into()),
            })
        );
    }

    #[test]
    fn test_inherit_copies_whole_policy_when_absent() {
        let base = Deployment {
            restart_policy: Some(RestartPolicy {
                condition: Some("any".into()),
                ..RestartPolicy::default()
            }),
            ..Deployment::default()
        };
        let mut derived = Deployment::default();
        derived.inherit_from(&base);
        assert_eq!(derived.restart_policy, base.restart_policy);
    }
}
