//! Resolution settings.

use std::fmt;
use std::str::FromStr;

/// How HTTP verbs are chosen for functions without a `@rest` annotation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum RestStrategyKind {
    /// Every unannotated function is `GET`.
    #[default]
    Default,
    PreferPostOverPut,
    PreferPutOverPost,
    PreferGetOverDelete,
    PreferDeleteOverGet,
}

impl RestStrategyKind {
    pub const ALL: [RestStrategyKind; 5] = [
        RestStrategyKind::Default,
        RestStrategyKind::PreferPostOverPut,
        RestStrategyKind::PreferPutOverPost,
        RestStrategyKind::PreferGetOverDelete,
        RestStrategyKind::PreferDeleteOverGet,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RestStrategyKind::Default => "default",
            RestStrategyKind::PreferPostOverPut => "prefer-post-over-put",
            RestStrategyKind::PreferPutOverPost => "prefer-put-over-post",
            RestStrategyKind::PreferGetOverDelete => "prefer-get-over-delete",
            RestStrategyKind::PreferDeleteOverGet => "prefer-delete-over-get",
        }
    }
}

impl fmt::Display for RestStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("unknown REST strategy `{0}`")]
pub struct UnknownStrategy(pub String);

impl FromStr for RestStrategyKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Settings for one resolution run.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ResolveOptions {
    pub rest_strategy: RestStrategyKind,
    /// First port handed out to deployments without an explicit port.
    pub first_port: u16,
}

impl ResolveOptions {
    pub const DEFAULT_FIRST_PORT: u16 = 8080;
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            rest_strategy: RestStrategyKind::Default,
            first_port: Self::DEFAULT_FIRST_PORT,
        }
    }
}
