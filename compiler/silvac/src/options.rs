//! `check` command line parsing.

use std::path::PathBuf;

use silvera_resolve::{ResolveOptions, RestStrategyKind, UnknownStrategy};

/// Parsed `silvera check` arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckArgs {
    pub project: PathBuf,
    pub options: ResolveOptions,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("missing project directory")]
    MissingProject,

    #[error(transparent)]
    Strategy(#[from] UnknownStrategy),

    #[error("invalid port `{0}`: expected a number between 1 and 65535")]
    InvalidPort(String),

    #[error("unknown option `{0}`")]
    UnknownOption(String),

    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),
}

/// Parse the arguments after `check`.
///
/// Flags may come before or after the project directory.
pub fn parse_check_args(args: &[String]) -> Result<CheckArgs, OptionError> {
    let mut project = None;
    let mut options = ResolveOptions::default();

    for arg in args {
        if let Some(name) = arg.strip_prefix("--strategy=") {
            options.rest_strategy = name.parse::<RestStrategyKind>()?;
        } else if let Some(port) = arg.strip_prefix("--first-port=") {
            options.first_port = port
                .parse::<u16>()
                .ok()
                .filter(|&p| p > 0)
                .ok_or_else(|| OptionError::InvalidPort(port.to_string()))?;
        } else if arg.starts_with('-') {
            return Err(OptionError::UnknownOption(arg.clone()));
        } else if project.is_none() {
            project = Some(PathBuf::from(arg));
        } else {
            return Err(OptionError::UnexpectedArgument(arg.clone()));
        }
    }

    Ok(CheckArgs {
        project: project.ok_or(OptionError::MissingProject)?,
        options,
    })
}
