use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown unit '{0}'")]
pub struct UnknownUnit(pub String);
