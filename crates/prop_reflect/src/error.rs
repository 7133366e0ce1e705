use alloc::string::String;

use thiserror::Error;

use crate::container::ContainerError;

/// Errors surfaced by the registry and by caller-driven traversal.
///
/// Lookups that merely find nothing return `None` instead; these variants
/// are for callers that need to tell the reasons apart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReflectError {
    #[error("type `{0}` is not registered")]
    UnregisteredType(String),
    #[error("`{class}` has no constructor taking {signature}")]
    ConstructorMismatch { class: String, signature: String },
    #[error("constructor for `{class}` registered after the class was initialized")]
    ConstructorAfterInit { class: String },
    #[error("recursion limit of {max} reached")]
    RecursionLimitExceeded { max: usize },
    #[error("the global class registry is already initialized")]
    GlobalAlreadyInitialized,
    #[error(transparent)]
    Container(#[from] ContainerError),
}
