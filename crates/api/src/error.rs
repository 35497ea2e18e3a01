use crate::models::ModuleId;

/// A single module could not answer a resource or class query.
///
/// Lookup failures are local to one module; callers degrade that module's
/// contribution instead of failing the whole deployment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Module not installed: {0}")]
    NoSuchModule(ModuleId),
    #[error("No entry {path} in module {module}")]
    NoSuchEntry { module: ModuleId, path: String },
    #[error("Class {name} not found in module {module}")]
    ClassNotFound { module: ModuleId, name: String },
    #[error("I/O error: {0}")]
    Io(String),
}

pub type LookupResult<T> = std::result::Result<T, LookupError>;

/// The server rejected an endpoint registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Endpoint registration rejected for {target}: {reason}")]
pub struct RegistrationError {
    pub target: String,
    pub reason: String,
}

impl RegistrationError {
    pub fn new(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid descriptor: {0}")]
pub struct ParseError(pub String);
