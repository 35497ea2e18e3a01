use crate::registration::BoxError;
use wabscope_api::{ClassSet, RegistrationError, ServerContext};

#[derive(Debug, thiserror::Error)]
pub enum InitializerError {
    #[error("Endpoint deployment failed: {0}")]
    Registration(#[from] RegistrationError),
    #[error("{0}")]
    Failed(String),
    #[error(transparent)]
    Other(BoxError),
}

/// Container initializer invoked once per deployment of a web unit.
///
/// Implementations must not depend on the order in which other initializers
/// of the same unit run.
pub trait Initializer: Send + Sync {
    /// `classes` holds the classes matching the initializer's contract, or
    /// the whole class space when the contract declares no markers.
    fn on_startup(&self, classes: &ClassSet, ctx: &dyn ServerContext)
    -> Result<(), InitializerError>;
}
