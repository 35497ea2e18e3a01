use thiserror::Error;
use wabscope_api::{ModuleId, ParseError};
use wabscope_plugin::InitializerError;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Module not found: {0}")]
    NotFound(ModuleId),
    #[error("Module {0} is a fragment and cannot be deployed as a web unit")]
    NotAHost(ModuleId),
    #[error("Initializer {contract} failed: {source}")]
    Initializer {
        contract: String,
        #[source]
        source: InitializerError,
    },
    #[error("Invalid descriptor {url}: {source}")]
    Descriptor {
        url: String,
        #[source]
        source: ParseError,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeployError>;
