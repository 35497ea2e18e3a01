use serde::{Deserialize, Serialize};

/// A programmatic endpoint registration produced by a configurator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointConfig {
    /// URI path (or template) the endpoint is published under.
    pub path: String,
    /// Class implementing the endpoint marker type.
    pub endpoint_class: String,
    #[serde(default)]
    pub subprotocols: Vec<String>,
}

impl EndpointConfig {
    pub fn new(path: impl Into<String>, endpoint_class: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            endpoint_class: endpoint_class.into(),
            subprotocols: Vec::new(),
        }
    }
}
