pub mod collector;
pub mod config;
pub mod deploy;
pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod graph;
pub mod logging;
pub mod resolver;

pub use config::DeploymentConfig;
pub use deploy::{Deployer, DeployerBuilder, DeploymentRecord};
pub use error::{DeployError, Result};
pub use graph::{GraphSnapshot, InMemoryModuleRegistry, SnapshotProvider};
pub use resolver::{ClassSpace, ClassSpaceResolver, Origin};
