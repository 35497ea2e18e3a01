pub mod deployer;

pub use deployer::{Deployer, DeployerBuilder, DeploymentRecord};
