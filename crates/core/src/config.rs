//! Lookup locations and contract names used while deploying a web unit.

use crate::error::{DeployError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeploymentConfig {
    /// File name of fragment descriptors.
    pub descriptor_name: String,
    /// Descriptor directory of the web unit itself (direct lookup).
    pub unit_descriptor_dir: String,
    /// Descriptor directory of the unit's fragments, looked up through the unit.
    pub fragment_descriptor_dir: String,
    /// Descriptor directory of wired modules (wiring-adapter lookup).
    pub wired_descriptor_dir: String,
    pub unit_services_dir: String,
    pub services_dir: String,
    /// Provider contract whose service files declare initializers.
    pub initializer_contract: String,
    pub class_pattern: String,
    pub unit_class_root: String,
    pub fragment_class_root: String,
    /// Packages never considered as endpoint candidates.
    pub excluded_package_prefixes: Vec<String>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            descriptor_name: "web-fragment.xml".to_string(),
            unit_descriptor_dir: "WEB-INF/classes/META-INF/".to_string(),
            fragment_descriptor_dir: "META-INF/".to_string(),
            wired_descriptor_dir: "META-INF".to_string(),
            unit_services_dir: "WEB-INF/classes/META-INF/services/".to_string(),
            services_dir: "META-INF/services/".to_string(),
            initializer_contract: "jakarta.servlet.ServletContainerInitializer".to_string(),
            class_pattern: "*.class".to_string(),
            unit_class_root: "WEB-INF/classes/".to_string(),
            fragment_class_root: "/".to_string(),
            excluded_package_prefixes: vec!["javax.".to_string()],
        }
    }
}

impl DeploymentConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DeploymentConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.descriptor_name.trim().is_empty() {
            return Err(DeployError::Config("descriptor_name must not be empty".into()));
        }
        if self.initializer_contract.trim().is_empty() {
            return Err(DeployError::Config(
                "initializer_contract must not be empty".into(),
            ));
        }
        if self.class_pattern.trim().is_empty() {
            return Err(DeployError::Config("class_pattern must not be empty".into()));
        }
        Ok(())
    }
}
