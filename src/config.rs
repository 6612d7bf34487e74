//! Run configuration.
//!
//! Every section has defaults, so an empty document (or no file at all) is
//! a valid configuration that reproduces the stock lab images, credentials
//! and timings.

use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::topology::DeviceClass;

/// Top-level configuration structure that mirrors the YAML configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub general: GeneralConfig,
    pub images: ImageConfig,
    pub management: ManagementConfig,
    pub credentials: Credentials,
    pub tools: ToolConfig,
    pub deployment: DeploymentConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (class, image) in [
            (DeviceClass::RouterIol, &self.images.router_iol),
            (DeviceClass::SwitchIol, &self.images.switch_iol),
            (DeviceClass::RouterVios, &self.images.router_vios),
            (DeviceClass::SwitchVios, &self.images.switch_vios),
        ] {
            if image.trim().is_empty() {
                return Err(ValidationError::InvalidImages(format!(
                    "image for {} cannot be empty",
                    class
                )));
            }
        }

        if self.management.network.prefix() > 24 {
            return Err(ValidationError::InvalidManagement(format!(
                "management network {} is smaller than a /24",
                self.management.network
            )));
        }

        for (name, value) in [
            ("containerlab", &self.tools.containerlab),
            ("ansible", &self.tools.ansible),
            ("ansible_playbook", &self.tools.ansible_playbook),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidTools(format!("{} cannot be empty", name)));
            }
        }

        if self.credentials.username.is_empty() {
            return Err(ValidationError::InvalidCredentials(
                "username cannot be empty".to_string(),
            ));
        }

        let deployment = &self.deployment;
        if deployment.inventory_poll.attempts == 0 {
            return Err(ValidationError::InvalidDeployment(
                "inventory_poll.attempts must be greater than 0".to_string(),
            ));
        }
        if deployment.iol_probe.attempts == 0 {
            return Err(ValidationError::InvalidDeployment(
                "iol_probe.attempts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid image configuration: {0}")]
    InvalidImages(String),
    #[error("Invalid management configuration: {0}")]
    InvalidManagement(String),
    #[error("Invalid tool configuration: {0}")]
    InvalidTools(String),
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("Invalid deployment configuration: {0}")]
    InvalidDeployment(String),
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log filter used when RUST_LOG is not set (e.g. "info", "debug")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Container images per device class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageConfig {
    pub router_iol: String,
    pub switch_iol: String,
    pub router_vios: String,
    pub switch_vios: String,
}

impl ImageConfig {
    pub fn image_for(&self, class: DeviceClass) -> &str {
        match class {
            DeviceClass::RouterIol => &self.router_iol,
            DeviceClass::SwitchIol => &self.switch_iol,
            DeviceClass::RouterVios => &self.router_vios,
            DeviceClass::SwitchVios => &self.switch_vios,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            router_iol: "vrnetlab/cisco_iol:17.12.01".to_string(),
            switch_iol: "vrnetlab/cisco_iol:L2-17.12.01".to_string(),
            router_vios: "vrnetlab/cisco_vios:15.9.3M6".to_string(),
            switch_vios: "vrnetlab/cisco_viosl2:15.2.2020".to_string(),
        }
    }
}

/// Out-of-band management network
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ManagementConfig {
    /// Network the node management addresses are carved from
    pub network: Ipv4Network,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            network: Ipv4Network::new(Ipv4Addr::new(172, 20, 20, 0), 24)
                .expect("/24 is a valid prefix"),
        }
    }
}

/// Device login credentials written into the inventory and seed configs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub enable_password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
            enable_password: "admin".to_string(),
        }
    }
}

/// External tool executables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    pub containerlab: String,
    pub ansible: String,
    pub ansible_playbook: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            containerlab: "containerlab".to_string(),
            ansible: "ansible".to_string(),
            ansible_playbook: "ansible-playbook".to_string(),
        }
    }
}

/// A bounded polling loop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollConfig {
    pub attempts: u32,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

/// Timings of the bring-up phases
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Polling for the inventory file containerlab writes
    pub inventory_poll: PollConfig,
    /// Pause after the inventory appears, so it is completely written
    #[serde(with = "humantime_serde")]
    pub inventory_settle: Duration,
    /// Reachability polling of the IOL group
    pub iol_probe: PollConfig,
    /// Fixed wait for VIOS virtual machines to boot
    #[serde(with = "humantime_serde")]
    pub vios_boot_wait: Duration,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            inventory_poll: PollConfig {
                attempts: 30,
                interval: Duration::from_secs(1),
            },
            inventory_settle: Duration::from_secs(2),
            iol_probe: PollConfig {
                attempts: 20,
                interval: Duration::from_secs(10),
            },
            vios_boot_wait: Duration::from_secs(180),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.deployment.iol_probe.attempts, 20);
        assert_eq!(config.deployment.vios_boot_wait, Duration::from_secs(180));
        assert_eq!(config.management.network.to_string(), "172.20.20.0/24");
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
images:
  router_iol: "vrnetlab/cisco_iol:17.15.01"
management:
  network: "10.250.0.0/16"
deployment:
  iol_probe:
    attempts: 5
    interval: 3s
  vios_boot_wait: 4m
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.images.router_iol, "vrnetlab/cisco_iol:17.15.01");
        assert_eq!(config.images.switch_iol, "vrnetlab/cisco_iol:L2-17.12.01");
        assert_eq!(config.deployment.iol_probe.interval, Duration::from_secs(3));
        assert_eq!(config.deployment.vios_boot_wait, Duration::from_secs(240));
        assert_eq!(config.deployment.inventory_poll.attempts, 30);
    }

    #[test]
    fn test_validation_errors() {
        let config: Config = serde_yaml::from_str("management: { network: 172.20.20.0/25 }").unwrap();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("smaller than a /24"));

        let config: Config =
            serde_yaml::from_str("deployment: { iol_probe: { attempts: 0, interval: 1s } }").unwrap();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("iol_probe.attempts"));

        let config: Config = serde_yaml::from_str("images: { switch_vios: '' }").unwrap();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("switch-vios"));
    }

    #[test]
    fn test_unknown_sections_are_rejected() {
        let result: Result<Config, _> = serde_yaml::from_str("nodes: []");
        assert!(result.is_err());
    }
}
