//! Containerlab topology descriptor.
//!
//! Builds the `<lab>.yaml` file handed to containerlab and the seed startup
//! configs the VIOS images boot from. Node attributes are chosen per device
//! class; management addresses are carved from the configured management
//! network at the class offset plus the device ordinal.

pub mod types;

pub use types::{ClabLink, ClabNode, ClabSpec, ClabTopology};

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::{Config, Credentials};
use crate::error::DescriptorError;
use crate::topology::{render_interface, DeviceClass, DeviceId, Endpoint, Family, Topology, TopologyWarning};

/// Directory (relative to the descriptor) holding VIOS startup configs
pub const STARTUP_CONFIG_DIR: &str = "config";

/// A built descriptor plus the warnings raised while naming interfaces.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub topology: ClabTopology,
    pub warnings: Vec<TopologyWarning>,
}

/// Build the containerlab descriptor for `topology`.
pub fn build_descriptor(
    lab_name: &str,
    topology: &Topology,
    config: &Config,
) -> Result<Descriptor, DescriptorError> {
    let mut nodes = BTreeMap::new();
    for device in topology.devices() {
        nodes.insert(*device, build_node(*device, config)?);
    }

    let mut warnings = Vec::new();
    let mut endpoint = |end: Endpoint| {
        let rendered = render_interface(end.device, end.interface);
        for warning in rendered.warnings {
            warn!("{}", warning);
            warnings.push(warning);
        }
        format!("{}:{}", end.device, rendered.name)
    };

    let links = topology
        .links()
        .iter()
        .map(|link| ClabLink {
            endpoints: [endpoint(link.a), endpoint(link.b)],
        })
        .collect();

    info!(
        "Built descriptor for lab '{}' with {} nodes",
        lab_name,
        topology.devices().len()
    );

    Ok(Descriptor {
        topology: ClabTopology {
            name: lab_name.to_string(),
            topology: ClabSpec { nodes, links },
        },
        warnings,
    })
}

fn build_node(device: DeviceId, config: &Config) -> Result<ClabNode, DescriptorError> {
    let class = device.class;
    let kind = match class.family() {
        Family::Iol => "cisco_iol",
        Family::Vios => "linux",
    };

    let mut binds = Vec::new();
    let mut env = BTreeMap::new();
    if class.family() == Family::Vios {
        binds.push(format!(
            "{}/{}.cfg:/config/startup-config.cfg",
            STARTUP_CONFIG_DIR, device
        ));
        let hostname = match class {
            DeviceClass::SwitchVios => format!("viosl2-{}", device.ordinal),
            _ => format!("xrv{}", device.ordinal),
        };
        env.insert("HOSTNAME".to_string(), hostname);
    }

    Ok(ClabNode {
        kind: kind.to_string(),
        image: config.images.image_for(class).to_string(),
        node_type: class.is_switch().then(|| "L2".to_string()),
        binds,
        env,
        mgmt_ipv4: management_address(device, config)?.to_string(),
    })
}

/// Management address of `device`: network base + class offset + ordinal.
pub fn management_address(device: DeviceId, config: &Config) -> Result<Ipv4Addr, DescriptorError> {
    let network = config.management.network;
    let offset = device.class.management_offset().saturating_add(device.ordinal);
    let out_of_range = || DescriptorError::ManagementAddress {
        device,
        offset,
        network,
    };

    let address = u32::from(network.network())
        .checked_add(offset)
        .map(Ipv4Addr::from)
        .ok_or_else(out_of_range)?;

    if !network.contains(address) || address == network.broadcast() {
        return Err(out_of_range());
    }
    Ok(address)
}

/// Write the descriptor YAML to `path`.
pub fn write_descriptor(path: &Path, topology: &ClabTopology) -> Result<(), DescriptorError> {
    let yaml = serde_yaml::to_string(topology)?;
    std::fs::write(path, yaml).map_err(|source| DescriptorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote containerlab topology to {:?}", path);
    Ok(())
}

/// Seed startup config a VIOS device boots with.
pub fn seed_startup_config(device: DeviceId, credentials: &Credentials) -> String {
    format!(
        "hostname {}\nenable secret {}\nusername {} privilege 15 secret {}\nline vty 0 4\n login local\n",
        device, credentials.enable_password, credentials.username, credentials.password
    )
}

/// Create `<dir>/config/<dev>.cfg` for every VIOS device that lacks one.
///
/// Existing files are left untouched. Returns the files that were created.
pub fn write_startup_configs(
    dir: &Path,
    topology: &Topology,
    credentials: &Credentials,
) -> Result<Vec<PathBuf>, DescriptorError> {
    if !topology.has_family(Family::Vios) {
        return Ok(Vec::new());
    }

    let config_dir = dir.join(STARTUP_CONFIG_DIR);
    std::fs::create_dir_all(&config_dir).map_err(|source| DescriptorError::Io {
        path: config_dir.clone(),
        source,
    })?;

    let mut created = Vec::new();
    for device in topology.members(Family::Vios) {
        let path = config_dir.join(format!("{}.cfg", device));
        if path.exists() {
            continue;
        }
        std::fs::write(&path, seed_startup_config(device, credentials)).map_err(|source| {
            DescriptorError::Io {
                path: path.clone(),
                source,
            }
        })?;
        info!("Created startup config {:?}", path);
        created.push(path);
    }

    Ok(created)
}
