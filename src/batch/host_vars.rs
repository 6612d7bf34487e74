//! Per-device host variables.
//!
//! The interface playbooks read `interfaces` from
//! `clab-<lab>/host_vars/clab-<lab>-<dev>.yml` and apply the addresses in
//! list order, so the list order is the allocation order.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StageError;
use crate::ip::AddressPlan;
use crate::topology::DeviceId;

/// One interface entry in a host_vars file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostInterface {
    pub name: String,
    /// Address in CIDR form, e.g. `10.1.2.1/30`
    pub ip: String,
    pub connected_to: String,
}

/// Content of one host_vars file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostVars {
    pub interfaces: Vec<HostInterface>,
}

/// Host variables for every device in the plan, switches included.
pub fn host_vars_for(plan: &AddressPlan) -> BTreeMap<DeviceId, HostVars> {
    plan.devices()
        .map(|(device, interfaces)| {
            let interfaces = interfaces
                .iter()
                .map(|entry| HostInterface {
                    name: entry.interface.clone(),
                    ip: entry.address.to_string(),
                    connected_to: entry.peer.to_string(),
                })
                .collect();
            (*device, HostVars { interfaces })
        })
        .collect()
}

/// Directory containerlab reads host variables from.
pub fn host_vars_dir(dir: &Path, lab: &str) -> PathBuf {
    dir.join(format!("clab-{}", lab)).join("host_vars")
}

/// Write one host_vars file per device. Returns the written paths.
pub fn write_host_vars(
    dir: &Path,
    lab: &str,
    vars: &BTreeMap<DeviceId, HostVars>,
) -> Result<Vec<PathBuf>, StageError> {
    let vars_dir = host_vars_dir(dir, lab);
    std::fs::create_dir_all(&vars_dir).map_err(|source| StageError::Io {
        path: vars_dir.clone(),
        source,
    })?;

    let mut written = Vec::with_capacity(vars.len());
    for (device, host_vars) in vars {
        let path = vars_dir.join(format!("clab-{}-{}.yml", lab, device));
        let yaml = serde_yaml::to_string(host_vars).map_err(|source| StageError::Yaml {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, yaml).map_err(|source| StageError::Io {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }

    log::debug!("Wrote {} host_vars files to {:?}", written.len(), vars_dir);
    Ok(written)
}
