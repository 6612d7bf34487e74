//! Inventory enrichment.
//!
//! containerlab writes `clab-<lab>/ansible-inventory.yml` with the IOL nodes
//! under `cisco_iol` and the VIOS nodes (kind `linux`) under `linux`. Before
//! any batch runs, the VIOS hosts move into `cisco_vios` and both groups get
//! the connection variables the network modules need.
//!
//! Host names are `clab-<lab>-<device>`; only the device part decides
//! whether a host is a VIOS node.

use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

use crate::config::Credentials;
use crate::error::StageError;
use crate::topology::{DeviceClassifier, Family};

/// Extra SSH options for the old key exchange VIOS images offer
pub const LEGACY_SSH_ARGS: &str = "-o KexAlgorithms=+diffie-hellman-group1-sha1,diffie-hellman-group14-sha1,diffie-hellman-group-exchange-sha1 -o HostKeyAlgorithms=+ssh-rsa,ssh-dss";

/// Path of the inventory containerlab generates for `lab`.
pub fn inventory_path(dir: &Path, lab: &str) -> PathBuf {
    dir.join(format!("clab-{}", lab)).join("ansible-inventory.yml")
}

/// Read, enrich and rewrite the inventory at `path`.
pub fn enrich_inventory_file(path: &Path, credentials: &Credentials) -> Result<(), StageError> {
    let content = std::fs::read_to_string(path).map_err(|source| StageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let yaml_err = |source| StageError::Yaml {
        path: path.to_path_buf(),
        source,
    };

    let inventory: Value = serde_yaml::from_str(&content).map_err(yaml_err)?;
    let enriched = enrich_inventory(inventory, credentials).map_err(|reason| {
        StageError::InvalidInventory {
            path: path.to_path_buf(),
            reason,
        }
    })?;

    let output = serde_yaml::to_string(&enriched).map_err(yaml_err)?;
    std::fs::write(path, output).map_err(|source| StageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Enriched inventory {:?}", path);
    Ok(())
}

/// Enrich a parsed inventory document.
///
/// Fails with a description when a section that must be a mapping is not.
pub fn enrich_inventory(mut inventory: Value, credentials: &Credentials) -> Result<Value, String> {
    if inventory.is_null() {
        inventory = Value::Mapping(Mapping::new());
    }
    let root = inventory
        .as_mapping_mut()
        .ok_or_else(|| "document root is not a mapping".to_string())?;

    let all = section(root, "all")?;
    let children = section(all, "children")?;

    let iol_vars = section(section(children, "cisco_iol")?, "vars")?;
    insert_connection_vars(iol_vars, credentials);

    let moved = take_vios_hosts(children)?;
    let vios = section(children, "cisco_vios")?;
    let vios_hosts = section(vios, "hosts")?;
    for (name, vars) in moved {
        log::debug!("Moving {} from linux to cisco_vios", name.as_str().unwrap_or("?"));
        vios_hosts.insert(name, vars);
    }
    let vios_vars = section(vios, "vars")?;
    insert_connection_vars(vios_vars, credentials);
    vios_vars.insert("ansible_ssh_common_args".into(), LEGACY_SSH_ARGS.into());

    section(all, "vars")?.insert("ansible_httpapi_use_proxy".into(), Value::Bool(false));

    Ok(inventory)
}

/// Remove VIOS hosts from the `linux` group, dropping the group if it empties.
fn take_vios_hosts(children: &mut Mapping) -> Result<Vec<(Value, Value)>, String> {
    let Some(linux) = children.get_mut("linux") else {
        return Ok(Vec::new());
    };
    let Some(hosts) = linux.get_mut("hosts").and_then(Value::as_mapping_mut) else {
        return Ok(Vec::new());
    };

    let names: Vec<Value> = hosts
        .keys()
        .filter(|name| name.as_str().is_some_and(is_vios_host))
        .cloned()
        .collect();

    let mut moved = Vec::with_capacity(names.len());
    for name in names {
        if let Some(vars) = hosts.remove(&name) {
            moved.push((name, vars));
        }
    }

    if hosts.is_empty() {
        children.remove("linux");
    }
    Ok(moved)
}

/// Whether the device suffix of a `clab-<lab>-<device>` host name is VIOS.
fn is_vios_host(host: &str) -> bool {
    host.rsplit_once('-')
        .and_then(|(_, device)| DeviceClassifier.classify(device).ok())
        .is_some_and(|device| device.family() == Family::Vios)
}

fn insert_connection_vars(vars: &mut Mapping, credentials: &Credentials) {
    let entries: [(&str, Value); 7] = [
        ("ansible_user", credentials.username.as_str().into()),
        ("ansible_password", credentials.password.as_str().into()),
        ("ansible_network_os", "ios".into()),
        ("ansible_connection", "network_cli".into()),
        ("ansible_become", Value::Bool(true)),
        ("ansible_become_method", "enable".into()),
        ("ansible_become_password", credentials.enable_password.as_str().into()),
    ];
    for (key, value) in entries {
        vars.insert(key.into(), value);
    }
}

/// Child mapping under `key`, created when missing or null.
fn section<'a>(map: &'a mut Mapping, key: &str) -> Result<&'a mut Mapping, String> {
    let entry = map
        .entry(Value::from(key))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if entry.is_null() {
        *entry = Value::Mapping(Mapping::new());
    }
    entry
        .as_mapping_mut()
        .ok_or_else(|| format!("'{}' is not a mapping", key))
}
