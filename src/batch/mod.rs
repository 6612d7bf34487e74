//! Remote command batches.
//!
//! A batch is one playbook run against one device group. This module names
//! the batches and groups, renders the playbooks and `ansible.cfg`, writes
//! per-device host variables from the address plan and enriches the
//! inventory containerlab generates. Everything here is file output; the
//! process calls live in [`crate::exec`].

pub mod host_vars;
pub mod inventory;
pub mod stage;
pub mod templates;

pub use host_vars::{host_vars_for, write_host_vars, HostInterface, HostVars};
pub use inventory::{enrich_inventory, enrich_inventory_file, inventory_path};
pub use stage::AnsibleStager;

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::error::StageError;
use crate::topology::Family;

/// Inventory group a batch is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DeviceGroup {
    #[serde(rename = "cisco_iol")]
    Iol,
    #[serde(rename = "cisco_vios")]
    Vios,
}

impl DeviceGroup {
    /// Group name in the ansible inventory
    pub fn inventory_group(self) -> &'static str {
        match self {
            DeviceGroup::Iol => "cisco_iol",
            DeviceGroup::Vios => "cisco_vios",
        }
    }

    pub fn family(self) -> Family {
        match self {
            DeviceGroup::Iol => Family::Iol,
            DeviceGroup::Vios => Family::Vios,
        }
    }
}

impl From<Family> for DeviceGroup {
    fn from(family: Family) -> Self {
        match family {
            Family::Iol => DeviceGroup::Iol,
            Family::Vios => DeviceGroup::Vios,
        }
    }
}

impl fmt::Display for DeviceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.inventory_group())
    }
}

/// The configuration batches, in the order they run per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Batch {
    Loopback,
    InterfaceAddress,
    Save,
}

impl Batch {
    pub const ALL: [Batch; 3] = [Batch::Loopback, Batch::InterfaceAddress, Batch::Save];

    pub fn name(self) -> &'static str {
        match self {
            Batch::Loopback => "loopback",
            Batch::InterfaceAddress => "interface_ip",
            Batch::Save => "save_config",
        }
    }

    /// Playbook file run for `group`.
    pub fn playbook(self, group: DeviceGroup) -> &'static str {
        match (self, group) {
            (Batch::Loopback, DeviceGroup::Iol) => "loopback_iol.yaml",
            (Batch::Loopback, DeviceGroup::Vios) => "loopback_vios.yaml",
            (Batch::InterfaceAddress, DeviceGroup::Iol) => "interface_ip_iol.yaml",
            (Batch::InterfaceAddress, DeviceGroup::Vios) => "interface_ip_vios.yaml",
            (Batch::Save, _) => "save_config.yaml",
        }
    }

    /// `--limit` needed to scope the playbook to `group`.
    ///
    /// The save playbook targets both groups; the others are per group.
    pub fn limit(self, group: DeviceGroup) -> Option<DeviceGroup> {
        match self {
            Batch::Save => Some(group),
            _ => None,
        }
    }

    /// Substrings that mark summary lines in the playbook output
    pub fn markers(self) -> &'static [&'static str] {
        match self {
            Batch::Loopback => &["Loopback Configuration"],
            Batch::InterfaceAddress => &["Interface Configuration", "Interface Status"],
            Batch::Save => &["bytes copied"],
        }
    }

    /// Operator-facing summary lines from a playbook's stdout.
    pub fn highlights(self, stdout: &str) -> Vec<String> {
        stdout
            .lines()
            .filter(|line| self.markers().iter().any(|marker| line.contains(marker)))
            .map(|line| {
                line.replace("\\n", "\n")
                    .replace("\"msg\":", "")
                    .replace("msg:", "")
                    .trim()
                    .trim_matches('"')
                    .trim()
                    .to_string()
            })
            .collect()
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Prepares the files command batches read once the inventory exists.
pub trait BatchStager {
    fn stage(&self, inventory: &Path) -> Result<(), StageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playbook_selection() {
        assert_eq!(Batch::Loopback.playbook(DeviceGroup::Iol), "loopback_iol.yaml");
        assert_eq!(Batch::InterfaceAddress.playbook(DeviceGroup::Vios), "interface_ip_vios.yaml");
        assert_eq!(Batch::Save.playbook(DeviceGroup::Vios), "save_config.yaml");
        assert_eq!(Batch::Save.limit(DeviceGroup::Vios), Some(DeviceGroup::Vios));
        assert_eq!(Batch::Loopback.limit(DeviceGroup::Iol), None);
    }

    #[test]
    fn test_group_names() {
        assert_eq!(DeviceGroup::Iol.to_string(), "cisco_iol");
        assert_eq!(DeviceGroup::from(Family::Vios), DeviceGroup::Vios);
        assert_eq!(serde_json::to_string(&DeviceGroup::Vios).unwrap(), "\"cisco_vios\"");
    }

    #[test]
    fn test_highlights() {
        let stdout = r#"
TASK [Display Configuration Summary] ****
ok: [clab-lab-r1] => {
    "msg": "r1 Loopback Configuration: \n- Loopback0: 1.1.1.1/32 \n- Loopback10: 172.16.1.1/24"
}
PLAY RECAP ****
"#;
        let lines = Batch::Loopback.highlights(stdout);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("r1 Loopback Configuration:"));
        assert!(lines[0].contains("\n- Loopback0: 1.1.1.1/32"));

        let save = "ok: [clab-lab-r1] => {\n    \"output.stdout_lines\": [\n        \"1234 bytes copied in 0.1 secs\"\n    ]\n}";
        assert_eq!(Batch::Save.highlights(save), vec!["1234 bytes copied in 0.1 secs"]);
        assert!(Batch::InterfaceAddress.highlights(save).is_empty());
    }
}
