//! Staging of batch inputs after containerlab has written the inventory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::host_vars::{write_host_vars, HostVars};
use super::inventory::enrich_inventory_file;
use super::templates::write_batch_files;
use super::BatchStager;
use crate::config::Credentials;
use crate::error::StageError;
use crate::topology::DeviceId;

/// Writes everything `ansible-playbook` reads for one lab.
#[derive(Debug, Clone)]
pub struct AnsibleStager {
    workdir: PathBuf,
    lab: String,
    credentials: Credentials,
    host_vars: BTreeMap<DeviceId, HostVars>,
}

impl AnsibleStager {
    pub fn new(
        workdir: impl Into<PathBuf>,
        lab: impl Into<String>,
        credentials: Credentials,
        host_vars: BTreeMap<DeviceId, HostVars>,
    ) -> Self {
        Self {
            workdir: workdir.into(),
            lab: lab.into(),
            credentials,
            host_vars,
        }
    }
}

impl BatchStager for AnsibleStager {
    fn stage(&self, inventory: &Path) -> Result<(), StageError> {
        enrich_inventory_file(inventory, &self.credentials)?;
        let files = write_batch_files(&self.workdir)?;
        let vars = write_host_vars(&self.workdir, &self.lab, &self.host_vars)?;
        log::info!(
            "Staged {} playbook files and {} host_vars files",
            files.len(),
            vars.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::host_vars::HostInterface;
    use crate::batch::inventory::inventory_path;
    use tempfile::TempDir;

    #[test]
    fn test_stage_writes_all_inputs() {
        let dir = TempDir::new().unwrap();
        let inventory = inventory_path(dir.path(), "lab");
        std::fs::create_dir_all(inventory.parent().unwrap()).unwrap();
        std::fs::write(&inventory, "all:\n  children:\n    cisco_iol:\n      hosts: {}\n").unwrap();

        let r1: DeviceId = "r1".parse().unwrap();
        let host_vars = BTreeMap::from([(
            r1,
            HostVars {
                interfaces: vec![HostInterface {
                    name: "Ethernet0/0".to_string(),
                    ip: "10.1.2.1/30".to_string(),
                    connected_to: "r2".to_string(),
                }],
            },
        )]);

        let stager = AnsibleStager::new(dir.path(), "lab", Credentials::default(), host_vars);
        stager.stage(&inventory).unwrap();

        assert!(dir.path().join("ansible.cfg").exists());
        assert!(dir.path().join("save_config.yaml").exists());
        assert!(dir.path().join("clab-lab/host_vars/clab-lab-r1.yml").exists());
        let enriched = std::fs::read_to_string(&inventory).unwrap();
        assert!(enriched.contains("ansible_network_os: ios"));
    }

    #[test]
    fn test_missing_inventory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let stager = AnsibleStager::new(dir.path(), "lab", Credentials::default(), BTreeMap::new());
        let err = stager.stage(&dir.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, StageError::Io { .. }));
    }
}
