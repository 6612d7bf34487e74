//! Process-backed implementations of the tool seams.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use log::debug;

use super::{CommandOutput, InventoryProbe, Provisioner, RemoteExecGateway, Sleeper};
use crate::batch::{Batch, DeviceGroup};
use crate::error::ExecError;

fn run(program: &str, command: &mut Command) -> Result<CommandOutput, ExecError> {
    debug!("Running {:?}", command);
    command
        .output()
        .map(CommandOutput::from)
        .map_err(|source| ExecError::Spawn {
            program: program.to_string(),
            source,
        })
}

/// `containerlab deploy -t <descriptor> [--reconfigure]`
#[derive(Debug, Clone)]
pub struct ContainerlabProvisioner {
    binary: String,
    reconfigure: bool,
}

impl ContainerlabProvisioner {
    pub fn new(binary: impl Into<String>, reconfigure: bool) -> Self {
        Self {
            binary: binary.into(),
            reconfigure,
        }
    }

    pub fn args(&self, descriptor: &Path) -> Vec<String> {
        let mut args = vec![
            "deploy".to_string(),
            "-t".to_string(),
            descriptor.display().to_string(),
        ];
        if self.reconfigure {
            args.push("--reconfigure".to_string());
        }
        args
    }
}

impl Provisioner for ContainerlabProvisioner {
    fn provision(&self, descriptor: &Path) -> Result<CommandOutput, ExecError> {
        run(&self.binary, Command::new(&self.binary).args(self.args(descriptor)))
    }
}

/// Checks the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsInventoryProbe;

impl InventoryProbe for FsInventoryProbe {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Runs `ansible` probes and `ansible-playbook` batches from the lab
/// working directory, so `ansible.cfg` and the playbooks there are used.
#[derive(Debug, Clone)]
pub struct AnsibleGateway {
    ansible: String,
    ansible_playbook: String,
    workdir: PathBuf,
    /// Inventory path relative to `workdir`
    inventory: PathBuf,
}

impl AnsibleGateway {
    pub fn new(
        ansible: impl Into<String>,
        ansible_playbook: impl Into<String>,
        workdir: impl Into<PathBuf>,
        inventory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ansible: ansible.into(),
            ansible_playbook: ansible_playbook.into(),
            workdir: workdir.into(),
            inventory: inventory.into(),
        }
    }

    pub fn probe_args(&self, group: DeviceGroup) -> Vec<String> {
        vec![
            group.inventory_group().to_string(),
            "-i".to_string(),
            self.inventory.display().to_string(),
            "-m".to_string(),
            "ping".to_string(),
        ]
    }

    pub fn batch_args(&self, batch: Batch, group: DeviceGroup) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            self.inventory.display().to_string(),
            batch.playbook(group).to_string(),
        ];
        if let Some(limit) = batch.limit(group) {
            args.push("--limit".to_string());
            args.push(limit.inventory_group().to_string());
        }
        args
    }
}

impl RemoteExecGateway for AnsibleGateway {
    fn probe(&self, group: DeviceGroup) -> Result<CommandOutput, ExecError> {
        run(
            &self.ansible,
            Command::new(&self.ansible)
                .args(self.probe_args(group))
                .current_dir(&self.workdir),
        )
    }

    fn run_batch(&self, batch: Batch, group: DeviceGroup) -> Result<CommandOutput, ExecError> {
        run(
            &self.ansible_playbook,
            Command::new(&self.ansible_playbook)
                .args(self.batch_args(batch, group))
                .current_dir(&self.workdir)
                .env("ANSIBLE_DISPLAY_SKIPPED_HOSTS", "false"),
        )
    }

    fn command_line(&self, batch: Batch, group: DeviceGroup) -> String {
        std::iter::once(self.ansible_playbook.clone())
            .chain(self.batch_args(batch, group))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> AnsibleGateway {
        AnsibleGateway::new(
            "ansible",
            "ansible-playbook",
            ".",
            "clab-lab/ansible-inventory.yml",
        )
    }

    #[test]
    fn test_provisioner_args() {
        let descriptor = Path::new("lab.yaml");
        assert_eq!(
            ContainerlabProvisioner::new("containerlab", false).args(descriptor),
            vec!["deploy", "-t", "lab.yaml"]
        );
        assert_eq!(
            ContainerlabProvisioner::new("containerlab", true).args(descriptor),
            vec!["deploy", "-t", "lab.yaml", "--reconfigure"]
        );
    }

    #[test]
    fn test_probe_args() {
        assert_eq!(
            gateway().probe_args(DeviceGroup::Iol),
            vec!["cisco_iol", "-i", "clab-lab/ansible-inventory.yml", "-m", "ping"]
        );
    }

    #[test]
    fn test_manual_command_lines() {
        let gateway = gateway();
        assert_eq!(
            gateway.command_line(Batch::Loopback, DeviceGroup::Vios),
            "ansible-playbook -i clab-lab/ansible-inventory.yml loopback_vios.yaml"
        );
        assert_eq!(
            gateway.command_line(Batch::Save, DeviceGroup::Vios),
            "ansible-playbook -i clab-lab/ansible-inventory.yml save_config.yaml --limit cisco_vios"
        );
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let gateway = AnsibleGateway::new(
            "clabgen-test-no-such-binary",
            "clabgen-test-no-such-binary",
            ".",
            "inventory.yml",
        );
        let err = gateway.probe(DeviceGroup::Iol).unwrap_err();
        assert!(matches!(err, ExecError::Spawn { ref program, .. } if program == "clabgen-test-no-such-binary"));
    }

    #[test]
    fn test_fs_inventory_probe() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(FsInventoryProbe.exists(file.path()));
        assert!(!FsInventoryProbe.exists(&file.path().with_extension("missing")));
    }
}
