//! External tool seams.
//!
//! The orchestrator only talks to these traits. The process-backed
//! implementations in [`command`] shell out to containerlab and ansible;
//! tests substitute scripted fakes.

pub mod command;

pub use command::{AnsibleGateway, ContainerlabProvisioner, FsInventoryProbe, ThreadSleeper};

use std::path::Path;
use std::time::Duration;

use crate::batch::{Batch, DeviceGroup};
use crate::error::ExecError;

/// Captured result of one external process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Brings the lab up from a topology descriptor.
pub trait Provisioner {
    fn provision(&self, descriptor: &Path) -> Result<CommandOutput, ExecError>;
}

/// Checks whether the generated inventory exists yet.
pub trait InventoryProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Runs reachability probes and command batches against device groups.
pub trait RemoteExecGateway {
    /// Probe every device of `group`; a zero exit means all are reachable.
    fn probe(&self, group: DeviceGroup) -> Result<CommandOutput, ExecError>;

    /// Run `batch` against `group`.
    fn run_batch(&self, batch: Batch, group: DeviceGroup) -> Result<CommandOutput, ExecError>;

    /// Shell command an operator can run to apply `batch` to `group` by hand.
    fn command_line(&self, batch: Batch, group: DeviceGroup) -> String;
}

/// Blocking pause between polling attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}
