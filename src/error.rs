//! Error types shared across the crate.
//!
//! Each layer has its own `thiserror` enum; the binary wraps them in
//! `color_eyre` reports with context.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use crate::batch::DeviceGroup;
use crate::topology::DeviceId;

/// Errors raised while classifying a device name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("unknown device class for '{name}' (expected r<N>, s<N>, vr<N> or vs<N>)")]
    UnknownDeviceClass { name: String },
}

/// Errors raised by the address-plan allocator.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("device name '{name}' does not match any device class")]
    AmbiguousDeviceName {
        name: String,
        #[source]
        source: ClassifyError,
    },

    #[error("device {device} has address number {value}, which does not fit in an octet")]
    OrdinalOutOfRange { device: DeviceId, value: u32 },

    #[error("switch {switch} ran out of host addresses in 192.168.{octet}.0")]
    HostSpaceExhausted { switch: DeviceId, octet: u32 },

    #[error("address {address} for {claimant} is already assigned to {owner}")]
    AddressConflict {
        address: Ipv4Addr,
        owner: String,
        claimant: String,
    },

    #[error("invalid network: {0}")]
    Network(#[from] ipnetwork::IpNetworkError),
}

impl From<ClassifyError> for AllocationError {
    fn from(source: ClassifyError) -> Self {
        let ClassifyError::UnknownDeviceClass { name } = &source;
        AllocationError::AmbiguousDeviceName {
            name: name.clone(),
            source,
        }
    }
}

/// Errors raised while reading the link declaration file.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read input file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input is missing the 'name: <lab>' header line")]
    MissingLabName,

    #[error("line {line}: invalid interface token '{token}' (expected [prefix]<slot>/<port>)")]
    InvalidInterface { line: usize, token: String },
}

/// Errors raised while building or writing the topology descriptor.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("management address for {device} (host offset {offset}) does not fit in {network}")]
    ManagementAddress {
        device: DeviceId,
        offset: u32,
        network: ipnetwork::Ipv4Network,
    },

    #[error("failed to write {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize descriptor: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failures reported by the deployment orchestrator.
///
/// Only `ProvisioningFailed`, `InventoryTimeout` and `StagingFailed` end a
/// run; the others are recorded against their phase and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployError {
    #[error("provisioning failed (exit code {exit_code:?}): {stderr}")]
    ProvisioningFailed { exit_code: Option<i32>, stderr: String },

    #[error("inventory {path:?} did not appear after {attempts} attempts")]
    InventoryTimeout { path: PathBuf, attempts: u32 },

    #[error("{group} devices not reachable after {attempts} attempt(s)")]
    ReachabilityTimeout { group: DeviceGroup, attempts: u32 },

    #[error("batch '{batch}' failed for {group} (exit code {exit_code:?}): {stderr}")]
    BatchFailed {
        batch: String,
        group: DeviceGroup,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to stage command batches: {reason}")]
    StagingFailed { reason: String },
}

impl DeployError {
    /// Whether this failure ends the run.
    pub fn is_fatal(&self) -> bool {
        crate::orchestrator::RunState::aborted_by(self).is_some()
    }
}

/// Errors raised while writing the files command batches read.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("failed to access {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read or write YAML in {path:?}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("inventory {path:?} is malformed: {reason}")]
    InvalidInventory { path: PathBuf, reason: String },
}

/// Errors raised when an external tool cannot be started.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to run '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
