//! Run states and transitions.

use serde::Serialize;
use std::fmt;

use crate::error::DeployError;

/// Where a deployment run stands.
///
/// The happy path is `Init` through `Done`; `InventoryMissing`,
/// `ProvisioningFailed`, `StagingFailed` and `ViosManual` are the other
/// terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Init,
    Provisioned,
    InventoryReady,
    IolReachable,
    IolConfigured,
    ViosWait,
    ViosReachable,
    ViosConfigured,
    Done,
    ProvisioningFailed,
    InventoryMissing,
    StagingFailed,
    ViosManual,
}

impl RunState {
    /// Next state on the happy path, `None` for terminal states.
    pub fn successor(self) -> Option<RunState> {
        use RunState::*;
        match self {
            Init => Some(Provisioned),
            Provisioned => Some(InventoryReady),
            InventoryReady => Some(IolReachable),
            IolReachable => Some(IolConfigured),
            IolConfigured => Some(ViosWait),
            ViosWait => Some(ViosReachable),
            ViosReachable => Some(ViosConfigured),
            ViosConfigured => Some(Done),
            Done | ProvisioningFailed | InventoryMissing | StagingFailed | ViosManual => None,
        }
    }

    /// Terminal state a fatal error ends the run in, `None` for errors the
    /// run records and continues past.
    pub fn aborted_by(error: &DeployError) -> Option<RunState> {
        match error {
            DeployError::ProvisioningFailed { .. } => Some(RunState::ProvisioningFailed),
            DeployError::InventoryTimeout { .. } => Some(RunState::InventoryMissing),
            DeployError::StagingFailed { .. } => Some(RunState::StagingFailed),
            DeployError::ReachabilityTimeout { .. } | DeployError::BatchFailed { .. } => None,
        }
    }

    fn name(self) -> &'static str {
        use RunState::*;
        match self {
            Init => "INIT",
            Provisioned => "PROVISIONED",
            InventoryReady => "INVENTORY_READY",
            IolReachable => "IOL_REACHABLE",
            IolConfigured => "IOL_CONFIGURED",
            ViosWait => "VIOS_WAIT",
            ViosReachable => "VIOS_REACHABLE",
            ViosConfigured => "VIOS_CONFIGURED",
            Done => "DONE",
            ProvisioningFailed => "PROVISIONING_FAILED",
            InventoryMissing => "INVENTORY_MISSING",
            StagingFailed => "STAGING_FAILED",
            ViosManual => "VIOS_MANUAL",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one edge of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Move to the successor state
    Continue,
    /// Jump to a later state, bypassing the phases in between
    SkipTo(RunState),
    /// End the run in the terminal state for this error
    Abort(DeployError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::DeviceGroup;
    use std::path::PathBuf;

    #[test]
    fn test_happy_path_reaches_done() {
        let mut state = RunState::Init;
        let mut visited = vec![state];
        while let Some(next) = state.successor() {
            state = next;
            visited.push(state);
        }
        assert_eq!(state, RunState::Done);
        assert_eq!(visited.len(), 9);
    }

    #[test]
    fn test_abort_targets() {
        let timeout = DeployError::InventoryTimeout {
            path: PathBuf::from("clab-lab/ansible-inventory.yml"),
            attempts: 30,
        };
        assert_eq!(RunState::aborted_by(&timeout), Some(RunState::InventoryMissing));
        assert!(RunState::InventoryMissing.successor().is_none());
        assert_eq!(RunState::ViosWait.to_string(), "VIOS_WAIT");
        assert_eq!(serde_json::to_string(&RunState::ViosManual).unwrap(), "\"VIOS_MANUAL\"");
    }

    #[test]
    fn test_each_error_maps_to_its_own_outcome() {
        let provisioning = DeployError::ProvisioningFailed {
            exit_code: Some(1),
            stderr: String::new(),
        };
        let staging = DeployError::StagingFailed {
            reason: "inventory is malformed".to_string(),
        };
        let unreachable = DeployError::ReachabilityTimeout {
            group: DeviceGroup::Iol,
            attempts: 20,
        };
        let batch = DeployError::BatchFailed {
            batch: "save_config".to_string(),
            group: DeviceGroup::Vios,
            exit_code: Some(2),
            stderr: String::new(),
        };

        assert_eq!(RunState::aborted_by(&provisioning), Some(RunState::ProvisioningFailed));
        assert_eq!(RunState::aborted_by(&staging), Some(RunState::StagingFailed));
        assert_eq!(RunState::aborted_by(&unreachable), None);
        assert_eq!(RunState::aborted_by(&batch), None);

        assert!(provisioning.is_fatal() && staging.is_fatal());
        assert!(!unreachable.is_fatal() && !batch.is_fatal());
    }
}
