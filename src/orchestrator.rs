//! Deployment orchestrator.
//!
//! Drives a lab from a written descriptor to configured devices:
//!
//! ```text
//! INIT -> PROVISIONED -> INVENTORY_READY -> IOL_REACHABLE -> IOL_CONFIGURED
//!      -> VIOS_WAIT -> VIOS_REACHABLE -> VIOS_CONFIGURED -> DONE
//! ```
//!
//! Each edge runs one [`Phase`] and returns a [`Transition`]. Provisioning,
//! inventory and staging failures abort the run; probe and batch failures
//! are recorded and the run moves on. A run without VIOS devices jumps from
//! `IOL_CONFIGURED` straight to `DONE`, and a VIOS group that does not answer
//! its probe ends in `VIOS_MANUAL` with the commands to finish by hand.

pub mod phase;
pub mod report;
pub mod state;

pub use phase::{Phase, PhaseStatus, RetryPolicy};
pub use report::{BatchRecord, PhaseRecord, RunReport};
pub use state::{RunState, Transition};

use log::{debug, error, info, warn};
use std::path::PathBuf;

use crate::batch::{Batch, BatchStager, DeviceGroup};
use crate::config::DeploymentConfig;
use crate::error::DeployError;
use crate::exec::{InventoryProbe, Provisioner, RemoteExecGateway, Sleeper};
use crate::ip::AddressPlan;
use crate::topology::{DeviceId, Family};

/// External collaborators of a run.
#[derive(Clone, Copy)]
pub struct DeployTools<'a> {
    pub provisioner: &'a dyn Provisioner,
    pub inventory_probe: &'a dyn InventoryProbe,
    pub gateway: &'a dyn RemoteExecGateway,
    pub stager: &'a dyn BatchStager,
    pub sleeper: &'a dyn Sleeper,
}

/// Paths and timings of a run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub lab: String,
    pub descriptor: PathBuf,
    pub inventory: PathBuf,
    pub timings: DeploymentConfig,
}

/// Devices per group, taken from the address plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupMembers {
    pub iol: Vec<DeviceId>,
    pub vios: Vec<DeviceId>,
}

impl GroupMembers {
    pub fn from_plan(plan: &AddressPlan) -> Self {
        Self {
            iol: plan.members(Family::Iol),
            vios: plan.members(Family::Vios),
        }
    }

    pub fn get(&self, group: DeviceGroup) -> &[DeviceId] {
        match group {
            DeviceGroup::Iol => &self.iol,
            DeviceGroup::Vios => &self.vios,
        }
    }
}

/// Runs the phase state machine once.
pub struct DeploymentOrchestrator<'a> {
    tools: DeployTools<'a>,
    settings: RunSettings,
    members: GroupMembers,
    report: RunReport,
}

impl<'a> DeploymentOrchestrator<'a> {
    pub fn new(tools: DeployTools<'a>, settings: RunSettings, members: GroupMembers) -> Self {
        let report = RunReport::new(settings.lab.clone());
        Self {
            tools,
            settings,
            members,
            report,
        }
    }

    /// Run until a terminal state and return the report.
    pub fn run(mut self) -> RunReport {
        info!(
            "Deploying lab '{}' ({} IOL, {} VIOS devices)",
            self.settings.lab,
            self.members.iol.len(),
            self.members.vios.len()
        );

        let mut state = RunState::Init;
        while let Some(successor) = state.successor() {
            let next = match self.step(state) {
                Transition::Continue => successor,
                Transition::SkipTo(target) => target,
                Transition::Abort(error) => {
                    let target = match RunState::aborted_by(&error) {
                        Some(target) => {
                            error!("Deployment aborted: {}", error);
                            target
                        }
                        None => {
                            warn!("{}, continuing", error);
                            successor
                        }
                    };
                    self.report.failures.push(error);
                    target
                }
            };
            info!("{} -> {}", state, next);
            state = next;
        }

        self.report.close(state);
        if self.report.is_clean() {
            info!("Lab '{}' deployed and configured", self.settings.lab);
        } else {
            warn!(
                "Lab '{}' finished in {} with {} failure(s)",
                self.settings.lab,
                state,
                self.report.failures.len()
            );
        }
        self.report
    }

    fn step(&mut self, state: RunState) -> Transition {
        match Phase::leaving(state) {
            Some(Phase::Provision) => self.provision(),
            Some(Phase::Inventory) => self.await_inventory(),
            Some(phase @ (Phase::IolProbe | Phase::ViosProbe)) => self.probe_group(phase),
            Some(phase @ (Phase::IolConfigure | Phase::ViosConfigure)) => self.configure_group(phase),
            Some(Phase::ViosWait) => self.wait_for_vios(),
            None => Transition::Continue,
        }
    }

    fn provision(&mut self) -> Transition {
        let phase = Phase::Provision;
        self.report.start(phase);
        info!("Provisioning lab from {:?}", self.settings.descriptor);

        let failure = match self.tools.provisioner.provision(&self.settings.descriptor) {
            Ok(output) if output.success() => None,
            Ok(output) => Some(DeployError::ProvisioningFailed {
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            }),
            Err(err) => Some(DeployError::ProvisioningFailed {
                exit_code: None,
                stderr: error_chain(&err),
            }),
        };

        match failure {
            None => {
                self.report.finish(phase, PhaseStatus::Succeeded);
                Transition::Continue
            }
            Some(error) => {
                self.report.finish(phase, PhaseStatus::Failed);
                Transition::Abort(error)
            }
        }
    }

    fn await_inventory(&mut self) -> Transition {
        let phase = Phase::Inventory;
        let tools = self.tools;
        let inventory = &self.settings.inventory;
        let policy = phase.retry_policy(&self.settings.timings);
        self.report.start(phase);
        info!("Waiting for inventory {:?}", inventory);

        let found = policy.run(
            |interval| tools.sleeper.sleep(interval),
            |attempt| {
                let exists = tools.inventory_probe.exists(inventory);
                if !exists {
                    debug!("Inventory not there yet (attempt {}/{})", attempt, policy.attempts());
                }
                exists
            },
        );

        let Some(attempt) = found else {
            self.report.set_attempts(phase, policy.attempts());
            self.report.finish(phase, PhaseStatus::Failed);
            return Transition::Abort(DeployError::InventoryTimeout {
                path: inventory.clone(),
                attempts: policy.attempts(),
            });
        };
        self.report.set_attempts(phase, attempt);
        info!("Inventory found: {:?}", inventory);

        tools.sleeper.sleep(self.settings.timings.inventory_settle);
        if let Err(err) = tools.stager.stage(inventory) {
            self.report.finish(phase, PhaseStatus::Failed);
            return Transition::Abort(DeployError::StagingFailed {
                reason: error_chain(&err),
            });
        }
        self.report.note(phase, "inventory enriched, playbooks and host_vars written");
        self.report.finish(phase, PhaseStatus::Succeeded);
        Transition::Continue
    }

    fn probe_group(&mut self, phase: Phase) -> Transition {
        let Some(group) = phase.group() else {
            return Transition::Continue;
        };
        if self.skip_empty_group(phase, group) {
            return Transition::Continue;
        }

        let tools = self.tools;
        let policy = phase.retry_policy(&self.settings.timings);
        self.report.start(phase);
        info!("Checking that {} devices are reachable", group);

        let reached = policy.run(
            |interval| tools.sleeper.sleep(interval),
            |attempt| match tools.gateway.probe(group) {
                Ok(output) if output.success() => true,
                Ok(_) => {
                    info!(
                        "Attempt {}/{}: {} devices not ready yet",
                        attempt,
                        policy.attempts(),
                        group
                    );
                    false
                }
                Err(err) => {
                    warn!("Attempt {}/{}: {}", attempt, policy.attempts(), error_chain(&err));
                    false
                }
            },
        );

        if let Some(attempt) = reached {
            info!("{} devices ready", group);
            self.report.set_attempts(phase, attempt);
            self.report.finish(phase, PhaseStatus::Succeeded);
            return Transition::Continue;
        }

        self.report.set_attempts(phase, policy.attempts());
        self.report.finish(phase, PhaseStatus::Failed);
        let error = DeployError::ReachabilityTimeout {
            group,
            attempts: policy.attempts(),
        };

        match group {
            DeviceGroup::Iol => {
                warn!("{}, continuing with configuration", error);
                self.report.failures.push(error);
                Transition::Continue
            }
            DeviceGroup::Vios => {
                warn!("{}; configure them manually with:", error);
                self.report.failures.push(error);
                let commands: Vec<String> = Batch::ALL
                    .iter()
                    .map(|batch| tools.gateway.command_line(*batch, group))
                    .collect();
                for command in &commands {
                    warn!("  {}", command);
                }
                self.report.manual_commands = commands;
                Transition::SkipTo(RunState::ViosManual)
            }
        }
    }

    fn configure_group(&mut self, phase: Phase) -> Transition {
        let Some(group) = phase.group() else {
            return Transition::Continue;
        };
        if self.skip_empty_group(phase, group) {
            return Transition::Continue;
        }

        self.report.start(phase);
        let mut all_succeeded = true;

        for batch in Batch::ALL {
            info!("Applying {} batch to {}", batch, group);
            let (exit_code, stdout, stderr) = match self.tools.gateway.run_batch(batch, group) {
                Ok(output) => (output.exit_code, output.stdout, output.stderr),
                Err(err) => (None, String::new(), error_chain(&err)),
            };
            let succeeded = exit_code == Some(0);

            let highlights = batch.highlights(&stdout);
            for line in &highlights {
                info!("{}", line);
            }

            if !succeeded {
                all_succeeded = false;
                error!("Batch {} failed for {}: {}", batch, group, stderr.trim());
                self.report.failures.push(DeployError::BatchFailed {
                    batch: batch.name().to_string(),
                    group,
                    exit_code,
                    stderr: stderr.trim().to_string(),
                });
            }

            if let Some(record) = self.report.phase_mut(phase) {
                record.batches.push(BatchRecord {
                    batch,
                    group,
                    exit_code,
                    succeeded,
                    highlights,
                });
            }
        }

        let status = if all_succeeded {
            PhaseStatus::Succeeded
        } else {
            PhaseStatus::Failed
        };
        self.report.finish(phase, status);
        Transition::Continue
    }

    fn wait_for_vios(&mut self) -> Transition {
        let phase = Phase::ViosWait;
        if self.members.vios.is_empty() {
            info!("No VIOS devices in the plan, skipping VIOS phases");
            self.report.note(phase, "no VIOS devices");
            return Transition::SkipTo(RunState::Done);
        }

        let tools = self.tools;
        let policy = phase.retry_policy(&self.settings.timings);
        self.report.start(phase);
        info!(
            "Waiting {:?} for {} VIOS devices to boot",
            self.settings.timings.vios_boot_wait,
            self.members.vios.len()
        );
        policy.run(|duration| tools.sleeper.sleep(duration), |_| true);
        self.report.finish(phase, PhaseStatus::Succeeded);
        Transition::Continue
    }

    /// Record `phase` as skipped when its group has no devices.
    fn skip_empty_group(&mut self, phase: Phase, group: DeviceGroup) -> bool {
        if !self.members.get(group).is_empty() {
            return false;
        }
        info!("No {} devices, skipping {}", group, phase);
        self.report.note(phase, format!("no {} devices", group));
        self.report.finish(phase, PhaseStatus::Skipped);
        true
    }
}

/// An error and its sources on one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
