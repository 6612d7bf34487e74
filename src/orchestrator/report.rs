//! Run report written to `deploy_report.json`.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::path::Path;

use super::phase::{Phase, PhaseStatus};
use super::state::RunState;
use crate::batch::{Batch, DeviceGroup};
use crate::error::DeployError;

/// Result of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRecord {
    pub batch: Batch,
    pub group: DeviceGroup,
    pub exit_code: Option<i32>,
    pub succeeded: bool,
    /// Summary lines picked from stdout
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

/// What happened to one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    pub status: PhaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Attempts used by a polling phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub batches: Vec<BatchRecord>,
}

impl PhaseRecord {
    fn pending(phase: Phase) -> Self {
        Self {
            phase,
            status: PhaseStatus::Pending,
            started_at: None,
            finished_at: None,
            attempts: None,
            notes: Vec::new(),
            batches: Vec::new(),
        }
    }
}

/// Full account of a deployment run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub lab: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub final_state: RunState,
    pub phases: Vec<PhaseRecord>,
    #[serde(serialize_with = "serialize_errors")]
    pub failures: Vec<DeployError>,
    /// Commands to finish the VIOS configuration by hand
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub manual_commands: Vec<String>,
}

fn serialize_errors<S: Serializer>(errors: &[DeployError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

impl RunReport {
    pub fn new(lab: impl Into<String>) -> Self {
        Self {
            lab: lab.into(),
            started_at: Utc::now(),
            finished_at: None,
            final_state: RunState::Init,
            phases: Phase::ALL.iter().copied().map(PhaseRecord::pending).collect(),
            failures: Vec::new(),
            manual_commands: Vec::new(),
        }
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseRecord> {
        self.phases.iter().find(|record| record.phase == phase)
    }

    pub fn status(&self, phase: Phase) -> Option<PhaseStatus> {
        self.phase(phase).map(|record| record.status)
    }

    pub(crate) fn phase_mut(&mut self, phase: Phase) -> Option<&mut PhaseRecord> {
        self.phases.iter_mut().find(|record| record.phase == phase)
    }

    pub(crate) fn start(&mut self, phase: Phase) {
        if let Some(record) = self.phase_mut(phase) {
            record.status = PhaseStatus::Running;
            record.started_at = Some(Utc::now());
        }
    }

    pub(crate) fn finish(&mut self, phase: Phase, status: PhaseStatus) {
        if let Some(record) = self.phase_mut(phase) {
            record.status = status;
            record.finished_at = Some(Utc::now());
        }
    }

    pub(crate) fn set_attempts(&mut self, phase: Phase, attempts: u32) {
        if let Some(record) = self.phase_mut(phase) {
            record.attempts = Some(attempts);
        }
    }

    pub(crate) fn note(&mut self, phase: Phase, note: impl Into<String>) {
        if let Some(record) = self.phase_mut(phase) {
            record.notes.push(note.into());
        }
    }

    /// Mark every phase that never ran as skipped and close the report.
    pub(crate) fn close(&mut self, final_state: RunState) {
        for record in &mut self.phases {
            if record.status == PhaseStatus::Pending {
                record.status = PhaseStatus::Skipped;
            }
        }
        self.final_state = final_state;
        self.finished_at = Some(Utc::now());
    }

    /// The error that ended the run early, if any.
    pub fn fatal_error(&self) -> Option<&DeployError> {
        self.failures.iter().find(|error| error.is_fatal())
    }

    /// Whether the run reached `DONE` without any failure.
    pub fn is_clean(&self) -> bool {
        self.final_state == RunState::Done && self.failures.is_empty()
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> color_eyre::Result<()> {
        use color_eyre::eyre::WrapErr;

        let json = serde_json::to_string_pretty(self).wrap_err("Failed to serialize run report")?;
        std::fs::write(path, json).wrap_err_with(|| format!("Failed to write run report {:?}", path))?;
        Ok(())
    }
}
