//! Deployment phases and their retry policies.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use super::state::RunState;
use crate::batch::DeviceGroup;
use crate::config::DeploymentConfig;

/// One ordered step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Provision,
    Inventory,
    IolProbe,
    IolConfigure,
    ViosWait,
    ViosProbe,
    ViosConfigure,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Provision,
        Phase::Inventory,
        Phase::IolProbe,
        Phase::IolConfigure,
        Phase::ViosWait,
        Phase::ViosProbe,
        Phase::ViosConfigure,
    ];

    /// Phase executed on the edge leaving `state`.
    pub fn leaving(state: RunState) -> Option<Phase> {
        match state {
            RunState::Init => Some(Phase::Provision),
            RunState::Provisioned => Some(Phase::Inventory),
            RunState::InventoryReady => Some(Phase::IolProbe),
            RunState::IolReachable => Some(Phase::IolConfigure),
            RunState::IolConfigured => Some(Phase::ViosWait),
            RunState::ViosWait => Some(Phase::ViosProbe),
            RunState::ViosReachable => Some(Phase::ViosConfigure),
            _ => None,
        }
    }

    /// Device group the phase acts on, if any.
    pub fn group(self) -> Option<DeviceGroup> {
        match self {
            Phase::Provision | Phase::Inventory => None,
            Phase::IolProbe | Phase::IolConfigure => Some(DeviceGroup::Iol),
            Phase::ViosWait | Phase::ViosProbe | Phase::ViosConfigure => Some(DeviceGroup::Vios),
        }
    }

    pub fn retry_policy(self, timings: &DeploymentConfig) -> RetryPolicy {
        match self {
            Phase::Inventory => RetryPolicy::Bounded {
                attempts: timings.inventory_poll.attempts,
                interval: timings.inventory_poll.interval,
            },
            Phase::IolProbe => RetryPolicy::Bounded {
                attempts: timings.iol_probe.attempts,
                interval: timings.iol_probe.interval,
            },
            Phase::ViosWait => RetryPolicy::FixedWait(timings.vios_boot_wait),
            Phase::ViosProbe => RetryPolicy::Bounded {
                attempts: 1,
                interval: Duration::ZERO,
            },
            Phase::Provision | Phase::IolConfigure | Phase::ViosConfigure => RetryPolicy::None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Phase::Provision => "provision",
            Phase::Inventory => "inventory",
            Phase::IolProbe => "iol_probe",
            Phase::IolConfigure => "iol_configure",
            Phase::ViosWait => "vios_wait",
            Phase::ViosProbe => "vios_probe",
            Phase::ViosConfigure => "vios_configure",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a phase retries its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Run once
    None,
    /// Up to `attempts` tries with `interval` between failed tries
    Bounded { attempts: u32, interval: Duration },
    /// Wait a fixed time, no action to retry
    FixedWait(Duration),
}

impl RetryPolicy {
    /// Call `attempt` until it returns true or the policy is exhausted.
    ///
    /// Sleeps between attempts only, never after the last one. Returns the
    /// number of the successful attempt, or `None` if every attempt failed.
    pub fn run(self, sleep: impl Fn(Duration), mut attempt: impl FnMut(u32) -> bool) -> Option<u32> {
        match self {
            RetryPolicy::None => attempt(1).then_some(1),
            RetryPolicy::FixedWait(duration) => {
                sleep(duration);
                Some(1)
            }
            RetryPolicy::Bounded { attempts, interval } => {
                for n in 1..=attempts {
                    if attempt(n) {
                        return Some(n);
                    }
                    if n < attempts {
                        sleep(interval);
                    }
                }
                None
            }
        }
    }

    pub fn attempts(self) -> u32 {
        match self {
            RetryPolicy::Bounded { attempts, .. } => attempts,
            RetryPolicy::None | RetryPolicy::FixedWait(_) => 1,
        }
    }
}

/// Lifecycle of a phase within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    /// Bypassed by a branch or an abort
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_every_phase_has_an_edge() {
        let mut state = RunState::Init;
        let mut phases = Vec::new();
        while let Some(next) = state.successor() {
            phases.extend(Phase::leaving(state));
            state = next;
        }
        assert_eq!(phases, Phase::ALL);
    }

    #[test]
    fn test_bounded_policy_sleeps_between_attempts() {
        let sleeps = RefCell::new(Vec::new());
        let policy = RetryPolicy::Bounded {
            attempts: 3,
            interval: Duration::from_secs(10),
        };

        let result = policy.run(|d| sleeps.borrow_mut().push(d), |_| false);
        assert_eq!(result, None);
        assert_eq!(*sleeps.borrow(), vec![Duration::from_secs(10); 2]);

        sleeps.borrow_mut().clear();
        let result = policy.run(|d| sleeps.borrow_mut().push(d), |n| n == 2);
        assert_eq!(result, Some(2));
        assert_eq!(sleeps.borrow().len(), 1);
    }

    #[test]
    fn test_fixed_wait_and_single_probe() {
        let timings = DeploymentConfig::default();
        let slept = RefCell::new(Duration::ZERO);

        let wait = Phase::ViosWait.retry_policy(&timings);
        assert_eq!(wait.run(|d| *slept.borrow_mut() += d, |_| false), Some(1));
        assert_eq!(*slept.borrow(), Duration::from_secs(180));

        let probe = Phase::ViosProbe.retry_policy(&timings);
        assert_eq!(probe.attempts(), 1);
        assert_eq!(probe.run(|_| panic!("no sleep after the only attempt"), |_| false), None);
    }
}
