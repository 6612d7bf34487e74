//! End-to-end tests: input file to written artifacts, then a deployment run
//! with scripted external tools against the real staging code.

use clabgen::batch::{inventory_path, AnsibleStager, Batch, DeviceGroup};
use clabgen::config::Config;
use clabgen::error::ExecError;
use clabgen::exec::{CommandOutput, FsInventoryProbe, Provisioner, RemoteExecGateway, Sleeper};
use clabgen::orchestrator::{
    DeployTools, DeploymentOrchestrator, GroupMembers, Phase, PhaseStatus, RunSettings, RunState,
};
use clabgen::pipeline::{self, PreparedLab, PLAN_FILE};
use pretty_assertions::assert_eq;
use serde_yaml::Value;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const REFERENCE_INPUT: &str = "\
name: lab1
r1 e0/0 r2 e0/0
r1 e0/1 s1 e0/0
r3 e0/0 s1 e0/1
vr1 0/0 r2 0/1
";

fn prepare_reference() -> (TempDir, PreparedLab) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, REFERENCE_INPUT).unwrap();
    let workdir = dir.path().join("out");

    let lab = pipeline::prepare(&input, &workdir, &Config::default()).unwrap();
    (dir, lab)
}

fn read_yaml(path: &Path) -> Value {
    serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_prepare_writes_descriptor() {
    let (_dir, lab) = prepare_reference();

    assert_eq!(lab.name, "lab1");
    assert_eq!(lab.descriptor_path, lab.workdir.join("lab1.yaml"));

    let descriptor = read_yaml(&lab.descriptor_path);
    assert_eq!(descriptor["name"].as_str(), Some("lab1"));

    let nodes = &descriptor["topology"]["nodes"];
    assert_eq!(nodes["r1"]["kind"].as_str(), Some("cisco_iol"));
    assert_eq!(nodes["r1"]["mgmt-ipv4"].as_str(), Some("172.20.20.11"));
    assert_eq!(nodes["s1"]["type"].as_str(), Some("L2"));
    assert_eq!(nodes["s1"]["mgmt-ipv4"].as_str(), Some("172.20.20.101"));
    assert_eq!(nodes["vr1"]["kind"].as_str(), Some("linux"));
    assert_eq!(nodes["vr1"]["mgmt-ipv4"].as_str(), Some("172.20.20.51"));
    assert_eq!(
        nodes["vr1"]["binds"][0].as_str(),
        Some("config/vr1.cfg:/config/startup-config.cfg")
    );

    let links = descriptor["topology"]["links"].as_sequence().unwrap();
    assert_eq!(links.len(), 4);
    assert_eq!(links[0]["endpoints"][0].as_str(), Some("r1:Ethernet0/0"));
    assert_eq!(links[3]["endpoints"][0].as_str(), Some("vr1:eth0"));
    assert_eq!(links[3]["endpoints"][1].as_str(), Some("r2:Ethernet0/1"));
}

#[test]
fn test_prepare_seeds_vios_startup_config() {
    let (_dir, lab) = prepare_reference();

    let config = lab.workdir.join("config").join("vr1.cfg");
    assert!(config.is_file());
    assert!(!lab.workdir.join("config").join("r1.cfg").exists());
}

#[test]
fn test_prepare_writes_host_vars() {
    let (_dir, lab) = prepare_reference();
    let vars_dir = lab.workdir.join("clab-lab1").join("host_vars");

    let r1 = read_yaml(&vars_dir.join("clab-lab1-r1.yml"));
    let interfaces = r1["interfaces"].as_sequence().unwrap();
    assert_eq!(interfaces.len(), 2);
    assert_eq!(interfaces[0]["name"].as_str(), Some("Ethernet0/1"));
    assert_eq!(interfaces[0]["ip"].as_str(), Some("192.168.1.1/28"));
    assert_eq!(interfaces[0]["connected_to"].as_str(), Some("s1"));
    assert_eq!(interfaces[1]["ip"].as_str(), Some("10.1.2.1/30"));

    let vr1 = read_yaml(&vars_dir.join("clab-lab1-vr1.yml"));
    assert_eq!(vr1["interfaces"][0]["name"].as_str(), Some("eth0"));
    assert_eq!(vr1["interfaces"][0]["ip"].as_str(), Some("10.101.2.1/30"));

    // Switches get a file with no interfaces
    let s1 = read_yaml(&vars_dir.join("clab-lab1-s1.yml"));
    assert!(s1["interfaces"].as_sequence().unwrap().is_empty());
}

#[test]
fn test_prepare_writes_address_plan() {
    let (_dir, lab) = prepare_reference();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(lab.workdir.join(PLAN_FILE)).unwrap()).unwrap();
    let address = |device: &str, index: usize| json["devices"][device][index]["address"].as_str();

    assert_eq!(address("r1", 1), Some("10.1.2.1/30"));
    assert_eq!(address("r2", 0), Some("10.1.2.2/30"));
    assert_eq!(address("r1", 0), Some("192.168.1.1/28"));
    assert_eq!(address("r3", 0), Some("192.168.1.2/28"));
    assert_eq!(address("r2", 1), Some("10.101.2.2/30"));
    assert!(lab.warnings.is_empty());
}

#[test]
fn test_prepare_rejects_unknown_device() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, "name: bad\nr1 e0/0 fw1 e0/0\n").unwrap();

    let result = pipeline::prepare(&input, &dir.path().join("out"), &Config::default());
    assert!(result.is_err());
    assert!(!dir.path().join("out").join("bad.yaml").exists());
}

// ============================================================================
// Deployment with scripted tools
// ============================================================================

/// Writes the inventory containerlab would generate.
struct InventoryWritingProvisioner {
    inventory: PathBuf,
}

impl Provisioner for InventoryWritingProvisioner {
    fn provision(&self, _descriptor: &Path) -> Result<CommandOutput, ExecError> {
        fs::create_dir_all(self.inventory.parent().unwrap()).unwrap();
        fs::write(
            &self.inventory,
            "all:\n  children:\n    cisco_iol:\n      hosts:\n        clab-lab1-r1: {}\n    linux:\n      hosts:\n        clab-lab1-vr1: {}\n",
        )
        .unwrap();
        Ok(CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        })
    }
}

#[derive(Default)]
struct RecordingGateway {
    calls: RefCell<Vec<String>>,
}

impl RemoteExecGateway for RecordingGateway {
    fn probe(&self, group: DeviceGroup) -> Result<CommandOutput, ExecError> {
        self.calls.borrow_mut().push(format!("probe {}", group));
        Ok(CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        })
    }

    fn run_batch(&self, batch: Batch, group: DeviceGroup) -> Result<CommandOutput, ExecError> {
        self.calls.borrow_mut().push(format!("{} {}", batch.name(), group));
        Ok(CommandOutput {
            exit_code: Some(0),
            stdout: "ok: [clab-lab1-r1]".to_string(),
            stderr: String::new(),
        })
    }

    fn command_line(&self, batch: Batch, group: DeviceGroup) -> String {
        format!("ansible-playbook {}", batch.playbook(group))
    }
}

#[derive(Default)]
struct NoSleep {
    total: RefCell<Duration>,
}

impl Sleeper for NoSleep {
    fn sleep(&self, duration: Duration) {
        *self.total.borrow_mut() += duration;
    }
}

#[test]
fn test_deploy_stages_and_configures_both_groups() {
    let (_dir, lab) = prepare_reference();
    let config = Config::default();
    let inventory = inventory_path(&lab.workdir, &lab.name);

    let provisioner = InventoryWritingProvisioner {
        inventory: inventory.clone(),
    };
    let gateway = RecordingGateway::default();
    let sleeper = NoSleep::default();
    let stager = AnsibleStager::new(
        &lab.workdir,
        lab.name.as_str(),
        config.credentials.clone(),
        lab.host_vars.clone(),
    );
    let tools = DeployTools {
        provisioner: &provisioner,
        inventory_probe: &FsInventoryProbe,
        gateway: &gateway,
        stager: &stager,
        sleeper: &sleeper,
    };
    let settings = RunSettings {
        lab: lab.name.clone(),
        descriptor: lab.descriptor_path.clone(),
        inventory: inventory.clone(),
        timings: config.deployment.clone(),
    };

    let report =
        DeploymentOrchestrator::new(tools, settings, GroupMembers::from_plan(&lab.plan)).run();

    assert_eq!(report.final_state, RunState::Done);
    assert!(report.is_clean());
    assert_eq!(report.status(Phase::ViosWait), Some(PhaseStatus::Succeeded));

    assert_eq!(
        *gateway.calls.borrow(),
        vec![
            "probe cisco_iol",
            "loopback cisco_iol",
            "interface_ip cisco_iol",
            "save_config cisco_iol",
            "probe cisco_vios",
            "loopback cisco_vios",
            "interface_ip cisco_vios",
            "save_config cisco_vios",
        ]
    );
    assert_eq!(
        *sleeper.total.borrow(),
        config.deployment.inventory_settle + config.deployment.vios_boot_wait
    );

    // Staging moved the VIOS host and wrote the playbooks next to the descriptor
    let enriched = read_yaml(&inventory);
    let children = &enriched["all"]["children"];
    assert!(children["cisco_vios"]["hosts"].get("clab-lab1-vr1").is_some());
    assert!(children.get("linux").is_none());
    assert!(lab.workdir.join("ansible.cfg").is_file());
    assert!(lab.workdir.join("loopback_vios.yaml").is_file());
    assert!(lab.workdir.join("save_config.yaml").is_file());
}
