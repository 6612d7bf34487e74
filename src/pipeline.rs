//! End-to-end lab generation.
//!
//! [`prepare`] turns an input file into every artifact that does not need a
//! running lab: the containerlab descriptor, VIOS startup configs, host
//! variables and `address_plan.json`. [`deploy`] then runs the orchestrator
//! with the process-backed tools.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::batch::{host_vars_for, inventory_path, write_host_vars, AnsibleStager, HostVars};
use crate::clab::{build_descriptor, write_descriptor, write_startup_configs};
use crate::config::Config;
use crate::error::AllocationError;
use crate::exec::{AnsibleGateway, ContainerlabProvisioner, FsInventoryProbe, ThreadSleeper};
use crate::input::parse_input_file;
use crate::ip::{AddressPlan, AddressPlanAllocator};
use crate::orchestrator::{DeployTools, DeploymentOrchestrator, GroupMembers, RunReport, RunSettings};
use crate::topology::{DeviceClassifier, DeviceId, Topology, TopologyWarning};

/// File name of the serialized address plan
pub const PLAN_FILE: &str = "address_plan.json";
/// File name of the deployment report
pub const REPORT_FILE: &str = "deploy_report.json";

/// Everything generated for one lab before deployment.
#[derive(Debug, Clone)]
pub struct PreparedLab {
    pub name: String,
    pub workdir: PathBuf,
    pub topology: Topology,
    pub plan: AddressPlan,
    pub descriptor_path: PathBuf,
    pub host_vars: BTreeMap<DeviceId, HostVars>,
    /// Warnings from both the allocator and the descriptor builder
    pub warnings: Vec<TopologyWarning>,
}

impl PreparedLab {
    /// Inventory path relative to the working directory.
    pub fn relative_inventory(&self) -> PathBuf {
        inventory_path(Path::new(""), &self.name)
    }

    pub fn inventory(&self) -> PathBuf {
        inventory_path(&self.workdir, &self.name)
    }
}

/// Parse, allocate and write all pre-deployment artifacts into `workdir`.
pub fn prepare(input: &Path, workdir: &Path, config: &Config) -> Result<PreparedLab> {
    let lab = parse_input_file(input)
        .wrap_err_with(|| format!("Failed to parse input file {:?}", input))?;

    let classifier = DeviceClassifier;
    let topology = Topology::ingest(&lab.links, &classifier)
        .map_err(AllocationError::from)
        .wrap_err("Failed to classify devices")?;

    let plan = AddressPlanAllocator::new(classifier)
        .allocate_topology(&topology)
        .wrap_err("Failed to allocate the address plan")?;

    info!("Interface addresses to be configured:");
    for line in plan.summary_lines() {
        info!("{}", line);
    }

    std::fs::create_dir_all(workdir)
        .wrap_err_with(|| format!("Failed to create output directory {:?}", workdir))?;

    let descriptor = build_descriptor(&lab.name, &topology, config)
        .wrap_err("Failed to build the containerlab topology")?;
    let descriptor_path = workdir.join(format!("{}.yaml", lab.name));
    write_descriptor(&descriptor_path, &descriptor.topology)?;

    write_startup_configs(workdir, &topology, &config.credentials)
        .wrap_err("Failed to write VIOS startup configs")?;

    let host_vars = host_vars_for(&plan);
    write_host_vars(workdir, &lab.name, &host_vars).wrap_err("Failed to write host_vars")?;

    let plan_path = workdir.join(PLAN_FILE);
    let json = serde_json::to_string_pretty(&plan).wrap_err("Failed to serialize address plan")?;
    std::fs::write(&plan_path, json)
        .wrap_err_with(|| format!("Failed to write address plan {:?}", plan_path))?;
    info!("Wrote address plan to {:?}", plan_path);

    let mut warnings = plan.warnings().to_vec();
    warnings.extend(descriptor.warnings);

    Ok(PreparedLab {
        name: lab.name,
        workdir: workdir.to_path_buf(),
        topology,
        plan,
        descriptor_path,
        host_vars,
        warnings,
    })
}

/// Deploy a prepared lab with containerlab and ansible.
pub fn deploy(lab: &PreparedLab, config: &Config, reconfigure: bool) -> RunReport {
    let provisioner = ContainerlabProvisioner::new(config.tools.containerlab.as_str(), reconfigure);
    let gateway = AnsibleGateway::new(
        config.tools.ansible.as_str(),
        config.tools.ansible_playbook.as_str(),
        &lab.workdir,
        lab.relative_inventory(),
    );
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
        sleeper: &ThreadSleeper,
    };
    let settings = RunSettings {
        lab: lab.name.clone(),
        descriptor: lab.descriptor_path.clone(),
        inventory: lab.inventory(),
        timings: config.deployment.clone(),
    };

    DeploymentOrchestrator::new(tools, settings, GroupMembers::from_plan(&lab.plan)).run()
}
