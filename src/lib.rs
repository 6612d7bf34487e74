//! # clabgen - Containerlab topology generator and Cisco lab bring-up
//!
//! This library turns a flat list of point-to-point links between Cisco lab
//! devices into a deployable containerlab topology, a collision-free IP
//! address plan, and a phased configuration run over ansible.
//!
//! ## Overview
//!
//! Device names carry their class: `r<N>` and `s<N>` are IOL routers and
//! switches, `vr<N>` and `vs<N>` are VIOS routers and switches. From the
//! links alone the crate derives the device set, a /30 for every router
//! pair, a /28 for every switch, the containerlab nodes with their
//! management addresses, and the per-device variables the configuration
//! playbooks consume.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `input`: Link declaration file parser
//! - `topology`: Device classes, links, interface naming and the warning channel
//! - `ip`: Address plan allocation with a uniqueness registry
//! - `clab`: Containerlab descriptor and VIOS startup configs
//! - `batch`: Ansible playbooks, host variables and inventory enrichment
//! - `exec`: Seams to containerlab and ansible, with process implementations
//! - `orchestrator`: Phased deployment state machine and run report
//! - `pipeline`: End-to-end preparation and deployment
//! - `config`, `config_loader`: Optional YAML run configuration
//! - `error`: Typed errors per layer
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use clabgen::{config::Config, pipeline};
//! use std::path::Path;
//!
//! let config = Config::default();
//! let lab = pipeline::prepare(Path::new("input.txt"), Path::new("."), &config)?;
//!
//! for line in lab.plan.summary_lines() {
//!     println!("{}", line);
//! }
//!
//! let report = pipeline::deploy(&lab, &config, false);
//! println!("finished in {}", report.final_state);
//! # Ok::<(), color_eyre::Report>(())
//! ```
//!
//! ## Input Format
//!
//! ```text
//! name: lab1
//! r1 e0/0 r2 e0/0
//! r1 e0/1 s1 e0/0
//! r3 e0/0 s1 e0/1
//! ```
//!
//! yields `10.1.2.1/30` and `10.1.2.2/30` on the r1-r2 link and the
//! `192.168.1.0/28` block for s1 with r1 on `.1` and r3 on `.2`.

pub mod batch;
pub mod clab;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod exec;
pub mod input;
pub mod ip;
pub mod orchestrator;
pub mod pipeline;
pub mod topology;

pub use config::Config;
pub use error::{AllocationError, ClassifyError, DeployError};
pub use ip::{AddressPlan, AddressPlanAllocator};
pub use topology::{DeviceClassifier, DeviceId, LinkSet};
