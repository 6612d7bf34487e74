//! Containerlab topology file types.
//!
//! These structures serialize to the `<lab>.yaml` file consumed by
//! `containerlab deploy -t`.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::topology::DeviceId;

/// Root of a containerlab topology file.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClabTopology {
    /// Lab name; containerlab prefixes every container with `clab-<name>-`
    pub name: String,
    pub topology: ClabSpec,
}

/// The `topology:` section.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClabSpec {
    /// Nodes ordered by device class, then ordinal
    pub nodes: BTreeMap<DeviceId, ClabNode>,
    /// Links in declaration order
    pub links: Vec<ClabLink>,
}

/// A single lab node.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClabNode {
    /// Containerlab node kind (`cisco_iol`, `linux`)
    pub kind: String,
    /// Container image
    pub image: String,
    /// Node type, `L2` for switches
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    /// Host bind mounts (`host:container`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub binds: Vec<String>,
    /// Container environment
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Static management address
    #[serde(rename = "mgmt-ipv4")]
    pub mgmt_ipv4: String,
}

/// A link between two node interfaces.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClabLink {
    /// Exactly two `node:interface` strings
    pub endpoints: [String; 2],
}
