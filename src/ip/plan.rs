//! The address plan produced by the allocator.

use ipnetwork::Ipv4Network;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::topology::{DeviceId, Family, InterfaceToken, TopologyWarning};

/// One addressed interface on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceAddress {
    /// Class-specific interface name (`Ethernet0/1`, `eth1`)
    pub interface: String,
    /// Interface token as declared in the input
    pub token: InterfaceToken,
    /// Host address with the subnet prefix length
    pub address: Ipv4Network,
    /// Device on the other end of the link
    pub peer: DeviceId,
}

/// A router attached to a switch block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchMember {
    pub router: DeviceId,
    pub token: InterfaceToken,
    pub address: Ipv4Network,
}

/// The /28 block owned by one switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchSubnet {
    pub switch: DeviceId,
    pub network: Ipv4Network,
    /// Attached routers in allocation order
    pub members: Vec<SwitchMember>,
}

/// One side of an addressed router-router link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairSide {
    pub device: DeviceId,
    pub token: InterfaceToken,
    pub address: Ipv4Network,
}

/// An addressed router-router link; `first` is the first-declared endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterPair {
    pub network: Ipv4Network,
    pub first: PairSide,
    pub second: PairSide,
}

/// Complete per-device address assignment for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressPlan {
    devices: BTreeMap<DeviceId, Vec<InterfaceAddress>>,
    switch_subnets: BTreeMap<DeviceId, SwitchSubnet>,
    router_pairs: Vec<RouterPair>,
    warnings: Vec<TopologyWarning>,
}

impl AddressPlan {
    /// Empty plan listing every device with no interfaces yet.
    pub(crate) fn with_devices<'a>(devices: impl IntoIterator<Item = &'a DeviceId>) -> Self {
        Self {
            devices: devices.into_iter().map(|d| (*d, Vec::new())).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn push_interface(&mut self, device: DeviceId, entry: InterfaceAddress) {
        self.devices.entry(device).or_default().push(entry);
    }

    pub(crate) fn insert_switch_subnet(&mut self, subnet: SwitchSubnet) {
        self.switch_subnets.insert(subnet.switch, subnet);
    }

    pub(crate) fn push_switch_member(&mut self, switch: DeviceId, member: SwitchMember) {
        if let Some(subnet) = self.switch_subnets.get_mut(&switch) {
            subnet.members.push(member);
        }
    }

    pub(crate) fn push_router_pair(&mut self, pair: RouterPair) {
        self.router_pairs.push(pair);
    }

    pub(crate) fn push_warning(&mut self, warning: TopologyWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Ordered interface list of a device, if the device is in the plan.
    pub fn interfaces(&self, device: &DeviceId) -> Option<&[InterfaceAddress]> {
        self.devices.get(device).map(Vec::as_slice)
    }

    /// All devices with their interface lists, ordered by class then ordinal.
    pub fn devices(&self) -> impl Iterator<Item = (&DeviceId, &[InterfaceAddress])> {
        self.devices.iter().map(|(d, ifs)| (d, ifs.as_slice()))
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Devices of one family, in device order.
    pub fn members(&self, family: Family) -> Vec<DeviceId> {
        self.devices
            .keys()
            .filter(|d| d.family() == family)
            .copied()
            .collect()
    }

    pub fn switch_subnets(&self) -> impl Iterator<Item = &SwitchSubnet> {
        self.switch_subnets.values()
    }

    pub fn switch_subnet(&self, switch: &DeviceId) -> Option<&SwitchSubnet> {
        self.switch_subnets.get(switch)
    }

    pub fn router_pairs(&self) -> &[RouterPair] {
        &self.router_pairs
    }

    pub fn warnings(&self) -> &[TopologyWarning] {
        &self.warnings
    }

    /// Total number of addresses in the plan
    pub fn address_count(&self) -> usize {
        self.devices.values().map(Vec::len).sum()
    }

    /// Operator-facing summary: switch groups, then router-router links.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec!["Switch groups:".to_string()];
        for subnet in self.switch_subnets.values() {
            lines.push(format!("  {} group ({}):", subnet.switch, subnet.network));
            let mut members: Vec<&SwitchMember> = subnet.members.iter().collect();
            members.sort_by_key(|m| m.router);
            for member in members {
                lines.push(format!("    {}({}): {}", member.router, member.token, member.address));
            }
        }

        lines.push("Router-Router connections:".to_string());
        for pair in &self.router_pairs {
            lines.push(format!(
                "  {}({}) <-> {}({}): {} - {}",
                pair.first.device,
                pair.first.token,
                pair.second.device,
                pair.second.token,
                pair.first.address,
                pair.second.address
            ));
        }
        lines
    }
}
