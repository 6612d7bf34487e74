//! IP address allocation logic.
//!
//! This file contains the address-plan algorithm: one /28 per switch with
//! attached routers numbered from `.1` in link order, and one /30 per
//! unordered router pair with the first-declared router on `.1`.

use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;

use super::plan::{AddressPlan, InterfaceAddress, PairSide, RouterPair, SwitchMember, SwitchSubnet};
use super::registry::AddressRegistry;
use crate::error::AllocationError;
use crate::topology::{
    render_interface, DeviceClassifier, DeviceId, Endpoint, LinkKind, LinkSet, Topology,
    TopologyWarning,
};

/// Prefix length of a switch block
pub const SWITCH_PREFIX: u8 = 28;
/// Prefix length of a router-router link
pub const ROUTER_PAIR_PREFIX: u8 = 30;
/// Usable hosts in a /28
pub const SWITCH_USABLE_HOSTS: u32 = 14;
/// Highest host number that still fits in the last octet
const MAX_HOST: u32 = 254;

/// Builds an [`AddressPlan`] from link declarations.
#[derive(Debug, Clone, Default)]
pub struct AddressPlanAllocator {
    classifier: DeviceClassifier,
}

impl AddressPlanAllocator {
    pub fn new(classifier: DeviceClassifier) -> Self {
        Self { classifier }
    }

    /// Classify `links` and allocate a plan.
    ///
    /// Fails with [`AllocationError::AmbiguousDeviceName`] if a device name
    /// matches no class.
    pub fn allocate(&self, links: &LinkSet) -> Result<AddressPlan, AllocationError> {
        let topology = Topology::ingest(links, &self.classifier)?;
        self.allocate_topology(&topology)
    }

    /// Allocate a plan for an already classified topology.
    pub fn allocate_topology(&self, topology: &Topology) -> Result<AddressPlan, AllocationError> {
        let mut plan = AddressPlan::with_devices(topology.devices());
        let mut registry = AddressRegistry::new();

        for switch in topology.devices().iter().filter(|d| d.is_switch()) {
            let octet = address_octet(*switch)?;
            plan.insert_switch_subnet(SwitchSubnet {
                switch: *switch,
                network: Ipv4Network::new(Ipv4Addr::new(192, 168, octet, 0), SWITCH_PREFIX)?,
                members: Vec::new(),
            });
        }

        // Switch attachments first, then router pairs, each in link order.
        for link in topology.links() {
            if let LinkKind::RouterSwitch { router, switch } = link.kind() {
                self.assign_switch_host(&mut plan, &mut registry, router, switch)?;
            }
        }

        for (index, link) in topology.links().iter().enumerate() {
            match link.kind() {
                LinkKind::RouterRouter => {
                    self.assign_router_pair(&mut plan, &mut registry, index, link.a, link.b)?;
                }
                LinkKind::SwitchSwitch => {
                    log::debug!(
                        "Link {} <-> {} joins two switches, no address needed",
                        link.a.device,
                        link.b.device
                    );
                }
                LinkKind::RouterSwitch { .. } => {}
            }
        }

        log::info!(
            "Allocated {} addresses across {} devices ({} switch blocks, {} router links)",
            registry.len(),
            plan.device_count(),
            plan.switch_subnets().count(),
            plan.router_pairs().len()
        );

        Ok(plan)
    }

    fn assign_switch_host(
        &self,
        plan: &mut AddressPlan,
        registry: &mut AddressRegistry,
        router: Endpoint,
        switch: Endpoint,
    ) -> Result<(), AllocationError> {
        let octet = address_octet(switch.device)?;
        let host = registry.next_switch_host(switch.device);
        if host > MAX_HOST {
            return Err(AllocationError::HostSpaceExhausted {
                switch: switch.device,
                octet: octet.into(),
            });
        }
        if host > SWITCH_USABLE_HOSTS {
            plan.push_warning(TopologyWarning::HostBlockOverflow {
                switch: switch.device,
                host,
            });
        }

        let ip = Ipv4Addr::new(192, 168, octet, host as u8);
        let address = Ipv4Network::new(ip, SWITCH_PREFIX)?;
        let interface = self.interface_name(plan, router);
        registry.register(ip, &format!("{} {}", router.device, interface))?;

        log::debug!("Assigned {} to {} {} (switch {})", address, router.device, interface, switch.device);

        plan.push_interface(
            router.device,
            InterfaceAddress {
                interface,
                token: router.interface,
                address,
                peer: switch.device,
            },
        );
        plan.push_switch_member(
            switch.device,
            SwitchMember {
                router: router.device,
                token: router.interface,
                address,
            },
        );
        Ok(())
    }

    fn assign_router_pair(
        &self,
        plan: &mut AddressPlan,
        registry: &mut AddressRegistry,
        index: usize,
        first: Endpoint,
        second: Endpoint,
    ) -> Result<(), AllocationError> {
        let a = address_octet(first.device)?;
        let b = address_octet(second.device)?;

        if !registry.claim_router_pair(a.into(), b.into()) {
            plan.push_warning(TopologyWarning::DuplicateRouterPair {
                link_index: index,
                first: first.device,
                second: second.device,
            });
            return Ok(());
        }

        let network = Ipv4Network::new(Ipv4Addr::new(10, a, b, 0), ROUTER_PAIR_PREFIX)?;
        let first_side = self.assign_pair_side(plan, registry, first, second, Ipv4Addr::new(10, a, b, 1))?;
        let second_side = self.assign_pair_side(plan, registry, second, first, Ipv4Addr::new(10, a, b, 2))?;
        plan.push_router_pair(RouterPair {
            network,
            first: first_side,
            second: second_side,
        });
        Ok(())
    }

    fn assign_pair_side(
        &self,
        plan: &mut AddressPlan,
        registry: &mut AddressRegistry,
        endpoint: Endpoint,
        peer: Endpoint,
        ip: Ipv4Addr,
    ) -> Result<PairSide, AllocationError> {
        let address = Ipv4Network::new(ip, ROUTER_PAIR_PREFIX)?;
        let interface = self.interface_name(plan, endpoint);
        registry.register(ip, &format!("{} {}", endpoint.device, interface))?;

        plan.push_interface(
            endpoint.device,
            InterfaceAddress {
                interface,
                token: endpoint.interface,
                address,
                peer: peer.device,
            },
        );
        Ok(PairSide {
            device: endpoint.device,
            token: endpoint.interface,
            address,
        })
    }

    fn interface_name(&self, plan: &mut AddressPlan, endpoint: Endpoint) -> String {
        let rendered = render_interface(endpoint.device, endpoint.interface);
        for warning in rendered.warnings {
            plan.push_warning(warning);
        }
        rendered.name
    }
}

/// Address number of a device as an octet.
fn address_octet(device: DeviceId) -> Result<u8, AllocationError> {
    let value = device.address_number();
    u8::try_from(value).map_err(|_| AllocationError::OrdinalOutOfRange { device, value })
}
