//! Warning channel for lossy but accepted topology constructs.

use serde::Serialize;
use std::fmt;

use super::device::DeviceId;
use super::link::InterfaceToken;

/// Something in the input was accepted but not represented faithfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologyWarning {
    /// A second link between the same pair of routers; it gets no address.
    DuplicateRouterPair {
        link_index: usize,
        first: DeviceId,
        second: DeviceId,
    },
    /// A VIOS switch port beyond the cap was folded onto the last port.
    PortFolded {
        device: DeviceId,
        requested: InterfaceToken,
        used: u8,
    },
    /// A VIOS interface on a non-zero slot; `eth` naming assumes slot 0.
    MultiSlotInterface {
        device: DeviceId,
        interface: InterfaceToken,
        rendered: String,
    },
    /// More routers attached to a switch than its /28 has usable hosts.
    HostBlockOverflow { switch: DeviceId, host: u32 },
}

impl fmt::Display for TopologyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyWarning::DuplicateRouterPair {
                link_index,
                first,
                second,
            } => write!(
                f,
                "link #{} between {} and {} reuses an addressed router pair; no address assigned",
                link_index + 1,
                first,
                second
            ),
            TopologyWarning::PortFolded {
                device,
                requested,
                used,
            } => write!(
                f,
                "{} has only {} usable ports; interface {} folded onto eth{}",
                device,
                device.class.port_limit().unwrap_or(0),
                requested,
                used
            ),
            TopologyWarning::MultiSlotInterface {
                device,
                interface,
                rendered,
            } => write!(
                f,
                "{} interface {} is not on slot 0; rendered as {}",
                device, interface, rendered
            ),
            TopologyWarning::HostBlockOverflow { switch, host } => write!(
                f,
                "switch {} block is full; host .{} lies outside its /28",
                switch, host
            ),
        }
    }
}
