//! Per-class interface naming.

use super::device::{DeviceId, Family};
use super::link::InterfaceToken;
use super::warning::TopologyWarning;

/// An interface name plus any warnings produced while rendering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedInterface {
    pub name: String,
    pub warnings: Vec<TopologyWarning>,
}

/// Render the interface name a device uses for `token`.
///
/// IOL devices keep `Ethernet<slot>/<port>`. VIOS devices use `eth<n>` where
/// `n` is the token with the `0/` slot prefix removed; other slots render as
/// `eth<slot><port>` and raise a warning. VIOS switches fold ports past their
/// cap onto the last usable port.
pub fn render_interface(device: DeviceId, token: InterfaceToken) -> RenderedInterface {
    let mut warnings = Vec::new();

    let name = match device.family() {
        Family::Iol => format!("Ethernet{}/{}", token.slot, token.port),
        Family::Vios => {
            let mut port = token.port;
            if let Some(limit) = device.class.port_limit() {
                let last = limit.saturating_sub(1);
                if port > last {
                    warnings.push(TopologyWarning::PortFolded {
                        device,
                        requested: token,
                        used: last,
                    });
                    port = last;
                }
            }
            if token.slot == 0 {
                format!("eth{}", port)
            } else {
                let rendered = format!("eth{}{}", token.slot, port);
                warnings.push(TopologyWarning::MultiSlotInterface {
                    device,
                    interface: token,
                    rendered: rendered.clone(),
                });
                rendered
            }
        }
    };

    RenderedInterface { name, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> DeviceId {
        name.parse().unwrap()
    }

    #[test]
    fn test_iol_keeps_slot_port() {
        let r = render_interface(id("r1"), InterfaceToken::new(1, 3));
        assert_eq!(r.name, "Ethernet1/3");
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_vios_router_drops_slot_zero() {
        let r = render_interface(id("vr2"), InterfaceToken::new(0, 3));
        assert_eq!(r.name, "eth3");
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_vios_switch_folds_excess_ports() {
        let r = render_interface(id("vs1"), InterfaceToken::new(0, 1));
        assert_eq!(r.name, "eth1");
        assert!(r.warnings.is_empty());

        let r = render_interface(id("vs1"), InterfaceToken::new(0, 3));
        assert_eq!(r.name, "eth1");
        assert_eq!(
            r.warnings,
            vec![TopologyWarning::PortFolded {
                device: id("vs1"),
                requested: InterfaceToken::new(0, 3),
                used: 1,
            }]
        );
    }

    #[test]
    fn test_vios_multi_slot_is_flagged() {
        let r = render_interface(id("vr1"), InterfaceToken::new(1, 2));
        assert_eq!(r.name, "eth12");
        assert_eq!(r.warnings.len(), 1);
        assert!(matches!(r.warnings[0], TopologyWarning::MultiSlotInterface { .. }));
    }
}
