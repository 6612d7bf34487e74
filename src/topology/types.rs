//! Classified topology.
//!
//! Devices are never declared on their own: the device set is derived from
//! the links once, at ingestion, and kept alongside them.

use std::collections::BTreeSet;

use super::device::{DeviceClassifier, DeviceId, Family};
use super::link::{Endpoint, EndpointDecl, Link, LinkSet};
use crate::error::ClassifyError;

/// Links with classified endpoints plus the derived device set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    links: Vec<Link>,
    devices: BTreeSet<DeviceId>,
}

impl Topology {
    /// Classify every endpoint of `links`.
    ///
    /// Fails on the first name the classifier rejects.
    pub fn ingest(links: &LinkSet, classifier: &DeviceClassifier) -> Result<Self, ClassifyError> {
        let classify = |decl: &EndpointDecl| -> Result<Endpoint, ClassifyError> {
            Ok(Endpoint {
                device: classifier.classify(&decl.device)?,
                interface: decl.interface,
            })
        };

        let links = links
            .iter()
            .map(|decl| {
                Ok(Link {
                    a: classify(&decl.a)?,
                    b: classify(&decl.b)?,
                })
            })
            .collect::<Result<Vec<_>, ClassifyError>>()?;

        let devices = links
            .iter()
            .flat_map(|link| [link.a.device, link.b.device])
            .collect();

        Ok(Self { links, devices })
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// All devices referenced by at least one link, ordered by class then ordinal.
    pub fn devices(&self) -> &BTreeSet<DeviceId> {
        &self.devices
    }

    /// Devices of one family, in device order.
    pub fn members(&self, family: Family) -> Vec<DeviceId> {
        self.devices
            .iter()
            .filter(|d| d.family() == family)
            .copied()
            .collect()
    }

    pub fn has_family(&self, family: Family) -> bool {
        self.devices.iter().any(|d| d.family() == family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::link::{InterfaceToken, LinkDecl};

    fn decl(a: &str, b: &str) -> LinkDecl {
        LinkDecl::new(a, InterfaceToken::new(0, 0), b, InterfaceToken::new(0, 1))
    }

    #[test]
    fn test_ingest_derives_device_set() {
        let links: LinkSet = vec![decl("r1", "r2"), decl("r2", "vs1"), decl("r1", "r2")]
            .into_iter()
            .collect();
        let topo = Topology::ingest(&links, &DeviceClassifier).unwrap();

        let names: Vec<String> = topo.devices().iter().map(|d| d.to_string()).collect();
        assert_eq!(names, vec!["r1", "r2", "vs1"]);
        assert_eq!(topo.links().len(), 3);
        assert!(topo.has_family(Family::Vios));
        assert_eq!(topo.members(Family::Iol).len(), 2);
    }

    #[test]
    fn test_ingest_rejects_unknown_device() {
        let links: LinkSet = vec![decl("r1", "fw1")].into_iter().collect();
        let err = Topology::ingest(&links, &DeviceClassifier).unwrap_err();
        assert_eq!(err, ClassifyError::UnknownDeviceClass { name: "fw1".into() });
    }

    #[test]
    fn test_empty_link_set_has_no_devices() {
        let topo = Topology::ingest(&LinkSet::default(), &DeviceClassifier).unwrap();
        assert!(topo.devices().is_empty());
        assert!(!topo.has_family(Family::Iol));
    }
}
