//! Device classes and name classification.
//!
//! A device is identified purely by its name: a class prefix followed by a
//! numeric ordinal (`r1`, `s4`, `vr2`, `vs1`). The name is parsed once into a
//! [`DeviceId`] and every later stage works on the typed value.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ClassifyError;

/// Boot/management family of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Fast-booting IOL containers with `Ethernet<slot>/<port>` naming
    Iol,
    /// Slow-booting VIOS virtual machines with `eth<n>` naming
    Vios,
}

/// Routed or switched role of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Router,
    Switch,
}

/// The four supported device classes.
///
/// Declaration order is the ordering used for nodes in the descriptor and
/// for the keys of the address plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceClass {
    RouterIol,
    SwitchIol,
    RouterVios,
    SwitchVios,
}

impl DeviceClass {
    /// Name prefix of the class
    pub fn prefix(self) -> &'static str {
        match self {
            DeviceClass::RouterIol => "r",
            DeviceClass::SwitchIol => "s",
            DeviceClass::RouterVios => "vr",
            DeviceClass::SwitchVios => "vs",
        }
    }

    pub fn family(self) -> Family {
        match self {
            DeviceClass::RouterIol | DeviceClass::SwitchIol => Family::Iol,
            DeviceClass::RouterVios | DeviceClass::SwitchVios => Family::Vios,
        }
    }

    pub fn role(self) -> Role {
        match self {
            DeviceClass::RouterIol | DeviceClass::RouterVios => Role::Router,
            DeviceClass::SwitchIol | DeviceClass::SwitchVios => Role::Switch,
        }
    }

    pub fn is_router(self) -> bool {
        self.role() == Role::Router
    }

    pub fn is_switch(self) -> bool {
        self.role() == Role::Switch
    }

    /// Offset added to the ordinal when it is used as an address octet, so
    /// that VIOS devices never share an octet with their IOL counterparts.
    pub fn ordinal_offset(self) -> u32 {
        match self.family() {
            Family::Iol => 0,
            Family::Vios => 100,
        }
    }

    /// Host offset of the management address inside the management network.
    pub fn management_offset(self) -> u32 {
        match self {
            DeviceClass::RouterIol => 10,
            DeviceClass::RouterVios => 50,
            DeviceClass::SwitchIol => 100,
            DeviceClass::SwitchVios => 150,
        }
    }

    /// Number of usable data ports, if the class is capped.
    ///
    /// VIOS L2 images only expose two data-plane ports in containerlab.
    pub fn port_limit(self) -> Option<u8> {
        match self {
            DeviceClass::SwitchVios => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceClass::RouterIol => "router-iol",
            DeviceClass::SwitchIol => "switch-iol",
            DeviceClass::RouterVios => "router-vios",
            DeviceClass::SwitchVios => "switch-vios",
        };
        f.write_str(name)
    }
}

/// Typed device identity: class plus ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId {
    pub class: DeviceClass,
    pub ordinal: u32,
}

impl DeviceId {
    pub fn new(class: DeviceClass, ordinal: u32) -> Self {
        Self { class, ordinal }
    }

    pub fn family(&self) -> Family {
        self.class.family()
    }

    pub fn is_router(&self) -> bool {
        self.class.is_router()
    }

    pub fn is_switch(&self) -> bool {
        self.class.is_switch()
    }

    /// Ordinal with the family offset applied, as used in address octets.
    pub fn address_number(&self) -> u32 {
        self.ordinal.saturating_add(self.class.ordinal_offset())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class.prefix(), self.ordinal)
    }
}

impl FromStr for DeviceId {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceClassifier.classify(s)
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Prefix table, longest prefix first so `vr`/`vs` win over `r`/`s`.
const PREFIXES: [(&str, DeviceClass); 4] = [
    ("vr", DeviceClass::RouterVios),
    ("vs", DeviceClass::SwitchVios),
    ("r", DeviceClass::RouterIol),
    ("s", DeviceClass::SwitchIol),
];

/// Maps device names to their class and ordinal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceClassifier;

impl DeviceClassifier {
    /// Classify a device name.
    ///
    /// Fails with [`ClassifyError::UnknownDeviceClass`] when no prefix matches
    /// or the remainder is not a non-negative integer.
    pub fn classify(&self, name: &str) -> Result<DeviceId, ClassifyError> {
        let unknown = || ClassifyError::UnknownDeviceClass {
            name: name.to_string(),
        };

        let (class, suffix) = PREFIXES
            .iter()
            .find_map(|(prefix, class)| name.strip_prefix(prefix).map(|rest| (*class, rest)))
            .ok_or_else(unknown)?;

        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(unknown());
        }
        let ordinal = suffix.parse::<u32>().map_err(|_| unknown())?;

        Ok(DeviceId::new(class, ordinal))
    }
}
