//! Link declarations.
//!
//! A [`LinkSet`] holds links exactly as declared (device names as strings).
//! Ingestion into a [`Topology`](super::Topology) classifies every endpoint
//! once and produces typed [`Link`]s.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::device::DeviceId;

static INTERFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]*(\d{1,3})/(\d{1,3})$").expect("static regex"));

/// A `<slot>/<port>` interface token as written in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceToken {
    pub slot: u8,
    pub port: u8,
}

impl InterfaceToken {
    pub fn new(slot: u8, port: u8) -> Self {
        Self { slot, port }
    }
}

/// Error returned when an interface token cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid interface token '{0}'")]
pub struct InterfaceTokenError(pub String);

impl FromStr for InterfaceToken {
    type Err = InterfaceTokenError;

    /// Accepts `0/1`, `e0/1`, `Et0/1` or `Ethernet0/1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InterfaceTokenError(s.to_string());
        let caps = INTERFACE_RE.captures(s.trim()).ok_or_else(invalid)?;
        let slot = caps[1].parse::<u8>().map_err(|_| invalid())?;
        let port = caps[2].parse::<u8>().map_err(|_| invalid())?;
        Ok(Self { slot, port })
    }
}

impl fmt::Display for InterfaceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.slot, self.port)
    }
}

impl Serialize for InterfaceToken {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One side of a declared link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDecl {
    pub device: String,
    pub interface: InterfaceToken,
}

/// A link as declared in the input, endpoints in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDecl {
    pub a: EndpointDecl,
    pub b: EndpointDecl,
}

impl LinkDecl {
    pub fn new(
        device_a: impl Into<String>,
        interface_a: InterfaceToken,
        device_b: impl Into<String>,
        interface_b: InterfaceToken,
    ) -> Self {
        Self {
            a: EndpointDecl {
                device: device_a.into(),
                interface: interface_a,
            },
            b: EndpointDecl {
                device: device_b.into(),
                interface: interface_b,
            },
        }
    }
}

/// Ordered, immutable collection of declared links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    links: Vec<LinkDecl>,
}

impl LinkSet {
    pub fn new(links: Vec<LinkDecl>) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &[LinkDecl] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LinkDecl> {
        self.links.iter()
    }
}

impl FromIterator<LinkDecl> for LinkSet {
    fn from_iter<I: IntoIterator<Item = LinkDecl>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// One side of a classified link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub device: DeviceId,
    pub interface: InterfaceToken,
}

/// A classified link. `a` is always the first-declared endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub a: Endpoint,
    pub b: Endpoint,
}

/// How a link is treated by the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    RouterRouter,
    /// Router endpoint and switch endpoint, in that order
    RouterSwitch { router: Endpoint, switch: Endpoint },
    SwitchSwitch,
}

impl Link {
    pub fn kind(&self) -> LinkKind {
        match (self.a.device.is_router(), self.b.device.is_router()) {
            (true, true) => LinkKind::RouterRouter,
            (true, false) => LinkKind::RouterSwitch {
                router: self.a,
                switch: self.b,
            },
            (false, true) => LinkKind::RouterSwitch {
                router: self.b,
                switch: self.a,
            },
            (false, false) => LinkKind::SwitchSwitch,
        }
    }
}
