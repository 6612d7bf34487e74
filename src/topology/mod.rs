//! Network topology module.
//!
//! This module contains the device model, link declarations, interface
//! naming rules and the classified topology derived from the input links.

pub mod device;
pub mod interface;
pub mod link;
pub mod types;
pub mod warning;

// Re-export key types for easier access
pub use device::{DeviceClass, DeviceClassifier, DeviceId, Family, Role};
pub use interface::{render_interface, RenderedInterface};
pub use link::{Endpoint, EndpointDecl, InterfaceToken, Link, LinkDecl, LinkKind, LinkSet};
pub use types::Topology;
pub use warning::TopologyWarning;
