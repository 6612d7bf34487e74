//! IP address allocation and management module.
//!
//! This module turns the classified topology into the address plan: a /28
//! block per switch, a /30 per router pair, and a registry that proves every
//! emitted address is unique.

pub mod allocator;
pub mod plan;
pub mod registry;

// Re-export commonly used types
pub use allocator::{AddressPlanAllocator, ROUTER_PAIR_PREFIX, SWITCH_PREFIX, SWITCH_USABLE_HOSTS};
pub use plan::{AddressPlan, InterfaceAddress, PairSide, RouterPair, SwitchMember, SwitchSubnet};
pub use registry::AddressRegistry;
