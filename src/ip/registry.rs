//! IP address registry.
//!
//! This file tracks every address handed out during one allocation run so
//! that uniqueness is checked rather than assumed, plus the per-switch host
//! cursors and the set of consumed router-pair keys.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

use crate::error::AllocationError;
use crate::topology::DeviceId;

/// Registry of allocated addresses for a single plan.
#[derive(Debug, Default)]
pub struct AddressRegistry {
    /// Address -> owner description (`r1 Ethernet0/0`)
    assigned: HashMap<Ipv4Addr, String>,
    /// Unordered router-pair keys already given a /30
    router_pairs: HashSet<(u32, u32)>,
    /// Last host number handed out per switch block
    switch_cursors: HashMap<DeviceId, u32>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `address` as owned by `owner`.
    ///
    /// Registering an address that is already owned is an error, even for the
    /// same owner: an interface never receives two addresses from one plan.
    pub fn register(&mut self, address: Ipv4Addr, owner: &str) -> Result<(), AllocationError> {
        if let Some(existing) = self.assigned.get(&address) {
            return Err(AllocationError::AddressConflict {
                address,
                owner: existing.clone(),
                claimant: owner.to_string(),
            });
        }
        self.assigned.insert(address, owner.to_string());
        Ok(())
    }

    /// Claim the /30 for the unordered pair `(a, b)`.
    ///
    /// Returns `false` if the pair was already claimed.
    pub fn claim_router_pair(&mut self, a: u32, b: u32) -> bool {
        self.router_pairs.insert((a.min(b), a.max(b)))
    }

    /// Next host number in a switch block, starting at 1.
    pub fn next_switch_host(&mut self, switch: DeviceId) -> u32 {
        let cursor = self.switch_cursors.entry(switch).or_insert(0);
        *cursor += 1;
        *cursor
    }

    /// Number of addresses registered so far
    pub fn len(&self) -> usize {
        self.assigned.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = AddressRegistry::new();
        let ip = Ipv4Addr::new(10, 1, 2, 1);
        registry.register(ip, "r1 Ethernet0/0").unwrap();

        let err = registry.register(ip, "r3 Ethernet0/1").unwrap_err();
        assert!(matches!(
            err,
            AllocationError::AddressConflict { ref owner, ref claimant, .. }
                if owner == "r1 Ethernet0/0" && claimant == "r3 Ethernet0/1"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_router_pairs_are_unordered() {
        let mut registry = AddressRegistry::new();
        assert!(registry.claim_router_pair(1, 2));
        assert!(!registry.claim_router_pair(2, 1));
        assert!(!registry.claim_router_pair(1, 2));
        assert!(registry.claim_router_pair(1, 3));
    }

    #[test]
    fn test_switch_cursors_are_per_switch() {
        let mut registry = AddressRegistry::new();
        let s1: DeviceId = "s1".parse().unwrap();
        let s2: DeviceId = "s2".parse().unwrap();
        assert_eq!(registry.next_switch_host(s1), 1);
        assert_eq!(registry.next_switch_host(s1), 2);
        assert_eq!(registry.next_switch_host(s2), 1);
        assert_eq!(registry.next_switch_host(s1), 3);
    }
}
