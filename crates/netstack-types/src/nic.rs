//! Network interface identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a network interface within the stack.
///
/// All per-interface state in the NDP control plane is partitioned under
/// this key. Identifiers are assigned by the TCP/IP engine and are never
/// reused for the lifetime of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NicId(u32);

impl NicId {
    /// Creates a NIC id from its raw engine-assigned value.
    pub const fn new(id: u32) -> Self {
        NicId(id)
    }

    /// Returns the raw id value.
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for NicId {
    fn from(id: u32) -> Self {
        NicId(id)
    }
}

impl From<NicId> for u32 {
    fn from(id: NicId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nic_id_roundtrip() {
        let id = NicId::new(7);
        assert_eq!(id.get(), 7);
        assert_eq!(u32::from(id), 7);
        assert_eq!(NicId::from(7), id);
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn test_nic_id_ordering() {
        assert!(NicId::new(1) < NicId::new(2));
    }
}
