use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// Stable node identity. The same logical node at the same path hashes to
/// the same id in every snapshot, which is what expand-state memoization
/// relies on. Nodes under different parents never share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn derive(tag: &str, key: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(tag.as_bytes());
        hasher.update(&[0]);
        hasher.update(key.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.as_bytes()[..8]);
        Self(u64::from_le_bytes(bytes))
    }

    /// Identity of a node with content key `key` placed under `parent`.
    pub fn scoped(parent: NodeId, key: NodeId) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&parent.0.to_le_bytes());
        hasher.update(&key.0.to_le_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.as_bytes()[..8]);
        Self(u64::from_le_bytes(bytes))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_ids_are_stable_and_tag_scoped() {
        assert_eq!(NodeId::derive("type", "System.Int32"), NodeId::derive("type", "System.Int32"));
        assert_ne!(NodeId::derive("type", "System"), NodeId::derive("namespace", "System"));
    }

    #[test]
    fn scoped_ids_depend_on_the_parent() {
        let key = NodeId::derive("type", "System.Int32");
        let left = NodeId::derive("namespace", "System");
        let right = NodeId::derive("trigger", "Search all types");
        assert_eq!(NodeId::scoped(left, key), NodeId::scoped(left, key));
        assert_ne!(NodeId::scoped(left, key), NodeId::scoped(right, key));
        assert_ne!(NodeId::scoped(left, key), key);
    }
}
