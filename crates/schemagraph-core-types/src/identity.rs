//! Identity types for graphs and graph objects
//!
//! Graph identity is what per-owner metadata is keyed by: two graphs never
//! share an id even when they are structurally identical.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a graph instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphId(Uuid);

impl GraphId {
    /// Generate a new GraphId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a graph object (node or edge carrier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Generate a new ObjectId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_id_generation() {
        let id1 = GraphId::new();
        let id2 = GraphId::new();

        assert_ne!(id1, id2);
    }

    #[test]
    fn test_graph_id_display() {
        let id = GraphId::new();
        assert_eq!(format!("{}", id), id.as_uuid().to_string());
    }

    #[test]
    fn test_object_id_generation() {
        let id1 = ObjectId::new();
        let id2 = ObjectId::new();

        assert_ne!(id1, id2);
        assert!(!id1.to_string().is_empty());
    }

    #[test]
    fn test_serialization() {
        let id = GraphId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: GraphId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
