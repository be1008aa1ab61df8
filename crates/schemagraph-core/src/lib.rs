//! SchemaGraph Core - metadata resolution engine for schema-governed graphs
//!
//! Nodes and edges of a graph carry categories and typed property values.
//! Categories and properties are shared definitions registered in a schema
//! tree; how they behave (default value, validation, mutability,
//! removability, sharability) is recorded per owning graph as metadata.
//!
//! This crate provides:
//! - Per-owner metadata containers for categories and properties
//! - Single-parent category inheritance with iterative chain walks
//! - Schema trees with self-first, depth-first lookup
//! - Graph objects resolving values through stored value, category chain
//!   and property defaults
//! - Cross-graph category and property merges that localize metadata in
//!   the destination graph
//!
//! Everything is single-threaded: definitions are shared with `Rc` and
//! mutated through interior mutability. Callers sharing a graph across
//! threads must provide their own mutual exclusion.

pub mod errors;
pub mod events;
pub mod graph;
pub mod logging_facility;
pub mod model;
pub mod object;
pub mod schema;
pub mod value;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, SchemaGraphError};
pub use events::{ObjectEvent, SchemaEvent, SubscriptionId};
pub use graph::Graph;
pub use model::{Category, HasMetadata, Metadata, MetadataFactory, Property};
pub use object::{CategoryRef, CategorySet, GraphObject, MatchMode};
pub use schema::{Schema, SchemaRef};
pub use schemagraph_core_types::{GraphId, ObjectId};
pub use value::{DataType, Value};
