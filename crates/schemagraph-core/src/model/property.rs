use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::errors::{ensure_id, Result};
use crate::model::metadata::{HasMetadata, MetadataContainer, MetadataFactory};
use crate::value::DataType;

/// Property - a typed attribute identifier
///
/// Graph objects key their values by property instance, so two properties
/// sharing an id (for example in different schemas) are never conflated.
pub struct Property {
    id: String,
    data_type: Option<DataType>,
    metadata: MetadataContainer,
}

impl Property {
    /// Create an untyped property with default metadata
    ///
    /// # Errors
    /// * `InvalidId` - If `id` is empty or whitespace-only
    pub fn new(id: impl Into<String>) -> Result<Rc<Self>> {
        Self::build(id.into(), None, MetadataContainer::default())
    }

    /// Create a property restricted to `data_type`
    ///
    /// # Errors
    /// * `InvalidId` - If `id` is empty or whitespace-only
    pub fn typed(id: impl Into<String>, data_type: DataType) -> Result<Rc<Self>> {
        Self::build(id.into(), Some(data_type), MetadataContainer::default())
    }

    /// Create a property whose per-graph metadata comes from `factory`
    ///
    /// # Errors
    /// * `InvalidId` - If `id` is empty or whitespace-only
    pub fn with_factory(
        id: impl Into<String>,
        data_type: Option<DataType>,
        factory: MetadataFactory,
    ) -> Result<Rc<Self>> {
        Self::build(id.into(), data_type, MetadataContainer::new(factory))
    }

    fn build(
        id: String,
        data_type: Option<DataType>,
        metadata: MetadataContainer,
    ) -> Result<Rc<Self>> {
        ensure_id("property", &id)?;
        Ok(Rc::new(Self {
            id,
            data_type,
            metadata,
        }))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.data_type
    }

    /// Check `value` against the data type; untyped properties accept anything
    pub fn validate(&self, value: &Value) -> bool {
        self.data_type.map_or(true, |t| t.accepts(value))
    }

    pub fn set_factory(&self, factory: MetadataFactory) {
        self.metadata.set_factory(factory);
    }
}

impl HasMetadata for Property {
    fn metadata_container(&self) -> &MetadataContainer {
        &self.metadata
    }

    fn definition_id(&self) -> &str {
        &self.id
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("data_type", &self.data_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SchemaGraphError;
    use crate::model::Metadata;
    use schemagraph_core_types::GraphId;
    use serde_json::json;

    #[test]
    fn test_untyped_accepts_anything() {
        let p = Property::new("note").unwrap();

        assert!(p.data_type().is_none());
        assert!(p.validate(&json!(1)));
        assert!(p.validate(&json!("x")));
    }

    #[test]
    fn test_typed_validates() {
        let p = Property::typed("age", DataType::Integer).unwrap();

        assert!(p.validate(&json!(30)));
        assert!(!p.validate(&json!("thirty")));
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(matches!(
            Property::new(""),
            Err(SchemaGraphError::InvalidId { what: "property", .. })
        ));
    }

    #[test]
    fn test_metadata_is_per_owner() {
        let p = Property::with_factory(
            "age",
            Some(DataType::Integer),
            Rc::new(|_| Metadata::new().with_default(0)),
        )
        .unwrap();
        let g1 = GraphId::new();
        let g2 = GraphId::new();

        let m1 = p.get_metadata(g1);
        assert!(Rc::ptr_eq(&m1, &p.get_metadata(g1)));
        assert!(!Rc::ptr_eq(&m1, &p.get_metadata(g2)));
        assert_eq!(m1.default_value(), Some(&json!(0)));
    }

    #[test]
    fn test_same_id_distinct_instances() {
        let a = Property::new("name").unwrap();
        let b = Property::new("name").unwrap();

        assert_eq!(a.id(), b.id());
        assert!(!Rc::ptr_eq(&a, &b));
    }
}
