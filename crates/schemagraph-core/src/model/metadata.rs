use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use schemagraph_core_types::GraphId;
use serde_json::Value;

/// Value predicate attached to metadata
pub type Validator = Rc<dyn Fn(&Value) -> bool>;

/// Builds the metadata for one owner
///
/// Called with `Some(graph)` the first time a graph asks for metadata, and
/// with `None` whenever an ownerless default is needed.
pub type MetadataFactory = Rc<dyn Fn(Option<GraphId>) -> Metadata>;

/// How a category or property behaves for one owning graph
///
/// Category metadata may additionally own property entries: a category
/// that owns a property supplies that property's default for every object
/// carrying the category (or a category based on it).
#[derive(Clone)]
pub struct Metadata {
    default_value: Option<Value>,
    validator: Option<Validator>,
    immutable: bool,
    removable: bool,
    sharable: bool,
    owned_properties: BTreeMap<String, Metadata>,
}

impl Metadata {
    /// Removable, mutable and sharable, with no default and no validator
    pub fn new() -> Self {
        Self {
            default_value: None,
            validator: None,
            immutable: false,
            removable: true,
            sharable: true,
            owned_properties: BTreeMap::new(),
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default_value = (!value.is_null()).then_some(value);
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Value) -> bool + 'static,
    {
        self.validator = Some(Rc::new(validator));
        self
    }

    /// Stored values may be written once but never overwritten
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn removable(mut self, removable: bool) -> Self {
        self.removable = removable;
        self
    }

    pub fn sharable(mut self, sharable: bool) -> Self {
        self.sharable = sharable;
        self
    }

    /// Declare that this (category) metadata owns `property_id`
    pub fn owning(mut self, property_id: impl Into<String>, metadata: Metadata) -> Self {
        self.owned_properties.insert(property_id.into(), metadata);
        self
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    pub fn is_removable(&self) -> bool {
        self.removable
    }

    pub fn is_sharable(&self) -> bool {
        self.sharable
    }

    /// Run the validator; metadata without one accepts every value
    pub fn validate(&self, value: &Value) -> bool {
        self.validator.as_ref().map_or(true, |validate| validate(value))
    }

    /// Sub-metadata for a property this metadata owns
    pub fn owned_property(&self, property_id: &str) -> Option<&Metadata> {
        self.owned_properties.get(property_id)
    }

    pub fn owned_property_ids(&self) -> impl Iterator<Item = &str> {
        self.owned_properties.keys().map(String::as_str)
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("default_value", &self.default_value)
            .field("has_validator", &self.validator.is_some())
            .field("immutable", &self.immutable)
            .field("removable", &self.removable)
            .field("sharable", &self.sharable)
            .field("owned_properties", &self.owned_properties)
            .finish()
    }
}

/// Per-owner metadata cache shared by categories and properties
///
/// Entries are keyed by graph identity and created lazily through the
/// factory. There is no eviction: an entry lives as long as the container.
pub struct MetadataContainer {
    factory: RefCell<MetadataFactory>,
    by_owner: RefCell<HashMap<GraphId, Rc<Metadata>>>,
}

impl MetadataContainer {
    pub fn new(factory: MetadataFactory) -> Self {
        Self {
            factory: RefCell::new(factory),
            by_owner: RefCell::new(HashMap::new()),
        }
    }

    /// Metadata for `owner`, created through the factory on first request
    pub fn get_metadata(&self, owner: GraphId) -> Rc<Metadata> {
        if let Some(existing) = self.peek(owner) {
            return existing;
        }
        // No borrow is held while the factory runs.
        let factory = self.factory.borrow().clone();
        let created = Rc::new(factory(Some(owner)));
        self.by_owner
            .borrow_mut()
            .entry(owner)
            .or_insert(created)
            .clone()
    }

    /// A fresh ownerless metadata from the same factory; never cached
    pub fn create_default_metadata(&self) -> Rc<Metadata> {
        let factory = self.factory.borrow().clone();
        Rc::new(factory(None))
    }

    /// Cached metadata for `owner`, without creating it
    pub fn peek(&self, owner: GraphId) -> Option<Rc<Metadata>> {
        self.by_owner.borrow().get(&owner).cloned()
    }

    pub fn has_metadata(&self, owner: GraphId) -> bool {
        self.by_owner.borrow().contains_key(&owner)
    }

    /// Install `metadata` for `owner` unless an entry already exists.
    /// Returns whichever entry is cached afterwards.
    pub(crate) fn adopt(&self, owner: GraphId, metadata: Metadata) -> Rc<Metadata> {
        self.by_owner
            .borrow_mut()
            .entry(owner)
            .or_insert_with(|| Rc::new(metadata))
            .clone()
    }

    /// Re-run the factory for `owner`, replacing any cached entry
    pub fn reset_metadata(&self, owner: GraphId) -> Rc<Metadata> {
        let factory = self.factory.borrow().clone();
        let created = Rc::new(factory(Some(owner)));
        self.by_owner.borrow_mut().insert(owner, created.clone());
        created
    }

    /// Replace the factory; only metadata created afterwards is affected
    pub fn set_factory(&self, factory: MetadataFactory) {
        *self.factory.borrow_mut() = factory;
    }

    /// Number of owners with cached metadata
    pub fn owner_count(&self) -> usize {
        self.by_owner.borrow().len()
    }
}

impl Default for MetadataContainer {
    fn default() -> Self {
        Self::new(Rc::new(|_| Metadata::new()))
    }
}

impl fmt::Debug for MetadataContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataContainer")
            .field("owner_count", &self.owner_count())
            .finish()
    }
}

/// A shared definition (category or property) carrying per-owner metadata
pub trait HasMetadata {
    fn metadata_container(&self) -> &MetadataContainer;

    /// Id of the definition, used in log fields
    fn definition_id(&self) -> &str;

    fn get_metadata(&self, owner: GraphId) -> Rc<Metadata> {
        self.metadata_container().get_metadata(owner)
    }

    fn create_default_metadata(&self) -> Rc<Metadata> {
        self.metadata_container().create_default_metadata()
    }

    /// Owner-scoped metadata, or the ownerless default for detached objects
    fn metadata_for(&self, owner: Option<GraphId>) -> Rc<Metadata> {
        match owner {
            Some(owner) => self.get_metadata(owner),
            None => self.create_default_metadata(),
        }
    }
}
