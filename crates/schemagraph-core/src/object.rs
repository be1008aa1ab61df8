//! Graph object - the mutable carrier behind a node or an edge
//!
//! An object holds a set of categories and a map from property to value.
//! Reading a property resolves, in order:
//!
//! 1. the object's own stored value;
//! 2. the default supplied by the first category (object categories in
//!    order, each walked up its `based_on` chain) whose metadata owns the
//!    property;
//! 3. the property's own default for the object's owner, or its ownerless
//!    default when the object is detached.
//!
//! Rejected writes and deletes are silent: they return `false`, leave the
//! object unchanged and raise no event.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use schemagraph_core_types::{GraphId, ObjectId};
use serde_json::Value;

use crate::events::{ObjectEvent, SubscriptionId, Subscribers};
use crate::graph::Graph;
use crate::model::{Category, HasMetadata, Metadata, Property};
use crate::schema::Schema;
use crate::value::is_unset;
use crate::{log_op_end, log_op_start};

/// A category given either by instance or by id
#[derive(Debug, Clone)]
pub enum CategoryRef {
    Instance(Rc<Category>),
    Id(String),
}

impl CategoryRef {
    fn matches(&self, category: &Category) -> bool {
        match self {
            CategoryRef::Instance(c) => std::ptr::eq(&**c, category),
            CategoryRef::Id(id) => category.id() == id,
        }
    }
}

impl From<Rc<Category>> for CategoryRef {
    fn from(category: Rc<Category>) -> Self {
        CategoryRef::Instance(category)
    }
}

impl From<&Rc<Category>> for CategoryRef {
    fn from(category: &Rc<Category>) -> Self {
        CategoryRef::Instance(category.clone())
    }
}

impl From<&str> for CategoryRef {
    fn from(id: &str) -> Self {
        CategoryRef::Id(id.to_string())
    }
}

impl From<String> for CategoryRef {
    fn from(id: String) -> Self {
        CategoryRef::Id(id)
    }
}

/// One or more categories to test an object against
#[derive(Debug, Clone, Default)]
pub struct CategorySet(Vec<CategoryRef>);

impl CategorySet {
    pub fn refs(&self) -> &[CategoryRef] {
        &self.0
    }
}

impl From<CategoryRef> for CategorySet {
    fn from(category: CategoryRef) -> Self {
        CategorySet(vec![category])
    }
}

impl From<Rc<Category>> for CategorySet {
    fn from(category: Rc<Category>) -> Self {
        CategorySet(vec![category.into()])
    }
}

impl From<&Rc<Category>> for CategorySet {
    fn from(category: &Rc<Category>) -> Self {
        CategorySet(vec![category.into()])
    }
}

impl From<&str> for CategorySet {
    fn from(id: &str) -> Self {
        CategorySet(vec![id.into()])
    }
}

impl From<String> for CategorySet {
    fn from(id: String) -> Self {
        CategorySet(vec![id.into()])
    }
}

impl<T: Into<CategoryRef>> From<Vec<T>> for CategorySet {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T: Into<CategoryRef>, const N: usize> From<[T; N]> for CategorySet {
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl From<&[Rc<Category>]> for CategorySet {
    fn from(items: &[Rc<Category>]) -> Self {
        items.iter().collect()
    }
}

impl<T: Into<CategoryRef>> FromIterator<T> for CategorySet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        CategorySet(iter.into_iter().map(Into::into).collect())
    }
}

/// How `has_category_in_set` interprets the given set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Match the given categories as-is
    Exact,
    /// Also match every ancestor of the given categories
    Inherited,
}

pub struct GraphObject {
    id: ObjectId,
    owner: OnceCell<Rc<Graph>>,
    categories: Vec<Rc<Category>>,
    properties: Vec<(Rc<Property>, Value)>,
    subscribers: Subscribers<ObjectEvent>,
}

impl GraphObject {
    /// Create an object, optionally admitted into `owner` and carrying
    /// `category` from the start
    pub fn new(owner: Option<&Rc<Graph>>, category: Option<Rc<Category>>) -> Self {
        let mut object = Self {
            id: ObjectId::new(),
            owner: OnceCell::new(),
            categories: category.into_iter().collect(),
            properties: Vec::new(),
            subscribers: Subscribers::new(),
        };
        if let Some(owner) = owner {
            owner.set_owner(&mut object);
        }
        object
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn owner(&self) -> Option<&Rc<Graph>> {
        self.owner.get()
    }

    /// The owner's root schema; detached objects have none
    pub fn schema(&self) -> Option<&Rc<Schema>> {
        self.owner().map(|g| g.schema())
    }

    /// Write-once owner assignment; see `Graph::set_owner`
    pub(crate) fn assign_owner(&mut self, graph: Rc<Graph>) -> bool {
        self.owner.set(graph).is_ok()
    }

    fn owner_id(&self) -> Option<GraphId> {
        self.owner().map(|g| g.id())
    }

    fn metadata_for<D: HasMetadata + ?Sized>(&self, definition: &D) -> Rc<Metadata> {
        definition.metadata_for(self.owner_id())
    }

    // ===== Categories =====

    /// Exact-mode membership test; see `has_category_in_set`
    pub fn has_category(&self, categories: impl Into<CategorySet>) -> bool {
        self.has_category_in_set(categories, MatchMode::Exact)
    }

    /// Whether any of this object's categories, or any of their ancestors,
    /// matches the given set
    ///
    /// In `Inherited` mode the set is first expanded with every ancestor of
    /// its members. Ids are resolved against the owner's schema for the
    /// expansion; ids that do not resolve still match by id.
    pub fn has_category_in_set(&self, categories: impl Into<CategorySet>, mode: MatchMode) -> bool {
        let mut refs = categories.into().0;
        if mode == MatchMode::Inherited {
            let expansion: Vec<CategoryRef> = refs
                .iter()
                .filter_map(|r| self.resolve_category(r))
                .flat_map(|c| c.ancestors())
                .map(CategoryRef::Instance)
                .collect();
            refs.extend(expansion);
        }
        self.categories
            .iter()
            .flat_map(|c| c.chain())
            .any(|c| refs.iter().any(|r| r.matches(&c)))
    }

    fn resolve_category(&self, category: &CategoryRef) -> Option<Rc<Category>> {
        match category {
            CategoryRef::Instance(c) => Some(c.clone()),
            CategoryRef::Id(id) => self.schema().and_then(|s| s.find_category(id)),
        }
    }

    /// Attach `category`. Returns false if this instance is already attached.
    pub fn add_category(&mut self, category: Rc<Category>) -> bool {
        if self.categories.iter().any(|c| Rc::ptr_eq(c, &category)) {
            return false;
        }
        self.categories.push(category);
        self.subscribers.emit(&ObjectEvent::CategoryChanged);
        true
    }

    /// Detach `category`. Returns false if it was not attached.
    pub fn delete_category(&mut self, category: &Category) -> bool {
        let Some(index) = self
            .categories
            .iter()
            .position(|c| std::ptr::eq(&**c, category))
        else {
            return false;
        };
        self.categories.remove(index);
        self.subscribers.emit(&ObjectEvent::CategoryChanged);
        true
    }

    /// Detach the first attached category with `id` and return it
    pub fn delete_category_by_id(&mut self, id: &str) -> Option<Rc<Category>> {
        let index = self.categories.iter().position(|c| c.id() == id)?;
        let removed = self.categories.remove(index);
        self.subscribers.emit(&ObjectEvent::CategoryChanged);
        Some(removed)
    }

    // ===== Properties =====

    fn position(&self, property: &Property) -> Option<usize> {
        self.properties
            .iter()
            .position(|(p, _)| std::ptr::eq(&**p, property))
    }

    /// The value stored on this object itself, ignoring defaults
    pub fn stored(&self, property: &Property) -> Option<&Value> {
        self.position(property).map(|i| &self.properties[i].1)
    }

    pub fn contains(&self, property: &Property) -> bool {
        self.position(property).is_some()
    }

    /// Effective value of `property`; `None` if nothing resolves
    pub fn get(&self, property: &Property) -> Option<Value> {
        if let Some(value) = self.stored(property) {
            return Some(value.clone());
        }

        let owner = self.owner_id();
        let owning = self
            .categories
            .iter()
            .flat_map(|c| c.chain())
            .find_map(|c| {
                c.metadata_for(owner)
                    .owned_property(property.id())
                    .map(|m| m.default_value().cloned())
            });
        if let Some(Some(value)) = owning {
            return Some(value);
        }

        self.metadata_for(property).default_value().cloned()
    }

    /// Store `value` for `property`; `Value::Null` deletes instead
    ///
    /// Returns false, leaving the object unchanged, when the property is
    /// immutable and already has a value, or when the value is rejected by
    /// the property's data type or its metadata validator.
    pub fn set(&mut self, property: &Rc<Property>, value: Value) -> bool {
        if is_unset(&value) {
            return self.delete(property);
        }

        let metadata = self.metadata_for(&**property);
        let existing = self.position(property);
        if existing.is_some() && metadata.is_immutable() {
            tracing::debug!(object_id = %self.id, property_id = property.id(), "write to immutable property ignored");
            return false;
        }
        if !property.validate(&value) || !metadata.validate(&value) {
            tracing::debug!(object_id = %self.id, property_id = property.id(), "value rejected by validation");
            return false;
        }

        self.store(property, existing, value);
        true
    }

    /// Remove the stored value for `property`
    ///
    /// Returns false if nothing is stored or the property is not removable.
    pub fn delete(&mut self, property: &Property) -> bool {
        let Some(index) = self.position(property) else {
            return false;
        };
        if !self.metadata_for(property).is_removable() {
            tracing::debug!(object_id = %self.id, property_id = property.id(), "delete of non-removable property ignored");
            return false;
        }
        self.properties.remove(index);
        self.subscribers.emit(&ObjectEvent::PropertyChanged {
            property_id: property.id().to_string(),
        });
        true
    }

    fn store(&mut self, property: &Rc<Property>, existing: Option<usize>, value: Value) {
        match existing {
            Some(index) => self.properties[index].1 = value,
            None => self.properties.push((property.clone(), value)),
        }
        self.subscribers.emit(&ObjectEvent::PropertyChanged {
            property_id: property.id().to_string(),
        });
    }

    // ===== Merging =====

    /// Attach every category of `other` that is missing here
    ///
    /// The owner graph imports its own metadata for each category before it
    /// is attached. Returns whether anything changed.
    pub fn copy_categories(&mut self, other: &GraphObject) -> bool {
        let start = Instant::now();
        log_op_start!("copy_categories", object_id = %self.id, source_object_id = %other.id);

        let mut changed = false;
        for category in &other.categories {
            if self.categories.iter().any(|c| Rc::ptr_eq(c, category)) {
                continue;
            }
            if let Some(owner) = self.owner() {
                owner.import_metadata(other.owner().map(|g| &**g), &**category);
            }
            self.categories.push(category.clone());
            self.subscribers.emit(&ObjectEvent::CategoryChanged);
            changed = true;
        }

        log_op_end!(
            "copy_categories",
            duration_ms = start.elapsed().as_millis() as u64,
            object_id = %self.id,
            changed = changed
        );
        changed
    }

    /// Copy every value of `other` that differs from the value stored here
    ///
    /// Metadata is resolved through the owner graph's import step. A value
    /// is skipped when that metadata is not sharable, is immutable while a
    /// value is already stored here, or rejects the value. Returns whether
    /// anything changed.
    pub fn copy_properties(&mut self, other: &GraphObject) -> bool {
        let start = Instant::now();
        log_op_start!("copy_properties", object_id = %self.id, source_object_id = %other.id);

        let source_owner = other.owner().map(|g| &**g);
        let mut changed = false;
        for (property, value) in &other.properties {
            let existing = self.position(property);
            if existing.is_some_and(|i| self.properties[i].1 == *value) {
                continue;
            }
            let metadata = match self.owner() {
                Some(owner) => owner.import_metadata(source_owner, &**property),
                None => property.create_default_metadata(),
            };
            if !metadata.is_sharable() {
                tracing::debug!(object_id = %self.id, property_id = property.id(), "property not sharable, skipped");
                continue;
            }
            if metadata.is_immutable() && existing.is_some() {
                tracing::debug!(object_id = %self.id, property_id = property.id(), "immutable property already set, skipped");
                continue;
            }
            if !property.validate(value) || !metadata.validate(value) {
                tracing::debug!(object_id = %self.id, property_id = property.id(), "value rejected by validation, skipped");
                continue;
            }
            self.store(property, existing, value.clone());
            changed = true;
        }

        log_op_end!(
            "copy_properties",
            duration_ms = start.elapsed().as_millis() as u64,
            object_id = %self.id,
            changed = changed
        );
        changed
    }

    // ===== Iteration =====

    /// Properties with stored values, in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &Rc<Property>> + '_ {
        self.properties.iter().map(|(p, _)| p)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.properties.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<Property>, &Value)> + '_ {
        self.properties.iter().map(|(p, v)| (p, v))
    }

    pub fn categories(&self) -> impl Iterator<Item = &Rc<Category>> + '_ {
        self.categories.iter()
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    // ===== Notification =====

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ObjectEvent) + 'static,
    {
        self.subscribers.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

impl Drop for GraphObject {
    fn drop(&mut self) {
        if let Some(owner) = self.owner.get() {
            owner.forget(self.id);
        }
    }
}

impl fmt::Debug for GraphObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphObject")
            .field("id", &self.id)
            .field("owner", &self.owner_id())
            .field(
                "categories",
                &self.categories.iter().map(|c| c.id()).collect::<Vec<_>>(),
            )
            .field(
                "properties",
                &self
                    .properties
                    .iter()
                    .map(|(p, v)| (p.id(), v))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    fn record(object: &GraphObject) -> Rc<RefCell<Vec<ObjectEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        object.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        seen
    }

    #[test]
    fn test_detached_object_uses_ownerless_default() {
        let p = Property::with_factory("p", None, Rc::new(|_| Metadata::new().with_default(0)))
            .unwrap();
        let mut o = GraphObject::new(None, None);

        assert_eq!(o.get(&p), Some(json!(0)));
        assert!(o.set(&p, json!(5)));
        assert_eq!(o.get(&p), Some(json!(5)));
        assert!(o.delete(&p));
        assert_eq!(o.get(&p), Some(json!(0)));
    }

    #[test]
    fn test_null_assignment_deletes() {
        let p = Property::new("p").unwrap();
        let mut o = GraphObject::new(None, None);
        o.set(&p, json!("x"));

        assert!(o.set(&p, Value::Null));
        assert!(!o.contains(&p));
        assert!(!o.set(&p, Value::Null));
    }

    #[test]
    fn test_properties_keyed_by_instance() {
        let a = Property::new("name").unwrap();
        let b = Property::new("name").unwrap();
        let mut o = GraphObject::new(None, None);

        o.set(&a, json!("a"));

        assert_eq!(o.get(&a), Some(json!("a")));
        assert_eq!(o.get(&b), None);
    }

    #[test]
    fn test_data_type_rejects_silently() {
        let p = Property::typed("age", crate::value::DataType::Integer).unwrap();
        let mut o = GraphObject::new(None, None);
        let seen = record(&o);

        assert!(!o.set(&p, json!("old")));
        assert!(o.is_empty());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_add_and_delete_category_events() {
        let c = Category::new("c").unwrap();
        let mut o = GraphObject::new(None, None);
        let seen = record(&o);

        assert!(o.add_category(c.clone()));
        assert!(!o.add_category(c.clone()));
        assert!(o.delete_category(&c));
        assert!(!o.delete_category(&c));

        assert_eq!(
            *seen.borrow(),
            vec![ObjectEvent::CategoryChanged, ObjectEvent::CategoryChanged]
        );
    }

    #[test]
    fn test_delete_category_by_id_returns_removed() {
        let c = Category::new("c").unwrap();
        let mut o = GraphObject::new(None, Some(c.clone()));

        let removed = o.delete_category_by_id("c").unwrap();
        assert!(Rc::ptr_eq(&removed, &c));
        assert!(o.delete_category_by_id("c").is_none());
    }

    #[test]
    fn test_iteration_in_insertion_order() {
        let a = Property::new("a").unwrap();
        let b = Property::new("b").unwrap();
        let mut o = GraphObject::new(None, None);
        o.set(&b, json!(2));
        o.set(&a, json!(1));

        let keys: Vec<&str> = o.keys().map(|p| p.id()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(o.values().cloned().collect::<Vec<_>>(), vec![json!(2), json!(1)]);
        assert_eq!(o.iter().count(), 2);
        // restartable
        assert_eq!(o.keys().count(), 2);
    }

    #[test]
    fn test_category_without_default_falls_through() {
        let p = Property::with_factory("p", None, Rc::new(|_| Metadata::new().with_default(1)))
            .unwrap();
        let c = Category::with_factory("c", Rc::new(|_| Metadata::new().owning("p", Metadata::new())))
            .unwrap();
        let o = GraphObject::new(None, Some(c));

        assert_eq!(o.get(&p), Some(json!(1)));
    }
}
