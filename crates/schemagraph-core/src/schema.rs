//! Schema - a hierarchical namespace of categories and properties
//!
//! Lookups walk the tree depth-first, a schema before its descendants and
//! children in registration order. An id registered directly on a schema
//! therefore shadows the same id registered on any descendant.
//!
//! Each schema raises `SchemaEvent::Changed` to its own subscribers when
//! its own registrations change. Changes are not forwarded to ancestors.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::errors::{ensure_id, Result, SchemaGraphError};
use crate::events::{SchemaEvent, SubscriptionId, Subscribers};
use crate::model::{Category, Property};

pub struct Schema {
    name: String,
    parent: RefCell<Weak<Schema>>,
    children: RefCell<Vec<Rc<Schema>>>,
    categories: RefCell<Vec<Rc<Category>>>,
    properties: RefCell<Vec<Rc<Property>>>,
    subscribers: Subscribers<SchemaEvent>,
}

/// A schema given either by instance or by name
#[derive(Debug, Clone, Copy)]
pub enum SchemaRef<'a> {
    Instance(&'a Schema),
    Name(&'a str),
}

impl<'a> From<&'a Schema> for SchemaRef<'a> {
    fn from(schema: &'a Schema) -> Self {
        SchemaRef::Instance(schema)
    }
}

impl<'a> From<&'a Rc<Schema>> for SchemaRef<'a> {
    fn from(schema: &'a Rc<Schema>) -> Self {
        SchemaRef::Instance(schema)
    }
}

impl<'a> From<&'a str> for SchemaRef<'a> {
    fn from(name: &'a str) -> Self {
        SchemaRef::Name(name)
    }
}

impl SchemaRef<'_> {
    fn matches(&self, schema: &Schema) -> bool {
        match self {
            SchemaRef::Instance(target) => std::ptr::eq(*target, schema),
            SchemaRef::Name(name) => schema.name == *name,
        }
    }
}

impl Schema {
    /// Create an empty, parentless schema
    ///
    /// # Errors
    /// * `InvalidId` - If `name` is empty or whitespace-only
    pub fn new(name: impl Into<String>) -> Result<Rc<Self>> {
        let name = name.into();
        ensure_id("schema", &name)?;
        Ok(Rc::new(Self {
            name,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            categories: RefCell::new(Vec::new()),
            properties: RefCell::new(Vec::new()),
            subscribers: Subscribers::new(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema this one was added to, if it is still alive
    pub fn parent(&self) -> Option<Rc<Schema>> {
        self.parent.borrow().upgrade()
    }

    pub fn children(&self) -> Vec<Rc<Schema>> {
        self.children.borrow().clone()
    }

    pub fn categories(&self) -> Vec<Rc<Category>> {
        self.categories.borrow().clone()
    }

    pub fn properties(&self) -> Vec<Rc<Property>> {
        self.properties.borrow().clone()
    }

    // ===== Registration =====

    /// Register a category on this schema
    ///
    /// Returns `Ok(false)` if this instance is already registered here.
    ///
    /// # Errors
    /// * `InvalidId` - If the category id is empty or whitespace-only
    pub fn add_category(&self, category: Rc<Category>) -> Result<bool> {
        ensure_id("category", category.id())?;
        {
            let mut categories = self.categories.borrow_mut();
            if categories.iter().any(|c| Rc::ptr_eq(c, &category)) {
                return Ok(false);
            }
            tracing::debug!(schema_name = %self.name, category_id = category.id(), "category registered");
            categories.push(category);
        }
        self.notify();
        Ok(true)
    }

    /// Register a property on this schema
    ///
    /// Returns `Ok(false)` if this instance is already registered here.
    ///
    /// # Errors
    /// * `InvalidId` - If the property id is empty or whitespace-only
    pub fn add_property(&self, property: Rc<Property>) -> Result<bool> {
        ensure_id("property", property.id())?;
        {
            let mut properties = self.properties.borrow_mut();
            if properties.iter().any(|p| Rc::ptr_eq(p, &property)) {
                return Ok(false);
            }
            tracing::debug!(schema_name = %self.name, property_id = property.id(), "property registered");
            properties.push(property);
        }
        self.notify();
        Ok(true)
    }

    /// Add `child` beneath this schema
    ///
    /// Schemas are never re-parented, so the tree stays acyclic. Adding a
    /// child that is already registered here returns `Ok(false)`.
    ///
    /// # Errors
    /// * `IllegalReparent` - If `child` already belongs to another schema
    /// * `SchemaCycle` - If `child` is this schema or one of its ancestors
    pub fn add_schema(self: &Rc<Self>, child: Rc<Schema>) -> Result<bool> {
        if self.children.borrow().iter().any(|c| Rc::ptr_eq(c, &child)) {
            return Ok(false);
        }
        if let Some(current) = child.parent() {
            return Err(SchemaGraphError::IllegalReparent {
                child: child.name.clone(),
                current_parent: current.name.clone(),
            });
        }
        if child.has_schema(&**self) {
            return Err(SchemaGraphError::SchemaCycle {
                parent: self.name.clone(),
                child: child.name.clone(),
            });
        }
        *child.parent.borrow_mut() = Rc::downgrade(self);
        tracing::debug!(schema_name = %self.name, child = %child.name, "child schema added");
        self.children.borrow_mut().push(child);
        self.notify();
        Ok(true)
    }

    /// Unregister the first category with `id` from this schema only
    pub fn remove_category(&self, id: &str) -> Option<Rc<Category>> {
        let removed = {
            let mut categories = self.categories.borrow_mut();
            let index = categories.iter().position(|c| c.id() == id)?;
            categories.remove(index)
        };
        self.notify();
        Some(removed)
    }

    /// Unregister the first property with `id` from this schema only
    pub fn remove_property(&self, id: &str) -> Option<Rc<Property>> {
        let removed = {
            let mut properties = self.properties.borrow_mut();
            let index = properties.iter().position(|p| p.id() == id)?;
            properties.remove(index)
        };
        self.notify();
        Some(removed)
    }

    // ===== Traversal & lookup =====

    /// This schema and every descendant, depth-first, self first
    pub fn all_schemas(self: &Rc<Self>) -> AllSchemas {
        AllSchemas {
            stack: vec![self.clone()],
        }
    }

    /// Category with `id` on this schema itself
    pub fn own_category(&self, id: &str) -> Option<Rc<Category>> {
        self.categories
            .borrow()
            .iter()
            .find(|c| c.id() == id)
            .cloned()
    }

    /// Property with `id` on this schema itself
    pub fn own_property(&self, id: &str) -> Option<Rc<Property>> {
        self.properties
            .borrow()
            .iter()
            .find(|p| p.id() == id)
            .cloned()
    }

    /// First category with `id` in traversal order
    pub fn find_category(self: &Rc<Self>, id: &str) -> Option<Rc<Category>> {
        self.all_schemas().find_map(|s| s.own_category(id))
    }

    /// First property with `id` in traversal order
    pub fn find_property(self: &Rc<Self>, id: &str) -> Option<Rc<Property>> {
        self.all_schemas().find_map(|s| s.own_property(id))
    }

    /// Every category matching any of `ids`
    ///
    /// Ordered by traversal, then by position in `ids` within one schema.
    pub fn find_categories<'a, S: AsRef<str>>(
        self: &Rc<Self>,
        ids: &'a [S],
    ) -> impl Iterator<Item = Rc<Category>> + 'a {
        self.all_schemas().flat_map(move |schema| {
            let categories = schema.categories.borrow();
            let matches: Vec<_> = ids
                .iter()
                .flat_map(|id| {
                    categories
                        .iter()
                        .filter(move |c| c.id() == id.as_ref())
                        .cloned()
                })
                .collect();
            matches
        })
    }

    /// Every property matching any of `ids`, ordered like `find_categories`
    pub fn find_properties<'a, S: AsRef<str>>(
        self: &Rc<Self>,
        ids: &'a [S],
    ) -> impl Iterator<Item = Rc<Property>> + 'a {
        self.all_schemas().flat_map(move |schema| {
            let properties = schema.properties.borrow();
            let matches: Vec<_> = ids
                .iter()
                .flat_map(|id| {
                    properties
                        .iter()
                        .filter(move |p| p.id() == id.as_ref())
                        .cloned()
                })
                .collect();
            matches
        })
    }

    /// Whether `target` is this schema or one of its descendants
    pub fn has_schema<'a>(&self, target: impl Into<SchemaRef<'a>>) -> bool {
        let target = target.into();
        let mut stack: Vec<Rc<Schema>> = Vec::new();
        if target.matches(self) {
            return true;
        }
        stack.extend(self.children.borrow().iter().cloned());
        while let Some(schema) = stack.pop() {
            if target.matches(&schema) {
                return true;
            }
            stack.extend(schema.children.borrow().iter().cloned());
        }
        false
    }

    // ===== Notification =====

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&SchemaEvent) + 'static,
    {
        self.subscribers.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn notify(&self) {
        self.subscribers.emit(&SchemaEvent::Changed);
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("categories", &self.categories.borrow().len())
            .field("properties", &self.properties.borrow().len())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

/// Depth-first, self-first walk over a schema tree
pub struct AllSchemas {
    stack: Vec<Rc<Schema>>,
}

impl Iterator for AllSchemas {
    type Item = Rc<Schema>;

    fn next(&mut self) -> Option<Self::Item> {
        let schema = self.stack.pop()?;
        // Reversed so the first-registered child is visited first.
        self.stack
            .extend(schema.children.borrow().iter().rev().cloned());
        Some(schema)
    }
}
