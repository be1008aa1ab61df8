use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::errors::{ensure_id, Result, SchemaGraphError};
use crate::model::metadata::{HasMetadata, MetadataContainer, MetadataFactory};

/// Category - a reusable classifier attachable to graph objects
///
/// A category is based on at most one parent category. The `based_on`
/// links form a chain that is acyclic by construction: `set_based_on`
/// refuses any assignment that would make a category its own ancestor.
///
/// Categories are shared between schemas and graphs. What varies per graph
/// is the metadata held in the category's `MetadataContainer`.
pub struct Category {
    id: String,
    based_on: RefCell<Option<Rc<Category>>>,
    metadata: MetadataContainer,
}

impl Category {
    /// Create a root category with default metadata
    ///
    /// # Errors
    /// * `InvalidId` - If `id` is empty or whitespace-only
    pub fn new(id: impl Into<String>) -> Result<Rc<Self>> {
        Self::build(id.into(), None, MetadataContainer::default())
    }

    /// Create a root category whose per-graph metadata comes from `factory`
    ///
    /// # Errors
    /// * `InvalidId` - If `id` is empty or whitespace-only
    pub fn with_factory(id: impl Into<String>, factory: MetadataFactory) -> Result<Rc<Self>> {
        Self::build(id.into(), None, MetadataContainer::new(factory))
    }

    /// Create a category based on `parent`
    ///
    /// # Errors
    /// * `InvalidId` - If `id` is empty or whitespace-only
    pub fn derived(id: impl Into<String>, parent: &Rc<Category>) -> Result<Rc<Self>> {
        Self::build(id.into(), Some(parent.clone()), MetadataContainer::default())
    }

    fn build(
        id: String,
        based_on: Option<Rc<Category>>,
        metadata: MetadataContainer,
    ) -> Result<Rc<Self>> {
        ensure_id("category", &id)?;
        Ok(Rc::new(Self {
            id,
            based_on: RefCell::new(based_on),
            metadata,
        }))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The direct parent category, if any
    pub fn based_on(&self) -> Option<Rc<Category>> {
        self.based_on.borrow().clone()
    }

    /// Re-link this category under `parent` (or detach it with `None`)
    ///
    /// # Errors
    /// * `CategoryCycle` - If `parent` is this category or is based on it
    pub fn set_based_on(&self, parent: Option<Rc<Category>>) -> Result<()> {
        if let Some(parent) = &parent {
            if parent.is_based_on(self) {
                return Err(SchemaGraphError::CategoryCycle {
                    category_id: self.id.clone(),
                    based_on_id: parent.id.clone(),
                });
            }
        }
        *self.based_on.borrow_mut() = parent;
        Ok(())
    }

    /// Ancestors from the direct parent up to the root (self excluded)
    pub fn ancestors(&self) -> Chain {
        Chain::new(self.based_on())
    }

    /// This category followed by its ancestors
    pub fn chain(self: &Rc<Self>) -> Chain {
        Chain::new(Some(self.clone()))
    }

    /// Reflexive: true if `other` is this category or one of its ancestors
    pub fn is_based_on(&self, other: &Category) -> bool {
        std::ptr::eq(self, other) || self.ancestors().any(|a| std::ptr::eq(&*a, other))
    }

    /// Like `is_based_on`, comparing ids instead of instances
    pub fn is_based_on_id(&self, id: &str) -> bool {
        self.id == id || self.ancestors().any(|a| a.id == id)
    }

    /// Number of ancestors
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    pub fn set_factory(&self, factory: MetadataFactory) {
        self.metadata.set_factory(factory);
    }
}

impl HasMetadata for Category {
    fn metadata_container(&self) -> &MetadataContainer {
        &self.metadata
    }

    fn definition_id(&self) -> &str {
        &self.id
    }
}

impl Drop for Category {
    // Unlinks ancestors iteratively; stops at the first one still shared.
    fn drop(&mut self) {
        let mut next = self.based_on.get_mut().take();
        while let Some(parent) = next {
            next = match Rc::try_unwrap(parent) {
                Ok(mut parent) => parent.based_on.get_mut().take(),
                Err(_) => None,
            };
        }
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("id", &self.id)
            .field("based_on", &self.based_on().map(|c| c.id.clone()))
            .finish()
    }
}

/// Iterator over a `based_on` chain
///
/// Walks the links in a loop rather than by recursion. Debug builds also
/// track visited categories and panic if a cycle ever shows up.
pub struct Chain {
    next: Option<Rc<Category>>,
    #[cfg(debug_assertions)]
    visited: std::collections::HashSet<*const Category>,
}

impl Chain {
    fn new(start: Option<Rc<Category>>) -> Self {
        Self {
            next: start,
            #[cfg(debug_assertions)]
            visited: std::collections::HashSet::new(),
        }
    }
}

impl Iterator for Chain {
    type Item = Rc<Category>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        #[cfg(debug_assertions)]
        assert!(
            self.visited.insert(Rc::as_ptr(&current)),
            "category chain cycles back to {}",
            current.id
        );
        self.next = current.based_on();
        Some(current)
    }
}
