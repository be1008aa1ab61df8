use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use schemagraph_core_types::{GraphId, ObjectId};

use crate::model::{Category, HasMetadata, Metadata, Property};
use crate::object::GraphObject;
use crate::schema::Schema;
use crate::{log_op_end, log_op_start};

/// Graph - owner of a root schema and of the objects admitted into it
///
/// A graph is also the owner key for metadata: every category and property
/// used by the graph's objects gets its own metadata entry for this graph.
pub struct Graph {
    id: GraphId,
    schema: Rc<Schema>,
    objects: RefCell<BTreeSet<ObjectId>>,
}

impl Graph {
    pub fn new(schema: Rc<Schema>) -> Rc<Self> {
        let graph = Rc::new(Self {
            id: GraphId::new(),
            schema,
            objects: RefCell::new(BTreeSet::new()),
        });
        tracing::debug!(graph_id = %graph.id, schema_name = graph.schema.name(), "graph created");
        graph
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    /// The root schema, fixed at construction
    pub fn schema(&self) -> &Rc<Schema> {
        &self.schema
    }

    pub fn find_category(&self, id: &str) -> Option<Rc<Category>> {
        self.schema.find_category(id)
    }

    pub fn find_property(&self, id: &str) -> Option<Rc<Property>> {
        self.schema.find_property(id)
    }

    /// Construct an object owned by this graph
    pub fn create_object(self: &Rc<Self>, category: Option<Rc<Category>>) -> GraphObject {
        GraphObject::new(Some(self), category)
    }

    /// Admit `object` into this graph
    ///
    /// Ownership is assigned once. Returns false, leaving the object
    /// untouched, if it already has an owner (this graph included).
    pub fn set_owner(self: &Rc<Self>, object: &mut GraphObject) -> bool {
        if !object.assign_owner(self.clone()) {
            tracing::debug!(graph_id = %self.id, object_id = %object.id(), "object already owned");
            return false;
        }
        self.objects.borrow_mut().insert(object.id());
        tracing::debug!(graph_id = %self.id, object_id = %object.id(), "object admitted");
        true
    }

    /// Whether `object` is a live object of this graph
    pub fn owns(&self, object: &GraphObject) -> bool {
        self.objects.borrow().contains(&object.id())
    }

    /// Stop tracking `object`. Its owner field is write-once and stays set.
    pub fn release(&self, object: &GraphObject) -> bool {
        self.forget(object.id())
    }

    pub(crate) fn forget(&self, object_id: ObjectId) -> bool {
        self.objects.borrow_mut().remove(&object_id)
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize {
        self.objects.borrow().len()
    }

    /// This graph's own metadata for `definition`, imported from `source`
    ///
    /// An existing entry for this graph always wins. Otherwise the source
    /// graph's entry for the same definition (if it has one) is copied into
    /// a new entry for this graph; failing that, the definition's factory
    /// creates it. The definition itself is shared, never duplicated.
    pub fn import_metadata<D>(&self, source: Option<&Graph>, definition: &D) -> Rc<Metadata>
    where
        D: HasMetadata + ?Sized,
    {
        let container = definition.metadata_container();
        if let Some(existing) = container.peek(self.id) {
            return existing;
        }

        let start = Instant::now();
        log_op_start!(
            "import_metadata",
            graph_id = %self.id,
            definition_id = definition.definition_id()
        );

        let from_source = source
            .filter(|s| s.id != self.id)
            .and_then(|s| container.peek(s.id));
        let adopted = from_source.is_some();
        let metadata = match from_source {
            Some(source_metadata) => container.adopt(self.id, (*source_metadata).clone()),
            None => container.get_metadata(self.id),
        };

        log_op_end!(
            "import_metadata",
            duration_ms = start.elapsed().as_millis() as u64,
            graph_id = %self.id,
            definition_id = definition.definition_id(),
            adopted = adopted
        );
        metadata
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("schema", &self.schema.name())
            .field("objects", &self.object_count())
            .finish()
    }
}
