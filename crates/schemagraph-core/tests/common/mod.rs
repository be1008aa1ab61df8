use std::rc::Rc;

use schemagraph_core::{Category, Graph, Metadata, Property, Schema};

/// Create a graph over a fresh root schema
#[allow(dead_code)]
pub fn new_graph(schema_name: &str) -> Rc<Graph> {
    Graph::new(Schema::new(schema_name).unwrap())
}

/// Create a property whose metadata, for every owner, carries `default`
#[allow(dead_code)]
pub fn property_with_default(id: &str, default: serde_json::Value) -> Rc<Property> {
    Property::with_factory(
        id,
        None,
        Rc::new(move |_| Metadata::new().with_default(default.clone())),
    )
    .unwrap()
}

/// Create a property that is immutable for every owner
#[allow(dead_code)]
pub fn immutable_property(id: &str) -> Rc<Property> {
    Property::with_factory(id, None, Rc::new(|_| Metadata::new().immutable())).unwrap()
}

/// Create a root category whose metadata owns `property_id` with `default`
#[allow(dead_code)]
pub fn category_owning(id: &str, property_id: &str, default: serde_json::Value) -> Rc<Category> {
    let property_id = property_id.to_string();
    Category::with_factory(
        id,
        Rc::new(move |_| {
            Metadata::new().owning(
                property_id.clone(),
                Metadata::new().with_default(default.clone()),
            )
        }),
    )
    .unwrap()
}

/// Build the chain root <- mid <- leaf and return (root, mid, leaf)
#[allow(dead_code)]
pub fn category_chain() -> (Rc<Category>, Rc<Category>, Rc<Category>) {
    let root = Category::new("root").unwrap();
    let mid = Category::derived("mid", &root).unwrap();
    let leaf = Category::derived("leaf", &mid).unwrap();
    (root, mid, leaf)
}
