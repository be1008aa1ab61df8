use std::cell::Cell;
use std::rc::Rc;

use schemagraph_core::{Category, Property, Schema, SchemaGraphError};

fn tree() -> (Rc<Schema>, Rc<Schema>, Rc<Schema>, Rc<Schema>) {
    let root = Schema::new("root").unwrap();
    let a = Schema::new("a").unwrap();
    let a1 = Schema::new("a1").unwrap();
    let b = Schema::new("b").unwrap();
    root.add_schema(a.clone()).unwrap();
    a.add_schema(a1.clone()).unwrap();
    root.add_schema(b.clone()).unwrap();
    (root, a, a1, b)
}

#[test]
fn test_all_schemas_depth_first_self_first() {
    let (root, ..) = tree();

    let names: Vec<String> = root.all_schemas().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["root", "a", "a1", "b"]);
}

#[test]
fn test_own_definition_shadows_descendant() {
    let (root, _a, a1, b) = tree();
    let deep = Category::new("person").unwrap();
    let local = Category::new("person").unwrap();
    a1.add_category(deep.clone()).unwrap();
    b.add_category(Category::new("person").unwrap()).unwrap();
    root.add_category(local.clone()).unwrap();

    let found = root.find_category("person").unwrap();
    assert!(Rc::ptr_eq(&found, &local));
}

#[test]
fn test_earlier_subtree_wins_over_later_sibling() {
    let (root, _a, a1, b) = tree();
    let deep = Property::new("name").unwrap();
    a1.add_property(deep.clone()).unwrap();
    b.add_property(Property::new("name").unwrap()).unwrap();

    let found = root.find_property("name").unwrap();
    assert!(Rc::ptr_eq(&found, &deep));
    assert!(root.find_property("missing").is_none());
}

#[test]
fn test_find_categories_ordering() {
    let (root, a, _a1, b) = tree();
    let x_root = Category::new("x").unwrap();
    let y_root = Category::new("y").unwrap();
    root.add_category(x_root.clone()).unwrap();
    root.add_category(y_root.clone()).unwrap();
    let y_a = Category::new("y").unwrap();
    a.add_category(y_a.clone()).unwrap();
    let x_b = Category::new("x").unwrap();
    b.add_category(x_b.clone()).unwrap();

    let found: Vec<Rc<Category>> = root.find_categories(&["y", "x"]).collect();
    let expected = [&y_root, &x_root, &y_a, &x_b];
    assert_eq!(found.len(), expected.len());
    for (got, want) in found.iter().zip(expected) {
        assert!(Rc::ptr_eq(got, want));
    }
}

#[test]
fn test_find_properties_with_owned_ids() {
    let (root, _a, a1, _b) = tree();
    a1.add_property(Property::new("age").unwrap()).unwrap();
    let ids = vec!["age".to_string(), "none".to_string()];

    assert_eq!(root.find_properties(&ids[..]).count(), 1);
}

#[test]
fn test_has_schema_by_instance_and_name() {
    let (root, a, a1, b) = tree();

    assert!(root.has_schema(&*a1));
    assert!(root.has_schema("b"));
    assert!(root.has_schema(&root));
    assert!(!a.has_schema(&*b));
    assert!(!a1.has_schema("root"));
}

#[test]
fn test_add_schema_rejects_cycles_and_reparenting() {
    let (root, a, a1, b) = tree();

    let err = a1.add_schema(root.clone()).unwrap_err();
    assert!(matches!(err, SchemaGraphError::SchemaCycle { .. }));
    let err = b.add_schema(a1.clone()).unwrap_err();
    assert!(matches!(err, SchemaGraphError::IllegalReparent { .. }));
    assert!(!a.add_schema(a1.clone()).unwrap());
    assert!(Rc::ptr_eq(&a1.parent().unwrap(), &a));
}

#[test]
fn test_change_events_are_local() {
    let (root, a, ..) = tree();
    let root_events = Rc::new(Cell::new(0));
    let a_events = Rc::new(Cell::new(0));
    let counter = root_events.clone();
    root.subscribe(move |_| counter.set(counter.get() + 1));
    let counter = a_events.clone();
    let subscription = a.subscribe(move |_| counter.set(counter.get() + 1));

    a.add_category(Category::new("c").unwrap()).unwrap();
    a.add_property(Property::new("p").unwrap()).unwrap();
    assert!(a.remove_category("c").is_some());
    assert!(a.remove_property("missing").is_none());

    assert_eq!(a_events.get(), 3);
    assert_eq!(root_events.get(), 0);

    assert!(a.unsubscribe(subscription));
    a.add_category(Category::new("d").unwrap()).unwrap();
    assert_eq!(a_events.get(), 3);
}

#[test]
fn test_duplicate_registration_is_noop() {
    let s = Schema::new("s").unwrap();
    let c = Category::new("c").unwrap();

    assert!(s.add_category(c.clone()).unwrap());
    assert!(!s.add_category(c).unwrap());
    assert_eq!(s.categories().len(), 1);
}
