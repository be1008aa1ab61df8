mod common;

use common::property_with_default;
use schemagraph_core::{GraphObject, Schema};
use serde_json::json;

#[test]
fn test_detached_object_set_get_delete_cycle() {
    let schema = Schema::new("s").unwrap();
    let p = property_with_default("p", json!(0));
    schema.add_property(p.clone()).unwrap();
    let mut o = GraphObject::new(None, None);

    assert!(o.owner().is_none());
    assert_eq!(o.get(&p), Some(json!(0)));

    assert!(o.set(&p, json!(5)));
    assert_eq!(o.stored(&p), Some(&json!(5)));
    assert_eq!(o.get(&p), Some(json!(5)));

    assert!(o.delete(&p));
    assert_eq!(o.get(&p), Some(json!(0)));
    assert!(o.stored(&p).is_none());
}

#[test]
fn test_delete_without_stored_value_is_false() {
    let p = property_with_default("p", json!(0));
    let mut o = GraphObject::new(None, None);

    assert!(!o.delete(&p));
    assert_eq!(o.get(&p), Some(json!(0)));
}

#[test]
fn test_no_default_resolves_to_nothing() {
    let p = schemagraph_core::Property::new("p").unwrap();
    let o = GraphObject::new(None, None);

    assert_eq!(o.get(&p), None);
}
