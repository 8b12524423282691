mod common;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use object_tree::{Array, Component, ErrorKind, Name, Node, NodeKind, Value, ValueKind};

fn hash_of(node: &Node) -> u64 {
    let mut hasher = DefaultHasher::new();
    node.hash(&mut hasher);
    hasher.finish()
}

/// One module per element type, all checking the same behavior.
macro_rules! array_matrix {
    ($($module:ident: $ty:ty => [$a:expr, $b:expr, $c:expr], wrong = $wrong:expr;)*) => {
        $(
            mod $module {
                use super::*;

                fn array() -> Array {
                    Array::from(vec![$a as $ty, $b as $ty])
                }

                #[test]
                fn wrap_and_read() {
                    let node = Node::wrap("array", array(), common::context());
                    assert_eq!(node.kind(), NodeKind::Array);
                    assert_eq!(node.children_count().unwrap(), 2);
                    assert_eq!(
                        node.children_values().unwrap(),
                        vec![Value::from($a as $ty), Value::from($b as $ty)]
                    );
                    let children = node.children().unwrap();
                    assert_eq!(children.len(), 2);
                    assert_eq!(children[1].name(), &Name::Index(1));
                    assert_eq!(children[1].index(), 1);
                    assert_eq!(children[1].value(), &Value::from($b as $ty));
                    assert!(children[1].is_leaf());
                }

                #[test]
                fn set_child_value_shares_structure() {
                    let node = Node::wrap("array", array(), common::context());
                    let updated = node.set_child_value(0, $c as $ty).unwrap();
                    assert_eq!(updated.child(0).unwrap().value(), &Value::from($c as $ty));
                    assert_eq!(updated.child(1).unwrap().value(), &Value::from($b as $ty));
                    assert_eq!(node.child(0).unwrap().value(), &Value::from($a as $ty));
                }

                #[test]
                fn replace_child_from_below() {
                    let node = Node::wrap("array", array(), common::context());
                    let child = node.child(1).unwrap();
                    let replaced = child.set_value($c as $ty).unwrap();
                    assert_eq!(replaced.index(), 1);
                    let parent = replaced.parent_or_fail().unwrap();
                    assert_eq!(
                        parent.value(),
                        &Value::from(Array::from(vec![$a as $ty, $c as $ty]))
                    );
                    assert_eq!(child.value(), &Value::from($b as $ty));
                }

                #[test]
                fn wrong_element_type() {
                    let node = Node::wrap("array", array(), common::context());
                    let err = node.set_child_value(0, $wrong).unwrap_err();
                    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
                    let err = node.set_child_value(0, Value::Null).unwrap_err();
                    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
                }

                #[test]
                fn set_children_ignores_out_of_range() {
                    let node = Node::wrap("array", array(), common::context());
                    let outside = node.create_node(99usize, $c as $ty).unwrap();
                    let updated = node.set_children(&[outside]).unwrap();
                    assert!(Node::ptr_eq(&node, &updated));
                    assert_eq!(updated.children_count().unwrap(), 2);
                }

                #[test]
                fn set_children_values_resizes() {
                    let node = Node::wrap("array", array(), common::context());
                    let values = vec![Value::from($c as $ty); 3];
                    let updated = node.set_children_values(values.clone()).unwrap();
                    assert_eq!(updated.children_values().unwrap(), values);
                    let shrunk = updated.set_children_values(Vec::new()).unwrap();
                    assert_eq!(shrunk.children_count().unwrap(), 0);
                }

                #[test]
                fn equality_and_hash() {
                    let context = common::context();
                    let a = Node::wrap("a", array(), context.clone());
                    let b = Node::wrap("b", array(), context.clone());
                    assert_eq!(a, b);
                    assert_eq!(hash_of(&a), hash_of(&b));
                    let c = Node::wrap("c", Array::from(vec![$a as $ty, $c as $ty]), context);
                    assert_ne!(a, c);
                }
            }
        )*
    };
}

array_matrix! {
    bool_elements: bool => [true, false, true], wrong = 1;
    byte_elements: i8 => [1, 2, 127], wrong = 1i16;
    short_elements: i16 => [1, 2, 300], wrong = 1i8;
    int_elements: i32 => [1, 2, 9], wrong = 1i64;
    long_elements: i64 => [1, 2, 1i64 << 40], wrong = 1i32;
    float_elements: f32 => [1.5, 2.5, 9.5], wrong = 1.5f64;
    double_elements: f64 => [1.5, 2.5, 9.5], wrong = 1.5f32;
    char_elements: char => ['a', 'b', 'z'], wrong = "a";
}

#[test]
fn object_array_accepts_any_value() {
    let node = Node::wrap(
        "objects",
        Array::objects(vec![Value::from("a"), Value::Int(1)]),
        common::context(),
    );
    let updated = node.set_child_value(1, Value::Null).unwrap();
    assert_eq!(updated.to_string(), "[a, null]");
    let updated = updated.set_child_value(0, 2.5).unwrap();
    assert_eq!(updated.to_string(), "[2.5, null]");
}

#[test]
fn object_array_checks_component() {
    let strings = Array::objects_of(
        Component::Kind(ValueKind::String),
        vec![Value::from("a"), Value::from("b")],
    );
    let node = Node::wrap("strings", strings, common::context());
    let err = node.set_child_value(0, 1).unwrap_err();
    assert_eq!(err.to_string(), "type mismatch: expected string, got int");
    let updated = node.set_child_value(0, Value::Null).unwrap();
    assert_eq!(updated.to_string(), "[null, b]");
}

#[test]
fn array_set_value_requires_same_element_type() {
    let node = Node::wrap("array", Array::from(vec![1, 2]), common::context());
    let err = node.set_value(Array::from(vec!['a'])).unwrap_err();
    assert_eq!(err.to_string(), "type mismatch: expected int[], got char[]");
    let updated = node.set_value(Array::from(vec![3, 4, 5])).unwrap();
    assert_eq!(updated.children_count().unwrap(), 3);
}

#[test]
fn nested_object_arrays_cascade() {
    let inner = Array::from(vec![1, 2]);
    let outer = Array::objects(vec![Value::from(inner), Value::from("tail")]);
    let root = Node::wrap("outer", outer, common::context());
    let leaf = root.child(0).unwrap().child(1).unwrap();
    let replaced = leaf.set_value(20).unwrap();
    assert_eq!(replaced.root().to_string(), "[[1, 20], tail]");
    assert_eq!(root.to_string(), "[[1, 2], tail]");
    let tail_before = root.child(1).unwrap();
    let tail_after = replaced.root().child(1).unwrap();
    assert_eq!(tail_before, tail_after);
}
