//! Record types shared by the integration tests.

use std::cell::RefCell;
use std::hash::{Hash, Hasher};

use object_tree::{Array, Field, Registry, Result, TreeError, Value};

/// Updated in place: every setter mutates the instance.
#[derive(Debug)]
pub struct MutableParent {
    pub array: RefCell<Array>,
    pub label: RefCell<Value>,
}

impl MutableParent {
    pub fn new(array: impl Into<Array>, label: impl Into<Value>) -> Self {
        Self {
            array: RefCell::new(array.into()),
            label: RefCell::new(label.into()),
        }
    }

    pub fn array(&self) -> Array {
        self.array.borrow().clone()
    }
}

impl PartialEq for MutableParent {
    fn eq(&self, other: &Self) -> bool {
        *self.array.borrow() == *other.array.borrow() && *self.label.borrow() == *other.label.borrow()
    }
}

impl Hash for MutableParent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.array.borrow().hash(state);
        self.label.borrow().hash(state);
    }
}

/// Updated functionally: every setter returns a new instance.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct ImmutableParent {
    pub array: Array,
    pub label: Value,
}

impl ImmutableParent {
    pub fn new(array: impl Into<Array>, label: impl Into<Value>) -> Self {
        Self {
            array: array.into(),
            label: label.into(),
        }
    }
}

/// Never registered, so it has no children.
#[derive(Debug, PartialEq, Hash)]
pub struct Opaque(pub i32);

/// Its only property fails to read.
#[derive(Debug, PartialEq, Hash)]
pub struct Broken;

pub fn register(registry: &mut Registry) {
    registry.register(vec![
        Field::new("array", |p: &MutableParent| Value::Array(p.array()))
            .setter(|p, v| {
                *p.array.borrow_mut() = v.into_array()?;
                Ok(())
            }),
        Field::new("label", |p: &MutableParent| p.label.borrow().clone()).setter(|p, v| {
            *p.label.borrow_mut() = v;
            Ok(())
        }),
    ]);
    registry.register(vec![
        Field::new("array", |p: &ImmutableParent| Value::Array(p.array.clone())).wither(|p, v| {
            Ok(ImmutableParent {
                array: v.into_array()?,
                label: p.label.clone(),
            })
        }),
        Field::new("label", |p: &ImmutableParent| p.label.clone()).wither(|p, v| {
            Ok(ImmutableParent {
                array: p.array.clone(),
                label: v,
            })
        }),
    ]);
    registry.register(vec![Field::fallible("state", |_: &Broken| -> Result<Value> {
        Err(TreeError::property_caused_by(
            "state",
            "getter failed",
            std::io::Error::new(std::io::ErrorKind::Other, "unreadable"),
        ))
    })]);
}

pub fn ints(values: &[i32]) -> Vec<Value> {
    values.iter().copied().map(Value::from).collect()
}
