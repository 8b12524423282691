//! Navigable, structurally shared trees over in-memory object graphs.
//!
//! A [`Node`] wraps a [`Value`] (a scalar, an array, a list, a set, a map or a
//! record with named properties) and exposes it as a tree: children are
//! addressed by index or property name and wrapped lazily on descent.
//!
//! Updates are copy-on-write. Replacing a node's value rebuilds only the path
//! from that node to the root; every other subtree is shared with the old
//! tree, and old nodes keep showing the old values. A record whose property
//! setter mutates the instance stops the rebuild at that record.
//!
//! # Example
//!
//! ```
//! use object_tree::{Array, Context, Field, Node, Registry, Value};
//!
//! #[derive(Debug, PartialEq, Hash)]
//! struct Sample {
//!     values: Array,
//! }
//!
//! let mut registry = Registry::new();
//! registry.register(vec![
//!     Field::new("values", |s: &Sample| Value::Array(s.values.clone()))
//!         .wither(|_, v| Ok(Sample { values: v.into_array()? })),
//! ]);
//! let context = Context::new(registry).shared();
//!
//! let root = Node::wrap("root", Value::record(Sample { values: Array::from(vec![1, 2]) }), context);
//! let values = root.child(0).unwrap();
//! let updated = values.set_child_value(1, 9).unwrap();
//!
//! assert_eq!(updated.to_string(), "[1, 9]");
//! assert_eq!(values.to_string(), "[1, 2]");
//! assert!(updated.parent().unwrap().is_root());
//! ```

pub mod context;
pub mod error;
pub mod name;
pub mod node;
pub mod options;
pub mod property;
pub mod value;

pub use context::{Context, ContextRef, NodeContext};
pub use error::{ErrorKind, Result, TreeError};
pub use name::Name;
pub use node::{Node, NodeKind};
pub use options::TreeOptions;
pub use property::{Assignment, Field, Property, PropertyAccessor, Registry, Schema};
pub use value::{
    Array, CollectionKind, Component, List, Map, MapEntry, Record, RecordRef, RecordType, Set,
    Value, ValueKind,
};
