//! Updates and their propagation toward the root.
//!
//! Replacing the value of node N builds N′ and asks N's parent P to integrate
//! the new value at N's index. A record whose property setter mutates the
//! instance absorbs the change: P stays the same node, its children view is
//! cleared and propagation stops. Every other container is rebuilt, P′ is
//! wrapped around the copy and integration continues with P's parent. Nodes
//! of the old tree are left untouched.

use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::{Node, NodeKind};
use crate::error::{Result, TreeError};
use crate::property::Assignment;
use crate::value::{List, MapEntry, RecordRef, Value};

impl Node {
    /// Replaces this node's whole value.
    ///
    /// Null is compatible with every kind; otherwise the new value must have
    /// the same node kind, and arrays the same element type.
    pub fn set_value(&self, value: impl Into<Value>) -> Result<Node> {
        let value = value.into();
        if &value == self.value() {
            return Ok(self.clone());
        }
        check_compatible(self.value(), &value)?;
        self.replace(value)
    }

    /// Rebuilds this node from child nodes.
    ///
    /// Arrays and records write each child at its own index, ignore indices
    /// outside their range and keep the positions nobody supplied. Lists,
    /// sets and maps take exactly the supplied children, in order.
    pub fn set_children(&self, children: &[Node]) -> Result<Node> {
        match self.value() {
            Value::Array(array) => {
                let mut values = array.to_values();
                for child in children {
                    if let Some(slot) = values.get_mut(child.index()) {
                        *slot = child.value().clone();
                    }
                }
                self.update(Value::Array(array.like(&values)?))
            }
            Value::Record(record) => {
                let assignments = children
                    .iter()
                    .map(|child| (child.index(), child.value().clone()));
                self.assign(record, assignments)
            }
            Value::List(_) | Value::Set(_) | Value::Map(_) => {
                self.rebuild(children.iter().map(|c| c.value().clone()).collect())
            }
            _ => Err(self.unsupported()),
        }
    }

    /// Rebuilds this node from values, positionally.
    ///
    /// Arrays take the length of `values`; records write their first
    /// properties and drop extra values. If a record setter fails, the
    /// record keeps the values it had before the call.
    pub fn set_children_values(&self, values: Vec<Value>) -> Result<Node> {
        match self.value() {
            Value::Array(array) => self.update(Value::Array(array.like(&values)?)),
            Value::Record(record) => self.assign(record, values.into_iter().enumerate()),
            Value::List(_) | Value::Set(_) | Value::Map(_) => self.rebuild(values),
            _ => Err(self.unsupported()),
        }
    }

    /// Replaces one child's value and returns the new version of this node.
    ///
    /// An index with no child is ignored.
    pub fn set_child_value(&self, index: usize, value: impl Into<Value>) -> Result<Node> {
        if self.is_leaf() {
            return Err(self.unsupported());
        }
        let value = value.into();
        match self.child_entry(index) {
            Ok((_, current)) if current == value => return Ok(self.clone()),
            Err(TreeError::IndexOutOfRange { .. }) => return Ok(self.clone()),
            Err(err) => return Err(err),
            Ok(_) => {}
        }
        let (node, _) = self.integrate(index, &value)?;
        Ok(node)
    }

    /// Wraps `value` at this node's position and hooks it into the updated
    /// parent.
    fn replace(&self, value: Value) -> Result<Node> {
        let Some(parent) = self.parent() else {
            trace!(name = %self.name(), "new root");
            return Ok(Node::build(
                self.name().clone(),
                value,
                self.index(),
                None,
                self.context().clone(),
            ));
        };
        let (parent, index) = parent.integrate(self.index(), &value)?;
        Ok(parent.adopt(self.name().clone(), index, value))
    }

    /// Same node when nothing changed, otherwise a replacement.
    fn update(&self, value: Value) -> Result<Node> {
        if &value == self.value() {
            Ok(self.clone())
        } else {
            self.replace(value)
        }
    }

    /// Writes `value` at child position `index`.
    ///
    /// Returns the node that now holds the child, and the position the child
    /// ended up at (sets and maps may reorder).
    fn integrate(&self, index: usize, value: &Value) -> Result<(Node, usize)> {
        trace!(parent = %self.name(), index, "integrating child");
        match self.value() {
            Value::Array(array) => match array.with_element(index, value)? {
                Some(copy) => Ok((self.replace(Value::Array(copy))?, index)),
                None => Ok((self.clone(), index)),
            },
            Value::List(list) => match list.with_element(index, value.clone()) {
                Some(copy) => Ok((self.replace(Value::List(copy))?, index)),
                None => Ok((self.clone(), index)),
            },
            Value::Set(set) => {
                let mut values = self.children_values()?;
                let Some(slot) = values.get_mut(index) else {
                    return Ok((self.clone(), index));
                };
                *slot = value.clone();
                let copy = self.context().create_set(set);
                for v in values {
                    copy.insert(v);
                }
                let position = copy.position(value).unwrap_or(index);
                Ok((self.replace(Value::Set(copy))?, position))
            }
            Value::Map(map) => {
                let replacement = entry_of(value)?;
                let mut entries = map.entries();
                let Some(slot) = entries.get_mut(index) else {
                    return Ok((self.clone(), index));
                };
                *slot = replacement.clone();
                let copy = self.context().create_map(map);
                for entry in entries {
                    copy.insert(entry.key, entry.value);
                }
                let position = copy.position(&replacement.key).unwrap_or(index);
                Ok((self.replace(Value::Map(copy))?, position))
            }
            Value::Record(record) => {
                let schema = self.schema(record)?;
                let Some(property) = schema.get(index) else {
                    return Ok((self.clone(), index));
                };
                match property.set(record, value.clone())? {
                    Assignment::Replaced(updated) if !Rc::ptr_eq(&updated, record) => {
                        Ok((self.replace(Value::Record(updated))?, index))
                    }
                    _ => {
                        debug!(
                            parent = %self.name(),
                            property = property.name(),
                            "absorbed in place"
                        );
                        self.0.view.borrow_mut().clear();
                        Ok((self.clone(), index))
                    }
                }
            }
            _ => Err(self.unsupported()),
        }
    }

    /// Applies `(position, value)` writes to a record in order.
    ///
    /// When a setter fails, the properties already written in place are set
    /// back to their previous values before the error is returned.
    fn assign(
        &self,
        record: &RecordRef,
        assignments: impl Iterator<Item = (usize, Value)>,
    ) -> Result<Node> {
        let schema = self.schema(record)?;
        let mut current = record.clone();
        let mut undo = Vec::new();
        for (index, value) in assignments {
            let Some(property) = schema.get(index) else {
                continue;
            };
            let previous = if Rc::ptr_eq(&current, record) {
                Some(property.get(&current)?)
            } else {
                None
            };
            match property.set(&current, value) {
                Ok(Assignment::Replaced(updated)) if !Rc::ptr_eq(&updated, &current) => {
                    current = updated;
                }
                Ok(_) => {
                    if let Some(previous) = previous {
                        undo.push((property, previous));
                    }
                }
                Err(err) => {
                    for (property, previous) in undo.into_iter().rev() {
                        if let Err(restore) = property.set(record, previous) {
                            warn!(property = property.name(), error = %restore, "restore failed");
                        }
                    }
                    self.0.view.borrow_mut().clear();
                    return Err(err);
                }
            }
        }
        if Rc::ptr_eq(&current, record) {
            debug!(name = %self.name(), "children absorbed in place");
            self.0.view.borrow_mut().clear();
            return Ok(self.clone());
        }
        self.update(Value::Record(current))
    }

    /// New list, set or map of the same kind holding exactly `values`.
    fn rebuild(&self, values: Vec<Value>) -> Result<Node> {
        let rebuilt = match self.value() {
            Value::List(_) => Value::List(List::from(values)),
            Value::Set(set) => {
                let copy = self.context().create_set(set);
                for v in values {
                    copy.insert(v);
                }
                Value::Set(copy)
            }
            Value::Map(map) => {
                let copy = self.context().create_map(map);
                for v in &values {
                    let entry = entry_of(v)?;
                    copy.insert(entry.key, entry.value);
                }
                Value::Map(copy)
            }
            _ => return Err(self.unsupported()),
        };
        self.update(rebuilt)
    }

    fn unsupported(&self) -> TreeError {
        TreeError::UnsupportedOperation(format!("{} node {}", self.kind(), self.name()))
    }
}

fn entry_of(value: &Value) -> Result<MapEntry> {
    value
        .downcast_record::<MapEntry>()
        .cloned()
        .ok_or_else(|| TreeError::type_mismatch("map entry", value.kind()))
}

fn check_compatible(current: &Value, value: &Value) -> Result<()> {
    if current.is_null() || value.is_null() {
        return Ok(());
    }
    let compatible = match (current, value) {
        (Value::Array(a), Value::Array(b)) => a.same_element_kind(b),
        (a, b) => NodeKind::of(a) == NodeKind::of(b),
    };
    if compatible {
        Ok(())
    } else {
        Err(TreeError::type_mismatch(describe(current), describe(value)))
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Array(array) => array.describe(),
        other => other.kind().to_string(),
    }
}
