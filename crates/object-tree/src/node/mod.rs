//! Tree nodes over dynamic values.
//!
//! A [`Node`] is an immutable snapshot of one value at one position: its name,
//! its index among its siblings, its parent and the shared context. Children
//! are wrapped lazily on descent. Updates never modify an existing node; they
//! return the node at the same position in the updated tree (see
//! [`replace`](self::replace)).

mod children;
mod replace;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use children::ChildrenView;

use crate::context::ContextRef;
use crate::error::{Result, TreeError};
use crate::name::Name;
use crate::property::Schema;
use crate::value::{RecordRef, Set, Value};

/// Structural category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Null and every scalar.
    Leaf,
    Array,
    List,
    Set,
    Map,
    Record,
}

impl NodeKind {
    pub fn of(value: &Value) -> NodeKind {
        match value {
            Value::Array(_) => NodeKind::Array,
            Value::List(_) => NodeKind::List,
            Value::Set(_) => NodeKind::Set,
            Value::Map(_) => NodeKind::Map,
            Value::Record(_) => NodeKind::Record,
            _ => NodeKind::Leaf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Leaf => "leaf",
            NodeKind::Array => "array",
            NodeKind::List => "list",
            NodeKind::Set => "set",
            NodeKind::Map => "map",
            NodeKind::Record => "record",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) struct NodeInner {
    name: Name,
    value: Value,
    index: usize,
    parent: Option<Node>,
    context: ContextRef,
    view: RefCell<ChildrenView>,
}

/// One value at one position of a tree. Cloning shares the node.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

impl Node {
    /// Wraps `value` as the root of a new tree.
    pub fn wrap(name: impl Into<Name>, value: impl Into<Value>, context: ContextRef) -> Node {
        Node::build(name.into(), value.into(), 0, None, context)
    }

    fn build(
        name: Name,
        value: Value,
        index: usize,
        parent: Option<Node>,
        context: ContextRef,
    ) -> Node {
        Node(Rc::new(NodeInner {
            name,
            value,
            index,
            parent,
            context,
            view: RefCell::new(ChildrenView::default()),
        }))
    }

    /// A parentless node sharing this node's context, positioned for
    /// [`set_children`](Node::set_children).
    ///
    /// An index name positions the node at that index; a property name
    /// positions it at that property of this record. A property this node
    /// does not have lands past every child, so `set_children` drops it.
    pub fn create_node(&self, name: impl Into<Name>, value: impl Into<Value>) -> Result<Node> {
        let name = name.into();
        let index = match &name {
            Name::Index(i) => *i,
            Name::Property(p) => self.property_position(p)?.unwrap_or(usize::MAX),
        };
        Ok(Node::build(
            name,
            value.into(),
            index,
            None,
            self.0.context.clone(),
        ))
    }

    pub fn name(&self) -> &Name {
        &self.0.name
    }

    pub fn value(&self) -> &Value {
        &self.0.value
    }

    /// Position among siblings, 0 for a root.
    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::of(&self.0.value)
    }

    pub fn is_leaf(&self) -> bool {
        self.kind() == NodeKind::Leaf
    }

    pub fn parent(&self) -> Option<&Node> {
        self.0.parent.as_ref()
    }

    pub fn parent_or_fail(&self) -> Result<&Node> {
        self.parent()
            .ok_or_else(|| TreeError::NoParent(self.0.name.to_string()))
    }

    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    pub fn root(&self) -> Node {
        let mut node = self;
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node.clone()
    }

    pub fn context(&self) -> &ContextRef {
        &self.0.context
    }

    /// Nodes carry no attributes.
    pub fn attributes(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// True when both handles are the same node.
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    fn downgrade(node: &Node) -> Weak<NodeInner> {
        Rc::downgrade(&node.0)
    }

    // ── Descent ───────────────────────────────────────────────────────────

    pub fn children_count(&self) -> Result<usize> {
        Ok(match &self.0.value {
            Value::Array(array) => array.len(),
            Value::List(list) => list.len(),
            Value::Set(set) => set.len(),
            Value::Map(map) => map.len(),
            Value::Record(record) => self.schema(record)?.len(),
            _ => 0,
        })
    }

    /// Wrapped child at `index`.
    pub fn child(&self, index: usize) -> Result<Node> {
        // Drawing first drops nodes remembered from before a set changed.
        let drawn = match &self.0.value {
            Value::Set(set) => Some(self.draw_set(set, index)?),
            _ => None,
        };
        if let Some(node) = self.0.view.borrow().cached(index) {
            return Ok(node);
        }
        let (name, value) = match drawn {
            Some(value) => (Name::Index(index), value),
            None => self.child_entry(index)?,
        };
        Ok(self.adopt(name, index, value))
    }

    /// Child addressed by name: a property of a record, or a position of any
    /// container. `None` when there is no such child.
    pub fn child_named(&self, name: &Name) -> Result<Option<Node>> {
        let index = match name {
            Name::Index(i) => {
                if *i >= self.children_count()? {
                    return Ok(None);
                }
                *i
            }
            Name::Property(p) => match self.property_position(p)? {
                Some(i) => i,
                None => return Ok(None),
            },
        };
        self.child(index).map(Some)
    }

    pub fn children(&self) -> Result<Vec<Node>> {
        (0..self.children_count()?).map(|i| self.child(i)).collect()
    }

    pub fn children_values(&self) -> Result<Vec<Value>> {
        match &self.0.value {
            Value::Array(array) => Ok(array.to_values()),
            Value::List(list) => Ok(list.to_vec()),
            Value::Set(_) => self.drawn_set_values(),
            Value::Map(map) => Ok(map.entries().into_iter().map(Value::record).collect()),
            Value::Record(record) => self
                .schema(record)?
                .iter()
                .map(|p| p.get(record))
                .collect(),
            _ => Ok(Vec::new()),
        }
    }

    /// Name and current value of the child at `index`.
    fn child_entry(&self, index: usize) -> Result<(Name, Value)> {
        let out_of_range = |size| TreeError::IndexOutOfRange { index, size };
        let value = match &self.0.value {
            Value::Array(array) => array.get(index).ok_or_else(|| out_of_range(array.len()))?,
            Value::List(list) => list
                .get(index)
                .cloned()
                .ok_or_else(|| out_of_range(list.len()))?,
            Value::Set(set) => self.draw_set(set, index)?,
            Value::Map(map) => map
                .entry_at(index)
                .map(Value::record)
                .ok_or_else(|| out_of_range(map.len()))?,
            Value::Record(record) => {
                let schema = self.schema(record)?;
                let property = schema.get(index).ok_or_else(|| out_of_range(schema.len()))?;
                let value = property.get(record)?;
                return Ok((Name::property(property.name()), value));
            }
            _ => return Err(out_of_range(0)),
        };
        Ok((Name::Index(index), value))
    }

    /// Wraps a child of this node and remembers it.
    fn adopt(&self, name: Name, index: usize, value: Value) -> Node {
        let node = Node::build(
            name,
            value,
            index,
            Some(self.clone()),
            self.0.context.clone(),
        );
        if self.0.context.options().cache_children {
            self.0.view.borrow_mut().remember(index, &node);
        }
        node
    }

    fn schema(&self, record: &RecordRef) -> Result<Schema> {
        self.0.context.properties(record)
    }

    fn property_position(&self, property: &str) -> Result<Option<usize>> {
        match &self.0.value {
            Value::Record(record) => Ok(self
                .schema(record)?
                .iter()
                .position(|p| p.name() == property)),
            _ => Ok(None),
        }
    }

    fn draw_set(&self, set: &Set, index: usize) -> Result<Value> {
        let retries = self.0.context.options().set_retries;
        self.0.view.borrow_mut().draw(index, set, retries)
    }

    fn drawn_set_values(&self) -> Result<Vec<Value>> {
        let retries = self.0.context.options().set_retries;
        match &self.0.value {
            Value::Set(set) => self.0.view.borrow_mut().draw_all(set, retries),
            _ => Ok(Vec::new()),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value().hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.value(), f)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.0.name)
            .field("index", &self.0.index)
            .field("kind", &self.kind())
            .field("value", &self.0.value)
            .finish()
    }
}
