//! Lists, sets and maps.
//!
//! A [`List`] is an immutable ordered sequence. [`Set`] and [`Map`] are
//! shared, mutable containers: clones alias the same storage. Every
//! structural change to a set bumps a modification counter so that an
//! in-progress traversal can notice that it was interfered with.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use super::{fmt_seq, Value};

/// Iteration order of a set or map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollectionKind {
    /// Insertion order.
    #[default]
    Linked,
    /// Ascending [`Value::natural_cmp`] order.
    Sorted,
}

// ── List ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct List(Rc<[Value]>);

impl List {
    pub fn new(values: Vec<Value>) -> Self {
        Self(Rc::from(values))
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Copy with the element at `index` replaced, `None` if out of range.
    pub fn with_element(&self, index: usize, value: Value) -> Option<List> {
        if index >= self.0.len() {
            return None;
        }
        let mut copy = self.0.to_vec();
        copy[index] = value;
        Some(List::new(copy))
    }
}

impl Deref for List {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for List {
    fn from(values: Vec<Value>) -> Self {
        List::new(values)
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        List::new(iter.into_iter().collect())
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_seq(f, self.0.iter())
    }
}

// ── Set ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct SetStore {
    kind: CollectionKind,
    elements: IndexSet<Value>,
    modifications: u64,
}

/// Signals that a set changed after a traversal started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interference;

#[derive(Clone, Debug)]
pub struct Set(Rc<RefCell<SetStore>>);

impl Set {
    pub fn new(kind: CollectionKind) -> Self {
        Self(Rc::new(RefCell::new(SetStore {
            kind,
            elements: IndexSet::new(),
            modifications: 0,
        })))
    }

    pub fn linked() -> Self {
        Self::new(CollectionKind::Linked)
    }

    pub fn sorted() -> Self {
        Self::new(CollectionKind::Sorted)
    }

    pub fn kind(&self) -> CollectionKind {
        self.0.borrow().kind
    }

    pub fn len(&self) -> usize {
        self.0.borrow().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.0.borrow().elements.contains(value)
    }

    /// Adds `value`, returning false if it was already present.
    pub fn insert(&self, value: Value) -> bool {
        let mut store = self.0.borrow_mut();
        let added = match store.kind {
            CollectionKind::Linked => store.elements.insert(value),
            CollectionKind::Sorted if store.elements.contains(&value) => false,
            CollectionKind::Sorted => {
                let at = store
                    .elements
                    .partition_point(|e| e.natural_cmp(&value) != Ordering::Greater);
                store.elements.shift_insert(at, value)
            }
        };
        if added {
            store.modifications += 1;
        }
        added
    }

    pub fn remove(&self, value: &Value) -> bool {
        let mut store = self.0.borrow_mut();
        let removed = store.elements.shift_remove(value);
        if removed {
            store.modifications += 1;
        }
        removed
    }

    pub fn clear(&self) {
        let mut store = self.0.borrow_mut();
        if !store.elements.is_empty() {
            store.elements.clear();
            store.modifications += 1;
        }
    }

    /// Position of `value` in iteration order.
    pub fn position(&self, value: &Value) -> Option<usize> {
        self.0.borrow().elements.get_index_of(value)
    }

    /// Elements in iteration order.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().elements.iter().cloned().collect()
    }

    /// True when both handles share the same storage.
    pub fn ptr_eq(&self, other: &Set) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Starts a traversal; the returned stamp identifies the current contents.
    pub fn stamp(&self) -> u64 {
        self.0.borrow().modifications
    }

    /// Element at `position` of a traversal started with `stamp`.
    ///
    /// `Ok(None)` marks the end of the set.
    pub fn draw(&self, position: usize, stamp: u64) -> Result<Option<Value>, Interference> {
        let store = self.0.borrow();
        if store.modifications != stamp {
            return Err(Interference);
        }
        Ok(store.elements.get_index(position).cloned())
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.borrow().elements == other.0.borrow().elements
    }
}

impl Eq for Set {}

impl Hash for Set {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let store = self.0.borrow();
        state.write_u64(unordered_hash(store.elements.iter()));
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_seq(f, self.to_vec())
    }
}

impl FromIterator<Value> for Set {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let set = Set::linked();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

// ── Map ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct MapStore {
    kind: CollectionKind,
    entries: IndexMap<Value, Value>,
}

#[derive(Clone, Debug)]
pub struct Map(Rc<RefCell<MapStore>>);

impl Map {
    pub fn new(kind: CollectionKind) -> Self {
        Self(Rc::new(RefCell::new(MapStore {
            kind,
            entries: IndexMap::new(),
        })))
    }

    pub fn linked() -> Self {
        Self::new(CollectionKind::Linked)
    }

    pub fn sorted() -> Self {
        Self::new(CollectionKind::Sorted)
    }

    pub fn kind(&self) -> CollectionKind {
        self.0.borrow().kind
    }

    pub fn len(&self) -> usize {
        self.0.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.0.borrow().entries.get(key).cloned()
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn insert(&self, key: Value, value: Value) -> Option<Value> {
        let mut store = self.0.borrow_mut();
        if store.kind == CollectionKind::Linked || store.entries.contains_key(&key) {
            return store.entries.insert(key, value);
        }
        let at = store
            .entries
            .partition_point(|k, _| k.natural_cmp(&key) != Ordering::Greater);
        store.entries.shift_insert(at, key, value)
    }

    pub fn remove(&self, key: &Value) -> Option<Value> {
        self.0.borrow_mut().entries.shift_remove(key)
    }

    /// Position of `key` in iteration order.
    pub fn position(&self, key: &Value) -> Option<usize> {
        self.0.borrow().entries.get_index_of(key)
    }

    /// Entry at `position` in iteration order.
    pub fn entry_at(&self, position: usize) -> Option<MapEntry> {
        self.0
            .borrow()
            .entries
            .get_index(position)
            .map(|(k, v)| MapEntry::new(k.clone(), v.clone()))
    }

    /// Entries in iteration order.
    pub fn entries(&self) -> Vec<MapEntry> {
        self.0
            .borrow()
            .entries
            .iter()
            .map(|(k, v)| MapEntry::new(k.clone(), v.clone()))
            .collect()
    }

    pub fn ptr_eq(&self, other: &Map) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.borrow().entries == other.0.borrow().entries
    }
}

impl Eq for Map {}

impl Hash for Map {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let store = self.0.borrow();
        state.write_u64(unordered_hash(store.entries.iter()));
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, entry) in self.entries().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{entry}")?;
        }
        f.write_str("}")
    }
}

impl FromIterator<(Value, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let map = Map::linked();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// One key/value pair of a map, exposed as the value of a map child node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapEntry {
    pub key: Value,
    pub value: Value,
}

impl MapEntry {
    pub fn new(key: Value, value: Value) -> Self {
        Self { key, value }
    }
}

impl fmt::Display for MapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Order-independent hash: the wrapping sum of each element's own hash.
fn unordered_hash<I, T>(items: I) -> u64
where
    I: Iterator<Item = T>,
    T: Hash,
{
    items.fold(0u64, |sum, item| {
        let mut hasher = DefaultHasher::new();
        item.hash(&mut hasher);
        sum.wrapping_add(hasher.finish())
    })
}
