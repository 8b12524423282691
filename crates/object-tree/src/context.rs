//! The environment shared by every node of a tree.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::error::Result;
use crate::options::TreeOptions;
use crate::property::{map_entry_properties, PropertyAccessor, Schema};
use crate::value::{Map, MapEntry, RecordRef, RecordType, Set};

/// Services the nodes of a tree need from their surroundings.
pub trait NodeContext {
    /// An empty set of the same kind as `like`.
    fn create_set(&self, like: &Set) -> Set {
        Set::new(like.kind())
    }

    /// An empty map of the same kind as `like`.
    fn create_map(&self, like: &Map) -> Map {
        Map::new(like.kind())
    }

    /// Ordered properties of the record's type.
    fn properties(&self, record: &RecordRef) -> Result<Schema>;

    fn options(&self) -> &TreeOptions;
}

pub type ContextRef = Rc<dyn NodeContext>;

/// Default context: asks an accessor for each record type once and keeps the
/// answer.
pub struct Context<A> {
    accessor: A,
    options: TreeOptions,
    schemas: RefCell<HashMap<RecordType, Schema>>,
}

impl<A: PropertyAccessor> Context<A> {
    pub fn new(accessor: A) -> Self {
        Self::with_options(accessor, TreeOptions::default())
    }

    pub fn with_options(accessor: A, options: TreeOptions) -> Self {
        let mut schemas = HashMap::new();
        schemas.insert(
            RecordType::of::<MapEntry>(),
            Schema::from(map_entry_properties()),
        );
        Self {
            accessor,
            options,
            schemas: RefCell::new(schemas),
        }
    }

    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    /// Shares this context as the context of a tree.
    pub fn shared(self) -> ContextRef
    where
        A: 'static,
    {
        Rc::new(self)
    }
}

impl<A: PropertyAccessor> NodeContext for Context<A> {
    fn properties(&self, record: &RecordRef) -> Result<Schema> {
        let record_type = record.record_type();
        if let Some(schema) = self.schemas.borrow().get(&record_type) {
            return Ok(schema.clone());
        }
        let schema = Schema::from(self.accessor.properties_of(&**record)?);
        debug!(
            record = %record_type,
            properties = schema.len(),
            "discovered record schema"
        );
        self.schemas
            .borrow_mut()
            .insert(record_type, schema.clone());
        Ok(schema)
    }

    fn options(&self) -> &TreeOptions {
        &self.options
    }
}
