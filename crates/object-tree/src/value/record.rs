//! Structured records: user types exposed through named properties.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Shared handle to a record instance.
pub type RecordRef = Rc<dyn Record>;

/// Identity of a concrete record type, used to key schema caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordType {
    id: TypeId,
    name: &'static str,
}

impl RecordType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A value with named fields.
///
/// Implemented for every `Any + Debug + PartialEq + Hash` type. Records that
/// are updated in place keep their fields behind interior mutability and
/// implement `PartialEq`/`Hash` over the current field contents.
pub trait Record: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn record_type(&self) -> RecordType;

    /// Equality using the concrete type's own `PartialEq`.
    fn eq_record(&self, other: &dyn Record) -> bool;

    fn hash_record(&self, state: &mut dyn Hasher);
}

impl<T> Record for T
where
    T: Any + fmt::Debug + PartialEq + Hash,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn record_type(&self) -> RecordType {
        RecordType::of::<T>()
    }

    fn eq_record(&self, other: &dyn Record) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn hash_record(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }
}
