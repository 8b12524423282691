//! Named record properties.
//!
//! A [`PropertyAccessor`] lists the properties of a record type in a stable
//! order. Each [`Property`] reads a field from an instance and writes one,
//! reporting through [`Assignment`] whether the instance absorbed the write
//! or a new instance must take its place.
//!
//! [`Registry`] is the explicit accessor: schemas are registered per record
//! type from typed [`Field`] descriptors.

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Result, TreeError};
use crate::value::{MapEntry, Record, RecordRef, RecordType, Value};

/// Outcome of writing a property.
#[derive(Clone)]
pub enum Assignment {
    /// The instance was mutated; its owner keeps it.
    InPlace,
    /// The instance is unchanged and this one replaces it.
    Replaced(RecordRef),
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignment::InPlace => f.write_str("InPlace"),
            Assignment::Replaced(r) => f.debug_tuple("Replaced").field(r).finish(),
        }
    }
}

pub trait Property {
    fn name(&self) -> &str;

    fn get(&self, record: &RecordRef) -> Result<Value>;

    fn set(&self, record: &RecordRef, value: Value) -> Result<Assignment>;
}

/// Ordered properties of one record type.
pub type Schema = Rc<[Rc<dyn Property>]>;

/// Discovers the properties of a record type.
pub trait PropertyAccessor {
    fn properties_of(&self, record: &dyn Record) -> Result<Vec<Rc<dyn Property>>>;
}

// ── Typed fields ──────────────────────────────────────────────────────────

type Getter<T> = Box<dyn Fn(&T) -> Result<Value>>;
type Mutator<T> = Box<dyn Fn(&T, Value) -> Result<()>>;
type Wither<T> = Box<dyn Fn(&T, Value) -> Result<T>>;

enum Setter<T> {
    ReadOnly,
    Mutate(Mutator<T>),
    With(Wither<T>),
}

/// A property of record type `T` built from closures.
///
/// ```
/// use object_tree::{Field, Value};
///
/// #[derive(Debug, PartialEq, Hash)]
/// struct Label {
///     text: String,
/// }
///
/// let text = Field::new("text", |l: &Label| Value::from(l.text.as_str()))
///     .wither(|_, v| Ok(Label { text: v.to_string() }));
/// ```
pub struct Field<T> {
    name: Rc<str>,
    getter: Getter<T>,
    setter: Setter<T>,
}

impl<T: Record> Field<T> {
    /// A read-only field.
    pub fn new(name: &str, get: impl Fn(&T) -> Value + 'static) -> Self {
        Self::fallible(name, move |record| Ok(get(record)))
    }

    /// A read-only field whose getter may fail.
    pub fn fallible(name: &str, get: impl Fn(&T) -> Result<Value> + 'static) -> Self {
        Self {
            name: Rc::from(name),
            getter: Box::new(get),
            setter: Setter::ReadOnly,
        }
    }

    /// Writes mutate the instance, which is kept by its owner.
    pub fn setter(mut self, set: impl Fn(&T, Value) -> Result<()> + 'static) -> Self {
        self.setter = Setter::Mutate(Box::new(set));
        self
    }

    /// Writes produce a new instance.
    pub fn wither(mut self, with: impl Fn(&T, Value) -> Result<T> + 'static) -> Self {
        self.setter = Setter::With(Box::new(with));
        self
    }

    fn downcast<'r>(&self, record: &'r RecordRef) -> Result<&'r T> {
        record.as_any().downcast_ref::<T>().ok_or_else(|| {
            TreeError::property(
                &*self.name,
                format!(
                    "expected a {}, got a {}",
                    type_name::<T>(),
                    record.record_type()
                ),
            )
        })
    }
}

impl<T: Record> Property for Field<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, record: &RecordRef) -> Result<Value> {
        (self.getter)(self.downcast(record)?)
    }

    fn set(&self, record: &RecordRef, value: Value) -> Result<Assignment> {
        let target = self.downcast(record)?;
        match &self.setter {
            Setter::ReadOnly => Err(TreeError::property(&*self.name, "read-only property")),
            Setter::Mutate(set) => {
                set(target, value)?;
                Ok(Assignment::InPlace)
            }
            Setter::With(with) => {
                let updated: RecordRef = Rc::new(with(target, value)?);
                Ok(Assignment::Replaced(updated))
            }
        }
    }
}

/// Properties of [`MapEntry`], the value of every map child.
pub fn map_entry_properties() -> Vec<Rc<dyn Property>> {
    let key = Field::new("key", |e: &MapEntry| e.key.clone())
        .wither(|e, key| Ok(MapEntry::new(key, e.value.clone())));
    let value = Field::new("value", |e: &MapEntry| e.value.clone())
        .wither(|e, value| Ok(MapEntry::new(e.key.clone(), value)));
    let key: Rc<dyn Property> = Rc::new(key);
    let value: Rc<dyn Property> = Rc::new(value);
    vec![key, value]
}

// ── Registry ──────────────────────────────────────────────────────────────

/// Explicitly registered record schemas.
///
/// Record types that were never registered have no properties.
#[derive(Default)]
pub struct Registry {
    schemas: HashMap<RecordType, Vec<Rc<dyn Property>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Record>(&mut self, fields: Vec<Field<T>>) -> &mut Self {
        let properties = fields
            .into_iter()
            .map(|f| Rc::new(f) as Rc<dyn Property>)
            .collect();
        self.register_properties(RecordType::of::<T>(), properties)
    }

    /// Registers hand-written properties for `record_type`.
    pub fn register_properties(
        &mut self,
        record_type: RecordType,
        properties: Vec<Rc<dyn Property>>,
    ) -> &mut Self {
        self.schemas.insert(record_type, properties);
        self
    }

    pub fn is_registered(&self, record_type: RecordType) -> bool {
        self.schemas.contains_key(&record_type)
    }
}

impl PropertyAccessor for Registry {
    fn properties_of(&self, record: &dyn Record) -> Result<Vec<Rc<dyn Property>>> {
        Ok(self
            .schemas
            .get(&record.record_type())
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::cell::Cell;

    #[derive(Debug, PartialEq, Hash)]
    struct Point {
        x: i32,
    }

    #[derive(Debug, PartialEq)]
    struct Gauge {
        level: Cell<i32>,
    }

    impl std::hash::Hash for Gauge {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            std::hash::Hash::hash(&self.level.get(), state);
        }
    }

    fn int(value: Value) -> Result<i32> {
        match value {
            Value::Int(n) => Ok(n),
            other => Err(TreeError::type_mismatch("int", other.kind())),
        }
    }

    #[test]
    fn test_setter_is_in_place() {
        let level = Field::new("level", |g: &Gauge| Value::Int(g.level.get()))
            .setter(|g, v| {
                g.level.set(int(v)?);
                Ok(())
            });
        let gauge: RecordRef = Rc::new(Gauge {
            level: Cell::new(1),
        });
        let result = level.set(&gauge, Value::Int(5)).unwrap();
        assert!(matches!(result, Assignment::InPlace));
        assert_eq!(level.get(&gauge).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_wither_replaces() {
        let x = Field::new("x", |p: &Point| Value::Int(p.x)).wither(|_, v| Ok(Point { x: int(v)? }));
        let point: RecordRef = Rc::new(Point { x: 1 });
        match x.set(&point, Value::Int(2)).unwrap() {
            Assignment::Replaced(updated) => {
                assert_eq!(x.get(&updated).unwrap(), Value::Int(2));
                assert_eq!(x.get(&point).unwrap(), Value::Int(1));
            }
            other => panic!("expected replacement, got {other:?}"),
        }
    }

    #[test]
    fn test_read_only() {
        let x = Field::new("x", |p: &Point| Value::Int(p.x));
        let point: RecordRef = Rc::new(Point { x: 1 });
        let err = x.set(&point, Value::Int(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PropertyAccess);
        assert_eq!(err.to_string(), "property \"x\": read-only property");
    }

    #[test]
    fn test_setter_type_mismatch_passes_through() {
        let x = Field::new("x", |p: &Point| Value::Int(p.x)).wither(|_, v| Ok(Point { x: int(v)? }));
        let point: RecordRef = Rc::new(Point { x: 1 });
        let err = x.set(&point, Value::from("one")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_wrong_record_type() {
        let x = Field::new("x", |p: &Point| Value::Int(p.x));
        let gauge: RecordRef = Rc::new(Gauge {
            level: Cell::new(1),
        });
        let err = x.get(&gauge).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PropertyAccess);
    }

    #[test]
    fn test_registry() {
        let mut registry = Registry::new();
        registry.register(vec![Field::new("x", |p: &Point| Value::Int(p.x))]);
        assert!(registry.is_registered(RecordType::of::<Point>()));

        let props = registry.properties_of(&Point { x: 3 }).unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].name(), "x");

        let unknown = registry
            .properties_of(&Gauge {
                level: Cell::new(0),
            })
            .unwrap();
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_map_entry_properties() {
        let props = map_entry_properties();
        let entry: RecordRef = Rc::new(MapEntry::new(Value::from("k"), Value::Int(1)));
        assert_eq!(props[0].get(&entry).unwrap(), Value::from("k"));
        match props[1].set(&entry, Value::Int(2)).unwrap() {
            Assignment::Replaced(updated) => assert_eq!(
                updated.as_any().downcast_ref::<MapEntry>(),
                Some(&MapEntry::new(Value::from("k"), Value::Int(2)))
            ),
            other => panic!("expected replacement, got {other:?}"),
        }
    }
}
