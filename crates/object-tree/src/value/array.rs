//! Fixed-size arrays and the element-kind strategy behind the array node.
//!
//! Every primitive element type (and the object element type) is handled by
//! one [`ElementKind`] implementation. Operations that must work on "any
//! array" are written once as an [`ArrayOp`] and dispatched by
//! [`Array::visit`], instead of once per element type.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::{fmt_seq, Value, ValueKind};
use crate::error::{Result, TreeError};

/// Element type of an object array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// Accepts any value.
    Any,
    /// Accepts values of one kind, plus null.
    Kind(ValueKind),
}

impl Component {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Component::Any => true,
            Component::Kind(kind) => value.is_null() || value.kind() == *kind,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Any => f.write_str("any"),
            Component::Kind(kind) => fmt::Display::fmt(kind, f),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Array {
    Bool(Rc<[bool]>),
    Byte(Rc<[i8]>),
    Short(Rc<[i16]>),
    Int(Rc<[i32]>),
    Long(Rc<[i64]>),
    Float(Rc<[f32]>),
    Double(Rc<[f64]>),
    Char(Rc<[char]>),
    Object {
        component: Component,
        elements: Rc<[Value]>,
    },
}

// ── Element-kind strategy ─────────────────────────────────────────────────

/// Strategy describing one array element type.
pub trait ElementKind {
    type Element: Clone;

    /// Name used in type-mismatch messages, e.g. `int[]`.
    fn describe(&self) -> String;

    /// Builds an array of this kind from its elements.
    fn create(&self, elements: Vec<Self::Element>) -> Array;

    /// Converts an element to the uniform value representation.
    fn boxed(&self, element: &Self::Element) -> Value;

    /// Converts a value back to an element, failing on a foreign shape.
    fn unbox(&self, value: &Value) -> Result<Self::Element>;

    /// Boxed element at `index`.
    fn get(&self, elements: &[Self::Element], index: usize) -> Option<Value> {
        elements.get(index).map(|e| self.boxed(e))
    }

    fn count(&self, elements: &[Self::Element]) -> usize {
        elements.len()
    }

    /// Copies `elements` with the element at `index` replaced.
    ///
    /// Returns `Ok(None)` when `index` is outside the array.
    fn with_element(
        &self,
        elements: &[Self::Element],
        index: usize,
        value: &Value,
    ) -> Result<Option<Array>> {
        if index >= elements.len() {
            return Ok(None);
        }
        let mut copy = elements.to_vec();
        copy[index] = self.unbox(value)?;
        Ok(Some(self.create(copy)))
    }

    /// Allocates an array sized to `values` and fills it positionally.
    fn from_values(&self, values: &[Value]) -> Result<Array> {
        let elements = values
            .iter()
            .map(|v| self.unbox(v))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.create(elements))
    }
}

macro_rules! primitive_kind {
    ($name:ident, $ty:ty, $variant:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl ElementKind for $name {
            type Element = $ty;

            fn describe(&self) -> String {
                concat!($label, "[]").to_string()
            }

            fn create(&self, elements: Vec<$ty>) -> Array {
                Array::$variant(Rc::from(elements))
            }

            fn boxed(&self, element: &$ty) -> Value {
                Value::$variant(*element)
            }

            fn unbox(&self, value: &Value) -> Result<$ty> {
                match value {
                    Value::$variant(v) => Ok(*v),
                    other => Err(TreeError::type_mismatch($label, other.kind())),
                }
            }
        }
    };
}

primitive_kind!(BoolElements, bool, Bool, "bool");
primitive_kind!(ByteElements, i8, Byte, "byte");
primitive_kind!(ShortElements, i16, Short, "short");
primitive_kind!(IntElements, i32, Int, "int");
primitive_kind!(LongElements, i64, Long, "long");
primitive_kind!(FloatElements, f32, Float, "float");
primitive_kind!(DoubleElements, f64, Double, "double");
primitive_kind!(CharElements, char, Char, "char");

/// Object elements, constrained by the array's component.
#[derive(Debug, Clone, Copy)]
pub struct ObjectElements {
    pub component: Component,
}

impl ElementKind for ObjectElements {
    type Element = Value;

    fn describe(&self) -> String {
        format!("{}[]", self.component)
    }

    fn create(&self, elements: Vec<Value>) -> Array {
        Array::Object {
            component: self.component,
            elements: Rc::from(elements),
        }
    }

    fn boxed(&self, element: &Value) -> Value {
        element.clone()
    }

    fn unbox(&self, value: &Value) -> Result<Value> {
        if self.component.accepts(value) {
            Ok(value.clone())
        } else {
            Err(TreeError::type_mismatch(self.component, value.kind()))
        }
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────

/// An operation written once for every element kind.
pub trait ArrayOp {
    type Output;

    fn apply<K: ElementKind>(self, kind: &K, elements: &[K::Element]) -> Self::Output;
}

impl Array {
    /// Runs `op` against this array's element kind and elements.
    pub fn visit<O: ArrayOp>(&self, op: O) -> O::Output {
        match self {
            Array::Bool(e) => op.apply(&BoolElements, &e[..]),
            Array::Byte(e) => op.apply(&ByteElements, &e[..]),
            Array::Short(e) => op.apply(&ShortElements, &e[..]),
            Array::Int(e) => op.apply(&IntElements, &e[..]),
            Array::Long(e) => op.apply(&LongElements, &e[..]),
            Array::Float(e) => op.apply(&FloatElements, &e[..]),
            Array::Double(e) => op.apply(&DoubleElements, &e[..]),
            Array::Char(e) => op.apply(&CharElements, &e[..]),
            Array::Object {
                component,
                elements,
            } => op.apply(
                &ObjectElements {
                    component: *component,
                },
                &elements[..],
            ),
        }
    }

    /// An object array accepting any value.
    pub fn objects(values: Vec<Value>) -> Array {
        Self::objects_of(Component::Any, values)
    }

    pub fn objects_of(component: Component, values: Vec<Value>) -> Array {
        Array::Object {
            component,
            elements: Rc::from(values),
        }
    }

    pub fn len(&self) -> usize {
        struct Len;
        impl ArrayOp for Len {
            type Output = usize;
            fn apply<K: ElementKind>(self, kind: &K, elements: &[K::Element]) -> usize {
                kind.count(elements)
            }
        }
        self.visit(Len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boxed element at `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        struct Get(usize);
        impl ArrayOp for Get {
            type Output = Option<Value>;
            fn apply<K: ElementKind>(self, kind: &K, elements: &[K::Element]) -> Option<Value> {
                kind.get(elements, self.0)
            }
        }
        self.visit(Get(index))
    }

    /// Every element, boxed.
    pub fn to_values(&self) -> Vec<Value> {
        struct Boxed;
        impl ArrayOp for Boxed {
            type Output = Vec<Value>;
            fn apply<K: ElementKind>(self, kind: &K, elements: &[K::Element]) -> Vec<Value> {
                elements.iter().map(|e| kind.boxed(e)).collect()
            }
        }
        self.visit(Boxed)
    }

    /// Copy of this array with one element replaced, `None` if out of range.
    pub fn with_element(&self, index: usize, value: &Value) -> Result<Option<Array>> {
        struct With<'v>(usize, &'v Value);
        impl ArrayOp for With<'_> {
            type Output = Result<Option<Array>>;
            fn apply<K: ElementKind>(self, kind: &K, elements: &[K::Element]) -> Self::Output {
                kind.with_element(elements, self.0, self.1)
            }
        }
        self.visit(With(index, value))
    }

    /// New array of the same element kind holding `values`.
    pub fn like(&self, values: &[Value]) -> Result<Array> {
        struct Like<'v>(&'v [Value]);
        impl ArrayOp for Like<'_> {
            type Output = Result<Array>;
            fn apply<K: ElementKind>(self, kind: &K, _elements: &[K::Element]) -> Self::Output {
                kind.from_values(self.0)
            }
        }
        self.visit(Like(values))
    }

    /// Element type label such as `int[]` or `string[]`.
    pub fn describe(&self) -> String {
        struct Describe;
        impl ArrayOp for Describe {
            type Output = String;
            fn apply<K: ElementKind>(self, kind: &K, _elements: &[K::Element]) -> String {
                kind.describe()
            }
        }
        self.visit(Describe)
    }

    /// True when both arrays hold the same element type.
    pub fn same_element_kind(&self, other: &Array) -> bool {
        match (self, other) {
            (Array::Object { component: a, .. }, Array::Object { component: b, .. }) => a == b,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Array::Bool(a), Array::Bool(b)) => a == b,
            (Array::Byte(a), Array::Byte(b)) => a == b,
            (Array::Short(a), Array::Short(b)) => a == b,
            (Array::Int(a), Array::Int(b)) => a == b,
            (Array::Long(a), Array::Long(b)) => a == b,
            (Array::Float(a), Array::Float(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Array::Double(a), Array::Double(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Array::Char(a), Array::Char(b)) => a == b,
            (Array::Object { elements: a, .. }, Array::Object { elements: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Array {}

impl Hash for Array {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Array::Bool(e) => e.hash(state),
            Array::Byte(e) => e.hash(state),
            Array::Short(e) => e.hash(state),
            Array::Int(e) => e.hash(state),
            Array::Long(e) => e.hash(state),
            Array::Float(e) => e.iter().for_each(|x| x.to_bits().hash(state)),
            Array::Double(e) => e.iter().for_each(|x| x.to_bits().hash(state)),
            Array::Char(e) => e.hash(state),
            Array::Object { elements, .. } => elements.hash(state),
        }
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_seq(f, self.to_values())
    }
}

macro_rules! array_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for Array {
                fn from(v: Vec<$ty>) -> Self {
                    Array::$variant(Rc::from(v))
                }
            }

            impl From<&[$ty]> for Array {
                fn from(v: &[$ty]) -> Self {
                    Array::$variant(Rc::from(v))
                }
            }
        )*
    };
}

array_from! {
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
}

impl From<Vec<Value>> for Array {
    fn from(v: Vec<Value>) -> Self {
        Array::objects(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_len_and_get() {
        let array = Array::from(vec![1i8, 2, 127]);
        assert_eq!(array.len(), 3);
        assert_eq!(array.get(2), Some(Value::Byte(127)));
        assert_eq!(array.get(3), None);
    }

    #[test]
    fn test_with_element_copies() {
        let array = Array::from(vec![1i64, 2]);
        let updated = array.with_element(0, &Value::Long(9)).unwrap().unwrap();
        assert_eq!(updated, Array::from(vec![9i64, 2]));
        assert_eq!(array, Array::from(vec![1i64, 2]));
    }

    #[test]
    fn test_with_element_out_of_range() {
        let array = Array::from(vec![1, 2]);
        assert!(array.with_element(99, &Value::Int(9)).unwrap().is_none());
    }

    #[test]
    fn test_unbox_wrong_primitive() {
        let array = Array::from(vec![1, 2]);
        let err = array.with_element(0, &Value::Long(9)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let err = array.with_element(0, &Value::Null).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_object_component() {
        let array = Array::objects_of(
            Component::Kind(ValueKind::String),
            vec![Value::from("a"), Value::Null],
        );
        let updated = array.with_element(1, &Value::from("b")).unwrap().unwrap();
        assert_eq!(updated.get(1), Some(Value::from("b")));
        let err = array.with_element(0, &Value::Int(1)).unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: expected string, got int");
    }

    #[test]
    fn test_like_resizes() {
        let array = Array::from(vec!['a', 'b']);
        let values = vec![Value::Char('x'), Value::Char('y'), Value::Char('z')];
        let resized = array.like(&values).unwrap();
        assert_eq!(resized, Array::from(vec!['x', 'y', 'z']));
        assert!(array.like(&[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_equality_by_elements() {
        assert_eq!(Array::from(vec![1.5f64, 2.0]), Array::from(vec![1.5f64, 2.0]));
        assert_ne!(Array::from(vec![1.5f64]), Array::from(vec![1.5f32]));
        assert_ne!(Array::from(vec![1i32]), Array::from(vec![1i64]));
        assert_eq!(
            Array::objects(vec![Value::Int(1)]),
            Array::objects_of(Component::Kind(ValueKind::Int), vec![Value::Int(1)])
        );
    }

    #[test]
    fn test_display_and_describe() {
        assert_eq!(Array::from(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(Array::from(vec![1, 2]).describe(), "int[]");
        assert_eq!(Array::objects(vec![]).describe(), "any[]");
    }
}
