//! Node names.

use std::fmt;
use std::rc::Rc;

/// How a node is addressed within its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Name {
    /// A record field.
    Property(Rc<str>),
    /// A position inside an array, list, set or map.
    Index(usize),
}

impl Name {
    pub fn property(name: &str) -> Self {
        Name::Property(Rc::from(name))
    }

    pub fn index(index: usize) -> Self {
        Name::Index(index)
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Name::Index(i) => Some(*i),
            Name::Property(_) => None,
        }
    }

    pub fn as_property(&self) -> Option<&str> {
        match self {
            Name::Property(p) => Some(&**p),
            Name::Index(_) => None,
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Property(p) => f.write_str(p),
            Name::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Name::property(name)
    }
}

impl From<usize> for Name {
    fn from(index: usize) -> Self {
        Name::Index(index)
    }
}
