//! The tagged value type used where builders traffic in loosely typed
//! data, most visibly the Markdown inline scanner.
//!
//! Values small enough to live inline do; wide scalars are boxed so the
//! enum stays one machine word plus discriminant.

use crate::dom::NodeId;
use crate::Atom;

/// The type tag of an [`Item`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemType {
    Null,
    Bool,
    Int,
    Int64,
    Float,
    String,
    Symbol,
    Binary,
    DateTime,
    List,
    Array,
    Map,
    Element,
    Range,
    Type,
    Error,
}

/// A dynamically typed value.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Null,
    Bool(bool),
    Int(i32),
    Int64(Box<i64>),
    Float(Box<f64>),
    Str(String),
    Symbol(Atom),
    Binary(Box<[u8]>),
    DateTime(Box<str>),
    List(Vec<Item>),
    Array(Vec<Item>),
    Map(Vec<(Atom, Item)>),
    Element(NodeId),
    Range(Box<(i64, i64)>),
    Type(Atom),
    Error,
}

impl Item {
    pub fn type_tag(&self) -> ItemType {
        match self {
            Item::Null => ItemType::Null,
            Item::Bool(_) => ItemType::Bool,
            Item::Int(_) => ItemType::Int,
            Item::Int64(_) => ItemType::Int64,
            Item::Float(_) => ItemType::Float,
            Item::Str(_) => ItemType::String,
            Item::Symbol(_) => ItemType::Symbol,
            Item::Binary(_) => ItemType::Binary,
            Item::DateTime(_) => ItemType::DateTime,
            Item::List(_) => ItemType::List,
            Item::Array(_) => ItemType::Array,
            Item::Map(_) => ItemType::Map,
            Item::Element(_) => ItemType::Element,
            Item::Range(_) => ItemType::Range,
            Item::Type(_) => ItemType::Type,
            Item::Error => ItemType::Error,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Item::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Item::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value, widening the inline 32-bit form.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Item::Int(n) => Some(i64::from(*n)),
            Item::Int64(n) => Some(**n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Item::Float(f) => Some(**f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Item::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Atom> {
        match self {
            Item::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<NodeId> {
        match self {
            Item::Element(id) => Some(*id),
            _ => None,
        }
    }

    /// Map lookup by interned key.
    pub fn get(&self, key: &Atom) -> Option<&Item> {
        match self {
            Item::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<i64> for Item {
    fn from(n: i64) -> Item {
        match i32::try_from(n) {
            Ok(small) => Item::Int(small),
            Err(_) => Item::Int64(Box::new(n)),
        }
    }
}

impl From<f64> for Item {
    fn from(f: f64) -> Item {
        Item::Float(Box::new(f))
    }
}

#[cfg(test)]
mod test {
    use super::{Item, ItemType};
    use crate::Atom;

    #[test]
    fn small_ints_stay_inline() {
        assert_eq!(Item::from(42i64), Item::Int(42));
        assert_eq!(Item::from(1i64 << 40).type_tag(), ItemType::Int64);
        assert_eq!(Item::from(1i64 << 40).as_int(), Some(1i64 << 40));
    }

    #[test]
    fn map_lookup_by_atom() {
        let key = Atom::from("width");
        let map = Item::Map(vec![(key.clone(), Item::Int(500))]);
        assert_eq!(map.get(&key).and_then(Item::as_int), Some(500));
        assert_eq!(map.get(&Atom::from("height")), None);
    }
}
