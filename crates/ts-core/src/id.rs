use lasso::{Spur, ThreadedRodeo};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for item IDs shared by layout and live data.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Interned identifier of a scheme item.
///
/// The same id appears in the layout description and in every polled live
/// item list, so joins between the two are plain `Copy` hash lookups.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(Spur);

impl ItemId {
    /// Intern a string as an ItemId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ItemId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::intern(s)
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Backends send ids either as strings or as bare integers.
impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = ItemId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer item id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ItemId, E> {
                Ok(ItemId::intern(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ItemId, E> {
                Ok(ItemId::intern(&v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ItemId, E> {
                Ok(ItemId::intern(&v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ItemId::intern("switch_7");
        let b = ItemId::intern("switch_7");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "switch_7");
    }

    #[test]
    fn numeric_and_string_ids_join() {
        let from_number: ItemId = serde_json::from_str("42").unwrap();
        let from_string: ItemId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(from_number, from_string);
    }
}
