//! Code for handling IDs
use anyhow::{Context, Result};
use indexmap::IndexMap;

macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Clone, std::hash::Hash, PartialEq, Eq, serde::Deserialize, Debug, serde::Serialize,
        )]
        /// An ID type (e.g. `TariffID`)
        pub struct $name(pub std::sync::Arc<str>);

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(std::sync::Arc::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(std::sync::Arc::from(s))
            }
        }

        impl $name {
            /// Create a new ID from a string slice
            pub fn new(id: &str) -> Self {
                $name(std::sync::Arc::from(id))
            }
        }
    };
}
pub(crate) use define_id_type;

/// Indicates that the struct has an ID field
pub trait HasID<ID> {
    /// Get the struct's ID
    fn get_id(&self) -> &ID;
}

/// Implement the `HasID` trait for the given type, assuming it has a field called `id`
macro_rules! define_id_getter {
    ($t:ty, $id_ty:ty) => {
        impl crate::id::HasID<$id_ty> for $t {
            fn get_id(&self) -> &$id_ty {
                &self.id
            }
        }
    };
}
pub(crate) use define_id_getter;

/// Look up an item by its ID, returning an error naming the kind of item if it is missing.
///
/// # Arguments
///
/// * `map` - The map to search
/// * `id` - The string representation of the ID
/// * `kind` - What the items are called, for the error message (e.g. "tariff")
pub fn get_by_id<'a, ID, T>(map: &'a IndexMap<ID, T>, id: &str, kind: &str) -> Result<&'a T>
where
    ID: std::hash::Hash + Eq + std::borrow::Borrow<str>,
{
    map.get(id)
        .with_context(|| format!("Unknown {kind} ID {id} found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;

    define_id_type!(GenericID);

    #[test]
    fn test_get_by_id() {
        let map = indexmap! { GenericID::new("a") => 1 };
        assert_eq!(*get_by_id(&map, "a", "thing").unwrap(), 1);
        assert_eq!(
            get_by_id(&map, "b", "thing").unwrap_err().to_string(),
            "Unknown thing ID b found"
        );
    }
}
