//! Serde helpers for optional state fields.
//!
//! Auth state fields distinguish a value that was never set from one that was
//! explicitly cleared. `Option<T>` collapses the two, so state fields use
//! [`Slot`] instead:
//!
//! | variant      | wire form       |
//! |--------------|-----------------|
//! | `Absent`     | field omitted   |
//! | `Cleared`    | `null`          |
//! | `Present(v)` | serialized `v`  |
//!
//! Fields must be declared with
//! `#[serde(default, skip_serializing_if = "Slot::is_absent")]` for the
//! omitted form to round-trip.
//!
//! Fields whose wire type has no `null` use `skip_serializing_if =
//! "Slot::is_unset"` instead: `Cleared` is then omitted like `Absent`, and the
//! distinction only exists in memory.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A three-state optional value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<T> {
    /// Never set.
    Absent,
    /// Explicitly cleared after having been set.
    Cleared,
    /// Holds a value.
    Present(T),
}

impl<T> Slot<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_cleared(&self) -> bool {
        matches!(self, Self::Cleared)
    }

    /// Absent or cleared.
    pub fn is_unset(&self) -> bool {
        !self.is_present()
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Returns the held value, if any.
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Cleared => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Cleared => None,
        }
    }

    pub fn set(&mut self, value: T) {
        *self = Self::Present(value);
    }

    /// Marks the slot as cleared.
    ///
    /// An absent slot stays absent so that clearing something that was never
    /// set does not invent a field on the wire.
    pub fn clear(&mut self) {
        if !self.is_absent() {
            *self = Self::Cleared;
        }
    }

    /// Replaces the slot with `Present(value)` or `Cleared`.
    pub fn replace(&mut self, value: Option<T>) {
        *self = match value {
            Some(value) => Self::Present(value),
            None => Self::Cleared,
        };
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T: Serialize> Serialize for Slot<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Present(value) => serializer.serialize_some(value),
            Self::Absent | Self::Cleared => serializer.serialize_none(),
        }
    }
}

/// A missing field never reaches this impl (`#[serde(default)]` yields
/// `Absent`), so `null` maps to `Cleared`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Slot<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<T> = Option::deserialize(deserializer)?;
        Ok(match value {
            Some(value) => Self::Present(value),
            None => Self::Cleared,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(default, skip_serializing_if = "Slot::is_absent")]
        field: Slot<String>,
    }

    #[test]
    fn test_missing_field_is_absent() {
        let result: TestStruct = serde_json::from_str("{}").unwrap();
        assert_eq!(result.field, Slot::Absent);
    }

    #[test]
    fn test_null_field_is_cleared() {
        let result: TestStruct = serde_json::from_str(r#"{"field": null}"#).unwrap();
        assert_eq!(result.field, Slot::Cleared);
    }

    #[test]
    fn test_value_field_is_present() {
        let result: TestStruct = serde_json::from_str(r#"{"field": "hello"}"#).unwrap();
        assert_eq!(result.field, Slot::Present("hello".to_string()));
    }

    #[test]
    fn test_serialize_each_state() {
        let absent = TestStruct {
            field: Slot::Absent,
        };
        let cleared = TestStruct {
            field: Slot::Cleared,
        };
        let present = TestStruct {
            field: Slot::Present("x".to_string()),
        };

        assert_eq!(serde_json::to_string(&absent).unwrap(), "{}");
        assert_eq!(serde_json::to_string(&cleared).unwrap(), r#"{"field":null}"#);
        assert_eq!(serde_json::to_string(&present).unwrap(), r#"{"field":"x"}"#);
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct NonNullable {
        #[serde(default, skip_serializing_if = "Slot::is_unset")]
        field: Slot<String>,
    }

    #[test]
    fn test_unset_field_omits_cleared() {
        let cleared = NonNullable {
            field: Slot::Cleared,
        };
        assert_eq!(serde_json::to_string(&cleared).unwrap(), "{}");

        let parsed: NonNullable = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.field, Slot::Absent);

        let present = NonNullable {
            field: Slot::Present("x".to_string()),
        };
        assert_eq!(serde_json::to_string(&present).unwrap(), r#"{"field":"x"}"#);
    }

    #[test]
    fn test_clear_keeps_absent_slot_absent() {
        let mut slot: Slot<u8> = Slot::Absent;
        slot.clear();
        assert!(slot.is_absent());

        slot.set(3);
        slot.clear();
        assert!(slot.is_cleared());
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_replace() {
        let mut slot = Slot::Present(1);
        slot.replace(None);
        assert_eq!(slot, Slot::Cleared);
        slot.replace(Some(2));
        assert_eq!(slot.into_option(), Some(2));
    }
}
