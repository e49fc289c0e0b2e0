//! Entity identifiers
//!
//! All three entity kinds use UUIDv7 so identifiers sort by creation time
//! and can be generated without coordination.

use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u128);

        impl $name {
            /// Generate a new UUIDv7-based identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().as_u128())
            }

            /// Create an identifier from a raw u128 value
            ///
            /// This is primarily for storage layer deserialization.
            pub fn from_value(value: u128) -> Self {
                Self(value)
            }

            /// Parse an identifier from its canonical hyphenated form
            pub fn parse(s: &str) -> Result<Self, String> {
                uuid::Uuid::parse_str(s)
                    .map(|u| Self(u.as_u128()))
                    .map_err(|e| format!("invalid {} '{}': {}", stringify!($name), s, e))
            }

            /// Get the raw u128 value
            pub fn value(&self) -> u128 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", uuid::Uuid::from_u128(self.0))
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a board
    ///
    /// # Examples
    ///
    /// ```
    /// use boardwalk_domain::BoardId;
    ///
    /// let id = BoardId::new();
    /// let parsed = BoardId::parse(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    BoardId
);

entity_id!(
    /// Unique identifier for a column
    ColumnId
);

entity_id!(
    /// Unique identifier for a task
    TaskId
);
