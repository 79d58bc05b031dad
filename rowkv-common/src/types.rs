//! # Row and Cell Types
//!
//! Core data types for single-row access against a wide-column store.
//!
//! ## Design Principles
//!
//! 1. **One Family**: Every row this layer touches lives under the single
//!    column family [`FAMILY`]. Requests are shaped per call and dropped after
//!    the response, nothing is cached.
//!
//! 2. **Shared Buffers**: Qualifiers and values are `Bytes`, so cells handed
//!    back by a store are reference-counted views instead of fresh copies.
//!
//! 3. **Store Order**: A row's cells keep the order the store returned them
//!    in. Lookups scan that order front to back and never re-sort.
//!
//! ## Shape Example
//!
//! ```text
//! table "users", row "u1":
//! +--------+-----------+---------+
//! | family | qualifier | value   |
//! +--------+-----------+---------+
//! | F      | age       | 42      |
//! | F      | name      | alice   |
//! +--------+-----------+---------+
//! ```

use std::fmt;

use bytes::Bytes;

/// The single column family every row operation targets.
pub const FAMILY: &str = "F";

/// Maximum row key size in bytes (HBase caps row keys at `i16::MAX`).
pub const MAX_ROW_KEY_SIZE: usize = i16::MAX as usize;

/// A single (qualifier, value) pair within a row and family.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Column family the cell belongs to.
    pub family: Bytes,
    /// Column name within the family.
    pub qualifier: Bytes,
    /// Stored payload.
    pub value: Bytes,
}

impl Cell {
    /// Creates a cell from any byte-like parts.
    ///
    /// # Examples
    /// ```rust
    /// use rowkv_common::{Cell, FAMILY};
    ///
    /// let cell = Cell::new(FAMILY, "name", "alice");
    /// assert!(cell.has_qualifier("name"));
    /// assert_eq!(cell.first_qualifier_byte(), Some(b'n'));
    /// ```
    pub fn new(
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Self {
        Cell {
            family: family.into(),
            qualifier: qualifier.into(),
            value: value.into(),
        }
    }

    /// Returns true when the qualifier equals `name` byte for byte.
    #[inline]
    pub fn has_qualifier(&self, name: &str) -> bool {
        self.qualifier.as_ref() == name.as_bytes()
    }

    /// Returns the leading qualifier byte, or `None` for an empty qualifier.
    #[inline]
    pub fn first_qualifier_byte(&self) -> Option<u8> {
        self.qualifier.first().copied()
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cell({}:{} = ",
            String::from_utf8_lossy(&self.family),
            String::from_utf8_lossy(&self.qualifier)
        )?;
        if self.value.len() <= 32 {
            write!(f, "{:?})", String::from_utf8_lossy(&self.value))
        } else {
            write!(f, "{}B)", self.value.len())
        }
    }
}

/// Column name paired with its payload, used to batch cells into one put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColV {
    pub name: String,
    pub data: Bytes,
}

impl ColV {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        ColV {
            name: name.into(),
            data: data.into(),
        }
    }
}
