//! Form ID type.
//!
//! Every record carries a 32-bit form ID in its header, and many subrecords
//! reference other records by form ID. The top byte is the load-order index
//! of the owning plugin.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A 32-bit identifier naming a game object or record.
///
/// Format: `0xXXXXXXXX`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct FormId(u32);

impl FormId {
    /// The null form ID. Never a valid reference.
    pub const NULL: Self = Self(0);

    /// Create a form ID from its raw value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Check if this is the null form ID.
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// The load-order index of the plugin that owns this form.
    #[inline]
    pub const fn load_order_index(&self) -> u8 {
        (self.0 >> 24) as u8
    }
}

impl fmt::Debug for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FormId({})", self)
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl From<u32> for FormId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl FromStr for FormId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if digits.is_empty() || digits.len() > 8 {
            return Err(Error::InvalidFormId(format!(
                "expected 1 to 8 hex digits, got {:?}",
                s
            )));
        }

        u32::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| Error::InvalidFormId(format!("invalid hex in {:?}", s)))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FormId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FormId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
