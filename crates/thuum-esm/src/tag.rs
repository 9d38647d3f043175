//! Known subrecord tags and record types.
//!
//! Both are closed enumerations generated from a single table, so a code and
//! its name can never drift apart. Codes that are not in the table stay as a
//! raw [`FourCC`].

use std::fmt;

use thuum_common::FourCC;

macro_rules! four_cc_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every known value, in table order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// The on-disk code.
            #[inline]
            pub const fn code(self) -> FourCC {
                match self {
                    $($name::$variant => FourCC(*$code),)+
                }
            }

            /// Look up a known value by its on-disk code.
            pub fn from_code(code: FourCC) -> Option<Self> {
                match code.as_bytes() {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.code(), f)
            }
        }

        impl From<$name> for FourCC {
            #[inline]
            fn from(value: $name) -> Self {
                value.code()
            }
        }

        impl PartialEq<FourCC> for $name {
            #[inline]
            fn eq(&self, other: &FourCC) -> bool {
                self.code() == *other
            }
        }
    };
}

four_cc_enum! {
    /// Subrecord tags understood by at least one record schema.
    pub enum Tag {
        /// Editor ID.
        Edid = b"EDID",
        /// Object bounds.
        Obnd = b"OBND",
        /// Display name.
        Full = b"FULL",
        /// Description.
        Desc = b"DESC",
        /// Keyword count.
        Ksiz = b"KSIZ",
        /// Keyword form IDs.
        Kwda = b"KWDA",
        /// Model path.
        Modl = b"MODL",
        /// Model texture hashes.
        Modt = b"MODT",
        /// Model alternate textures.
        Mods = b"MODS",
        /// Virtual machine adapter (script data).
        Vmad = b"VMAD",
        /// Pickup sound.
        Ynam = b"YNAM",
        /// Putdown sound.
        Znam = b"ZNAM",
        /// Equip type.
        Etyp = b"ETYP",
        /// Menu display object.
        Mdob = b"MDOB",
        Data = b"DATA",
        /// Effect data of consumables and enchantments.
        Enit = b"ENIT",
        /// Spell item data.
        Spit = b"SPIT",
        /// Effect group start: base effect form ID.
        Efid = b"EFID",
        /// Effect item: magnitude, area, duration.
        Efit = b"EFIT",
        /// Condition.
        Ctda = b"CTDA",
        /// Condition string parameter.
        Cis2 = b"CIS2",
        /// Base object of a placed reference.
        Name = b"NAME",
        /// Reference scale.
        Xscl = b"XSCL",
        /// Linked reference.
        Xlkr = b"XLKR",
    }
}

four_cc_enum! {
    /// Record types with a registered schema.
    pub enum RecordType {
        /// Potion or food.
        Alch = b"ALCH",
        Ingr = b"INGR",
        Scrl = b"SCRL",
        Spel = b"SPEL",
        Ench = b"ENCH",
        /// Placed object reference.
        Refr = b"REFR",
    }
}
