//! Handles for schema and storage objects.
//!
//! Every handle is a `#[repr(transparent)]` integer so descriptor tables,
//! resolution tables and placeholder lists stay compact and cheap to copy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Defines an opaque handle newtype with `new`/`raw` accessors and a
/// `Name(raw)` debug rendering.
macro_rules! define_handle {
    ($($(#[$meta:meta])* $name:ident($repr:ty);)*) => { $(
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name($repr);

        impl $name {
            #[inline]
            pub const fn new(raw: $repr) -> Self {
                $name(raw)
            }

            #[inline]
            pub const fn raw(self) -> $repr {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    )* };
}

define_handle! {
    /// A class known to the schema catalog.
    ClassId(u32);
    /// A schema attribute handle. The catalog may hand out a different
    /// handle for the same attribute after a commit.
    AttrId(u32);
    /// A class method usable as an instance constructor.
    MethodId(u32);
    /// A workspace object handle. The handle is stable for the whole load;
    /// the OID behind it starts temporary and becomes permanent on exchange.
    ObjectId(u64);
}

/// Instance ordinal as written in the load file (`@Class|ordinal`).
pub type Ordinal = u32;

/// Storage-level identity of a persisted (or soon to be persisted) object.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Oid {
    /// Assigned by the local workspace; meaningless to the server until
    /// exchanged for a permanent identifier.
    Temporary(u32),
    Permanent(PermanentOid),
}

impl Oid {
    #[inline]
    pub const fn is_temporary(self) -> bool {
        matches!(self, Oid::Temporary(_))
    }

    #[inline]
    pub const fn permanent(self) -> Option<PermanentOid> {
        match self {
            Oid::Permanent(oid) => Some(oid),
            Oid::Temporary(_) => None,
        }
    }
}

impl From<PermanentOid> for Oid {
    fn from(oid: PermanentOid) -> Self {
        Oid::Permanent(oid)
    }
}

/// Permanent object identifier: volume, page and slot.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct PermanentOid {
    pub volume: u16,
    pub page: u32,
    pub slot: u16,
}

impl PermanentOid {
    pub const fn new(volume: u16, page: u32, slot: u16) -> Self {
        PermanentOid { volume, page, slot }
    }
}

impl fmt::Display for PermanentOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.volume, self.page, self.slot)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Oid::Temporary(n) => write!(f, "temp:{n}"),
            Oid::Permanent(oid) => oid.fmt(f),
        }
    }
}
