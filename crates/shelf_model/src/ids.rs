//! Opaque ID newtypes for interchange-model entities.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, and
//! `Serialize`/`Deserialize`. IDs index into the entity vectors of the
//! model they belong to ([`Library`](crate::Library),
//! [`Layout`](crate::Layout), [`Netlist`](crate::Netlist)).

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a library cell definition.
    CellId
);

define_id!(
    /// Opaque, copyable ID for a site-type definition from the layout file.
    SiteTypeId
);

define_id!(
    /// Opaque, copyable ID for a resource kind (LUT, FF, RAMB, DSP, ...).
    ResourceId
);

define_id!(
    /// Opaque, copyable ID for an instantiated cell in the netlist.
    InstanceId
);

define_id!(
    /// Opaque, copyable ID for a net in the netlist.
    NetId
);
