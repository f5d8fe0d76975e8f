//! Typed identifiers. Each record kind gets its own UUID newtype so an
//! [`EntityId`] can never be passed where a [`DeviceId`] is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Random (v4) identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

uuid_id!(
    /// Host-side identity of a cover [`Entity`](crate::entity::Entity).
    EntityId
);
uuid_id!(
    /// Identity of the [`Device`](crate::device::Device) behind an entity.
    DeviceId
);
uuid_id!(EventId);
