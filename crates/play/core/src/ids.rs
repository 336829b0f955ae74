//! Opaque string identifiers handed out by the backing store.
//!
//! The platform's store keys everything by opaque strings; newtypes keep the
//! runtime from mixing them up at compile time.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }
    };
}

string_id!(
    /// Identifies an authored plan.
    PlanId
);

string_id!(
    /// Identifies a frozen published version of a plan.
    PlanVersionId
);

string_id!(
    /// Identifies one authored block within a plan.
    BlockId
);

string_id!(
    /// Identifies one playthrough instance. Virtual and draft runs carry a
    /// marker prefix (`virtual-`, `draft-`) instead of a store key.
    RunId
);

string_id!(
    /// Identifies a live play session shared by connected participants.
    SessionId
);

string_id!(
    /// Identifies an interactive artifact attached to a game.
    ArtifactId
);

string_id!(
    /// Identifies a piece of content gated behind an artifact.
    VariantId
);

string_id!(
    /// Opaque participant identity resolved by the auth layer.
    ParticipantId
);
