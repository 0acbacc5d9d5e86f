use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        #[repr(transparent)] // Same layout as u32
        pub struct $name(pub u32);

        impl $name {
            pub const fn new(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(TokenId, "Position of a token in its sentence, 1-based. `0` is the synthetic ROOT.");
define_id!(SentenceId, "Position of a sentence in its corpus, 1-based.");

impl TokenId {
    /// The synthetic ROOT token always sits at id 0.
    pub const ROOT: TokenId = TokenId(0);

    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}
