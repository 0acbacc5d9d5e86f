#![no_std] // The parsing core needs nothing beyond alloc

#[cfg_attr(test, macro_use)]
extern crate alloc;

// Enable std if the feature is active (for tests/tools)
#[cfg(feature = "std")]
extern crate std;

pub mod action;
pub mod ids;
pub mod token;

// Re-export core types for convenience
pub use action::{Action, UnknownAction};
pub use ids::{SentenceId, TokenId};
pub use token::{sentence_text, Dependency, HeadError, Token, ROOT_TAG};
