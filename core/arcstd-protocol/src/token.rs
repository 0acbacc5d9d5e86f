use alloc::string::String;
use core::fmt;

use crate::ids::TokenId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tag carried by the synthetic ROOT token.
pub const ROOT_TAG: &str = "root";

/// An annotated word of the input sentence.
///
/// Everything except the head is fixed at construction. The head slot is
/// written exactly once, when the parser creates the arc for this token.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub id: TokenId,
    pub form: String,
    pub lemma: String,
    /// Part-of-speech tag as it appeared in the corpus.
    pub upostag: String,
    /// Lower-cased tag used for feature lookups.
    tag: String,
    head: Option<TokenId>,
}

impl Token {
    pub fn new(
        id: u32,
        form: impl Into<String>,
        lemma: impl Into<String>,
        upostag: impl Into<String>,
    ) -> Self {
        let upostag = upostag.into();
        Self {
            id: TokenId(id),
            form: form.into(),
            lemma: lemma.into(),
            tag: upostag.to_lowercase(),
            upostag,
            head: None,
        }
    }

    /// The sentinel placed at the bottom of every stack.
    pub fn root() -> Self {
        Self::new(TokenId::ROOT.0, ROOT_TAG, ROOT_TAG, ROOT_TAG)
    }

    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn head(&self) -> Option<TokenId> {
        self.head
    }

    pub fn assign_head(&mut self, head: TokenId) -> Result<(), HeadError> {
        if self.is_root() {
            return Err(HeadError::Root);
        }
        if let Some(existing) = self.head {
            return Err(HeadError::AlreadyAssigned {
                dependent: self.id,
                existing,
            });
        }
        self.head = Some(head);
        Ok(())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.form)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadError {
    Root,
    AlreadyAssigned { dependent: TokenId, existing: TokenId },
}

impl fmt::Display for HeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadError::Root => write!(f, "the root token cannot take a head"),
            HeadError::AlreadyAssigned { dependent, existing } => {
                write!(f, "token {} already attached to {}", dependent, existing)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HeadError {}

/// A head/dependent pair produced by an arc transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dependency {
    pub head: TokenId,
    pub dependent: TokenId,
}

/// Rebuilds the sentence text from its surface forms.
pub fn sentence_text<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = &'a Token>,
{
    let mut text = String::new();
    for token in tokens {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&token.form);
    }
    text
}
