use std::collections::{BTreeMap, VecDeque};

use arcstd_protocol::{Action, Dependency, HeadError, Token, TokenId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot shift: the buffer is empty")]
    EmptyBuffer,

    #[error("cannot apply {action}: stack depth is {depth}, need at least 2")]
    StackTooShallow { action: Action, depth: usize },

    #[error("cannot apply leftarc: the element below the top is ROOT")]
    RootDependent,

    #[error("head assignment rejected: {0}")]
    Head(String),
}

impl From<HeadError> for TransitionError {
    fn from(err: HeadError) -> Self {
        TransitionError::Head(err.to_string())
    }
}

/// An arc created by a transition, with the surface forms of both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub dependency: Dependency,
    pub head_form: String,
    pub dependent_form: String,
}

/// Mutable parse state for one sentence: stack, buffer and arc set.
///
/// The stack starts as `[ROOT]` and ROOT is never removed. Tokens leave the
/// stack only through an arc, at which point their head is written and they
/// move to `attached`.
#[derive(Debug, Clone)]
pub struct Configuration {
    stack: Vec<Token>,
    buffer: VecDeque<Token>,
    arcs: BTreeMap<TokenId, TokenId>,
    attached: Vec<Token>,
}

impl Configuration {
    pub fn new(tokens: Vec<Token>) -> Self {
        let capacity = tokens.len();
        Self {
            stack: vec![Token::root()],
            buffer: tokens.into(),
            arcs: BTreeMap::new(),
            attached: Vec::with_capacity(capacity),
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Top of the stack (`s1`).
    pub fn top(&self) -> Option<&Token> {
        self.stack.last()
    }

    /// Element just below the top (`s2`).
    pub fn second(&self) -> Option<&Token> {
        self.stack.len().checked_sub(2).map(|i| &self.stack[i])
    }

    /// Front of the buffer (`b1`).
    pub fn front(&self) -> Option<&Token> {
        self.buffer.front()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn stack(&self) -> &[Token] {
        &self.stack
    }

    pub fn buffer(&self) -> impl Iterator<Item = &Token> {
        self.buffer.iter()
    }

    pub fn arcs(&self) -> &BTreeMap<TokenId, TokenId> {
        &self.arcs
    }

    /// Buffer exhausted and only ROOT left on the stack.
    pub fn is_terminal(&self) -> bool {
        self.buffer.is_empty() && self.stack.len() == 1 && self.stack[0].is_root()
    }

    pub fn apply(&mut self, action: Action) -> Result<Option<Attachment>, TransitionError> {
        match action {
            Action::Shift => self.shift().map(|_| None),
            Action::LeftArc => self.left_arc().map(Some),
            Action::RightArc => self.right_arc().map(Some),
        }
    }

    pub fn shift(&mut self) -> Result<(), TransitionError> {
        let token = self.buffer.pop_front().ok_or(TransitionError::EmptyBuffer)?;
        self.stack.push(token);
        Ok(())
    }

    /// Top becomes head of the element below it; that element leaves the stack.
    pub fn left_arc(&mut self) -> Result<Attachment, TransitionError> {
        self.require_depth(Action::LeftArc)?;
        let idx = self.stack.len() - 2;
        if self.stack[idx].is_root() {
            return Err(TransitionError::RootDependent);
        }

        let head = &self.stack[idx + 1];
        let (head_id, head_form) = (head.id, head.form.clone());
        let dependent = self.stack.remove(idx);
        self.attach(dependent, head_id, head_form)
    }

    /// Element below the top becomes head of the top, which is popped.
    pub fn right_arc(&mut self) -> Result<Attachment, TransitionError> {
        self.require_depth(Action::RightArc)?;
        let head = &self.stack[self.stack.len() - 2];
        // ROOT attachment is recorded as head 0
        let head_id = if head.is_root() { TokenId::ROOT } else { head.id };
        let head_form = head.form.clone();

        let dependent = self.stack.pop().ok_or(TransitionError::StackTooShallow {
            action: Action::RightArc,
            depth: 0,
        })?;
        self.attach(dependent, head_id, head_form)
    }

    /// Consumes the configuration, returning the sentence tokens in id order.
    pub fn into_tokens(mut self) -> Vec<Token> {
        self.attached
            .extend(self.stack.into_iter().chain(self.buffer).filter(|t| !t.is_root()));
        self.attached.sort_by_key(|t| t.id);
        self.attached
    }

    fn require_depth(&self, action: Action) -> Result<(), TransitionError> {
        if self.stack.len() < 2 {
            return Err(TransitionError::StackTooShallow {
                action,
                depth: self.stack.len(),
            });
        }
        Ok(())
    }

    fn attach(
        &mut self,
        mut dependent: Token,
        head: TokenId,
        head_form: String,
    ) -> Result<Attachment, TransitionError> {
        if let Some(existing) = self.arcs.get(&dependent.id) {
            return Err(HeadError::AlreadyAssigned {
                dependent: dependent.id,
                existing: *existing,
            }
            .into());
        }
        dependent.assign_head(head)?;
        self.arcs.insert(dependent.id, head);

        let attachment = Attachment {
            dependency: Dependency {
                head,
                dependent: dependent.id,
            },
            head_form,
            dependent_form: dependent.form.clone(),
        };
        self.attached.push(dependent);
        Ok(attachment)
    }
}
