use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The three arc-standard transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Action {
    /// Move the front of the buffer onto the stack.
    Shift,
    /// Top of stack becomes head of the element below it, which is removed.
    LeftArc,
    /// Element below the top becomes head of the top, which is popped.
    RightArc,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Shift, Action::LeftArc, Action::RightArc];

    /// Lower-case name as written in rule files.
    pub const fn name(self) -> &'static str {
        match self {
            Action::Shift => "shift",
            Action::LeftArc => "leftarc",
            Action::RightArc => "rightarc",
        }
    }

    /// Upper-case label used in parse traces.
    pub const fn label(self) -> &'static str {
        match self {
            Action::Shift => "SHIFT",
            Action::LeftArc => "LEFTARC",
            Action::RightArc => "RIGHTARC",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction;

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected one of shift, leftarc, rightarc")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownAction {}

impl FromStr for Action {
    type Err = UnknownAction;

    /// Accepts `leftarc` as well as `left-arc` / `left_arc`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let is_named = |name: &str| {
            let mut it = s.chars().filter(|c| *c != '-' && *c != '_');
            name.chars().all(|n| it.next().map(|c| c.to_ascii_lowercase()) == Some(n))
                && it.next().is_none()
        };

        Action::ALL
            .into_iter()
            .find(|action| is_named(action.name()))
            .ok_or(UnknownAction)
    }
}
