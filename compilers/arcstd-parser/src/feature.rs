use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{multispace0, multispace1},
    combinator::{all_consuming, map, value},
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
    IResult,
};

/// Which configuration slot a feature looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Top of the stack.
    S1,
    /// Second element from the top of the stack.
    S2,
    /// Front of the buffer.
    B1,
}

impl Slot {
    pub const fn prefix(self) -> &'static str {
        match self {
            Slot::S1 => "s1",
            Slot::S2 => "s2",
            Slot::B1 => "b1",
        }
    }
}

/// A single `<slot>.t=<tag>` template instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Feature {
    pub slot: Slot,
    pub tag: String,
}

impl Feature {
    pub fn new(slot: Slot, tag: &str) -> Self {
        Self {
            slot,
            tag: tag.to_lowercase(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.t={}", self.slot.prefix(), self.tag)
    }
}

/// Canonical lookup key: the features in order, joined by one space.
///
/// Both the rule loader and the oracle probes build keys through this type,
/// so `s1.t=noun ,s2.t=det` in a rule file and the probe `s1 + s2` agree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FeatureSignature(String);

impl FeatureSignature {
    pub fn from_features<'a, I>(features: I) -> Self
    where
        I: IntoIterator<Item = &'a Feature>,
    {
        let mut key = String::new();
        for feature in features {
            if !key.is_empty() {
                key.push(' ');
            }
            key.push_str(&feature.to_string());
        }
        Self(key)
    }

    pub fn single(feature: Feature) -> Self {
        Self::from_features([&feature])
    }

    pub fn pair(first: Feature, second: Feature) -> Self {
        Self::from_features([&first, &second])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn slot(input: &str) -> IResult<&str, Slot> {
    alt((
        value(Slot::S1, tag("s1")),
        value(Slot::S2, tag("s2")),
        value(Slot::B1, tag("b1")),
    ))(input)
}

fn pos_tag(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != ',' && c != '=')(input)
}

fn feature(input: &str) -> IResult<&str, Feature> {
    map(
        tuple((slot, preceded(tag(".t="), pos_tag))),
        |(slot, pos)| Feature::new(slot, pos),
    )(input)
}

/// Parses one rule-file field: one or more whitespace separated features.
pub fn parse_features(field: &str) -> Option<Vec<Feature>> {
    let lowered = field.to_lowercase();
    let parsed: IResult<&str, Vec<Feature>> = all_consuming(delimited(
        multispace0,
        separated_list1(multispace1, feature),
        multispace0,
    ))(&lowered);

    parsed.ok().map(|(_, features)| features)
}
