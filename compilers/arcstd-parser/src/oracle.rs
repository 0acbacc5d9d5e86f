use arcstd_protocol::Action;
use thiserror::Error;
use tracing::trace;

use crate::configuration::Configuration;
use crate::feature::{Feature, FeatureSignature, Slot};
use crate::rules::RuleTable;

const DET: &str = "det";
const VERB: &str = "verb";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// Every probe of the cascade missed the rule table.
    #[error("incoherent oracle state: no rule for {signature}")]
    IncoherentState { signature: FeatureSignature },
}

/// A feature probe: builds a lookup key from the configuration, or `None`
/// when the slots it needs are absent.
pub type Probe = fn(&Configuration) -> Option<FeatureSignature>;

pub fn top_and_second(config: &Configuration) -> Option<FeatureSignature> {
    let top = config.top()?;
    let second = config.second()?;
    Some(FeatureSignature::pair(
        Feature::new(Slot::S1, top.tag()),
        Feature::new(Slot::S2, second.tag()),
    ))
}

pub fn top_and_front(config: &Configuration) -> Option<FeatureSignature> {
    let top = config.top()?;
    let front = config.front()?;
    Some(FeatureSignature::pair(
        Feature::new(Slot::S1, top.tag()),
        Feature::new(Slot::B1, front.tag()),
    ))
}

pub fn top_only(config: &Configuration) -> Option<FeatureSignature> {
    let top = config.top()?;
    Some(FeatureSignature::single(Feature::new(Slot::S1, top.tag())))
}

/// Used while the stack context matters: `s1+s2`, then the buffer fallbacks.
pub const STACK_CASCADE: [Probe; 3] = [top_and_second, top_and_front, top_only];

/// Used when the stack is shallow or a verb waits on input: `s1+b1`, then `s1`.
pub const BUFFER_CASCADE: [Probe; 2] = [top_and_front, top_only];

/// Decides the next transition from a fixed rule table.
///
/// Only the tags of `s1`, `s2` and `b1` are consulted, and the oracle never
/// mutates the configuration.
#[derive(Debug, Clone)]
pub struct Oracle {
    rules: RuleTable,
}

impl Oracle {
    pub fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Returns the action for `config`, or `Ok(None)` when no cascade
    /// applies (an empty stack, or a non-verb top with nothing below it and
    /// nothing left to read).
    pub fn consult(&self, config: &Configuration) -> Result<Option<Action>, OracleError> {
        let top = match config.top() {
            Some(top) => top,
            None => return Ok(None),
        };
        let deep = config.depth() >= 2;
        let has_input = config.front().is_some();

        // 1. A determiner always waits for its head
        if deep && has_input && top.tag() == DET {
            return Ok(Some(Action::Shift));
        }

        // 2. Pick the cascade for this state
        let cascade: &[Probe] = if deep && (top.tag() != VERB || !has_input) {
            &STACK_CASCADE
        } else if has_input {
            &BUFFER_CASCADE
        } else {
            return Ok(None);
        };

        // 3. First table hit wins
        self.first_hit(config, cascade).map(Some)
    }

    fn first_hit(&self, config: &Configuration, cascade: &[Probe]) -> Result<Action, OracleError> {
        let mut last = FeatureSignature::default();

        for probe in cascade {
            let Some(signature) = probe(config) else {
                continue;
            };
            if let Some(action) = self.rules.get(&signature) {
                trace!(%signature, %action, "rule hit");
                return Ok(action);
            }
            last = signature;
        }

        Err(OracleError::IncoherentState { signature: last })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcstd_protocol::Token;

    fn oracle(rules: &str) -> Oracle {
        Oracle::new(RuleTable::parse(rules).unwrap())
    }

    fn config_with(stack_tags: &[&str], buffer_tags: &[&str]) -> Configuration {
        let tokens: Vec<Token> = stack_tags
            .iter()
            .chain(buffer_tags)
            .enumerate()
            .map(|(i, tag)| Token::new(i as u32 + 1, format!("w{}", i + 1), "_", *tag))
            .collect();
        let mut config = Configuration::new(tokens);
        for _ in stack_tags {
            config.shift().unwrap();
        }
        config
    }

    #[test]
    fn test_probes_build_canonical_keys() {
        let config = config_with(&["NOUN"], &["VERB"]);
        assert_eq!(top_and_second(&config).unwrap().as_str(), "s1.t=noun s2.t=root");
        assert_eq!(top_and_front(&config).unwrap().as_str(), "s1.t=noun b1.t=verb");
        assert_eq!(top_only(&config).unwrap().as_str(), "s1.t=noun");

        let root_only = config_with(&[], &[]);
        assert_eq!(top_and_second(&root_only), None);
        assert_eq!(top_and_front(&root_only), None);
        assert_eq!(top_only(&root_only).unwrap().as_str(), "s1.t=root");
    }

    #[test]
    fn test_determiner_shifts_without_lookup() {
        // The table would say rightarc, but the determiner rule comes first
        let oracle = oracle("s1.t=det s2.t=root,op=rightarc\ns1.t=det,op=rightarc");
        let config = config_with(&["DET"], &["NOUN"]);
        assert_eq!(oracle.consult(&config), Ok(Some(Action::Shift)));
    }

    #[test]
    fn test_determiner_with_empty_buffer_uses_table() {
        let oracle = oracle("s1.t=det s2.t=root,op=rightarc");
        let config = config_with(&["DET"], &[]);
        assert_eq!(oracle.consult(&config), Ok(Some(Action::RightArc)));
    }

    #[test]
    fn test_stack_pair_takes_priority() {
        let oracle = oracle(
            "s1.t=noun s2.t=adj,op=leftarc\ns1.t=noun b1.t=verb,op=shift\ns1.t=noun,op=rightarc",
        );
        let config = config_with(&["ADJ", "NOUN"], &["VERB"]);
        assert_eq!(oracle.consult(&config), Ok(Some(Action::LeftArc)));
    }

    #[test]
    fn test_stack_cascade_falls_back_to_buffer_then_top() {
        let oracle = oracle("s1.t=noun b1.t=verb,op=shift\ns1.t=noun,op=rightarc");
        let config = config_with(&["ADJ", "NOUN"], &["VERB"]);
        assert_eq!(oracle.consult(&config), Ok(Some(Action::Shift)));

        let config = config_with(&["ADJ", "NOUN"], &["ADV"]);
        assert_eq!(oracle.consult(&config), Ok(Some(Action::RightArc)));

        // Empty buffer skips the b1 probe entirely
        let config = config_with(&["ADJ", "NOUN"], &[]);
        assert_eq!(oracle.consult(&config), Ok(Some(Action::RightArc)));
    }

    #[test]
    fn test_verb_with_input_skips_stack_pair() {
        let oracle = oracle("s1.t=verb s2.t=noun,op=leftarc\ns1.t=verb b1.t=noun,op=shift");
        let config = config_with(&["NOUN", "VERB"], &["NOUN"]);
        assert_eq!(oracle.consult(&config), Ok(Some(Action::Shift)));

        // Same stack, buffer drained: now the pair is consulted
        let config = config_with(&["NOUN", "VERB"], &[]);
        assert_eq!(oracle.consult(&config), Ok(Some(Action::LeftArc)));
    }

    #[test]
    fn test_root_only_stack_uses_buffer_cascade() {
        let oracle = oracle("s1.t=root,op=shift");
        let config = config_with(&[], &["NOUN"]);
        assert_eq!(oracle.consult(&config), Ok(Some(Action::Shift)));
    }

    #[test]
    fn test_exhausted_cascade_reports_last_signature() {
        let oracle = oracle("s1.t=verb,op=shift");
        let config = config_with(&["ADJ", "NOUN"], &["VERB"]);
        assert_eq!(
            oracle.consult(&config),
            Err(OracleError::IncoherentState {
                signature: top_only(&config).unwrap()
            })
        );

        let err = oracle.consult(&config).unwrap_err();
        assert_eq!(err.to_string(), "incoherent oracle state: no rule for s1.t=noun");
    }

    #[test]
    fn test_terminal_state_yields_no_action() {
        let oracle = oracle("s1.t=root,op=shift");
        let config = config_with(&[], &[]);
        assert_eq!(oracle.consult(&config), Ok(None));
    }
}
