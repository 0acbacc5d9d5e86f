pub mod configuration;
pub mod engine;
pub mod feature;
pub mod oracle;
pub mod rules;
pub mod trace;

pub use configuration::{Attachment, Configuration, TransitionError};
pub use engine::{Engine, EngineError, ParseOutcome};
pub use feature::{Feature, FeatureSignature, Slot};
pub use oracle::{Oracle, OracleError};
pub use rules::{RuleError, RuleTable};
pub use trace::{NoTrace, TraceArc, TraceEvent, TraceSink};

#[cfg(test)]
mod tests {
    use super::*;
    use arcstd_protocol::{Action, SentenceId, Token, TokenId};
    use proptest::prelude::*;
    use std::collections::HashSet;

    const TAGS: [&str; 6] = ["det", "adj", "noun", "verb", "adv", "adp"];
    const TAGS_AND_ROOT: [&str; 7] = ["det", "adj", "noun", "verb", "adv", "adp", "root"];

    /// A table under which every tag sequence parses: shift on any `s1+b1`,
    /// reduce on any `s1+s2`, and two left attachments onto nouns.
    fn total_table() -> RuleTable {
        let mut table = RuleTable::new();
        for top in TAGS_AND_ROOT {
            for front in TAGS {
                table.insert(
                    FeatureSignature::pair(Feature::new(Slot::S1, top), Feature::new(Slot::B1, front)),
                    Action::Shift,
                );
            }
            for second in TAGS_AND_ROOT {
                table.insert(
                    FeatureSignature::pair(Feature::new(Slot::S1, top), Feature::new(Slot::S2, second)),
                    Action::RightArc,
                );
            }
        }
        table.insert(
            FeatureSignature::pair(Feature::new(Slot::S1, "noun"), Feature::new(Slot::S2, "det")),
            Action::LeftArc,
        );
        table.insert(
            FeatureSignature::pair(Feature::new(Slot::S1, "noun"), Feature::new(Slot::S2, "adj")),
            Action::LeftArc,
        );
        table
    }

    fn sentence_strategy() -> impl Strategy<Value = Vec<Token>> {
        prop::collection::vec(prop::sample::select(TAGS.to_vec()), 0..24).prop_map(|tags| {
            tags.into_iter()
                .enumerate()
                .map(|(i, tag)| Token::new(i as u32 + 1, format!("w{}", i + 1), "_", tag.to_uppercase()))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_every_sentence_terminates_with_a_full_tree(tokens in sentence_strategy()) {
            let oracle = Oracle::new(total_table());
            let n = tokens.len();
            let mut trace: Vec<TraceEvent> = Vec::new();

            let outcome = Engine::new(&oracle)
                .parse(SentenceId(1), tokens, &mut trace)
                .unwrap();

            // Each token shifted once, attached once
            prop_assert_eq!(outcome.steps, 2 * n);
            prop_assert_eq!(trace.len(), 2 * n);
            prop_assert_eq!(trace.iter().filter(|e| e.action == Action::Shift).count(), n);

            // Exactly one head per token, arcs == tokens
            prop_assert_eq!(outcome.tokens.len(), n);
            prop_assert!(outcome.tokens.iter().all(|t| t.head().is_some()));
            let arcs: Vec<_> = trace.iter().filter_map(|e| e.arc.as_ref()).collect();
            prop_assert_eq!(arcs.len(), n);
            let dependents: HashSet<TokenId> = arcs.iter().map(|a| a.dependent).collect();
            prop_assert_eq!(dependents.len(), n);
            prop_assert!(!dependents.contains(&TokenId::ROOT));
        }

        #[test]
        fn test_parsing_is_deterministic(tokens in sentence_strategy()) {
            let oracle = Oracle::new(total_table());
            let engine = Engine::new(&oracle);

            let mut first: Vec<TraceEvent> = Vec::new();
            let mut second: Vec<TraceEvent> = Vec::new();
            let a = engine.parse(SentenceId(1), tokens.clone(), &mut first).unwrap();
            let b = engine.parse(SentenceId(1), tokens, &mut second).unwrap();

            prop_assert_eq!(first, second);
            prop_assert_eq!(a.dependencies(), b.dependencies());
        }

        #[test]
        fn test_never_loops_on_partial_tables(
            tokens in sentence_strategy(),
            drop_mask in prop::collection::vec(any::<bool>(), 64),
        ) {
            // Randomly thinned tables may fail, but always within the step bound
            let full = total_table();
            let mut table = RuleTable::new();
            let mut i = 0;
            for top in TAGS_AND_ROOT {
                for other in TAGS_AND_ROOT {
                    for (slot, action) in [(Slot::S2, Action::RightArc), (Slot::B1, Action::Shift)] {
                        let key = FeatureSignature::pair(Feature::new(Slot::S1, top), Feature::new(slot, other));
                        if full.get(&key).is_some() && drop_mask[i % drop_mask.len()] {
                            table.insert(key, action);
                        }
                        i += 1;
                    }
                }
            }

            let n = tokens.len();
            let mut trace: Vec<TraceEvent> = Vec::new();
            let result = Engine::new(&Oracle::new(table)).parse(SentenceId(7), tokens, &mut trace);

            prop_assert!(trace.len() <= 2 * n);
            match result {
                Ok(outcome) => {
                    prop_assert_eq!(outcome.steps, 2 * n);
                }
                Err(err) => {
                    prop_assert_eq!(err.sentence(), SentenceId(7));
                }
            }
        }

        #[test]
        fn test_left_arc_onto_root_is_refused(tokens in sentence_strategy()) {
            // Asks for ROOT as a dependent whenever a noun sits directly on it
            let mut table = total_table();
            table.insert(
                FeatureSignature::pair(Feature::new(Slot::S1, "noun"), Feature::new(Slot::S2, "root")),
                Action::LeftArc,
            );
            let oracle = Oracle::new(table);
            let starts_with_noun = tokens.first().map_or(false, |t| t.tag() == "noun");

            let mut trace: Vec<TraceEvent> = Vec::new();
            let result = Engine::new(&oracle).parse(SentenceId(3), tokens, &mut trace);

            prop_assert!(trace
                .iter()
                .filter_map(|e| e.arc.as_ref())
                .all(|arc| !arc.dependent.is_root()));

            match result {
                Ok(outcome) => prop_assert!(!starts_with_noun && outcome.tokens.iter().all(|t| t.head().is_some())),
                Err(EngineError::Transition {
                    sentence,
                    step,
                    action: Action::LeftArc,
                    source: TransitionError::RootDependent,
                }) => {
                    prop_assert_eq!(sentence, SentenceId(3));
                    if starts_with_noun {
                        // shift the noun, then the refused left-arc
                        prop_assert_eq!(step, 2);
                    }
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }
    }
}
