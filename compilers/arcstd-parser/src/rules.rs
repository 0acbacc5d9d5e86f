use std::collections::HashMap;
use std::fs;
use std::path::Path;

use arcstd_protocol::Action;
use thiserror::Error;
use tracing::{debug, info};

use crate::feature::{parse_features, Feature, FeatureSignature};

/// A rule line holds at most this many features.
const MAX_FEATURES: usize = 2;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("line {line}: expected `feature[,feature],op=<action>`, found {found:?}")]
    MissingAction { line: usize, found: String },

    #[error("line {line}: too many fields ({count}), a rule has at most two features and an action")]
    TooManyFields { line: usize, count: usize },

    #[error("line {line}: malformed feature {field:?}, expected s1.t=<tag>, s2.t=<tag> or b1.t=<tag>")]
    MalformedFeature { line: usize, field: String },

    #[error("line {line}: unknown action {action:?}, expected shift, leftarc or rightarc")]
    UnknownAction { line: usize, action: String },

    #[error("failed to read rule file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The oracle's lookup table: feature signature -> action.
///
/// Built once, then only read. Holds no interior mutability, so a single
/// table can be shared by reference across threads parsing different
/// sentences.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<FeatureSignature, Action>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::parse(&source)?;
        info!(path = %path.display(), rules = table.len(), "loaded rule table");
        Ok(table)
    }

    /// Parses a whole rule file. Any malformed line rejects the file.
    pub fn parse(source: &str) -> Result<Self, RuleError> {
        let mut table = Self::new();

        for (idx, raw) in source.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let (features, action) = parse_rule_line(line, trimmed)?;
            table.insert(FeatureSignature::from_features(&features), action);
        }

        Ok(table)
    }

    /// Inserts a rule. Later rules replace earlier ones with the same key.
    pub fn insert(&mut self, signature: FeatureSignature, action: Action) {
        if let Some(previous) = self.rules.insert(signature.clone(), action) {
            debug!(%signature, %previous, %action, "rule overridden");
        }
    }

    pub fn get(&self, signature: &FeatureSignature) -> Option<Action> {
        self.rules.get(signature).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn parse_rule_line(line: usize, text: &str) -> Result<(Vec<Feature>, Action), RuleError> {
    let fields: Vec<&str> = text.split(',').collect();

    // 1. Split off the action (always the last field)
    let (action_field, feature_fields) = match fields.split_last() {
        Some((action, features)) if !features.is_empty() => (*action, features),
        _ => {
            return Err(RuleError::MissingAction {
                line,
                found: text.to_string(),
            })
        }
    };
    if fields.len() > MAX_FEATURES + 1 {
        return Err(RuleError::TooManyFields {
            line,
            count: fields.len(),
        });
    }

    // 2. Features, in order
    let mut features = Vec::with_capacity(MAX_FEATURES);
    for field in feature_fields {
        let parsed = parse_features(field).ok_or_else(|| RuleError::MalformedFeature {
            line,
            field: field.trim().to_string(),
        })?;
        features.extend(parsed);
    }
    if features.len() > MAX_FEATURES {
        return Err(RuleError::TooManyFields {
            line,
            count: features.len() + 1,
        });
    }

    // 3. Action: whitespace and `op=` stripped, case folded
    let normalized: String = action_field
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let name = normalized.strip_prefix("op=").unwrap_or(&normalized);
    let action = name.parse::<Action>().map_err(|_| RuleError::UnknownAction {
        line,
        action: name.to_string(),
    })?;

    Ok((features, action))
}
