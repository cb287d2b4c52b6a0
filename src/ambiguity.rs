use crate::extractor::ParsedQuery;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

pub const FEATURE_COUNT: usize = 3;

/// Numeric summary of an extraction, fed to the classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub symbol_count: usize,
    /// Share of symbol occurrences that repeat an earlier symbol, 0.0 when there are none
    pub duplicate_ratio: f64,
    pub has_entities: bool,
}

impl FeatureVector {
    pub fn from_parsed(parsed: &ParsedQuery) -> Self {
        let symbol_count = parsed.symbols.len();
        let duplicate_ratio = if symbol_count == 0 {
            0.0
        } else {
            let mut seen = HashSet::new();
            let repeats = parsed
                .symbols
                .iter()
                .filter(|s| !seen.insert(**s))
                .count();
            repeats as f64 / symbol_count as f64
        };

        Self {
            symbol_count,
            duplicate_ratio,
            has_entities: !parsed.entities.is_empty(),
        }
    }

    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.symbol_count as f64,
            self.duplicate_ratio,
            if self.has_entities { 1.0 } else { 0.0 },
        ]
    }
}

/// Any frozen vector-in, label-out predictor
pub trait AmbiguityClassifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> bool;
}

pub struct AmbiguityDetector {
    classifier: Arc<dyn AmbiguityClassifier>,
}

impl AmbiguityDetector {
    pub fn new(classifier: Arc<dyn AmbiguityClassifier>) -> Self {
        Self { classifier }
    }

    /// Decide whether the query needs clarification
    pub fn is_ambiguous(&self, parsed: &ParsedQuery) -> bool {
        let features = FeatureVector::from_parsed(parsed);
        let ambiguous = self.classifier.predict(&features);
        debug!(features = ?features.as_array(), ambiguous, "Ambiguity classifier verdict");
        ambiguous
    }
}
