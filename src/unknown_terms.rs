//! Jargon detection: content words the vocabulary does not cover

use crate::extractor::ParsedQuery;
use crate::symbols::LemmaTable;
use std::sync::Arc;

pub struct UnknownTermDetector {
    lemmas: Arc<LemmaTable>,
}

impl UnknownTermDetector {
    pub fn new(lemmas: Arc<LemmaTable>) -> Self {
        Self { lemmas }
    }

    /// Surface forms of alphabetic, non-stopword NOUN/PROPN tokens whose lemma is
    /// not in the table and whose text is not a recognized entity.
    ///
    /// A term is reported once per occurrence; repeats are not collapsed.
    pub fn detect(&self, parsed: &ParsedQuery) -> Vec<String> {
        parsed
            .analysis
            .tokens
            .iter()
            .filter(|t| {
                t.is_alpha
                    && !t.is_stop
                    && t.pos.is_nominal()
                    && !self.lemmas.contains(&t.lemma)
                    && !parsed.entities.contains(&t.text)
            })
            .map(|t| t.text.clone())
            .collect()
    }
}
