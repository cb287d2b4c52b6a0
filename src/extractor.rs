//! Symbol extraction: query tokens -> intent symbols + named entities

use crate::error::Result;
use crate::nlp::{Analysis, NlpEngine};
use crate::symbols::{IntentSymbol, LemmaTable};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Extraction output for a single query
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedQuery {
    /// One symbol per matching token, token order, duplicates kept
    pub symbols: Vec<IntentSymbol>,
    pub entities: HashSet<String>,
    /// Token analysis the symbols were read from, reused by the unknown-term pass
    pub analysis: Analysis,
}

impl ParsedQuery {
    /// Exactly one symbol and it is ATTRIBUTE
    pub fn is_single_attribute(&self) -> bool {
        self.symbols.as_slice() == [IntentSymbol::Attribute]
    }
}

pub struct SymbolExtractor {
    nlp: Arc<dyn NlpEngine>,
    lemmas: Arc<LemmaTable>,
}

impl SymbolExtractor {
    pub fn new(nlp: Arc<dyn NlpEngine>, lemmas: Arc<LemmaTable>) -> Self {
        Self { nlp, lemmas }
    }

    pub async fn extract(&self, query: &str) -> Result<ParsedQuery> {
        let analysis = self.nlp.analyze(query).await?;
        let parsed = self.from_analysis(analysis);
        debug!(symbols = ?parsed.symbols, entities = parsed.entities.len(), "Extracted symbols");
        Ok(parsed)
    }

    /// Map an existing analysis onto symbols without another engine round trip
    pub fn from_analysis(&self, analysis: Analysis) -> ParsedQuery {
        let symbols = analysis
            .tokens
            .iter()
            .filter_map(|t| self.lemmas.lookup(&t.lemma))
            .collect();
        let entities = analysis.entities.iter().cloned().collect();

        ParsedQuery {
            symbols,
            entities,
            analysis,
        }
    }
}
