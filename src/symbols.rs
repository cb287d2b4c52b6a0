//! Intent symbols and the lemma vocabulary that maps words onto them.
//!
//! The table is built once at startup and shared read-only afterwards.

use crate::error::{RecommenderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Coarse operation a query word expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentSymbol {
    Aggregate,
    Difference,
    Trend,
    Sort,
    Select,
    Filter,
    GroupBy,
    Arithmetic,
    Attribute,
    Title,
}

impl IntentSymbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentSymbol::Aggregate => "AGGREGATE",
            IntentSymbol::Difference => "DIFFERENCE",
            IntentSymbol::Trend => "TREND",
            IntentSymbol::Sort => "SORT",
            IntentSymbol::Select => "SELECT",
            IntentSymbol::Filter => "FILTER",
            IntentSymbol::GroupBy => "GROUP_BY",
            IntentSymbol::Arithmetic => "ARITHMETIC",
            IntentSymbol::Attribute => "ATTRIBUTE",
            IntentSymbol::Title => "TITLE",
        }
    }
}

impl fmt::Display for IntentSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentSymbol {
    type Err = RecommenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "AGGREGATE" => Ok(IntentSymbol::Aggregate),
            "DIFFERENCE" => Ok(IntentSymbol::Difference),
            "TREND" => Ok(IntentSymbol::Trend),
            "SORT" => Ok(IntentSymbol::Sort),
            "SELECT" => Ok(IntentSymbol::Select),
            "FILTER" => Ok(IntentSymbol::Filter),
            "GROUP_BY" => Ok(IntentSymbol::GroupBy),
            "ARITHMETIC" => Ok(IntentSymbol::Arithmetic),
            "ATTRIBUTE" => Ok(IntentSymbol::Attribute),
            "TITLE" => Ok(IntentSymbol::Title),
            other => Err(RecommenderError::Config(format!(
                "Unknown intent symbol '{}'",
                other
            ))),
        }
    }
}

const BUILTIN_LEMMAS: &[(&str, IntentSymbol)] = &[
    // aggregations
    ("average", IntentSymbol::Aggregate),
    ("mean", IntentSymbol::Aggregate),
    ("median", IntentSymbol::Aggregate),
    ("mode", IntentSymbol::Aggregate),
    ("sum", IntentSymbol::Aggregate),
    ("total", IntentSymbol::Aggregate),
    ("count", IntentSymbol::Aggregate),
    ("min", IntentSymbol::Aggregate),
    ("minimum", IntentSymbol::Aggregate),
    ("max", IntentSymbol::Aggregate),
    ("maximum", IntentSymbol::Aggregate),
    ("percent", IntentSymbol::Aggregate),
    ("percentage", IntentSymbol::Aggregate),
    // difference / change
    ("difference", IntentSymbol::Difference),
    ("delta", IntentSymbol::Difference),
    ("change", IntentSymbol::Difference),
    ("increase", IntentSymbol::Difference),
    ("decrease", IntentSymbol::Difference),
    // trend / forecast
    ("trend", IntentSymbol::Trend),
    ("growth", IntentSymbol::Trend),
    ("decline", IntentSymbol::Trend),
    ("forecast", IntentSymbol::Trend),
    ("projection", IntentSymbol::Trend),
    // sorting / ranking
    ("sort", IntentSymbol::Sort),
    ("order", IntentSymbol::Sort),
    ("rank", IntentSymbol::Sort),
    ("top", IntentSymbol::Sort),
    ("bottom", IntentSymbol::Sort),
    ("highest", IntentSymbol::Sort),
    ("lowest", IntentSymbol::Sort),
    // selection / display
    ("list", IntentSymbol::Select),
    ("show", IntentSymbol::Select),
    ("display", IntentSymbol::Select),
    ("get", IntentSymbol::Select),
    ("return", IntentSymbol::Select),
    ("provide", IntentSymbol::Select),
    ("fetch", IntentSymbol::Select),
    // filtering
    ("filter", IntentSymbol::Filter),
    ("where", IntentSymbol::Filter),
    ("with", IntentSymbol::Filter),
    ("having", IntentSymbol::Filter),
    // grouping
    ("group", IntentSymbol::GroupBy),
    ("bucket", IntentSymbol::GroupBy),
    ("cluster", IntentSymbol::GroupBy),
    ("segment", IntentSymbol::GroupBy),
    ("by", IntentSymbol::GroupBy),
    // arithmetic
    ("add", IntentSymbol::Arithmetic),
    ("plus", IntentSymbol::Arithmetic),
    ("subtract", IntentSymbol::Arithmetic),
    ("minus", IntentSymbol::Arithmetic),
    ("multiply", IntentSymbol::Arithmetic),
    ("times", IntentSymbol::Arithmetic),
    ("divide", IntentSymbol::Arithmetic),
    ("ratio", IntentSymbol::Arithmetic),
    // attribute facts
    ("height", IntentSymbol::Attribute),
    ("weight", IntentSymbol::Attribute),
    ("length", IntentSymbol::Attribute),
    ("width", IntentSymbol::Attribute),
    ("depth", IntentSymbol::Attribute),
    ("distance", IntentSymbol::Attribute),
    ("area", IntentSymbol::Attribute),
    ("volume", IntentSymbol::Attribute),
    ("size", IntentSymbol::Attribute),
    ("population", IntentSymbol::Attribute),
    ("density", IntentSymbol::Attribute),
    ("temperature", IntentSymbol::Attribute),
    ("speed", IntentSymbol::Attribute),
    ("duration", IntentSymbol::Attribute),
    ("time", IntentSymbol::Attribute),
    ("cost", IntentSymbol::Attribute),
    ("price", IntentSymbol::Attribute),
    ("salary", IntentSymbol::Attribute),
    ("revenue", IntentSymbol::Attribute),
    ("profit", IntentSymbol::Attribute),
    ("age", IntentSymbol::Attribute),
    ("capital", IntentSymbol::Attribute),
    // titles / roles
    ("president", IntentSymbol::Title),
    ("prime", IntentSymbol::Title),
    ("minister", IntentSymbol::Title),
    ("king", IntentSymbol::Title),
    ("queen", IntentSymbol::Title),
    ("ceo", IntentSymbol::Title),
    ("founder", IntentSymbol::Title),
    ("author", IntentSymbol::Title),
];

/// Lowercase lemma -> intent symbol, many-to-one
#[derive(Debug, Clone, PartialEq)]
pub struct LemmaTable {
    entries: HashMap<String, IntentSymbol>,
}

impl Default for LemmaTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LemmaTable {
    /// Vocabulary shipped with the recommender
    pub fn builtin() -> Self {
        let entries = BUILTIN_LEMMAS
            .iter()
            .map(|(lemma, symbol)| (lemma.to_string(), *symbol))
            .collect();
        Self { entries }
    }

    /// Add or replace entries; lemmas are lowercased.
    pub fn extend<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (S, IntentSymbol)>,
        S: AsRef<str>,
    {
        for (lemma, symbol) in entries {
            self.entries.insert(lemma.as_ref().trim().to_lowercase(), symbol);
        }
    }

    /// Builtin table with the entries of a `{"lemma": "SYMBOL"}` JSON file merged over it
    pub fn with_overrides(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecommenderError::Config(format!(
                "Failed to read lemma table {}: {}",
                path.display(),
                e
            ))
        })?;
        let raw: HashMap<String, String> = serde_json::from_str(&content).map_err(|e| {
            RecommenderError::Config(format!(
                "Lemma table {} is not a JSON object of strings: {}",
                path.display(),
                e
            ))
        })?;

        let mut table = Self::builtin();
        let mut parsed = Vec::with_capacity(raw.len());
        for (lemma, symbol) in raw {
            parsed.push((lemma, symbol.parse::<IntentSymbol>()?));
        }
        table.extend(parsed);
        Ok(table)
    }

    /// Lookup is case-insensitive on the lemma
    pub fn lookup(&self, lemma: &str) -> Option<IntentSymbol> {
        self.entries.get(&lemma.to_lowercase()).copied()
    }

    pub fn contains(&self, lemma: &str) -> bool {
        self.lookup(lemma).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_synonyms_share_symbol() {
        let table = LemmaTable::builtin();
        assert_eq!(table.lookup("average"), Some(IntentSymbol::Aggregate));
        assert_eq!(table.lookup("Mean"), Some(IntentSymbol::Aggregate));
        assert_eq!(table.lookup("population"), Some(IntentSymbol::Attribute));
        assert_eq!(table.lookup("by"), Some(IntentSymbol::GroupBy));
        assert_eq!(table.lookup("ceo"), Some(IntentSymbol::Title));
        assert_eq!(table.lookup("banana"), None);
    }

    #[test]
    fn test_symbol_names_round_trip() {
        assert_eq!("group_by".parse::<IntentSymbol>().unwrap(), IntentSymbol::GroupBy);
        assert_eq!(IntentSymbol::GroupBy.to_string(), "GROUP_BY");
        assert!("SHUFFLE".parse::<IntentSymbol>().is_err());
    }

    #[test]
    fn test_overrides_merge_over_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Tally": "aggregate", "time": "TREND"}}"#).unwrap();

        let table = LemmaTable::with_overrides(file.path()).unwrap();
        assert_eq!(table.lookup("tally"), Some(IntentSymbol::Aggregate));
        assert_eq!(table.lookup("time"), Some(IntentSymbol::Trend));
        assert_eq!(table.lookup("height"), Some(IntentSymbol::Attribute));
    }

    #[test]
    fn test_overrides_reject_unknown_symbol() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tally": "COUNTING"}}"#).unwrap();

        let err = LemmaTable::with_overrides(file.path()).unwrap_err();
        assert!(matches!(err, RecommenderError::Config(_)));
    }
}
