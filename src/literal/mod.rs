//! Literal Pattern Handlers - fixed-grammar fast paths
//!
//! Structured data requests ("sort [..] in ascending order", "group by x: [..]")
//! are answered directly from the raw text, before any NLP or LLM call.
//! Handlers are probed in order and the first `Matched` wins.

pub mod group_by;
pub mod parser;
pub mod sort;

pub use group_by::GroupByHandler;
pub use parser::{parse_literal, LiteralError};
pub use sort::SortHandler;

/// Result of probing one handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Final answer text: a result, a usage hint or a parse complaint
    Matched(String),
    NoMatch,
}

pub trait LiteralHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn attempt(&self, query: &str) -> HandlerOutcome;
}

/// Sort first, then GroupBy
pub fn default_handlers() -> Vec<Box<dyn LiteralHandler>> {
    vec![Box::new(SortHandler), Box::new(GroupByHandler)]
}
