pub mod ambiguity;
pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod literal;
pub mod llm;
pub mod nlp;
pub mod router;
pub mod symbols;
pub mod unknown_terms;

pub use error::{RecommenderError, Result};
pub use router::{QueryRouter, Route, RouterResult};
