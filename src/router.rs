//! Query Router
//!
//! Ordered-priority decision procedure: the first applicable rule produces the
//! result and nothing after it runs.
//!
//! 1. literal handlers (sort, group by)
//! 2. WH-question shortcut straight to the LLM
//! 3. single ATTRIBUTE shortcut to the LLM
//! 4. unknown terms -> one clarifier per term
//! 5. classifier says ambiguous -> clarifying questions
//! 6. direct LLM answer

use crate::ambiguity::{AmbiguityClassifier, AmbiguityDetector};
use crate::error::Result;
use crate::extractor::SymbolExtractor;
use crate::literal::{default_handlers, HandlerOutcome, LiteralHandler};
use crate::llm::{ChatCompletion, ChatMessage};
use crate::nlp::NlpEngine;
use crate::symbols::LemmaTable;
use crate::unknown_terms::UnknownTermDetector;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub const DIRECT_PERSONA: &str = "You answer questions directly.";
pub const FACTUAL_PERSONA: &str = "You answer factual questions.";
pub const UNKNOWN_TERMS_PERSONA: &str = "Ask one concise clarifier per unknown word.";
pub const CLARIFY_PERSONA: &str = "You ask concise clarifying questions for ambiguous queries.";
pub const CLARIFY_EXAMPLE_QUERY: &str = "Show me data.";
pub const CLARIFY_EXAMPLE_QUESTION: &str = "Which data specifically do you want to see?";

lazy_static! {
    static ref WH_QUESTION: Regex = Regex::new(r"(?i)^(who|what|where|when|why|how)\b").unwrap();
}

/// Outcome of one routing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RouterResult {
    Answered { answer: String },
    Ambiguous { questions: Vec<String> },
}

/// Which rule terminated the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Literal(&'static str),
    WhQuestion,
    Attribute,
    UnknownTerms,
    Classifier,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedQuery {
    pub route: Route,
    pub result: RouterResult,
}

pub struct QueryRouter {
    handlers: Vec<Box<dyn LiteralHandler>>,
    extractor: SymbolExtractor,
    unknown_terms: UnknownTermDetector,
    ambiguity: AmbiguityDetector,
    llm: Arc<dyn ChatCompletion>,
}

impl QueryRouter {
    pub fn new(
        nlp: Arc<dyn NlpEngine>,
        llm: Arc<dyn ChatCompletion>,
        lemmas: Arc<LemmaTable>,
        classifier: Arc<dyn AmbiguityClassifier>,
    ) -> Self {
        Self {
            handlers: default_handlers(),
            extractor: SymbolExtractor::new(nlp, lemmas.clone()),
            unknown_terms: UnknownTermDetector::new(lemmas),
            ambiguity: AmbiguityDetector::new(classifier),
            llm,
        }
    }

    /// Replace the literal handler chain (probed in the given order)
    pub fn with_handlers(mut self, handlers: Vec<Box<dyn LiteralHandler>>) -> Self {
        self.handlers = handlers;
        self
    }

    pub async fn handle(&self, query: &str) -> Result<RouterResult> {
        Ok(self.route(query).await?.result)
    }

    /// Route a query and report which rule answered it
    pub async fn route(&self, raw: &str) -> Result<RoutedQuery> {
        let query = raw.trim();

        for handler in &self.handlers {
            if let HandlerOutcome::Matched(answer) = handler.attempt(query) {
                info!("Answered by literal handler '{}'", handler.name());
                return Ok(routed(Route::Literal(handler.name()), RouterResult::Answered { answer }));
            }
        }

        if WH_QUESTION.is_match(query) {
            info!("WH-question, forwarding to LLM");
            let answer = self
                .llm
                .complete(&[ChatMessage::system(DIRECT_PERSONA), ChatMessage::user(query)])
                .await?;
            return Ok(routed(Route::WhQuestion, RouterResult::Answered { answer }));
        }

        let parsed = self.extractor.extract(query).await?;

        if parsed.is_single_attribute() {
            info!("Single attribute lookup, forwarding to LLM");
            let answer = self
                .llm
                .complete(&[ChatMessage::system(FACTUAL_PERSONA), ChatMessage::user(query)])
                .await?;
            return Ok(routed(Route::Attribute, RouterResult::Answered { answer }));
        }

        let jargon = self.unknown_terms.detect(&parsed);
        if !jargon.is_empty() {
            info!(terms = ?jargon, "Unknown terms, asking for clarification");
            let response = self
                .llm
                .complete(&[
                    ChatMessage::system(UNKNOWN_TERMS_PERSONA),
                    ChatMessage::user(format!("Unknown words: {}", jargon.join(", "))),
                ])
                .await?;
            let questions = split_questions(&response);
            debug!(count = questions.len(), "Clarifiers generated");
            return Ok(routed(Route::UnknownTerms, RouterResult::Ambiguous { questions }));
        }

        if self.ambiguity.is_ambiguous(&parsed) {
            info!("Classifier flagged query as ambiguous");
            let response = self.llm.complete(&clarify_prompt(query)).await?;
            let questions = split_questions(&response);
            debug!(count = questions.len(), "Clarifying questions generated");
            return Ok(routed(Route::Classifier, RouterResult::Ambiguous { questions }));
        }

        info!("No shortcut applied, answering directly");
        let answer = self
            .llm
            .complete(&[ChatMessage::system(DIRECT_PERSONA), ChatMessage::user(query)])
            .await?;
        Ok(routed(Route::Fallback, RouterResult::Answered { answer }))
    }
}

fn routed(route: Route, result: RouterResult) -> RoutedQuery {
    RoutedQuery { route, result }
}

/// One-shot clarification prompt followed by the real query
pub fn clarify_prompt(query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(CLARIFY_PERSONA),
        ChatMessage::user(CLARIFY_EXAMPLE_QUERY),
        ChatMessage::assistant(CLARIFY_EXAMPLE_QUESTION),
        ChatMessage::user(query),
    ]
}

/// Non-empty trimmed lines of an LLM reply
pub fn split_questions(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
