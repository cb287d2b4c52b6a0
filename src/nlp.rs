//! NLP collaborator contract
//!
//! Tokenization, lemmatization, part-of-speech tagging and entity recognition
//! are delegated to an external engine. Anything that can produce an
//! [`Analysis`] for a query can be plugged in behind [`NlpEngine`].

use crate::error::{RecommenderError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Universal part-of-speech tags. Only NOUN/PROPN matter to routing;
/// the rest are kept so the engine reply deserializes losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    #[serde(other)]
    Other,
}

impl PartOfSpeech {
    pub fn is_nominal(&self) -> bool {
        matches!(self, PartOfSpeech::Noun | PartOfSpeech::Propn)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub is_alpha: bool,
    pub is_stop: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    /// Named-entity span texts, in document order
    pub entities: Vec<String>,
}

/// Black-box language analysis engine
#[async_trait]
pub trait NlpEngine: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Analysis>;
}

#[derive(Debug, Deserialize)]
struct ParseReply {
    tokens: Vec<Token>,
    #[serde(default)]
    entities: Vec<EntitySpan>,
}

#[derive(Debug, Deserialize)]
struct EntitySpan {
    text: String,
}

/// Client for a spaCy-style HTTP service exposing `POST /parse`
#[derive(Clone)]
pub struct HttpNlpClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpNlpClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl NlpEngine for HttpNlpClient {
    async fn analyze(&self, text: &str) -> Result<Analysis> {
        let response = self
            .client
            .post(format!("{}/parse", self.base_url))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| RecommenderError::Nlp(format!("NLP service call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RecommenderError::Nlp(format!(
                "NLP service error ({}): {}",
                status, error_text
            )));
        }

        let reply: ParseReply = response
            .json()
            .await
            .map_err(|e| RecommenderError::Nlp(format!("Failed to parse NLP response: {}", e)))?;

        debug!(
            tokens = reply.tokens.len(),
            entities = reply.entities.len(),
            "NLP analysis received"
        );

        Ok(Analysis {
            tokens: reply.tokens,
            entities: reply.entities.into_iter().map(|e| e.text).collect(),
        })
    }
}
