//! Runtime configuration from the environment (`.env` is loaded by the binary)

use crate::ambiguity::AmbiguityClassifier;
use crate::classifier::ClassifierModel;
use crate::error::Result;
use crate::llm::LlmClient;
use crate::nlp::HttpNlpClient;
use crate::router::QueryRouter;
use crate::symbols::LemmaTable;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";
pub const DEFAULT_LLM_MODEL: &str = "llama3.1:latest";
pub const DEFAULT_NLP_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_CLASSIFIER_PATH: &str = "models/ambiguity_clf.json";

#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    /// OpenAI-compatible base, e.g. `http://127.0.0.1:11434/v1`
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub nlp_base_url: String,
    pub classifier_path: PathBuf,
    pub lemma_table_path: Option<PathBuf>,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            llm_base_url: format!("{}/v1", DEFAULT_OLLAMA_HOST),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_api_key: None,
            nlp_base_url: DEFAULT_NLP_BASE_URL.to_string(),
            classifier_path: PathBuf::from(DEFAULT_CLASSIFIER_PATH),
            lemma_table_path: None,
        }
    }
}

impl RecommenderConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let llm_base_url = get("LLM_BASE_URL")
            .or_else(|| {
                get("OLLAMA_HOST").map(|host| format!("{}/v1", host.trim_end_matches('/')))
            })
            .unwrap_or(defaults.llm_base_url);

        Self {
            llm_base_url,
            llm_model: get("LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_api_key: get("LLM_API_KEY"),
            nlp_base_url: get("NLP_BASE_URL").unwrap_or(defaults.nlp_base_url),
            classifier_path: get("AMBIGUITY_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.classifier_path),
            lemma_table_path: get("LEMMA_TABLE_PATH").map(PathBuf::from),
        }
    }

    pub fn load_lemmas(&self) -> Result<LemmaTable> {
        match &self.lemma_table_path {
            Some(path) => LemmaTable::with_overrides(path),
            None => Ok(LemmaTable::builtin()),
        }
    }

    /// Load the shared resources and wire the HTTP collaborators into a router
    pub fn build_router(&self) -> Result<QueryRouter> {
        let lemmas = Arc::new(self.load_lemmas()?);
        let classifier: Arc<dyn AmbiguityClassifier> =
            Arc::new(ClassifierModel::load(&self.classifier_path)?);
        let nlp = Arc::new(HttpNlpClient::new(self.nlp_base_url.clone()));
        let llm = Arc::new(LlmClient::new(
            self.llm_api_key.clone(),
            self.llm_model.clone(),
            self.llm_base_url.clone(),
        ));

        info!(
            "Router ready: model={} llm={} nlp={} lemmas={}",
            self.llm_model,
            self.llm_base_url,
            self.nlp_base_url,
            lemmas.len()
        );

        Ok(QueryRouter::new(nlp, llm, lemmas, classifier))
    }
}
