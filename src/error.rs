use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommenderError {
    #[error("NLP error: {0}")]
    Nlp(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecommenderError>;
