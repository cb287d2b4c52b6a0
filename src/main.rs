use anyhow::Result;
use clap::Parser;
use query_recommender::config::RecommenderConfig;
use query_recommender::{QueryRouter, RouterResult};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "query-recommender")]
#[command(about = "Answers analytical queries or asks clarifying questions when they are underspecified")]
struct Args {
    /// Answer a single query and exit instead of starting the prompt loop
    #[arg(short, long)]
    query: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// OpenAI-compatible LLM base URL (or set LLM_BASE_URL / OLLAMA_HOST)
    #[arg(long)]
    llm_url: Option<String>,

    /// LLM model name (or set LLM_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// LLM API key (or set LLM_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// NLP service base URL (or set NLP_BASE_URL)
    #[arg(long)]
    nlp_url: Option<String>,

    /// Ambiguity classifier artifact (or set AMBIGUITY_MODEL_PATH)
    #[arg(long)]
    classifier: Option<PathBuf>,

    /// Extra lemma -> symbol entries as JSON (or set LEMMA_TABLE_PATH)
    #[arg(long)]
    lemmas: Option<PathBuf>,
}

impl Args {
    fn apply(self, mut config: RecommenderConfig) -> RecommenderConfig {
        if let Some(url) = self.llm_url {
            config.llm_base_url = url;
        }
        if let Some(model) = self.model {
            config.llm_model = model;
        }
        if let Some(key) = self.api_key {
            config.llm_api_key = Some(key);
        }
        if let Some(url) = self.nlp_url {
            config.nlp_base_url = url;
        }
        if let Some(path) = self.classifier {
            config.classifier_path = path;
        }
        if let Some(path) = self.lemmas {
            config.lemma_table_path = Some(path);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let json = args.json;
    let one_shot = args.query.clone();
    let config = args.apply(RecommenderConfig::from_env());

    let router = config
        .build_router()
        .map_err(|e| anyhow::anyhow!("Failed to start recommender: {}", e))?;

    if let Some(query) = one_shot {
        let result = router.handle(&query).await?;
        print_result(&result, json)?;
        return Ok(());
    }

    run_prompt_loop(&router, json).await
}

async fn run_prompt_loop(router: &QueryRouter, json: bool) -> Result<()> {
    println!("Query-Recommender  (type 'exit' to quit)\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Query: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let query = line?;
        let query = query.trim();
        if query.eq_ignore_ascii_case("exit") {
            break;
        }
        if query.is_empty() {
            continue;
        }

        match router.handle(query).await {
            Ok(result) => print_result(&result, json)?,
            Err(e) => {
                error!("Query failed: {}", e);
                eprintln!("\nError: {}\n", e);
            }
        }
    }

    Ok(())
}

fn print_result(result: &RouterResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }

    match result {
        RouterResult::Answered { answer } => {
            println!("\nAnswer:\n {}\n", answer);
        }
        RouterResult::Ambiguous { questions } => {
            println!("\nNeed clarification:");
            for (i, question) in questions.iter().enumerate() {
                println!(" {}. {}", i + 1, question);
            }
            println!();
        }
    }
    Ok(())
}
