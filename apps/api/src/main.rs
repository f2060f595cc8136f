use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use postgen::config::Config;
use postgen::dataset::{Language, LengthBucket};
use postgen::few_shot::FewShotPosts;
use postgen::generation::generator::PostGenerator;
use postgen::llm_client::{CompletionClient, LlmClient};
use postgen::preprocess::{preprocess_file, tags::LlmTagUnifier, Unification};
use postgen::routes::build_router;
use postgen::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "postgen", version, about = "Few-shot LinkedIn post generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web UI and JSON API
    Serve {
        /// Enriched dataset (defaults to DATASET_PATH)
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Listen port (defaults to PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Enrich a raw post export and unify its tags
    Preprocess {
        /// Raw dataset (defaults to RAW_DATASET_PATH)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output file (defaults to DATASET_PATH)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate one post and print it to stdout
    Generate {
        #[arg(long, value_enum, ignore_case = true)]
        length: LengthBucket,
        #[arg(long, value_enum, ignore_case = true, default_value_t = Language::English)]
        language: Language,
        #[arg(long)]
        tag: String,
        /// Enriched dataset (defaults to DATASET_PATH)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let mut config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let llm: Arc<dyn CompletionClient> = Arc::new(LlmClient::from_config(&config)?);
    info!("LLM client initialized (model: {})", llm.model());

    match cli.command {
        Command::Serve { dataset, port } => {
            if let Some(path) = dataset {
                config.dataset_path = path;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config, llm).await
        }
        Command::Preprocess { input, output } => {
            let input = input.unwrap_or_else(|| config.raw_dataset_path.clone());
            let output = output.unwrap_or_else(|| config.dataset_path.clone());
            let unifier = LlmTagUnifier::new(llm);

            let outcome = preprocess_file(&input, &output, &unifier)
                .await
                .with_context(|| format!("Preprocessing {} failed", input.display()))?;

            match outcome.unification {
                Unification::Unified { raw_tags, vocabulary } => {
                    info!("Unified {raw_tags} raw tags into {vocabulary} tags")
                }
                Unification::Skipped { raw_tags } => {
                    info!("Tag unification skipped, kept {raw_tags} original tags")
                }
            }
            Ok(())
        }
        Command::Generate { length, language, tag, dataset } => {
            let path = dataset.unwrap_or_else(|| config.dataset_path.clone());
            let posts = load_posts(&path)?;
            let generator = PostGenerator::new(posts, llm);
            let text = generator.generate_text(length, language, &tag).await?;
            println!("{text}");
            Ok(())
        }
    }
}

async fn serve(config: Config, llm: Arc<dyn CompletionClient>) -> Result<()> {
    info!("Starting postgen v{}", env!("CARGO_PKG_VERSION"));

    let posts = load_posts(&config.dataset_path)?;
    let state = AppState {
        generator: PostGenerator::new(posts, llm),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads the enriched dataset once. A missing or malformed file is fatal.
fn load_posts(path: &std::path::Path) -> Result<Arc<FewShotPosts>> {
    let posts = FewShotPosts::load(path).with_context(|| {
        format!(
            "Could not load dataset {}. Run `postgen preprocess` first",
            path.display()
        )
    })?;
    info!("Few-shot dataset ready: {} posts", posts.len());
    Ok(Arc::new(posts))
}
