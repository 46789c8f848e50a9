//! KGX CLI - Command-line interface
//!
//! Usage:
//!   kgx extract <text>
//!   kgx render <text> --output graph.html
//!   kgx kb query <question>
//!   kgx kb graph

use anyhow::Context;
use clap::{Parser, Subcommand};
use kgx_core::AppConfig;
use kgx_graph::{GraphPayload, KnowledgeBase, KnowledgePipeline};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kgx")]
#[command(about = "Entity extraction and knowledge graph CLI")]
#[command(version)]
struct Cli {
    /// TOML configuration file, defaults to $KGX_CONFIG (environment variables still override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print entities, relationships and the graph payload as JSON
    Extract {
        /// Text to analyse
        text: Option<String>,
        /// Read the text from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Write the interactive graph of a text to an HTML file
    Render {
        text: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long, default_value = "graph.html")]
        output: PathBuf,
    },
    /// Query the static knowledge base
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },
}

#[derive(Subcommand)]
enum KbAction {
    /// Answer a question
    Query { question: String },
    /// Print the founded graph as JSON
    Graph,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let path = path
        .cloned()
        .or_else(|| std::env::var_os("KGX_CONFIG").map(PathBuf::from));
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn read_text(text: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display())),
        (None, None) => anyhow::bail!("provide TEXT or --file"),
    }
}

fn standalone_page(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Knowledge Graph</title>\n</head>\n<body>\n{fragment}\n</body>\n</html>\n"
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    // Logs go to stderr so JSON output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "kgx_graph={level},kgx_extractor={level}",
                    level = config.logging.level
                )
                .into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract { text, file } => {
            let text = read_text(text, file)?;
            let pipeline = KnowledgePipeline::from_config(&config).await;
            let analysis = pipeline.analyze(&text).await?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Commands::Render { text, file, output } => {
            let text = read_text(text, file)?;
            let pipeline = KnowledgePipeline::from_config(&config).await;
            let fragment = pipeline.analyze_html(&text).await;
            std::fs::write(&output, standalone_page(&fragment))
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!(output = %output.display(), "Graph written");
        }
        Commands::Kb { action } => {
            let knowledge = KnowledgeBase::load(&config.knowledge.path);
            match action {
                KbAction::Query { question } => {
                    println!("{}", knowledge.answer(&question));
                }
                KbAction::Graph => {
                    let graph = knowledge.founded_graph();
                    let layout = kgx_graph::SpringLayout::from_config(&config.layout);
                    let payload = GraphPayload::from_graph(&graph, &layout)?;
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
            }
        }
    }

    Ok(())
}
