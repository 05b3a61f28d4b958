use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use geoqa_core::config::{Config, EmbedderConfig};
use geoqa_core::evaluation::Evaluator;
use geoqa_core::{Agent, AgentResponse, MetricsSnapshot, OllamaProvider, QueryMetrics, StepDetail};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "geoqa")]
#[command(about = "Geotechnical question answering with retrieval and calculators", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log agent activity to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Ask a question")]
    Ask {
        question: String,

        #[arg(long, default_value = "", help = "Extra text searched for calculation parameters")]
        context: String,

        #[arg(long, help = "Print the full response as JSON")]
        json: bool,
    },

    #[command(about = "Search the knowledge base")]
    Search {
        query: String,

        #[arg(short, default_value_t = 3)]
        k: usize,
    },

    #[command(about = "Run the evaluation question set")]
    Eval {
        #[arg(short, default_value_t = 3)]
        k: usize,

        #[arg(long, help = "Print the full report as JSON")]
        json: bool,
    },

    #[command(about = "List the available calculators")]
    Tools {
        #[arg(long, help = "Print tool specifications as JSON")]
        json: bool,
    },

    #[command(about = "Configuration commands")]
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    #[command(about = "Model management commands")]
    Model {
        #[command(subcommand)]
        command: ModelCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    #[command(about = "Show current configuration")]
    Show,
}

#[derive(Subcommand)]
enum ModelCommands {
    #[command(about = "Show current model")]
    Show,

    #[command(about = "Set the LLM model")]
    Set {
        #[arg(help = "Model name (e.g., 'llama3' or 'mistral:7b')")]
        model: String,
    },

    #[command(about = "List available models from Ollama")]
    List {
        #[arg(short, long, default_value = "http://localhost:11434")]
        url: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Ask {
            question,
            context,
            json,
        } => ask(&cli.config, &question, &context, json),
        Commands::Search { query, k } => search(&cli.config, &query, k),
        Commands::Eval { k, json } => eval(&cli.config, k, json),
        Commands::Tools { json } => list_tools(json),
        Commands::Config { command } => match command {
            ConfigCommands::Show => show_config(&cli.config),
        },
        Commands::Model { command } => match command {
            ModelCommands::Show => show_model(&cli.config),
            ModelCommands::Set { model } => set_model(&cli.config, &model),
            ModelCommands::List { url } => list_models(&url),
        },
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "geoqa_core=info" } else { "geoqa_core=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads the config file, or falls back to defaults when it does not exist.
fn load_config(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        Config::load(config_path).context("Failed to load config")
    } else {
        Ok(Config::default())
    }
}

fn build_agent(config: &Config) -> Result<Agent> {
    let provider = Arc::new(OllamaProvider::new(&config.llm).context("Failed to create Ollama client")?);
    Agent::from_config(config, provider, geoqa_std::default_registry()).context("Failed to build agent")
}

fn ask(config_path: &Path, question: &str, context: &str, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let agent = build_agent(&config)?;
    let metrics = QueryMetrics::new();

    let response = agent.process(question, context);
    metrics.record_response(&response);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("Failed to serialize response")?
        );
        return Ok(());
    }

    print_response(&response);
    print_metrics(&metrics.snapshot());
    Ok(())
}

fn print_response(response: &AgentResponse) {
    println!("{}", "Answer:".bold().green());
    println!("{}", response.answer);

    if !response.citations.is_empty() {
        println!();
        println!("{}", "Sources:".bold());
        for citation in &response.citations {
            println!(
                "  {} {} ({}) score {:.3}",
                "•".cyan(),
                citation.title,
                citation.source.dimmed(),
                citation.score
            );
        }
    }

    if !response.tools_used.is_empty() {
        println!();
        println!("{} {}", "Tools:".bold(), response.tools_used.join(", ").cyan());
    }

    println!();
    println!("{}", "Trace:".bold());
    for step in &response.trace {
        let detail = match &step.detail {
            StepDetail::Retrieval {
                results_count,
                top_score,
            } => format!("{} results, top score {:.3}", results_count, top_score),
            StepDetail::Tool { inputs, result } => format!("{} -> {}", inputs, result),
            StepDetail::Empty {} => String::new(),
        };
        println!("  {:<26} {:>9.2} ms  {}", step.step, step.duration_ms, detail.dimmed());
    }
    println!("  {:<26} {:>9.2} ms", "total", response.total_duration_ms);
}

fn print_metrics(snapshot: &MetricsSnapshot) {
    println!();
    println!(
        "{} requests: {}, tool calls: {}, retrievals: {}, avg {:.2} ms",
        "Metrics:".bold(),
        snapshot.total_requests,
        snapshot.tool_calls,
        snapshot.retrieval_calls,
        snapshot.avg_response_time_ms
    );
}

fn search(config_path: &Path, query: &str, k: usize) -> Result<()> {
    let config = load_config(config_path)?;
    let agent = build_agent(&config)?;

    let results = agent.index().search(query, k).context("Search failed")?;
    if results.is_empty() {
        println!("{}", "No documents indexed.".yellow());
        return Ok(());
    }

    println!("{}", "Results:".bold().green());
    for result in results {
        println!(
            "  {}. {} ({}) score {:.3}",
            result.rank,
            result.document.title.bold(),
            result.document.filename.dimmed(),
            result.score
        );
    }
    Ok(())
}

fn eval(config_path: &Path, k: usize, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let agent = build_agent(&config)?;
    let metrics = QueryMetrics::new();

    eprintln!("{} Running evaluation suite...", "→".blue());
    let report = Evaluator::new(&agent)
        .with_metrics(&metrics)
        .run(k)
        .context("Evaluation failed")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
        return Ok(());
    }

    println!();
    println!("{}", "Overall Performance:".bold().green());
    println!("  Hit@{} (Retrieval):   {:.1}%", k, report.summary.hit_at_k * 100.0);
    println!("  Keyword Match Rate:  {:.1}%", report.summary.keyword_match_rate * 100.0);
    println!("  Tool Usage Accuracy: {:.1}%", report.summary.tool_accuracy * 100.0);
    println!("  Avg Confidence:      {:.3}", report.retrieval.avg_confidence);

    println!();
    println!("{}", "Retrieval Analysis:".bold());
    for detail in &report.retrieval.details {
        let status = if detail.hit { "✓".green() } else { "✗".red() };
        let question: String = detail.question.chars().take(50).collect();
        println!("  {} {}... (score: {:.3})", status, question, detail.top_score);
    }

    print_metrics(&metrics.snapshot());
    Ok(())
}

fn list_tools(json: bool) -> Result<()> {
    let registry = geoqa_std::default_registry();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&registry.tool_specs()).context("Failed to serialize tools")?
        );
        return Ok(());
    }

    println!("{}", "Available tools:".bold().green());
    for tool in registry.all() {
        println!();
        println!("  {} {}", "•".cyan(), tool.name().bold());
        println!("    {}", tool.description());
        println!("    Triggers: {}", tool.keywords().join(", ").dimmed());
        println!(
            "    Parameters: {}",
            serde_json::to_string(&tool.parameter_schema()["properties"])
                .context("Failed to serialize schema")?
        );
    }
    Ok(())
}

fn show_config(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load config")?;

    println!("{}", "Current Configuration:".bold().green());
    println!();
    println!("{}", "LLM:".bold());
    println!("  Model:          {}", config.llm.model.cyan());
    println!("  Base URL:       {}", config.llm.base_url);
    println!("  Temperature:    {}", config.llm.temperature);
    match config.llm.timeout_secs {
        Some(secs) => println!("  Timeout:        {}s", secs),
        None => println!("  Timeout:        none"),
    }
    println!();
    println!("{}", "RAG:".bold());
    match &config.rag.embedder {
        EmbedderConfig::Hashing { dimensions } => {
            println!("  Embedder:        {} ({} dims)", "hashing".cyan(), dimensions)
        }
        EmbedderConfig::Provider { model } => {
            println!("  Embedder:        {} ({})", "provider".cyan(), model)
        }
    }
    println!("  Top K:           {}", config.rag.top_k);
    println!(
        "  Documents:       {}",
        config.rag.documents_dir.as_deref().unwrap_or("built-in")
    );
    println!();
    println!("{}", "Agent:".bold());
    println!("  Citations:       {}", config.agent.citation_count);
    println!("  Excerpt Chars:   {}", config.agent.excerpt_chars);
    for (tool, triggers) in &config.agent.triggers {
        println!("  Triggers ({}): {}", tool, triggers.join(", "));
    }

    Ok(())
}

fn show_model(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load config")?;

    println!("{}: {}", "Current model".bold(), config.llm.model.cyan());
    Ok(())
}

fn set_model(config_path: &Path, model: &str) -> Result<()> {
    let mut config = load_config(config_path)?;
    config.llm.model = model.to_string();
    config.save(config_path).context("Failed to write config file")?;

    println!("{} Model updated to: {}", "✓".green().bold(), model.cyan());

    Ok(())
}

fn list_models(base_url: &str) -> Result<()> {
    use reqwest::blocking::Client;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct OllamaModel {
        name: String,
        size: u64,
    }

    #[derive(Deserialize)]
    struct OllamaResponse {
        models: Vec<OllamaModel>,
    }

    let client = Client::new();
    let url = format!("{}/api/tags", base_url.trim_end_matches('/'));

    println!("{} Fetching models from {}...", "→".blue(), base_url);
    println!();

    let response = client
        .get(&url)
        .send()
        .context("Failed to connect to Ollama. Is it running?")?;

    if !response.status().is_success() {
        anyhow::bail!("Ollama returned error: {}", response.status());
    }

    let data: OllamaResponse = response.json().context("Failed to parse Ollama response")?;

    if data.models.is_empty() {
        println!("{}", "No models found. Pull a model with 'ollama pull <model>'".yellow());
        return Ok(());
    }

    println!("{}", "Available models:".bold().green());
    println!();

    for model in data.models {
        let size_gb = model.size as f64 / (1024.0 * 1024.0 * 1024.0);
        println!("  {} {} ({:.2} GB)", "•".cyan(), model.name.bold(), size_gb);
    }

    println!();
    println!("Use {} to set a model", "geoqa -c config.yaml model set <model>".bold());

    Ok(())
}
