//! askdb - ask a PostgreSQL database questions in plain English.

use askdb::cli::{Cli, Command};
use askdb::config::Config;
use askdb::error::Result;
use askdb::logging;
use askdb::pipeline::Assistant;
use askdb::web::{self, EMPTY_MESSAGE};
use std::sync::Arc;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: could not load .env: {e}");
        }
    }

    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let config = load_config(&cli)?;

    info!("Database: {}", config.database.display_string());
    info!("LLM: {} ({})", config.llm.provider, config.llm.model());
    debug!("{config:?}");

    let assistant = Assistant::from_config(&config)?;

    match cli.command {
        Command::Serve { .. } => web::serve(Arc::new(assistant), &config.server.bind).await,
        Command::Ask { question, dry_run } => ask(&assistant, &question, dry_run).await,
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Loads the configuration once, in precedence order, and fails fast if incomplete.
fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config_path();
    info!("Loading config from: {}", path.display());

    let mut config = Config::load_from_file(&path)?;
    config.apply_env(env_var)?;
    cli.apply_to(&mut config)?;
    config.resolve_api_key(env_var);
    config.validate()?;

    Ok(config)
}

async fn ask(assistant: &Assistant, question: &str, dry_run: bool) -> Result<()> {
    if dry_run {
        let (query, verdict) = assistant.prepare(question).await?;
        println!("{query}");
        return verdict;
    }

    let answer = assistant.ask(question).await?;
    println!("{}\n", answer.query);

    if answer.is_empty() {
        println!("{EMPTY_MESSAGE}");
    } else {
        for line in answer.lines() {
            println!("{line}");
        }
    }

    Ok(())
}
