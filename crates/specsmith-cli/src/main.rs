mod config;
mod serve_cmd;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use specsmith_core::llm::OpenAiCompatClient;
use specsmith_db::pool;

use config::SpecsmithConfig;

#[derive(Parser)]
#[command(name = "specsmith", about = "LLM-backed project brief decomposition service")]
struct Cli {
    /// Database URL (overrides SPECSMITH_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a specsmith config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/specsmith")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the specsmith database (create if absent, run migrations)
    DbInit,
    /// Run the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
}

/// Execute the `specsmith init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        llm: config::LlmSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  llm.base_url = {}", cfg.llm.base_url);
    println!("  llm.model = {}", cfg.llm.model);
    println!();
    println!("Set SPECSMITH_LLM_API_KEY (or GEMINI_API_KEY) in the environment.");
    println!("Next: run `specsmith db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `specsmith db-init` command: create database and run
/// migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = SpecsmithConfig::resolve(cli_db_url)?;

    println!("Initializing specsmith database...");

    pool::ensure_database_exists(&resolved.db_config).await?;

    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("specsmith db-init complete.");
    Ok(())
}

/// Execute the `specsmith serve` command: run the HTTP API.
async fn cmd_serve(cli_db_url: Option<&str>, bind: &str, port: u16) -> anyhow::Result<()> {
    let resolved = SpecsmithConfig::resolve(cli_db_url)?;

    if resolved.llm_config.api_key.is_none() {
        tracing::warn!(
            "no model API key configured; creation requests will fail until \
             SPECSMITH_LLM_API_KEY or GEMINI_API_KEY is set"
        );
    }

    let db_pool = pool::create_pool(&resolved.db_config).await?;
    let model = Arc::new(OpenAiCompatClient::new(resolved.llm_config));

    let result = serve_cmd::run_serve(db_pool.clone(), model, bind, port).await;
    db_pool.close().await;
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Serve { bind, port } => {
            cmd_serve(cli.database_url.as_deref(), &bind, port).await?;
        }
    }

    Ok(())
}
