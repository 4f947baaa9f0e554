mod config;
mod generate_cmd;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use clap::{Parser, Subcommand};

use fitgen_core::WorkoutService;
use fitgen_core::generator::{Provider, build_generator};
use fitgen_db::pool;

use config::FitgenConfig;

#[derive(Parser)]
#[command(name = "fitgen", about = "Personal workout plan generator")]
struct Cli {
    /// Database URL (overrides FITGEN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a fitgen config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/fitgen")]
        db_url: String,
        /// LLM provider: gemini or openai
        #[arg(long, default_value = "gemini")]
        provider: String,
        /// API key for the provider (otherwise read from the environment)
        #[arg(long)]
        api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the fitgen database (requires config file or env vars)
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
    /// Generate one workout plan for a user and print it as JSON
    Generate {
        /// User ID to generate for
        user_id: String,
    },
}

/// Execute the `fitgen init` command: write config file.
fn cmd_init(db_url: &str, provider: &str, api_key: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let provider: Provider = provider.parse()?;
    let has_key = api_key.is_some();

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        llm: config::LlmSection {
            provider: provider.to_string(),
            api_key,
            ..config::LlmSection::default()
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  llm.provider = {provider}");
    if !has_key {
        println!(
            "  llm.api_key not set; export {} before running `fitgen serve`",
            provider.api_key_env()
        );
    }
    println!();
    println!("Next: run `fitgen db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `fitgen db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = FitgenConfig::resolve(cli_db_url)?;

    println!("Initializing fitgen database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Connect to the target database.
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    // 3. Run migrations.
    pool::run_migrations(&db_pool).await?;

    // 4. Print success with table counts.
    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    // 5. Clean shutdown.
    db_pool.close().await;

    println!("fitgen db-init complete.");
    Ok(())
}

/// Connect to the database and build the workout service.
async fn connect(cli_db_url: Option<&str>) -> anyhow::Result<(sqlx::PgPool, WorkoutService)> {
    let resolved = FitgenConfig::resolve(cli_db_url)?;
    let generator = build_generator(&resolved.generator_config()?)?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    let service = WorkoutService::new(db_pool.clone(), generator);
    Ok((db_pool, service))
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
        Commands::Init {
            db_url,
            provider,
            api_key,
            force,
        } => {
            cmd_init(&db_url, &provider, api_key, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Serve { bind, port } => {
            let (db_pool, service) = connect(cli.database_url.as_deref()).await?;
            let state = serve_cmd::AppState::new(db_pool.clone(), service);
            let result = serve_cmd::run_serve(state, &bind, port).await;
            db_pool.close().await;
            result?;
        }
        Commands::Generate { user_id } => {
            let (db_pool, service) = connect(cli.database_url.as_deref()).await?;
            let result = generate_cmd::run_generate(&service, &user_id).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
