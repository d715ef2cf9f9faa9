use crate::{
    commands::{Commands, UploadArgs},
    error::CliError,
};
use agent::{AgentPipeline, OpenAiCompatClient};
use clap::Parser;
use engine_config::{EnvManager, Settings};
use federation::QueryFederator;
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "medsight",
    version = "0.1.0",
    about = "Natural-language analytics over patient health records"
)]
struct Cli {
    /// Load variables from this .env file before reading configuration
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut env = EnvManager::new();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }
    let settings = Settings::from_env(&env)?;

    match cli.command {
        Commands::Ask {
            question,
            uploads,
            include_uploaded,
            json,
        } => {
            let federator = build_federator(&settings, &uploads).await?;
            let llm = OpenAiCompatClient::builder(settings.llm_api_key()?)
                .base_url(&settings.llm.base_url)
                .model(&settings.llm.model)
                .temperature(settings.llm.temperature)
                .timeout(settings.llm.timeout)
                .build()?;
            info!(model = llm.model(), "Using LLM endpoint {}", settings.llm.base_url);

            let outcome = AgentPipeline::new(Arc::new(llm))
                .run(&question, &federator, include_uploaded)
                .await;
            output::print_outcome(&outcome, json)?;
        }
        Commands::Query {
            sql,
            uploads,
            include_uploaded,
            json,
        } => {
            let federator = build_federator(&settings, &uploads).await?;
            let (table, path) = federator.execute_traced(&sql, include_uploaded).await?;
            info!(?path, rows = table.row_count(), "Query finished");
            println!("{}", output::render_table(&table, json)?);
        }
        Commands::Sources { uploads } => {
            let session = conn::load_session(&uploads.specs)?;
            output::print_sources(&session.list());
        }
        Commands::TestConn => {
            conn::ping(&settings).await?;
            println!("Connection OK");
        }
    }

    Ok(())
}

async fn build_federator(settings: &Settings, uploads: &UploadArgs) -> Result<QueryFederator, CliError> {
    let session = conn::load_session(&uploads.specs)?;
    let remote = conn::connect_remote(settings).await?;
    Ok(QueryFederator::new(Arc::new(remote), Arc::new(session)).with_row_cap(settings.federation_row_cap))
}
