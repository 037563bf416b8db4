//! Recipebox - look up recipes from a local cache
//!
//! Shows a recipe from the on-disk cache, generating and caching it with an LLM
//! when it is missing. Any failure to produce a recipe is reported as not found.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use recipebox::cli::{Cli, Command};
use recipebox::generate::{OfflineGenerator, RecipeGenerator};
use recipebox::render::render_recipe;
use recipebox::resolver::check_identifier;
use recipebox::{Config, RecipeSchema, RecipeStore, Resolver};

/// Sets up logging to stderr, controlled by `RUST_LOG` (default: warnings only)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves and prints one recipe; failures map to a not-found message
async fn show(
    config: &Config,
    schema: Arc<RecipeSchema>,
    id: &str,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = RecipeStore::with_dir(config.data_dir.clone(), schema);
    let generator: Arc<dyn RecipeGenerator> = match config.build_generator() {
        Ok(generator) => generator,
        Err(e) => {
            // Cached recipes are still served; a miss resolves to not found
            tracing::warn!(error = %e, "generation unavailable, serving cached recipes only");
            Arc::new(OfflineGenerator)
        }
    };
    let resolver = Resolver::new(store, generator).with_persist_policy(config.persist_policy);

    match resolver.resolve(id).await {
        Ok(recipe) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&recipe)?);
            } else {
                print!("{}", render_recipe(&recipe));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(id, error = %e, "failed to resolve recipe");
            eprintln!("Recipe not found: {}", id);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Validates a JSON file and prints each violation
async fn validate_file(
    schema: &RecipeSchema,
    file: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(file).await?;
    match schema.validate_str(&content) {
        Ok(recipe) => {
            println!("{}: valid recipe '{}'", file.display(), recipe.id);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}: invalid recipe", file.display());
            for violation in e.violations() {
                eprintln!("  {}", violation);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Runs one subcommand
async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = cli.apply(Config::from_env()?);
    let schema = Arc::new(RecipeSchema::new()?);

    match &cli.command {
        Command::Show { id, json } => show(&config, schema, id, *json).await,
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(schema.document())?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { file } => validate_file(&schema, file).await,
        Command::Path { id } => {
            check_identifier(id)?;
            let store = RecipeStore::with_dir(config.data_dir.clone(), schema);
            println!("{}", store.path_for(id).display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
