//! Command-line interface parsing for Recipebox
//!
//! This module handles parsing of CLI arguments using clap and folding the global
//! flags over the environment-derived [`Config`].

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, GeneratorKind};
use crate::resolver::PersistPolicy;

/// Recipebox - look up recipes, generating the ones you don't have yet
#[derive(Parser, Debug)]
#[command(name = "recipebox")]
#[command(about = "Look up recipes from the local cache, generating missing ones with an LLM")]
#[command(version)]
pub struct Cli {
    /// Directory holding cached recipes (overrides RECIPEBOX_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Never call the generation API; only cached recipes are shown
    #[arg(long, global = true)]
    pub offline: bool,

    /// Model used for generation (overrides RECIPEBOX_MODEL)
    #[arg(long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Fail when a generated recipe cannot be written to the cache
    #[arg(long, global = true)]
    pub strict_cache: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show a recipe, generating it if it is not cached
    ///
    /// Examples:
    ///   recipebox show garlic-butter-shrimp
    ///   recipebox show garlic-butter-shrimp --json
    Show {
        /// Recipe identifier, e.g. garlic-butter-shrimp
        id: String,
        /// Print the recipe as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the recipe JSON Schema
    Schema,
    /// Check a recipe JSON file against the schema
    Validate {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Print the cache file path for a recipe identifier
    Path {
        /// Recipe identifier
        id: String,
    },
}

impl Cli {
    /// Applies command-line overrides on top of an environment-derived config
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if self.offline {
            config.generator = GeneratorKind::Offline;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if self.strict_cache {
            config.persist_policy = PersistPolicy::Required;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config::from_lookup(|key| match key {
            "RECIPEBOX_DATA_DIR" => Some("/var/cache/recipes".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_cli_parse_show() {
        let cli = Cli::parse_from(["recipebox", "show", "garlic-butter-shrimp"]);
        assert_eq!(
            cli.command,
            Command::Show {
                id: "garlic-butter-shrimp".to_string(),
                json: false
            }
        );
        assert!(!cli.offline);
    }

    #[test]
    fn test_cli_parse_show_json() {
        let cli = Cli::parse_from(["recipebox", "show", "pad-thai", "--json"]);
        assert_eq!(
            cli.command,
            Command::Show {
                id: "pad-thai".to_string(),
                json: true
            }
        );
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "recipebox",
            "show",
            "pad-thai",
            "--offline",
            "--data-dir",
            "/tmp/recipes",
        ]);
        assert!(cli.offline);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/recipes")));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["recipebox"]).is_err());
    }

    #[test]
    fn test_apply_without_flags_keeps_config() {
        let cli = Cli::parse_from(["recipebox", "schema"]);
        let config = cli.apply(base_config());
        assert_eq!(config, base_config());
    }

    #[test]
    fn test_apply_overrides_config() {
        let cli = Cli::parse_from([
            "recipebox",
            "--data-dir",
            "/tmp/recipes",
            "--offline",
            "--model",
            "gpt-4o",
            "--strict-cache",
            "path",
            "pad-thai",
        ]);
        let config = cli.apply(base_config());

        assert_eq!(config.data_dir, PathBuf::from("/tmp/recipes"));
        assert_eq!(config.generator, GeneratorKind::Offline);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.persist_policy, PersistPolicy::Required);
    }
}
