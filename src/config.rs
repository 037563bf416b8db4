//! Runtime configuration from environment variables
//!
//! Values are read from the environment first and may then be overridden by
//! command-line flags (see `cli.rs`).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::cache::RecipeStore;
use crate::generate::{
    OfflineGenerator, OpenAiGenerator, RecipeGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
use crate::resolver::PersistPolicy;

/// Cache directory used when no home directory can be found
pub const FALLBACK_DATA_DIR: &str = "data";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unknown generator '{0}'. Valid generators: openai, offline")]
    UnknownGenerator(String),
}

/// Which generation backend to use on a cache miss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    OpenAi,
    Offline,
}

impl FromStr for GeneratorKind {
    type Err = ConfigError;

    /// Parses a generator name (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(GeneratorKind::OpenAi),
            "offline" | "none" => Ok(GeneratorKind::Offline),
            _ => Err(ConfigError::UnknownGenerator(s.to_string())),
        }
    }
}

/// Resolved configuration for a resolver instance
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory of the recipe cache
    pub data_dir: PathBuf,
    pub generator: GeneratorKind,
    /// API key, required for [`GeneratorKind::OpenAi`]
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub persist_policy: PersistPolicy,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &self.data_dir)
            .field("generator", &self.generator)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("persist_policy", &self.persist_policy)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Optional:
    /// - `RECIPEBOX_DATA_DIR`: Cache root (default: platform cache dir, e.g. `~/.cache/recipebox`)
    /// - `RECIPEBOX_GENERATOR`: `openai` or `offline` (default: `openai`)
    /// - `OPENAI_API_KEY`: API key, checked when the generator is built
    /// - `RECIPEBOX_MODEL`: Model name (default: `gpt-4o-mini`)
    /// - `RECIPEBOX_API_BASE`: API base URL (default: `https://api.openai.com/v1`)
    /// - `RECIPEBOX_STRICT_CACHE`: Fail when the cache cannot be written (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("RECIPEBOX_DATA_DIR")
            .map(PathBuf::from)
            .or_else(RecipeStore::default_dir)
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR));

        let generator = match lookup("RECIPEBOX_GENERATOR") {
            Some(name) => name.parse()?,
            None => GeneratorKind::OpenAi,
        };

        let api_key = lookup("OPENAI_API_KEY").filter(|key| !key.is_empty());
        let model = lookup("RECIPEBOX_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = lookup("RECIPEBOX_API_BASE").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let strict = lookup("RECIPEBOX_STRICT_CACHE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            data_dir,
            generator,
            api_key,
            model,
            api_base,
            persist_policy: if strict {
                PersistPolicy::Required
            } else {
                PersistPolicy::BestEffort
            },
        })
    }

    /// Builds the generator this configuration selects
    pub fn build_generator(&self) -> Result<Arc<dyn RecipeGenerator>, ConfigError> {
        match self.generator {
            GeneratorKind::Offline => Ok(Arc::new(OfflineGenerator)),
            GeneratorKind::OpenAi => {
                let api_key = self
                    .api_key
                    .clone()
                    .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;
                Ok(Arc::new(
                    OpenAiGenerator::new(api_key, self.model.clone()).with_base_url(&self.api_base),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.generator, GeneratorKind::OpenAi);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_base, "https://api.openai.com/v1");
        assert_eq!(config.persist_policy, PersistPolicy::BestEffort);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = Config::from_lookup(lookup_from(&[
            ("RECIPEBOX_DATA_DIR", "/tmp/recipes"),
            ("RECIPEBOX_GENERATOR", "Offline"),
            ("OPENAI_API_KEY", "sk-test"),
            ("RECIPEBOX_MODEL", "gpt-4o"),
            ("RECIPEBOX_API_BASE", "http://localhost:8080/v1"),
            ("RECIPEBOX_STRICT_CACHE", "1"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/recipes"));
        assert_eq!(config.generator, GeneratorKind::Offline);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_base, "http://localhost:8080/v1");
        assert_eq!(config.persist_policy, PersistPolicy::Required);
    }

    #[test]
    fn test_unknown_generator_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("RECIPEBOX_GENERATOR", "llama")]));
        assert_eq!(
            result,
            Err(ConfigError::UnknownGenerator("llama".to_string()))
        );
    }

    #[test]
    fn test_empty_api_key_counts_as_missing() {
        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_openai_generator_requires_api_key() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        let err = config.build_generator().unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()));
    }

    #[test]
    fn test_build_generator_selects_backend() {
        let offline = Config::from_lookup(lookup_from(&[("RECIPEBOX_GENERATOR", "offline")]))
            .unwrap()
            .build_generator()
            .unwrap();
        assert_eq!(offline.name(), "offline");

        let openai = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")]))
            .unwrap()
            .build_generator()
            .unwrap();
        assert_eq!(openai.name(), "openai");
    }

    #[test]
    fn test_generator_kind_parse() {
        assert_eq!("openai".parse::<GeneratorKind>(), Ok(GeneratorKind::OpenAi));
        assert_eq!("OPENAI".parse::<GeneratorKind>(), Ok(GeneratorKind::OpenAi));
        assert_eq!("none".parse::<GeneratorKind>(), Ok(GeneratorKind::Offline));
        assert_eq!(
            "gemini".parse::<GeneratorKind>(),
            Err(ConfigError::UnknownGenerator("gemini".to_string()))
        );
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let config =
            Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-secret-123")])).unwrap();

        let debug = format!("{:?}", config);

        assert!(!debug.contains("sk-secret-123"), "got: {}", debug);
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("gpt-4o-mini"));
    }
}
