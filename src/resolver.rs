//! Read-through recipe resolution
//!
//! A `Resolver` answers a recipe identifier from the on-disk cache when it can, and
//! otherwise generates the recipe, validates it against the same schema the cache
//! uses, writes it back, and returns it. Concurrent misses for one identifier share
//! a single generation.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;

use crate::cache::{CacheRead, RecipeStore};
use crate::data::{Recipe, ValidationError};
use crate::generate::{GenerationError, GenerationRequest, RecipeGenerator};

/// Longest identifier accepted, in bytes
pub const MAX_ID_LEN: usize = 128;

/// Errors surfaced by [`Resolver::resolve`]
///
/// Cache misses and invalid cache entries never appear here; they are recovered by
/// generating the recipe.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// The identifier cannot be mapped to a cache path
    #[error("Invalid recipe identifier: '{0}'")]
    InvalidIdentifier(String),

    /// The generator failed
    #[error("Recipe generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The generator returned a recipe that does not satisfy the schema
    #[error("Generated recipe is invalid: {0}")]
    Validation(#[from] ValidationError),

    /// The generated recipe could not be written and writes are required
    #[error("Failed to write recipe to {path}: {message}")]
    Persistence { path: String, message: String },
}

/// What to do when a generated recipe cannot be written to the cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistPolicy {
    /// Log the failure and still return the recipe
    #[default]
    BestEffort,
    /// Fail the resolution
    Required,
}

type SharedResolution = Shared<BoxFuture<'static, Result<Recipe, ResolveError>>>;

/// Resolves recipe identifiers through the cache, generating on a miss
///
/// Cloning is cheap; clones share the store, generator and in-flight generations.
#[derive(Clone)]
pub struct Resolver {
    store: RecipeStore,
    generator: Arc<dyn RecipeGenerator>,
    persist_policy: PersistPolicy,
    in_flight: Arc<Mutex<HashMap<String, SharedResolution>>>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("store", &self.store)
            .field("generator", &self.generator.name())
            .field("persist_policy", &self.persist_policy)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Creates a resolver with the [`PersistPolicy::BestEffort`] policy
    pub fn new(store: RecipeStore, generator: Arc<dyn RecipeGenerator>) -> Self {
        Self {
            store,
            generator,
            persist_policy: PersistPolicy::default(),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Sets what happens when a generated recipe cannot be cached
    pub fn with_persist_policy(mut self, policy: PersistPolicy) -> Self {
        self.persist_policy = policy;
        self
    }

    pub fn store(&self) -> &RecipeStore {
        &self.store
    }

    /// Returns the recipe for `id`, generating and caching it if needed
    ///
    /// # Returns
    /// * `Ok(Recipe)` from the cache, or freshly generated and validated
    /// * `Err(ResolveError)` if the identifier is unusable, or generation fails or
    ///   produces an invalid recipe
    pub async fn resolve(&self, id: &str) -> Result<Recipe, ResolveError> {
        check_identifier(id)?;

        match self.store.read(id).await {
            CacheRead::Hit(recipe) => {
                tracing::debug!(id, "recipe cache hit");
                return Ok(recipe);
            }
            CacheRead::Missing => {
                tracing::info!(id, "recipe cache miss");
            }
            CacheRead::Invalid(reason) => {
                tracing::warn!(id, %reason, "ignoring invalid cache entry");
            }
        }

        self.shared_generation(id).await
    }

    /// Joins the in-flight generation for `id`, starting one if there is none
    fn shared_generation(&self, id: &str) -> SharedResolution {
        let mut in_flight = lock(&self.in_flight);
        if let Some(existing) = in_flight.get(id) {
            tracing::debug!(id, "joining in-flight generation");
            return existing.clone();
        }

        let this = self.clone();
        let key = id.to_string();
        let generation = async move {
            let result = this.generate_and_store(&key).await;
            lock(&this.in_flight).remove(&key);
            result
        }
        .boxed()
        .shared();

        in_flight.insert(id.to_string(), generation.clone());
        generation
    }

    async fn generate_and_store(&self, id: &str) -> Result<Recipe, ResolveError> {
        // A generation that finished after our first read may already have written it
        if let CacheRead::Hit(recipe) = self.store.read(id).await {
            tracing::debug!(id, "recipe cached by a concurrent resolution");
            return Ok(recipe);
        }

        let schema = self.store.schema();
        let request = GenerationRequest::for_recipe(id, schema.generation_document());

        tracing::info!(id, generator = self.generator.name(), "generating recipe");
        let value = self.generator.generate(&request).await.map_err(|e| {
            tracing::warn!(id, error = %e, "recipe generation failed");
            e
        })?;

        let recipe = schema.validate(&value).map_err(|e| {
            tracing::warn!(id, error = %e, "generated recipe failed validation");
            e
        })?;

        match self.store.write(id, &recipe).await {
            Ok(path) => {
                tracing::info!(id, path = %path.display(), "recipe cached");
            }
            Err(e) => match self.persist_policy {
                PersistPolicy::BestEffort => {
                    tracing::warn!(id, error = %e, "failed to cache generated recipe");
                }
                PersistPolicy::Required => {
                    return Err(ResolveError::Persistence {
                        path: self.store.path_for(id).display().to_string(),
                        message: e.to_string(),
                    });
                }
            },
        }

        Ok(recipe)
    }
}

/// Checks that `id` is non-empty, bounded, and only uses `[A-Za-z0-9_-]`
pub fn check_identifier(id: &str) -> Result<(), ResolveError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

    if valid {
        Ok(())
    } else {
        Err(ResolveError::InvalidIdentifier(id.to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_identifier_accepts_slugs() {
        assert!(check_identifier("garlic-butter-shrimp").is_ok());
        assert!(check_identifier("Recipe_42").is_ok());
    }

    #[test]
    fn test_check_identifier_rejects_unsafe_values() {
        for id in ["", "../etc/passwd", "a/b", "a\\b", ".hidden", "two words", "ümlaut"] {
            assert_eq!(
                check_identifier(id),
                Err(ResolveError::InvalidIdentifier(id.to_string())),
                "{:?} should be rejected",
                id
            );
        }
    }

    #[test]
    fn test_check_identifier_length_limit() {
        let longest = "a".repeat(MAX_ID_LEN);
        assert!(check_identifier(&longest).is_ok());
        assert!(check_identifier(&format!("{}a", longest)).is_err());
    }

    #[test]
    fn test_persist_policy_defaults_to_best_effort() {
        assert_eq!(PersistPolicy::default(), PersistPolicy::BestEffort);
    }

    #[test]
    fn test_resolve_error_messages() {
        let err = ResolveError::Generation(GenerationError::Offline);
        assert!(err.to_string().contains("offline"));

        let err = ResolveError::InvalidIdentifier("../x".to_string());
        assert!(err.to_string().contains("../x"));
    }
}
