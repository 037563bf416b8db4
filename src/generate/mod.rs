//! Recipe generation through a hosted LLM
//!
//! This module provides a trait over schema-guided generation backends, an
//! OpenAI-compatible HTTP implementation, an offline backend for cache-only use,
//! and a fake backend for tests.

mod fake;
mod openai;

pub use fake::FakeGenerator;
pub use openai::{OpenAiGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL};

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while generating a recipe
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// HTTP request failed before a response arrived
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The API answered with a non-success status
    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// The API asked us to slow down
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The response did not contain a JSON object
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Generation is disabled
    #[error("Generation is disabled in offline mode")]
    Offline,
}

/// Everything a backend needs to produce one recipe
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Identifier of the recipe to generate
    pub id: String,
    /// Natural-language instruction for the model
    pub directive: String,
    /// JSON Schema the output must conform to
    pub schema: Value,
}

impl GenerationRequest {
    /// Builds the request for `id` with the standard recipe directive
    pub fn for_recipe(id: &str, schema: Value) -> Self {
        Self {
            id: id.to_string(),
            directive: recipe_directive(id),
            schema,
        }
    }
}

/// The instruction sent to the model for a recipe identifier
pub fn recipe_directive(id: &str) -> String {
    format!(
        "Generate a recipe with the ID \"{}\". For the relatedRecipeIds always generate \
         each id as 3 lowercase words joined by hyphens, similar to how the id is provided.",
        id
    )
}

/// Trait for schema-guided recipe generators
///
/// Implementations must be thread-safe. The returned value is unvalidated; callers
/// run it through the recipe schema before use.
#[async_trait]
pub trait RecipeGenerator: Send + Sync + fmt::Debug {
    /// Produce a JSON object shaped like the request's schema
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError>;

    /// Short backend name for logs (e.g., "openai", "offline")
    fn name(&self) -> &'static str;
}

/// Generator that never reaches the network
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGenerator;

#[async_trait]
impl RecipeGenerator for OfflineGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<Value, GenerationError> {
        Err(GenerationError::Offline)
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_directive_names_id_and_slug_rule() {
        let directive = recipe_directive("garlic-butter-shrimp");
        assert!(directive.contains("\"garlic-butter-shrimp\""));
        assert!(directive.contains("relatedRecipeIds"));
        assert!(directive.contains("3 lowercase words joined by hyphens"));
    }

    #[test]
    fn test_request_for_recipe() {
        let request = GenerationRequest::for_recipe("pad-thai", json!({"type": "object"}));
        assert_eq!(request.id, "pad-thai");
        assert_eq!(request.directive, recipe_directive("pad-thai"));
        assert_eq!(request.schema["type"], "object");
    }

    #[tokio::test]
    async fn test_offline_generator_always_fails() {
        let request = GenerationRequest::for_recipe("pad-thai", json!({}));
        let result = OfflineGenerator.generate(&request).await;
        assert_eq!(result, Err(GenerationError::Offline));
        assert_eq!(OfflineGenerator.name(), "offline");
    }
}
