//! Fake generator for testing.
//!
//! Returns a canned response and records every request, so tests can assert how
//! often generation happened and what it was asked for without network access.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{GenerationError, GenerationRequest, RecipeGenerator};

/// A fake generator that answers every request with the same result
#[derive(Debug)]
pub struct FakeGenerator {
    response: Result<Value, GenerationError>,
    delay: Option<Duration>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeGenerator {
    /// Answer every request with `value`
    pub fn returning(value: Value) -> Self {
        Self {
            response: Ok(value),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every request with `error`
    pub fn failing(error: GenerationError) -> Self {
        Self {
            response: Err(error),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering, to keep requests in flight
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.lock_requests().len()
    }

    /// Copies of every request received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.lock_requests().clone()
    }

    fn lock_requests(&self) -> MutexGuard<'_, Vec<GenerationRequest>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecipeGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        self.lock_requests().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.response.clone()
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fake_generator_records_requests() {
        let generator = FakeGenerator::returning(json!({"id": "pad-thai"}));
        let request = GenerationRequest::for_recipe("pad-thai", json!({}));

        let value = generator.generate(&request).await.unwrap();

        assert_eq!(value["id"], "pad-thai");
        assert_eq!(generator.call_count(), 1);
        assert_eq!(generator.requests()[0].id, "pad-thai");
    }

    #[tokio::test]
    async fn test_fake_generator_failure() {
        let generator = FakeGenerator::failing(GenerationError::RequestFailed("boom".to_string()));
        let request = GenerationRequest::for_recipe("pad-thai", json!({}));

        let result = generator.generate(&request).await;

        assert_eq!(
            result,
            Err(GenerationError::RequestFailed("boom".to_string()))
        );
        assert_eq!(generator.call_count(), 1);
    }
}
