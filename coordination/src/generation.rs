//! Text-generation seam.
//!
//! The engine never talks to a model directly. It hands a [`Prompt`] to a
//! [`Generator`] and gets text back. Latency, retries and rate limits belong
//! to the implementation; a deadline can be layered on with
//! [`TimeoutGenerator`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("backend returned no content")]
    Empty,

    #[error("unusable content: {0}")]
    Unusable(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

/// A role-framed prompt: persona instructions plus the turn request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Opaque text generator.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        (**self).generate(prompt).await
    }
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Box<G> {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        (**self).generate(prompt).await
    }
}

/// Wraps a generator with a per-call deadline.
pub struct TimeoutGenerator<G> {
    inner: G,
    timeout: Duration,
}

impl<G> TimeoutGenerator<G> {
    pub fn new(inner: G, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<G: Generator> Generator for TimeoutGenerator<G> {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        match tokio::time::timeout(self.timeout, self.inner.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "generation deadline exceeded");
                Err(GenerationError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Generator for Echo {
        async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
            Ok(prompt.user.clone())
        }
    }

    struct Sleepy(Duration);

    #[async_trait]
    impl Generator for Sleepy {
        async fn generate(&self, _prompt: &Prompt) -> Result<String, GenerationError> {
            tokio::time::sleep(self.0).await;
            Ok("late".to_string())
        }
    }

    #[tokio::test]
    async fn test_arc_and_box_delegate() {
        let prompt = Prompt::new("sys", "hello");
        let arc: Arc<dyn Generator> = Arc::new(Echo);
        assert_eq!(arc.generate(&prompt).await.unwrap(), "hello");
        let boxed: Box<dyn Generator> = Box::new(Echo);
        assert_eq!(boxed.generate(&prompt).await.unwrap(), "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires() {
        let gen = TimeoutGenerator::new(Sleepy(Duration::from_secs(30)), Duration::from_secs(5));
        let err = gen.generate(&Prompt::new("s", "u")).await.unwrap_err();
        assert_eq!(err, GenerationError::Timeout(Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_passes_fast_calls() {
        let gen = TimeoutGenerator::new(Sleepy(Duration::from_secs(1)), Duration::from_secs(5));
        assert_eq!(gen.generate(&Prompt::new("s", "u")).await.unwrap(), "late");
        assert_eq!(gen.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_error_display() {
        let err = GenerationError::Status {
            status: 429,
            body: "slow down".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert_eq!(
            GenerationError::Empty.to_string(),
            "backend returned no content"
        );
    }
}
