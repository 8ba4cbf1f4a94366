//! Fallback generator — wraps any [`TextGenerator`] and substitutes a fixed
//! apology on error.
//!
//! When the underlying call fails for any reason (`Request`, `Timeout`,
//! `Parse`, `EmptyResponse`) [`SafeGenerator`] returns the apology reply
//! instead of propagating the error, so the user always gets an audible
//! response even when the backend is unreachable.

use async_trait::async_trait;

use crate::llm::generator::{GenError, TextGenerator};

/// What the assistant says when the reply generator fails.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong.";

// ---------------------------------------------------------------------------
// SafeGenerator
// ---------------------------------------------------------------------------

/// A wrapper around any [`TextGenerator`] that never returns an error — on
/// failure it answers with [`FALLBACK_REPLY`].
///
/// ```rust
/// use voice_assistant::config::LlmConfig;
/// use voice_assistant::llm::{ApiGenerator, SafeGenerator};
///
/// let inner = ApiGenerator::from_config(&LlmConfig::default());
/// let generator = SafeGenerator::new(inner);
/// // `generator` is safe to use even when the backend is down.
/// ```
pub struct SafeGenerator<G: TextGenerator> {
    inner: G,
}

impl<G: TextGenerator> SafeGenerator<G> {
    /// Wrap `inner` with fallback behaviour.
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    /// Return a reference to the wrapped generator.
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: TextGenerator + Send + Sync> TextGenerator for SafeGenerator<G> {
    /// Attempt generation; answer with [`FALLBACK_REPLY`] if any error
    /// occurs.  This implementation **never** returns `Err(_)`.
    async fn generate(&self, prompt: &str) -> Result<String, GenError> {
        match self.inner.generate(prompt).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                log::warn!("reply generation failed ({e}); using fallback reply");
                Ok(FALLBACK_REPLY.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Always succeeds with a fixed reply.
    struct AlwaysOk(String);

    #[async_trait]
    impl TextGenerator for AlwaysOk {
        async fn generate(&self, _prompt: &str) -> Result<String, GenError> {
            Ok(self.0.clone())
        }
    }

    /// Always returns the given error.
    struct AlwaysFails(fn() -> GenError);

    #[async_trait]
    impl TextGenerator for AlwaysFails {
        async fn generate(&self, _prompt: &str) -> Result<String, GenError> {
            Err((self.0)())
        }
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn passes_through_success() {
        let generator = SafeGenerator::new(AlwaysOk("hi there".into()));
        let reply = generator.generate("hello").await.unwrap();
        assert_eq!(reply, "hi there");
    }

    #[tokio::test]
    async fn substitutes_fallback_on_request_error() {
        let generator =
            SafeGenerator::new(AlwaysFails(|| GenError::Request("connection refused".into())));
        let reply = generator.generate("hello").await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn substitutes_fallback_on_timeout() {
        let generator = SafeGenerator::new(AlwaysFails(|| GenError::Timeout));
        let reply = generator.generate("hello").await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn substitutes_fallback_on_empty_response() {
        let generator = SafeGenerator::new(AlwaysFails(|| GenError::EmptyResponse));
        let reply = generator.generate("hello").await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
    }
}
