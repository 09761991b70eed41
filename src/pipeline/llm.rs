//! LLM interaction: turn one page of text into one LaTeX fragment.
//!
//! The module is intentionally thin: the instruction wording lives in
//! [`crate::prompts`] and cleanup lives in [`crate::pipeline::postprocess`].
//!
//! ## Retries
//!
//! By default a failed call is returned to the caller unchanged and the batch
//! stops. With `max_retries > 0` the call is repeated after
//! `retry_backoff_ms * 2^(attempt-1)` milliseconds (500 ms → 1 s → 2 s for the
//! default base), capped at [`MAX_RETRY_BACKOFF_MS`].

use crate::config::ConversionConfig;
use crate::error::Pdf2TexError;
use crate::output::PageText;
use crate::pipeline::postprocess;
use crate::prompts::page_instruction;
use async_trait::async_trait;
use edgequake_llm::{
    AnthropicProvider, ChatMessage, CompletionOptions, GeminiProvider, LLMProvider,
    OpenAIProvider, OpenRouterProvider, ProviderFactory,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Upper bound for a single retry delay.
pub const MAX_RETRY_BACKOFF_MS: u64 = 60_000;

/// Converts the text of one page into a LaTeX fragment.
#[async_trait]
pub trait PageTransformer: Send + Sync {
    /// Produce exactly one fragment for `page`.
    async fn transform(&self, page: &PageText) -> Result<String, Pdf2TexError>;
}

/// [`PageTransformer`] backed by a single edgequake-llm provider.
///
/// Created once per batch and shared read-only by every page call.
pub struct LlmTransformer {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    max_retries: u32,
    retry_backoff_ms: u64,
    strip_fences: bool,
}

impl LlmTransformer {
    /// Wrap an already-constructed provider.
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ConversionConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            strip_fences: config.strip_fences,
        }
    }

    /// Build the provider named in `config`, handing it `config.credential`.
    ///
    /// Fails with [`Pdf2TexError::MissingCredential`] before anything else
    /// when the credential is absent. A pre-built `config.provider` is used
    /// as-is.
    pub fn from_config(config: &ConversionConfig) -> Result<Self, Pdf2TexError> {
        let credential = config.require_credential()?;

        let provider = match config.provider {
            Some(ref provider) => Arc::clone(provider),
            None => create_provider(&config.provider_name, &config.model, credential)?,
        };

        debug!(
            "LLM provider ready: {} / {}",
            provider.name(),
            provider.model()
        );
        Ok(Self::new(provider, config))
    }
}

/// Construct the provider for `name` with an explicit API key.
///
/// Providers without a key-taking constructor go through
/// [`ProviderFactory`], which reads their environment variable itself.
fn create_provider(
    name: &str,
    model: &str,
    credential: &str,
) -> Result<Arc<dyn LLMProvider>, Pdf2TexError> {
    let provider: Arc<dyn LLMProvider> = match name.to_ascii_lowercase().as_str() {
        "gemini" | "google" if !model.starts_with("vertexai:") => {
            Arc::new(GeminiProvider::new(credential).with_model(model))
        }
        "openai" => Arc::new(OpenAIProvider::new(credential).with_model(model)),
        "anthropic" => Arc::new(AnthropicProvider::new(credential).with_model(model)),
        "openrouter" => Arc::new(OpenRouterProvider::new(credential).with_model(model)),
        _ => ProviderFactory::create_llm_provider(name, model).map_err(|e| {
            Pdf2TexError::ProviderNotConfigured {
                provider: name.to_string(),
                hint: format!("{e}"),
            }
        })?,
    };
    Ok(provider)
}

/// Delay before retry number `attempt` (1-based).
fn retry_delay_ms(base_ms: u64, attempt: u32) -> u64 {
    let factor = 2u64
        .checked_pow(attempt.saturating_sub(1))
        .unwrap_or(u64::MAX);
    base_ms.saturating_mul(factor).min(MAX_RETRY_BACKOFF_MS)
}

#[async_trait]
impl PageTransformer for LlmTransformer {
    async fn transform(&self, page: &PageText) -> Result<String, Pdf2TexError> {
        let start = Instant::now();
        let messages = vec![ChatMessage::user(page_instruction(&page.text))];

        let mut attempt = 0u32;
        loop {
            match self.provider.chat(&messages, Some(&self.options)).await {
                Ok(response) => {
                    debug!(
                        "Page {}: {} input tokens, {} output tokens, {:?}",
                        page.page_num,
                        response.prompt_tokens,
                        response.completion_tokens,
                        start.elapsed()
                    );
                    let fragment = if self.strip_fences {
                        postprocess::clean_fragment(&response.content)
                    } else {
                        postprocess::trim_fragment(&response.content)
                    };
                    return Ok(fragment);
                }
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    let backoff = retry_delay_ms(self.retry_backoff_ms, attempt);
                    warn!(
                        "Page {}: attempt {} failed: {}; retry {}/{} after {}ms",
                        page.page_num, attempt, e, attempt, self.max_retries, backoff
                    );
                    sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => {
                    return Err(Pdf2TexError::ServiceFailed {
                        page: page.page_num,
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}

/// Build `CompletionOptions` from the conversion config.
fn build_options(config: &ConversionConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::{MAX_PAGE_CHARS, PAGE_INSTRUCTION};
    use edgequake_llm::{LLMResponse, LlmError, MockProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fails the first `failures` calls, then answers `reply`. Records every
    /// user message it receives.
    struct ScriptedProvider {
        failures: usize,
        reply: String,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(failures: usize, reply: &str) -> Arc<Self> {
            Arc::new(Self {
                failures,
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        fn max_context_length(&self) -> usize {
            8192
        }

        async fn complete(&self, prompt: &str) -> edgequake_llm::Result<LLMResponse> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(prompt.to_string());
            if n < self.failures {
                Err(LlmError::ApiError(format!("boom #{}", n + 1)))
            } else {
                Ok(LLMResponse::new(self.reply.clone(), "scripted-model"))
            }
        }

        async fn complete_with_options(
            &self,
            prompt: &str,
            _options: &CompletionOptions,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete(prompt).await
        }

        async fn chat(
            &self,
            messages: &[ChatMessage],
            _options: Option<&CompletionOptions>,
        ) -> edgequake_llm::Result<LLMResponse> {
            assert_eq!(messages.len(), 1, "one user message per page");
            self.complete(&messages[0].content).await
        }
    }

    fn transformer_with(provider: Arc<dyn LLMProvider>, config: &ConversionConfig) -> LlmTransformer {
        LlmTransformer::new(provider, config)
    }

    #[test]
    fn build_options_defaults() {
        let config = ConversionConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.1));
        assert_eq!(opts.max_tokens, Some(4096));
    }

    #[test]
    fn from_config_requires_credential_first() {
        let config = ConversionConfig::builder()
            .provider_name("openai")
            .build()
            .unwrap();
        match LlmTransformer::from_config(&config) {
            Err(Pdf2TexError::MissingCredential { var }) => assert_eq!(var, "OPENAI_API_KEY"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected MissingCredential"),
        }
    }

    #[test]
    fn from_config_uses_explicit_credential_without_env() {
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("ANTHROPIC_API_KEY");

        for name in ["openai", "anthropic"] {
            let config = ConversionConfig::builder()
                .provider_name(name)
                .model("some-model")
                .credential("sk-explicit-credential")
                .build()
                .unwrap();
            let transformer = LlmTransformer::from_config(&config)
                .unwrap_or_else(|e| panic!("{name}: {e}"));
            assert_eq!(transformer.provider.name(), name);
            assert_eq!(transformer.provider.model(), "some-model");
        }
    }

    #[test]
    fn from_config_builds_default_gemini_provider() {
        let config = ConversionConfig::builder()
            .credential("explicit-gemini-key")
            .build()
            .unwrap();
        let transformer = LlmTransformer::from_config(&config).unwrap();
        assert_eq!(transformer.provider.name(), "gemini");
        assert_eq!(transformer.provider.model(), crate::config::DEFAULT_MODEL);
    }

    #[test]
    fn from_config_prefers_prebuilt_provider() {
        let config = ConversionConfig::builder()
            .credential("k")
            .provider(ScriptedProvider::new(0, "x"))
            .build()
            .unwrap();
        let transformer = LlmTransformer::from_config(&config).unwrap();
        assert_eq!(transformer.provider.name(), "scripted");
    }

    #[tokio::test]
    async fn response_is_trimmed() {
        let mock = MockProvider::new();
        mock.add_response("  \n\\section{Intro}\nBody.\n\n  ").await;
        let t = transformer_with(Arc::new(mock), &ConversionConfig::default());

        let fragment = t.transform(&PageText::new(1, "Intro Body.")).await.unwrap();
        assert_eq!(fragment, "\\section{Intro}\nBody.");
    }

    #[tokio::test]
    async fn fences_kept_unless_stripping_enabled() {
        let reply = "```latex\n\\textbf{x}\n```";

        let mock = MockProvider::new();
        mock.add_response(reply).await;
        let plain = transformer_with(Arc::new(mock), &ConversionConfig::default());
        assert_eq!(plain.transform(&PageText::new(1, "x")).await.unwrap(), reply);

        let mock = MockProvider::new();
        mock.add_response(reply).await;
        let config = ConversionConfig::builder().strip_fences(true).build().unwrap();
        let stripping = transformer_with(Arc::new(mock), &config);
        assert_eq!(
            stripping.transform(&PageText::new(1, "x")).await.unwrap(),
            "\\textbf{x}"
        );
    }

    #[tokio::test]
    async fn request_carries_only_first_3000_chars() {
        let provider = ScriptedProvider::new(0, "ok");
        let t = transformer_with(provider.clone(), &ConversionConfig::default());

        let kept = "é".repeat(MAX_PAGE_CHARS);
        let text = format!("{kept}{}", "Z".repeat(500));
        t.transform(&PageText::new(1, text)).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], format!("{PAGE_INSTRUCTION}{kept}"));
    }

    #[tokio::test]
    async fn no_retries_means_one_call_then_service_failed() {
        let provider = ScriptedProvider::new(1, "never");
        let t = transformer_with(provider.clone(), &ConversionConfig::default());

        match t.transform(&PageText::new(2, "page two")).await {
            Err(Pdf2TexError::ServiceFailed { page, message }) => {
                assert_eq!(page, 2);
                assert!(message.contains("boom #1"), "{message}");
            }
            other => panic!("expected ServiceFailed, got {other:?}"),
        }
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let provider = ScriptedProvider::new(2, "  done ");
        let config = ConversionConfig::builder()
            .max_retries(3)
            .retry_backoff_ms(0)
            .build()
            .unwrap();
        let t = transformer_with(provider.clone(), &config);

        assert_eq!(t.transform(&PageText::new(1, "p")).await.unwrap(), "done");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn retries_exhausted_reports_last_error() {
        let provider = ScriptedProvider::new(usize::MAX, "never");
        let config = ConversionConfig::builder()
            .max_retries(2)
            .retry_backoff_ms(0)
            .build()
            .unwrap();
        let t = transformer_with(provider.clone(), &config);

        let err = t.transform(&PageText::new(4, "p")).await.unwrap_err();
        assert!(matches!(err, Pdf2TexError::ServiceFailed { page: 4, .. }));
        assert!(err.to_string().contains("boom #3"), "{err}");
        assert_eq!(provider.calls(), 3);
    }

    #[test]
    fn retry_delay_doubles_and_saturates() {
        assert_eq!(retry_delay_ms(500, 1), 500);
        assert_eq!(retry_delay_ms(500, 2), 1_000);
        assert_eq!(retry_delay_ms(500, 3), 2_000);
        assert_eq!(retry_delay_ms(500, 55), MAX_RETRY_BACKOFF_MS);
        assert_eq!(retry_delay_ms(500, 64), MAX_RETRY_BACKOFF_MS);
        assert_eq!(retry_delay_ms(500, u32::MAX), MAX_RETRY_BACKOFF_MS);
        assert_eq!(retry_delay_ms(0, u32::MAX), 0);
    }
}
