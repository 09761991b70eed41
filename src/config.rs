//! Configuration types for PDF-to-LaTeX conversion.
//!
//! All driver behaviour is controlled through [`ConversionConfig`], built via
//! [`ConversionConfigBuilder`]. The library never reads process-wide state on
//! its own: the only environment access is the explicit
//! [`ConversionConfigBuilder::credential_from_env`] opt-in, which the CLI
//! calls once at startup.

use crate::error::Pdf2TexError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Provider used when none is given.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Model used when none is given.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Name of the environment variable holding the API key for `provider`.
pub fn credential_var_for(provider: &str) -> String {
    match provider.to_ascii_lowercase().as_str() {
        "gemini" | "google" => "GEMINI_API_KEY".to_string(),
        "openai" => "OPENAI_API_KEY".to_string(),
        "anthropic" => "ANTHROPIC_API_KEY".to_string(),
        "mistral" => "MISTRAL_API_KEY".to_string(),
        "openrouter" => "OPENROUTER_API_KEY".to_string(),
        other => format!("{}_API_KEY", other.to_ascii_uppercase().replace('-', "_")),
    }
}

/// Configuration for a batch conversion.
///
/// # Example
/// ```rust
/// use pdf2tex::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .provider_name("openai")
///     .model("gpt-4.1-nano")
///     .credential("sk-test")
///     .build()
///     .unwrap();
/// assert_eq!(config.credential_var, "OPENAI_API_KEY");
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// edgequake-llm provider name (e.g. "gemini", "openai", "anthropic").
    pub provider_name: String,

    /// Model identifier sent with every request. Fixed for the whole batch.
    pub model: String,

    /// Environment variable the credential is read from, derived from
    /// `provider_name`. Only consulted by
    /// [`ConversionConfigBuilder::credential_from_env`].
    pub credential_var: String,

    /// The API key handed to the provider. `None` means the credential is
    /// missing and the driver refuses to start.
    pub credential: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per page. Default: 4096.
    pub max_tokens: usize,

    /// Retries per page after a failed LLM call. Default: 0.
    ///
    /// With the default a failed call stops the batch immediately.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled after each attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Strip an outer Markdown code fence from each fragment. Default: false.
    pub strip_fences: bool,

    /// Optional per-file/per-page event sink.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            provider_name: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            credential_var: credential_var_for(DEFAULT_PROVIDER),
            credential: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 4096,
            max_retries: 0,
            retry_backoff_ms: 500,
            strip_fences: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("credential_var", &self.credential_var)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("strip_fences", &self.strip_fences)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
            credential_from_env: false,
        }
    }

    /// Fail with [`Pdf2TexError::MissingCredential`] unless a non-empty
    /// credential is present.
    pub fn require_credential(&self) -> Result<&str, Pdf2TexError> {
        match self.credential.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(Pdf2TexError::MissingCredential {
                var: self.credential_var.clone(),
            }),
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
    credential_from_env: bool,
}

impl ConversionConfigBuilder {
    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn credential(mut self, key: impl Into<String>) -> Self {
        self.config.credential = Some(key.into());
        self
    }

    /// Read the credential from the environment at [`build`](Self::build)
    /// time unless one was set explicitly.
    pub fn credential_from_env(mut self) -> Self {
        self.credential_from_env = true;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn strip_fences(mut self, v: bool) -> Self {
        self.config.strip_fences = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// A missing credential is not a build error; the driver reports it when
    /// it is constructed.
    pub fn build(self) -> Result<ConversionConfig, Pdf2TexError> {
        let mut config = self.config;

        if config.provider_name.trim().is_empty() {
            return Err(Pdf2TexError::InvalidConfig(
                "provider name must not be empty".into(),
            ));
        }
        if config.model.trim().is_empty() {
            return Err(Pdf2TexError::InvalidConfig("model must not be empty".into()));
        }
        if config.max_tokens == 0 {
            return Err(Pdf2TexError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }

        config.credential_var = credential_var_for(&config.provider_name);

        if self.credential_from_env && config.credential.is_none() {
            config.credential = std::env::var(&config.credential_var)
                .ok()
                .filter(|v| !v.trim().is_empty());
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.provider_name, "gemini");
        assert_eq!(c.credential_var, "GEMINI_API_KEY");
        assert_eq!(c.max_retries, 0);
        assert!(!c.strip_fences);
        assert!(c.credential.is_none());
    }

    #[test]
    fn credential_var_follows_provider() {
        assert_eq!(credential_var_for("openai"), "OPENAI_API_KEY");
        assert_eq!(credential_var_for("Anthropic"), "ANTHROPIC_API_KEY");
        assert_eq!(credential_var_for("x-ai"), "X_AI_API_KEY");

        let c = ConversionConfig::builder()
            .provider_name("anthropic")
            .build()
            .unwrap();
        assert_eq!(c.credential_var, "ANTHROPIC_API_KEY");
    }

    #[test]
    fn credential_from_env_reads_configured_var() {
        std::env::set_var("PDF2TEX_CFG_TEST_API_KEY", "secret");
        let c = ConversionConfig::builder()
            .provider_name("pdf2tex-cfg-test")
            .credential_from_env()
            .build()
            .unwrap();
        assert_eq!(c.require_credential().unwrap(), "secret");
    }

    #[test]
    fn empty_env_credential_counts_as_missing() {
        std::env::set_var("PDF2TEX_CFG_EMPTY_API_KEY", "  ");
        let c = ConversionConfig::builder()
            .provider_name("pdf2tex-cfg-empty")
            .credential_from_env()
            .build()
            .unwrap();
        let err = c.require_credential().unwrap_err();
        assert!(matches!(err, Pdf2TexError::MissingCredential { ref var } if var == "PDF2TEX_CFG_EMPTY_API_KEY"));
    }

    #[test]
    fn debug_redacts_credential() {
        let c = ConversionConfig::builder()
            .credential("sk-very-secret")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-very-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn rejects_empty_model() {
        assert!(ConversionConfig::builder().model(" ").build().is_err());
    }

    #[test]
    fn temperature_is_clamped() {
        let c = ConversionConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }
}
