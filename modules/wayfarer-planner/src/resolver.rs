use std::sync::Arc;
use std::time::Duration;

use ai_client::{Claude, CompletionModel, Gemini};
use wayfarer_common::{Config, ModelProvider};

/// Supplies the model for one request, or `None` when no credential is configured.
pub trait ModelResolver: Send + Sync {
    fn resolve(&self) -> Option<Arc<dyn CompletionModel>>;

    /// Name of the credential `resolve` depends on, for error messages.
    fn credential_var(&self) -> &'static str;
}

/// Builds a provider client from the process environment on every call.
pub struct EnvModelResolver {
    config: Config,
}

impl EnvModelResolver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ModelResolver for EnvModelResolver {
    fn resolve(&self) -> Option<Arc<dyn CompletionModel>> {
        let api_key = self.config.model_credential()?;
        let timeout = Duration::from_secs(self.config.model_timeout_secs);

        let model: Arc<dyn CompletionModel> = match self.config.model_provider {
            ModelProvider::Gemini => {
                let mut gemini = Gemini::new(api_key, &self.config.gemini_model)
                    .with_temperature(0.7)
                    .with_timeout(timeout);
                if let Some(ref base) = self.config.gemini_api_base {
                    gemini = gemini.with_base_url(base);
                }
                Arc::new(gemini)
            }
            ModelProvider::Claude => Arc::new(
                Claude::new(api_key, &self.config.claude_model)
                    .with_system("You are an expert travel planner. You answer with JSON only.")
                    .with_timeout(timeout),
            ),
        };
        Some(model)
    }

    fn credential_var(&self) -> &'static str {
        self.config.model_provider.credential_var()
    }
}

/// Always hands out the same model (or none).
pub struct StaticModelResolver {
    model: Option<Arc<dyn CompletionModel>>,
}

impl StaticModelResolver {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn unconfigured() -> Self {
        Self { model: None }
    }
}

impl ModelResolver for StaticModelResolver {
    fn resolve(&self) -> Option<Arc<dyn CompletionModel>> {
        self.model.clone()
    }

    fn credential_var(&self) -> &'static str {
        ModelProvider::Gemini.credential_var()
    }
}
