//! Cliente HTTP contra un endpoint chat-completions compatible OpenRouter.
//!
//! La generación no es sensible a latencia pero no puede colgarse para
//! siempre: timeout generoso y fijo. Una respuesta no-JSON o sin el contenido
//! esperado es un fallo duro del intento (no se reintenta más allá de la
//! ronda de reparación que ya maneja el orquestador).

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use forge_core::llm::{LlmClient, LlmError, LlmExchange};
use forge_domain::BlueprintVersion;

use super::super::prompts::{BLUEPRINT_V2_SYSTEM_PROMPT, BLUEPRINT_V3_SYSTEM_PROMPT};
use super::super::strip_code_fences;

const LLM_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_TOKENS: u32 = 8000;

/// Configuración del provider LLM, cargada normalmente desde entorno.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub default_model: String,
    pub blueprint_version: BlueprintVersion,
}

impl LlmConfig {
    pub fn new(api_key: String, base_url: String, default_model: String) -> Self {
        LlmConfig {
            api_key,
            base_url,
            default_model,
            blueprint_version: BlueprintVersion::V3,
        }
    }
}

pub struct OpenRouterClient {
    config: LlmConfig,
    http: Client,
}

impl OpenRouterClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(LLM_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        Ok(OpenRouterClient { config, http })
    }

    fn system_prompt(&self) -> &'static str {
        match self.config.blueprint_version {
            BlueprintVersion::V3 => BLUEPRINT_V3_SYSTEM_PROMPT,
            _ => BLUEPRINT_V2_SYSTEM_PROMPT,
        }
    }

    /// POST a chat/completions y extracción del documento JSON del primer
    /// choice. Los payloads crudos se devuelven intactos para auditoría.
    async fn complete(
        &self,
        user_prompt: String,
        model: &str,
        temperature: f64,
    ) -> Result<LlmExchange, LlmError> {
        let request = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": self.system_prompt() },
                { "role": "user", "content": user_prompt }
            ],
            "temperature": temperature,
            "max_tokens": MAX_TOKENS,
        });

        debug!("llm call model={model} temperature={temperature}");
        let http_response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", "https://appforge.local")
            .header("X-Title", "Appforge Control Plane")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = http_response.status();
        if !status.is_success() {
            let body = http_response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status: status.as_u16(), body });
        }

        let response: Value = http_response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(format!("non-json body: {e}")))?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                LlmError::MalformedResponse("missing choices[0].message.content".to_string())
            })?;

        let document: Value = serde_json::from_str(strip_code_fences(content))
            .map_err(|e| LlmError::MalformedResponse(format!("content is not json: {e}")))?;

        Ok(LlmExchange { document, request, response })
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    async fn generate(&self, prompt: &str, model: &str) -> Result<LlmExchange, LlmError> {
        let user_prompt = format!("Create a business application for: {prompt}");
        self.complete(user_prompt, model, 0.7).await
    }

    async fn repair(
        &self,
        original_prompt: &str,
        invalid_json: &str,
        validation_errors: &str,
        model: &str,
    ) -> Result<LlmExchange, LlmError> {
        let user_prompt = format!(
            "The previous blueprint generation had validation errors. Please fix them.\n\n\
             Original request: {original_prompt}\n\n\
             Invalid JSON:\n{invalid_json}\n\n\
             Validation errors:\n{validation_errors}\n\n\
             Return ONLY the corrected valid JSON. No explanations."
        );
        // Temperatura baja para reparaciones: queremos la corrección mínima.
        self.complete(user_prompt, model, 0.3).await
    }
}
