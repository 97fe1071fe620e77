//! Mock guionado del cliente LLM para tests y desarrollo sin red.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

use forge_core::llm::{LlmClient, LlmError, LlmExchange};

/// Devuelve documentos pre-cargados en orden, primero para `generate` y
/// después para cada `repair`. Un guion agotado simula un fallo de
/// transporte.
#[derive(Default)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Value>>,
}

impl MockLlmClient {
    pub fn with_documents(documents: Vec<Value>) -> Self {
        MockLlmClient { responses: Mutex::new(documents.into()) }
    }

    fn next_exchange(&self, user_prompt: &str) -> Result<LlmExchange, LlmError> {
        let document = self
            .responses
            .lock()
            .expect("mock script lock")
            .pop_front()
            .ok_or_else(|| LlmError::Transport("mock script exhausted".to_string()))?;
        Ok(LlmExchange {
            request: json!({
                "model": "mock/scripted",
                "messages": [{ "role": "user", "content": user_prompt }],
            }),
            response: json!({
                "choices": [{ "message": { "content": document.to_string() } }],
            }),
            document,
        })
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn default_model(&self) -> &str {
        "mock/scripted"
    }

    async fn generate(&self, prompt: &str, _model: &str) -> Result<LlmExchange, LlmError> {
        self.next_exchange(prompt)
    }

    async fn repair(
        &self,
        original_prompt: &str,
        _invalid_json: &str,
        _validation_errors: &str,
        _model: &str,
    ) -> Result<LlmExchange, LlmError> {
        self.next_exchange(original_prompt)
    }
}
