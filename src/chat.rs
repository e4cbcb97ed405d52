//! Chat orchestration: existing configuration + instruction → generation.
//!
//! [`ChatPipeline::handle`] performs, in order:
//!
//! 1. a best-effort [`FormStore::read`] of the form; any failure (missing
//!    document, unreachable store) is logged and replaced by `{}`,
//! 2. null pruning of the document ([`prune_to_string`]),
//! 3. a single [`Generator::generate`] call with the rendered system
//!    instructions, the pruned document and the caller's instruction,
//! 4. pass-through of the generator's raw text.
//!
//! Store failures never reach the caller: a form with no saved
//! configuration must still be able to get a first one. Generation
//! failures are returned as-is.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::GenerationError;
use crate::generation::Generator;
use crate::prompt::render_system_prompt;
use crate::prune::prune_to_string;
use crate::store::FormStore;

/// Inbound chat request, `{"prompt": ..., "formId": ...}` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(rename = "formId", default)]
    pub form_id: String,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>, form_id: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            form_id: form_id.into(),
        }
    }

    /// Both fields must be present and non-blank.
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.trim().is_empty() {
            return Err("prompt must not be empty".to_string());
        }
        if self.form_id.trim().is_empty() {
            return Err("formId must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct ChatPipeline {
    store: Arc<dyn FormStore>,
    generator: Arc<dyn Generator>,
}

impl ChatPipeline {
    pub fn new(store: Arc<dyn FormStore>, generator: Arc<dyn Generator>) -> Self {
        Self { store, generator }
    }

    /// Load the stored configuration for `form_id`, or `{}` if it cannot be
    /// read for any reason.
    pub async fn load_context(&self, form_id: &str) -> Value {
        match self.store.read(form_id).await {
            Ok(doc) => doc,
            Err(e) if e.is_not_found() => {
                tracing::info!(form_id, "no stored configuration, starting empty");
                json!({})
            }
            Err(e) => {
                tracing::warn!(form_id, error = %e, "store read failed, starting empty");
                json!({})
            }
        }
    }

    pub async fn handle(&self, request: &ChatRequest) -> Result<String, GenerationError> {
        let form = self.load_context(&request.form_id).await;
        let context = prune_to_string(&form);
        let system = render_system_prompt(&context, &request.prompt);

        let output = self
            .generator
            .generate(&system, &context, &request.prompt)
            .await
            .map_err(|e| {
                tracing::error!(form_id = %request.form_id, error = %e, "generation failed");
                e
            })?;

        tracing::debug!(form_id = %request.form_id, bytes = output.len(), "generation complete");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryFormStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call and answers with a fixed string.
    struct RecordingGenerator {
        calls: Mutex<Vec<(String, String, String)>>,
        reply: Result<String, ()>,
    }

    impl RecordingGenerator {
        fn ok(reply: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Ok(reply.to_string()),
            }
        }

        fn failing() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Err(()),
            }
        }

        fn calls(&self) -> Vec<(String, String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        fn model_name(&self) -> &str {
            "recording"
        }

        async fn generate(
            &self,
            system: &str,
            context: &str,
            instruction: &str,
        ) -> Result<String, GenerationError> {
            self.calls.lock().unwrap().push((
                system.to_string(),
                context.to_string(),
                instruction.to_string(),
            ));
            self.reply
                .clone()
                .map_err(|_| GenerationError::Request("boom".to_string()))
        }
    }

    fn pipeline(
        store: Arc<InMemoryFormStore>,
        generator: Arc<RecordingGenerator>,
    ) -> ChatPipeline {
        ChatPipeline::new(store, generator)
    }

    #[tokio::test]
    async fn test_context_is_pruned_document() {
        let store = Arc::new(InMemoryFormStore::new());
        store.insert(
            "f1",
            json!({"formId": "f1", "title": "T", "description": null}),
        );
        let generator = Arc::new(RecordingGenerator::ok("out"));

        let out = pipeline(store, generator.clone())
            .handle(&ChatRequest::new("rename it", "f1"))
            .await
            .unwrap();
        assert_eq!(out, "out");

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        let (system, context, instruction) = &calls[0];
        let context: Value = serde_json::from_str(context).unwrap();
        assert_eq!(context, json!({"formId": "f1", "title": "T"}));
        assert_eq!(instruction, "rename it");
        assert!(system
            .contains(r#"The user is potentially changing: {"formId":"f1","title":"T"}"#));
    }

    #[tokio::test]
    async fn test_store_unavailable_uses_empty_context() {
        let store = Arc::new(InMemoryFormStore::new());
        store.insert("f1", json!({"formId": "f1"}));
        store.set_unavailable(true);
        let generator = Arc::new(RecordingGenerator::ok("out"));

        let out = pipeline(store, generator.clone())
            .handle(&ChatRequest::new("make a form", "f1"))
            .await
            .unwrap();
        assert_eq!(out, "out");
        assert_eq!(generator.calls()[0].1, "{}");
    }

    #[tokio::test]
    async fn test_missing_form_uses_empty_context() {
        let store = Arc::new(InMemoryFormStore::new());
        let generator = Arc::new(RecordingGenerator::ok("out"));

        pipeline(store, generator.clone())
            .handle(&ChatRequest::new("make a form", "new-form"))
            .await
            .unwrap();
        assert_eq!(generator.calls()[0].1, "{}");
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let store = Arc::new(InMemoryFormStore::new());
        let generator = Arc::new(RecordingGenerator::failing());

        let err = pipeline(store, generator)
            .handle(&ChatRequest::new("make a form", "f1"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Request(_)));
    }

    #[tokio::test]
    async fn test_output_passed_through_unmodified() {
        let store = Arc::new(InMemoryFormStore::new());
        let generator = Arc::new(RecordingGenerator::ok("not json at all"));

        let out = pipeline(store, generator)
            .handle(&ChatRequest::new("x", "f1"))
            .await
            .unwrap();
        assert_eq!(out, "not json at all");
    }

    #[tokio::test]
    async fn test_each_request_reads_store() {
        let store = Arc::new(InMemoryFormStore::new());
        let generator = Arc::new(RecordingGenerator::ok("out"));
        let p = pipeline(store.clone(), generator);

        p.handle(&ChatRequest::new("a", "f1")).await.unwrap();
        p.handle(&ChatRequest::new("b", "f1")).await.unwrap();
        assert_eq!(store.read_count(), 2);
    }

    #[test]
    fn test_request_wire_names_and_validation() {
        let req: ChatRequest =
            serde_json::from_value(json!({"prompt": "hi", "formId": "f1"})).unwrap();
        assert_eq!(req.form_id, "f1");
        assert!(req.validate().is_ok());

        let req: ChatRequest = serde_json::from_value(json!({"prompt": "hi"})).unwrap();
        assert_eq!(req.validate().unwrap_err(), "formId must not be empty");

        let req = ChatRequest::new("   ", "f1");
        assert_eq!(req.validate().unwrap_err(), "prompt must not be empty");
    }
}
