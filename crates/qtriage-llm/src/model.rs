//! Model backends behind the classification capability.

use async_trait::async_trait;

use crate::mock::MockClassifier;
use crate::prompts::symptoms_from_prompt;
use crate::response::{ResponseError, ResponseResult};

/// A text-completion backend able to answer a triage prompt.
///
/// Implementations return the raw completion; parsing and validation are
/// left to the caller so every backend is held to the same checks.
#[async_trait]
pub trait TriageModel: Send + Sync {
    /// Backend name, used in log fields.
    fn name(&self) -> &str;

    /// Complete a prompt built by [`crate::prompts::build_full_prompt`].
    async fn complete(&self, prompt: &str) -> ResponseResult<String>;
}

/// Offline backend answering from the keyword lexicon.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockTriageModel;

#[async_trait]
impl TriageModel for MockTriageModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, prompt: &str) -> ResponseResult<String> {
        let symptoms = symptoms_from_prompt(prompt).ok_or_else(|| {
            ResponseError::Inference("Prompt carries no symptom block".into())
        })?;
        let response = MockClassifier::classify(symptoms);
        Ok(serde_json::to_string(&response)?)
    }
}
