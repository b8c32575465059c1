//! Completion functions
//!
//! Evals never talk to a model directly; they call a [`CompletionFn`]
//! handed to them at construction time. [`StubCompletionFn`] is the
//! implementation wired in when no model endpoint is available: it keeps
//! every prompt it receives and answers with a fixed dummy completion.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Completion text returned by [`StubCompletionFn`]
pub const DUMMY_COMPLETION: &str = "This is a dummy response.";

/// Keyword parameters forwarded to a completion function
pub type CompletionParams = Map<String, Value>;

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Prompt handed to a completion function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prompt {
    /// Plain text prompt
    Text(String),
    /// Chat-formatted prompt
    Chat(Vec<ChatMessage>),
    /// Anything else a sample carries as its input
    Other(Value),
}

impl Prompt {
    /// Interpret a sample's input field as a prompt
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|_| Prompt::Other(value.clone()))
    }

    /// JSON form of the prompt, as recorded in events
    pub fn to_value(&self) -> Value {
        match self {
            Prompt::Text(text) => Value::String(text.clone()),
            Prompt::Chat(messages) => {
                serde_json::to_value(messages).unwrap_or_else(|_| Value::Array(Vec::new()))
            }
            Prompt::Other(value) => value.clone(),
        }
    }
}

/// Outcome of a completion call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    completions: Vec<String>,
    #[serde(default)]
    dummy: bool,
}

impl CompletionResult {
    /// Wrap completions produced by a real model
    pub fn new(completions: Vec<String>) -> Self {
        Self {
            completions,
            dummy: false,
        }
    }

    /// The placeholder result produced by the stub
    pub fn dummy() -> Self {
        Self {
            completions: vec![DUMMY_COMPLETION.to_string()],
            dummy: true,
        }
    }

    /// All completion strings
    pub fn completions(&self) -> &[String] {
        &self.completions
    }

    /// First completion, the one graders sample
    pub fn first(&self) -> Option<&str> {
        self.completions.first().map(String::as_str)
    }

    /// Whether this result came from the stub rather than a model
    pub fn is_dummy(&self) -> bool {
        self.dummy
    }
}

/// Errors a completion function may raise
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Completion request failed: {0}")]
    Request(String),

    #[error("Completion returned no choices")]
    Empty,
}

/// Produces completions for prompts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionFn: Send + Sync {
    /// Complete a prompt with the given keyword parameters
    async fn complete(
        &self,
        prompt: &Prompt,
        params: &CompletionParams,
    ) -> Result<CompletionResult, CompletionError>;
}

/// Completion function that returns a dummy answer
#[derive(Debug, Default)]
pub struct StubCompletionFn {
    prompts: Mutex<Vec<Prompt>>,
}

impl StubCompletionFn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl CompletionFn for StubCompletionFn {
    async fn complete(
        &self,
        prompt: &Prompt,
        _params: &CompletionParams,
    ) -> Result<CompletionResult, CompletionError> {
        self.prompts.lock().push(prompt.clone());
        Ok(CompletionResult::dummy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_stub_records_prompts_in_order() {
        let stub = StubCompletionFn::new();
        let params = CompletionParams::new();

        let first = stub
            .complete(&Prompt::Text("one".to_string()), &params)
            .await
            .unwrap();
        stub.complete(&Prompt::Text("two".to_string()), &params)
            .await
            .unwrap();

        assert!(first.is_dummy());
        assert_eq!(first.first(), Some(DUMMY_COMPLETION));
        assert_eq!(
            stub.prompts(),
            vec![
                Prompt::Text("one".to_string()),
                Prompt::Text("two".to_string())
            ]
        );
        assert_eq!(stub.call_count(), 2);
    }

    #[test]
    fn test_prompt_from_value() {
        let chat = json!([{"role": "user", "content": "hi"}]);
        match Prompt::from_value(&chat) {
            Prompt::Chat(messages) => {
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].role, "user");
            }
            other => panic!("expected chat prompt, got {other:?}"),
        }

        assert_eq!(
            Prompt::from_value(&json!("plain")),
            Prompt::Text("plain".to_string())
        );
        assert_eq!(Prompt::from_value(&json!(42)), Prompt::Other(json!(42)));
        assert_eq!(Prompt::from_value(&chat).to_value(), chat);
    }

    #[tokio::test]
    async fn test_mock_completion_fn() {
        let mut mock = MockCompletionFn::new();
        mock.expect_complete()
            .times(1)
            .returning(|_, _| Ok(CompletionResult::new(vec!["time".to_string()])));

        let result = mock
            .complete(&Prompt::Text("Once upon a ".to_string()), &CompletionParams::new())
            .await
            .unwrap();
        assert_eq!(result.first(), Some("time"));
        assert!(!result.is_dummy());
    }
}
