// Test double for `CompletionClient`: records every prompt and answers from a
// scripted queue.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{CompletionClient, LlmError};

enum MockReply {
    Text(String),
    Fail { status: u16, message: String },
}

#[derive(Clone, Default)]
pub struct MockCompletionClient {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    always_fail: Option<(u16, String)>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers calls in order; once the queue is empty calls fail with `EmptyContent`.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        mock.replies
            .lock()
            .unwrap()
            .extend(replies.into_iter().map(|r| MockReply::Text(r.into())));
        mock
    }

    /// Every call fails with an API error.
    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            always_fail: Some((status, message.to_string())),
            ..Self::default()
        }
    }

    pub fn push_failure(&self, status: u16, message: &str) {
        self.replies.lock().unwrap().push_back(MockReply::Fail {
            status,
            message: message.to_string(),
        });
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some((status, message)) = &self.always_fail {
            return Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            });
        }

        match self.replies.lock().unwrap().pop_front() {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail { status, message }) => Err(LlmError::Api { status, message }),
            None => Err(LlmError::EmptyContent),
        }
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
