use crate::services::llm_service::{CompletionRequest, LlmError, LlmGateway};
use std::sync::Arc;

const DEFAULT_AVATAR: &str = "default_avatar.png";

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseOptions {
    pub stream: bool,
    pub max_tokens: Option<u32>,
}

/// A role description paired with a handle to a remote chat model.
#[derive(Clone)]
pub struct Agent {
    pub name: String,
    pub description: String,
    pub avatar: String,
    model: String,
    gateway: Arc<dyn LlmGateway>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        model: impl Into<String>,
        gateway: Arc<dyn LlmGateway>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            avatar: DEFAULT_AVATAR.to_string(),
            model: model.into(),
            gateway,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn get_response(&self, prompt: &str) -> Result<String, LlmError> {
        self.get_response_with(prompt, ResponseOptions::default())
            .await
    }

    pub async fn get_response_with(
        &self,
        prompt: &str,
        options: ResponseOptions,
    ) -> Result<String, LlmError> {
        let mut request = CompletionRequest::new(&self.model, prompt);
        request.stream = options.stream;
        request.max_tokens = options.max_tokens;

        log::debug!("{} sending prompt of {} chars", self.name, prompt.len());
        self.gateway.complete(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGateway {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl LlmGateway for RecordingGateway {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok("answer".to_string())
        }
    }

    #[tokio::test]
    async fn test_get_response_passes_options_through() {
        let gateway = Arc::new(RecordingGateway::default());
        let agent = Agent::new("Tester", "test agent", "some-model", gateway.clone())
            .with_avatar("travel_avatar.png");

        let answer = agent
            .get_response_with(
                "prompt",
                ResponseOptions {
                    stream: true,
                    max_tokens: Some(100),
                },
            )
            .await
            .unwrap();

        assert_eq!(answer, "answer");
        assert_eq!(agent.avatar, "travel_avatar.png");

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests[0].model, "some-model");
        assert!(requests[0].stream);
        assert_eq!(requests[0].max_tokens, Some(100));
        assert_eq!(requests[0].messages[1].content, "prompt");
    }

    #[test]
    fn test_default_avatar() {
        let agent = Agent::new("A", "B", "m", Arc::new(RecordingGateway::default()));
        assert_eq!(agent.avatar, "default_avatar.png");
        assert_eq!(agent.model(), "m");
    }
}
