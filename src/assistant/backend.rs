//! Reasoning backend client
//!
//! The ranking engine talks to a conversational assistants API through four
//! primitives: open a thread, post one prompt message, drive a run to a
//! terminal status, and read back the last assistant message. Everything
//! else (instruction sets, batching, pacing, output parsing) lives in the
//! engine.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::Result;
use crate::config::AssistantConfig;
use crate::error::Error;

/// Terminal result of one assistant run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub thread_id: String,
    /// Terminal status token as reported by the backend ("completed",
    /// "failed", "expired", ...). Carried as data: a non-completed run is
    /// an ordinary outcome, not a transport error.
    pub status: String,
}

impl RunOutcome {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

/// The four upstream primitives the pipeline depends on
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Open a fresh conversation context, returning its id
    async fn create_thread(&self) -> Result<String>;

    /// Post a single user prompt into the thread
    async fn post_message(&self, thread_id: &str, content: &str) -> Result<()>;

    /// Start a run with the given instruction override and poll it to a
    /// terminal status
    async fn run_to_completion(&self, thread_id: &str, instructions: &str) -> Result<RunOutcome>;

    /// Text content of the most recent assistant message in the thread
    async fn last_message_text(&self, thread_id: &str) -> Result<String>;
}

/// Client for an OpenAI-assistants-style HTTP API
pub struct OpenAiAssistantClient {
    client: Client,
    base_url: String,
    api_key: String,
    assistant_id: String,
    poll_interval: Duration,
    run_timeout: Duration,
}

impl OpenAiAssistantClient {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("Tripplanr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            assistant_id: config.assistant_id.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            run_timeout: Duration::from_secs(config.run_timeout_seconds),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::RankingUnavailable(format!(
            "assistant API returned {status}: {body}"
        )))
    }
}

#[async_trait]
impl ReasoningBackend for OpenAiAssistantClient {
    async fn create_thread(&self) -> Result<String> {
        let response = self
            .request(reqwest::Method::POST, "/threads")
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| Error::RankingUnavailable(e.to_string()))?;
        let body: wire::ThreadResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::RankingUnavailable(e.to_string()))?;
        debug!("Opened assistant thread {}", body.id);
        Ok(body.id)
    }

    async fn post_message(&self, thread_id: &str, content: &str) -> Result<()> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/threads/{thread_id}/messages"),
            )
            .json(&serde_json::json!({ "role": "user", "content": content }))
            .send()
            .await
            .map_err(|e| Error::RankingUnavailable(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn run_to_completion(&self, thread_id: &str, instructions: &str) -> Result<RunOutcome> {
        let response = self
            .request(reqwest::Method::POST, &format!("/threads/{thread_id}/runs"))
            .json(&serde_json::json!({
                "assistant_id": self.assistant_id,
                "instructions": instructions,
            }))
            .send()
            .await
            .map_err(|e| Error::RankingUnavailable(e.to_string()))?;
        let run: wire::RunResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::RankingUnavailable(e.to_string()))?;

        let deadline = tokio::time::Instant::now() + self.run_timeout;
        let mut status = run.status;
        while matches!(status.as_str(), "queued" | "in_progress" | "cancelling") {
            if tokio::time::Instant::now() >= deadline {
                warn!("Assistant run {} timed out in status {}", run.id, status);
                return Err(Error::RankingUnavailable(format!(
                    "run {} did not reach a terminal status within {:?}",
                    run.id, self.run_timeout
                )));
            }
            tokio::time::sleep(self.poll_interval).await;

            let response = self
                .request(
                    reqwest::Method::GET,
                    &format!("/threads/{thread_id}/runs/{}", run.id),
                )
                .send()
                .await
                .map_err(|e| Error::RankingUnavailable(e.to_string()))?;
            let polled: wire::RunResponse = Self::check(response)
                .await?
                .json()
                .await
                .map_err(|e| Error::RankingUnavailable(e.to_string()))?;
            status = polled.status;
        }

        debug!("Assistant run {} finished with status {}", run.id, status);
        Ok(RunOutcome {
            thread_id: thread_id.to_string(),
            status,
        })
    }

    async fn last_message_text(&self, thread_id: &str) -> Result<String> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/threads/{thread_id}/messages?order=desc&limit=1"),
            )
            .send()
            .await
            .map_err(|e| Error::RankingUnavailable(e.to_string()))?;
        let body: wire::MessageListResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::RankingUnavailable(e.to_string()))?;

        let text = body
            .data
            .into_iter()
            .next()
            .and_then(|m| {
                m.content
                    .into_iter()
                    .find_map(|c| c.text.map(|t| t.value))
            })
            .ok_or_else(|| {
                Error::RankingUnavailable("thread has no readable assistant message".to_string())
            })?;
        Ok(text)
    }
}

/// Assistants API wire structures
mod wire {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ThreadResponse {
        pub id: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct RunResponse {
        pub id: String,
        pub status: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct MessageListResponse {
        #[serde(default)]
        pub data: Vec<Message>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Message {
        #[serde(default)]
        pub content: Vec<ContentBlock>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ContentBlock {
        pub text: Option<TextBlock>,
    }

    #[derive(Debug, Deserialize)]
    pub struct TextBlock {
        pub value: String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_outcome_completion_check() {
        let done = RunOutcome {
            thread_id: "t1".to_string(),
            status: "completed".to_string(),
        };
        let failed = RunOutcome {
            thread_id: "t1".to_string(),
            status: "failed".to_string(),
        };
        assert!(done.is_completed());
        assert!(!failed.is_completed());
    }

    #[test]
    fn test_message_list_extracts_first_text_block() {
        let json = r#"{
            "data": [{
                "content": [
                    {"text": {"value": "```json\n[\"HT1\"]\n```"}}
                ]
            }]
        }"#;
        let body: wire::MessageListResponse = serde_json::from_str(json).unwrap();
        let text = body.data[0].content[0].text.as_ref().unwrap();
        assert!(text.value.contains("HT1"));
    }
}
