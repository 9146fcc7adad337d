
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{ChatMessage, LanguageModel, ResponseFormat};
use crate::config::LlmConfig;

pub(crate) const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Chat completions against an Azure OpenAI deployment
#[derive(Debug, Clone)]
pub struct AzureChatClient {
    url: Url,
    api_key: String,
    temperature: f32,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatBody>,
}

#[derive(Debug, Serialize)]
struct ResponseFormatBody {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `{endpoint}/openai/deployments/{deployment}/{operation}?api-version=...`
pub(crate) fn deployment_url(
    endpoint: &Url,
    deployment: &str,
    operation: &str,
    api_version: &str,
) -> Result<Url> {
    let mut base = endpoint.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let mut url = base
        .join(&format!("openai/deployments/{}/{}", deployment, operation))
        .with_context(|| format!("Failed to build {} URL", operation))?;
    url.query_pairs_mut().append_pair("api-version", api_version);
    Ok(url)
}

pub(crate) fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

impl AzureChatClient {
    #[inline]
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let endpoint = config
            .endpoint_url()
            .context("Failed to parse Azure OpenAI endpoint")?;
        let url = deployment_url(
            &endpoint,
            &config.deployment,
            "chat/completions",
            &config.api_version,
        )?;

        Ok(Self {
            url,
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            agent: build_agent(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)),
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl LanguageModel for AzureChatClient {
    fn complete(&self, messages: &[ChatMessage], format: ResponseFormat) -> Result<String> {
        debug!(
            "Requesting chat completion ({} messages, {:?})",
            messages.len(),
            format
        );

        let request = ChatRequest {
            messages,
            temperature: self.temperature,
            response_format: match format {
                ResponseFormat::Text => None,
                ResponseFormat::JsonObject => Some(ResponseFormatBody {
                    kind: "json_object",
                }),
            },
        };

        let request_json =
            serde_json::to_string(&request).context("Failed to serialize chat request")?;

        let response_text = self
            .agent
            .post(self.url.as_str())
            .header("Content-Type", "application/json")
            .header("api-key", self.api_key.as_str())
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .inspect_err(|e| warn!("Chat completion request failed: {}", e))
            .context("Failed to call Azure OpenAI chat completions")?;

        let response: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse chat response")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Chat response contained no message content")?;

        debug!("Received chat completion ({} chars)", content.len());
        Ok(content)
    }
}
