
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use super::Embedder;
use crate::config::EmbeddingConfig;
use crate::llm::azure::{build_agent, deployment_url};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Embeddings against an Azure OpenAI deployment
#[derive(Debug, Clone)]
pub struct AzureEmbeddingClient {
    url: Url,
    api_key: String,
    model: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl AzureEmbeddingClient {
    #[inline]
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let endpoint = config
            .endpoint_url()
            .context("Failed to parse Azure embedding endpoint")?;
        let url = deployment_url(&endpoint, &config.model, "embeddings", &config.api_version)?;

        Ok(Self {
            url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
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

    fn request_embedding(&self, request_json: &str) -> Result<Vec<f32>> {
        let response_text = self
            .agent
            .post(self.url.as_str())
            .header("Content-Type", "application/json")
            .header("api-key", self.api_key.as_str())
            .send(request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .context("Failed to call Azure OpenAI embeddings")?;

        let mut response: EmbedResponse =
            serde_json::from_str(&response_text).context("Failed to parse embedding response")?;
        response.data.sort_by_key(|entry| entry.index);

        response
            .data
            .into_iter()
            .next()
            .map(|entry| entry.embedding)
            .context("Embedding response contained no vectors")
    }
}

impl Embedder for AzureEmbeddingClient {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating embedding for text (length: {})", text.len());

        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize embedding request")?;

        match self.request_embedding(&request_json) {
            Ok(embedding) => {
                debug!("Generated embedding with {} dimensions", embedding.len());
                Ok(embedding)
            }
            Err(e) => {
                error!("Error generating embedding: {:#}", e);
                Ok(Vec::new())
            }
        }
    }
}
