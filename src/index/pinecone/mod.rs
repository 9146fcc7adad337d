
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use super::{
    IndexMatch, IndexStats, MetadataFilter, ProductMetadata, UPSERT_BATCH_SIZE, VectorIndex,
    VectorRecord,
};
use crate::config::{Config, PineconeConfig};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const API_VERSION: &str = "2024-07";

/// Lifecycle of the remote index as seen by this process
#[derive(Debug, Clone, PartialEq, Eq)]
enum IndexState {
    /// Not yet checked or created
    Absent,
    /// Exists; data-plane requests go to `host`
    Ready { host: Url },
}

/// Pinecone serverless index over the REST API.
///
/// The index is created on first use if the control plane does not list it.
#[derive(Debug)]
pub struct PineconeIndex {
    controller: Url,
    api_key: String,
    index_name: String,
    dimension: u32,
    cloud: String,
    region: String,
    agent: ureq::Agent,
    state: Mutex<IndexState>,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    name: String,
    #[serde(default)]
    host: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: u32,
    metric: &'static str,
    spec: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    serverless: CloudRegion<'a>,
}

#[derive(Debug, Serialize)]
struct CloudRegion<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
}

#[derive(Debug, Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a ProductMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    dimension: u32,
    #[serde(default)]
    index_fullness: f32,
    #[serde(default)]
    total_vector_count: u64,
}

/// Data-plane hosts come back without a scheme
fn host_url(host: &str) -> Result<Url> {
    let raw = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };
    let mut url = Url::parse(&raw).with_context(|| format!("Invalid index host: {}", host))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

impl PineconeIndex {
    #[inline]
    pub fn new(config: &PineconeConfig, dimension: u32) -> Result<Self> {
        let controller = config
            .controller_url()
            .context("Failed to parse Pinecone controller URL")?;

        Ok(Self {
            controller,
            api_key: config.api_key.clone(),
            index_name: config.index_name.clone(),
            dimension,
            cloud: config.cloud.clone(),
            region: config.environment.clone(),
            agent: ureq::Agent::config_builder()
                .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
                .build()
                .into(),
            state: Mutex::new(IndexState::Absent),
        })
    }

    #[inline]
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.pinecone, config.embedding.dimension)
    }

    #[inline]
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Whether the index has been resolved in this process
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state
            .lock()
            .is_ok_and(|state| matches!(*state, IndexState::Ready { .. }))
    }

    /// Resolve the data-plane host, creating the index when it is missing
    #[inline]
    pub fn ensure_ready(&self) -> Result<Url> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("Pinecone index state lock poisoned"))?;

        if let IndexState::Ready { host } = &*state {
            return Ok(host.clone());
        }

        let existing = self.list_indexes()?;
        if !existing.iter().any(|index| index.name == self.index_name) {
            self.create_index()?;
            info!("Created new Pinecone index: {}", self.index_name);
        }

        let description = self.describe_index()?;
        let host = description
            .host
            .as_deref()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| anyhow!("Pinecone index {} has no host yet", self.index_name))
            .and_then(host_url)?;

        debug!("Pinecone index {} ready at {}", self.index_name, host);
        *state = IndexState::Ready { host: host.clone() };
        Ok(host)
    }

    fn controller_endpoint(&self, path: &str) -> Result<Url> {
        self.controller
            .join(path)
            .with_context(|| format!("Failed to build Pinecone URL for {}", path))
    }

    fn get(&self, url: &Url) -> Result<String, ureq::Error> {
        self.agent
            .get(url.as_str())
            .header("Api-Key", self.api_key.as_str())
            .header("X-Pinecone-API-Version", API_VERSION)
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())
    }

    fn post(&self, url: &Url, body: &str) -> Result<String, ureq::Error> {
        self.agent
            .post(url.as_str())
            .header("Api-Key", self.api_key.as_str())
            .header("X-Pinecone-API-Version", API_VERSION)
            .header("Content-Type", "application/json")
            .send(body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
    }

    fn list_indexes(&self) -> Result<Vec<IndexDescription>> {
        let url = self.controller_endpoint("indexes")?;
        let body = self.get(&url).context("Failed to list Pinecone indexes")?;
        let list: IndexList =
            serde_json::from_str(&body).context("Failed to parse Pinecone index list")?;
        Ok(list.indexes)
    }

    fn create_index(&self) -> Result<()> {
        let url = self.controller_endpoint("indexes")?;
        let request = CreateIndexRequest {
            name: &self.index_name,
            dimension: self.dimension,
            metric: "cosine",
            spec: ServerlessSpec {
                serverless: CloudRegion {
                    cloud: &self.cloud,
                    region: &self.region,
                },
            },
        };
        let body =
            serde_json::to_string(&request).context("Failed to serialize create request")?;

        match self.post(&url, &body) {
            Ok(_) => Ok(()),
            // Another process created it between our list and create calls
            Err(ureq::Error::StatusCode(409)) => {
                debug!("Pinecone index {} already exists", self.index_name);
                Ok(())
            }
            Err(e) => Err(e).context("Failed to create Pinecone index"),
        }
    }

    fn describe_index(&self) -> Result<IndexDescription> {
        let url = self.controller_endpoint(&format!("indexes/{}", self.index_name))?;
        let body = self
            .get(&url)
            .context("Failed to describe Pinecone index")?;
        serde_json::from_str(&body).context("Failed to parse Pinecone index description")
    }

    fn try_query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>> {
        let host = self.ensure_ready()?;
        let url = host.join("query").context("Failed to build query URL")?;

        let request = QueryRequest {
            vector,
            top_k,
            filter: filter.map(MetadataFilter::to_json),
            include_metadata: true,
        };
        let body = serde_json::to_string(&request).context("Failed to serialize query")?;
        let response_text = self.post(&url, &body).context("Pinecone query failed")?;
        let response: QueryResponse =
            serde_json::from_str(&response_text).context("Failed to parse query response")?;

        let matches = response
            .matches
            .into_iter()
            .filter_map(|m| {
                let metadata = m.metadata?;
                match serde_json::from_value::<ProductMetadata>(metadata) {
                    Ok(metadata) => Some(IndexMatch {
                        id: m.id,
                        score: m.score,
                        metadata,
                    }),
                    Err(e) => {
                        warn!("Skipping match {} with unreadable metadata: {}", m.id, e);
                        None
                    }
                }
            })
            .take(top_k)
            .collect();

        Ok(matches)
    }

    fn try_stats(&self) -> Result<IndexStats> {
        let host = self.ensure_ready()?;
        let url = host
            .join("describe_index_stats")
            .context("Failed to build stats URL")?;
        let response_text = self
            .post(&url, "{}")
            .context("Pinecone describe_index_stats failed")?;
        let stats: StatsResponse =
            serde_json::from_str(&response_text).context("Failed to parse index stats")?;

        Ok(IndexStats {
            total_vector_count: stats.total_vector_count,
            dimension: stats.dimension,
            index_fullness: stats.index_fullness,
        })
    }
}

impl VectorIndex for PineconeIndex {
    fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        anyhow::ensure!(
            records.len() <= UPSERT_BATCH_SIZE,
            "batch of {} exceeds the upsert limit of {}",
            records.len(),
            UPSERT_BATCH_SIZE
        );

        let host = self.ensure_ready()?;
        let url = host
            .join("vectors/upsert")
            .context("Failed to build upsert URL")?;

        let request = UpsertRequest {
            vectors: records
                .iter()
                .map(|record| UpsertVector {
                    id: &record.id,
                    values: &record.values,
                    metadata: &record.metadata,
                })
                .collect(),
        };
        let body = serde_json::to_string(&request).context("Failed to serialize upsert")?;
        let response_text = self.post(&url, &body).context("Pinecone upsert failed")?;
        let response: UpsertResponse =
            serde_json::from_str(&response_text).context("Failed to parse upsert response")?;

        debug!("Upserted {} vectors", response.upserted_count);
        Ok(response.upserted_count)
    }

    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>> {
        if vector.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        match self.try_query(vector, top_k, filter) {
            Ok(matches) => {
                debug!("Pinecone returned {} matches", matches.len());
                Ok(matches)
            }
            Err(e) => {
                error!("Error searching products: {:#}", e);
                Ok(Vec::new())
            }
        }
    }

    fn stats(&self) -> Option<IndexStats> {
        self.try_stats()
            .inspect_err(|e| error!("Error getting index stats: {:#}", e))
            .ok()
    }
}
