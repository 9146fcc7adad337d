// Recording doubles for the hosted-service traits

use anyhow::{Result, anyhow};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::catalog::Catalog;
use crate::embeddings::Embedder;
use crate::index::{IndexMatch, IndexStats, MetadataFilter, ProductMetadata, VectorIndex, VectorRecord};
use crate::llm::{ChatMessage, LanguageModel, ResponseFormat};

pub(crate) enum EmbedBehavior {
    Vector(Vec<f32>),
    Empty,
    Fail,
}

pub(crate) struct MockEmbedder {
    behavior: EmbedBehavior,
    pub texts: Mutex<Vec<String>>,
}

impl MockEmbedder {
    pub(crate) fn new(behavior: EmbedBehavior) -> Self {
        Self {
            behavior,
            texts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn working() -> Self {
        Self::new(EmbedBehavior::Vector(vec![0.1, 0.2, 0.3]))
    }

    pub(crate) fn call_count(&self) -> usize {
        self.texts.lock().expect("mock lock").len()
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.texts.lock().expect("mock lock").push(text.to_string());
        match &self.behavior {
            EmbedBehavior::Vector(v) => Ok(v.clone()),
            EmbedBehavior::Empty => Ok(Vec::new()),
            EmbedBehavior::Fail => Err(anyhow!("embedding service exploded")),
        }
    }
}

#[derive(Default)]
pub(crate) struct MockIndex {
    matches: Vec<IndexMatch>,
    fail_upsert_at: Option<usize>,
    pub filters: Mutex<Vec<Option<MetadataFilter>>>,
    pub upserts: Mutex<Vec<Vec<String>>>,
}

impl MockIndex {
    pub(crate) fn returning(matches: Vec<IndexMatch>) -> Self {
        Self {
            matches,
            ..Self::default()
        }
    }

    /// Upsert call number `call` (1-based) fails
    pub(crate) fn failing_upsert_at(call: usize) -> Self {
        Self {
            fail_upsert_at: Some(call),
            ..Self::default()
        }
    }

    pub(crate) fn recorded_filters(&self) -> Vec<Option<MetadataFilter>> {
        self.filters.lock().expect("mock lock").clone()
    }

    pub(crate) fn batch_sizes(&self) -> Vec<usize> {
        self.upserts
            .lock()
            .expect("mock lock")
            .iter()
            .map(Vec::len)
            .collect()
    }
}

impl VectorIndex for MockIndex {
    fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        let mut upserts = self.upserts.lock().expect("mock lock");
        if self.fail_upsert_at == Some(upserts.len() + 1) {
            return Err(anyhow!("payload rejected"));
        }
        upserts.push(records.iter().map(|r| r.id.clone()).collect());
        Ok(records.len())
    }

    fn query(
        &self,
        _vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>> {
        self.filters
            .lock()
            .expect("mock lock")
            .push(filter.cloned());
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }

    fn stats(&self) -> Option<IndexStats> {
        let count = self.upserts.lock().expect("mock lock").iter().map(Vec::len).sum::<usize>();
        Some(IndexStats {
            total_vector_count: count as u64,
            dimension: 3,
            index_fullness: 0.0,
        })
    }
}

/// Replies are consumed in order; an exhausted script fails the call
#[derive(Default)]
pub(crate) struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub calls: Mutex<Vec<(Vec<ChatMessage>, ResponseFormat)>>,
}

impl ScriptedModel {
    pub(crate) fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, String>>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().expect("mock lock").len()
    }

    pub(crate) fn call(&self, n: usize) -> (Vec<ChatMessage>, ResponseFormat) {
        self.calls.lock().expect("mock lock")[n].clone()
    }
}

impl LanguageModel for ScriptedModel {
    fn complete(&self, messages: &[ChatMessage], format: ResponseFormat) -> Result<String> {
        self.calls
            .lock()
            .expect("mock lock")
            .push((messages.to_vec(), format));
        let next = self.replies.lock().expect("mock lock").pop_front();
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted reply left")),
        }
    }
}

/// Index hit for a built-in catalog product
pub(crate) fn catalog_match(id: &str, score: f32) -> IndexMatch {
    let product = Catalog::builtin()
        .by_id(id)
        .unwrap_or_else(|| panic!("unknown fixture {id}"));
    IndexMatch {
        id: id.to_string(),
        score,
        metadata: ProductMetadata::try_from(product).expect("metadata encodes"),
    }
}
