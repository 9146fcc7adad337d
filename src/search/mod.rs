// Product search module
// Embeds queries, runs filtered similarity queries and bulk-populates the index


use anyhow::{Context, Result};
use itertools::Itertools;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Category, PriceRange, Product};
use crate::config::Config;
use crate::embeddings::{AzureEmbeddingClient, Embedder};
use crate::index::{
    IndexStats, MetadataFilter, PineconeIndex, ProductMetadata, UPSERT_BATCH_SIZE, VectorIndex,
    VectorRecord,
};

pub const DEFAULT_TOP_K: usize = 5;

/// A product returned by a similarity query
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch {
    pub product: Product,
    /// Similarity from the index; higher is closer
    pub score: Option<f32>,
}

impl RankedMatch {
    #[inline]
    pub const fn new(product: Product, score: f32) -> Self {
        Self {
            product,
            score: Some(score),
        }
    }
}

/// Outcome of a full index population
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// Products embedded and written
    pub embedded: usize,
    /// Products whose embedding came back empty
    pub skipped: usize,
    /// Upsert calls issued
    pub batches: usize,
}

/// Shared, read-only search handle.
///
/// One instance can serve every chat session in the process.
pub struct ProductSearch {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

/// Text that represents a product in embedding space
#[inline]
pub fn product_text(product: &Product) -> String {
    let specs = product
        .specs
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .join(" ");

    format!(
        "Product: {}\nCategory: {}\nBrand: {}\nPrice: {}\nDescription: {}\nSpecifications: {}\nFeatures: {}\nTags: {}",
        product.name,
        product.category,
        product.brand,
        product.price_label(),
        product.description,
        specs,
        product.features.join(" "),
        product.tags.join(" "),
    )
}

impl ProductSearch {
    #[inline]
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            top_k: top_k.max(1),
        }
    }

    /// Hosted embedding model and Pinecone index from settings
    #[inline]
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = AzureEmbeddingClient::new(&config.embedding)
            .context("Failed to create embedding client")?;
        let index = PineconeIndex::from_config(config).context("Failed to create Pinecone index")?;

        Ok(Self::new(
            Arc::new(embedder),
            Arc::new(index),
            config.pinecone.top_k,
        ))
    }

    /// Similarity search with an optional metadata filter.
    ///
    /// An empty query embedding short-circuits to no results without touching
    /// the index.
    #[inline]
    pub fn search(&self, query: &str, filter: Option<&MetadataFilter>) -> Result<Vec<RankedMatch>> {
        let vector = self.embedder.embed(query)?;
        if vector.is_empty() {
            warn!("No embedding for query, skipping index lookup");
            return Ok(Vec::new());
        }

        debug!("Querying index (top_k: {}, filter: {:?})", self.top_k, filter);
        let matches = self.index.query(&vector, self.top_k, filter)?;

        let products = matches
            .into_iter()
            .filter_map(|m| match Product::try_from(m.metadata) {
                Ok(product) => Some(RankedMatch::new(product, m.score)),
                Err(e) => {
                    warn!("Dropping match {}: {:#}", m.id, e);
                    None
                }
            })
            .collect();

        Ok(products)
    }

    #[inline]
    pub fn search_by_category(&self, category: Category, query: &str) -> Result<Vec<RankedMatch>> {
        self.search(query, Some(&MetadataFilter::Category(category)))
    }

    #[inline]
    pub fn search_by_brand(&self, brand: &str, query: &str) -> Result<Vec<RankedMatch>> {
        self.search(query, Some(&MetadataFilter::Brand(brand.to_string())))
    }

    #[inline]
    pub fn search_by_price_range(&self, range: PriceRange, query: &str) -> Result<Vec<RankedMatch>> {
        self.search(query, Some(&MetadataFilter::PriceRange(range)))
    }

    /// Embed every product and upsert in batches of [`UPSERT_BATCH_SIZE`].
    ///
    /// Re-running overwrites by id. A failing batch stops the run; earlier
    /// batches stay written.
    #[inline]
    pub fn populate(&self, catalog: Catalog<'_>) -> Result<PopulateReport> {
        self.populate_with_progress(catalog, |_| {})
    }

    #[inline]
    pub fn populate_with_progress<F>(
        &self,
        catalog: Catalog<'_>,
        mut on_product: F,
    ) -> Result<PopulateReport>
    where
        F: FnMut(&Product),
    {
        info!("Populating index with {} products", catalog.len());

        let mut report = PopulateReport::default();
        let mut records = Vec::with_capacity(catalog.len());

        for product in catalog.all() {
            let embedding = self
                .embedder
                .embed(&product_text(product))
                .with_context(|| format!("Failed to embed product {}", product.id))?;
            on_product(product);

            if embedding.is_empty() {
                warn!("Skipping {}: empty embedding", product.id);
                report.skipped += 1;
                continue;
            }

            let metadata = ProductMetadata::try_from(product)
                .with_context(|| format!("Failed to encode metadata for {}", product.id))?;
            records.push(VectorRecord {
                id: product.id.clone(),
                values: embedding,
                metadata,
            });
        }

        for (batch_number, batch) in records.chunks(UPSERT_BATCH_SIZE).enumerate() {
            self.index
                .upsert(batch)
                .with_context(|| format!("Upsert batch {} failed", batch_number + 1))?;
            report.batches += 1;
            report.embedded += batch.len();
        }

        info!(
            "Successfully populated index with {} products ({} skipped)",
            report.embedded, report.skipped
        );
        Ok(report)
    }

    #[inline]
    pub fn stats(&self) -> Option<IndexStats> {
        self.index.stats()
    }
}
