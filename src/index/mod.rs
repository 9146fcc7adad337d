// Vector index module
// Domain records exchanged with the hosted nearest-neighbour service

#[cfg(test)]
mod tests;

pub mod pinecone;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::catalog::{Category, PriceRange, Product};

pub use pinecone::PineconeIndex;

/// Backend payload limit for a single upsert call
pub const UPSERT_BATCH_SIZE: usize = 100;

/// Flat metadata stored next to each vector.
///
/// The index only keeps scalar values, so structured product fields are
/// carried as JSON-encoded strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub brand: String,
    pub price: f64,
    pub description: String,
    pub specs: String,
    pub features: String,
    pub tags: String,
}

impl TryFrom<&Product> for ProductMetadata {
    type Error = serde_json::Error;

    fn try_from(product: &Product) -> Result<Self, Self::Error> {
        Ok(Self {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category,
            brand: product.brand.clone(),
            price: product.price,
            description: product.description.clone(),
            specs: serde_json::to_string(&product.specs)?,
            features: serde_json::to_string(&product.features)?,
            tags: serde_json::to_string(&product.tags)?,
        })
    }
}

impl TryFrom<ProductMetadata> for Product {
    type Error = anyhow::Error;

    fn try_from(metadata: ProductMetadata) -> Result<Self> {
        let specs = serde_json::from_str(&metadata.specs)
            .with_context(|| format!("Invalid specs metadata for {}", metadata.id))?;
        let features = serde_json::from_str(&metadata.features)
            .with_context(|| format!("Invalid features metadata for {}", metadata.id))?;
        let tags = serde_json::from_str(&metadata.tags)
            .with_context(|| format!("Invalid tags metadata for {}", metadata.id))?;

        Ok(Self {
            id: metadata.id,
            name: metadata.name,
            category: metadata.category,
            brand: metadata.brand,
            price: metadata.price,
            description: metadata.description,
            specs,
            features,
            tags,
        })
    }
}

/// One vector per product id; writing the same id again overwrites it
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ProductMetadata,
}

/// Structured predicate evaluated by the index alongside similarity ranking
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataFilter {
    Category(Category),
    Brand(String),
    PriceRange(PriceRange),
}

impl MetadataFilter {
    /// Filter document in the index's query language
    #[inline]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Category(category) => json!({ "category": category.as_str() }),
            Self::Brand(brand) => json!({ "brand": brand }),
            Self::PriceRange(range) => json!({
                "price": { "$gte": range.min, "$lte": range.max }
            }),
        }
    }
}

/// A query hit; higher scores are more similar
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMatch {
    pub id: String,
    pub score: f32,
    pub metadata: ProductMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_vector_count: u64,
    pub dimension: u32,
    pub index_fullness: f32,
}

/// A hosted approximate nearest-neighbour index
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite by id. At most [`UPSERT_BATCH_SIZE`] records per call.
    fn upsert(&self, records: &[VectorRecord]) -> Result<usize>;

    /// At most `top_k` matches, best first. Transport failures yield an empty list.
    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>>;

    /// Best effort; `None` when the service could not be asked
    fn stats(&self) -> Option<IndexStats>;
}
