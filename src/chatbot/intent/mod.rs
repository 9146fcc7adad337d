// Intent extraction
// Structured reading of a user message, with a keyword fallback when the model is unusable


use fancy_regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{Catalog, Category, PriceRange, UnknownCategory};
use crate::llm::{ChatMessage, LanguageModel, ResponseFormat};

/// Ordered keyword rules; the first rule with a hit decides the category
pub const CATEGORY_RULES: [(Category, &[&str]); 3] = [
    (Category::Phone, &["phone", "smartphone", "iphone", "android"]),
    (Category::Laptop, &["laptop", "computer", "macbook", "notebook"]),
    (Category::Tablet, &["tablet", "ipad"]),
];

static UNDER_PRICE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bunder\s+\$\s*(\d+(?:,\d{3})*(?:\.\d+)?)").expect("valid regex")
});

/// Structured interpretation of one user turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchIntent {
    pub category: Option<Category>,
    pub price_range: Option<PriceRange>,
    pub brand: Option<String>,
    /// Captured for context; retrieval does not use it
    pub features: Vec<String>,
    /// Text handed to the embedding step
    pub search_query: String,
}

impl SearchIntent {
    /// Deterministic reading of the raw message.
    ///
    /// Applies [`CATEGORY_RULES`] and recognises only the "under $N" price
    /// phrasing. Brand is never inferred here.
    #[inline]
    pub fn fallback(message: &str) -> Self {
        Self {
            category: keyword_category(message),
            price_range: under_price(message).map(PriceRange::up_to),
            brand: None,
            features: Vec::new(),
            search_query: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum IntentParseError {
    #[error("Reply is not a valid intent object: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Category(#[from] UnknownCategory),
}

/// Wire shape the model is asked to produce
#[derive(Debug, Deserialize)]
struct RawIntent {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    min_price: Option<f64>,
    #[serde(default)]
    max_price: Option<f64>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    features: Option<Vec<String>>,
    #[serde(default)]
    search_query: Option<String>,
}

fn intent_prompt(message: &str) -> String {
    format!(
        r#"Analyze the following customer message from an electronics store and extract the search intent.

Customer message: "{message}"

Extract:
1. Product category: one of phone, laptop, tablet, or null if not specified
2. Price range: min_price and max_price as numbers, or null if not specified
3. Brand preference: a brand name, or null if not specified
4. Key features or requirements as a list of short strings
5. Search query: the main search terms

Respond with a single JSON object and nothing else:
{{
    "category": "phone" | "laptop" | "tablet" | null,
    "min_price": null,
    "max_price": null,
    "brand": null,
    "features": ["feature1", "feature2"],
    "search_query": "main search terms"
}}"#
    )
}

/// Read the intent of `message`, never failing the turn.
///
/// Any model failure or undecodable reply degrades to
/// [`SearchIntent::fallback`].
#[inline]
pub fn extract_intent(llm: &dyn LanguageModel, message: &str) -> SearchIntent {
    let prompt = [ChatMessage::user(intent_prompt(message))];

    match llm.complete(&prompt, ResponseFormat::JsonObject) {
        Ok(reply) => parse_intent(&reply, message).unwrap_or_else(|e| {
            debug!("Falling back to keyword intent: {}", e);
            SearchIntent::fallback(message)
        }),
        Err(e) => {
            warn!("Intent extraction failed: {:#}", e);
            SearchIntent::fallback(message)
        }
    }
}

/// Strict decode of a model reply into a [`SearchIntent`].
///
/// `message` fills in the search query when the reply leaves it blank.
#[inline]
pub fn parse_intent(reply: &str, message: &str) -> Result<SearchIntent, IntentParseError> {
    let raw: RawIntent = serde_json::from_str(strip_code_fence(reply))?;

    let category = present(raw.category)
        .map(|value| value.parse::<Category>())
        .transpose()?;

    let price_range = match (raw.min_price, raw.max_price) {
        (Some(min), Some(max)) if 0.0 <= min && min <= max => Some(PriceRange::new(min, max)),
        (None, Some(max)) if max >= 0.0 => Some(PriceRange::up_to(max)),
        _ => None,
    };

    let features = raw
        .features
        .unwrap_or_default()
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();

    Ok(SearchIntent {
        category,
        price_range,
        brand: present(raw.brand).map(catalog_brand),
        features,
        search_query: present(raw.search_query).unwrap_or_else(|| message.to_string()),
    })
}

/// `None` for absent, blank or placeholder values
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none") && !v.eq_ignore_ascii_case("null"))
}

/// Catalog spelling of a known brand; unknown brands pass through unchanged
fn catalog_brand(brand: String) -> String {
    Catalog::builtin()
        .brands()
        .into_iter()
        .find(|known| known.eq_ignore_ascii_case(&brand))
        .map_or(brand, str::to_string)
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);

    // Drop the info string ("json"), which ends at a newline or, on a
    // single-line fence, at the opening brace
    rest.split_once('\n')
        .map_or_else(
            || rest.find('{').map_or("", |start| rest.split_at(start).1),
            |(_, body)| body,
        )
        .trim()
}

fn keyword_category(message: &str) -> Option<Category> {
    let lowered = message.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(*k)))
        .map(|(category, _)| *category)
}

fn under_price(message: &str) -> Option<f64> {
    let captures = UNDER_PRICE_REGEX.captures(message).ok().flatten()?;
    captures.get(1)?.as_str().replace(',', "").parse().ok()
}
