// Product catalog
// Static, in-memory product table with simple filter accessors


mod products;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static BUILTIN_PRODUCTS: LazyLock<Vec<Product>> = LazyLock::new(products::builtin_products);

/// Product category. Every catalog entry belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Phone,
    Laptop,
    Tablet,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Phone, Self::Laptop, Self::Tablet];

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Laptop => "laptop",
            Self::Tablet => "tablet",
        }
    }

    /// Heading used when listing the catalog grouped by category
    #[inline]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Phone => "Smartphones",
            Self::Laptop => "Laptops",
            Self::Tablet => "Tablets",
        }
    }
}

impl fmt::Display for Category {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown product category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "phone" | "phones" | "smartphone" | "smartphones" => Ok(Self::Phone),
            "laptop" | "laptops" => Ok(Self::Laptop),
            "tablet" | "tablets" => Ok(Self::Tablet),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub brand: String,
    pub price: f64,
    pub description: String,
    /// Named attributes; keys vary by category
    pub specs: BTreeMap<String, String>,
    pub features: Vec<String>,
    /// Short keywords used for matching
    pub tags: Vec<String>,
}

impl Product {
    /// Price rendered the way the storefront shows it, e.g. `$999` or `$24.50`
    #[inline]
    pub fn price_label(&self) -> String {
        format_price(self.price)
    }

    #[inline]
    pub fn spec(&self, key: &str) -> Option<&str> {
        self.specs.get(key).map(String::as_str)
    }
}

/// Inclusive price bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    #[inline]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `[0, max]`
    #[inline]
    pub const fn up_to(max: f64) -> Self {
        Self { min: 0.0, max }
    }

    #[inline]
    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }
}

#[inline]
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("${:.0}", price)
    } else {
        format!("${:.2}", price)
    }
}

/// Read-only view over an ordered product sequence.
///
/// All accessors preserve catalog order and return an empty result rather than
/// an error when nothing matches.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    products: &'a [Product],
}

impl Catalog<'static> {
    /// The built-in store catalog
    #[inline]
    pub fn builtin() -> Self {
        Self {
            products: BUILTIN_PRODUCTS.as_slice(),
        }
    }
}

impl<'a> Catalog<'a> {
    #[inline]
    pub const fn new(products: &'a [Product]) -> Self {
        Self { products }
    }

    #[inline]
    pub const fn all(&self) -> &'a [Product] {
        self.products
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.products.len()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[inline]
    pub fn by_category(&self, category: Category) -> Vec<&'a Product> {
        self.products
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// Case-insensitive brand match
    #[inline]
    pub fn by_brand(&self, brand: &str) -> Vec<&'a Product> {
        let wanted = brand.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.brand.to_lowercase() == wanted)
            .collect()
    }

    /// Inclusive on both ends. Missing bounds default to `[0, +inf)`.
    #[inline]
    pub fn by_price_range(&self, min: Option<f64>, max: Option<f64>) -> Vec<&'a Product> {
        let min = min.unwrap_or(0.0);
        let max = max.unwrap_or(f64::INFINITY);
        self.products
            .iter()
            .filter(|p| min <= p.price && p.price <= max)
            .collect()
    }

    #[inline]
    pub fn by_id(&self, id: &str) -> Option<&'a Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Offline substring search over name, description, features and tags
    #[inline]
    pub fn keyword_search(&self, query: &str) -> Vec<&'a Product> {
        let needle = query.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
                    || p.features.iter().any(|f| f.to_lowercase().contains(&needle))
                    || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Distinct brands in catalog order
    #[inline]
    pub fn brands(&self) -> Vec<&'a str> {
        let mut brands: Vec<&'a str> = Vec::new();
        for product in self.products {
            if !brands.contains(&product.brand.as_str()) {
                brands.push(product.brand.as_str());
            }
        }
        brands
    }
}
