use super::intent::SearchIntent;
use crate::index::MetadataFilter;

/// A metadata dimension the index can filter on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDimension {
    Category,
    Brand,
    PriceRange,
}

impl FilterDimension {
    #[inline]
    pub fn filter_for(self, intent: &SearchIntent) -> Option<MetadataFilter> {
        match self {
            Self::Category => intent.category.map(MetadataFilter::Category),
            Self::Brand => intent.brand.clone().map(MetadataFilter::Brand),
            Self::PriceRange => intent.price_range.map(MetadataFilter::PriceRange),
        }
    }
}

/// How one turn queries the index: at most one filter, chosen by priority
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalPlan {
    filter: Option<MetadataFilter>,
}

impl RetrievalPlan {
    /// Earlier dimensions win; the rest are ignored for the turn
    pub const PRIORITY: [FilterDimension; 3] = [
        FilterDimension::Category,
        FilterDimension::Brand,
        FilterDimension::PriceRange,
    ];

    #[inline]
    pub fn for_intent(intent: &SearchIntent) -> Self {
        Self {
            filter: Self::PRIORITY
                .iter()
                .find_map(|dimension| dimension.filter_for(intent)),
        }
    }

    /// `None` means an unfiltered similarity query
    #[inline]
    pub const fn filter(&self) -> Option<&MetadataFilter> {
        self.filter.as_ref()
    }
}
