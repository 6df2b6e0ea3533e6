use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::listing::Listing;

/// Price spread of one item under one action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
}

impl PriceSummary {
    /// `None` for an empty slice
    pub fn from_prices(prices: &[f64]) -> Option<Self> {
        let (&first, rest) = prices.split_first()?;

        let (min_price, max_price, sum) = rest.iter().fold(
            (first, first, first),
            |(min, max, sum), &price| (min.min(price), max.max(price), sum + price),
        );

        Some(Self {
            min_price,
            max_price,
            avg_price: sum / prices.len() as f64,
        })
    }
}

/// Min/max/average price per item for listings whose action equals `action`.
///
/// Action matching is exact and case-sensitive. Items come back in the order
/// they first appear in `listings`. No rounding is applied.
pub fn summarize(listings: &[Listing], action: &str) -> Vec<(String, PriceSummary)> {
    let mut prices_per_item: IndexMap<&str, Vec<f64>> = IndexMap::new();

    for listing in listings.iter().filter(|listing| listing.action == action) {
        prices_per_item
            .entry(listing.item_name.as_str())
            .or_default()
            .push(listing.price);
    }

    prices_per_item
        .into_iter()
        .filter_map(|(item_name, prices)| {
            PriceSummary::from_prices(&prices).map(|summary| (item_name.to_string(), summary))
        })
        .collect()
}
