use serde::{Deserialize, Serialize};

/// Trimmed averages for sold items, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AverageReport {
    pub price: f64,
    pub shipping: f64,
    pub total: f64,
}

/// Raw price and shipping values scraped from a sold-items page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSample {
    pub prices: Vec<f64>,
    pub shipping: Vec<f64>,
}
