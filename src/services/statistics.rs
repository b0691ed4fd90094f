//! Outlier-trimmed price statistics for the sold-items mode.
//!
//! Empty and single-value samples are defined rather than errors: the mean
//! of nothing is 0, and a spread over fewer than two values is 0.

use crate::models::{AverageReport, PriceSample};

pub fn mean(sample: &[f64]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    sample.iter().sum::<f64>() / sample.len() as f64
}

/// Standard deviation with Bessel's correction (n - 1).
pub fn sample_std_dev(sample: &[f64]) -> f64 {
    if sample.len() <= 1 {
        return 0.0;
    }
    let avg = mean(sample);
    let squares: f64 = sample.iter().map(|x| (x - avg).powi(2)).sum();
    (squares / (sample.len() - 1) as f64).sqrt()
}

/// Values strictly inside one standard deviation of the mean, in input order.
/// One pass; the bounds are not recomputed on the survivors.
pub fn trim_one_sigma(sample: &[f64]) -> Vec<f64> {
    let avg = mean(sample);
    let sd = sample_std_dev(sample);
    let (low, high) = (avg - sd, avg + sd);

    sample
        .iter()
        .copied()
        .filter(|x| low < *x && *x < high)
        .collect()
}

pub fn average_report(prices: &[f64], shipping: &[f64]) -> AverageReport {
    let price = round_cents(mean(&trim_one_sigma(prices)));
    let shipping = round_cents(mean(&trim_one_sigma(shipping)));

    AverageReport {
        price,
        shipping,
        total: round_cents(price + shipping),
    }
}

impl From<&PriceSample> for AverageReport {
    fn from(sample: &PriceSample) -> Self {
        average_report(&sample.prices, &sample.shipping)
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
