//! Descriptive statistics over batch samples.

use forward_game::numbers::{floor_to_usize, ratio, usize_to_f64};
use serde::{Deserialize, Serialize};

/// Arithmetic mean, or 0 for an empty sample.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    ratio(values.iter().sum(), usize_to_f64(values.len()))
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Middle value; the mean of the two middle values for even lengths.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Percentile `p` in `[0, 1]` with linear interpolation between ranks.
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted(values);
    let rank = usize_to_f64(sorted.len() - 1) * p.clamp(0.0, 1.0);
    let lo = floor_to_usize(rank).min(sorted.len() - 1);
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = rank - usize_to_f64(lo);
    if hi == lo || frac <= 0.0 {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

impl Percentiles {
    #[must_use]
    pub fn of(values: &[f64]) -> Self {
        Self {
            p5: percentile(values, 0.05),
            p25: percentile(values, 0.25),
            p50: percentile(values, 0.50),
            p75: percentile(values, 0.75),
            p95: percentile(values, 0.95),
        }
    }

    #[must_use]
    pub const fn as_array(&self) -> [f64; 5] {
        [self.p5, self.p25, self.p50, self.p75, self.p95]
    }

    #[cfg(test)]
    pub fn is_monotone(&self) -> bool {
        self.as_array().windows(2).all(|w| w[0] <= w[1])
    }
}

/// Correlation between a binary outcome and a continuous variable.
///
/// Uses the sample standard deviation of `values`. Returns 0 when every
/// outcome is the same or `values` has no spread.
#[must_use]
pub fn point_biserial(outcomes: &[bool], values: &[f64]) -> f64 {
    let n = outcomes.len().min(values.len());
    if n == 0 {
        return 0.0;
    }
    let (mut winners, mut losers) = (Vec::new(), Vec::new());
    for (&won, &value) in outcomes.iter().zip(values) {
        if won {
            winners.push(value);
        } else {
            losers.push(value);
        }
    }
    if winners.is_empty() || losers.is_empty() {
        return 0.0;
    }
    let p = ratio(usize_to_f64(winners.len()), usize_to_f64(n));
    let q = 1.0 - p;
    let overall = mean(&values[..n]);
    let squares: f64 = values[..n].iter().map(|v| (v - overall).powi(2)).sum();
    let sd = ratio(squares, usize_to_f64(n.saturating_sub(1).max(1))).sqrt();
    if sd == 0.0 {
        return 0.0;
    }
    (mean(&winners) - mean(&losers)) / sd * (p * q).sqrt()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin<K> {
    pub value: K,
    pub count: usize,
    pub pct: f64,
}

/// Histogram of `values` sorted by value, with shares of the whole sample.
#[must_use]
pub fn distribution<K: Ord + Clone>(values: &[K]) -> Vec<Bin<K>> {
    let mut counts = std::collections::BTreeMap::<K, usize>::new();
    for v in values {
        *counts.entry(v.clone()).or_default() += 1;
    }
    let total = usize_to_f64(values.len());
    counts
        .into_iter()
        .map(|(value, count)| Bin {
            value,
            count,
            pct: ratio(usize_to_f64(count), total),
        })
        .collect()
}

pub const ROUND_BUCKETS: [&str; 6] = ["<5", "5-9", "10-14", "15-19", "20-29", "30+"];

/// Bucket label for a run's total combat rounds.
#[must_use]
pub const fn round_bucket(rounds: u32) -> &'static str {
    match rounds {
        0..5 => ROUND_BUCKETS[0],
        5..10 => ROUND_BUCKETS[1],
        10..15 => ROUND_BUCKETS[2],
        15..20 => ROUND_BUCKETS[3],
        20..30 => ROUND_BUCKETS[4],
        _ => ROUND_BUCKETS[5],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn median_handles_even_and_odd() {
        assert!(close(median(&[3.0, 1.0, 2.0]), 2.0));
        assert!(close(median(&[4.0, 1.0, 3.0, 2.0]), 2.5));
        assert!(close(median(&[]), 0.0));
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert!(close(percentile(&values, 0.0), 10.0));
        assert!(close(percentile(&values, 0.5), 30.0));
        assert!(close(percentile(&values, 1.0), 50.0));
        // rank 4 * 0.05 = 0.2
        assert!(close(percentile(&values, 0.05), 12.0));
        // rank 4 * 0.95 = 3.8
        assert!(close(percentile(&values, 0.95), 48.0));
        assert!(close(percentile(&[7.0], 0.95), 7.0));
        assert!(close(percentile(&[], 0.5), 0.0));
    }

    #[test]
    fn percentile_sets_are_monotone() {
        let values: Vec<f64> = (0..97).map(|i| f64::from((i * 37) % 23)).collect();
        assert!(Percentiles::of(&values).is_monotone());
        assert!(Percentiles::of(&[]).is_monotone());
    }

    #[test]
    fn point_biserial_degenerate_cases_are_zero() {
        assert!(close(point_biserial(&[true, true], &[1.0, 5.0]), 0.0));
        assert!(close(point_biserial(&[false, false], &[1.0, 5.0]), 0.0));
        assert!(close(point_biserial(&[true, false], &[3.0, 3.0]), 0.0));
        assert!(close(point_biserial(&[], &[]), 0.0));
    }

    #[test]
    fn point_biserial_matches_hand_computation() {
        let outcomes = [true, true, false, false];
        let values = [4.0, 6.0, 1.0, 3.0];
        // means 5 and 2, overall 3.5, sample sd sqrt(13/3), p = q = 0.5
        let expected = 3.0 / (13.0_f64 / 3.0).sqrt() * 0.5;
        assert!(close(point_biserial(&outcomes, &values), expected));
        assert!(point_biserial(&[false, false, true, true], &values) < 0.0);
    }

    #[test]
    fn distribution_sorts_by_value() {
        let bins = distribution(&[3_u32, 1, 3, 2, 3]);
        let values: Vec<u32> = bins.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(bins[2].count, 3);
        assert!(close(bins[2].pct, 0.6));
    }

    #[test]
    fn round_buckets_cover_boundaries() {
        assert_eq!(round_bucket(0), "<5");
        assert_eq!(round_bucket(4), "<5");
        assert_eq!(round_bucket(5), "5-9");
        assert_eq!(round_bucket(19), "15-19");
        assert_eq!(round_bucket(29), "20-29");
        assert_eq!(round_bucket(30), "30+");
    }
}
