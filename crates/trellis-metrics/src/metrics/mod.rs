//! Topology and density metrics over an [`crate::graph::Adjacency`].
//!
//! | metric                  | module        | cost        |
//! |-------------------------|---------------|-------------|
//! | degree histograms, hubs | [`degree`]     | O(V + E)    |
//! | mean local clustering   | [`clustering`] | O(V · k²)   |
//! | redundant neighborhoods | [`redundancy`] | O(E · k)    |
//!
//! Every metric is total: an empty graph yields zeros and empty lists.

pub mod clustering;
pub mod degree;
pub mod redundancy;

pub use clustering::{local_clustering, mean_clustering};
pub use degree::{DegreeSummary, Histogram, Hub, degree_summary, mean_and_stddev};
pub use redundancy::{REDUNDANCY_THRESHOLD, RedundantPair, redundant_neighborhoods};

/// Round `value` to `places` decimal places, half away from zero.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}
