use hashbrown::HashMap;

use crate::io::{ItemId, Rating};

pub mod coverage;
pub mod evaluation_reporter;
pub mod f1score;
pub mod popularity;
pub mod precision;
pub mod recall;

/// Accumulates one user's recommendations against that user's held-out
/// ratings. `test_items` is `None` for users without test data.
pub trait RecommendationMetric {
    fn add(&mut self, recommendations: &[ItemId], test_items: Option<&HashMap<ItemId, Rating>>);
    fn result(&self) -> f64;
    fn get_name(&self) -> String;
}

/// `numerator / denominator`, or NaN when nothing was counted.
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        f64::NAN
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Recommended items present in the test ratings, whatever their value.
pub(crate) fn count_hits(
    recommendations: &[ItemId],
    test_items: Option<&HashMap<ItemId, Rating>>,
) -> usize {
    match test_items {
        Some(test_items) => recommendations
            .iter()
            .filter(|item_id| test_items.contains_key(*item_id))
            .count(),
        None => 0,
    }
}
