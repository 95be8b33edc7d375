use hashbrown::HashMap;

use crate::io::{ItemId, Rating};
use crate::metrics::RecommendationMetric;
use crate::similarity::PopularityCount;

/// Mean `ln(1 + popularity)` of every recommended item. Lower values mean
/// the recommendations reach further into the long tail.
pub struct Popularity<'a> {
    popularity: &'a PopularityCount,
    sum_of_scores: f64,
    qty: usize,
    length: usize,
}

impl<'a> Popularity<'a> {
    pub fn new(popularity: &'a PopularityCount, length: usize) -> Popularity<'a> {
        Popularity {
            popularity,
            sum_of_scores: 0.0,
            qty: 0,
            length,
        }
    }
}

impl<'a> RecommendationMetric for Popularity<'a> {
    fn add(&mut self, recommendations: &[ItemId], _test_items: Option<&HashMap<ItemId, Rating>>) {
        for item_id in recommendations.iter() {
            let item_popularity = self.popularity.get(item_id).copied().unwrap_or(0);
            self.sum_of_scores += (1.0 + item_popularity as f64).ln();
            self.qty += 1;
        }
    }

    fn result(&self) -> f64 {
        if self.qty > 0 {
            self.sum_of_scores / self.qty as f64
        } else {
            f64::NAN
        }
    }

    fn get_name(&self) -> String {
        format!("Popularity@{}", self.length)
    }
}
