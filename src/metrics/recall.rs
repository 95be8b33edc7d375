use hashbrown::HashMap;

use crate::io::{ItemId, Rating};
use crate::metrics::{count_hits, ratio, RecommendationMetric};

pub struct Recall {
    hits: usize,
    qty_test_items: usize,
    length: usize,
}

impl Recall {
    /// Returns a Recall evaluation metric.
    /// Recall is the share of all held-out ratings that were recommended,
    /// counted over every user at once.
    ///
    /// # Arguments
    ///
    /// * `length` - the length aka 'N' of the recommendation lists, used for naming.
    ///
    pub fn new(length: usize) -> Recall {
        Recall {
            hits: 0,
            qty_test_items: 0,
            length,
        }
    }

    pub fn qty_test_items(&self) -> usize {
        self.qty_test_items
    }
}

impl RecommendationMetric for Recall {
    fn add(&mut self, recommendations: &[ItemId], test_items: Option<&HashMap<ItemId, Rating>>) {
        self.hits += count_hits(recommendations, test_items);
        self.qty_test_items += test_items.map(|items| items.len()).unwrap_or(0);
    }

    fn result(&self) -> f64 {
        ratio(self.hits, self.qty_test_items)
    }

    fn get_name(&self) -> String {
        format!("Recall@{}", self.length)
    }
}
