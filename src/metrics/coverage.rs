use hashbrown::{HashMap, HashSet};

use crate::io::{ItemId, Rating};
use crate::metrics::{ratio, RecommendationMetric};

pub struct Coverage {
    item_count: usize,
    recommended_items: HashSet<ItemId>,
    length: usize,
}

impl Coverage {
    /// Share of the training catalog (`item_count` distinct items) that was
    /// recommended to at least one user.
    pub fn new(item_count: usize, length: usize) -> Coverage {
        Coverage {
            item_count,
            recommended_items: HashSet::new(),
            length,
        }
    }

    pub fn qty_distinct_recommended(&self) -> usize {
        self.recommended_items.len()
    }
}

impl RecommendationMetric for Coverage {
    fn add(&mut self, recommendations: &[ItemId], _test_items: Option<&HashMap<ItemId, Rating>>) {
        for item_id in recommendations.iter() {
            if !self.recommended_items.contains(item_id) {
                self.recommended_items.insert(item_id.clone());
            }
        }
    }

    fn result(&self) -> f64 {
        ratio(self.recommended_items.len(), self.item_count)
    }

    fn get_name(&self) -> String {
        format!("Coverage@{}", self.length)
    }
}
