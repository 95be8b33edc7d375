use hashbrown::HashMap;

use crate::io::{ItemId, Rating};
use crate::metrics::{count_hits, ratio, RecommendationMetric};

pub struct Precision {
    hits: usize,
    qty_recommended: usize,
    length: usize,
}

impl Precision {
    /// Returns a Precision evaluation metric.
    /// Precision is the share of all recommended items that show up in the
    /// users' held-out ratings, counted over every user at once.
    ///
    /// # Arguments
    ///
    /// * `length` - the length aka 'N' of the recommendation lists, used for naming.
    ///
    pub fn new(length: usize) -> Precision {
        Precision {
            hits: 0,
            qty_recommended: 0,
            length,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn qty_recommended(&self) -> usize {
        self.qty_recommended
    }
}

impl RecommendationMetric for Precision {
    fn add(&mut self, recommendations: &[ItemId], test_items: Option<&HashMap<ItemId, Rating>>) {
        self.hits += count_hits(recommendations, test_items);
        self.qty_recommended += recommendations.len();
    }

    fn result(&self) -> f64 {
        ratio(self.hits, self.qty_recommended)
    }

    fn get_name(&self) -> String {
        format!("Precision@{}", self.length)
    }
}

#[cfg(test)]
mod precision_test {
    use super::*;

    fn items(ids: &[u32]) -> Vec<ItemId> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn should_calculate_precision() {
        let length = 5;
        let mut mymetric = Precision::new(length);
        let mut test_items = HashMap::new();
        test_items.insert("3".to_string(), 4.0);
        test_items.insert("55".to_string(), 2.0);
        mymetric.add(&items(&[1, 2, 3, 4, 5]), Some(&test_items));
        mymetric.add(&items(&[6, 7, 8, 9, 55]), Some(&test_items));
        assert_eq!(2, mymetric.hits());
        assert_eq!(10, mymetric.qty_recommended());
        assert_eq!(0.2, mymetric.result());
        assert_eq!("Precision@5", mymetric.get_name());
    }

    #[test]
    fn handle_no_recommendations() {
        let mut mymetric = Precision::new(10);
        mymetric.add(&[], None);
        assert!(mymetric.result().is_nan());
    }
}
