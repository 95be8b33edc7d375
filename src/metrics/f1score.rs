use hashbrown::HashMap;

use crate::io::{ItemId, Rating};
use crate::metrics::precision::Precision;
use crate::metrics::recall::Recall;
use crate::metrics::RecommendationMetric;

pub struct F1score {
    precision: Precision,
    recall: Recall,
    length: usize,
}

impl F1score {
    /// Harmonic mean of the global precision and recall.
    pub fn new(length: usize) -> F1score {
        F1score {
            precision: Precision::new(length),
            recall: Recall::new(length),
            length,
        }
    }
}

impl RecommendationMetric for F1score {
    fn add(&mut self, recommendations: &[ItemId], test_items: Option<&HashMap<ItemId, Rating>>) {
        self.precision.add(recommendations, test_items);
        self.recall.add(recommendations, test_items);
    }

    fn result(&self) -> f64 {
        harmonic_mean(self.precision.result(), self.recall.result())
    }

    fn get_name(&self) -> String {
        format!("F1score@{}", self.length)
    }
}

pub fn harmonic_mean(precision: f64, recall: f64) -> f64 {
    if precision.is_nan() || recall.is_nan() {
        f64::NAN
    } else if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

#[cfg(test)]
mod f1score_test {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn should_calculate_f1score() {
        let mut under_test = F1score::new(4);
        let mut test_items = HashMap::new();
        test_items.insert("3".to_string(), 1.0);
        test_items.insert("9".to_string(), 1.0);
        let recommendations: Vec<ItemId> = ["1", "2", "3", "4"].iter().map(|id| id.to_string()).collect();
        under_test.add(&recommendations, Some(&test_items));
        // precision 0.25, recall 0.5
        assert!(approx_eq!(f64, 1.0 / 3.0, under_test.result(), epsilon = 1e-12));
        assert_eq!("F1score@4", under_test.get_name());
    }

    #[test]
    fn handle_degenerate_inputs() {
        assert_eq!(0.0, harmonic_mean(0.0, 0.0));
        assert!(harmonic_mean(f64::NAN, 0.5).is_nan());
    }
}
