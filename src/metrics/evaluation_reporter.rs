use hashbrown::HashMap;

use crate::evaluator::EvaluationSummary;
use crate::io::{ItemId, Rating};
use crate::metrics::coverage::Coverage;
use crate::metrics::f1score::F1score;
use crate::metrics::popularity::Popularity;
use crate::metrics::precision::Precision;
use crate::metrics::recall::Recall;
use crate::metrics::RecommendationMetric;
use crate::similarity::PopularityCount;

pub struct EvaluationReporter<'a> {
    precision: Precision,
    recall: Recall,
    coverage: Coverage,
    popularity: Popularity<'a>,
    f1: F1score,
    qty_users: usize,
}

impl<'a> EvaluationReporter<'a> {
    /// The catalog size used for coverage is the number of items in
    /// `popularity`, i.e. every item seen in the training data.
    pub fn new(popularity: &'a PopularityCount, length: usize) -> EvaluationReporter<'a> {
        EvaluationReporter {
            precision: Precision::new(length),
            recall: Recall::new(length),
            coverage: Coverage::new(popularity.len(), length),
            popularity: Popularity::new(popularity, length),
            f1: F1score::new(length),
            qty_users: 0,
        }
    }

    pub fn add(&mut self, recommendations: &[ItemId], test_items: Option<&HashMap<ItemId, Rating>>) {
        self.precision.add(recommendations, test_items);
        self.recall.add(recommendations, test_items);
        self.coverage.add(recommendations, test_items);
        self.popularity.add(recommendations, test_items);
        self.f1.add(recommendations, test_items);
        self.qty_users += 1;
    }

    pub fn summary(&self) -> EvaluationSummary {
        EvaluationSummary {
            precision: self.precision.result(),
            recall: self.recall.result(),
            coverage: self.coverage.result(),
            popularity: self.popularity.result(),
            f1: self.f1.result(),
            hits: self.precision.hits(),
            qty_recommended: self.precision.qty_recommended(),
            qty_test_items: self.recall.qty_test_items(),
            qty_distinct_recommended: self.coverage.qty_distinct_recommended(),
            qty_users: self.qty_users,
        }
    }

    pub fn result(&self) -> String {
        format!(
            "{:.4},{:.4},{:.4},{:.4},{:.4}",
            self.precision.result(),
            self.recall.result(),
            self.coverage.result(),
            self.popularity.result(),
            self.f1.result()
        )
    }

    pub fn get_name(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.precision.get_name(),
            self.recall.get_name(),
            self.coverage.get_name(),
            self.popularity.get_name(),
            self.f1.get_name()
        )
    }
}
