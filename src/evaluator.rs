use std::fmt;
use std::time::Instant;

use rayon::prelude::*;
use tracing::info;

use crate::dataset::RatingTable;
use crate::io::{ItemId, UserId};
use crate::metrics::evaluation_reporter::EvaluationReporter;
use crate::recommender::Recommend;
use crate::similarity::PopularityCount;
use crate::stopwatch::Stopwatch;

/// Metrics of one evaluation run. Ratios whose denominator is zero are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSummary {
    pub precision: f64,
    pub recall: f64,
    pub coverage: f64,
    pub popularity: f64,
    pub f1: f64,
    pub hits: usize,
    pub qty_recommended: usize,
    pub qty_test_items: usize,
    pub qty_distinct_recommended: usize,
    pub qty_users: usize,
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "precision={:.4}\trecall={:.4}\tcoverage={:.4}",
            self.precision, self.recall, self.coverage
        )
    }
}

/// Scores a recommender against held-out ratings.
///
/// Every user of the training table gets a recommendation list; an item is
/// a hit when the user has any test rating for it. Users only present in the
/// test table add nothing.
pub struct Evaluator<'a> {
    train: &'a RatingTable,
    test: &'a RatingTable,
    popularity: &'a PopularityCount,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        train: &'a RatingTable,
        test: &'a RatingTable,
        popularity: &'a PopularityCount,
    ) -> Self {
        Evaluator {
            train,
            test,
            popularity,
        }
    }

    pub fn evaluate<R: Recommend + Sync>(&self, recommender: &R) -> EvaluationSummary {
        self.evaluate_timed(recommender, &mut Stopwatch::new())
    }

    pub fn evaluate_timed<R: Recommend + Sync>(
        &self,
        recommender: &R,
        stopwatch: &mut Stopwatch,
    ) -> EvaluationSummary {
        self.report(recommender, stopwatch).summary()
    }

    /// Recommendations are computed in parallel on the current rayon pool,
    /// then folded into the metrics in user id order, so the outcome equals a
    /// sequential run.
    pub fn report<R: Recommend + Sync>(
        &self,
        recommender: &R,
        stopwatch: &mut Stopwatch,
    ) -> EvaluationReporter<'a> {
        info!("evaluating {} users", self.train.len());
        let start_time = Instant::now();

        let mut user_ids: Vec<&UserId> = self.train.keys().collect();
        user_ids.sort_unstable();

        let recommendations: Vec<(&UserId, Vec<ItemId>, u128)> = user_ids
            .into_par_iter()
            .map(|user_id| {
                let user_start = Instant::now();
                let recommended_items: Vec<ItemId> = recommender
                    .recommend(user_id)
                    .into_iter()
                    .map(|scored| scored.id)
                    .collect();
                (user_id, recommended_items, user_start.elapsed().as_micros())
            })
            .collect();

        let mut reporter =
            EvaluationReporter::new(self.popularity, recommender.num_items_to_recommend());
        for (user_id, recommended_items, micros) in recommendations.iter() {
            reporter.add(recommended_items, self.test.get(*user_id));
            stopwatch.record_micros(*micros as f64);
        }

        let summary = reporter.summary();
        info!(
            "evaluated {} users, {} hits in {} recommendations: {} micros",
            summary.qty_users,
            summary.hits,
            summary.qty_recommended,
            start_time.elapsed().as_micros()
        );
        reporter
    }
}

#[cfg(test)]
mod evaluator_test {
    use super::*;
    use crate::ranking::RankedItem;
    use crate::recommender::ItemCfRecommender;
    use crate::similarity::SimilarityMatrix;
    use float_cmp::approx_eq;
    use hashbrown::HashMap;

    fn table(raw: &[(&str, &str, f64)]) -> RatingTable {
        let mut table = RatingTable::new();
        for (user, item, rating) in raw {
            table
                .entry(user.to_string())
                .or_insert_with(HashMap::new)
                .insert(item.to_string(), *rating);
        }
        table
    }

    struct FixedRecommender {
        recommendations: HashMap<String, Vec<RankedItem>>,
    }

    impl Recommend for FixedRecommender {
        fn recommend(&self, user_id: &str) -> Vec<RankedItem> {
            self.recommendations.get(user_id).cloned().unwrap_or_default()
        }

        fn num_items_to_recommend(&self) -> usize {
            2
        }
    }

    #[test]
    fn should_evaluate_fixed_recommendations() {
        let train = table(&[("u1", "1", 1.0), ("u2", "2", 1.0), ("u3", "3", 1.0), ("u3", "4", 1.0)]);
        let test = table(&[("u1", "3", 1.0), ("u1", "4", 0.0), ("u2", "9", 2.0), ("u4", "1", 5.0)]);
        let popularity = crate::similarity::count_popularity(&train);

        let mut recommendations = HashMap::new();
        recommendations.insert(
            "u1".to_string(),
            vec![RankedItem::new("3".to_string(), 0.9), RankedItem::new("4".to_string(), 0.5)],
        );
        recommendations.insert("u2".to_string(), vec![RankedItem::new("1".to_string(), 0.4)]);
        let recommender = FixedRecommender { recommendations };

        let mut stopwatch = Stopwatch::new();
        let summary = Evaluator::new(&train, &test, &popularity).evaluate_timed(&recommender, &mut stopwatch);

        // u1 hits 3 and 4 (a zero rating still counts), u2 misses, u3 gets nothing, u4 is not trained
        assert_eq!(2, summary.hits);
        assert_eq!(3, summary.qty_recommended);
        assert_eq!(3, summary.qty_test_items);
        assert_eq!(3, summary.qty_distinct_recommended);
        assert_eq!(3, summary.qty_users);
        assert!(approx_eq!(f64, 2.0 / 3.0, summary.precision, epsilon = 1e-12));
        assert!(approx_eq!(f64, 2.0 / 3.0, summary.recall, epsilon = 1e-12));
        assert!(approx_eq!(f64, 3.0 / 4.0, summary.coverage, epsilon = 1e-12));
        assert_eq!(3, stopwatch.get_n());
    }

    #[test]
    fn should_report_metric_names_and_values() {
        let train = table(&[("u1", "1", 5.0), ("u1", "2", 3.0), ("u2", "1", 4.0), ("u2", "3", 2.0)]);
        let test = table(&[("u1", "3", 4.0)]);
        let similarity = SimilarityMatrix::build(&train);
        let recommender = ItemCfRecommender::new(&train, &similarity, 10, 3);

        let reporter =
            Evaluator::new(&train, &test, similarity.popularity()).report(&recommender, &mut Stopwatch::new());
        assert_eq!(
            "Precision@3,Recall@3,Coverage@3,Popularity@3,F1score@3",
            reporter.get_name()
        );
        // u1 is recommended 3 and hits it, u2 is recommended 2 and misses
        let summary = reporter.summary();
        assert_eq!(1, summary.hits);
        assert_eq!(2, summary.qty_recommended);
        assert!(reporter.result().starts_with("0.5000,1.0000,0.6667,"));
    }

    #[test]
    fn handle_empty_test_set() {
        let train = table(&[("u1", "1", 5.0), ("u1", "2", 3.0), ("u2", "1", 4.0), ("u2", "3", 2.0)]);
        let test = RatingTable::new();
        let similarity = SimilarityMatrix::build(&train);
        let recommender = ItemCfRecommender::new(&train, &similarity, 10, 10);

        let summary = Evaluator::new(&train, &test, similarity.popularity()).evaluate(&recommender);
        assert_eq!(0, summary.hits);
        assert_eq!(0.0, summary.precision);
        assert!(summary.recall.is_nan());
        assert_eq!("precision=0.0000\trecall=NaN\tcoverage=0.6667", summary.to_string());
    }

    #[test]
    fn handle_no_recommendations() {
        let train = table(&[("u1", "1", 5.0)]);
        let test = table(&[("u1", "2", 5.0)]);
        let similarity = SimilarityMatrix::build(&train);
        let recommender = ItemCfRecommender::new(&train, &similarity, 10, 10);

        let summary = Evaluator::new(&train, &test, similarity.popularity()).evaluate(&recommender);
        assert!(summary.precision.is_nan());
        assert_eq!(0.0, summary.recall);
        assert_eq!(0.0, summary.coverage);
    }
}
