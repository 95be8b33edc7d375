use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::info;

use crate::config::AppConfig;
use crate::dataset::stats::determine_rating_statistics;
use crate::dataset::{split_ratings, RatingTable, RecordErrorPolicy, SplitDataset};
use crate::error::Result;
use crate::evaluator::{EvaluationSummary, Evaluator};
use crate::io::{RatingReader, RatingRecord};
use crate::recommender::ItemCfRecommender;
use crate::similarity::SimilarityMatrix;

/// Owns everything derived from one ratings source: the train/test split
/// and the similarity matrix built from the train side. Stages borrow from
/// it and nothing mutates it after construction.
pub struct ItemCf {
    dataset: SplitDataset,
    similarity: SimilarityMatrix,
}

impl ItemCf {
    pub fn from_records<I, R>(
        records: I,
        split_probability: f64,
        rng: &mut R,
        policy: RecordErrorPolicy,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = Result<RatingRecord>>,
        R: Rng + ?Sized,
    {
        let dataset = split_ratings(records, split_probability, rng, policy)?;
        info!(
            "split success: {} train pairs, {} test pairs",
            dataset.qty_train_pairs(),
            dataset.qty_test_pairs()
        );
        determine_rating_statistics("train set", &dataset.train);
        determine_rating_statistics("test set", &dataset.test);

        let similarity = SimilarityMatrix::build(&dataset.train);
        Ok(ItemCf {
            dataset,
            similarity,
        })
    }

    /// Reads the configured ratings file and splits it with a generator
    /// seeded from `split.seed`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        info!("reading ratings from {}", &config.data.ratings_path);
        let records = RatingReader::from_path(&config.data.ratings_path, config.data.has_header)?;
        let mut rng = Pcg64::seed_from_u64(config.split.seed);
        ItemCf::from_records(
            records,
            config.split.probability,
            &mut rng,
            config.data.on_bad_record,
        )
    }

    pub fn train(&self) -> &RatingTable {
        &self.dataset.train
    }

    pub fn test(&self) -> &RatingTable {
        &self.dataset.test
    }

    pub fn dataset(&self) -> &SplitDataset {
        &self.dataset
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn recommender(
        &self,
        neighborhood_size_k: usize,
        num_items_to_recommend: usize,
    ) -> ItemCfRecommender<'_> {
        ItemCfRecommender::new(
            &self.dataset.train,
            &self.similarity,
            neighborhood_size_k,
            num_items_to_recommend,
        )
    }

    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(
            &self.dataset.train,
            &self.dataset.test,
            self.similarity.popularity(),
        )
    }

    pub fn evaluate(
        &self,
        neighborhood_size_k: usize,
        num_items_to_recommend: usize,
    ) -> EvaluationSummary {
        let recommender = self.recommender(neighborhood_size_k, num_items_to_recommend);
        self.evaluator().evaluate(&recommender)
    }
}
