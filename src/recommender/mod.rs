use hashbrown::HashMap;

use crate::dataset::RatingTable;
use crate::io::ItemId;
use crate::ranking::{compare_item_ids, top_n, RankedItem};
use crate::similarity::SimilarityMatrix;

pub const DEFAULT_NEIGHBORHOOD_SIZE_K: usize = 10;
pub const DEFAULT_NUM_ITEMS_TO_RECOMMEND: usize = 10;

pub trait Recommend {
    /// Ranked recommendations for `user_id`, best first.
    fn recommend(&self, user_id: &str) -> Vec<RankedItem>;

    fn num_items_to_recommend(&self) -> usize;
}

/// Item-based collaborative filtering over a training table and its
/// similarity matrix. Only the `k` nearest neighbors of every item are kept.
pub struct ItemCfRecommender<'a> {
    train: &'a RatingTable,
    num_items_to_recommend: usize,
    nearest_neighbors: HashMap<&'a ItemId, Vec<RankedItem>>,
}

impl<'a> ItemCfRecommender<'a> {
    pub fn new(
        train: &'a RatingTable,
        similarity: &'a SimilarityMatrix,
        neighborhood_size_k: usize,
        num_items_to_recommend: usize,
    ) -> Self {
        // The k nearest neighbors of an item do not depend on the user,
        // compute them once instead of once per rating.
        let nearest_neighbors = similarity
            .popularity()
            .keys()
            .map(|item_id| (item_id, similarity.nearest_neighbors(item_id, neighborhood_size_k)))
            .filter(|(_, neighbors)| !neighbors.is_empty())
            .collect();

        ItemCfRecommender {
            train,
            num_items_to_recommend,
            nearest_neighbors,
        }
    }
}

impl<'a> Recommend for ItemCfRecommender<'a> {
    /// Sums `similarity(rated, candidate) * rating` over the `k` nearest
    /// neighbors of every item the user rated, skipping candidates the user
    /// already rated (any recorded rating, zero included), and returns the
    /// `num_items_to_recommend` best candidates. Unknown users get nothing.
    fn recommend(&self, user_id: &str) -> Vec<RankedItem> {
        let rated_items = match self.train.get(user_id) {
            Some(rated_items) => rated_items,
            None => return Vec::new(),
        };

        // Fixed visiting order keeps the floating point sums reproducible.
        let mut rated: Vec<(&ItemId, &f64)> = rated_items.iter().collect();
        rated.sort_unstable_by(|(a, _), (b, _)| compare_item_ids(a, b));

        let mut item_scores: HashMap<&ItemId, f64> = HashMap::new();
        for (item_id, rating) in rated {
            let neighbors = match self.nearest_neighbors.get(item_id) {
                Some(neighbors) => neighbors,
                None => continue,
            };
            for neighbor in neighbors {
                if !rated_items.contains_key(&neighbor.id) {
                    *item_scores.entry(&neighbor.id).or_insert(0.0) += neighbor.score * rating;
                }
            }
        }

        top_n(
            item_scores
                .into_iter()
                .map(|(item_id, score)| RankedItem::new(item_id.clone(), score)),
            self.num_items_to_recommend,
        )
    }

    fn num_items_to_recommend(&self) -> usize {
        self.num_items_to_recommend
    }
}

#[cfg(test)]
mod recommender_test {
    use super::*;
    use float_cmp::approx_eq;
    use hashbrown::HashMap;

    fn table(raw: &[(&str, &str, f64)]) -> RatingTable {
        let mut train = RatingTable::new();
        for (user, item, rating) in raw {
            train
                .entry(user.to_string())
                .or_insert_with(HashMap::new)
                .insert(item.to_string(), *rating);
        }
        train
    }

    fn synthetic_table() -> RatingTable {
        let mut train = RatingTable::new();
        for user in 0..60_u32 {
            let items = train.entry(user.to_string()).or_insert_with(HashMap::new);
            for step in 0..(user % 9 + 2) {
                let item = (user * 7 + step * 11) % 37;
                items.insert(item.to_string(), ((user * step) % 5) as f64);
            }
        }
        train
    }

    #[test]
    fn should_train_and_recommend() {
        let train = table(&[
            ("u1", "1", 5.0),
            ("u1", "2", 3.0),
            ("u2", "1", 4.0),
            ("u2", "3", 2.0),
            ("u3", "2", 4.0),
            ("u3", "3", 4.0),
            ("u3", "4", 1.0),
        ]);
        let similarity = SimilarityMatrix::build(&train);
        let recommender = ItemCfRecommender::new(&train, &similarity, 10, 10);

        let recommendations = recommender.recommend("u1");
        let ids: Vec<&str> = recommendations.iter().map(|r| r.id.as_str()).collect();
        // popularity: 1 -> 2, 2 -> 2, 3 -> 2, 4 -> 1
        // item 3: sim(1,3) * 5 + sim(2,3) * 3 = 0.5 * 5 + 0.5 * 3 = 4.0
        // item 4: sim(2,4) * 3 = 1 / sqrt(2) * 3
        assert_eq!(vec!["3", "4"], ids);
        assert!(approx_eq!(f64, 4.0, recommendations[0].score, epsilon = 1e-12));
        assert!(approx_eq!(
            f64,
            3.0 / 2.0_f64.sqrt(),
            recommendations[1].score,
            epsilon = 1e-12
        ));
    }

    #[test]
    fn should_never_recommend_rated_items() {
        let train = synthetic_table();
        let similarity = SimilarityMatrix::build(&train);
        let recommender = ItemCfRecommender::new(&train, &similarity, 5, 7);
        for (user_id, rated_items) in train.iter() {
            let recommendations = recommender.recommend(user_id);
            assert!(recommendations.len() <= 7);
            for recommendation in recommendations.iter() {
                assert!(!rated_items.contains_key(&recommendation.id));
            }
            for pair in recommendations.windows(2) {
                let (first, second) = (&pair[0], &pair[1]);
                assert!(
                    first.score > second.score
                        || (first.score == second.score
                            && compare_item_ids(&first.id, &second.id)
                                == std::cmp::Ordering::Less)
                );
            }
        }
    }

    #[test]
    fn should_exclude_items_rated_zero() {
        let train = table(&[
            ("u1", "1", 5.0),
            ("u1", "2", 0.0),
            ("u2", "1", 4.0),
            ("u2", "2", 2.0),
        ]);
        let similarity = SimilarityMatrix::build(&train);
        let recommender = ItemCfRecommender::new(&train, &similarity, 10, 10);
        assert!(recommender.recommend("u1").is_empty());
    }

    #[test]
    fn should_recommend_deterministically() {
        let train = synthetic_table();
        let similarity = SimilarityMatrix::build(&train);
        let recommender = ItemCfRecommender::new(&train, &similarity, 10, 10);
        let other = ItemCfRecommender::new(&train, &similarity, 10, 10);
        for user_id in train.keys() {
            assert_eq!(recommender.recommend(user_id), other.recommend(user_id));
        }
    }

    #[test]
    fn should_limit_neighbors_to_k() {
        // item 1 is closer to 2 (2 / sqrt(6)) than to 3 (1 / sqrt(6)); with k = 1 only 2 counts
        let train = table(&[
            ("u1", "1", 1.0),
            ("u1", "2", 1.0),
            ("u1", "3", 1.0),
            ("u2", "1", 1.0),
            ("u2", "2", 1.0),
            ("u3", "3", 1.0),
            ("u4", "1", 2.0),
        ]);
        let similarity = SimilarityMatrix::build(&train);
        let recommender = ItemCfRecommender::new(&train, &similarity, 1, 10);
        let ids: Vec<String> = recommender
            .recommend("u4")
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(vec!["2".to_string()], ids);
    }

    #[test]
    fn handle_unknown_user() {
        let train = table(&[("u1", "1", 5.0)]);
        let similarity = SimilarityMatrix::build(&train);
        let recommender = ItemCfRecommender::new(&train, &similarity, 10, 10);
        assert!(recommender.recommend("nobody").is_empty());
        assert_eq!(10, recommender.num_items_to_recommend());
    }
}
