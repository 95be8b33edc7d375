use std::time::Instant;

use hashbrown::HashMap;
use itertools::Itertools;
use tracing::info;

use crate::dataset::RatingTable;
use crate::io::ItemId;
use crate::ranking::{compare_item_ids, top_n, RankedItem};

/// item -> number of distinct training users who rated it.
pub type PopularityCount = HashMap<ItemId, usize>;

/// Item-to-item similarity derived from co-rating counts.
///
/// `similarity(a, b) = co_rated(a, b) / sqrt(popularity(a) * popularity(b))`.
/// Rows never contain the item itself, and `similarity(a, b) ==
/// similarity(b, a)` holds bit for bit. Immutable once built.
#[derive(Debug, PartialEq)]
pub struct SimilarityMatrix {
    popularity: PopularityCount,
    similarities: HashMap<ItemId, HashMap<ItemId, f64>>,
}

impl SimilarityMatrix {
    pub fn build(train: &RatingTable) -> Self {
        let start_time = Instant::now();
        let popularity = count_popularity(train);
        info!(
            "total item number = {}: {} micros",
            popularity.len(),
            start_time.elapsed().as_micros()
        );

        let start_time = Instant::now();
        let co_rated = count_co_rated(train);
        info!(
            "build co-rated users matrix: {} micros",
            start_time.elapsed().as_micros()
        );

        let start_time = Instant::now();
        let similarities: HashMap<ItemId, HashMap<ItemId, f64>> = co_rated
            .into_iter()
            .map(|(item, related)| {
                let item_popularity = popularity.get(item).copied().unwrap_or_default();
                let row: HashMap<ItemId, f64> = related
                    .into_iter()
                    .map(|(related_item, count)| {
                        let related_popularity =
                            popularity.get(related_item).copied().unwrap_or_default();
                        (
                            related_item.clone(),
                            normalize(count, item_popularity, related_popularity),
                        )
                    })
                    .collect();
                (item.clone(), row)
            })
            .collect();
        info!(
            "calculate item similarity matrix: {} micros",
            start_time.elapsed().as_micros()
        );

        SimilarityMatrix {
            popularity,
            similarities,
        }
    }

    pub fn popularity(&self) -> &PopularityCount {
        &self.popularity
    }

    /// Number of distinct items in the training data.
    pub fn item_count(&self) -> usize {
        self.popularity.len()
    }

    pub fn related_items(&self, item_id: &str) -> Option<&HashMap<ItemId, f64>> {
        self.similarities.get(item_id)
    }

    /// Zero for unrelated or unknown items.
    pub fn similarity(&self, item_a: &str, item_b: &str) -> f64 {
        self.similarities
            .get(item_a)
            .and_then(|related| related.get(item_b))
            .copied()
            .unwrap_or(0.0)
    }

    /// The `k` most similar items, best first, ties broken by item id.
    pub fn nearest_neighbors(&self, item_id: &str, k: usize) -> Vec<RankedItem> {
        match self.similarities.get(item_id) {
            Some(related) => top_n(
                related
                    .iter()
                    .map(|(related_item, score)| RankedItem::new(related_item.clone(), *score)),
                k,
            ),
            None => Vec::new(),
        }
    }

    /// Every stored (item, related item, similarity) entry in item id order.
    pub fn entries_sorted(&self) -> Vec<(&ItemId, &ItemId, f64)> {
        self.similarities
            .iter()
            .flat_map(|(item, related)| {
                related
                    .iter()
                    .map(move |(related_item, score)| (item, related_item, *score))
            })
            .sorted_by(|(a1, b1, _), (a2, b2, _)| {
                compare_item_ids(a1, a2).then_with(|| compare_item_ids(b1, b2))
            })
            .collect()
    }
}

pub fn count_popularity(train: &RatingTable) -> PopularityCount {
    let mut popularity = PopularityCount::new();
    for items in train.values() {
        for item_id in items.keys() {
            *popularity.entry(item_id.clone()).or_insert(0) += 1;
        }
    }
    popularity
}

/// For every ordered pair of distinct items rated by the same user, the
/// number of users who rated both.
fn count_co_rated(train: &RatingTable) -> HashMap<&ItemId, HashMap<&ItemId, u32>> {
    let mut co_rated: HashMap<&ItemId, HashMap<&ItemId, u32>> = HashMap::new();
    for items in train.values() {
        for item_a in items.keys() {
            let row = co_rated.entry(item_a).or_insert_with(HashMap::new);
            for item_b in items.keys() {
                if item_a != item_b {
                    *row.entry(item_b).or_insert(0) += 1;
                }
            }
        }
    }
    // Users with a single item leave empty rows behind.
    co_rated.retain(|_, row| !row.is_empty());
    co_rated
}

fn normalize(co_rated_count: u32, popularity_a: usize, popularity_b: usize) -> f64 {
    if popularity_a == 0 || popularity_b == 0 {
        return 0.0;
    }
    co_rated_count as f64 / ((popularity_a * popularity_b) as f64).sqrt()
}
