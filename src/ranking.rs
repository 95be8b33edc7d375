use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::io::ItemId;

#[derive(PartialEq, Debug, Clone)]
pub struct RankedItem {
    pub id: ItemId,
    pub score: f64,
}

impl RankedItem {
    pub fn new(id: ItemId, score: f64) -> Self {
        RankedItem { id, score }
    }
}

impl Eq for RankedItem {}

impl Ord for RankedItem {
    /// Ranking order: the item that should be listed first is the smallest.
    /// Higher scores come first, equal scores fall back to `compare_item_ids`.
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse order by score
        match self.score.partial_cmp(&other.score) {
            Some(Ordering::Less) => Ordering::Greater,
            Some(Ordering::Greater) => Ordering::Less,
            _ => compare_item_ids(&self.id, &other.id),
        }
    }
}

impl PartialOrd for RankedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Item ids are expected to be numeric strings and compare by their numeric
/// value. A numeric id sorts before a non-numeric one, and two non-numeric
/// ids compare lexicographically, so the order is total even outside the
/// numeric domain.
pub fn compare_item_ids(left: &str, right: &str) -> Ordering {
    match (left.parse::<u64>(), right.parse::<u64>()) {
        (Ok(l), Ok(r)) => l.cmp(&r).then_with(|| left.cmp(right)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

/// Selects the best `how_many` items and returns them in ranking order.
///
/// Keeps a bounded heap whose top is the worst item retained so far, so the
/// cost is `O(n log how_many)` while producing exactly the prefix a full sort
/// would produce.
pub fn top_n<I>(scored_items: I, how_many: usize) -> Vec<RankedItem>
where
    I: IntoIterator<Item = RankedItem>,
{
    if how_many == 0 {
        return Vec::new();
    }
    let mut top_items: BinaryHeap<RankedItem> = BinaryHeap::with_capacity(how_many);
    for scored_item in scored_items {
        if top_items.len() < how_many {
            top_items.push(scored_item);
        } else if let Some(mut bottom) = top_items.peek_mut() {
            if scored_item < *bottom {
                *bottom = scored_item;
            }
        }
    }
    top_items.into_sorted_vec()
}

/// Full ranking of every scored item.
pub fn rank_all<I>(scored_items: I) -> Vec<RankedItem>
where
    I: IntoIterator<Item = RankedItem>,
{
    let mut ranked: Vec<RankedItem> = scored_items.into_iter().collect();
    ranked.sort_unstable();
    ranked
}
