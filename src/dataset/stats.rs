use hashbrown::HashSet;
use num_format::{Locale, ToFormattedString};
use rayon::prelude::*;
use tracing::info;

use crate::dataset::RatingTable;
use crate::io::ItemId;

pub struct RatingTableStats {
    pub descriptive_name: String,
    pub qty_ratings: usize,
    pub qty_unique_user_ids: usize,
    pub qty_unique_item_ids: usize,
    pub min_rating: f64,
    pub max_rating: f64,
    pub mean_rating: f64,
}

pub fn determine_rating_statistics(descriptive_name: &str, table: &RatingTable) -> RatingTableStats {
    let qty_unique_user_ids = table.len();

    let qty_ratings: usize = table.par_values().map(|items| items.len()).sum();

    let item_ids: HashSet<&ItemId> = table.values().flat_map(|items| items.keys()).collect();
    let qty_unique_item_ids = item_ids.len();

    let (min_rating, max_rating, sum_of_ratings) = table
        .values()
        .flat_map(|items| items.values())
        .fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0_f64),
            |(min, max, sum), rating| (min.min(*rating), max.max(*rating), sum + rating),
        );

    let (min_rating, max_rating, mean_rating) = if qty_ratings > 0 {
        (min_rating, max_rating, sum_of_ratings / qty_ratings as f64)
    } else {
        (f64::NAN, f64::NAN, f64::NAN)
    };

    info!(
        "loaded {}: ratings={} users={} items={} rating min/mean/max={:.2}/{:.2}/{:.2}",
        descriptive_name,
        qty_ratings.to_formatted_string(&Locale::en),
        qty_unique_user_ids.to_formatted_string(&Locale::en),
        qty_unique_item_ids.to_formatted_string(&Locale::en),
        min_rating,
        mean_rating,
        max_rating
    );

    RatingTableStats {
        descriptive_name: descriptive_name.to_string(),
        qty_ratings,
        qty_unique_user_ids,
        qty_unique_item_ids,
        min_rating,
        max_rating,
        mean_rating,
    }
}
