use std::collections::BTreeMap;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::GridConfig;

pub const NEIGHBORHOOD_SIZE_K: &str = "neighborhood_size_k";
pub const NUM_ITEMS_TO_RECOMMEND: &str = "num_items_to_recommend";

/// One chosen value per parameter name.
pub type HyperParams = BTreeMap<String, usize>;

pub struct HyperParamGrid {
    pub param_grid: BTreeMap<String, Vec<usize>>,
}

impl HyperParamGrid {
    pub fn from_config(grid: &GridConfig) -> Self {
        let mut param_grid = BTreeMap::new();
        param_grid.insert(
            NEIGHBORHOOD_SIZE_K.to_string(),
            grid.neighborhood_size_k_choices.clone(),
        );
        param_grid.insert(
            NUM_ITEMS_TO_RECOMMEND.to_string(),
            grid.num_items_to_recommend_choices.clone(),
        );
        HyperParamGrid { param_grid }
    }

    /// Returns 'n' unique random combinations, or all of them when there are
    /// fewer. The draw is reproducible for a seeded `rng`.
    ///
    /// # Arguments
    ///
    /// * `n` - the requested amount of random results returned.
    /// * `rng` - source of the shuffle.
    pub fn get_n_random_combinations<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<HyperParams> {
        let mut all_combinations = self.get_all_combinations();
        all_combinations.shuffle(rng);
        all_combinations.truncate(n);
        all_combinations
    }

    /// Every combination, parameters in name order, values in the order given.
    pub fn get_all_combinations(&self) -> Vec<HyperParams> {
        if self.param_grid.is_empty() {
            return Vec::new();
        }
        self.param_grid
            .values()
            .map(|choices| choices.iter().copied())
            .multi_cartesian_product()
            .map(|values| {
                self.param_grid
                    .keys()
                    .cloned()
                    .zip(values.into_iter())
                    .collect::<HyperParams>()
            })
            .collect()
    }

    pub fn get_qty_combinations(&self) -> usize {
        if self.param_grid.is_empty() {
            return 0;
        }
        self.param_grid.values().map(|choices| choices.len()).product()
    }
}
