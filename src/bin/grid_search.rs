use anyhow::Context;
use csv::Writer;
use indicatif::ProgressBar;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde_derive::Serialize;
use tracing::info;

use itemcf::config::AppConfig;
use itemcf::hyperparameter::hyperparamgrid::{
    HyperParamGrid, NEIGHBORHOOD_SIZE_K, NUM_ITEMS_TO_RECOMMEND,
};
use itemcf::logging;
use itemcf::pipeline::ItemCf;

#[derive(Serialize)]
struct GridRecord {
    iteration: usize,
    neighborhood_size_k: usize,
    num_items_to_recommend: usize,
    precision: f64,
    recall: f64,
    coverage: f64,
    popularity: f64,
    f1: f64,
}

fn main() -> anyhow::Result<()> {
    // get params from config file
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(&config_path)?;
    logging::init(&config.log.level)?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.evaluation.num_workers)
        .build_global()
        .context("unable to start evaluation workers")?;

    // One split and one similarity matrix shared by every combination.
    let itemcf = ItemCf::from_config(&config)
        .with_context(|| format!("unable to prepare {}", &config.data.ratings_path))?;

    let grid = HyperParamGrid::from_config(&config.grid);
    let combinations = match config.grid.num_iterations {
        Some(num_iterations) => {
            let mut rng = Pcg64::seed_from_u64(config.split.seed);
            grid.get_n_random_combinations(num_iterations, &mut rng)
        }
        None => grid.get_all_combinations(),
    };
    info!(
        "evaluating {} of {} combinations",
        combinations.len(),
        grid.get_qty_combinations()
    );

    let mut wtr = Writer::from_path(&config.grid.out_path)
        .with_context(|| format!("unable to write {}", &config.grid.out_path))?;

    let mut best: Option<GridRecord> = None;
    // Progress bar
    let pb = ProgressBar::new(combinations.len() as u64);
    for (iteration, hyperparams) in combinations.iter().enumerate() {
        let neighborhood_size_k = *hyperparams
            .get(NEIGHBORHOOD_SIZE_K)
            .context("grid is missing neighborhood_size_k")?;
        let num_items_to_recommend = *hyperparams
            .get(NUM_ITEMS_TO_RECOMMEND)
            .context("grid is missing num_items_to_recommend")?;

        let summary = itemcf.evaluate(neighborhood_size_k, num_items_to_recommend);
        let record = GridRecord {
            iteration,
            neighborhood_size_k,
            num_items_to_recommend,
            precision: summary.precision,
            recall: summary.recall,
            coverage: summary.coverage,
            popularity: summary.popularity,
            f1: summary.f1,
        };
        wtr.serialize(&record)?;

        let improves = match &best {
            Some(current) => record.f1 > current.f1,
            None => !record.f1.is_nan(),
        };
        if improves {
            best = Some(record);
        }
        // increment progress bar
        pb.inc(1);
    }
    pb.finish();
    wtr.flush()?;

    match best {
        Some(best) => info!(
            "best combination: neighborhood_size_k={} num_items_to_recommend={} with f1={:.4} precision={:.4} recall={:.4} coverage={:.4}",
            best.neighborhood_size_k,
            best.num_items_to_recommend,
            best.f1,
            best.precision,
            best.recall,
            best.coverage
        ),
        None => info!("no combination produced a defined f1 score"),
    }
    info!("wrote grid search results to {}", &config.grid.out_path);
    Ok(())
}
