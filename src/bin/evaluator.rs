use anyhow::Context;
use tracing::info;

use itemcf::config::AppConfig;
use itemcf::logging;
use itemcf::pipeline::ItemCf;
use itemcf::stopwatch::Stopwatch;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(&config_path)?;
    logging::init(&config.log.level)?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.evaluation.num_workers)
        .build_global()
        .context("unable to start evaluation workers")?;

    let itemcf = ItemCf::from_config(&config)
        .with_context(|| format!("unable to prepare {}", &config.data.ratings_path))?;

    let neighborhood_size_k = config.model.neighborhood_size_k;
    let num_items_to_recommend = config.model.num_items_to_recommend;
    info!(
        "evaluating with neighborhood_size_k={} num_items_to_recommend={}",
        neighborhood_size_k, num_items_to_recommend
    );

    let recommender = itemcf.recommender(neighborhood_size_k, num_items_to_recommend);
    let mut stopwatch = Stopwatch::new();
    let reporter = itemcf.evaluator().report(&recommender, &mut stopwatch);
    let summary = reporter.summary();

    info!(
        "popularity={:.4} f1={:.4} over {} users",
        summary.popularity, summary.f1, summary.qty_users
    );
    info!(
        "recommendation latency over {} users (microseconds): p50={:.0} p90={:.0} p99={:.0}",
        stopwatch.get_n(),
        stopwatch.get_percentile_in_micros(0.5),
        stopwatch.get_percentile_in_micros(0.9),
        stopwatch.get_percentile_in_micros(0.99)
    );

    println!("{}", reporter.get_name());
    println!("{}", reporter.result());
    println!("{}", summary);
    Ok(())
}
