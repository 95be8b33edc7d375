pub mod config;
pub mod config_processors;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod hyperparameter;
pub mod io;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod ranking;
pub mod recommender;
pub mod similarity;
pub mod stopwatch;
