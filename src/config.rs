use std::ffi::OsStr;
use std::fmt::Display;
use std::fs::File;
use std::str::FromStr;

use justconfig::item::ValueExtractor;
use justconfig::sources::env::Env;
use justconfig::sources::text::ConfigText;
use justconfig::ConfPath;
use justconfig::Config;

use crate::config_processors::Unquote;
use crate::dataset::{RecordErrorPolicy, DEFAULT_SPLIT_PROBABILITY};
use crate::error::{ItemCfError, Result};
use crate::recommender::{DEFAULT_NEIGHBORHOOD_SIZE_K, DEFAULT_NUM_ITEMS_TO_RECOMMEND};

// Set some default values
const DEFAULT_SPLIT_SEED: u64 = 42;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_GRID_OUT_PATH: &str = "grid_search.csv";
const DEFAULT_NEIGHBORHOOD_SIZE_K_CHOICES: &[usize] = &[5, 10, 20, 40, 80, 160];
const DEFAULT_NUM_ITEMS_TO_RECOMMEND_CHOICES: &[usize] = &[10];

pub struct AppConfig {
    pub log: LogConfig,
    pub data: DataConfig,
    pub split: SplitConfig,
    pub model: ModelConfig,
    pub evaluation: EvaluationConfig,
    pub grid: GridConfig,
}

pub struct LogConfig {
    pub level: String,
}

pub struct DataConfig {
    pub ratings_path: String,
    /// The first line of the ratings file is a header and is not data.
    pub has_header: bool,
    pub on_bad_record: RecordErrorPolicy,
}

pub struct SplitConfig {
    pub probability: f64,
    pub seed: u64,
}

pub struct ModelConfig {
    pub neighborhood_size_k: usize,
    pub num_items_to_recommend: usize,
}

pub struct EvaluationConfig {
    pub num_workers: usize,
}

pub struct GridConfig {
    pub neighborhood_size_k_choices: Vec<usize>,
    pub num_items_to_recommend_choices: Vec<usize>,
    /// Evaluate only this many randomly chosen combinations when set.
    pub num_iterations: Option<usize>,
    pub out_path: String,
}

impl AppConfig {
    /// Reads the optional config file at `config_path` (empty for none),
    /// then lets environment variables override it.
    pub fn new(config_path: &str) -> Result<AppConfig> {
        // Initialize config object
        let mut conf = Config::default();

        // Define config params from environment variables
        let config_env = Env::new(&[
            (
                ConfPath::from(&["data", "ratings_path"]),
                OsStr::new("RATINGS_DATA"),
            ),
            (
                ConfPath::from(&["evaluation", "num_workers"]),
                OsStr::new("NUM_WORKERS"),
            ),
            (ConfPath::from(&["log", "level"]), OsStr::new("LOG_LEVEL")),
        ]);
        // The first source holding a key wins, so the environment goes first
        conf.add_source(config_env);

        if !config_path.is_empty() {
            let config_file = File::open(config_path).map_err(|error| {
                ItemCfError::Config(format!("cannot open {}: {}", config_path, error))
            })?;
            let config_text = ConfigText::new(config_file, config_path).map_err(|error| {
                ItemCfError::Config(format!("cannot load {}: {}", config_path, error))
            })?;
            conf.add_source(config_text);
        }

        // Parse into custom config struct
        AppConfig::parse(&conf)
    }

    pub fn parse(conf: &Config) -> Result<AppConfig> {
        Ok(AppConfig {
            log: LogConfig::parse(conf, ConfPath::from(&["log"]))?,
            data: DataConfig::parse(conf, ConfPath::from(&["data"]))?,
            split: SplitConfig::parse(conf, ConfPath::from(&["split"]))?,
            model: ModelConfig::parse(conf, ConfPath::from(&["model"]))?,
            evaluation: EvaluationConfig::parse(conf, ConfPath::from(&["evaluation"]))?,
            grid: GridConfig::parse(conf, ConfPath::from(&["grid"]))?,
        })
    }
}

/// Missing keys yield `None`; present but unparseable values are errors
/// rather than silently replaced by defaults.
fn optional<T>(conf: &Config, path: ConfPath, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = conf
        .get(path)
        .unquote()
        .try_value()
        .map_err(|error| ItemCfError::Config(format!("{}: {}", key, error)))?;
    raw.map(|raw| {
        raw.parse::<T>().map_err(|error| {
            ItemCfError::Config(format!("{}: invalid value '{}': {}", key, raw, error))
        })
    })
    .transpose()
}

fn positive(value: usize, key: &str) -> Result<usize> {
    if value == 0 {
        Err(ItemCfError::Config(format!("{} must be at least 1", key)))
    } else {
        Ok(value)
    }
}

fn parse_choices(raw: &str, key: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|choice| !choice.is_empty())
        .map(|choice| {
            choice
                .parse::<usize>()
                .map_err(|error| {
                    ItemCfError::Config(format!("{}: invalid choice '{}': {}", key, choice, error))
                })
                .and_then(|value| positive(value, key))
        })
        .collect()
}

impl LogConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<LogConfig> {
        Ok(LogConfig {
            level: optional(conf, path.push("level"), "log.level")?
                .unwrap_or_else(|| String::from(DEFAULT_LOG_LEVEL)),
        })
    }
}

impl DataConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<DataConfig> {
        Ok(DataConfig {
            ratings_path: optional(conf, path.push("ratings_path"), "data.ratings_path")?
                .ok_or_else(|| ItemCfError::Config(String::from("data.ratings_path is required")))?,
            has_header: optional(conf, path.push("has_header"), "data.has_header")?.unwrap_or(true),
            on_bad_record: optional(conf, path.push("on_bad_record"), "data.on_bad_record")?
                .unwrap_or_default(),
        })
    }
}

impl SplitConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<SplitConfig> {
        let probability: f64 = optional(conf, path.push("probability"), "split.probability")?
            .unwrap_or(DEFAULT_SPLIT_PROBABILITY);
        if !(0.0..=1.0).contains(&probability) {
            return Err(ItemCfError::Config(format!(
                "split.probability must be within [0, 1], got {}",
                probability
            )));
        }
        Ok(SplitConfig {
            probability,
            seed: optional(conf, path.push("seed"), "split.seed")?.unwrap_or(DEFAULT_SPLIT_SEED),
        })
    }
}

impl ModelConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<ModelConfig> {
        Ok(ModelConfig {
            neighborhood_size_k: positive(
                optional(conf, path.push("neighborhood_size_k"), "model.neighborhood_size_k")?
                    .unwrap_or(DEFAULT_NEIGHBORHOOD_SIZE_K),
                "model.neighborhood_size_k",
            )?,
            num_items_to_recommend: positive(
                optional(
                    conf,
                    path.push("num_items_to_recommend"),
                    "model.num_items_to_recommend",
                )?
                .unwrap_or(DEFAULT_NUM_ITEMS_TO_RECOMMEND),
                "model.num_items_to_recommend",
            )?,
        })
    }
}

impl EvaluationConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<EvaluationConfig> {
        let num_workers = match optional(conf, path.push("num_workers"), "evaluation.num_workers")? {
            Some(num_workers) => positive(num_workers, "evaluation.num_workers")?,
            // Detect number of CPUs
            None => sys_info::cpu_num().map(|cpus| cpus as usize).unwrap_or(1).max(1),
        };
        Ok(EvaluationConfig { num_workers })
    }
}

impl GridConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<GridConfig> {
        let neighborhood_size_k_choices: Option<String> = optional(
            conf,
            path.push("neighborhood_size_k_choices"),
            "grid.neighborhood_size_k_choices",
        )?;
        let num_items_to_recommend_choices: Option<String> = optional(
            conf,
            path.push("num_items_to_recommend_choices"),
            "grid.num_items_to_recommend_choices",
        )?;
        Ok(GridConfig {
            neighborhood_size_k_choices: match neighborhood_size_k_choices {
                Some(raw) => parse_choices(&raw, "grid.neighborhood_size_k_choices")?,
                None => DEFAULT_NEIGHBORHOOD_SIZE_K_CHOICES.to_vec(),
            },
            num_items_to_recommend_choices: match num_items_to_recommend_choices {
                Some(raw) => parse_choices(&raw, "grid.num_items_to_recommend_choices")?,
                None => DEFAULT_NUM_ITEMS_TO_RECOMMEND_CHOICES.to_vec(),
            },
            num_iterations: optional(conf, path.push("num_iterations"), "grid.num_iterations")?,
            out_path: optional(conf, path.push("out_path"), "grid.out_path")?
                .unwrap_or_else(|| String::from(DEFAULT_GRID_OUT_PATH)),
        })
    }
}

#[cfg(test)]
mod config_test {
    use super::*;
    use justconfig::sources::defaults::Defaults;

    fn config_with(values: &[(&[&str], &str)]) -> Config {
        let mut conf = Config::default();
        let mut defaults = Defaults::default();
        for (path, value) in values {
            defaults.set(conf.root().push_all(*path), *value, "unittest");
        }
        conf.add_source(defaults);
        conf
    }

    #[test]
    fn should_apply_defaults() {
        let conf = config_with(&[(&["data", "ratings_path"], "\"ratings.csv\"")]);
        let config = AppConfig::parse(&conf).unwrap();
        assert_eq!("ratings.csv", config.data.ratings_path);
        assert!(config.data.has_header);
        assert_eq!(RecordErrorPolicy::Skip, config.data.on_bad_record);
        assert_eq!(0.75, config.split.probability);
        assert_eq!(42, config.split.seed);
        assert_eq!(10, config.model.neighborhood_size_k);
        assert_eq!(10, config.model.num_items_to_recommend);
        assert!(config.evaluation.num_workers >= 1);
        assert_eq!("info", config.log.level);
        assert_eq!(vec![10], config.grid.num_items_to_recommend_choices);
        assert_eq!(None, config.grid.num_iterations);
    }

    #[test]
    fn should_read_explicit_values() {
        let conf = config_with(&[
            (&["data", "ratings_path"], "ratings.csv"),
            (&["data", "has_header"], "false"),
            (&["data", "on_bad_record"], "abort"),
            (&["split", "probability"], "0.8"),
            (&["split", "seed"], "7"),
            (&["model", "neighborhood_size_k"], "20"),
            (&["model", "num_items_to_recommend"], " 5 "),
            (&["evaluation", "num_workers"], "3"),
            (&["grid", "neighborhood_size_k_choices"], "5, 10,20"),
        ]);
        let config = AppConfig::parse(&conf).unwrap();
        assert!(!config.data.has_header);
        assert_eq!(RecordErrorPolicy::Abort, config.data.on_bad_record);
        assert_eq!(0.8, config.split.probability);
        assert_eq!(7, config.split.seed);
        assert_eq!(20, config.model.neighborhood_size_k);
        assert_eq!(5, config.model.num_items_to_recommend);
        assert_eq!(3, config.evaluation.num_workers);
        assert_eq!(vec![5, 10, 20], config.grid.neighborhood_size_k_choices);
    }

    #[test]
    fn should_require_ratings_path() {
        let conf = config_with(&[]);
        assert!(matches!(AppConfig::parse(&conf), Err(ItemCfError::Config(_))));
    }

    #[test]
    fn should_let_environment_override_file() {
        let path = std::env::temp_dir().join(format!("itemcf_config_{}.conf", std::process::id()));
        std::fs::write(
            &path,
            "data.ratings_path = \"from_file.csv\"\nmodel.neighborhood_size_k = 25\n",
        )
        .unwrap();
        std::env::set_var("RATINGS_DATA", "from_env.csv");

        let config = AppConfig::new(path.to_str().unwrap());
        std::env::remove_var("RATINGS_DATA");
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!("from_env.csv", config.data.ratings_path);
        // Keys absent from the environment still come from the file
        assert_eq!(25, config.model.neighborhood_size_k);
    }

    #[test]
    fn should_reject_invalid_values() {
        let invalid: &[(&[&str], &str)] = &[
            (&["split", "probability"], "1.5"),
            (&["model", "neighborhood_size_k"], "ten"),
            (&["model", "num_items_to_recommend"], "0"),
            (&["data", "on_bad_record"], "ignore"),
            (&["grid", "neighborhood_size_k_choices"], "5,x"),
        ];
        for (path, value) in invalid {
            let conf = config_with(&[(&["data", "ratings_path"], "ratings.csv"), (*path, *value)]);
            assert!(
                matches!(AppConfig::parse(&conf), Err(ItemCfError::Config(_))),
                "{:?} = {} should be rejected",
                path,
                value
            );
        }
    }
}
