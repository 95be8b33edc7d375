use std::str::FromStr;
use std::time::Instant;

use hashbrown::HashMap;
use rand::Rng;
use tracing::{info, warn};

use crate::error::{ItemCfError, Result};
use crate::io::{ItemId, Rating, RatingRecord, UserId};

pub mod stats;

pub const DEFAULT_SPLIT_PROBABILITY: f64 = 0.75;

/// user -> (item -> rating). Each (user, item) pair holds exactly one rating.
pub type RatingTable = HashMap<UserId, HashMap<ItemId, Rating>>;

/// What to do with a record that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordErrorPolicy {
    /// Log the record, count it and continue with the next one.
    Skip,
    /// Stop at the first bad record and return its error.
    Abort,
}

impl Default for RecordErrorPolicy {
    fn default() -> Self {
        RecordErrorPolicy::Skip
    }
}

impl FromStr for RecordErrorPolicy {
    type Err = ItemCfError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(RecordErrorPolicy::Skip),
            "abort" => Ok(RecordErrorPolicy::Abort),
            other => Err(ItemCfError::Config(format!(
                "unknown bad record policy '{}', expected 'skip' or 'abort'",
                other
            ))),
        }
    }
}

#[derive(Debug, Default)]
pub struct SplitDataset {
    pub train: RatingTable,
    pub test: RatingTable,
    /// Records assigned to each side, duplicates included.
    pub train_records: usize,
    pub test_records: usize,
    pub skipped_records: usize,
}

impl SplitDataset {
    pub fn qty_train_pairs(&self) -> usize {
        qty_pairs(&self.train)
    }

    pub fn qty_test_pairs(&self) -> usize {
        qty_pairs(&self.test)
    }
}

pub fn qty_pairs(table: &RatingTable) -> usize {
    table.values().map(|items| items.len()).sum()
}

/// Partitions rating records into a train and a test table.
///
/// One uniform sample is drawn from `rng` per well-formed record; samples
/// below `probability` go to train, the rest to test. Records that fail to
/// parse do not consume a sample. A repeated (user, item) pair keeps the
/// last rating seen and lives only on the side its last record was drawn
/// to, so both tables stay disjoint and together cover every pair.
///
/// Fatal errors of the source abort regardless of `policy`.
pub fn split_ratings<I, R>(
    records: I,
    probability: f64,
    rng: &mut R,
    policy: RecordErrorPolicy,
) -> Result<SplitDataset>
where
    I: IntoIterator<Item = Result<RatingRecord>>,
    R: Rng + ?Sized,
{
    if !(0.0..=1.0).contains(&probability) {
        return Err(ItemCfError::Config(format!(
            "split probability must be within [0, 1], got {}",
            probability
        )));
    }

    let start_time = Instant::now();
    let mut dataset = SplitDataset::default();

    for result in records {
        let record = match result {
            Ok(record) => record,
            Err(error) if error.is_record_error() && policy == RecordErrorPolicy::Skip => {
                warn!("skipping bad record: {}", error);
                dataset.skipped_records += 1;
                continue;
            }
            Err(error) => return Err(error),
        };

        if rng.gen::<f64>() < probability {
            assign(&mut dataset.train, &mut dataset.test, record);
            dataset.train_records += 1;
        } else {
            assign(&mut dataset.test, &mut dataset.train, record);
            dataset.test_records += 1;
        }
    }

    info!(
        "split ratings into train={} test={} records (skipped {}): {} micros",
        dataset.train_records,
        dataset.test_records,
        dataset.skipped_records,
        start_time.elapsed().as_micros()
    );

    Ok(dataset)
}

fn assign(target: &mut RatingTable, other: &mut RatingTable, record: RatingRecord) {
    if let Some(other_items) = other.get_mut(&record.user) {
        other_items.remove(&record.item);
        if other_items.is_empty() {
            other.remove(&record.user);
        }
    }
    target
        .entry(record.user)
        .or_insert_with(HashMap::new)
        .insert(record.item, record.rating);
}
