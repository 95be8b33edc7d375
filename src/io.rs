use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{ItemCfError, Result};

pub type UserId = String;
pub type ItemId = String;
pub type Rating = f64;

#[derive(Debug, Clone, PartialEq)]
pub struct RatingRecord {
    pub user: UserId,
    pub item: ItemId,
    pub rating: Rating,
}

impl RatingRecord {
    pub fn new(user: &str, item: &str, rating: Rating) -> Self {
        RatingRecord {
            user: user.to_string(),
            item: item.to_string(),
            rating,
        }
    }
}

/// Streams `user,item,rating[,timestamp]` records from a comma separated source.
///
/// The reader is flexible about field counts so that a short or long line is
/// reported as a `MalformedRecord` for that line instead of failing the whole
/// read, and a line with invalid UTF-8 as `InvalidEncoding`. Failures of the
/// underlying source surface as fatal errors.
pub struct RatingReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    source: PathBuf,
}

impl RatingReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P, has_header: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ItemCfError::FatalIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(RatingReader::new(file, has_header, path.to_path_buf()))
    }
}

impl<R: Read> RatingReader<R> {
    pub fn from_reader(reader: R, has_header: bool) -> Self {
        RatingReader::new(reader, has_header, PathBuf::from("<reader>"))
    }

    fn new(reader: R, has_header: bool, source: PathBuf) -> Self {
        let records = csv::ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_records();
        RatingReader { records, source }
    }
}

impl<R: Read> Iterator for RatingReader<R> {
    type Item = Result<RatingRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.records.next()?;
        Some(match next {
            Ok(record) => {
                let line = record.position().map(|pos| pos.line()).unwrap_or_default();
                parse_record(line, &record)
            }
            Err(error) => Err(classify_csv_error(&self.source, error)),
        })
    }
}

fn classify_csv_error(source: &Path, error: csv::Error) -> ItemCfError {
    if let csv::ErrorKind::Utf8 { pos, .. } = error.kind() {
        // The reader has consumed the offending record and can go on
        return ItemCfError::InvalidEncoding {
            line: pos.as_ref().map(|pos| pos.line()).unwrap_or_default(),
        };
    }
    if error.is_io_error() {
        ItemCfError::FatalIo {
            path: source.to_path_buf(),
            source: std::io::Error::from(error),
        }
    } else {
        ItemCfError::Csv {
            path: source.to_path_buf(),
            source: error,
        }
    }
}

pub fn parse_record(line: u64, record: &csv::StringRecord) -> Result<RatingRecord> {
    // A fourth column is the MovieLens timestamp, which the model does not use.
    if record.len() != 3 && record.len() != 4 {
        return Err(ItemCfError::MalformedRecord {
            line,
            fields: record.len(),
        });
    }
    let (user, item, raw_rating) = (&record[0], &record[1], &record[2]);
    if user.is_empty() || item.is_empty() {
        return Err(ItemCfError::MalformedRecord {
            line,
            fields: record.len(),
        });
    }
    let rating = raw_rating
        .parse::<Rating>()
        .ok()
        .filter(|rating| rating.is_finite())
        .ok_or_else(|| ItemCfError::RatingParse {
            line,
            value: raw_rating.to_string(),
        })?;

    Ok(RatingRecord::new(user, item, rating))
}
