use justconfig::error::ConfigError;
use justconfig::item::{MapAction, StringItem};

/// Strips one pair of surrounding quotes from configuration values.
pub trait Unquote
where
    Self: Sized,
{
    fn unquote(self) -> Result<StringItem, ConfigError>;
}

impl Unquote for Result<StringItem, ConfigError> {
    /// Trims every value and removes a matching pair of `"` or `'` around
    /// it, so that `ratings_path = "data/ratings.csv"` and
    /// `ratings_path = data/ratings.csv` read the same. Values without
    /// quotes only get trimmed.
    fn unquote(self) -> Result<StringItem, ConfigError> {
        self?.map(|v| {
            let v = v.trim();
            let quoted = v.len() >= 2
                && ((v.starts_with('"') && v.ends_with('"'))
                    || (v.starts_with('\'') && v.ends_with('\'')));

            if quoted {
                MapAction::Replace(vec![v[1..v.len() - 1].to_owned()])
            } else {
                MapAction::Replace(vec![v.to_owned()])
            }
        })
    }
}
