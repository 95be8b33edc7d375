use tdigest::TDigest;

/// Collects per-user recommendation latencies.
#[derive(Clone, Default)]
pub struct Stopwatch {
    durations_in_micros: Vec<f64>,
}

impl Stopwatch {
    pub fn new() -> Stopwatch {
        Stopwatch {
            durations_in_micros: Vec::new(),
        }
    }

    pub fn record_micros(&mut self, duration_in_micros: f64) {
        self.durations_in_micros.push(duration_in_micros);
    }

    pub fn get_n(&self) -> usize {
        self.durations_in_micros.len()
    }

    /// `q` is a quantile in `[0, 1]`. NaN when nothing was recorded.
    pub fn get_percentile_in_micros(&self, q: f64) -> f64 {
        if self.durations_in_micros.is_empty() {
            return f64::NAN;
        }
        let t_digest = TDigest::new_with_size(100);
        let sorted_digest = t_digest.merge_unsorted(self.durations_in_micros.clone());
        sorted_digest.estimate_quantile(q)
    }
}
