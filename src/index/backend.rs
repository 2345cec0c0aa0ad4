//! Numeric comparison backends
//!
//! Exact-match and range tests over a numeric series run through a backend
//! chosen once when an indexed collection is created. Every backend returns
//! identical row sets; only throughput differs.
//!
//! - `CpuBackend`: single-threaded scan
//! - `ParallelBackend`: chunked scan on the rayon thread pool

use std::fmt;
use std::num::NonZeroUsize;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::field_index::NumericSeries;
use super::{RowId, RowIdSet};

/// Rows per rayon task
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Vectorized comparisons over a numeric series.
///
/// Gap slots never match: NaN compares false against everything.
pub trait NumericBackend: Send + Sync + fmt::Debug {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Rows whose value equals `target`
    fn equal(&self, series: &NumericSeries, target: f64) -> RowIdSet;

    /// Rows whose value lies in `min..=max`
    fn within(&self, series: &NumericSeries, min: f64, max: f64) -> RowIdSet;
}

/// Single-threaded backend
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuBackend;

impl CpuBackend {
    fn scan(values: &[f64], keep: impl Fn(f64) -> bool) -> RowIdSet {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| keep(**v))
            .map(|(row, _)| row as RowId)
            .collect()
    }
}

impl NumericBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn equal(&self, series: &NumericSeries, target: f64) -> RowIdSet {
        Self::scan(series.as_slice(), |v| v == target)
    }

    fn within(&self, series: &NumericSeries, min: f64, max: f64) -> RowIdSet {
        Self::scan(series.as_slice(), |v| min <= v && v <= max)
    }
}

/// Multi-threaded backend splitting the series into fixed-size chunks
#[derive(Debug, Clone, Copy)]
pub struct ParallelBackend {
    chunk_size: usize,
}

impl Default for ParallelBackend {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl ParallelBackend {
    /// Creates a backend with the given chunk size (at least 1)
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn scan(&self, values: &[f64], keep: impl Fn(f64) -> bool + Sync) -> RowIdSet {
        let chunk_size = self.chunk_size;
        values
            .par_chunks(chunk_size)
            .enumerate()
            .map(|(chunk, part)| {
                let base = chunk * chunk_size;
                part.iter()
                    .enumerate()
                    .filter(|(_, v)| keep(**v))
                    .map(|(offset, _)| (base + offset) as RowId)
                    .collect::<RowIdSet>()
            })
            .reduce(RowIdSet::new, |mut acc, part| {
                acc |= part;
                acc
            })
    }
}

impl NumericBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn equal(&self, series: &NumericSeries, target: f64) -> RowIdSet {
        self.scan(series.as_slice(), |v| v == target)
    }

    fn within(&self, series: &NumericSeries, min: f64, max: f64) -> RowIdSet {
        self.scan(series.as_slice(), |v| min <= v && v <= max)
    }
}

/// Requested backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Parallel when more than one hardware thread is available
    #[default]
    Auto,
    Cpu,
    Parallel,
}

/// Number of hardware threads available to this process
pub fn probe_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Resolves a preference to a concrete backend.
///
/// `Auto` consults the hardware exactly once per call.
pub fn select_backend(preference: BackendPreference) -> Box<dyn NumericBackend> {
    match preference {
        BackendPreference::Cpu => Box::new(CpuBackend),
        BackendPreference::Parallel => Box::new(ParallelBackend::default()),
        BackendPreference::Auto => {
            if probe_parallelism() > 1 {
                Box::new(ParallelBackend::default())
            } else {
                Box::new(CpuBackend)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::field_index::NO_VALUE;

    fn sample_series(len: usize) -> NumericSeries {
        let values = (0..len)
            .map(|i| if i % 7 == 3 { NO_VALUE } else { (i % 11) as f64 * 0.1 })
            .collect();
        NumericSeries::from_values(values)
    }

    #[test]
    fn test_cpu_equal_and_within() {
        let series = NumericSeries::from_values(vec![0.9, 0.2, 0.95, NO_VALUE, 0.1]);
        let backend = CpuBackend;

        let eq: Vec<RowId> = backend.equal(&series, 0.2).iter().collect();
        assert_eq!(eq, vec![1]);

        let range: Vec<RowId> = backend.within(&series, 0.15, 0.95).iter().collect();
        assert_eq!(range, vec![0, 1, 2]);
    }

    #[test]
    fn test_gaps_never_match() {
        let series = NumericSeries::from_values(vec![NO_VALUE, 1.0]);
        let all: Vec<RowId> = CpuBackend
            .within(&series, f64::NEG_INFINITY, f64::INFINITY)
            .iter()
            .collect();
        assert_eq!(all, vec![1]);
        assert!(CpuBackend.equal(&series, NO_VALUE).is_empty());
    }

    #[test]
    fn test_backends_agree() {
        let series = sample_series(10_000);
        let parallel = ParallelBackend::new(333);

        for target in [0.0, 0.5, 1.0, 7.0] {
            assert_eq!(CpuBackend.equal(&series, target), parallel.equal(&series, target));
        }
        for (min, max) in [(0.2, 0.6), (f64::NEG_INFINITY, f64::INFINITY), (0.8, 0.1)] {
            assert_eq!(CpuBackend.within(&series, min, max), parallel.within(&series, min, max));
        }
    }

    #[test]
    fn test_select_backend() {
        assert_eq!(select_backend(BackendPreference::Cpu).name(), "cpu");
        assert_eq!(select_backend(BackendPreference::Parallel).name(), "parallel");

        let expected = if probe_parallelism() > 1 { "parallel" } else { "cpu" };
        assert_eq!(select_backend(BackendPreference::Auto).name(), expected);
    }

    #[test]
    fn test_chunk_size_floor() {
        assert_eq!(ParallelBackend::new(0).chunk_size(), 1);
    }
}
