use std::env;
use std::time::Duration;

use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, Throughput};

/// Bench size, picked with `TABLIFT_BENCH_TIER=full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchTier {
    Quick,
    Full,
}

impl BenchTier {
    pub fn from_env() -> Self {
        match env::var("TABLIFT_BENCH_TIER").as_deref() {
            Ok("full") => BenchTier::Full,
            _ => BenchTier::Quick,
        }
    }

    /// Synthetic table rows per page.
    pub fn rows_per_page(self) -> usize {
        match self {
            BenchTier::Quick => 200,
            BenchTier::Full => 2_000,
        }
    }

    /// Sampling for in-memory groups; throughput is counted in table rows.
    pub fn configure<M: Measurement>(self, group: &mut BenchmarkGroup<'_, M>) {
        let (samples, secs) = match self {
            BenchTier::Quick => (20, 2),
            BenchTier::Full => (40, 6),
        };
        group.sample_size(samples);
        group.measurement_time(Duration::from_secs(secs));
        group.throughput(Throughput::Elements(self.rows_per_page() as u64));
    }
}
