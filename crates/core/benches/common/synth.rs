use std::env;

const LABELS: [&str; 6] = ["Revenue", "Cost", "Margin", "Units", "Region", "Total"];

/// Seeded source of table cell content for benches.
///
/// `TABLIFT_BENCH_SEED` overrides the default seed so runs can be repeated
/// against other data.
pub struct TableSynth {
    state: u64,
}

impl TableSynth {
    pub fn from_env() -> Self {
        let seed = env::var("TABLIFT_BENCH_SEED")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0x7AB1E);
        Self { state: seed }
    }

    // splitmix64
    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn unit(&mut self) -> f64 {
        (self.next() >> 11) as f64 / (1u64 << 53) as f64
    }

    pub fn label(&mut self) -> &'static str {
        LABELS[self.count(LABELS.len())]
    }

    /// Uniform in `0..below`.
    pub fn count(&mut self, below: usize) -> usize {
        (self.next() % below.max(1) as u64) as usize
    }

    /// Uniform in `[0, max)`.
    pub fn amount(&mut self, max: f64) -> f64 {
        self.unit() * max
    }

    /// Uniform in `[-spread, spread)`.
    pub fn jitter(&mut self, spread: f64) -> f64 {
        (self.unit() * 2.0 - 1.0) * spread
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.count(i + 1);
            items.swap(i, j);
        }
    }
}
