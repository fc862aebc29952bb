use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded generator behind every random decision in a pack.
///
/// ChaCha8 has a fixed, documented output stream, so a seed reproduces the
/// same sequence on every platform.
#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: ChaCha8Rng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeds from OS entropy. The chosen seed is still available through
    /// [`RngState::seed`] so the result can be replayed.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = (self.next_f64() * items.len() as f64) as usize;
        items.get(idx.min(items.len() - 1))
    }

    /// Fisher-Yates over a copy; the input is left untouched.
    pub fn shuffled<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        for i in (1..out.len()).rev() {
            let j = (self.next_f64() * (i + 1) as f64) as usize;
            out.swap(i, j.min(i));
        }
        out
    }
}

/// Draws one outcome from `(outcome, weight)` pairs, walking the cumulative
/// weight in the given order. Weights need not sum to one. Returns `None`
/// when nothing carries positive weight.
pub fn pick_weighted<T: Clone>(
    items: impl IntoIterator<Item = (T, f64)>,
    rng: &mut RngState,
) -> Option<T> {
    let items: Vec<(T, f64)> = items
        .into_iter()
        .filter(|(_, weight)| *weight > 0.0 && weight.is_finite())
        .collect();
    let total: f64 = items.iter().map(|(_, weight)| *weight).sum();
    if total <= 0.0 {
        return None;
    }
    let roll = rng.next_f64() * total;
    let mut cumulative = 0.0;
    for (item, weight) in &items {
        cumulative += weight;
        if roll < cumulative {
            return Some(item.clone());
        }
    }
    // Float rounding can leave the roll a hair past the final bucket.
    items.last().map(|(item, _)| item.clone())
}
