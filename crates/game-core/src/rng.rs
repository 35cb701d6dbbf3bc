//! Seeded Mulberry32 stream and the derived sampling primitives.
//!
//! Every random decision in a game goes through one `GameRng`, so the same
//! seed and the same sequence of human inputs replay the same game.

const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// One Mulberry32 step: the advanced state and a draw in [0, 1).
pub fn mulberry32_step(state: u32) -> (u32, f64) {
    let next = state.wrapping_add(MULBERRY_INCREMENT);
    let mut t = next;
    t = (t ^ (t >> 15)).wrapping_mul(t | 1);
    t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
    let out = t ^ (t >> 14);
    (next, f64::from(out) / TWO_POW_32)
}

#[derive(Debug, Clone)]
pub struct GameRng {
    state: u32,
    draws: u64,
}

impl GameRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: seed,
            draws: 0,
        }
    }

    pub fn next_f64(&mut self) -> f64 {
        let (next, draw) = mulberry32_step(self.state);
        self.state = next;
        self.draws = self.draws.saturating_add(1);
        draw
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Uniform index in `0..len`; `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        let scaled = (self.next_f64() * len as f64).floor() as usize;
        scaled.min(len.saturating_sub(1))
    }

    /// Fisher–Yates from the back, one draw per swap position.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.index(items.len());
        items.get(idx)
    }

    pub fn weighted_pick<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let total = weight_sum(items.len(), weights);
        if total <= 0.0 {
            return items.last();
        }
        let draw = self.next_f64();
        weighted_index(items.len(), weights, draw).and_then(|idx| items.get(idx))
    }
}

fn weight_sum(len: usize, weights: &[f64]) -> f64 {
    let total = weights.iter().take(len).copied().sum::<f64>();
    if total.is_finite() {
        total
    } else {
        0.0
    }
}

/// Resolves a draw in [0, 1) against `weights` without touching a generator.
///
/// A non-positive total means the last item wins. Weights beyond `len` are
/// ignored and missing weights count as zero.
pub fn weighted_index(len: usize, weights: &[f64], draw: f64) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let total = weight_sum(len, weights);
    if total <= 0.0 {
        return Some(len - 1);
    }
    let mut remainder = draw * total;
    for idx in 0..len {
        remainder -= weights.get(idx).copied().unwrap_or(0.0);
        if remainder <= 0.0 {
            return Some(idx);
        }
    }
    Some(len - 1)
}
