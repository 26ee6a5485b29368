//! # Sampling and Identity Module
//!
//! ## Purpose
//! Injectable sources of randomness and message identity. The pipelines draw
//! entity subsets and canned replies through the [`RandomSource`] seam so
//! tests can supply a fixed sequence, and mint ids through [`IdGenerator`]
//! instead of wall-clock timestamps, which can collide within one tick.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rand::Rng;

/// Source of uniform random draws used by the mock pipelines
pub trait RandomSource: Send + Sync {
    /// Uniform draw in `[0, 1)`
    fn next_f64(&self) -> f64;

    /// Uniform index in `[0, len)`; `len` must be non-zero
    fn pick_index(&self, len: usize) -> usize;
}

/// Production random source backed by the thread-local RNG
#[derive(Debug, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_f64(&self) -> f64 {
        rand::rng().random::<f64>()
    }

    fn pick_index(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Deterministic random source that replays a fixed sequence of draws,
/// cycling when exhausted
#[derive(Debug)]
pub struct FixedSequenceSource {
    values: Mutex<VecDeque<f64>>,
    original: Vec<f64>,
}

impl FixedSequenceSource {
    /// Create a source that cycles through `values`
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values: Mutex::new(values.iter().copied().collect()),
            original: values,
        }
    }
}

impl RandomSource for FixedSequenceSource {
    fn next_f64(&self) -> f64 {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        if values.is_empty() {
            values.extend(self.original.iter().copied());
        }
        values.pop_front().unwrap_or(0.0)
    }

    fn pick_index(&self, len: usize) -> usize {
        let draw = self.next_f64();
        ((draw * len as f64) as usize).min(len.saturating_sub(1))
    }
}

/// Generator of unique string ids for messages and results
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Production id generator using random UUIDs
#[derive(Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Strictly increasing counter ids, useful for tests and transcripts
/// that should read in order
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let id = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_rng_bounds() {
        let source = ThreadRngSource;
        for _ in 0..100 {
            let draw = source.next_f64();
            assert!((0.0..1.0).contains(&draw));
            assert!(source.pick_index(5) < 5);
        }
    }

    #[test]
    fn test_fixed_sequence_replays_and_cycles() {
        let source = FixedSequenceSource::new(vec![0.1, 0.9]);
        assert_eq!(source.next_f64(), 0.1);
        assert_eq!(source.next_f64(), 0.9);
        // Cycles back to the start once exhausted
        assert_eq!(source.next_f64(), 0.1);
    }

    #[test]
    fn test_fixed_sequence_pick_index() {
        let source = FixedSequenceSource::new(vec![0.0, 0.99]);
        assert_eq!(source.pick_index(5), 0);
        assert_eq!(source.pick_index(5), 4);
    }

    #[test]
    fn test_sequential_ids_unique() {
        let ids = SequentialIdGenerator::default();
        let first = ids.next_id();
        let second = ids.next_id();
        assert_ne!(first, second);
    }

    #[test]
    fn test_uuid_ids_unique() {
        let ids = UuidGenerator;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
