//! Fixed-capacity rolling window of recent values for one channel.

use std::collections::VecDeque;

/// Insertion-ordered ring of the last `capacity` values.
///
/// Statistics always divide by `capacity`: slots that have not been filled
/// yet count as zeros. A single `1.0` in a 5-slot window has mean `0.2`.
/// The bundled classifier expects this startup bias.
#[derive(Debug, Clone)]
pub struct History {
    buf: VecDeque<f32>,
    capacity: usize,
}

impl History {
    /// Create an empty window; a zero capacity is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `value`, returning the evicted oldest value when full.
    pub fn push(&mut self, value: f32) -> Option<f32> {
        let evicted = if self.buf.len() == self.capacity {
            self.buf.pop_front()
        } else {
            None
        };
        self.buf.push_back(value);
        evicted
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buf.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<f32> {
        self.buf.back().copied()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.buf.iter().copied()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Mean over all `capacity` slots, empty ones as zero.
    pub fn mean(&self) -> f32 {
        (self.sum() / self.capacity as f64) as f32
    }

    /// Population standard deviation over all `capacity` slots, empty ones as zero.
    pub fn volatility(&self) -> f32 {
        let n = self.capacity as f64;
        let mean = self.sum() / n;
        let held: f64 = self
            .buf
            .iter()
            .map(|&v| {
                let d = f64::from(v) - mean;
                d * d
            })
            .sum();
        let empty = (self.capacity - self.buf.len()) as f64 * mean * mean;
        ((held + empty) / n).sqrt() as f32
    }

    fn sum(&self) -> f64 {
        self.buf.iter().map(|&v| f64::from(v)).sum()
    }
}
