//! ---
//! ers_section: "11-simulation"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Fixed-capacity transport delay for a telemetry channel."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use std::collections::VecDeque;

/// FIFO whose length never changes: every push evicts exactly one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayLine {
    buffer: VecDeque<f64>,
    capacity: usize,
}

impl DelayLine {
    /// Create a line of `capacity` samples all holding `value`.
    pub fn filled(capacity: usize, value: f64) -> Self {
        Self {
            buffer: std::iter::repeat(value).take(capacity).collect(),
            capacity,
        }
    }

    /// Append `sample` and return the sample that fell off the front.
    ///
    /// A zero-capacity line returns `sample` unchanged.
    pub fn push(&mut self, sample: f64) -> f64 {
        self.buffer.push_back(sample);
        self.buffer.pop_front().unwrap_or(sample)
    }

    /// Overwrite every slot with `value`.
    pub fn refill(&mut self, value: f64) {
        self.buffer.iter_mut().for_each(|slot| *slot = value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
