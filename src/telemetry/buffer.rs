//! # Sample Buffer
//!
//! Fixed-capacity ring of the most recent samples, shared between the serial
//! reader thread (writer) and the display (reader).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::parser::Sample;

#[derive(Debug)]
struct Ring {
    samples: VecDeque<Sample>,
    total_pushed: u64,
}

/// Bounded FIFO of samples behind a single mutex
///
/// Cloning the handle shares the underlying buffer. Contents are only ever
/// handed out as copies, so readers never iterate while the writer mutates.
///
/// # Examples
///
/// ```
/// use ir_monitor::telemetry::SampleBuffer;
///
/// let buffer = SampleBuffer::new(3);
/// for value in 1..=5 {
///     buffer.push(value);
/// }
/// assert_eq!(buffer.snapshot(), vec![3, 4, 5]);
/// ```
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    ring: Arc<Mutex<Ring>>,
    capacity: usize,
}

impl SampleBuffer {
    /// Create an empty buffer holding at most `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Arc::new(Mutex::new(Ring {
                samples: VecDeque::with_capacity(capacity),
                total_pushed: 0,
            })),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when full
    pub fn push(&self, value: Sample) {
        let mut ring = self.lock();
        ring.total_pushed += 1;

        if self.capacity == 0 {
            return;
        }
        if ring.samples.len() == self.capacity {
            ring.samples.pop_front();
        }
        ring.samples.push_back(value);
    }

    /// Copy of the current contents, oldest first
    pub fn snapshot(&self) -> Vec<Sample> {
        self.lock().samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples pushed since creation, including evicted ones
    pub fn total_pushed(&self) -> u64 {
        self.lock().total_pushed
    }

    // The ring is never left half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Ring> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
