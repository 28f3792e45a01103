//! Bounded FIFO buffer for inertial attitude samples.
//!
//! The inertial producer appends at sensor rate; the odometry cycle reads at
//! scan rate. The two sides never iterate the same structure: consumers take
//! a point-in-time [`snapshot`](AttitudeBuffer::snapshot) and work on the
//! copy, so a producer appending mid-cycle cannot shift indices under the
//! nearest-timestamp search.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::types::AttitudeSample;

/// Default buffer capacity in samples.
pub const DEFAULT_ATTITUDE_CAPACITY: usize = 100;

/// Bounded FIFO of recent attitude samples.
///
/// When full, the oldest sample is evicted before the new one is appended.
/// Samples are never reordered. The very first sample ever pushed is kept
/// separately: the pipeline needs it to seed the previous-attitude chain
/// during warm-up even after it has been evicted from the window.
#[derive(Debug, Clone)]
pub struct AttitudeBuffer {
    samples: VecDeque<AttitudeSample>,
    capacity: usize,
    first: Option<AttitudeSample>,
}

impl AttitudeBuffer {
    /// Create an empty buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ATTITUDE_CAPACITY)
    }

    /// Create an empty buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            first: None,
        }
    }

    /// Append a sample, evicting the oldest when at capacity.
    pub fn push(&mut self, sample: AttitudeSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);

        if self.first.is_none() {
            log::info!(
                "first attitude sample received at t={} us",
                sample.timestamp_us
            );
            self.first = Some(sample);
        }
    }

    /// Take an owned copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<AttitudeSample> {
        self.samples.iter().copied().collect()
    }

    /// The first sample ever pushed, if any.
    #[inline]
    pub fn first(&self) -> Option<AttitudeSample> {
        self.first
    }

    /// Number of buffered samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Configured capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for AttitudeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe handle to an [`AttitudeBuffer`].
///
/// Clone one handle into the producer thread and keep another on the
/// consumer side. The lock is held only for the append or the snapshot copy,
/// never across a processing cycle.
#[derive(Debug, Clone, Default)]
pub struct SharedAttitudeBuffer {
    inner: Arc<Mutex<AttitudeBuffer>>,
}

impl SharedAttitudeBuffer {
    /// Create a shared buffer with the default capacity.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(AttitudeBuffer::new())),
        }
    }

    /// Create a shared buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AttitudeBuffer::with_capacity(capacity))),
        }
    }

    /// Append a sample (producer side).
    pub fn push(&self, sample: AttitudeSample) {
        self.inner.lock().push(sample);
    }

    /// Take a point-in-time copy of the contents (consumer side).
    pub fn snapshot(&self) -> Vec<AttitudeSample> {
        self.inner.lock().snapshot()
    }

    /// The first sample ever pushed, if any.
    pub fn first(&self) -> Option<AttitudeSample> {
        self.inner.lock().first()
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
