//! Fixed-capacity FIFO of recent raw samples

use heapless::Deque;

/// The most recent `W` raw samples of one channel, oldest first
#[derive(Debug, Clone)]
pub struct SignalWindow<const W: usize> {
    samples: Deque<u16, W>,
}

impl<const W: usize> Default for SignalWindow<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize> SignalWindow<W> {
    /// Create an empty window
    pub const fn new() -> Self {
        Self {
            samples: Deque::new(),
        }
    }

    /// Append a sample, evicting and returning the oldest once full
    pub fn push(&mut self, sample: u16) -> Option<u16> {
        let evicted = if self.samples.is_full() {
            self.samples.pop_front()
        } else {
            None
        };
        // Room was made above, so this cannot fail
        let _ = self.samples.push_back(sample);
        evicted
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns true once `W` samples have been seen
    pub fn is_full(&self) -> bool {
        self.samples.is_full()
    }

    pub const fn capacity(&self) -> usize {
        W
    }

    /// Samples, oldest first
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.samples.iter().copied()
    }

    pub fn min(&self) -> Option<u16> {
        self.iter().min()
    }

    pub fn max(&self) -> Option<u16> {
        self.iter().max()
    }

    /// `max - min` of the window, 0 when empty
    pub fn spread(&self) -> u16 {
        match (self.min(), self.max()) {
            (Some(lo), Some(hi)) => hi - lo,
            _ => 0,
        }
    }

    /// Number of entries strictly greater than `value`
    pub fn count_above(&self, value: u16) -> usize {
        self.iter().filter(|&s| s > value).count()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
