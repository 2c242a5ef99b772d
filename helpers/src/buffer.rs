use std::collections::VecDeque;

/// RingBuffer keeps the latest `capacity` values, e.g. to average GUI update durations.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    capacity: usize,
    vals: VecDeque<T>,
}

impl<T: Copy + Into<f64>> RingBuffer<T> {
    pub fn new(capacity: usize) -> RingBuffer<T> {
        RingBuffer {
            capacity: capacity.max(1),
            vals: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    /// push appends a value and drops the oldest one if the buffer is full.
    pub fn push(&mut self, val: T) {
        if self.vals.len() == self.capacity {
            self.vals.pop_front();
        }
        self.vals.push_back(val);
    }

    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    /// get_avg returns the average of the stored values or None if the buffer is empty.
    pub fn get_avg(&self) -> Option<f64> {
        if self.vals.is_empty() {
            return None;
        }

        let sum: f64 = self.vals.iter().map(|&val| val.into()).sum();
        Some(sum / self.vals.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_value() {
        let mut buffer: RingBuffer<u32> = RingBuffer::new(3);
        assert_eq!(buffer.get_avg(), None);

        for val in [10, 20, 30, 40] {
            buffer.push(val);
        }

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.get_avg(), Some(30.0));
    }
}
