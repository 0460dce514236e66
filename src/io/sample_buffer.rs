//! Sample windowing and buffering utilities
//!
//! Live capture delivers chunks of arbitrary length. [`SampleBuffer`]
//! accumulates them and hands out fixed-length analysis windows spaced one
//! hop apart, discarding samples no future window can reach.

/// Buffer for windowed audio processing
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    /// Pending samples; `data[0]` is the start of the next window
    data: Vec<f32>,
    window_size: usize,
    hop_size: usize,
    /// Samples still to discard before the next window starts (hop > window)
    skip: usize,
}

impl SampleBuffer {
    /// Create a new sample buffer
    ///
    /// `window_size` and `hop_size` must be non-zero; the follower validates
    /// both before constructing a buffer.
    pub fn new(window_size: usize, hop_size: usize) -> Self {
        debug_assert!(window_size > 0 && hop_size > 0);
        Self {
            data: Vec::with_capacity(window_size * 2),
            window_size,
            hop_size,
            skip: 0,
        }
    }

    /// Add samples to buffer
    pub fn push(&mut self, samples: &[f32]) {
        let skipped = self.skip.min(samples.len());
        self.skip -= skipped;
        self.data.extend_from_slice(&samples[skipped..]);
    }

    /// Number of buffered samples not yet consumed
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The next full window, if one is buffered, without consuming it
    pub fn peek_window(&self) -> Option<&[f32]> {
        self.data.get(..self.window_size)
    }

    /// Return the remaining samples (shorter than one window) and clear the buffer
    pub fn take_remainder(&mut self) -> Option<Vec<f32>> {
        if self.data.is_empty() {
            return None;
        }
        self.skip = 0;
        Some(std::mem::take(&mut self.data))
    }

    /// Consume one hop after the current window has been handled
    pub fn advance(&mut self) {
        if self.hop_size <= self.data.len() {
            self.data.drain(..self.hop_size);
        } else {
            self.skip = self.hop_size - self.data.len();
            self.data.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(start: usize, len: usize) -> Vec<f32> {
        (start..start + len).map(|i| i as f32).collect()
    }

    fn next_window(buffer: &mut SampleBuffer) -> Option<Vec<f32>> {
        let window = buffer.peek_window()?.to_vec();
        buffer.advance();
        Some(window)
    }

    #[test]
    fn test_non_overlapping_windows() {
        let mut buffer = SampleBuffer::new(4, 4);
        buffer.push(&ramp(0, 10));
        assert_eq!(next_window(&mut buffer), Some(ramp(0, 4)));
        assert_eq!(next_window(&mut buffer), Some(ramp(4, 4)));
        assert_eq!(next_window(&mut buffer), None);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_overlapping_windows() {
        let mut buffer = SampleBuffer::new(4, 2);
        buffer.push(&ramp(0, 8));
        assert_eq!(next_window(&mut buffer), Some(ramp(0, 4)));
        assert_eq!(next_window(&mut buffer), Some(ramp(2, 4)));
        assert_eq!(next_window(&mut buffer), Some(ramp(4, 4)));
        assert_eq!(next_window(&mut buffer), None);
    }

    #[test]
    fn test_chunks_smaller_than_window() {
        let mut buffer = SampleBuffer::new(4, 4);
        buffer.push(&ramp(0, 3));
        assert_eq!(next_window(&mut buffer), None);
        buffer.push(&ramp(3, 3));
        assert_eq!(next_window(&mut buffer), Some(ramp(0, 4)));
        assert_eq!(next_window(&mut buffer), None);
    }

    #[test]
    fn test_hop_larger_than_window() {
        let mut buffer = SampleBuffer::new(2, 5);
        buffer.push(&ramp(0, 3));
        assert_eq!(next_window(&mut buffer), Some(ramp(0, 2)));
        // Samples 3 and 4 are skipped
        buffer.push(&ramp(3, 5));
        assert_eq!(next_window(&mut buffer), Some(ramp(5, 2)));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut buffer = SampleBuffer::new(4, 2);
        buffer.push(&ramp(0, 5));
        assert_eq!(buffer.peek_window(), Some(&ramp(0, 4)[..]));
        assert_eq!(buffer.peek_window(), Some(&ramp(0, 4)[..]));
        assert_eq!(buffer.len(), 5);

        buffer.advance();
        assert_eq!(buffer.peek_window(), None);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_take_remainder() {
        let mut buffer = SampleBuffer::new(4, 4);
        buffer.push(&ramp(0, 6));
        next_window(&mut buffer);
        assert_eq!(buffer.take_remainder(), Some(ramp(4, 2)));
        assert!(buffer.is_empty());
        assert_eq!(buffer.take_remainder(), None);
    }
}
