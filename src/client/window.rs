//! Rolling window of recent readings for live display

use std::collections::VecDeque;

use crate::reading::Reading;

/// Smallest vertical margin around the plotted range
const MIN_MARGIN: f64 = 0.5;

/// Keeps the most recent readings, evicting the oldest
#[derive(Debug, Clone)]
pub struct ReadingWindow {
    max_points: usize,
    readings: VecDeque<Reading>,
}

impl ReadingWindow {
    /// Create a window holding at most `max_points` readings (at least 1)
    pub fn new(max_points: usize) -> Self {
        let max_points = max_points.max(1);
        Self {
            max_points,
            readings: VecDeque::with_capacity(max_points),
        }
    }

    /// Add a reading, dropping the oldest if the window is full
    pub fn push(&mut self, reading: Reading) {
        if self.readings.len() == self.max_points {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    /// Readings oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    /// Most recent reading
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Display range for the values, padded by 10% of the spread (min 0.5)
    ///
    /// `None` until at least two readings are present.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        if self.readings.len() < 2 {
            return None;
        }

        let (min, max) = self
            .readings
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r.value), hi.max(r.value))
            });
        let margin = MIN_MARGIN.max((max - min) * 0.1);

        Some((min - margin, max + margin))
    }
}
