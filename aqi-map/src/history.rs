//! Bounded PM2.5 history for the displayed coordinate

use std::collections::VecDeque;

use crate::geo::Coordinate;
use crate::state::Reading;

pub const DEFAULT_HISTORY_SIZE: usize = 24;

/// One recorded PM2.5 value
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryPoint {
    pub pm25: f64,
    pub observed_at: Option<String>,
}

/// PM2.5 values fetched for a single coordinate, oldest first.
///
/// Holds at most `capacity` points. Recording a reading for a different
/// coordinate starts a new series.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingHistory {
    coordinate: Option<Coordinate>,
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl ReadingHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            coordinate: None,
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, coordinate: Coordinate, reading: &Reading) {
        if self.coordinate != Some(coordinate) {
            self.points.clear();
            self.coordinate = Some(coordinate);
        }

        let Some(pm25) = reading.pm25 else {
            return;
        };
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(HistoryPoint {
            pm25,
            observed_at: reading.observed_at.clone(),
        });
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `(index, pm25)` pairs for charting
    pub fn series(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.pm25))
            .collect()
    }

    pub fn max_pm25(&self) -> Option<f64> {
        self.points.iter().map(|p| p.pm25).reduce(f64::max)
    }
}

impl Default for ReadingHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}
