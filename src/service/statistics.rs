//! Aggregate dominance statistics
//!
//! Counts, per display key, the distinct images in which the key was dominant.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::engine::AttributeObservation;
use crate::utils::math::rounded_percentage;

/// One finalized statistics row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticEntry {
    pub key: String,
    pub count: usize,
    /// `round(count / total_images * 100)`
    pub percentage: u32,
}

/// Finalized statistics, sorted by count descending.
///
/// Keys with equal counts keep the order in which they first became dominant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStatistics {
    pub total_images: usize,
    pub entries: Vec<StatisticEntry>,
}

impl AggregateStatistics {
    pub fn get(&self, key: &str) -> Option<&StatisticEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn count(&self, key: &str) -> usize {
        self.get(key).map_or(0, |e| e.count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulates dominance counts while a batch runs
#[derive(Debug, Default)]
pub struct StatisticsAccumulator {
    /// Key and count, in first-reached order
    counts: Vec<(String, usize)>,
    positions: HashMap<String, usize>,
    /// (image id, key) pairs already counted
    counted: HashSet<(usize, String)>,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one image's dominant selection.
    ///
    /// An image adds at most one to any key, however often the key appears.
    pub fn record(&mut self, image_id: usize, selection: &[AttributeObservation]) {
        for obs in selection {
            let key = obs.display_key();
            if !self.counted.insert((image_id, key.to_string())) {
                continue;
            }

            match self.positions.get(key) {
                Some(&pos) => self.counts[pos].1 += 1,
                None => {
                    self.positions.insert(key.to_string(), self.counts.len());
                    self.counts.push((key.to_string(), 1));
                }
            }
        }
    }

    /// Sort and compute percentages against `total_images`
    pub fn finalize(self, total_images: usize) -> AggregateStatistics {
        let mut entries: Vec<StatisticEntry> = self
            .counts
            .into_iter()
            .map(|(key, count)| StatisticEntry {
                percentage: rounded_percentage(count, total_images),
                key,
                count,
            })
            .collect();

        // stable: ties stay in first-reached order
        entries.sort_by(|a, b| b.count.cmp(&a.count));

        AggregateStatistics {
            total_images,
            entries,
        }
    }
}
