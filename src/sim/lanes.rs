//! Lane geometry derived from the detected asphalt span

use serde::{Deserialize, Serialize};

use super::road::RoadBounds;

/// Equal-width lanes partitioning the drivable span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneSet {
    bounds: RoadBounds,
    lane_w: i32,
    centers: Vec<i32>,
}

impl LaneSet {
    /// `lane_w = inner_w / count` (truncating), centres at the middle of each lane
    pub fn new(bounds: RoadBounds, count: usize) -> Self {
        let count = count.max(1);
        let lane_w = bounds.inner_w / count as i32;
        let centers = (0..count as i32)
            .map(|i| bounds.inner_x + lane_w / 2 + i * lane_w)
            .collect();
        Self {
            bounds,
            lane_w,
            centers,
        }
    }

    #[inline]
    pub fn bounds(&self) -> RoadBounds {
        self.bounds
    }

    #[inline]
    pub fn lane_width(&self) -> i32 {
        self.lane_w
    }

    #[inline]
    pub fn centers(&self) -> &[i32] {
        &self.centers
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.centers.len()
    }

    #[inline]
    pub fn center(&self, lane: usize) -> i32 {
        self.centers[lane.min(self.centers.len() - 1)]
    }

    /// Index of the lane whose centre is closest to `x`; the lowest index wins ties
    pub fn nearest_lane(&self, x: f32) -> usize {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (i, &c) in self.centers.iter().enumerate() {
            let dist = (x - c as f32).abs();
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best
    }
}
