//! Asphalt detection on the road texture
//!
//! The road sprite is analysed once per session to find the horizontal span
//! of drivable asphalt. Columns are classified by their mean HSV saturation
//! and value over the middle band of the image (curbs, sky and decorations
//! usually sit near the top and bottom), a closing pass bridges lane
//! markings, and the longest asphalt run wins.

use serde::{Deserialize, Serialize};

use crate::consts::EPSILON;
use crate::renderer::Image;
use crate::settings::DetectorConfig;

/// Drivable span in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadBounds {
    /// Left edge of the asphalt (screen x)
    pub inner_x: i32,
    /// Width of the asphalt, always at least 1
    pub inner_w: i32,
}

impl RoadBounds {
    #[inline]
    pub fn right(&self) -> i32 {
        self.inner_x + self.inner_w
    }
}

/// `floor(len * frac)` tolerant of `f32` representation error in `frac`
#[inline]
fn frac_floor(len: usize, frac: f32) -> usize {
    ((len as f64) * (frac as f64) + 1e-4).floor().max(0.0) as usize
}

/// Per-column mean saturation and value over rows `[y0, y1)`
fn column_stats(img: &Image, y0: u32, y1: u32) -> (Vec<f32>, Vec<f32>) {
    let w = img.width() as usize;
    let mut sat = vec![0.0f32; w];
    let mut val = vec![0.0f32; w];
    let rows = (y1 - y0).max(1) as f32;

    for y in y0..y1 {
        for x in 0..img.width() {
            let [r, g, b] = img.get(x, y).to_unit_rgb();
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);
            let s = if max == 0.0 {
                0.0
            } else {
                (max - min) / (max + EPSILON)
            };
            sat[x as usize] += s;
            val[x as usize] += max;
        }
    }

    for x in 0..w {
        sat[x] /= rows;
        val[x] /= rows;
    }
    (sat, val)
}

/// Sliding-window dilation (`any`) or erosion (`all`) over a boolean row.
/// Cells outside the slice count as `false`.
fn morph(mask: &[bool], window: usize, erode: bool) -> Vec<bool> {
    let half = (window / 2) as isize;
    let n = mask.len() as isize;
    (0..n)
        .map(|i| {
            let mut cells = (i - half..=i + half).map(|j| j >= 0 && j < n && mask[j as usize]);
            if erode {
                cells.all(|c| c)
            } else {
                cells.any(|c| c)
            }
        })
        .collect()
}

/// Morphological closing (dilate then erode) with `window/2` cells of
/// `false` padding on each side, so runs touching the borders keep their
/// extent.
pub fn close_mask(mask: &[bool], window: usize) -> Vec<bool> {
    let pad = window / 2;
    let mut padded = vec![false; mask.len() + 2 * pad];
    padded[pad..pad + mask.len()].copy_from_slice(mask);

    let dilated = morph(&padded, window, false);
    let closed = morph(&dilated, window, true);
    closed[pad..pad + mask.len()].to_vec()
}

/// Longest run of `true` as `(left, right_exclusive)`. Earlier runs win ties.
pub fn longest_run(mask: &[bool]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut start: Option<usize> = None;

    for (i, &v) in mask.iter().chain(std::iter::once(&false)).enumerate() {
        match (v, start) {
            (true, None) => start = Some(i),
            (false, Some(l)) => {
                let len = i - l;
                if best.is_none_or(|(bl, br)| len > br - bl) {
                    best = Some((l, i));
                }
                start = None;
            }
            _ => {}
        }
    }
    best
}

/// Find the asphalt span of `texture` drawn at screen x `road_x`.
///
/// Returns the fallback span (15%–85% of the texture width by default) when
/// no column qualifies as asphalt.
pub fn detect_asphalt_bounds(texture: &Image, road_x: i32, cfg: &DetectorConfig) -> RoadBounds {
    let full_w = texture.width() as usize;
    let fallback = || {
        let l = frac_floor(full_w, cfg.fallback_left) as i32;
        let r = frac_floor(full_w, cfg.fallback_right) as i32;
        RoadBounds {
            inner_x: road_x + l,
            inner_w: (r - l).max(1),
        }
    };

    if texture.is_empty() {
        log::warn!("Road texture is empty, using fallback lane span");
        return fallback();
    }

    let target_w = cfg.max_width.min(texture.width());
    let scale = target_w as f32 / texture.width() as f32;
    let small;
    let img = if scale < 1.0 {
        let target_h = ((texture.height() as f32 * scale) as u32).max(1);
        small = texture.resize_bilinear(target_w, target_h);
        &small
    } else {
        texture
    };

    let h = img.height() as usize;
    let y0 = frac_floor(h, cfg.band_top).min(h - 1);
    let y1 = frac_floor(h, cfg.band_bottom).clamp(y0 + 1, h);
    let (sat, val) = column_stats(img, y0 as u32, y1 as u32);

    let mask: Vec<bool> = sat
        .iter()
        .zip(&val)
        .map(|(&s, &v)| s < cfg.max_saturation && v < cfg.max_value)
        .collect();
    let mask = close_mask(&mask, cfg.closing_window);

    let Some((l_small, r_small)) = longest_run(&mask) else {
        log::info!("No asphalt columns found, using fallback lane span");
        return fallback();
    };

    let (l_src, r_src) = if scale < 1.0 {
        (
            (l_small as f32 / scale) as i32,
            (r_small as f32 / scale) as i32,
        )
    } else {
        (l_small as i32, r_small as i32)
    };

    let bounds = RoadBounds {
        inner_x: road_x + l_src,
        inner_w: (r_src - l_src).max(1),
    };
    log::info!(
        "Asphalt detected: x={} w={} (scale {:.3})",
        bounds.inner_x,
        bounds.inner_w,
        scale
    );
    bounds
}
