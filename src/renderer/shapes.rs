//! Rasterised 2D primitives drawn straight into an image

use glam::Vec2;

use super::pixel::{Image, Rgba};

/// Blend an axis-aligned rectangle
pub fn fill_rect(img: &mut Image, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(img.width() as i32);
    let y1 = (y + h).min(img.height() as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            img.blend(px, py, color);
        }
    }
}

/// Blend a filled circle
pub fn fill_circle(img: &mut Image, center: Vec2, radius: f32, color: Rgba) {
    if radius <= 0.0 {
        return;
    }
    let r2 = radius * radius;
    let x0 = (center.x - radius).floor() as i32;
    let x1 = (center.x + radius).ceil() as i32;
    let y0 = (center.y - radius).floor() as i32;
    let y1 = (center.y + radius).ceil() as i32;
    for py in y0..=y1 {
        for px in x0..=x1 {
            let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5) - center;
            if d.length_squared() <= r2 {
                img.blend(px, py, color);
            }
        }
    }
}

/// Blend a filled triangle (edge-function test at pixel centres)
pub fn fill_triangle(img: &mut Image, a: Vec2, b: Vec2, c: Vec2, color: Rgba) {
    let edge = |p: Vec2, q: Vec2, r: Vec2| (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x);
    let area = edge(a, b, c);
    if area.abs() < f32::EPSILON {
        return;
    }
    let min = a.min(b).min(c).floor();
    let max = a.max(b).max(c).ceil();
    for py in min.y as i32..=max.y as i32 {
        for px in min.x as i32..=max.x as i32 {
            let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
            let w0 = edge(b, c, p) * area.signum();
            let w1 = edge(c, a, p) * area.signum();
            let w2 = edge(a, b, p) * area.signum();
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                img.blend(px, py, color);
            }
        }
    }
}

/// Horizontal arrow centred on `center`, pointing right when `right` is set
pub fn arrow(img: &mut Image, center: Vec2, size: f32, right: bool, color: Rgba) {
    let half = size / 2.0;
    let dir = if right { 1.0 } else { -1.0 };
    fill_rect(
        img,
        (center.x - half) as i32,
        (center.y - 1.0) as i32,
        size as i32,
        3,
        color,
    );
    let tip = Vec2::new(center.x + dir * half, center.y);
    let back = center.x + dir * (half - size * 0.3);
    fill_triangle(
        img,
        tip,
        Vec2::new(back, center.y - size * 0.3),
        Vec2::new(back, center.y + size * 0.3),
        color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut img = Image::transparent(4, 4);
        fill_rect(&mut img, -2, -2, 4, 4, Rgba::opaque(255, 0, 0));
        assert_eq!(img.get(0, 0), Rgba::opaque(255, 0, 0));
        assert_eq!(img.get(1, 1), Rgba::opaque(255, 0, 0));
        assert_eq!(img.get(2, 2), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_fill_circle_covers_center_not_corner() {
        let mut img = Image::transparent(10, 10);
        fill_circle(&mut img, Vec2::new(5.0, 5.0), 3.0, Rgba::opaque(0, 255, 0));
        assert_eq!(img.get(5, 5), Rgba::opaque(0, 255, 0));
        assert_eq!(img.get(0, 0), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_fill_triangle_winding_independent() {
        let mut a = Image::transparent(10, 10);
        let mut b = Image::transparent(10, 10);
        let (p, q, r) = (Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0));
        fill_triangle(&mut a, p, q, r, Rgba::opaque(1, 2, 3));
        fill_triangle(&mut b, p, r, q, Rgba::opaque(1, 2, 3));
        assert_eq!(a, b);
        assert_eq!(a.get(1, 1), Rgba::opaque(1, 2, 3));
        assert_eq!(a.get(9, 9), Rgba::TRANSPARENT);
    }
}
