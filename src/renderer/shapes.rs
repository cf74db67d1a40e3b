//! Geometry for the 2D primitives the board draws

use glam::Vec2;
use std::f32::consts::PI;

use crate::sim::Hsb;

/// Distance of the zone labels' baseline above the bottom edge
pub const LABEL_INSET: f32 = 10.0;

/// Rainbow hue of zone label `index`: 0 on the left, 360 on the right
pub fn label_hue(index: usize, columns: usize) -> u16 {
    if columns < 2 {
        return 0;
    }
    let t = index.min(columns - 1) as f32 / (columns - 1) as f32;
    (t * 360.0).round() as u16
}

/// Fully saturated label colour
pub fn label_color(index: usize, columns: usize) -> Hsb {
    // 360 wraps to red, same as 0
    Hsb::new(label_hue(index, columns), 100, 100)
}

/// Anchor of zone label `index`: horizontally centred in the zone
pub fn label_anchor(index: usize, zone_width: f32, board_height: f32) -> Vec2 {
    Vec2::new(
        zone_width * index as f32 + zone_width / 2.0,
        board_height - LABEL_INSET,
    )
}

/// Outline of a star, alternating outer and inner vertices
///
/// The first vertex points straight up.
pub fn star_points(center: Vec2, outer: f32, inner: f32, points: usize) -> Vec<Vec2> {
    let vertices = points * 2;
    let step = PI / points as f32;
    (0..vertices)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let theta = -PI / 2.0 + i as f32 * step;
            center + Vec2::new(theta.cos(), theta.sin()) * r
        })
        .collect()
}

/// Five-point star glyph filling a ball of `radius`
pub fn ball_star(center: Vec2, radius: f32) -> Vec<Vec2> {
    star_points(center, radius, radius * 0.45, 5)
}

/// Top-left corner of an axis-aligned rectangle given its centre and size
pub fn rect_origin(center: Vec2, size: Vec2) -> Vec2 {
    center - size / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_hues_span_rainbow() {
        assert_eq!(label_hue(0, 4), 0);
        assert_eq!(label_hue(1, 4), 120);
        assert_eq!(label_hue(3, 4), 360);
        assert_eq!(label_hue(6, 13), 180);
        assert_eq!(label_hue(0, 1), 0);
        assert_eq!(label_color(3, 4), Hsb::new(0, 100, 100));
    }

    #[test]
    fn test_label_anchor_centred() {
        let a = label_anchor(2, 192.0, 1610.0);
        assert_eq!(a, Vec2::new(480.0, 1600.0));
    }

    #[test]
    fn test_star_shape() {
        let center = Vec2::new(10.0, 20.0);
        let star = ball_star(center, 12.0);
        assert_eq!(star.len(), 10);
        // First tip points up
        assert!((star[0] - Vec2::new(10.0, 8.0)).length() < 1e-4);
        for (i, p) in star.iter().enumerate() {
            let r = (*p - center).length();
            let expected = if i % 2 == 0 { 12.0 } else { 12.0 * 0.45 };
            assert!((r - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_rect_origin() {
        assert_eq!(
            rect_origin(Vec2::new(384.0, 1660.0), Vec2::new(768.0, 100.0)),
            Vec2::new(0.0, 1610.0)
        );
    }
}
