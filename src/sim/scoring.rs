//! Zone resolution
//!
//! Pure functions of the ball position and the zone table. Zones are
//! half-open intervals `[i * w, (i + 1) * w)`: a ball exactly on a shared
//! edge belongs to the zone on its right, and positions outside the board
//! clamp to the first or last zone.

use glam::Vec2;

/// Zone index for a horizontal position
pub fn zone_index(x: f32, zone_width: f32, columns: usize) -> usize {
    if columns == 0 {
        return 0;
    }
    let raw = (x / zone_width).floor();
    if raw.is_nan() || raw < 0.0 {
        0
    } else {
        (raw as usize).min(columns - 1)
    }
}

/// Title of the zone under the ball, once it is below `threshold`
///
/// Returns `None` while the ball is still above the scoring line or when no
/// zones are assigned.
pub fn resolve<'a>(
    pos: Vec2,
    threshold: f32,
    zone_width: f32,
    zones: &'a [String],
) -> Option<&'a str> {
    if pos.y < threshold || zones.is_empty() {
        return None;
    }
    let index = zone_index(pos.x, zone_width, zones.len());
    zones.get(index).map(String::as_str)
}
