//! Board layout: peg grid, zone dividers, enclosing walls and zone labels
//!
//! Everything here is pure geometry computed from a `BoardConfig`. The
//! layout is recomputed only on boot, resize or reset.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::particle::Hsb;
use crate::consts::*;
use crate::error::PlinkoError;
use crate::seed::RandomSource;

/// Board dimensions and physical tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: f32,
    pub height: f32,
    /// Reference zone width; the column count is `floor(width / column_width)`
    pub column_width: f32,
    pub min_columns: usize,
    pub min_rows: usize,
    pub peg_radius: f32,
    pub ball_radius: f32,
    /// Downward gravity (px/s²)
    pub gravity: f32,
    pub ball_restitution: f32,
    pub ball_friction: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            column_width: COLUMN_WIDTH,
            min_columns: MIN_COLUMNS,
            min_rows: MIN_ROWS,
            peg_radius: PEG_RADIUS,
            ball_radius: BALL_RADIUS,
            gravity: GRAVITY,
            ball_restitution: BALL_RESTITUTION,
            ball_friction: BALL_FRICTION,
        }
    }
}

impl BoardConfig {
    /// Reference tuning on a board of the given size
    pub fn new(width: f32, height: f32, min_columns: usize) -> Self {
        Self {
            width,
            height,
            min_columns,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), PlinkoError> {
        PlinkoError::check_positive("board width", self.width)?;
        PlinkoError::check_positive("board height", self.height)?;
        PlinkoError::check_positive("column width", self.column_width)?;
        PlinkoError::check_positive("peg radius", self.peg_radius)?;
        PlinkoError::check_positive("ball radius", self.ball_radius)?;
        Ok(())
    }

    /// y below which a ball is scored against the zones
    pub fn scoring_threshold(&self) -> f32 {
        self.height - SCORING_MARGIN
    }
}

/// A static circular obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peg {
    pub pos: Vec2,
    pub radius: f32,
    /// Colour of the last ball that touched it
    pub color: Hsb,
}

/// What a boundary wall is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    /// Zone edge at the bottom of the board (index from the left, 0..=columns)
    Divider(usize),
    LeftWall,
    RightWall,
    Floor,
}

/// A static rectangular wall
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boundary {
    pub kind: BoundaryKind,
    pub center: Vec2,
    /// Full width and height
    pub size: Vec2,
    pub color: Hsb,
}

impl Boundary {
    fn new(kind: BoundaryKind, center: Vec2, size: Vec2) -> Self {
        Self {
            kind,
            center,
            size,
            color: Hsb::WHITE,
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size / 2.0
    }
}

/// Computed board geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardLayout {
    pub width: f32,
    pub height: f32,
    pub columns: usize,
    pub rows: usize,
    /// Grid pitch; equal to the zone width
    pub spacing: f32,
    pub pegs: Vec<Peg>,
    pub boundaries: Vec<Boundary>,
}

impl BoardLayout {
    pub fn zone_width(&self) -> f32 {
        self.width / self.columns as f32
    }
}

/// Compute pegs and walls for a board
pub fn layout(config: &BoardConfig) -> Result<BoardLayout, PlinkoError> {
    config.validate()?;

    let width = config.width;
    let height = config.height;

    let columns = ((width / config.column_width).floor() as usize)
        .max(config.min_columns)
        .max(1);
    let spacing = width / columns as f32;
    // Float-to-int casts saturate, so a board shorter than one pitch yields 0 here
    let rows = (((height - spacing) / spacing).floor() as usize).max(config.min_rows);

    let mut pegs = Vec::with_capacity(rows * columns);
    for row in 0..rows.saturating_sub(PEG_FREE_ROWS) {
        let y = spacing + row as f32 * spacing;
        let mut x0 = spacing / 4.0;
        if row % 2 == 1 {
            x0 += spacing / 2.0;
        }
        for col in 0..columns {
            pegs.push(Peg {
                pos: Vec2::new(x0 + col as f32 * spacing, y),
                radius: config.peg_radius,
                color: Hsb::WHITE,
            });
        }
    }

    let mut boundaries = Vec::with_capacity(columns + 4);
    for i in 0..=columns {
        boundaries.push(Boundary::new(
            BoundaryKind::Divider(i),
            Vec2::new(i as f32 * spacing, height - DIVIDER_HEIGHT / 2.0),
            Vec2::new(DIVIDER_WIDTH, DIVIDER_HEIGHT),
        ));
    }
    boundaries.push(Boundary::new(
        BoundaryKind::LeftWall,
        Vec2::new(-SIDE_WALL_WIDTH / 2.0, height / 2.0),
        Vec2::new(SIDE_WALL_WIDTH, height),
    ));
    boundaries.push(Boundary::new(
        BoundaryKind::RightWall,
        Vec2::new(width + SIDE_WALL_WIDTH / 2.0, height / 2.0),
        Vec2::new(SIDE_WALL_WIDTH, height),
    ));
    boundaries.push(Boundary::new(
        BoundaryKind::Floor,
        Vec2::new(width / 2.0, height + FLOOR_HEIGHT / 2.0),
        Vec2::new(width, FLOOR_HEIGHT),
    ));

    log::debug!(
        "Layout {}x{}: {} columns, {} rows, spacing {:.1}, {} pegs",
        width,
        height,
        columns,
        rows,
        spacing,
        pegs.len()
    );

    Ok(BoardLayout {
        width,
        height,
        columns,
        rows,
        spacing,
        pegs,
        boundaries,
    })
}

/// Pick the left-to-right zone titles
///
/// Shuffles a copy of `catalog` (Fisher-Yates driven by `rng`) and takes the
/// first `columns` entries; missing entries become the placeholder label.
/// The caller's slice is never reordered.
pub fn assign_zones(catalog: &[String], columns: usize, rng: &mut dyn RandomSource) -> Vec<String> {
    let mut pool = catalog.to_vec();
    for i in (1..pool.len()).rev() {
        let j = (rng.next_f64() * (i + 1) as f64).floor() as usize;
        pool.swap(i, j.min(i));
    }
    pool.truncate(columns);
    pool.resize(columns, PLACEHOLDER_TITLE.to_string());
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeededRandom;
    use proptest::prelude::*;

    fn titles(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reference_layout() {
        let layout = layout(&BoardConfig::default()).unwrap();
        assert_eq!(layout.columns, 12);
        assert!((layout.spacing - 64.0).abs() < 1e-4);
        // (1610 - 64) / 64 = 24.16
        assert_eq!(layout.rows, 24);
        assert_eq!(layout.pegs.len(), (24 - PEG_FREE_ROWS) * 12);
        // One divider per zone edge plus three enclosing walls
        assert_eq!(layout.boundaries.len(), 12 + 1 + 3);
    }

    #[test]
    fn test_min_columns_and_rows_clamp() {
        let config = BoardConfig {
            column_width: 500.0,
            min_columns: 5,
            ..BoardConfig::new(600.0, 100.0, 5)
        };
        let layout = layout(&config).unwrap();
        assert_eq!(layout.columns, 5);
        assert_eq!(layout.rows, config.min_rows);
    }

    #[test]
    fn test_hexagonal_offset() {
        let layout = layout(&BoardConfig::default()).unwrap();
        let s = layout.spacing;
        let first_even = &layout.pegs[0];
        let first_odd = &layout.pegs[layout.columns];
        assert!((first_even.pos.x - s / 4.0).abs() < 1e-4);
        assert!((first_odd.pos.x - (s / 4.0 + s / 2.0)).abs() < 1e-4);
        assert!((first_odd.pos.y - first_even.pos.y - s).abs() < 1e-4);
    }

    #[test]
    fn test_bottom_rows_are_peg_free() {
        let layout = layout(&BoardConfig::default()).unwrap();
        let lowest = layout
            .pegs
            .iter()
            .map(|p| p.pos.y)
            .fold(f32::MIN, f32::max);
        let last_row_y = layout.spacing + (layout.rows - 1) as f32 * layout.spacing;
        assert!(lowest < last_row_y - layout.spacing);
        // Nothing reaches into the divider area
        assert!(lowest < layout.height - DIVIDER_HEIGHT);
    }

    #[test]
    fn test_dividers_on_zone_edges() {
        let layout = layout(&BoardConfig::default()).unwrap();
        let dividers: Vec<_> = layout
            .boundaries
            .iter()
            .filter_map(|b| match b.kind {
                BoundaryKind::Divider(i) => Some((i, b.center.x)),
                _ => None,
            })
            .collect();
        assert_eq!(dividers.len(), layout.columns + 1);
        for (i, x) in dividers {
            assert!((x - i as f32 * layout.zone_width()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let config = BoardConfig {
            ball_radius: 0.0,
            ..BoardConfig::default()
        };
        assert!(matches!(
            layout(&config),
            Err(PlinkoError::InvalidGeometry { what: "ball radius", .. })
        ));
        assert!(layout(&BoardConfig::new(-5.0, 100.0, 4)).is_err());
    }

    #[test]
    fn test_assign_zones_seeded_permutation() {
        let catalog = titles(&["Pac-Man", "Tetris", "Zelda", "Mario"]);
        let mut rng = SeededRandom::new("202501");
        let zones = assign_zones(&catalog, 4, &mut rng);
        assert_eq!(zones, titles(&["Tetris", "Zelda", "Mario", "Pac-Man"]));
        // Source order untouched
        assert_eq!(catalog, titles(&["Pac-Man", "Tetris", "Zelda", "Mario"]));
    }

    #[test]
    fn test_assign_zones_pads_with_placeholder() {
        let catalog = titles(&["Joust"]);
        let mut rng = SeededRandom::new("x");
        let zones = assign_zones(&catalog, 3, &mut rng);
        assert_eq!(zones, titles(&["Joust", PLACEHOLDER_TITLE, PLACEHOLDER_TITLE]));

        let zones = assign_zones(&[], 2, &mut rng);
        assert_eq!(zones, titles(&[PLACEHOLDER_TITLE, PLACEHOLDER_TITLE]));
    }

    #[test]
    fn test_assign_zones_truncates_large_catalog() {
        let catalog: Vec<String> = (0..30).map(|i| format!("Game {}", i)).collect();
        let mut rng = SeededRandom::new("202610");
        let zones = assign_zones(&catalog, 12, &mut rng);
        assert_eq!(zones.len(), 12);
        // Drawn without replacement
        let mut unique = zones.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 12);
    }

    proptest! {
        #[test]
        fn prop_shuffle_never_mutates_catalog(
            seed in "[0-9a-z]{0,8}",
            catalog in proptest::collection::vec("[A-Za-z ]{1,12}", 0..20),
            columns in 1usize..16,
        ) {
            let before = catalog.clone();
            let mut rng = SeededRandom::new(&seed);
            let first = assign_zones(&catalog, columns, &mut rng);
            let mut rng = SeededRandom::new(&seed);
            let second = assign_zones(&catalog, columns, &mut rng);
            prop_assert_eq!(&catalog, &before);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), columns);
        }
    }
}
