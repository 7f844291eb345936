//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Battlefield coordinate in inches
pub type Point = glam::Vec2;

/// Unique identifier for terrain features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainId(pub u32);

/// Unique identifier for units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Unique identifier for armies (one per side of the table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArmyId(pub u32);

/// Unique identifier for objective markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectiveId(pub u32);

/// Monotonic id source, injected wherever ids are minted
///
/// Each layout or test owns its own generator, so there is no process-wide
/// counter to reset.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from `first` (useful when appending to an existing layout)
    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    pub fn next_raw(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }

    pub fn next_terrain_id(&mut self) -> TerrainId {
        TerrainId(self.next_raw())
    }

    pub fn next_unit_id(&mut self) -> UnitId {
        UnitId(self.next_raw())
    }

    pub fn next_objective_id(&mut self) -> ObjectiveId {
        ObjectiveId(self.next_raw())
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: max_x.max(min_x),
            max_y: max_y.max(min_y),
        }
    }

    /// Board of the given size with its corner at the origin
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width.max(0.0), height.max(0.0))
    }

    /// Box of the given size centred on `center`
    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        let hw = width.abs() / 2.0;
        let hh = height.abs() / 2.0;
        Self::new(center.x - hw, center.y - hh, center.x + hw, center.y + hh)
    }

    /// Smallest box containing every point; `None` for an empty slice
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bb = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bb.min_x = bb.min_x.min(p.x);
            bb.min_y = bb.min_y.min(p.y);
            bb.max_x = bb.max_x.max(p.x);
            bb.max_y = bb.max_y.max(p.y);
        }
        Some(bb)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Grow (or shrink, for negative margins) on every side
    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Box spanned by a segment
    pub fn of_segment(a: Point, b: Point) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// Clamp a point so that a base of `radius` stays on the board
    ///
    /// Boards narrower than the base collapse onto their centre line.
    pub fn clamp_point(&self, p: Point, radius: f32) -> Point {
        let r = radius.max(0.0);
        let (lo_x, hi_x) = if self.width() >= 2.0 * r {
            (self.min_x + r, self.max_x - r)
        } else {
            let c = self.center().x;
            (c, c)
        };
        let (lo_y, hi_y) = if self.height() >= 2.0 * r {
            (self.min_y + r, self.max_y - r)
        } else {
            let c = self.center().y;
            (c, c)
        };
        Point::new(p.x.clamp(lo_x, hi_x), p.y.clamp(lo_y, hi_y))
    }

    /// The four corners, counter-clockwise from the minimum corner
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}
