//! Terrain features: shape, rule traits and blocking flags
//!
//! Features are immutable once built. The builder methods consume `self`, so
//! a feature can only be adjusted before it is placed into a layout.

use serde::{Deserialize, Serialize};

use crate::core::types::{BoundingBox, IdGenerator, Point, TerrainId};
use crate::terrain::constants::HILL_ELEVATION;

/// Catalogue tag for a terrain piece
///
/// The tag only picks default traits; rules always read the traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerrainKind {
    Ruins,
    Woods,
    Crater,
    Barricade,
    Building,
    Container,
    Hills,
    Debris,
    Custom,
}

impl TerrainKind {
    pub fn label(&self) -> &'static str {
        match self {
            TerrainKind::Ruins => "ruins",
            TerrainKind::Woods => "woods",
            TerrainKind::Crater => "crater",
            TerrainKind::Barricade => "barricade",
            TerrainKind::Building => "building",
            TerrainKind::Container => "container",
            TerrainKind::Hills => "hills",
            TerrainKind::Debris => "debris",
            TerrainKind::Custom => "custom",
        }
    }

    /// Rule traits a freshly built piece of this kind carries
    pub fn default_traits(&self) -> TerrainTraits {
        let base = TerrainTraits::default();
        match self {
            TerrainKind::Ruins => TerrainTraits {
                light_cover: true,
                obscuring: true,
                breachable: true,
                scalable: true,
                defensible: true,
                ..base
            },
            TerrainKind::Woods => TerrainTraits {
                light_cover: true,
                dense_cover: true,
                breachable: true,
                ..base
            },
            TerrainKind::Crater => TerrainTraits {
                light_cover: true,
                difficult_ground: true,
                ..base
            },
            TerrainKind::Barricade => TerrainTraits {
                light_cover: true,
                defensible: true,
                ..base
            },
            TerrainKind::Building => TerrainTraits {
                heavy_cover: true,
                obscuring: true,
                scalable: true,
                ..base
            },
            TerrainKind::Container => TerrainTraits {
                heavy_cover: true,
                obscuring: true,
                ..base
            },
            TerrainKind::Hills => TerrainTraits {
                exposed: true,
                scalable: true,
                ..base
            },
            TerrainKind::Debris => TerrainTraits {
                light_cover: true,
                difficult_ground: true,
                unstable: true,
                ..base
            },
            TerrainKind::Custom => base,
        }
    }

    /// Default movement blocking for this kind
    fn default_blocking(&self) -> BlockingFlags {
        match self {
            TerrainKind::Container | TerrainKind::Building => BlockingFlags {
                impassable: true,
                ..Default::default()
            },
            TerrainKind::Barricade => BlockingFlags {
                blocks_large_models: true,
                ..Default::default()
            },
            _ => BlockingFlags::default(),
        }
    }
}

/// Independent rule flags; any combination is legal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainTraits {
    pub light_cover: bool,
    pub heavy_cover: bool,
    pub obscuring: bool,
    pub dense_cover: bool,
    pub breachable: bool,
    pub difficult_ground: bool,
    pub unstable: bool,
    pub exposed: bool,
    pub scalable: bool,
    pub defensible: bool,
}

impl TerrainTraits {
    /// Grants cover to models inside or behind it
    pub fn grants_cover(&self) -> bool {
        (self.light_cover || self.heavy_cover) && !self.exposed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
struct BlockingFlags {
    impassable: bool,
    infantry_only: bool,
    blocks_large_models: bool,
}

/// Footprint of a terrain piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TerrainShape {
    /// Axis-aligned rectangle centred on the feature position
    Rectangle { width: f32, height: f32 },
    /// Circle centred on the feature position
    Circle { radius: f32 },
    /// Absolute battlefield vertices in order (either winding)
    Polygon { vertices: Vec<Point> },
}

/// A terrain piece on the battlefield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainFeature {
    id: TerrainId,
    name: String,
    kind: TerrainKind,
    position: Point,
    shape: TerrainShape,
    elevation: f32,
    traits: TerrainTraits,
    impassable: bool,
    infantry_only: bool,
    blocks_large_models: bool,
}

impl TerrainFeature {
    /// Build a feature with the kind's default traits and blocking
    pub fn new(id: TerrainId, kind: TerrainKind, position: Point, shape: TerrainShape) -> Self {
        let blocking = kind.default_blocking();
        Self {
            id,
            name: format!("{} {}", kind.label(), id.0),
            kind,
            position,
            shape: sanitize_shape(shape),
            elevation: if kind == TerrainKind::Hills { HILL_ELEVATION } else { 0.0 },
            traits: kind.default_traits(),
            impassable: blocking.impassable,
            infantry_only: blocking.infantry_only,
            blocks_large_models: blocking.blocks_large_models,
        }
    }

    fn rect(ids: &mut IdGenerator, kind: TerrainKind, position: Point, width: f32, height: f32) -> Self {
        Self::new(
            ids.next_terrain_id(),
            kind,
            position,
            TerrainShape::Rectangle { width, height },
        )
    }

    fn circle(ids: &mut IdGenerator, kind: TerrainKind, position: Point, radius: f32) -> Self {
        Self::new(ids.next_terrain_id(), kind, position, TerrainShape::Circle { radius })
    }

    pub fn ruins(ids: &mut IdGenerator, position: Point, width: f32, height: f32) -> Self {
        Self::rect(ids, TerrainKind::Ruins, position, width, height)
    }

    pub fn woods(ids: &mut IdGenerator, position: Point, radius: f32) -> Self {
        Self::circle(ids, TerrainKind::Woods, position, radius)
    }

    pub fn crater(ids: &mut IdGenerator, position: Point, radius: f32) -> Self {
        Self::circle(ids, TerrainKind::Crater, position, radius)
    }

    pub fn barricade(ids: &mut IdGenerator, position: Point, width: f32, height: f32) -> Self {
        Self::rect(ids, TerrainKind::Barricade, position, width, height)
    }

    pub fn building(ids: &mut IdGenerator, position: Point, width: f32, height: f32) -> Self {
        Self::rect(ids, TerrainKind::Building, position, width, height)
    }

    pub fn container(ids: &mut IdGenerator, position: Point, width: f32, height: f32) -> Self {
        Self::rect(ids, TerrainKind::Container, position, width, height)
    }

    pub fn hills(ids: &mut IdGenerator, position: Point, width: f32, height: f32) -> Self {
        Self::rect(ids, TerrainKind::Hills, position, width, height)
    }

    pub fn debris(ids: &mut IdGenerator, position: Point, radius: f32) -> Self {
        Self::circle(ids, TerrainKind::Debris, position, radius)
    }

    /// Traitless polygon; position is the vertex centroid
    pub fn custom_polygon(ids: &mut IdGenerator, vertices: Vec<Point>) -> Self {
        let position = centroid(&vertices);
        Self::new(
            ids.next_terrain_id(),
            TerrainKind::Custom,
            position,
            TerrainShape::Polygon { vertices },
        )
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_traits(mut self, traits: TerrainTraits) -> Self {
        self.traits = traits;
        self
    }

    pub fn with_elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_impassable(mut self, impassable: bool) -> Self {
        self.impassable = impassable;
        self
    }

    pub fn with_infantry_only(mut self, infantry_only: bool) -> Self {
        self.infantry_only = infantry_only;
        self
    }

    pub fn with_blocks_large_models(mut self, blocks: bool) -> Self {
        self.blocks_large_models = blocks;
        self
    }

    pub fn id(&self) -> TerrainId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TerrainKind {
        self.kind
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn shape(&self) -> &TerrainShape {
        &self.shape
    }

    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    pub fn traits(&self) -> &TerrainTraits {
        &self.traits
    }

    pub fn is_impassable(&self) -> bool {
        self.impassable
    }

    pub fn is_infantry_only(&self) -> bool {
        self.infantry_only
    }

    pub fn blocks_large_models(&self) -> bool {
        self.blocks_large_models
    }

    pub fn bounding_box(&self) -> BoundingBox {
        match &self.shape {
            TerrainShape::Rectangle { width, height } => {
                BoundingBox::centered(self.position, *width, *height)
            }
            TerrainShape::Circle { radius } => {
                BoundingBox::centered(self.position, radius * 2.0, radius * 2.0)
            }
            TerrainShape::Polygon { vertices } => BoundingBox::from_points(vertices)
                .unwrap_or_else(|| BoundingBox::centered(self.position, 0.0, 0.0)),
        }
    }

    /// Copy of this feature with its footprint grown by `margin` on every side
    ///
    /// Rectangles grow by `2 * margin` in each dimension, circles by `margin`
    /// in radius, polygons have every edge pushed `margin` outward.
    pub fn inflated(&self, margin: f32) -> Self {
        let m = margin.max(0.0);
        let shape = match &self.shape {
            TerrainShape::Rectangle { width, height } => TerrainShape::Rectangle {
                width: width + 2.0 * m,
                height: height + 2.0 * m,
            },
            TerrainShape::Circle { radius } => TerrainShape::Circle { radius: radius + m },
            TerrainShape::Polygon { vertices } => TerrainShape::Polygon {
                vertices: offset_polygon(vertices, m),
            },
        };
        Self {
            shape,
            ..self.clone()
        }
    }
}

/// Clamp negative extents so every shape has non-negative size
fn sanitize_shape(shape: TerrainShape) -> TerrainShape {
    match shape {
        TerrainShape::Rectangle { width, height } => TerrainShape::Rectangle {
            width: width.abs(),
            height: height.abs(),
        },
        TerrainShape::Circle { radius } => TerrainShape::Circle {
            radius: radius.max(0.0),
        },
        polygon => polygon,
    }
}

pub(crate) fn centroid(vertices: &[Point]) -> Point {
    if vertices.is_empty() {
        return Point::ZERO;
    }
    let sum: Point = vertices.iter().copied().sum();
    sum / vertices.len() as f32
}

/// Twice the signed area; positive for counter-clockwise winding
pub(crate) fn signed_area2(vertices: &[Point]) -> f32 {
    let n = vertices.len();
    let mut sum = 0.0;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum
}

/// Push every polygon edge outward by `margin` (mitred joins)
fn offset_polygon(vertices: &[Point], margin: f32) -> Vec<Point> {
    let n = vertices.len();
    if n < 3 || margin == 0.0 {
        return vertices.to_vec();
    }
    let ccw = signed_area2(vertices) >= 0.0;
    let outward = |a: Point, b: Point| -> Point {
        let d = (b - a).normalize_or_zero();
        if ccw {
            Point::new(d.y, -d.x)
        } else {
            Point::new(-d.y, d.x)
        }
    };

    (0..n)
        .map(|i| {
            let prev = vertices[(i + n - 1) % n];
            let cur = vertices[i];
            let next = vertices[(i + 1) % n];
            let n1 = outward(prev, cur);
            let n2 = outward(cur, next);
            let bisector = (n1 + n2).normalize_or_zero();
            if bisector == Point::ZERO {
                return cur + n1 * margin;
            }
            // Limit the mitre on very sharp corners
            let cos_half = bisector.dot(n1).max(0.25);
            cur + bisector * (margin / cos_half)
        })
        .collect()
}
