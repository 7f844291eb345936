//! Pure shape math over terrain footprints
//!
//! Every function here is total: degenerate shapes (zero radius, polygons
//! with fewer than three vertices) behave like the points or segments they
//! collapse to, and nothing panics.

use crate::core::types::{BoundingBox, Point};
use crate::terrain::constants::{GEOMETRY_EPSILON, SEGMENT_ENTRY_STEPS};
use crate::terrain::feature::{TerrainFeature, TerrainShape};

/// Is the point inside (or on the edge of) the feature's footprint?
pub fn point_in_terrain(point: Point, feature: &TerrainFeature) -> bool {
    match feature.shape() {
        TerrainShape::Circle { radius } => {
            point.distance_squared(feature.position()) <= radius * radius
        }
        TerrainShape::Rectangle { .. } => feature.bounding_box().contains(point),
        TerrainShape::Polygon { vertices } => point_in_polygon(point, vertices),
    }
}

/// Does the segment `from → to` touch the feature's footprint?
///
/// A segment that starts or ends inside the feature counts as intersecting.
pub fn line_intersects_terrain(from: Point, to: Point, feature: &TerrainFeature) -> bool {
    if !BoundingBox::of_segment(from, to).overlaps(&feature.bounding_box()) {
        return false;
    }

    match feature.shape() {
        TerrainShape::Circle { radius } => {
            segment_intersects_circle(from, to, feature.position(), *radius)
        }
        TerrainShape::Rectangle { .. } => {
            let corners = feature.bounding_box().corners();
            segment_intersects_polygon(from, to, &corners)
        }
        TerrainShape::Polygon { vertices } => segment_intersects_polygon(from, to, vertices),
    }
}

/// Fraction along `from → to` where the segment first touches the feature
///
/// `Some(0.0)` when `from` starts inside, `None` when the segment misses.
pub fn segment_entry_fraction(from: Point, to: Point, feature: &TerrainFeature) -> Option<f32> {
    if !line_intersects_terrain(from, to, feature) {
        return None;
    }
    if point_in_terrain(from, feature) {
        return Some(0.0);
    }

    // Touching is monotone in the prefix length
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    for _ in 0..SEGMENT_ENTRY_STEPS {
        let mid = 0.5 * (lo + hi);
        if line_intersects_terrain(from, lerp_point(from, to, mid), feature) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Some(hi)
}

/// Distance from a point to the feature's footprint (0 inside)
pub fn distance_to_terrain(point: Point, feature: &TerrainFeature) -> f32 {
    match feature.shape() {
        TerrainShape::Circle { radius } => (point.distance(feature.position()) - radius).max(0.0),
        TerrainShape::Rectangle { .. } => {
            let bb = feature.bounding_box();
            // Project onto the rectangle; the projection is the point itself when inside
            let nearest = Point::new(
                point.x.clamp(bb.min_x, bb.max_x),
                point.y.clamp(bb.min_y, bb.max_y),
            );
            point.distance(nearest)
        }
        TerrainShape::Polygon { vertices } => {
            if point_in_polygon(point, vertices) {
                0.0
            } else {
                polyline_distance(point, vertices)
            }
        }
    }
}

/// Shortest distance between a segment and the feature's footprint
///
/// Zero when the segment already intersects. This is the swept-capsule
/// distance: a base of radius `r` moving along the segment clips the
/// feature exactly when this is below `r`.
pub fn segment_distance_to_terrain(from: Point, to: Point, feature: &TerrainFeature) -> f32 {
    if line_intersects_terrain(from, to, feature) {
        return 0.0;
    }

    match feature.shape() {
        TerrainShape::Circle { radius } => {
            (point_segment_distance(feature.position(), from, to) - radius).max(0.0)
        }
        TerrainShape::Rectangle { .. } => {
            let corners = feature.bounding_box().corners();
            segment_polyline_distance(from, to, &corners)
        }
        TerrainShape::Polygon { vertices } => segment_polyline_distance(from, to, vertices),
    }
}

/// Ray casting point-in-polygon test
///
/// Casts a ray from the point to the right and counts edge crossings.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = polygon.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }

        j = i;
    }

    inside
}

/// Sign of the turn a → b → c (positive = counter-clockwise)
pub fn orientation(a: Point, b: Point, c: Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Is `p` within the bounding box of segment `a-b`? (use only when collinear)
fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x <= a.x.max(b.x) + GEOMETRY_EPSILON
        && p.x >= a.x.min(b.x) - GEOMETRY_EPSILON
        && p.y <= a.y.max(b.y) + GEOMETRY_EPSILON
        && p.y >= a.y.min(b.y) - GEOMETRY_EPSILON
}

/// Do segments `a1-a2` and `b1-b2` share at least one point?
///
/// Proper crossings use the orientation test; touching and overlapping
/// collinear segments are caught by the degenerate case.
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    // Degenerate collinear touch
    (d1.abs() <= GEOMETRY_EPSILON && on_segment(b1, b2, a1))
        || (d2.abs() <= GEOMETRY_EPSILON && on_segment(b1, b2, a2))
        || (d3.abs() <= GEOMETRY_EPSILON && on_segment(a1, a2, b1))
        || (d4.abs() <= GEOMETRY_EPSILON && on_segment(a1, a2, b2))
}

pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= GEOMETRY_EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

pub fn segment_segment_distance(a1: Point, a2: Point, b1: Point, b2: Point) -> f32 {
    if segments_intersect(a1, a2, b1, b2) {
        return 0.0;
    }
    point_segment_distance(a1, b1, b2)
        .min(point_segment_distance(a2, b1, b2))
        .min(point_segment_distance(b1, a1, a2))
        .min(point_segment_distance(b2, a1, a2))
}

/// Point at fraction `t` along `a → b`
pub fn lerp_point(a: Point, b: Point, t: f32) -> Point {
    a + (b - a) * t
}

/// Line–circle test via the quadratic discriminant, clipped to the segment
fn segment_intersects_circle(from: Point, to: Point, center: Point, radius: f32) -> bool {
    let r = radius.max(0.0);
    let r2 = r * r;
    if from.distance_squared(center) <= r2 || to.distance_squared(center) <= r2 {
        return true;
    }

    let d = to - from;
    let f = from - center;
    let a = d.dot(d);
    if a <= GEOMETRY_EPSILON {
        return false;
    }
    let b = 2.0 * f.dot(d);
    let c = f.dot(f) - r2;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return false;
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);
    (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2)
}

/// Segment against a closed polygon (or its degenerate point/segment form)
fn segment_intersects_polygon(from: Point, to: Point, vertices: &[Point]) -> bool {
    match vertices.len() {
        0 => false,
        1 => point_segment_distance(vertices[0], from, to) <= GEOMETRY_EPSILON,
        2 => segments_intersect(from, to, vertices[0], vertices[1]),
        n => {
            if point_in_polygon(from, vertices) || point_in_polygon(to, vertices) {
                return true;
            }
            (0..n).any(|i| segments_intersect(from, to, vertices[i], vertices[(i + 1) % n]))
        }
    }
}

/// Distance from a point to the boundary of a closed polygon
fn polyline_distance(point: Point, vertices: &[Point]) -> f32 {
    match vertices.len() {
        0 => f32::INFINITY,
        1 => point.distance(vertices[0]),
        n => (0..n)
            .map(|i| point_segment_distance(point, vertices[i], vertices[(i + 1) % n]))
            .fold(f32::INFINITY, f32::min),
    }
}

/// Distance from a segment to the boundary of a closed polygon
fn segment_polyline_distance(from: Point, to: Point, vertices: &[Point]) -> f32 {
    match vertices.len() {
        0 => f32::INFINITY,
        1 => point_segment_distance(vertices[0], from, to),
        n => (0..n)
            .map(|i| segment_segment_distance(from, to, vertices[i], vertices[(i + 1) % n]))
            .fold(f32::INFINITY, f32::min),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{IdGenerator, TerrainId};
    use crate::terrain::feature::TerrainKind;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn block(w: f32, h: f32) -> TerrainFeature {
        TerrainFeature::container(&mut IdGenerator::new(), Point::ZERO, w, h)
    }

    fn triangle() -> TerrainFeature {
        TerrainFeature::custom_polygon(
            &mut IdGenerator::new(),
            vec![p(0.0, 0.0), p(4.0, 0.0), p(2.0, 4.0)],
        )
    }

    #[test]
    fn test_point_in_rectangle() {
        let rect = block(6.0, 3.0);
        assert!(point_in_terrain(p(0.0, 0.0), &rect));
        assert!(point_in_terrain(p(3.0, 1.5), &rect)); // corner counts
        assert!(!point_in_terrain(p(3.1, 0.0), &rect));
    }

    #[test]
    fn test_point_in_circle() {
        let woods = TerrainFeature::woods(&mut IdGenerator::new(), p(5.0, 5.0), 2.0);
        assert!(point_in_terrain(p(6.0, 6.0), &woods));
        assert!(!point_in_terrain(p(7.5, 5.0), &woods));
    }

    #[test]
    fn test_point_in_polygon_ray_cast() {
        let tri = triangle();
        assert!(point_in_terrain(p(2.0, 1.0), &tri));
        assert!(!point_in_terrain(p(0.5, 3.0), &tri));
    }

    #[test]
    fn test_line_through_rectangle() {
        let rect = block(6.0, 3.0);
        assert!(line_intersects_terrain(p(-10.0, 0.0), p(10.0, 0.0), &rect));
        assert!(!line_intersects_terrain(p(-10.0, 5.0), p(10.0, 5.0), &rect));
    }

    #[test]
    fn test_line_grazing_rectangle_edge_is_collinear_touch() {
        let rect = block(6.0, 3.0);
        assert!(line_intersects_terrain(p(-10.0, 1.5), p(10.0, 1.5), &rect));
    }

    #[test]
    fn test_segment_inside_rectangle_intersects() {
        let rect = block(6.0, 3.0);
        assert!(line_intersects_terrain(p(-1.0, 0.0), p(1.0, 0.0), &rect));
    }

    #[test]
    fn test_line_circle_discriminant() {
        let crater = TerrainFeature::crater(&mut IdGenerator::new(), p(0.0, 0.0), 2.0);
        assert!(line_intersects_terrain(p(-5.0, 1.0), p(5.0, 1.0), &crater));
        assert!(!line_intersects_terrain(p(-5.0, 2.5), p(5.0, 2.5), &crater));
        // Segment stops short of the circle
        assert!(!line_intersects_terrain(p(-10.0, 0.0), p(-3.0, 0.0), &crater));
    }

    #[test]
    fn test_line_polygon() {
        let tri = triangle();
        assert!(line_intersects_terrain(p(-1.0, 1.0), p(5.0, 1.0), &tri));
        assert!(!line_intersects_terrain(p(-1.0, 5.0), p(5.0, 5.0), &tri));
    }

    #[test]
    fn test_distance_to_rectangle_uses_projection() {
        let rect = block(6.0, 3.0);
        assert_eq!(distance_to_terrain(p(0.0, 0.0), &rect), 0.0);
        assert!((distance_to_terrain(p(5.0, 0.0), &rect) - 2.0).abs() < 1e-5);
        assert!((distance_to_terrain(p(6.0, 5.5), &rect) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_segment_distance_circle() {
        let crater = TerrainFeature::crater(&mut IdGenerator::new(), p(0.0, 0.0), 2.0);
        let d = segment_distance_to_terrain(p(-5.0, 3.0), p(5.0, 3.0), &crater);
        assert!((d - 1.0).abs() < 1e-5);
        assert_eq!(segment_distance_to_terrain(p(-5.0, 0.0), p(5.0, 0.0), &crater), 0.0);
    }

    #[test]
    fn test_segment_distance_rectangle() {
        let rect = block(6.0, 3.0);
        let d = segment_distance_to_terrain(p(-10.0, 2.5), p(10.0, 2.5), &rect);
        assert!((d - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_radius_circle_is_point_like() {
        let dot = TerrainFeature::new(
            TerrainId(0),
            TerrainKind::Custom,
            p(1.0, 1.0),
            TerrainShape::Circle { radius: 0.0 },
        );
        assert!(point_in_terrain(p(1.0, 1.0), &dot));
        assert!(!point_in_terrain(p(1.0, 1.1), &dot));
        assert!((distance_to_terrain(p(4.0, 5.0), &dot) - 5.0).abs() < 1e-5);
        assert!(line_intersects_terrain(p(0.0, 1.0), p(2.0, 1.0), &dot));
    }

    #[test]
    fn test_empty_polygon_is_inert() {
        let empty = TerrainFeature::new(
            TerrainId(0),
            TerrainKind::Custom,
            Point::ZERO,
            TerrainShape::Polygon { vertices: vec![] },
        );
        assert!(!point_in_terrain(Point::ZERO, &empty));
        assert!(!line_intersects_terrain(p(-1.0, 0.0), p(1.0, 0.0), &empty));
        assert!(distance_to_terrain(Point::ZERO, &empty).is_infinite());
    }

    #[test]
    fn test_two_vertex_polygon_acts_as_wall_segment() {
        let wall = TerrainFeature::new(
            TerrainId(0),
            TerrainKind::Custom,
            Point::ZERO,
            TerrainShape::Polygon {
                vertices: vec![p(0.0, -2.0), p(0.0, 2.0)],
            },
        );
        assert!(line_intersects_terrain(p(-1.0, 0.0), p(1.0, 0.0), &wall));
        assert!(!point_in_terrain(Point::ZERO, &wall));
    }

    #[test]
    fn test_segments_intersect_collinear_overlap() {
        assert!(segments_intersect(p(0.0, 0.0), p(2.0, 0.0), p(1.0, 0.0), p(3.0, 0.0)));
        assert!(!segments_intersect(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)));
    }

    #[test]
    fn test_segment_entry_fraction() {
        let mut ids = IdGenerator::new();
        let block = TerrainFeature::container(&mut ids, p(5.0, 0.0), 2.0, 2.0);
        let entry = segment_entry_fraction(p(0.0, 0.0), p(10.0, 0.0), &block).unwrap();
        assert!((entry - 0.4).abs() < 1e-4);
        assert_eq!(segment_entry_fraction(p(5.0, 0.0), p(10.0, 0.0), &block), Some(0.0));
        assert_eq!(segment_entry_fraction(p(0.0, 5.0), p(10.0, 5.0), &block), None);

        let pond = TerrainFeature::crater(&mut ids, p(-6.0, 0.0), 1.0);
        let entry = segment_entry_fraction(p(0.0, 0.0), p(-10.0, 0.0), &pond).unwrap();
        assert!((entry - 0.5).abs() < 1e-4);
    }
}
