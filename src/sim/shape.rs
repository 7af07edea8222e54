//! Planar shapes for threat silhouettes, map bounds and the viewport
//!
//! Everything here is a pure function of immutable geometry plus a query
//! point. Silhouettes are stored in local space (relative to the owning
//! entity's position).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Build from two corners (order does not matter)
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest rectangle enclosing all points (None for an empty slice)
    pub fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Self { min, max })
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// True if the rectangle has no area
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Inclusive point containment
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Nearest point inside the rectangle (the point itself if contained)
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.max(self.min.x).min(self.max.x),
            p.y.max(self.min.y).min(self.max.y),
        )
    }

    /// Inclusive overlap test (touching edges count)
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn translate(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

/// Shape used for precise distance tests against a threat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Silhouette {
    /// Closed polygon (implicitly closed). Fewer than 3 vertices degrade to
    /// a point or segment.
    Outline(Vec<Vec2>),
    /// Box fallback when no outline is available
    Box { half_extents: Vec2 },
}

impl Silhouette {
    /// Use the outline when it describes a polygon, otherwise fall back to a box
    pub fn from_outline(points: Option<&[Vec2]>, half_extents: Vec2) -> Self {
        match points {
            Some(points) if points.len() >= 3 => Silhouette::Outline(points.to_vec()),
            _ => Silhouette::Box {
                half_extents: half_extents.abs(),
            },
        }
    }

    /// Bounding rectangle in local space
    pub fn local_bounds(&self) -> Aabb {
        match self {
            Silhouette::Outline(points) => {
                Aabb::enclosing(points).unwrap_or(Aabb::from_center(Vec2::ZERO, Vec2::ZERO))
            }
            Silhouette::Box { half_extents } => Aabb::from_center(Vec2::ZERO, *half_extents),
        }
    }

    /// Closest point of the filled shape to `p` (both in local space)
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        match self {
            Silhouette::Box { half_extents } => {
                Aabb::from_center(Vec2::ZERO, *half_extents).clamp_point(p)
            }
            Silhouette::Outline(points) => {
                // An empty outline collapses to the entity's origin
                let Some(&first) = points.first() else {
                    return Vec2::ZERO;
                };
                if polygon_contains(points, p) {
                    return p;
                }
                let mut best = first;
                let mut best_dist_sq = f32::MAX;
                for (i, a) in points.iter().enumerate() {
                    let b = points[(i + 1) % points.len()];
                    let candidate = closest_point_on_segment(p, *a, b);
                    let dist_sq = (p - candidate).length_squared();
                    if dist_sq < best_dist_sq {
                        best_dist_sq = dist_sq;
                        best = candidate;
                    }
                }
                best
            }
        }
    }

    /// Distance from `p` to the filled shape (0 when inside)
    pub fn distance_to(&self, p: Vec2) -> f32 {
        (p - self.closest_point(p)).length()
    }
}

/// Closest point on segment `a..b` to `p`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq < 1e-8 {
        return a; // Degenerate segment
    }
    let t = ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    a + seg * t
}

/// Even-odd point-in-polygon test
pub fn polygon_contains(points: &[Vec2], p: Vec2) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pj.x + (p.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(-1.0, 0.0),
        ]
    }

    #[test]
    fn test_aabb_new_orders_corners() {
        let r = Aabb::new(Vec2::new(5.0, -1.0), Vec2::new(-5.0, 1.0));
        assert_eq!(r.min, Vec2::new(-5.0, -1.0));
        assert_eq!(r.max, Vec2::new(5.0, 1.0));
        assert!((r.width() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_aabb_clamp_and_contains() {
        let r = Aabb::from_center(Vec2::ZERO, Vec2::new(2.0, 1.0));
        assert!(r.contains(Vec2::new(2.0, 1.0)));
        assert!(!r.contains(Vec2::new(2.1, 0.0)));
        assert_eq!(r.clamp_point(Vec2::new(10.0, -10.0)), Vec2::new(2.0, -1.0));
        assert_eq!(r.clamp_point(Vec2::new(0.5, 0.5)), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_aabb_intersects() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::ONE);
        let b = Aabb::from_center(Vec2::new(2.0, 0.0), Vec2::ONE);
        let c = Aabb::from_center(Vec2::new(3.5, 0.0), Vec2::ONE);
        assert!(a.intersects(&b)); // Touching
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_polygon_distance_inside_is_zero() {
        let s = Silhouette::Outline(diamond());
        assert_eq!(s.distance_to(Vec2::new(0.1, 0.1)), 0.0);
    }

    #[test]
    fn test_polygon_distance_outside() {
        let s = Silhouette::Outline(diamond());
        // Straight out from the right vertex
        assert!((s.distance_to(Vec2::new(3.0, 0.0)) - 2.0).abs() < 1e-5);
        // Perpendicular to the upper-right edge
        let d = s.distance_to(Vec2::new(1.0, 1.0));
        assert!((d - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_outline_fallback_to_box() {
        let pts = [Vec2::ZERO, Vec2::X];
        let s = Silhouette::from_outline(Some(&pts), Vec2::new(0.5, 1.0));
        assert!(matches!(s, Silhouette::Box { .. }));
        let s = Silhouette::from_outline(None, Vec2::new(0.5, 1.0));
        assert!((s.distance_to(Vec2::new(2.5, 0.0)) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_outlines_do_not_panic() {
        let empty = Silhouette::Outline(vec![]);
        assert!((empty.distance_to(Vec2::ONE) - std::f32::consts::SQRT_2).abs() < 1e-5);
        assert_eq!(empty.local_bounds(), Aabb::from_center(Vec2::ZERO, Vec2::ZERO));

        let point = Silhouette::Outline(vec![Vec2::new(1.0, 0.0)]);
        assert!((point.distance_to(Vec2::new(4.0, 0.0)) - 3.0).abs() < 1e-5);

        let segment = Silhouette::Outline(vec![Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)]);
        assert!((segment.distance_to(Vec2::new(0.5, 2.0)) - 2.0).abs() < 1e-5);
        assert_eq!(segment.distance_to(Vec2::new(0.5, 0.0)), 0.0);
    }

    #[test]
    fn test_local_bounds_of_outline() {
        let s = Silhouette::Outline(diamond());
        let b = s.local_bounds();
        assert_eq!(b.min, Vec2::new(-1.0, -1.0));
        assert_eq!(b.max, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_degenerate_segment() {
        let a = Vec2::new(1.0, 1.0);
        assert_eq!(closest_point_on_segment(Vec2::ZERO, a, a), a);
    }
}
