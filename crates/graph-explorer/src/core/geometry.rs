//! Plane geometry shared by the store, the layout engine and the model
//!
//! Positions are node centers in viewport pixels, with the origin at the
//! top-left corner and `y` growing downwards.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A point or displacement in the plane
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Scale to at most `max` length, keeping the direction
    pub fn capped(self, max: f64) -> Self {
        let len = self.length();
        if len > max && len > 0.0 {
            self * (max / len)
        } else {
            self
        }
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Width and height of a node's visual element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The visible client area a layout pass must stay inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Non-negative, finite dimensions
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }

    /// Move a node center so its bounding box lies inside the viewport.
    ///
    /// The box's top-left edge is limited to `[0, extent - size]` on each
    /// axis. When the node is larger than the viewport the upper bound wins
    /// and the box hangs off the leading edge.
    pub fn clamp_center(&self, center: Point, size: Size) -> Point {
        Point::new(
            clamp_axis(center.x, size.width, self.width),
            clamp_axis(center.y, size.height, self.height),
        )
    }

    /// True if the bounding box around `center` lies fully inside,
    /// up to floating-point rounding
    pub fn contains_box(&self, center: Point, size: Size) -> bool {
        const EPSILON: f64 = 1e-9;
        let half_w = size.width / 2.0;
        let half_h = size.height / 2.0;
        center.x - half_w >= -EPSILON
            && center.y - half_h >= -EPSILON
            && center.x + half_w <= self.width + EPSILON
            && center.y + half_h <= self.height + EPSILON
    }
}

fn clamp_axis(center: f64, extent: f64, bound: f64) -> f64 {
    let radius = extent / 2.0;
    let leading_edge = limit(0.0, center - radius, bound - extent);
    leading_edge + radius
}

/// Limits value to [min, max], so that min <= value <= max.
///
/// If `max < min`, `max` is returned.
pub fn limit(min: f64, value: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);
        assert_eq!(b - a, Point::new(3.0, 4.0));
        assert_eq!(a + b, Point::new(5.0, 8.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0));
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.dot(b), 16.0);
    }

    #[test]
    fn test_capped() {
        let p = Point::new(30.0, 40.0).capped(5.0);
        assert!((p.length() - 5.0).abs() < 1e-9);
        assert!((p.x - 3.0).abs() < 1e-9);

        let short = Point::new(1.0, 0.0);
        assert_eq!(short.capped(5.0), short);
        assert_eq!(Point::ORIGIN.capped(0.0), Point::ORIGIN);
    }

    #[test]
    fn test_limit() {
        assert_eq!(limit(0.0, -5.0, 10.0), 0.0);
        assert_eq!(limit(0.0, 5.0, 10.0), 5.0);
        assert_eq!(limit(0.0, 15.0, 10.0), 10.0);
        // Inverted range: the upper bound wins
        assert_eq!(limit(0.0, 5.0, -3.0), -3.0);
    }

    #[test]
    fn test_clamp_center_inside_is_unchanged() {
        let viewport = Viewport::new(200.0, 100.0);
        let size = Size::new(20.0, 10.0);
        let p = Point::new(50.0, 50.0);
        assert_eq!(viewport.clamp_center(p, size), p);
        assert!(viewport.contains_box(p, size));
    }

    #[test]
    fn test_clamp_center_pulls_box_inside() {
        let viewport = Viewport::new(200.0, 100.0);
        let size = Size::new(20.0, 10.0);

        let clamped = viewport.clamp_center(Point::new(-40.0, 500.0), size);
        assert_eq!(clamped, Point::new(10.0, 95.0));
        assert!(viewport.contains_box(clamped, size));

        let clamped = viewport.clamp_center(Point::new(300.0, 2.0), size);
        assert_eq!(clamped, Point::new(190.0, 5.0));
    }

    #[test]
    fn test_clamp_zero_size() {
        let viewport = Viewport::new(200.0, 200.0);
        let clamped = viewport.clamp_center(Point::new(-1.0, 201.0), Size::default());
        assert_eq!(clamped, Point::new(0.0, 200.0));
    }

    #[test]
    fn test_viewport_validity() {
        assert!(Viewport::new(0.0, 0.0).is_valid());
        assert!(!Viewport::new(-1.0, 10.0).is_valid());
        assert!(!Viewport::new(f64::NAN, 10.0).is_valid());
    }
}
