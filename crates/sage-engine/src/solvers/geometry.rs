//! Small plane-geometry toolkit shared by the logical and spatial solvers.

/// Tolerance for floating-point comparisons
const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: &Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Rotate about the origin; positive degrees turn counter-clockwise.
    pub fn rotate(&self, degrees: f64) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let x = self.x * cos - self.y * sin;
        let y = self.x * sin + self.y * cos;
        // Snap float noise so quarter turns land on exact coordinates
        Point::new(snap(x), snap(y))
    }
}

fn snap(v: f64) -> f64 {
    let rounded = v.round();
    if (v - rounded).abs() < 1e-9 {
        // Avoid printing "-0"
        rounded + 0.0
    } else {
        v
    }
}

/// Corners of the unit square: A top-left, B top-right, C bottom-right,
/// D bottom-left.
pub const UNIT_SQUARE: [Point; 4] = [
    Point::new(0.0, 1.0),
    Point::new(1.0, 1.0),
    Point::new(1.0, 0.0),
    Point::new(0.0, 0.0),
];

/// Result of the equidistant-point constraint system
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Found(Point),
    Unsatisfiable,
}

/// Find P with |PA| = |PB| = |PC| and |PD| = ratio * |PA|, inside the
/// axis-aligned box `[lo, hi]²`.
///
/// The two equidistance constraints are perpendicular bisectors, so P is the
/// unique solution of a 2x2 linear system (the circumcentre of ABC). The
/// remaining constraints are then checked at that point. Collinear A, B, C
/// have no circumcentre.
pub fn equidistant_with_ratio(
    a: Point,
    b: Point,
    c: Point,
    d: Point,
    ratio: f64,
    (lo, hi): (f64, f64),
) -> Placement {
    // 2(B-A)·P = |B|² - |A|²
    let (a1, b1) = (2.0 * (b.x - a.x), 2.0 * (b.y - a.y));
    let c1 = (b.x.powi(2) + b.y.powi(2)) - (a.x.powi(2) + a.y.powi(2));
    let (a2, b2) = (2.0 * (c.x - b.x), 2.0 * (c.y - b.y));
    let c2 = (c.x.powi(2) + c.y.powi(2)) - (b.x.powi(2) + b.y.powi(2));

    let det = a1 * b2 - a2 * b1;
    if det.abs() < EPS {
        return Placement::Unsatisfiable;
    }
    let p = Point::new((c1 * b2 - c2 * b1) / det, (a1 * c2 - a2 * c1) / det);

    let in_bounds = (lo - EPS..=hi + EPS).contains(&p.x) && (lo - EPS..=hi + EPS).contains(&p.y);
    let ratio_holds = (p.distance_sq(&d) - ratio * ratio * p.distance_sq(&a)).abs() < EPS;

    if in_bounds && ratio_holds {
        Placement::Found(p)
    } else {
        Placement::Unsatisfiable
    }
}

/// Strict triangle inequality
pub fn can_form_triangle(sides: [u64; 3]) -> bool {
    let mut s = sides;
    s.sort_unstable();
    // s[2] >= s[1], so the subtraction cannot underflow
    s[0] > s[2] - s[1]
}

/// Side count of a regular polygon named in text
pub fn polygon_sides(text: &str) -> Option<u32> {
    const NAMES: [(&str, u32); 8] = [
        ("equilateral triangle", 3),
        ("triangle", 3),
        ("square", 4),
        ("pentagon", 5),
        ("hexagon", 6),
        ("heptagon", 7),
        ("octagon", 8),
        ("decagon", 10),
    ];
    NAMES
        .iter()
        .find(|(name, _)| text.contains(name))
        .map(|(_, sides)| *sides)
}

/// Format a coordinate without a trailing ".0" for whole numbers
pub fn format_coord(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}
