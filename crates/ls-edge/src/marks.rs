use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Polarity of a mark, from the order of its edges in scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkPolarity {
    /// Bright band: left edge before right edge.
    Reflective,
    /// Dark band: left edge after right edge.
    Transparent,
    /// Coincident edges.
    NoMark,
}

/// A line mark bounded by one left and one right edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeMark {
    pub left_edge: f64,
    pub right_edge: f64,
}

impl EdgeMark {
    pub fn new(left_edge: f64, right_edge: f64) -> Self {
        Self {
            left_edge,
            right_edge,
        }
    }

    pub fn center(&self) -> f64 {
        0.5 * (self.left_edge + self.right_edge)
    }

    pub fn width(&self) -> f64 {
        (self.left_edge - self.right_edge).abs()
    }

    pub fn polarity(&self) -> MarkPolarity {
        match self.left_edge.partial_cmp(&self.right_edge) {
            Some(Ordering::Less) => MarkPolarity::Reflective,
            Some(Ordering::Greater) => MarkPolarity::Transparent,
            _ => MarkPolarity::NoMark,
        }
    }

    pub fn cmp_center(&self, other: &EdgeMark) -> Ordering {
        self.center().total_cmp(&other.center())
    }
}

pub fn sort_by_center(marks: &mut [EdgeMark]) {
    marks.sort_by(EdgeMark::cmp_center);
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use crate::marks::{EdgeMark, MarkPolarity, sort_by_center};

    #[test]
    fn polarity_follows_edge_order() {
        assert_eq!(EdgeMark::new(1.0, 2.0).polarity(), MarkPolarity::Reflective);
        assert_eq!(EdgeMark::new(2.0, 1.0).polarity(), MarkPolarity::Transparent);
        assert_eq!(EdgeMark::new(1.5, 1.5).polarity(), MarkPolarity::NoMark);
    }

    #[test]
    fn width_is_unsigned() {
        let m = EdgeMark::new(7.5, 4.5);
        assert_eq!(m.width(), 3.0);
        assert_eq!(m.center(), 6.0);
    }

    #[test]
    fn marks_compare_by_center() {
        let a = EdgeMark::new(0.0, 4.0);
        let b = EdgeMark::new(3.0, 1.0);
        assert_eq!(a.cmp_center(&b), Ordering::Equal);
        // Same center, different edges: ordered together but not equal.
        assert_ne!(a, b);

        let mut marks = [EdgeMark::new(9.0, 11.0), a, EdgeMark::new(-3.0, -1.0)];
        sort_by_center(&mut marks);
        assert_eq!(marks[0].center(), -2.0);
        assert_eq!(marks[2].center(), 10.0);
    }
}
