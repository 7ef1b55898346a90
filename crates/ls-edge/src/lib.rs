//! Edge and line-mark extraction from binary profile masks.
//!
//! Coordinates come from the profile's own position array: a transition
//! between samples `i - 1` and `i` is placed at `(x[i - 1] + x[i]) / 2`.
//!
//! A `0 -> 1` step is a left edge and a `1 -> 0` step a right edge. Marks pair
//! the i-th left edge with the i-th right edge; a mask with unequal edge
//! counts yields no marks, which downstream aggregation treats as a rejected
//! sample.

pub mod edge1d;
pub mod marks;

pub use edge1d::{
    EdgeKind, MaskEdge, MaskEdges, detect_marks, detect_mask_edges, scan_transitions,
};
pub use marks::{EdgeMark, MarkPolarity, sort_by_center};
