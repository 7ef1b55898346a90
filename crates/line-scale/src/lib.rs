//! Umbrella crate for the `line-scale` workspace.
//!
//! Re-exports the profile model, segmentation, binary morphology, edge
//! detection and scale aggregation crates under one name.

pub use ls_core::*;
pub use ls_edge::*;
pub use ls_morph::*;
pub use ls_scale::*;
pub use ls_segment::*;
