//! Bound estimation and binarization of brightness profiles.
//!
//! [`HistogramAnalyzer`] bins integer intensities over `[min, max]` and takes
//! the most populated level of the lower and upper half of that range as the
//! dark and bright plateaus. [`Segmenter`] turns a profile into a `{0, 1}`
//! mask with a cutoff derived from the plateau separation.

pub mod histogram;
pub mod threshold;

pub use histogram::{BoundEstimate, HistogramAnalyzer, estimate_bounds};
pub use threshold::{Segmenter, segment};
