//! Stage-micrometer evaluation from scanned intensity profiles.
//!
//! Pipeline per profile set:
//! - Estimate dark/bright plateaus once over the whole field.
//! - Segment each profile at a fraction of the plateau separation.
//! - Optionally open or close the binary mask.
//! - Pair edge transitions into line marks and fold them into a
//!   [`ScaleAggregator`], relative to a reference mark.
//!
//! Profiles run in parallel in chunks of [`ScaleEvalConfig::parallel_chunk`];
//! folding is sequential in input order, so results do not depend on chunking.

mod config;
mod evaluator;
mod line_mark;
mod scale;

pub use config::{NominalSpec, ScaleEvalConfig};
pub use evaluator::{
    EdgeListing, EvaluationReport, PipelineSummary, ProfileDiagnostic, ProfileMarks,
    ProfilePipeline, ProfileStatus, ScaleEvaluator, ScaleResult,
};
pub use line_mark::{LineMarkAggregator, LineMarkRecord};
pub use scale::{RejectReason, SampleOutcome, ScaleAggregator, clamp_reference_index};
