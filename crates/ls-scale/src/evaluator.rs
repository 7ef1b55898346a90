use std::sync::atomic::{AtomicBool, Ordering};

use ls_core::{Error, IntensityProfile, ThermalExpansion};
use ls_edge::{EdgeMark, MarkPolarity, MaskEdges, detect_mask_edges};
use ls_morph::MorphOp;
use ls_segment::{BoundEstimate, HistogramAnalyzer, Segmenter};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{NominalSpec, ScaleEvalConfig};
use crate::line_mark::LineMarkRecord;
use crate::scale::ScaleAggregator;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub min_intensity: i32,
    pub max_intensity: i32,
    pub lower_bound: i32,
    pub upper_bound: i32,
    pub relative_span_percent: f64,
    pub cutoff: i64,
}

impl PipelineSummary {
    fn new(bounds: &BoundEstimate, segmenter: &Segmenter) -> Self {
        Self {
            min_intensity: bounds.min_intensity,
            max_intensity: bounds.max_intensity,
            lower_bound: bounds.lower_bound,
            upper_bound: bounds.upper_bound,
            relative_span_percent: bounds.relative_span_percent(),
            cutoff: segmenter.cutoff(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProfileStatus {
    Invalid {
        reason: String,
    },
    Evaluated {
        left_edges: usize,
        right_edges: usize,
        detected_marks: usize,
        /// Detected mark count differs from the expected line count.
        mismatch: bool,
        folded: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileDiagnostic {
    pub index: usize,
    #[serde(flatten)]
    pub status: ProfileStatus,
}

/// Sorted, thermally corrected edge positions of one profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeListing {
    pub profile: usize,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl EdgeListing {
    fn new(profile: usize, edges: &MaskEdges, thermal: &ThermalExpansion) -> Self {
        let correct = |edges: &[f64]| {
            let mut out: Vec<f64> = edges.iter().map(|&e| e + thermal.correction(e)).collect();
            out.sort_by(f64::total_cmp);
            out
        };
        Self {
            profile,
            left: correct(&edges.left),
            right: correct(&edges.right),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScaleResult {
    /// No profile produced the expected number of marks.
    NoMatchingPattern,
    Calibrated {
        scale_type: Option<MarkPolarity>,
        max_thermal_correction: f64,
        records: Vec<LineMarkRecord>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub summary: PipelineSummary,
    pub thermal: ThermalExpansion,
    pub expected_line_marks: usize,
    pub reference_line: usize,
    pub profiles: Vec<ProfileDiagnostic>,
    pub invalid_profiles: usize,
    pub mismatched_profiles: usize,
    pub sample_size: usize,
    /// Evaluation stopped early; folded samples are complete.
    pub cancelled: bool,
    pub result: ScaleResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgeListing>,
}

/// Edges and paired marks of one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileMarks {
    pub edges: MaskEdges,
    pub marks: Vec<EdgeMark>,
}

/// Per-profile stages sharing one bound estimate: segment, filter, detect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePipeline {
    segmenter: Segmenter,
    filter: MorphOp,
}

impl ProfilePipeline {
    pub fn new(threshold_fraction: f64, bounds: &BoundEstimate, filter_parameter: i32) -> Self {
        Self {
            segmenter: Segmenter::new(threshold_fraction, bounds),
            filter: MorphOp::from_parameter(filter_parameter),
        }
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn filter(&self) -> MorphOp {
        self.filter
    }

    pub fn run(&self, profile: &IntensityProfile) -> Result<ProfileMarks, Error> {
        profile.validate()?;
        let mask = self.segmenter.segment(profile.z());
        let mask = self.filter.apply(&mask);
        let edges = detect_mask_edges(&mask, profile.x())?;
        let marks = edges.marks();
        Ok(ProfileMarks { edges, marks })
    }
}

#[derive(Debug, Clone)]
pub struct ScaleEvaluator {
    cfg: ScaleEvalConfig,
}

impl ScaleEvaluator {
    pub fn new(cfg: ScaleEvalConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ScaleEvalConfig {
        &self.cfg
    }

    /// Empty scale with nominal positions assigned from the config.
    pub fn new_scale(&self) -> ScaleAggregator {
        self.build_scale(self.cfg.reference_index())
    }

    fn build_scale(&self, reference: usize) -> ScaleAggregator {
        let mut scale = ScaleAggregator::new(self.cfg.expected_line_marks);
        match &self.cfg.nominal {
            NominalSpec::Division(division) if self.cfg.nominal_from_reference => {
                scale.set_equidistant_from_reference(*division, reference)
            }
            NominalSpec::Division(division) => scale.set_equidistant(*division),
            NominalSpec::Positions(positions) => {
                if let Err(err) = scale.set_nominal_positions(positions) {
                    tracing::warn!("ignoring nominal positions: {err}");
                }
            }
        }
        scale
    }

    /// Plateau bounds over the intensities of every valid profile.
    pub fn estimate_bounds(&self, profiles: &[IntensityProfile]) -> Result<BoundEstimate, Error> {
        let field: Vec<i32> = profiles
            .iter()
            .filter(|p| p.is_valid())
            .flat_map(|p| p.z().iter().copied())
            .collect();
        if field.is_empty() {
            return Err(Error::NoValidProfiles);
        }
        Ok(HistogramAnalyzer::new(&field)?.bounds())
    }

    pub fn pipeline(&self, bounds: &BoundEstimate) -> ProfilePipeline {
        ProfilePipeline::new(self.cfg.threshold(), bounds, self.cfg.filter_parameter)
    }

    pub fn evaluate(
        &self,
        profiles: &[IntensityProfile],
        sample_temperature: f64,
    ) -> Result<EvaluationReport, Error> {
        self.evaluate_with_cancel(profiles, sample_temperature, &AtomicBool::new(false))
    }

    /// Like [`ScaleEvaluator::evaluate`], checking `cancel` before every chunk
    /// of `parallel_chunk` profiles.
    pub fn evaluate_with_cancel(
        &self,
        profiles: &[IntensityProfile],
        sample_temperature: f64,
        cancel: &AtomicBool,
    ) -> Result<EvaluationReport, Error> {
        let bounds = self.estimate_bounds(profiles)?;
        let pipeline = self.pipeline(&bounds);
        let summary = PipelineSummary::new(&bounds, pipeline.segmenter());
        tracing::info!(
            "intensity {}..={}, plateaus {} / {} ({:.1} % of range), cutoff {}",
            summary.min_intensity,
            summary.max_intensity,
            summary.lower_bound,
            summary.upper_bound,
            summary.relative_span_percent,
            summary.cutoff
        );

        let reference = self.cfg.reference_index();
        let mut scale = self.build_scale(reference);
        let thermal = ThermalExpansion::new(self.cfg.thermal_expansion_alpha, sample_temperature);
        let chunk_len = self.cfg.parallel_chunk.max(1);

        let mut diagnostics = Vec::with_capacity(profiles.len());
        let mut edges = Vec::new();
        let mut invalid_profiles = 0usize;
        let mut mismatched_profiles = 0usize;
        let mut cancelled = false;

        for (chunk_i, chunk) in profiles.chunks(chunk_len).enumerate() {
            if cancel.load(Ordering::Relaxed) {
                tracing::warn!(
                    "evaluation cancelled after {} of {} profiles",
                    chunk_i * chunk_len,
                    profiles.len()
                );
                cancelled = true;
                break;
            }

            let outcomes: Vec<Result<ProfileMarks, Error>> =
                chunk.par_iter().map(|p| pipeline.run(p)).collect();

            for (offset, outcome) in outcomes.into_iter().enumerate() {
                let index = chunk_i * chunk_len + offset;
                let status = match outcome {
                    Err(err) => {
                        tracing::warn!("profile {index} skipped: {err}");
                        invalid_profiles += 1;
                        ProfileStatus::Invalid {
                            reason: err.to_string(),
                        }
                    }
                    Ok(found) => {
                        let outcome = scale.update_sample(&found.marks, reference);
                        let mismatch = found.marks.len() != scale.expected_line_marks();
                        if mismatch {
                            mismatched_profiles += 1;
                        }
                        tracing::debug!(
                            "profile {index}: {} marks (L {} / R {}), {outcome:?}",
                            found.marks.len(),
                            found.edges.left.len(),
                            found.edges.right.len()
                        );
                        if self.cfg.collect_edges {
                            edges.push(EdgeListing::new(index, &found.edges, &thermal));
                        }
                        ProfileStatus::Evaluated {
                            left_edges: found.edges.left.len(),
                            right_edges: found.edges.right.len(),
                            detected_marks: found.marks.len(),
                            mismatch,
                            folded: outcome.is_folded(),
                        }
                    }
                };
                diagnostics.push(ProfileDiagnostic { index, status });
            }
        }

        let sample_size = scale.sample_size();
        tracing::info!(
            "{sample_size} of {} profiles folded ({mismatched_profiles} mismatched, {invalid_profiles} invalid)",
            profiles.len()
        );

        let result = if sample_size == 0 {
            ScaleResult::NoMatchingPattern
        } else {
            ScaleResult::Calibrated {
                scale_type: scale.scale_type(),
                max_thermal_correction: scale.max_thermal_correction(&thermal),
                records: scale.records(&thermal),
            }
        };

        Ok(EvaluationReport {
            summary,
            thermal,
            expected_line_marks: scale.expected_line_marks(),
            reference_line: reference,
            profiles: diagnostics,
            invalid_profiles,
            mismatched_profiles,
            sample_size,
            cancelled,
            result,
            edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use approx::assert_relative_eq;
    use ls_core::{Error, IntensityProfile};

    use crate::config::{NominalSpec, ScaleEvalConfig};
    use crate::evaluator::{ProfileStatus, ScaleEvaluator, ScaleResult};

    /// `marks` bright bands of `width` samples every `pitch` samples from `first`.
    fn stripes(
        marks: usize,
        first: usize,
        pitch: usize,
        width: usize,
        len: usize,
    ) -> IntensityProfile {
        let x = (0..len).map(|i| i as f64 * 0.5).collect();
        let z = (0..len)
            .map(|i| {
                let on = i >= first && (i - first) % pitch < width && (i - first) / pitch < marks;
                if on { 200 } else { 20 }
            })
            .collect();
        IntensityProfile::new(x, z)
    }

    fn three_line_config() -> ScaleEvalConfig {
        ScaleEvalConfig {
            expected_line_marks: 3,
            nominal: NominalSpec::Division(5.0),
            ..ScaleEvalConfig::default()
        }
    }

    #[test]
    fn evaluates_clean_scale() {
        let profiles: Vec<_> = (0..6).map(|k| stripes(3, 5 + k, 10, 4, 40)).collect();
        let report = ScaleEvaluator::new(three_line_config())
            .evaluate(&profiles, 20.0)
            .expect("valid profiles");

        assert_eq!(report.summary.lower_bound, 20);
        // Saturated bright level is never a bound; the empty upper half
        // reports its first level, 20 + 180 / 2.
        assert_eq!(report.summary.upper_bound, 110);
        assert_eq!(report.summary.cutoff, 45);
        assert_eq!(report.sample_size, 6);
        assert_eq!(report.mismatched_profiles, 0);

        let ScaleResult::Calibrated { records, .. } = report.result else {
            panic!("expected calibrated result");
        };
        assert_eq!(records.len(), 3);
        for rec in &records {
            assert_relative_eq!(rec.deviation, 0.0, epsilon = 1e-12);
            assert_relative_eq!(rec.mean_width, 2.0, epsilon = 1e-12);
            assert_eq!(rec.sample_size, 6);
        }
    }

    #[test]
    fn invalid_profiles_are_counted_and_skipped() {
        let mut profiles = vec![stripes(3, 5, 10, 4, 40)];
        profiles.push(IntensityProfile::new(vec![0.0, 1.0], vec![20]));
        profiles.push(IntensityProfile::new(vec![0.0], vec![20]));

        let report = ScaleEvaluator::new(three_line_config())
            .evaluate(&profiles, 20.0)
            .expect("one valid profile");
        assert_eq!(report.invalid_profiles, 2);
        assert_eq!(report.sample_size, 1);
        assert!(matches!(
            report.profiles[1].status,
            ProfileStatus::Invalid { .. }
        ));
    }

    #[test]
    fn no_valid_profile_is_an_error() {
        let profiles = vec![IntensityProfile::new(vec![0.0], vec![1])];
        let err = ScaleEvaluator::new(three_line_config()).evaluate(&profiles, 20.0);
        assert_eq!(err, Err(Error::NoValidProfiles));
    }

    #[test]
    fn spikes_cause_mismatch_unless_opened() {
        let mut noisy = stripes(3, 5, 10, 4, 40);
        let mut z = noisy.z().to_vec();
        z[35] = 200;
        noisy = IntensityProfile::new(noisy.x().to_vec(), z);
        let profiles = vec![stripes(3, 5, 10, 4, 40), noisy];

        let raw = ScaleEvaluator::new(three_line_config())
            .evaluate(&profiles, 20.0)
            .expect("valid profiles");
        assert_eq!(raw.mismatched_profiles, 1);
        assert_eq!(raw.sample_size, 1);
        assert!(matches!(
            raw.profiles[1].status,
            ProfileStatus::Evaluated {
                detected_marks: 4,
                mismatch: true,
                folded: false,
                ..
            }
        ));

        let cfg = ScaleEvalConfig {
            filter_parameter: 1,
            ..three_line_config()
        };
        let opened = ScaleEvaluator::new(cfg)
            .evaluate(&profiles, 20.0)
            .expect("valid profiles");
        assert_eq!(opened.mismatched_profiles, 0);
        assert_eq!(opened.sample_size, 2);
    }

    #[test]
    fn wrong_expected_count_reports_no_pattern() {
        let cfg = ScaleEvalConfig {
            expected_line_marks: 5,
            ..three_line_config()
        };
        let profiles = vec![stripes(3, 5, 10, 4, 40); 3];
        let report = ScaleEvaluator::new(cfg)
            .evaluate(&profiles, 20.0)
            .expect("valid profiles");
        assert_eq!(report.result, ScaleResult::NoMatchingPattern);
        assert_eq!(report.mismatched_profiles, 3);
        assert_eq!(report.sample_size, 0);
    }

    #[test]
    fn chunking_does_not_change_results() {
        let profiles: Vec<_> = (0..9)
            .map(|k| stripes(3, 3 + k % 4, 10 + k % 2, 4, 48))
            .collect();

        let run = |chunk| {
            let cfg = ScaleEvalConfig {
                parallel_chunk: chunk,
                collect_edges: true,
                thermal_expansion_alpha: 8e-6,
                ..three_line_config()
            };
            ScaleEvaluator::new(cfg)
                .evaluate(&profiles, 23.5)
                .expect("valid profiles")
        };

        assert_eq!(run(1), run(4));
        assert_eq!(run(1), run(100));
    }

    #[test]
    fn cancelled_before_start_folds_nothing() {
        let profiles = vec![stripes(3, 5, 10, 4, 40); 4];
        let report = ScaleEvaluator::new(three_line_config())
            .evaluate_with_cancel(&profiles, 20.0, &AtomicBool::new(true))
            .expect("valid profiles");
        assert!(report.cancelled);
        assert!(report.profiles.is_empty());
        assert_eq!(report.result, ScaleResult::NoMatchingPattern);
    }

    #[test]
    fn edge_listing_is_sorted_and_corrected() {
        let cfg = ScaleEvalConfig {
            collect_edges: true,
            thermal_expansion_alpha: 1e-3,
            ..three_line_config()
        };
        let profiles = vec![stripes(3, 5, 10, 4, 40)];
        let report = ScaleEvaluator::new(cfg)
            .evaluate(&profiles, 21.0)
            .expect("valid profiles");

        let listing = &report.edges[0];
        assert_eq!(listing.profile, 0);
        assert_eq!(listing.left.len(), 3);
        assert!(listing.left.windows(2).all(|w| w[0] <= w[1]));
        // Left edge of the first band sits at x = 2.25.
        assert_relative_eq!(listing.left[0], 2.25 * (1.0 - 1e-3), max_relative = 1e-12);
    }

    #[test]
    fn reference_line_zeroes_its_own_deviation() {
        let cfg = ScaleEvalConfig {
            reference_line: 2,
            nominal_from_reference: true,
            ..three_line_config()
        };
        let profiles: Vec<_> = (0..4).map(|k| stripes(3, 2 + k, 10 + k % 2, 4, 48)).collect();
        let report = ScaleEvaluator::new(cfg)
            .evaluate(&profiles, 20.0)
            .expect("valid profiles");
        assert_eq!(report.reference_line, 2);

        let ScaleResult::Calibrated { records, .. } = report.result else {
            panic!("expected calibrated result");
        };
        assert_eq!(records[2].nominal_position, 0.0);
        assert_eq!(records[2].deviation, 0.0);
        assert_eq!(records[0].nominal_position, -10.0);
    }
}
