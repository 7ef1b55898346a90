use ls_core::{Error, ThermalExpansion};
use ls_edge::{EdgeMark, MarkPolarity};
use serde::Serialize;

use crate::line_mark::{LineMarkAggregator, LineMarkRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// The profile produced a different number of marks than the scale has.
    CountMismatch { detected: usize, expected: usize },
    ReferenceOutOfRange { reference: usize, expected: usize },
    /// The scale has no line marks to update.
    EmptyScale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SampleOutcome {
    Folded,
    Rejected(RejectReason),
}

impl SampleOutcome {
    pub fn is_folded(&self) -> bool {
        matches!(self, Self::Folded)
    }
}

/// Fixed set of line marks, updated one profile at a time.
///
/// Every update either folds a mark into every tag or into none.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleAggregator {
    marks: Vec<LineMarkAggregator>,
    rejected_samples: usize,
}

impl ScaleAggregator {
    pub fn new(expected_line_marks: usize) -> Self {
        Self {
            marks: (0..expected_line_marks).map(LineMarkAggregator::new).collect(),
            rejected_samples: 0,
        }
    }

    pub fn expected_line_marks(&self) -> usize {
        self.marks.len()
    }

    pub fn line_marks(&self) -> &[LineMarkAggregator] {
        &self.marks
    }

    pub fn line_mark(&self, tag: usize) -> Option<&LineMarkAggregator> {
        self.marks.get(tag)
    }

    /// Irregular scale: one nominal position per tag.
    ///
    /// A list of the wrong length leaves every nominal position unchanged.
    pub fn set_nominal_positions(&mut self, nominals: &[f64]) -> Result<(), Error> {
        if nominals.len() != self.marks.len() {
            return Err(Error::NominalCountMismatch {
                expected: self.marks.len(),
                actual: nominals.len(),
            });
        }
        for (lm, &nominal) in self.marks.iter_mut().zip(nominals) {
            lm.set_nominal_position(nominal);
        }
        Ok(())
    }

    /// Equidistant scale starting at tag 0: `tag * division`.
    pub fn set_equidistant(&mut self, division: f64) {
        for lm in &mut self.marks {
            lm.set_nominal_position(lm.tag() as f64 * division);
        }
    }

    /// Equidistant scale with the reference tag at 0: `(tag - reference) * division`.
    pub fn set_equidistant_from_reference(&mut self, division: f64, reference: usize) {
        for lm in &mut self.marks {
            lm.set_nominal_position((lm.tag() as f64 - reference as f64) * division);
        }
    }

    pub fn nominal_positions(&self) -> Vec<f64> {
        self.marks.iter().map(|lm| lm.nominal_position()).collect()
    }

    /// Folds one profile's marks, each relative to `marks[reference]`.
    pub fn update_sample(&mut self, marks: &[EdgeMark], reference: usize) -> SampleOutcome {
        if let Some(reason) = self.check_sample(marks) {
            return self.reject(reason);
        }
        let Some(reference_mark) = marks.get(reference).copied() else {
            return self.reject(RejectReason::ReferenceOutOfRange {
                reference,
                expected: self.marks.len(),
            });
        };

        for (lm, mark) in self.marks.iter_mut().zip(marks) {
            lm.update(mark, &reference_mark);
        }
        SampleOutcome::Folded
    }

    /// Folds one profile's marks at their absolute centers.
    pub fn update_sample_absolute(&mut self, marks: &[EdgeMark]) -> SampleOutcome {
        if let Some(reason) = self.check_sample(marks) {
            return self.reject(reason);
        }
        for (lm, mark) in self.marks.iter_mut().zip(marks) {
            lm.update_absolute(mark);
        }
        SampleOutcome::Folded
    }

    fn check_sample(&self, marks: &[EdgeMark]) -> Option<RejectReason> {
        if self.marks.is_empty() {
            return Some(RejectReason::EmptyScale);
        }
        if marks.len() != self.marks.len() {
            return Some(RejectReason::CountMismatch {
                detected: marks.len(),
                expected: self.marks.len(),
            });
        }
        None
    }

    fn reject(&mut self, reason: RejectReason) -> SampleOutcome {
        self.rejected_samples += 1;
        SampleOutcome::Rejected(reason)
    }

    /// Number of profiles folded so far.
    pub fn sample_size(&self) -> usize {
        self.marks.first().map_or(0, |lm| lm.sample_size())
    }

    pub fn rejected_samples(&self) -> usize {
        self.rejected_samples
    }

    pub fn scale_type(&self) -> Option<MarkPolarity> {
        self.marks.first().and_then(|lm| lm.polarity())
    }

    pub fn records(&self, thermal: &ThermalExpansion) -> Vec<LineMarkRecord> {
        self.marks.iter().map(|lm| lm.record(thermal)).collect()
    }

    /// Spread of the thermal correction between the first and last nominal position.
    pub fn max_thermal_correction(&self, thermal: &ThermalExpansion) -> f64 {
        match (self.marks.first(), self.marks.last()) {
            (Some(first), Some(last)) => {
                thermal.correction(last.nominal_position())
                    - thermal.correction(first.nominal_position())
            }
            _ => 0.0,
        }
    }
}

/// Clamps a requested reference line into `[0, expected - 1]` (0 for an empty scale).
pub fn clamp_reference_index(requested: i64, expected_line_marks: usize) -> usize {
    let last = expected_line_marks.saturating_sub(1) as i64;
    requested.clamp(0, last) as usize
}
