use ls_core::{RunningStatistic, ThermalExpansion};
use ls_edge::{EdgeMark, MarkPolarity};
use serde::Serialize;

/// Per-tag statistics of one line mark across all folded profiles.
///
/// Centers are stored relative to the reference mark of the same profile.
#[derive(Debug, Clone, PartialEq)]
pub struct LineMarkAggregator {
    tag: usize,
    nominal_position: f64,
    center: RunningStatistic,
    width: RunningStatistic,
    polarity: Option<MarkPolarity>,
}

/// Reportable summary of a [`LineMarkAggregator`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineMarkRecord {
    pub tag: usize,
    pub nominal_position: f64,
    pub deviation: f64,
    /// `deviation` plus the thermal correction of the nominal position.
    pub corrected_deviation: f64,
    pub center_std_dev: f64,
    pub center_range: f64,
    pub mean_width: f64,
    pub width_std_dev: f64,
    pub width_range: f64,
    pub sample_size: usize,
    pub polarity: Option<MarkPolarity>,
}

impl LineMarkAggregator {
    pub fn new(tag: usize) -> Self {
        Self {
            tag,
            nominal_position: 0.0,
            center: RunningStatistic::new(),
            width: RunningStatistic::new(),
            polarity: None,
        }
    }

    pub fn tag(&self) -> usize {
        self.tag
    }

    pub fn nominal_position(&self) -> f64 {
        self.nominal_position
    }

    pub(crate) fn set_nominal_position(&mut self, nominal: f64) {
        self.nominal_position = nominal;
    }

    pub fn update(&mut self, sample: &EdgeMark, reference: &EdgeMark) {
        self.fold(sample.center() - reference.center(), sample);
    }

    /// Folds `sample` with its absolute center, i.e. against a zero reference.
    pub fn update_absolute(&mut self, sample: &EdgeMark) {
        self.fold(sample.center(), sample);
    }

    fn fold(&mut self, reduced_center: f64, sample: &EdgeMark) {
        self.center.push(reduced_center);
        self.width.push(sample.width());
        self.polarity = Some(sample.polarity());
    }

    pub fn sample_size(&self) -> usize {
        self.center.count()
    }

    pub fn center(&self) -> &RunningStatistic {
        &self.center
    }

    pub fn width(&self) -> &RunningStatistic {
        &self.width
    }

    pub fn mean_center(&self) -> f64 {
        self.center.mean()
    }

    pub fn mean_width(&self) -> f64 {
        self.width.mean()
    }

    /// Polarity of the most recently folded sample.
    pub fn polarity(&self) -> Option<MarkPolarity> {
        self.polarity
    }

    pub fn deviation(&self) -> f64 {
        self.mean_center() - self.nominal_position
    }

    pub fn record(&self, thermal: &ThermalExpansion) -> LineMarkRecord {
        let deviation = self.deviation();
        LineMarkRecord {
            tag: self.tag,
            nominal_position: self.nominal_position,
            deviation,
            corrected_deviation: deviation + thermal.correction(self.nominal_position),
            center_std_dev: self.center.std_dev(),
            center_range: self.center.range(),
            mean_width: self.width.mean(),
            width_std_dev: self.width.std_dev(),
            width_range: self.width.range(),
            sample_size: self.sample_size(),
            polarity: self.polarity,
        }
    }
}
