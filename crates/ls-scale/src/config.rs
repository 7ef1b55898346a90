use serde::{Deserialize, Serialize};

use crate::scale::clamp_reference_index;

/// How nominal line positions are assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NominalSpec {
    /// Equidistant scale with this division.
    Division(f64),
    /// Irregular scale, one position per expected line mark.
    Positions(Vec<f64>),
}

impl Default for NominalSpec {
    fn default() -> Self {
        Self::Division(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleEvalConfig {
    /// Fraction of the plateau separation used as the segmentation cutoff.
    pub threshold_fraction: f64,
    /// Signed morphology parameter: `> 0` opens, `< 0` closes, `0` disables.
    pub filter_parameter: i32,
    pub expected_line_marks: usize,
    pub nominal: NominalSpec,
    /// With a division, place the reference line at nominal 0.
    pub nominal_from_reference: bool,
    /// Requested reference line; clamped into the scale.
    pub reference_line: i64,
    /// Linear thermal expansion coefficient, 1/K.
    pub thermal_expansion_alpha: f64,
    /// Keep sorted, thermally corrected edge positions of every profile.
    pub collect_edges: bool,
    /// Profiles processed in parallel between fold/cancel checkpoints.
    pub parallel_chunk: usize,
}

impl Default for ScaleEvalConfig {
    fn default() -> Self {
        Self {
            threshold_fraction: 0.5,
            filter_parameter: 0,
            expected_line_marks: 0,
            nominal: NominalSpec::default(),
            nominal_from_reference: false,
            reference_line: 0,
            thermal_expansion_alpha: 0.0,
            collect_edges: false,
            parallel_chunk: 64,
        }
    }
}

impl ScaleEvalConfig {
    pub fn reference_index(&self) -> usize {
        let clamped = clamp_reference_index(self.reference_line, self.expected_line_marks);
        if clamped as i64 != self.reference_line {
            tracing::warn!(
                "reference line {} outside scale of {} marks, using {}",
                self.reference_line,
                self.expected_line_marks,
                clamped
            );
        }
        clamped
    }

    pub fn threshold(&self) -> f64 {
        let clamped = self.threshold_fraction.clamp(0.0, 1.0);
        if clamped != self.threshold_fraction {
            tracing::warn!(
                "threshold fraction {} outside [0, 1], using {}",
                self.threshold_fraction,
                clamped
            );
        }
        clamped
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{NominalSpec, ScaleEvalConfig};

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = ScaleEvalConfig {
            expected_line_marks: 4,
            reference_line: 7,
            threshold_fraction: 1.4,
            ..ScaleEvalConfig::default()
        };
        assert_eq!(cfg.reference_index(), 3);
        assert_eq!(cfg.threshold(), 1.0);

        let cfg = ScaleEvalConfig {
            expected_line_marks: 4,
            reference_line: -1,
            ..ScaleEvalConfig::default()
        };
        assert_eq!(cfg.reference_index(), 0);
        assert_eq!(cfg.threshold(), 0.5);
    }

    #[test]
    fn loads_partial_json() {
        let cfg: ScaleEvalConfig = serde_json::from_str(
            r#"{"expected_line_marks": 3, "nominal": {"positions": [0.0, 9.8, 20.1]}, "filter_parameter": -2}"#,
        )
        .expect("valid config json");
        assert_eq!(cfg.expected_line_marks, 3);
        assert_eq!(cfg.nominal, NominalSpec::Positions(vec![0.0, 9.8, 20.1]));
        assert_eq!(cfg.filter_parameter, -2);
        assert_eq!(cfg.threshold_fraction, 0.5);
    }

    #[test]
    fn defaults() {
        let cfg = ScaleEvalConfig::default();
        assert_eq!(cfg.nominal, NominalSpec::Division(0.0));
        assert_eq!(cfg.filter_parameter, 0);
        assert!(cfg.parallel_chunk > 0);
    }
}
