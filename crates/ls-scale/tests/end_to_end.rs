use approx::assert_relative_eq;
use ls_core::IntensityProfile;
use ls_edge::MarkPolarity;
use ls_scale::{NominalSpec, ProfileStatus, ScaleEvalConfig, ScaleEvaluator, ScaleResult};

fn two_mark_profile() -> IntensityProfile {
    let z = vec![10, 10, 80, 80, 80, 10, 10, 10, 90, 90, 90, 10, 10];
    let x = (0..z.len()).map(|i| i as f64).collect();
    IntensityProfile::new(x, z)
}

fn two_mark_config() -> ScaleEvalConfig {
    ScaleEvalConfig {
        expected_line_marks: 2,
        nominal: NominalSpec::Division(6.0),
        collect_edges: true,
        ..ScaleEvalConfig::default()
    }
}

#[test]
fn two_mark_profile_end_to_end() {
    let report = ScaleEvaluator::new(two_mark_config())
        .evaluate(&[two_mark_profile()], 20.0)
        .expect("valid profile");

    let s = report.summary;
    assert_eq!((s.min_intensity, s.max_intensity), (10, 90));
    assert_eq!((s.lower_bound, s.upper_bound), (10, 80));
    assert_eq!(s.cutoff, 35);
    assert_relative_eq!(s.relative_span_percent, 87.5);

    assert_eq!(report.edges[0].left, vec![1.5, 7.5]);
    assert_eq!(report.edges[0].right, vec![4.5, 10.5]);
    assert_eq!(
        report.profiles[0].status,
        ProfileStatus::Evaluated {
            left_edges: 2,
            right_edges: 2,
            detected_marks: 2,
            mismatch: false,
            folded: true,
        }
    );

    let ScaleResult::Calibrated {
        scale_type,
        max_thermal_correction,
        records,
    } = report.result
    else {
        panic!("expected calibrated result");
    };
    assert_eq!(scale_type, Some(MarkPolarity::Reflective));
    assert_eq!(max_thermal_correction, 0.0);
    assert_eq!(records[0].nominal_position, 0.0);
    assert_eq!(records[1].nominal_position, 6.0);
    assert_eq!(records[1].deviation, 0.0);
    assert_eq!(records[0].mean_width, 3.0);
    assert_eq!(records[1].mean_width, 3.0);
}

#[test]
fn irregular_nominals_report_deviation() {
    let cfg = ScaleEvalConfig {
        nominal: NominalSpec::Positions(vec![0.0, 5.9]),
        ..two_mark_config()
    };
    let report = ScaleEvaluator::new(cfg)
        .evaluate(&[two_mark_profile(), two_mark_profile()], 20.0)
        .expect("valid profiles");
    assert_eq!(report.sample_size, 2);

    let ScaleResult::Calibrated { records, .. } = report.result else {
        panic!("expected calibrated result");
    };
    assert_relative_eq!(records[1].deviation, 0.1, max_relative = 1e-9);
    assert_eq!(records[1].center_std_dev, 0.0);
}

#[test]
fn report_serializes_to_json() {
    let report = ScaleEvaluator::new(two_mark_config())
        .evaluate(&[two_mark_profile()], 20.0)
        .expect("valid profile");
    let v = serde_json::to_value(&report).expect("serializable report");

    assert_eq!(v["result"]["kind"], "calibrated");
    assert_eq!(v["result"]["scale_type"], "Reflective");
    assert_eq!(v["profiles"][0]["status"], "evaluated");
    assert_eq!(v["summary"]["cutoff"], 35);
    assert_eq!(v["edges"][0]["left"][1], 7.5);
}

#[test]
fn mismatching_count_yields_no_pattern() {
    let cfg = ScaleEvalConfig {
        expected_line_marks: 3,
        ..two_mark_config()
    };
    let report = ScaleEvaluator::new(cfg)
        .evaluate(&[two_mark_profile()], 20.0)
        .expect("valid profile");
    assert_eq!(report.result, ScaleResult::NoMatchingPattern);
    assert_eq!(report.mismatched_profiles, 1);

    let v = serde_json::to_value(&report).expect("serializable report");
    assert_eq!(v["result"]["kind"], "no_matching_pattern");
}
