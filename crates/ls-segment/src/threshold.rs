use crate::histogram::BoundEstimate;

/// Fixed-threshold binarization of an intensity profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segmenter {
    cutoff: i64,
}

impl Segmenter {
    /// `fraction` of the plateau separation becomes the absolute cutoff.
    ///
    /// The cutoff is the bound *width* scaled by `fraction`; it is compared
    /// against raw intensities without adding `lower_bound`.
    pub fn new(fraction: f64, bounds: &BoundEstimate) -> Self {
        let width = bounds.upper_bound as i64 - bounds.lower_bound as i64;
        Self {
            cutoff: (width as f64 * fraction).floor() as i64,
        }
    }

    pub fn cutoff(&self) -> i64 {
        self.cutoff
    }

    /// `1` where the intensity lies strictly above the cutoff, else `0`.
    pub fn segment(&self, intensities: &[i32]) -> Vec<u8> {
        intensities
            .iter()
            .map(|&v| u8::from(v as i64 > self.cutoff))
            .collect()
    }
}

pub fn segment(intensities: &[i32], fraction: f64, bounds: &BoundEstimate) -> Vec<u8> {
    Segmenter::new(fraction, bounds).segment(intensities)
}

#[cfg(test)]
mod tests {
    use crate::histogram::{BoundEstimate, estimate_bounds};
    use crate::threshold::{Segmenter, segment};

    fn bounds(lower: i32, upper: i32) -> BoundEstimate {
        BoundEstimate {
            min_intensity: lower,
            max_intensity: upper,
            lower_bound: lower,
            upper_bound: upper,
        }
    }

    #[test]
    fn two_mark_profile_segments_into_two_plateaus() {
        let z = [10, 10, 80, 80, 80, 10, 10, 10, 90, 90, 90, 10, 10];
        let b = estimate_bounds(&z).expect("non-empty");
        let s = Segmenter::new(0.5, &b);
        assert_eq!(s.cutoff(), 35);
        assert_eq!(
            s.segment(&z),
            vec![0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0]
        );
    }

    #[test]
    fn cutoff_ignores_lower_offset() {
        // Width 100 at 30% -> cutoff 30, even though the dark plateau is at 1000.
        let s = Segmenter::new(0.3, &bounds(1000, 1100));
        assert_eq!(s.cutoff(), 30);
        assert_eq!(s.segment(&[29, 30, 31, 1000]), vec![0, 0, 1, 1]);
    }

    #[test]
    fn cutoff_floors_fractional_products() {
        assert_eq!(Segmenter::new(0.5, &bounds(0, 7)).cutoff(), 3);
        assert_eq!(Segmenter::new(1.0, &bounds(4, 4)).cutoff(), 0);
    }

    #[test]
    fn mask_matches_input_length() {
        let z = [0, 5, 10, 15];
        assert_eq!(segment(&z, 0.0, &bounds(0, 15)).len(), z.len());
        assert_eq!(segment(&z, 0.0, &bounds(0, 15)), vec![0, 1, 1, 1]);
    }
}
