use ls_core::Error;
use serde::Serialize;

/// Intensity extremes and the two dominant plateaus of a scan field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundEstimate {
    pub min_intensity: i32,
    pub max_intensity: i32,
    pub lower_bound: i32,
    pub upper_bound: i32,
}

impl BoundEstimate {
    pub fn range(&self) -> i64 {
        self.max_intensity as i64 - self.min_intensity as i64
    }

    /// Plateau separation as a percentage of the full intensity range.
    ///
    /// A flat field (zero range) reports `0.0`.
    pub fn relative_span_percent(&self) -> f64 {
        let range = self.range();
        if range == 0 {
            return 0.0;
        }
        (self.upper_bound as i64 - self.lower_bound as i64) as f64 / range as f64 * 100.0
    }
}

/// Intensity histogram with one bin per integer level between min and max.
#[derive(Debug, Clone)]
pub struct HistogramAnalyzer {
    min: i32,
    max: i32,
    counts: Vec<usize>,
}

impl HistogramAnalyzer {
    pub fn new(intensities: &[i32]) -> Result<Self, Error> {
        let (Some(&min), Some(&max)) = (intensities.iter().min(), intensities.iter().max()) else {
            return Err(Error::EmptyIntensities);
        };

        let mut counts = vec![0usize; (max as i64 - min as i64) as usize + 1];
        for &v in intensities {
            counts[(v as i64 - min as i64) as usize] += 1;
        }

        Ok(Self { min, max, counts })
    }

    pub fn min_intensity(&self) -> i32 {
        self.min
    }

    pub fn max_intensity(&self) -> i32 {
        self.max
    }

    pub fn range(&self) -> i64 {
        self.max as i64 - self.min as i64
    }

    /// Counts indexed by `intensity - min_intensity`.
    pub fn histogram(&self) -> &[usize] {
        &self.counts
    }

    /// Most populated intensity inside `[rel_lower, rel_upper)` of the range.
    ///
    /// Fractions map to bins by truncation and are clamped into the histogram;
    /// an inverted interval is swapped. The upper bin is excluded, so the
    /// lower and upper halves never share a bin and `max_intensity` is never
    /// reported for a non-flat field. The search is seeded at the first bin
    /// (returned as is for an empty interval) and the first maximum wins.
    pub fn find_peak(&self, rel_lower: f64, rel_upper: f64) -> i32 {
        let range = self.range();
        let to_bin = |rel: f64| ((range as f64 * rel) as i64).clamp(0, range) as usize;

        let mut lo = to_bin(rel_lower);
        let mut hi = to_bin(rel_upper);
        if hi < lo {
            std::mem::swap(&mut lo, &mut hi);
        }

        let mut peak = lo;
        let mut peak_count = self.counts[lo];
        for (i, &count) in self.counts.iter().enumerate().take(hi).skip(lo + 1) {
            if count > peak_count {
                peak_count = count;
                peak = i;
            }
        }

        (self.min as i64 + peak as i64) as i32
    }

    pub fn lower_bound(&self) -> i32 {
        self.find_peak(0.0, 0.5)
    }

    pub fn upper_bound(&self) -> i32 {
        self.find_peak(0.5, 1.0)
    }

    pub fn bounds(&self) -> BoundEstimate {
        BoundEstimate {
            min_intensity: self.min,
            max_intensity: self.max,
            lower_bound: self.lower_bound(),
            upper_bound: self.upper_bound(),
        }
    }
}

/// Histogram bounds of `intensities` in one call.
pub fn estimate_bounds(intensities: &[i32]) -> Result<BoundEstimate, Error> {
    Ok(HistogramAnalyzer::new(intensities)?.bounds())
}
