use crate::Error;

/// One scan line: probe positions `x` with the brightness `z` read at each.
///
/// Construction never fails so that malformed profiles coming out of a scan
/// can still be carried, counted and skipped. Use [`IntensityProfile::validate`]
/// or [`IntensityProfile::try_new`] to enforce the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityProfile {
    x: Vec<f64>,
    z: Vec<i32>,
}

impl IntensityProfile {
    pub fn new(x: Vec<f64>, z: Vec<i32>) -> Self {
        Self { x, z }
    }

    pub fn try_new(x: Vec<f64>, z: Vec<i32>) -> Result<Self, Error> {
        let profile = Self::new(x, z);
        profile.validate()?;
        Ok(profile)
    }

    /// Builds a profile from floating-point brightness, rounding half to even.
    pub fn from_f64_intensities(x: Vec<f64>, z: &[f64]) -> Self {
        let z = z.iter().map(|&v| v.round_ties_even() as i32).collect();
        Self { x, z }
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn z(&self) -> &[i32] {
        &self.z
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.x.len() != self.z.len() {
            return Err(Error::ProfileLengthMismatch {
                x_len: self.x.len(),
                z_len: self.z.len(),
            });
        }
        if self.x.len() < 2 {
            return Err(Error::ProfileTooShort { len: self.x.len() });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
