use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("profile length mismatch: {x_len} positions, {z_len} intensities")]
    ProfileLengthMismatch { x_len: usize, z_len: usize },
    #[error("profile too short: {len} samples, need at least 2")]
    ProfileTooShort { len: usize },
    #[error("no intensities to build a histogram from")]
    EmptyIntensities,
    #[error("mask length mismatch: mask has {mask_len} samples, positions {x_len}")]
    MaskLengthMismatch { mask_len: usize, x_len: usize },
    #[error("nominal count mismatch: expected {expected}, got {actual}")]
    NominalCountMismatch { expected: usize, actual: usize },
    #[error("no valid profile in scan")]
    NoValidProfiles,
}
