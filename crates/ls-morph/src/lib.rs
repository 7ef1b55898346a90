//! Minimal 1D binary morphology for segmented profiles.
//!
//! Any nonzero sample counts as set; rewritten samples are `0`/`1`. Every pass uses a 3-sample structuring element
//! and rewrites interior samples only; the first and last sample of a mask are
//! never modified. Iterated passes read the complete output of the previous
//! pass.

/// Morphological operation selected by a signed filter parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphOp {
    Identity,
    /// Erode then dilate, `n` passes each.
    Open(usize),
    /// Dilate then erode, `n` passes each.
    Close(usize),
}

impl MorphOp {
    /// Positive parameters open, negative ones close, zero leaves the mask alone.
    pub fn from_parameter(parameter: i32) -> Self {
        let n = parameter.unsigned_abs() as usize;
        match parameter.signum() {
            1 => Self::Open(n),
            -1 => Self::Close(n),
            _ => Self::Identity,
        }
    }

    pub fn apply(self, mask: &[u8]) -> Vec<u8> {
        match self {
            Self::Identity => mask.to_vec(),
            Self::Open(n) => open_binary_1d(mask, n),
            Self::Close(n) => close_binary_1d(mask, n),
        }
    }
}

pub fn erode_binary_1d(src: &[u8], iterations: usize) -> Vec<u8> {
    repeat_pass(src, iterations, |sum| sum == 3)
}

pub fn dilate_binary_1d(src: &[u8], iterations: usize) -> Vec<u8> {
    repeat_pass(src, iterations, |sum| sum > 0)
}

pub fn open_binary_1d(src: &[u8], iterations: usize) -> Vec<u8> {
    let eroded = erode_binary_1d(src, iterations);
    dilate_binary_1d(&eroded, iterations)
}

pub fn close_binary_1d(src: &[u8], iterations: usize) -> Vec<u8> {
    let dilated = dilate_binary_1d(src, iterations);
    erode_binary_1d(&dilated, iterations)
}

/// Applies the operation encoded by `parameter`, see [`MorphOp::from_parameter`].
pub fn filter_with_parameter(mask: &[u8], parameter: i32) -> Vec<u8> {
    MorphOp::from_parameter(parameter).apply(mask)
}

fn repeat_pass(src: &[u8], iterations: usize, keep: impl Fn(usize) -> bool) -> Vec<u8> {
    let mut cur = src.to_vec();
    if src.len() < 3 || iterations == 0 {
        return cur;
    }

    let mut next = cur.clone();
    for _ in 0..iterations {
        for (i, w) in cur.windows(3).enumerate() {
            let set = w.iter().filter(|&&v| v != 0).count();
            next[i + 1] = u8::from(keep(set));
        }
        std::mem::swap(&mut cur, &mut next);
    }

    cur
}
